use super::ui;
use crate::core::ConversionPlan;
use crate::core::path::path_count;
use comfy_table::{Cell, CellAlignment};

/// Renders every multi-hop path of `plan` as a numbered table.
pub fn display_paths(plan: &ConversionPlan) -> String {
    let mut output = format!(
        "Paths from {} to {}\n\n",
        ui::style_text(plan.start().code(), ui::StyleType::Title),
        ui::style_text(plan.end().code(), ui::StyleType::Title),
    );

    if plan.paths().is_empty() {
        output.push_str(&ui::style_text(
            "No intermediate currencies, only the direct conversion is possible.",
            ui::StyleType::Subtle,
        ));
        return output;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Path"),
        ui::header_cell("Hops"),
    ]);
    for (i, path) in plan.paths().iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1).set_alignment(CellAlignment::Right),
            Cell::new(path),
            Cell::new(path.currencies().len() - 1).set_alignment(CellAlignment::Right),
        ]);
    }
    output.push_str(&table.to_string());

    let intermediates = plan.currencies().len().saturating_sub(2);
    output.push_str(&format!(
        "\n\n{} {}",
        ui::style_text("Total paths:", ui::StyleType::TotalLabel),
        ui::style_text(
            &path_count(intermediates).to_string(),
            ui::StyleType::TotalValue
        ),
    ));
    output
}

pub fn run(plan: &ConversionPlan) {
    println!("{}", display_paths(plan));
}
