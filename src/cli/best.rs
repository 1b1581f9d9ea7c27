use super::ui;
use crate::core::{BestPaths, ConversionPlan, PathValuation, RateProvider};
use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::Cell;
use std::sync::Arc;

fn display_valuation(title: &str, valuation: Option<&PathValuation>) -> String {
    let mut output = format!("{}\n\n", ui::style_text(title, ui::StyleType::Title));

    let Some(valuation) = valuation else {
        output.push_str(&ui::style_text("No data.", ui::StyleType::Subtle));
        return output;
    };

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Step"),
        ui::header_cell("From"),
        ui::header_cell("To"),
        ui::header_cell("Cumulative rate"),
    ]);

    let last = valuation.hops.len().saturating_sub(1);
    for (i, hop) in valuation.hops.iter().enumerate() {
        let rate = if i == last {
            ui::final_rate_cell(hop.cumulative)
        } else {
            ui::rate_cell(hop.cumulative)
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(hop.from.code()),
            Cell::new(hop.to.code()),
            rate,
        ]);
    }

    output.push_str(&format!(
        "Source: {}\n",
        ui::style_text(&valuation.source, ui::StyleType::TotalLabel)
    ));
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n\nRate: {}",
        ui::style_text(&ui::format_rate(valuation.rate), ui::StyleType::TotalValue)
    ));
    output
}

/// Renders both results of a run for the terminal.
pub fn display_best_paths(
    best: &BestPaths,
    plan: &ConversionPlan,
    fetched_at: DateTime<Utc>,
) -> String {
    let mut output = format!(
        "Converting {} to {} via {} currencies, rates fetched at {}\n\n",
        ui::style_text(plan.start().code(), ui::StyleType::TotalLabel),
        ui::style_text(plan.end().code(), ui::StyleType::TotalLabel),
        plan.currencies().len(),
        fetched_at.format("%Y-%m-%d %H:%M:%S UTC"),
    );
    output.push_str(&display_valuation(
        "The best direct path",
        best.direct.as_ref(),
    ));
    output.push_str("\n\n");
    output.push_str(&display_valuation(
        "The best complex path",
        best.complex.as_ref(),
    ));
    output
}

pub async fn run(
    plan: &ConversionPlan,
    providers: &[Arc<dyn RateProvider>],
) -> Result<BestPaths> {
    let total = (providers.len() * plan.pairs().len()) as u64;
    let pb = ui::new_progress_bar(total, true);
    pb.set_message("Fetching rates...");

    let best = crate::find_best_paths_with_progress(plan, providers, &|| pb.inc(1)).await;
    pb.finish_and_clear();

    println!("{}", display_best_paths(&best, plan, Utc::now()));
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Currency, CurrencySet, Hop};
    use chrono::TimeZone;

    fn cur(code: &str) -> Currency {
        Currency::new(code).unwrap()
    }

    #[test]
    fn test_display_without_results() {
        let plan = ConversionPlan::new(cur("BTC"), cur("ETH"), CurrencySet::default()).unwrap();
        let fetched_at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        let output = display_best_paths(&BestPaths::default(), &plan, fetched_at);
        assert!(output.contains("2024-01-02 03:04:05 UTC"));
        assert!(output.contains("The best direct path"));
        assert!(output.contains("The best complex path"));
        assert_eq!(output.matches("No data.").count(), 2);
    }

    #[test]
    fn test_display_with_complex_result() {
        let plan = ConversionPlan::new(cur("BTC"), cur("ETH"), CurrencySet::default()).unwrap();
        let best = BestPaths {
            direct: None,
            complex: Some(PathValuation {
                source: "api.example.com".to_string(),
                currencies: vec![cur("BTC"), cur("USDT"), cur("ETH")],
                rate: 20.5,
                hops: vec![
                    Hop {
                        from: cur("BTC"),
                        to: cur("USDT"),
                        cumulative: 41000.0,
                    },
                    Hop {
                        from: cur("USDT"),
                        to: cur("ETH"),
                        cumulative: 20.5,
                    },
                ],
            }),
        };

        let output = display_best_paths(&best, &plan, Utc::now());
        assert_eq!(output.matches("No data.").count(), 1);
        assert!(output.contains("api.example.com"));
        assert!(output.contains("41000.00000000"));
        assert!(output.contains("20.50000000"));
    }
}
