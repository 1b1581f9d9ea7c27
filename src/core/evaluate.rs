//! Selection of the best direct and multi-hop conversion across sources.
use std::fmt::Display;
use tracing::debug;

use super::currency::Currency;
use super::path::Path;
use super::rate::{RateBook, RateTable};

/// Formats a conversion rate with enough precision for small-unit coins.
pub fn format_rate(rate: f64) -> String {
    format!("{rate:.8}")
}

/// One conversion step and the cumulative rate reached after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Hop {
    pub from: Currency,
    pub to: Currency,
    pub cumulative: f64,
}

/// A path priced against a single source.
#[derive(Debug, Clone, PartialEq)]
pub struct PathValuation {
    pub source: String,
    pub currencies: Vec<Currency>,
    pub rate: f64,
    pub hops: Vec<Hop>,
}

impl Display for PathValuation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.source)?;
        for hop in &self.hops {
            writeln!(
                f,
                "{} -> {} -> {}",
                hop.from,
                hop.to,
                format_rate(hop.cumulative)
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BestPaths {
    pub direct: Option<PathValuation>,
    pub complex: Option<PathValuation>,
}

impl Display for BestPaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "The best direct path:\n{}", or_no_data(self.direct.as_ref()))?;
        write!(f, "\n\nThe best complex path:\n{}", or_no_data(self.complex.as_ref()))
    }
}

fn or_no_data(valuation: Option<&PathValuation>) -> String {
    valuation.map_or_else(|| "No data.".to_string(), |v| v.to_string())
}

/// Prices `path` against `table`, or `None` if any hop has no known rate.
pub fn value_path(path: &Path, table: &RateTable) -> Option<PathValuation> {
    let mut cumulative = 1.0;
    let mut hops = Vec::with_capacity(path.currencies().len() - 1);
    for hop in path.hops() {
        cumulative *= table.rate(&hop.from, &hop.to)?;
        hops.push(Hop {
            from: hop.from,
            to: hop.to,
            cumulative,
        });
    }
    Some(PathValuation {
        source: table.source().to_string(),
        currencies: path.currencies().to_vec(),
        rate: cumulative,
        hops,
    })
}

/// Prices the direct conversion `start -> end` against `table`.
pub fn value_direct(start: &Currency, end: &Currency, table: &RateTable) -> Option<PathValuation> {
    let rate = table.rate(start, end)?;
    Some(PathValuation {
        source: table.source().to_string(),
        currencies: vec![start.clone(), end.clone()],
        rate,
        hops: vec![Hop {
            from: start.clone(),
            to: end.clone(),
            cumulative: rate,
        }],
    })
}

/// Keeps `candidate` only when it beats the current best; ties keep the
/// earlier candidate.
fn keep_best(best: &mut Option<PathValuation>, candidate: PathValuation) {
    if best.as_ref().is_none_or(|current| candidate.rate > current.rate) {
        *best = Some(candidate);
    }
}

/// Finds the highest direct rate and the highest multi-hop rate over every
/// source in `book`.
///
/// Sources are scanned in book order and paths in the given order, so equal
/// rates resolve to whichever was found first.
pub fn evaluate(paths: &[Path], book: &RateBook, start: &Currency, end: &Currency) -> BestPaths {
    let mut best = BestPaths::default();

    for table in book.tables() {
        if let Some(direct) = value_direct(start, end, table) {
            keep_best(&mut best.direct, direct);
        }

        let mut priced = 0usize;
        for path in paths {
            if let Some(valuation) = value_path(path, table) {
                priced += 1;
                keep_best(&mut best.complex, valuation);
            }
        }
        debug!(
            source = table.source(),
            priced,
            total = paths.len(),
            "Evaluated paths for source"
        );
    }

    best
}
