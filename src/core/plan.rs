//! The immutable description of one conversion run.

use anyhow::Result;
use tracing::{debug, warn};

use super::currency::{Currency, CurrencyPair, CurrencySet};
use super::path::{Path, generate_paths, path_count};

/// Intermediate count past which enumeration becomes noticeably slow.
const LARGE_INTERMEDIATE_COUNT: usize = 8;

/// Currencies, pairs and paths for converting `start` into `end`.
///
/// Built once before fetching starts and never modified afterwards.
#[derive(Debug, Clone)]
pub struct ConversionPlan {
    start: Currency,
    end: Currency,
    currencies: CurrencySet,
    pairs: Vec<CurrencyPair>,
    paths: Vec<Path>,
}

impl ConversionPlan {
    pub fn new(start: Currency, end: Currency, currencies: CurrencySet) -> Result<Self> {
        let intermediates = currencies.len().saturating_sub(2);
        if intermediates > LARGE_INTERMEDIATE_COUNT {
            warn!(
                intermediates,
                paths = %path_count(intermediates),
                "Large currency set, path enumeration may take a while"
            );
        }

        let paths = generate_paths(&start, &end, &currencies)?;
        let pairs = currencies.unordered_pairs();
        debug!(
            %start,
            %end,
            currencies = currencies.len(),
            pairs = pairs.len(),
            paths = paths.len(),
            "Built conversion plan"
        );

        Ok(Self {
            start,
            end,
            currencies,
            pairs,
            paths,
        })
    }

    pub fn start(&self) -> &Currency {
        &self.start
    }

    pub fn end(&self) -> &Currency {
        &self.end
    }

    pub fn currencies(&self) -> &CurrencySet {
        &self.currencies
    }

    /// Unordered pairs whose rates need fetching.
    pub fn pairs(&self) -> &[CurrencyPair] {
        &self.pairs
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }
}
