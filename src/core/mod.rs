//! Core conversion logic: currencies, paths, rates and their evaluation

pub mod config;
pub mod currency;
pub mod evaluate;
pub mod log;
pub mod path;
pub mod plan;
pub mod rate;

// Re-export main types for cleaner imports
pub use currency::{Currency, CurrencyPair, CurrencySet};
pub use evaluate::{BestPaths, Hop, PathValuation, evaluate};
pub use path::{Path, generate_paths};
pub use plan::ConversionPlan;
pub use rate::{RateBook, RateProvider, RateQuote, RateTable};
