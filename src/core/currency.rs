//! Currency codes, directed pairs and the working currency set

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Currencies every conversion considers, before caller additions.
pub const DEFAULT_CURRENCIES: [&str; 4] = ["ETH", "BNB", "BTC", "USDT"];

/// An opaque short currency code such as `BTC`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn new(code: &str) -> Result<Self> {
        let code = code.trim();
        if code.is_empty() {
            bail!("Currency code must not be empty");
        }
        Ok(Currency(code.to_string()))
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::new(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

/// A conversion direction between two distinct currencies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyPair {
    pub from: Currency,
    pub to: Currency,
}

impl CurrencyPair {
    pub fn new(from: Currency, to: Currency) -> Result<Self> {
        if from == to {
            bail!("Currency pair needs two distinct currencies, got {from} twice");
        }
        Ok(CurrencyPair { from, to })
    }

    pub fn reversed(&self) -> Self {
        CurrencyPair {
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }
}

impl Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// The deduplicated set of currencies a conversion may pass through.
///
/// Insertion order is kept so that pairs and paths come out in a stable,
/// reproducible order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencySet {
    currencies: Vec<Currency>,
}

impl CurrencySet {
    /// Builds the default set extended with `additions`.
    pub fn with_additions<I>(additions: I) -> Self
    where
        I: IntoIterator<Item = Currency>,
    {
        let defaults = DEFAULT_CURRENCIES
            .iter()
            .map(|code| Currency(code.to_string()));
        Self::from_currencies(defaults.chain(additions))
    }

    pub fn from_currencies<I>(currencies: I) -> Self
    where
        I: IntoIterator<Item = Currency>,
    {
        let mut set: Vec<Currency> = Vec::new();
        for currency in currencies {
            if !set.contains(&currency) {
                set.push(currency);
            }
        }
        CurrencySet { currencies: set }
    }

    pub fn contains(&self, currency: &Currency) -> bool {
        self.currencies.contains(currency)
    }

    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Currency> {
        self.currencies.iter()
    }

    /// Every unordered pair of the set, each once, in `(earlier, later)` order.
    pub fn unordered_pairs(&self) -> Vec<CurrencyPair> {
        let mut pairs = Vec::new();
        for (i, from) in self.currencies.iter().enumerate() {
            for to in &self.currencies[i + 1..] {
                pairs.push(CurrencyPair {
                    from: from.clone(),
                    to: to.clone(),
                });
            }
        }
        pairs
    }
}

impl Default for CurrencySet {
    fn default() -> Self {
        Self::with_additions(std::iter::empty())
    }
}
