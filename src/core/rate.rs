//! Rate abstractions and per-source rate tables

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::warn;

use super::currency::{Currency, CurrencyPair};

/// Fetches a single conversion rate from one exchange.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Identifier of the source, the exchange endpoint's host.
    fn source(&self) -> &str;

    /// Units of `pair.to` received for one unit of `pair.from`.
    async fn get_rate(&self, pair: &CurrencyPair) -> Result<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateQuote {
    Known(f64),
    Unknown,
}

impl RateQuote {
    pub fn value(&self) -> Option<f64> {
        match self {
            RateQuote::Known(rate) => Some(*rate),
            RateQuote::Unknown => None,
        }
    }
}

/// Whether a value can be used as a conversion rate.
pub fn is_valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}

/// Rates quoted by one source. Each pair is written at most once.
#[derive(Debug, Clone)]
pub struct RateTable {
    source: String,
    quotes: HashMap<CurrencyPair, RateQuote>,
}

impl RateTable {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            quotes: HashMap::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Records `pair` at `rate` and its reverse at `1 / rate`.
    ///
    /// Returns false and leaves the table untouched if either direction was
    /// already recorded or the rate is not a positive finite number.
    pub fn record(&mut self, pair: &CurrencyPair, rate: f64) -> bool {
        if !is_valid_rate(rate) {
            warn!(source = %self.source, %pair, rate, "Refusing to record invalid rate");
            return false;
        }
        self.insert_both(pair, RateQuote::Known(rate), RateQuote::Known(1.0 / rate))
    }

    /// Marks both directions of `pair` as unobtainable.
    pub fn record_unknown(&mut self, pair: &CurrencyPair) -> bool {
        self.insert_both(pair, RateQuote::Unknown, RateQuote::Unknown)
    }

    fn insert_both(&mut self, pair: &CurrencyPair, forward: RateQuote, reverse: RateQuote) -> bool {
        let reversed = pair.reversed();
        if self.quotes.contains_key(pair) || self.quotes.contains_key(&reversed) {
            warn!(source = %self.source, %pair, "Pair already recorded, keeping first value");
            return false;
        }
        self.quotes.insert(pair.clone(), forward);
        self.quotes.insert(reversed, reverse);
        true
    }

    pub fn quote(&self, pair: &CurrencyPair) -> Option<RateQuote> {
        self.quotes.get(pair).copied()
    }

    /// Known rate for converting `from` into `to`.
    pub fn rate(&self, from: &Currency, to: &Currency) -> Option<f64> {
        let pair = CurrencyPair {
            from: from.clone(),
            to: to.clone(),
        };
        self.quote(&pair).and_then(|q| q.value())
    }

    pub fn known_count(&self) -> usize {
        self.quotes
            .values()
            .filter(|q| matches!(q, RateQuote::Known(_)))
            .count()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

/// All rate tables of a run, in exchange configuration order.
#[derive(Debug, Clone, Default)]
pub struct RateBook {
    tables: Vec<RateTable>,
}

impl RateBook {
    pub fn new(tables: Vec<RateTable>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &[RateTable] {
        &self.tables
    }

    pub fn table(&self, source: &str) -> Option<&RateTable> {
        self.tables.iter().find(|t| t.source() == source)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<RateTable> for RateBook {
    fn from_iter<T: IntoIterator<Item = RateTable>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(from: &str, to: &str) -> CurrencyPair {
        CurrencyPair::new(Currency::new(from).unwrap(), Currency::new(to).unwrap()).unwrap()
    }

    #[test]
    fn test_record_sets_reciprocal_reverse_rate() {
        let mut table = RateTable::new("api.example.com");
        assert!(table.record(&pair("BTC", "USDT"), 40000.0));

        let forward = table.quote(&pair("BTC", "USDT")).unwrap().value().unwrap();
        let reverse = table.quote(&pair("USDT", "BTC")).unwrap().value().unwrap();
        assert_eq!(forward, 40000.0);
        assert!((forward * reverse - 1.0).abs() < 1e-12);
        assert_eq!(table.known_count(), 2);
    }

    #[test]
    fn test_entries_are_written_once() {
        let mut table = RateTable::new("api.example.com");
        assert!(table.record(&pair("BTC", "ETH"), 20.0));
        assert!(!table.record(&pair("ETH", "BTC"), 0.1));
        assert!(!table.record_unknown(&pair("BTC", "ETH")));
        assert_eq!(table.rate(&pair("BTC", "ETH").from, &pair("BTC", "ETH").to), Some(20.0));
    }

    #[test]
    fn test_unknown_and_invalid_rates() {
        let mut table = RateTable::new("api.example.com");
        assert!(!table.record(&pair("BTC", "ETH"), 0.0));
        assert!(!table.record(&pair("BTC", "ETH"), f64::NAN));
        assert!(table.is_empty());

        assert!(table.record_unknown(&pair("BTC", "ETH")));
        assert_eq!(table.quote(&pair("ETH", "BTC")), Some(RateQuote::Unknown));
        let (btc, eth) = (Currency::new("BTC").unwrap(), Currency::new("ETH").unwrap());
        assert_eq!(table.rate(&btc, &eth), None);
        assert_eq!(table.len(), 2);
        assert_eq!(table.known_count(), 0);
    }

    #[test]
    fn test_rate_book_lookup_by_source() {
        let book: RateBook = vec![RateTable::new("a.example"), RateTable::new("b.example")]
            .into_iter()
            .collect();
        assert_eq!(book.len(), 2);
        assert!(book.table("b.example").is_some());
        assert!(book.table("c.example").is_none());
    }
}
