//! Enumeration of multi-hop conversion paths.
//!
//! Enumeration is exhaustive: with `n` intermediate currencies there are
//! `Σ n!/(n-k)!` paths for `k = 1..=n`, so the work grows factorially. This is
//! fine for the handful of currencies a conversion normally considers, but
//! anything past eight intermediates (over a hundred thousand paths) gets slow.

use anyhow::{Result, bail};
use std::fmt::Display;

use super::currency::{Currency, CurrencyPair, CurrencySet};

/// A simple conversion path with at least one intermediate currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    currencies: Vec<Currency>,
}

impl Path {
    pub fn new(currencies: Vec<Currency>) -> Result<Self> {
        if currencies.len() < 3 {
            bail!(
                "A path needs at least one intermediate currency, got {} currencies",
                currencies.len()
            );
        }
        for (i, currency) in currencies.iter().enumerate() {
            if currencies[i + 1..].contains(currency) {
                bail!("Currency {currency} appears more than once in path");
            }
        }
        Ok(Path { currencies })
    }

    pub fn currencies(&self) -> &[Currency] {
        &self.currencies
    }

    pub fn start(&self) -> &Currency {
        &self.currencies[0]
    }

    pub fn end(&self) -> &Currency {
        &self.currencies[self.currencies.len() - 1]
    }

    /// Consecutive conversion steps along the path.
    pub fn hops(&self) -> impl Iterator<Item = CurrencyPair> + '_ {
        self.currencies.windows(2).map(|w| CurrencyPair {
            from: w[0].clone(),
            to: w[1].clone(),
        })
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let codes: Vec<&str> = self.currencies.iter().map(Currency::code).collect();
        f.write_str(&codes.join(" -> "))
    }
}

/// Number of paths [`generate_paths`] yields for `intermediates` currencies.
pub fn path_count(intermediates: usize) -> u128 {
    let mut total: u128 = 0;
    let mut falling: u128 = 1;
    for k in 0..intermediates {
        falling = falling.saturating_mul((intermediates - k) as u128);
        total = total.saturating_add(falling);
    }
    total
}

/// Every simple path from `start` to `end` through one or more currencies of
/// `currencies`.
///
/// Paths are grouped by length. Within one length, intermediates are picked
/// as combinations in set order and each combination is emitted in every
/// order. The direct conversion is not included.
pub fn generate_paths(
    start: &Currency,
    end: &Currency,
    currencies: &CurrencySet,
) -> Result<Vec<Path>> {
    if start == end {
        bail!("Start and end currency must differ, got {start} for both");
    }
    for currency in [start, end] {
        if !currencies.contains(currency) {
            bail!("Currency {currency} is not part of the currency set");
        }
    }

    let intermediates: Vec<&Currency> = currencies
        .iter()
        .filter(|c| *c != start && *c != end)
        .collect();

    let mut paths = Vec::new();
    for size in 1..=intermediates.len() {
        for combination in combinations(intermediates.len(), size) {
            for order in permutations(&combination) {
                let mut currencies = Vec::with_capacity(size + 2);
                currencies.push(start.clone());
                currencies.extend(order.iter().map(|&i| intermediates[i].clone()));
                currencies.push(end.clone());
                paths.push(Path { currencies });
            }
        }
    }
    Ok(paths)
}

/// Index combinations of `size` out of `0..n`, in lexicographic order.
fn combinations(n: usize, size: usize) -> Vec<Vec<usize>> {
    let mut result = Vec::new();
    if size == 0 || size > n {
        return result;
    }
    let mut indices: Vec<usize> = (0..size).collect();
    loop {
        result.push(indices.clone());

        // Rightmost index that can still move forward.
        let Some(pos) = (0..size).rev().find(|&i| indices[i] < n - size + i) else {
            return result;
        };
        indices[pos] += 1;
        for i in pos + 1..size {
            indices[i] = indices[i - 1] + 1;
        }
    }
}

/// All orderings of `items`, lexicographic by position.
fn permutations(items: &[usize]) -> Vec<Vec<usize>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut result = Vec::new();
    for (i, &first) in items.iter().enumerate() {
        let mut rest = items.to_vec();
        rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, first);
            result.push(tail);
        }
    }
    result
}
