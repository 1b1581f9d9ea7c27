//! Concurrent collection of rate tables from every configured exchange.

use anyhow::{Result, anyhow};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::currency::CurrencyPair;
use crate::core::rate::{RateBook, RateProvider, RateTable, is_valid_rate};

/// How a pair's rate was obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PairOutcome {
    /// The requested direction answered with this rate.
    Forward(f64),
    /// Only the swapped direction answered; the rate is for `pair.reversed()`.
    Reverse(f64),
    Missing,
}

/// Asks `provider` for one direction; a rate that is not positive and finite
/// counts as a failed attempt.
async fn request_rate(provider: &dyn RateProvider, pair: &CurrencyPair) -> Result<f64> {
    let rate = provider.get_rate(pair).await?;
    if !is_valid_rate(rate) {
        return Err(anyhow!("Unusable rate {rate} for {pair}"));
    }
    Ok(rate)
}

/// Asks `provider` for `pair`, retrying once with the direction swapped.
pub async fn fetch_pair(provider: &dyn RateProvider, pair: &CurrencyPair) -> PairOutcome {
    let forward_err = match request_rate(provider, pair).await {
        Ok(rate) => return PairOutcome::Forward(rate),
        Err(e) => e,
    };
    debug!(
        source = provider.source(),
        %pair,
        error = %forward_err,
        "Forward request failed, trying reversed pair"
    );

    match request_rate(provider, &pair.reversed()).await {
        Ok(rate) => PairOutcome::Reverse(rate),
        Err(reverse_err) => {
            warn!(
                source = provider.source(),
                %pair,
                forward_error = %forward_err,
                reverse_error = %reverse_err,
                "No rate available in either direction"
            );
            PairOutcome::Missing
        }
    }
}

/// Builds the rate table of a single source.
///
/// Pairs are requested one after another; every request stands on its own.
pub async fn fetch_table(
    provider: &dyn RateProvider,
    pairs: &[CurrencyPair],
    on_pair: &(dyn Fn() + Send + Sync),
) -> RateTable {
    let mut table = RateTable::new(provider.source());
    for pair in pairs {
        let recorded = match fetch_pair(provider, pair).await {
            PairOutcome::Forward(rate) => table.record(pair, rate),
            PairOutcome::Reverse(rate) => table.record(&pair.reversed(), rate),
            PairOutcome::Missing => table.record_unknown(pair),
        };
        if !recorded {
            // Only reachable for a pair already recorded through its reverse.
            table.record_unknown(pair);
        }
        on_pair();
    }
    debug!(
        source = table.source(),
        known = table.known_count(),
        entries = table.len(),
        "Finished rate table"
    );
    table
}

/// Collects one [`RateTable`] per provider.
///
/// Providers are queried concurrently, each filling only its own table; the
/// tables are gathered into a [`RateBook`] in provider order once all of them
/// are done. Individual failures never fail the whole fetch.
pub async fn fetch_rates(providers: &[Arc<dyn RateProvider>], pairs: &[CurrencyPair]) -> RateBook {
    fetch_rates_with_progress(providers, pairs, &|| {}).await
}

/// Same as [`fetch_rates`], calling `on_pair` after each processed pair.
pub async fn fetch_rates_with_progress(
    providers: &[Arc<dyn RateProvider>],
    pairs: &[CurrencyPair],
    on_pair: &(dyn Fn() + Send + Sync),
) -> RateBook {
    info!(
        sources = providers.len(),
        pairs = pairs.len(),
        "Fetching exchange rates"
    );
    let units = providers
        .iter()
        .map(|provider| fetch_table(provider.as_ref(), pairs, on_pair));

    join_all(units).await.into_iter().collect()
}
