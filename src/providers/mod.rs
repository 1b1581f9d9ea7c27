pub mod exchange;

use crate::core::RateProvider;
use crate::core::config::AppConfig;
use anyhow::Result;
use exchange::ExchangeRateProvider;
use std::sync::Arc;

/// One HTTP provider per configured exchange, in configuration order.
pub fn build_providers(config: &AppConfig) -> Result<Vec<Arc<dyn RateProvider>>> {
    let timeout = config.request_timeout();
    config
        .exchanges
        .iter()
        .map(|exchange| {
            let provider = ExchangeRateProvider::new(exchange.clone(), timeout)?;
            Ok(Arc::new(provider) as Arc<dyn RateProvider>)
        })
        .collect()
}
