pub mod cli;
pub mod core;
pub mod fetcher;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::{BestPaths, ConversionPlan, Currency, CurrencySet, RateProvider};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    /// Fetch rates and report the best direct and multi-hop conversion.
    Best {
        from: String,
        to: String,
        currencies: Vec<String>,
    },
    /// List the multi-hop paths without fetching anything.
    Paths {
        from: String,
        to: String,
        currencies: Vec<String>,
    },
}

/// Builds the plan for `from -> to`. Both ends and every entry of
/// `additions` join the default currency set.
pub fn build_plan(from: &str, to: &str, additions: &[String]) -> Result<ConversionPlan> {
    let start = Currency::new(from).context("Invalid start currency")?;
    let end = Currency::new(to).context("Invalid end currency")?;
    let mut extra = additions
        .iter()
        .map(|code| Currency::new(code).with_context(|| format!("Invalid currency '{code}'")))
        .collect::<Result<Vec<_>>>()?;
    extra.push(start.clone());
    extra.push(end.clone());

    ConversionPlan::new(start, end, CurrencySet::with_additions(extra))
}

/// Fetches every source's rates for `plan` and picks the best conversions.
pub async fn find_best_paths(
    plan: &ConversionPlan,
    providers: &[Arc<dyn RateProvider>],
) -> BestPaths {
    find_best_paths_with_progress(plan, providers, &|| {}).await
}

pub async fn find_best_paths_with_progress(
    plan: &ConversionPlan,
    providers: &[Arc<dyn RateProvider>],
    on_pair: &(dyn Fn() + Send + Sync),
) -> BestPaths {
    let book = fetcher::fetch_rates_with_progress(providers, plan.pairs(), on_pair).await;
    crate::core::evaluate(plan.paths(), &book, plan.start(), plan.end())
}

fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    match config_path {
        Some(path) => AppConfig::load_from_path(path),
        None => AppConfig::load(),
    }
}

/// Currencies configured in the config file, if there is one.
///
/// Listing paths needs no exchanges, so a missing default config is fine.
fn configured_currencies(config_path: Option<&str>) -> Result<Vec<String>> {
    let path = match config_path {
        Some(path) => std::path::PathBuf::from(path),
        None => {
            let path = AppConfig::default_config_path()?;
            if !path.exists() {
                debug!("No config file at {}, using default currencies", path.display());
                return Ok(Vec::new());
            }
            path
        }
    };
    let config = AppConfig::load_from_path(path)?;
    Ok(config
        .currencies
        .iter()
        .map(|c| c.code().to_string())
        .collect())
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("xrate starting...");

    match command {
        AppCommand::Best {
            from,
            to,
            currencies,
        } => {
            let config = load_config(config_path)?;
            debug!("Loaded config: {config:#?}");

            let mut additions: Vec<String> = config
                .currencies
                .iter()
                .map(|c| c.code().to_string())
                .collect();
            additions.extend(currencies);
            let plan = build_plan(&from, &to, &additions)?;

            let providers = providers::build_providers(&config)?;
            cli::best::run(&plan, &providers).await?;
        }
        AppCommand::Paths {
            from,
            to,
            currencies,
        } => {
            let mut additions = configured_currencies(config_path)?;
            additions.extend(currencies);
            let plan = build_plan(&from, &to, &additions)?;
            cli::paths::run(&plan);
        }
    }
    Ok(())
}
