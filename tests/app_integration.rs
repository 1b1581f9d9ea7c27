use std::fs;
use tracing::{error, info};
use xrate::core::config::AppConfig;
use xrate::core::{Currency, RateProvider};

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Exchange answering `{"price": ...}` for the given symbols; anything
    /// else gets the server's default 404.
    pub async fn create_flat_exchange(quotes: &[(&str, &str)]) -> MockServer {
        let mock_server = MockServer::start().await;
        for (symbol, price) in quotes {
            Mock::given(method("GET"))
                .and(path("/api/v3/ticker/price"))
                .and(query_param("symbol", *symbol))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_string(format!(r#"{{"symbol":"{symbol}","price":"{price}"}}"#)),
                )
                .mount(&mock_server)
                .await;
        }
        mock_server
    }

    /// Exchange answering `{"data": {"price": ...}}` for the given symbols.
    pub async fn create_nested_exchange(quotes: &[(&str, f64)]) -> MockServer {
        let mock_server = MockServer::start().await;
        for (symbol, price) in quotes {
            Mock::given(method("GET"))
                .and(path("/api/v1/market/orderbook/level1"))
                .and(query_param("symbol", *symbol))
                .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                    r#"{{"code":"200000","data":{{"price":{price}}}}}"#
                )))
                .mount(&mock_server)
                .await;
        }
        mock_server
    }

    pub fn write_config(
        dir: &std::path::Path,
        flat: &MockServer,
        nested: &MockServer,
    ) -> std::path::PathBuf {
        let config_path = dir.join("config.yaml");
        let content = format!(
            r#"
exchanges:
  - url: "{}/api/v3/ticker/price"
    param: symbol
    template: "{{}}{{}}"
  - "{}/api/v1/market/orderbook/level1":
      symbol: "{{}}-{{}}"
request_timeout_secs: 5
"#,
            flat.uri(),
            nested.uri()
        );
        std::fs::write(&config_path, content).expect("Failed to write config file");
        config_path
    }
}

fn cur(code: &str) -> Currency {
    Currency::new(code).unwrap()
}

#[test_log::test(tokio::test)]
async fn test_best_paths_across_mock_exchanges() {
    // Flat exchange: direct quote plus a cheaper route through USDT.
    let flat = test_utils::create_flat_exchange(&[
        ("ETHBTC", "0.05"),
        ("BTCUSDT", "40000"),
        ("ETHUSDT", "1900"),
    ])
    .await;
    // Nested exchange: only answers the reversed direction for BTC/USDT and
    // has no BTC/ETH market at all.
    let nested =
        test_utils::create_nested_exchange(&[("USDT-BTC", 0.000025), ("ETH-USDT", 2000.0)]).await;

    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(dir.path(), &flat, &nested);
    let config = AppConfig::load_from_path(&config_path).expect("Failed to load config");

    let plan = xrate::build_plan("BTC", "ETH", &[]).unwrap();
    let providers = xrate::providers::build_providers(&config).unwrap();
    let flat_source = providers[0].source().to_string();
    let nested_source = providers[1].source().to_string();

    let book = xrate::fetcher::fetch_rates(&providers, plan.pairs()).await;
    let nested_table = book.table(&nested_source).unwrap();
    let btc_usdt = nested_table.rate(&cur("BTC"), &cur("USDT")).unwrap();
    let usdt_btc = nested_table.rate(&cur("USDT"), &cur("BTC")).unwrap();
    assert!((btc_usdt - 40000.0).abs() < 1e-6);
    assert!((btc_usdt * usdt_btc - 1.0).abs() < 1e-9);
    assert_eq!(nested_table.rate(&cur("BTC"), &cur("ETH")), None);
    assert_eq!(nested_table.rate(&cur("ETH"), &cur("BTC")), None);

    let best = xrate::find_best_paths(&plan, &providers).await;
    info!(%best, "Best paths");

    let direct = best.direct.expect("Expected a direct result");
    assert_eq!(direct.source, flat_source);
    assert!((direct.rate - 20.0).abs() < 1e-9);

    let complex = best.complex.expect("Expected a complex result");
    assert_eq!(complex.source, flat_source);
    assert_eq!(complex.currencies, vec![cur("BTC"), cur("USDT"), cur("ETH")]);
    assert!((complex.rate - 40000.0 / 1900.0).abs() < 1e-9);
}

#[test_log::test(tokio::test)]
async fn test_unreachable_exchanges_yield_no_data() {
    let flat = test_utils::create_flat_exchange(&[]).await;
    let nested = test_utils::create_nested_exchange(&[]).await;

    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(dir.path(), &flat, &nested);
    let config = AppConfig::load_from_path(&config_path).unwrap();

    let plan = xrate::build_plan("BTC", "ETH", &[]).unwrap();
    let providers = xrate::providers::build_providers(&config).unwrap();
    let best = xrate::find_best_paths(&plan, &providers).await;

    assert!(best.direct.is_none());
    assert!(best.complex.is_none());
    assert_eq!(best.to_string().matches("No data.").count(), 2);
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let flat = test_utils::create_flat_exchange(&[("BTCETH", "20.5")]).await;
    let nested = test_utils::create_nested_exchange(&[("BTC-USDT", 41000.0)]).await;

    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(dir.path(), &flat, &nested);

    let result = xrate::run_command(
        xrate::AppCommand::Best {
            from: "BTC".to_string(),
            to: "ETH".to_string(),
            currencies: vec![],
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Main function failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_paths_command_uses_config_currencies() {
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    fs::write(
        config_file.path(),
        r#"
currencies: [SOL]
exchanges:
  - url: "https://api.binance.com/api/v3/ticker/price"
    param: symbol
    template: "{}{}"
"#,
    )
    .expect("Failed to write config file");

    let result = xrate::run_command(
        xrate::AppCommand::Paths {
            from: "BTC".to_string(),
            to: "ETH".to_string(),
            currencies: vec!["XRP".to_string()],
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Paths command failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_invalid_config_is_fatal() {
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    fs::write(
        config_file.path(),
        r#"
exchanges:
  - url: "https://api.binance.com/api/v3/ticker/price"
    param: symbol
    template: "{}"
"#,
    )
    .expect("Failed to write config file");

    let result = xrate::run_command(
        xrate::AppCommand::Best {
            from: "BTC".to_string(),
            to: "ETH".to_string(),
            currencies: vec![],
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    let err = result.expect_err("Invalid template must fail the run");
    assert!(err.to_string().starts_with("Failed to parse config file"));
}

#[test_log::test(tokio::test)]
#[ignore = "hits the live Binance API"]
async fn test_real_binance_api() {
    use std::time::Duration;
    use xrate::core::config::ExchangeSource;
    use xrate::providers::exchange::ExchangeRateProvider;

    let exchange =
        ExchangeSource::new("https://api.binance.com/api/v3/ticker/price", "symbol", "{}{}")
            .unwrap();
    let provider = ExchangeRateProvider::new(exchange, Duration::from_secs(10)).unwrap();

    let pair = xrate::core::CurrencyPair::new(cur("BTC"), cur("USDT")).unwrap();
    info!(%pair, "Fetching rate from Binance");

    match provider.get_rate(&pair).await {
        Ok(rate) => {
            info!(?rate, "Received rate");
            assert!(rate > 0.0, "Rate should be positive");
        }
        Err(e) => {
            error!("Binance API request failed: {e}\n{e:?}");
            panic!("Binance API request failed: {e}");
        }
    }
}
