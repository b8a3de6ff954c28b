use fxcache::core::config::AppConfig;
use fxcache::{AppCommand, AppContext, run_command};
use std::fs;
use tempfile::{NamedTempFile, TempDir};
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const USD_RATES: &str = r#"{
        "result": "success",
        "base_code": "USD",
        "time_last_update_utc": "Mon, 01 Jan 2024 00:00:01 +0000",
        "rates": { "USD": 1, "EUR": 0.9, "ZAR": 18.0 }
    }"#;

    pub const USD_ZAR_HISTORY: &str = r#"{
        "amount": 1.0,
        "base": "USD",
        "rates": {
            "2020-01-02": { "ZAR": 14.0 },
            "2020-01-03": { "ZAR": 14.2 }
        }
    }"#;

    pub const ZAR_NEWS: &str = r#"{
        "status": "ok",
        "items": [
            {
                "title": "Rand firms against the dollar",
                "pubDate": "2024-01-03 08:00:00",
                "link": "https://news.example/rand-firms",
                "author": "",
                "description": "<p>Rand firms</p>"
            }
        ]
    }"#;

    /// One server standing in for all three upstreams; `rates_calls` bounds
    /// how often the rates endpoint may be hit.
    pub async fn create_mock_server(rates_calls: u64) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v6/latest/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_string(USD_RATES))
            .expect(rates_calls)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path_regex(r"^/trend/\d{4}-\d{2}-\d{2}\.\.\d{4}-\d{2}-\d{2}$"))
            .and(query_param("from", "USD"))
            .and(query_param("to", "ZAR"))
            .respond_with(ResponseTemplate::new(200).set_body_string(USD_ZAR_HISTORY))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/api.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ZAR_NEWS))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn config_content(uri: &str, data_path: &std::path::Path) -> String {
        format!(
            r#"
currency: "USD"
providers:
  rates:
    base_url: "{uri}/v6/latest"
  trend:
    base_url: "{uri}/trend"
  news:
    base_url: "{uri}/v1/api.json"
cache:
  rates_ttl_secs: 60
data_path: "{}"
"#,
            data_path.display()
        )
    }
}

fn write_config(uri: &str, data_dir: &TempDir) -> NamedTempFile {
    let config_file = NamedTempFile::new().expect("Failed to create temp file");
    let content = test_utils::config_content(uri, data_dir.path());
    fs::write(config_file.path(), content).expect("Failed to write config file");
    config_file
}

async fn run(cmd: AppCommand, config_file: &NamedTempFile) {
    let result = run_command(cmd, Some(config_file.path().to_str().unwrap())).await;
    assert!(result.is_ok(), "Command failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_all_commands_with_mock() {
    let mock_server = test_utils::create_mock_server(1).await;
    let data_dir = TempDir::new().unwrap();
    let config_file = write_config(&mock_server.uri(), &data_dir);

    run(
        AppCommand::Rates {
            base: None,
            search: Some("rand".to_string()),
            refresh: false,
        },
        &config_file,
    )
    .await;
    run(
        AppCommand::Convert {
            query: "100 usd to zar".to_string(),
            refresh: false,
        },
        &config_file,
    )
    .await;
    run(
        AppCommand::Trend {
            from: "usd".to_string(),
            to: "zar".to_string(),
            base: None,
            refresh: false,
        },
        &config_file,
    )
    .await;
    run(
        AppCommand::News {
            currency: Some("ZAR".to_string()),
            refresh: false,
        },
        &config_file,
    )
    .await;
    info!("All commands completed against mock upstreams");
}

#[test_log::test(tokio::test)]
async fn test_cache_survives_restart() {
    // The second rates command must be answered from the persisted snapshot.
    let mock_server = test_utils::create_mock_server(1).await;
    let data_dir = TempDir::new().unwrap();
    let config_file = write_config(&mock_server.uri(), &data_dir);

    for _ in 0..2 {
        run(
            AppCommand::Rates {
                base: Some("USD".to_string()),
                search: None,
                refresh: false,
            },
            &config_file,
        )
        .await;
    }

    run(
        AppCommand::Base {
            code: Some("zar".to_string()),
        },
        &config_file,
    )
    .await;

    let config = AppConfig::load_from_path(config_file.path()).unwrap();
    let ctx = AppContext::from_config(&config).unwrap();
    assert_eq!(ctx.store.base_currency().await, "ZAR");
    assert_eq!(
        ctx.store.len::<fxcache::core::RatesTable>().await,
        1,
        "rates entry should be rehydrated"
    );
}

#[test_log::test(tokio::test)]
async fn test_invalid_commands_fail() {
    let mock_server = test_utils::create_mock_server(0).await;
    let data_dir = TempDir::new().unwrap();
    let config_file = write_config(&mock_server.uri(), &data_dir);
    let config_path = config_file.path().to_str().unwrap();

    let result = run_command(
        AppCommand::Convert {
            query: "hundred dollars please".to_string(),
            refresh: false,
        },
        Some(config_path),
    )
    .await;
    assert!(result.unwrap_err().to_string().contains("Could not understand"));

    let result = run_command(
        AppCommand::Base {
            code: Some("XYZ".to_string()),
        },
        Some(config_path),
    )
    .await;
    assert!(result.unwrap_err().to_string().contains("Unsupported currency code"));
}
