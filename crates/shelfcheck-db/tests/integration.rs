//! Offline tests for shelfcheck-db pool configuration and import helpers.
//! These tests do not require a live database connection.

use shelfcheck_core::{AppConfig, Environment};
use shelfcheck_db::{connect_pool_from_config, quote_ident, rows_per_insert, DbError, PoolConfig};
use std::path::PathBuf;

fn app_config(database_url: Option<&str>) -> AppConfig {
    AppConfig {
        env: Environment::Test,
        log_level: "info".to_string(),
        retailers_path: PathBuf::from("./config/retailers.yaml"),
        database_url: database_url.map(str::to_owned),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        request_timeout_secs: 20,
        user_agent: "Mozilla/5.0".to_string(),
        inter_request_delay_ms: 500,
        scraper_service_url: "http://localhost:8080".to_string(),
        scraper_service_command: "npm run dev".to_string(),
        scraper_service_warmup_secs: 10,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config(None));
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn pool_config_default_values() {
    let pool_config = PoolConfig::default();
    assert_eq!(pool_config.max_connections, 5);
    assert_eq!(pool_config.min_connections, 1);
    assert_eq!(pool_config.acquire_timeout_secs, 10);
}

#[tokio::test]
async fn connect_without_database_url_fails_fast() {
    let err = connect_pool_from_config(&app_config(None))
        .await
        .expect_err("no DATABASE_URL configured");
    assert!(matches!(err, DbError::MissingDatabaseUrl), "got: {err:?}");
}

#[test]
fn table_exists_error_names_the_table() {
    let err = DbError::TableExists("temp_vd_trademax_2024_08_28".to_string());
    assert_eq!(
        err.to_string(),
        "table \"temp_vd_trademax_2024_08_28\" already exists; refusing to overwrite"
    );
}

#[test]
fn public_helpers_are_consistent() {
    assert_eq!(quote_ident("sku"), "\"sku\"");
    assert!(rows_per_insert(3) * 3 <= 65_535);
}
