mod app_config;
mod config;
pub mod identifiers;
pub mod retailers;
pub mod table;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, DEFAULT_USER_AGENT};
pub use config::{load_app_config, load_app_config_from_env};
pub use identifiers::{load_identifiers, parse_identifiers};
pub use retailers::{
    load_retailers, DetectionConfig, RetailerConfig, RetailersFile, UrlConfig,
    IDENTIFIER_PLACEHOLDER,
};
pub use table::{load_csv_table, load_table, load_workbook_table, Table};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read retailers file {path}: {source}")]
    RetailersFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse retailers file: {0}")]
    RetailersFileParse(#[source] serde_yaml::Error),

    #[error("failed to read identifiers file {path}: {source}")]
    IdentifiersFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read table {path}: {source}")]
    TableRead {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read workbook {path}: {source}")]
    SpreadsheetRead {
        path: String,
        #[source]
        source: calamine::Error,
    },

    #[error("config validation failed: {0}")]
    Validation(String),
}
