//! Per-retailer check definitions loaded from `config/retailers.yaml`.
//!
//! Each retailer picks how a request URL is built from an identifier and how
//! the response is classified. The two choices are independent settings; no
//! retailer-agnostic rule decides between redirect and marker detection.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Placeholder substituted with the identifier in URL and marker templates.
pub const IDENTIFIER_PLACEHOLDER: &str = "{identifier}";

const DEFAULT_PRODUCT_PATTERN: &str = r"/p-\d+";
const DEFAULT_MARKER_TEMPLATE: &str = "sku_id\":\"{identifier}";

/// How the request URL is derived from an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum UrlConfig {
    /// The identifier already is the full product URL.
    Direct,
    /// The identifier is substituted into a search URL.
    Templated { template: String },
}

/// How a response is turned into a found / not found / ambiguous verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DetectionConfig {
    /// Classify from the status code and the final URL after redirects.
    Status {
        #[serde(default = "default_product_pattern")]
        product_pattern: String,
    },
    /// Classify by searching the response body for a literal SKU marker.
    Marker {
        #[serde(default = "default_marker_template")]
        marker_template: String,
    },
}

fn default_product_pattern() -> String {
    DEFAULT_PRODUCT_PATTERN.to_string()
}

fn default_marker_template() -> String {
    DEFAULT_MARKER_TEMPLATE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetailerConfig {
    pub name: String,
    /// Scheme and host, e.g. `https://www.trademax.se`. Extracted product
    /// URIs are prefixed with it.
    pub origin: String,
    /// Overrides the global `User-Agent` for this retailer only.
    #[serde(default)]
    pub user_agent: Option<String>,
    pub url: UrlConfig,
    pub detection: DetectionConfig,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RetailerConfig {
    /// Short label for the detection strategy, used in listings and logs.
    #[must_use]
    pub fn strategy_label(&self) -> &'static str {
        match (&self.url, &self.detection) {
            (UrlConfig::Direct, DetectionConfig::Status { .. }) => "direct/status",
            (UrlConfig::Templated { .. }, DetectionConfig::Status { .. }) => "templated/status",
            (UrlConfig::Direct, DetectionConfig::Marker { .. }) => "direct/marker",
            (UrlConfig::Templated { .. }, DetectionConfig::Marker { .. }) => "templated/marker",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RetailersFile {
    pub retailers: Vec<RetailerConfig>,
}

impl RetailersFile {
    /// Looks up a retailer by name, ignoring ASCII case.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&RetailerConfig> {
        self.retailers
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name.trim()))
    }
}

/// Load and validate the retailers configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_retailers(path: &Path) -> Result<RetailersFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RetailersFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_retailers(&content)
}

/// Parse and validate retailers YAML already held in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_retailers(content: &str) -> Result<RetailersFile, ConfigError> {
    let retailers_file: RetailersFile =
        serde_yaml::from_str(content).map_err(ConfigError::RetailersFileParse)?;

    validate_retailers(&retailers_file)?;

    Ok(retailers_file)
}

fn validate_retailers(retailers_file: &RetailersFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for retailer in &retailers_file.retailers {
        let name = retailer.name.trim();
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "retailer name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(name.to_ascii_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate retailer name: '{name}'"
            )));
        }

        validate_origin(name, &retailer.origin)?;

        if let UrlConfig::Templated { template } = &retailer.url {
            if !template.contains(IDENTIFIER_PLACEHOLDER) {
                return Err(ConfigError::Validation(format!(
                    "retailer '{name}' url template must contain {IDENTIFIER_PLACEHOLDER}"
                )));
            }
        }

        match &retailer.detection {
            DetectionConfig::Status { product_pattern } => {
                if product_pattern.trim().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "retailer '{name}' product_pattern must be non-empty"
                    )));
                }
            }
            DetectionConfig::Marker { marker_template } => {
                if !marker_template.contains(IDENTIFIER_PLACEHOLDER) {
                    return Err(ConfigError::Validation(format!(
                        "retailer '{name}' marker_template must contain {IDENTIFIER_PLACEHOLDER}"
                    )));
                }
                // A marker search needs a bare SKU, which only a templated URL takes.
                if retailer.url == UrlConfig::Direct {
                    return Err(ConfigError::Validation(format!(
                        "retailer '{name}' uses marker detection but has a direct url; \
                         marker detection requires kind: templated"
                    )));
                }
            }
        }
    }

    Ok(())
}

fn validate_origin(name: &str, origin: &str) -> Result<(), ConfigError> {
    let host = origin
        .strip_prefix("https://")
        .or_else(|| origin.strip_prefix("http://"));
    match host {
        Some(rest) if !rest.trim_end_matches('/').is_empty() && !rest.contains(' ') => Ok(()),
        _ => Err(ConfigError::Validation(format!(
            "retailer '{name}' has invalid origin '{origin}'; expected http(s)://host"
        ))),
    }
}
