//! HTTP existence checks against a single retailer.

mod detect;

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use regex::Regex;
use reqwest::Client;
use shelfcheck_core::{DetectionConfig, RetailerConfig, UrlConfig};

use crate::error::ScraperError;
use crate::types::CheckResult;

use self::detect::{classify_marker_body, classify_status, render_template};

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// How the request URL is derived from an identifier.
#[derive(Debug, Clone)]
pub enum UrlStrategy {
    Direct,
    /// Search URL containing `{identifier}`.
    Templated(String),
}

/// How a response is classified.
#[derive(Debug, Clone)]
pub enum Detection {
    Status { product_pattern: Regex },
    Marker { marker_template: String },
}

/// Resolved settings for one retailer: compiled patterns, normalized origin,
/// the `User-Agent` to send and the request timeout.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub retailer: String,
    pub origin: String,
    pub url: UrlStrategy,
    pub detection: Detection,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl CheckConfig {
    /// Builds a check config from a retailer entry. The retailer's own
    /// `user_agent` wins over `default_user_agent`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidPattern`] if the product pattern does not compile.
    /// - [`ScraperError::InvalidUrl`] if the origin is not an absolute http(s) URL.
    pub fn from_retailer(
        retailer: &RetailerConfig,
        default_user_agent: &str,
        timeout_secs: u64,
    ) -> Result<Self, ScraperError> {
        let url = match &retailer.url {
            UrlConfig::Direct => UrlStrategy::Direct,
            UrlConfig::Templated { template } => UrlStrategy::Templated(template.clone()),
        };
        let detection = match &retailer.detection {
            DetectionConfig::Status { product_pattern } => Detection::Status {
                product_pattern: Regex::new(product_pattern).map_err(|source| {
                    ScraperError::InvalidPattern {
                        retailer: retailer.name.clone(),
                        pattern: product_pattern.clone(),
                        source,
                    }
                })?,
            },
            DetectionConfig::Marker { marker_template } => Detection::Marker {
                marker_template: marker_template.clone(),
            },
        };
        Ok(Self {
            retailer: retailer.name.clone(),
            origin: site_origin(&retailer.origin)?,
            url,
            detection,
            user_agent: retailer
                .user_agent
                .clone()
                .unwrap_or_else(|| default_user_agent.to_owned()),
            timeout_secs,
        })
    }
}

/// Reduces a configured origin to `scheme://host[:port]` so extracted
/// product URIs always join onto the site root.
fn site_origin(origin: &str) -> Result<String, ScraperError> {
    let invalid = |reason: String| ScraperError::InvalidUrl {
        url: origin.to_owned(),
        reason,
    };
    let parsed = reqwest::Url::parse(origin).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    Ok(parsed.origin().ascii_serialization())
}

/// Issues one GET per identifier and classifies the response.
///
/// Redirects are followed (reqwest's default policy) so status-based checks
/// see the final landing URL. No retries are attempted.
#[derive(Debug, Clone)]
pub struct ExistenceChecker {
    client: Client,
    config: CheckConfig,
}

impl ExistenceChecker {
    /// Creates a checker with the configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: CheckConfig) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Checks whether the retailer currently carries `identifier`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::EmptyIdentifier`] for blank input.
    /// - [`ScraperError::InvalidUrl`] if a direct identifier is not a URL.
    /// - [`ScraperError::Http`] on connect failure or timeout.
    /// - [`ScraperError::SearchStatus`] when a marker search answers >= 300.
    pub async fn check_existence(&self, identifier: &str) -> Result<CheckResult, ScraperError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(ScraperError::EmptyIdentifier);
        }
        let url = self.request_url(identifier)?;

        match &self.config.detection {
            Detection::Status { product_pattern } => {
                let response = self.client.get(&url).send().await?;
                let status = response.status().as_u16();
                let final_url = response.url().to_string();
                tracing::debug!(
                    retailer = %self.config.retailer,
                    url = %url,
                    final_url = %final_url,
                    status,
                    "product page response"
                );
                Ok(classify_status(status, &final_url, product_pattern))
            }
            Detection::Marker { marker_template } => {
                let response = self.client.get(&url).send().await?;
                let status = response.status();
                if status.as_u16() >= 300 {
                    return Err(ScraperError::SearchStatus {
                        status: status.as_u16(),
                        url,
                    });
                }
                let body = response.text().await?;
                tracing::debug!(
                    retailer = %self.config.retailer,
                    url = %url,
                    bytes = body.len(),
                    "search response"
                );
                Ok(classify_marker_body(
                    &body,
                    identifier,
                    marker_template,
                    &self.config.origin,
                ))
            }
        }
    }

    /// Builds the request URL for an identifier.
    ///
    /// Templated identifiers are percent-encoded before substitution so a
    /// SKU containing `&` or spaces cannot break the query string.
    pub(crate) fn request_url(&self, identifier: &str) -> Result<String, ScraperError> {
        match &self.config.url {
            UrlStrategy::Direct => {
                let parsed =
                    reqwest::Url::parse(identifier).map_err(|e| ScraperError::InvalidUrl {
                        url: identifier.to_owned(),
                        reason: e.to_string(),
                    })?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(ScraperError::InvalidUrl {
                        url: identifier.to_owned(),
                        reason: format!("unsupported scheme '{}'", parsed.scheme()),
                    });
                }
                Ok(parsed.to_string())
            }
            UrlStrategy::Templated(template) => {
                let encoded = utf8_percent_encode(identifier, NON_ALPHANUMERIC).to_string();
                Ok(render_template(template, &encoded))
            }
        }
    }
}
