//! Sequential batch driver with a fixed politeness delay.

use std::time::Duration;

use thiserror::Error;

use crate::checker::ExistenceChecker;
use crate::error::ScraperError;
use crate::types::{CheckResult, ResultSet};

/// A batch stopped on a transport failure. `completed` holds every verdict
/// reached before the failing identifier, in input order.
#[derive(Debug, Error)]
#[error("check aborted at \"{identifier}\" after {} completed checks: {source}", .completed.len())]
pub struct BatchAborted {
    pub completed: ResultSet,
    pub identifier: String,
    #[source]
    pub source: ScraperError,
}

/// Checks every identifier in order, sleeping `delay` between requests.
///
/// The delay is applied after every request except the last. The first
/// error stops the batch: no retry, no skipping ahead.
///
/// # Errors
///
/// Returns [`BatchAborted`] carrying the partial [`ResultSet`] if any check
/// fails.
pub async fn check_all<I, S>(
    checker: &ExistenceChecker,
    identifiers: I,
    delay: Duration,
) -> Result<ResultSet, BatchAborted>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let retailer = checker.config().retailer.as_str();
    let mut results = ResultSet::new();
    let mut is_first = true;

    for identifier in identifiers {
        let identifier = identifier.as_ref();

        if !is_first && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        is_first = false;

        match checker.check_existence(identifier).await {
            Ok(result) => {
                log_result(retailer, identifier, &result);
                results.push(identifier, result);
            }
            Err(source) => {
                tracing::error!(
                    retailer,
                    identifier,
                    completed = results.len(),
                    error = %source,
                    "existence check failed, aborting batch"
                );
                return Err(BatchAborted {
                    completed: results,
                    identifier: identifier.to_owned(),
                    source,
                });
            }
        }
    }

    let summary = results.summary();
    tracing::info!(
        retailer,
        found = summary.found,
        not_found = summary.not_found,
        ambiguous = summary.ambiguous,
        total = summary.total,
        "existence check finished"
    );
    Ok(results)
}

fn log_result(retailer: &str, identifier: &str, result: &CheckResult) {
    match result {
        CheckResult::Found { url } => {
            tracing::info!(retailer, identifier, url = %url, "product found");
        }
        CheckResult::NotFound => {
            tracing::warn!(retailer, identifier, "product not found");
        }
        CheckResult::Ambiguous {
            status: Some(status),
        } => {
            tracing::warn!(
                retailer,
                identifier,
                status = *status,
                "unexpected status code, inspect manually"
            );
        }
        CheckResult::Ambiguous { status: None } => {
            tracing::warn!(
                retailer,
                identifier,
                "search marker present but no product uri, site markup may have changed"
            );
        }
    }
}
