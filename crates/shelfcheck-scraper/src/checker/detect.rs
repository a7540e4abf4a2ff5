//! Response classification, kept free of I/O so fixtures can drive it directly.

use std::sync::LazyLock;

use regex::Regex;
use shelfcheck_core::IDENTIFIER_PLACEHOLDER;

use crate::types::CheckResult;

/// First product URI in a search-results payload: `"uri":"\/mobler\/...\/p-123"`.
static PRODUCT_URI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""uri":"(\\/[^"]+)""#).expect("valid product uri regex"));

/// Classifies a direct product-page request from its status and the final
/// URL after redirects.
///
/// 404 is a confirmed absence. Any other non-2xx status is ambiguous. A 2xx
/// response counts as found only when the final URL looks like a product
/// page; landing anywhere else (category page, start page) is ambiguous.
pub(crate) fn classify_status(status: u16, final_url: &str, product_pattern: &Regex) -> CheckResult {
    if status == 404 {
        return CheckResult::NotFound;
    }
    if !(200..300).contains(&status) {
        return CheckResult::Ambiguous {
            status: Some(status),
        };
    }
    if product_pattern.is_match(final_url) {
        return CheckResult::Found {
            url: final_url.to_owned(),
        };
    }
    CheckResult::Ambiguous {
        status: Some(status),
    }
}

/// Classifies a search-results body by looking for the SKU marker and then
/// the first product URI.
///
/// `origin` must already be normalized (no trailing slash).
pub(crate) fn classify_marker_body(
    body: &str,
    identifier: &str,
    marker_template: &str,
    origin: &str,
) -> CheckResult {
    let marker = render_template(marker_template, identifier);
    if !body.contains(&marker) {
        return CheckResult::NotFound;
    }
    match extract_product_uri(body) {
        Some(uri) => CheckResult::Found {
            url: format!("{origin}{uri}"),
        },
        None => CheckResult::Ambiguous { status: None },
    }
}

/// Returns the first product URI in `body` with JSON-escaped slashes undone.
pub(crate) fn extract_product_uri(body: &str) -> Option<String> {
    PRODUCT_URI_RE
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace("\\/", "/"))
}

pub(crate) fn render_template(template: &str, value: &str) -> String {
    template.replace(IDENTIFIER_PLACEHOLDER, value)
}

#[cfg(test)]
#[path = "detect_test.rs"]
mod tests;
