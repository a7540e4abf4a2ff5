//! Per-identifier verdicts and the ordered result set of one run.

use std::fmt;

/// Verdict for a single identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    /// The retailer carries the product; `url` is the resolved product page.
    Found { url: String },
    /// Confirmed absence: 404, or no SKU marker in the search results.
    NotFound,
    /// Needs a human look. `status` is the literal HTTP status, or `None`
    /// when the search marker was present but no product URI could be read
    /// from the body.
    Ambiguous { status: Option<u16> },
}

impl CheckResult {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, CheckResult::Found { .. })
    }

    #[must_use]
    pub fn found_url(&self) -> Option<&str> {
        match self {
            CheckResult::Found { url } => Some(url),
            _ => None,
        }
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckResult::Found { url } => write!(f, "found ({url})"),
            CheckResult::NotFound => write!(f, "not found"),
            CheckResult::Ambiguous { status: Some(status) } => {
                write!(f, "ambiguous (HTTP {status})")
            }
            CheckResult::Ambiguous { status: None } => write!(f, "ambiguous (unrecognized markup)"),
        }
    }
}

/// One identifier paired with its verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub identifier: String,
    pub result: CheckResult,
}

/// Outcomes in input order. Duplicated identifiers appear once per input
/// occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    outcomes: Vec<CheckOutcome>,
}

impl ResultSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, identifier: impl Into<String>, result: CheckResult) {
        self.outcomes.push(CheckOutcome {
            identifier: identifier.into(),
            result,
        });
    }

    #[must_use]
    pub fn outcomes(&self) -> &[CheckOutcome] {
        &self.outcomes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// `(identifier, url)` for every found product, in input order.
    pub fn found(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|o| {
            o.result
                .found_url()
                .map(|url| (o.identifier.as_str(), url))
        })
    }

    /// Identifiers classified `NotFound` or `Ambiguous`, in input order.
    pub fn unresolved(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.result.is_found())
    }

    #[must_use]
    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            total: self.outcomes.len(),
            ..Summary::default()
        };
        for outcome in &self.outcomes {
            match outcome.result {
                CheckResult::Found { .. } => summary.found += 1,
                CheckResult::NotFound => summary.not_found += 1,
                CheckResult::Ambiguous { .. } => summary.ambiguous += 1,
            }
        }
        summary
    }
}

impl IntoIterator for ResultSet {
    type Item = CheckOutcome;
    type IntoIter = std::vec::IntoIter<CheckOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}

/// Counts per verdict. Displays as `found / total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub found: usize,
    pub not_found: usize,
    pub ambiguous: usize,
    pub total: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.found, self.total)
    }
}
