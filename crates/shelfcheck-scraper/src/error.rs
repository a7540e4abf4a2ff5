use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search request failed with HTTP status {status}: {url}")]
    SearchStatus { status: u16, url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("identifier must be non-empty")]
    EmptyIdentifier,

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid product pattern \"{pattern}\" for retailer {retailer}: {source}")]
    InvalidPattern {
        retailer: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to start scraper service `{command}`: {source}")]
    ServiceSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("scraper service `{command}` exited during warm-up ({status})")]
    ServiceExited { command: String, status: String },

    #[error("failed to stop scraper service `{command}`: {source}")]
    ServiceShutdown {
        command: String,
        #[source]
        source: std::io::Error,
    },
}
