pub mod batch;
pub mod checker;
pub mod error;
pub mod service;
pub mod types;

pub use batch::{check_all, BatchAborted};
pub use checker::{CheckConfig, Detection, ExistenceChecker, UrlStrategy};
pub use error::ScraperError;
pub use service::{submit_job, with_service, ScrapeJob, ServiceProcess};
pub use types::{CheckOutcome, CheckResult, ResultSet, Summary};
