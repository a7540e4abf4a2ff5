//! `warm-cookies` command: seed cookies for each egress IP by running one
//! detail scrape per IP through a freshly started scraper service.

use std::path::Path;
use std::time::Duration;

use shelfcheck_core::AppConfig;
use shelfcheck_scraper::{submit_job, with_service, ScrapeJob};

/// A visible-browser detail scrape can take far longer than a plain GET.
const JOB_TIMEOUT_SECS: u64 = 300;

/// Warm up every IP listed in `ips_path`, one service lifetime per IP.
///
/// The first failing IP stops the run; the service started for it is torn
/// down before the error is returned.
///
/// # Errors
///
/// Returns an error if the IP list cannot be read, the storage directory
/// cannot be cleared, or the service fails to start or rejects the job.
pub(crate) async fn run_warm_cookies(
    config: &AppConfig,
    ips_path: &Path,
    product_url: &str,
    job_id: Option<&str>,
    storage_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let ips = shelfcheck_core::load_identifiers(ips_path)?;
    if ips.is_empty() {
        anyhow::bail!("no IPs listed in {}", ips_path.display());
    }

    let job_id = job_id.map_or_else(default_job_id, str::to_owned);
    let env = config.env.to_string();
    let warmup = Duration::from_secs(config.scraper_service_warmup_secs);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(JOB_TIMEOUT_SECS))
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;

    for (index, ip) in ips.iter().enumerate() {
        if let Some(dir) = storage_dir {
            clear_storage_dir(dir)?;
        }

        tracing::info!(ip = %ip, job_id = %job_id, "starting scraper service");
        let job = ScrapeJob::cookie_warmup(product_url, ip, &job_id, &env);
        let body = with_service(&config.scraper_service_command, warmup, || {
            submit_job(&client, &config.scraper_service_url, &job)
        })
        .await
        .map_err(|e| anyhow::anyhow!("cookie warm-up failed for {ip}: {e}"))?;

        tracing::debug!(ip = %ip, response = %body, "scrape job accepted");
        println!("warmed {ip} ({}/{})", index + 1, ips.len());
    }

    Ok(())
}

fn default_job_id() -> String {
    format!("job_warmup_{}", uuid::Uuid::new_v4().simple())
}

/// Remove the browser storage directory so the next service start begins
/// without cookies. A missing directory is fine.
pub(crate) fn clear_storage_dir(dir: &Path) -> anyhow::Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {
            tracing::debug!(dir = %dir.display(), "cleared browser storage");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(anyhow::anyhow!(
            "failed to clear storage dir {}: {e}",
            dir.display()
        )),
    }
}
