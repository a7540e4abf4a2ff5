//! Local scraping service: process lifetime guard and job submission.
//!
//! The service is an opaque HTTP server started from a shell-style command
//! line (e.g. `npm run dev`). [`ServiceProcess`] puts the child in its own
//! process group and kills the whole group when shut down or dropped, so
//! the server a launcher like `npm` forks goes down with it on every exit
//! path.

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use serde::Serialize;
use tokio::process::{Child, Command};

use crate::error::ScraperError;

/// Running scraper service. The child leads its own process group.
#[derive(Debug)]
pub struct ServiceProcess {
    child: Child,
    command: String,
    /// Process group id; taken once the group has been signalled.
    group: Option<i32>,
}

impl ServiceProcess {
    /// Starts `command_line` and waits `warmup` for it to come up.
    ///
    /// The command line is split with POSIX shell quoting rules, so
    /// `node server.js --name 'two words'` passes `two words` as one
    /// argument. No shell is involved: pipes and redirects are not
    /// interpreted.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::ServiceSpawn`] if the command is empty, badly quoted
    ///   or cannot be started.
    /// - [`ScraperError::ServiceExited`] if the process dies during warm-up.
    pub async fn spawn(command_line: &str, warmup: Duration) -> Result<Self, ScraperError> {
        let command = command_line.trim().to_owned();
        let argv = split_command(&command)?;
        let Some((program, args)) = argv.split_first() else {
            return Err(ScraperError::ServiceSpawn {
                command,
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            });
        };

        let mut std_cmd = std::process::Command::new(program);
        std_cmd.args(args).stdin(Stdio::null());
        own_process_group(&mut std_cmd);
        let child = Command::from(std_cmd)
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ScraperError::ServiceSpawn {
                command: command.clone(),
                source,
            })?;

        let group = child.id().and_then(|id| i32::try_from(id).ok());
        let mut service = Self {
            child,
            command,
            group,
        };
        tracing::info!(
            command = %service.command,
            pid = service.child.id(),
            warmup_secs = warmup.as_secs_f64(),
            "scraper service started"
        );

        if !warmup.is_zero() {
            tokio::time::sleep(warmup).await;
        }

        // On any error below the guard is dropped, which kills the group.
        match service.child.try_wait() {
            Ok(Some(status)) => Err(ScraperError::ServiceExited {
                command: service.command.clone(),
                status: status.to_string(),
            }),
            Ok(None) => Ok(service),
            Err(source) => Err(ScraperError::ServiceSpawn {
                command: service.command.clone(),
                source,
            }),
        }
    }

    /// OS process id, if the process is still running.
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Kills the service's process group and reaps the direct child.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::ServiceShutdown`] if the kill signal cannot
    /// be delivered or the process cannot be reaped.
    pub async fn shutdown(mut self) -> Result<(), ScraperError> {
        if let Err(source) = self.stop().await {
            return Err(ScraperError::ServiceShutdown {
                command: self.command.clone(),
                source,
            });
        }
        tracing::info!(command = %self.command, "scraper service stopped");
        Ok(())
    }

    async fn stop(&mut self) -> std::io::Result<()> {
        if let Some(group) = self.group.take() {
            kill_process_group(group)?;
        }
        if self.child.try_wait()?.is_none() {
            self.child.kill().await?;
        }
        Ok(())
    }
}

impl Drop for ServiceProcess {
    fn drop(&mut self) {
        // `kill_on_drop` covers the direct child; this covers what it forked.
        if let Some(group) = self.group.take() {
            if let Err(e) = kill_process_group(group) {
                tracing::warn!(
                    command = %self.command,
                    group,
                    error = %e,
                    "failed to kill scraper service process group"
                );
            }
        }
    }
}

fn split_command(command_line: &str) -> Result<Vec<String>, ScraperError> {
    shell_words::split(command_line).map_err(|e| ScraperError::ServiceSpawn {
        command: command_line.to_owned(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
    })
}

#[cfg(unix)]
fn own_process_group(cmd: &mut std::process::Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn own_process_group(_cmd: &mut std::process::Command) {}

/// SIGKILL every process in `group`. A group that is already gone is fine.
#[cfg(unix)]
fn kill_process_group(group: i32) -> std::io::Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    match killpg(Pid::from_raw(group), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(errno) => Err(errno.into()),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_group: i32) -> std::io::Result<()> {
    Ok(())
}

/// Runs `work` while the service is up and always shuts it down afterwards.
///
/// The error from `work` wins over a shutdown error.
///
/// # Errors
///
/// Propagates errors from [`ServiceProcess::spawn`], `work`, and
/// [`ServiceProcess::shutdown`].
pub async fn with_service<F, Fut, T>(
    command_line: &str,
    warmup: Duration,
    work: F,
) -> Result<T, ScraperError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let service = ServiceProcess::spawn(command_line, warmup).await?;
    let result = work().await;
    let stopped = service.shutdown().await;
    match (result, stopped) {
        (Err(e), _) | (Ok(_), Err(e)) => Err(e),
        (Ok(value), Ok(())) => Ok(value),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchOptions {
    pub ignore_variants: bool,
    pub ip: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Overrides {
    pub headless: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub job_id: String,
    pub url: String,
    pub label: String,
    pub matching_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub url: String,
    pub user_data: UserData,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobContext {
    pub job_id: String,
    pub env: String,
    pub skip_publishing: bool,
    pub scraper_category_page: String,
    pub scraper_product_page: String,
}

/// Body of `POST /scrapeDetails`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeJob {
    pub launch_options: LaunchOptions,
    pub overrides: Overrides,
    pub product_details: Vec<ProductDetail>,
    pub job_context: JobContext,
}

impl ScrapeJob {
    /// A single-product detail scrape through egress `ip` with a visible
    /// browser, used to seed that IP's cookies. Results are not published.
    #[must_use]
    pub fn cookie_warmup(product_url: &str, ip: &str, job_id: &str, env: &str) -> Self {
        Self {
            launch_options: LaunchOptions {
                ignore_variants: true,
                ip: ip.to_owned(),
            },
            overrides: Overrides { headless: false },
            product_details: vec![ProductDetail {
                url: product_url.to_owned(),
                user_data: UserData {
                    job_id: job_id.to_owned(),
                    url: String::new(),
                    label: "DETAIL".to_owned(),
                    matching_type: "non_match".to_owned(),
                },
            }],
            job_context: JobContext {
                job_id: job_id.to_owned(),
                env: env.to_owned(),
                skip_publishing: true,
                scraper_category_page: "playwright".to_owned(),
                scraper_product_page: "playwright".to_owned(),
            },
        }
    }
}

/// Submits a job to the service and returns the raw response body.
///
/// # Errors
///
/// - [`ScraperError::Http`] on network failure.
/// - [`ScraperError::UnexpectedStatus`] for any non-2xx response.
pub async fn submit_job(
    client: &reqwest::Client,
    base_url: &str,
    job: &ScrapeJob,
) -> Result<String, ScraperError> {
    let url = format!("{}/scrapeDetails", base_url.trim_end_matches('/'));
    let response = client.post(&url).json(job).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ScraperError::UnexpectedStatus {
            status: status.as_u16(),
            url,
        });
    }
    Ok(response.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_warmup_job_serializes_to_service_shape() {
        let job = ScrapeJob::cookie_warmup(
            "https://www.wayfair.de/moebel/pdp/sofa-d110017167.html",
            "185.228.18.5",
            "job_warmup_local",
            "production",
        );
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "launchOptions": { "ignoreVariants": true, "ip": "185.228.18.5" },
                "overrides": { "headless": false },
                "productDetails": [{
                    "url": "https://www.wayfair.de/moebel/pdp/sofa-d110017167.html",
                    "userData": {
                        "jobId": "job_warmup_local",
                        "url": "",
                        "label": "DETAIL",
                        "matchingType": "non_match"
                    }
                }],
                "jobContext": {
                    "jobId": "job_warmup_local",
                    "env": "production",
                    "skipPublishing": true,
                    "scraperCategoryPage": "playwright",
                    "scraperProductPage": "playwright"
                }
            })
        );
    }

    #[test]
    fn split_command_honours_quotes() {
        assert_eq!(
            split_command("node server.js --name 'two words' --port=8080").unwrap(),
            vec!["node", "server.js", "--name", "two words", "--port=8080"]
        );
        assert_eq!(split_command("npm run dev").unwrap(), vec!["npm", "run", "dev"]);
    }

    #[test]
    fn split_command_rejects_unbalanced_quote() {
        let err = split_command("node 'server.js").unwrap_err();
        assert!(matches!(err, ScraperError::ServiceSpawn { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn empty_command_is_rejected() {
        let err = ServiceProcess::spawn("   ", Duration::ZERO).await.unwrap_err();
        assert!(matches!(err, ScraperError::ServiceSpawn { .. }), "got: {err:?}");
    }
}
