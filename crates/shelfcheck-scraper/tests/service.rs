//! Scraper-service collaborator: job submission against a mock service and
//! process teardown on every exit path.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shelfcheck_scraper::{submit_job, with_service, ScrapeJob, ScraperError, ServiceProcess};

fn warmup_job() -> ScrapeJob {
    ScrapeJob::cookie_warmup(
        "https://www.wayfair.de/moebel/pdp/sofa-d110017167.html",
        "185.228.18.69",
        "job_warmup_test",
        "production",
    )
}

#[tokio::test]
async fn submit_job_posts_json_and_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scrapeDetails"))
        .and(body_partial_json(json!({
            "launchOptions": { "ip": "185.228.18.69" },
            "jobContext": { "jobId": "job_warmup_test", "skipPublishing": true }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status":"ok"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let body = submit_job(&client, &format!("{}/", server.uri()), &warmup_job())
        .await
        .expect("submit should succeed");
    assert_eq!(body, r#"{"status":"ok"}"#);
}

#[tokio::test]
async fn submit_job_non_success_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scrapeDetails"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let err = submit_job(&client, &server.uri(), &warmup_job())
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::UnexpectedStatus { status: 502, .. }),
        "got: {err:?}"
    );
}

#[cfg(unix)]
#[tokio::test]
async fn spawned_service_is_running_until_shutdown() {
    let service = ServiceProcess::spawn("sleep 30", Duration::from_millis(50))
        .await
        .expect("sleep should start");
    assert!(service.id().is_some());
    service.shutdown().await.expect("shutdown should succeed");
}

#[cfg(unix)]
#[tokio::test]
async fn service_that_exits_during_warmup_is_reported() {
    let err = ServiceProcess::spawn("true", Duration::from_millis(300))
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::ServiceExited { .. }), "got: {err:?}");
}

#[tokio::test]
async fn unknown_program_fails_to_spawn() {
    let err = ServiceProcess::spawn("shelfcheck-no-such-binary --port 8080", Duration::ZERO)
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::ServiceSpawn { ref command, .. } if command.starts_with("shelfcheck-no-such-binary")),
        "got: {err:?}"
    );
}

#[cfg(unix)]
#[tokio::test]
async fn with_service_returns_work_result_and_tears_down() {
    let value = with_service("sleep 30", Duration::ZERO, || async { Ok(7) })
        .await
        .expect("work should succeed");
    assert_eq!(value, 7);
}

#[cfg(unix)]
#[tokio::test]
async fn with_service_propagates_work_error() {
    let err = with_service("sleep 30", Duration::ZERO, || async {
        Err::<(), _>(ScraperError::EmptyIdentifier)
    })
    .await
    .unwrap_err();
    assert!(matches!(err, ScraperError::EmptyIdentifier), "got: {err:?}");
}

/// Live, non-zombie process check via procfs.
#[cfg(target_os = "linux")]
fn is_running(pid: i32) -> bool {
    std::fs::read_to_string(format!("/proc/{pid}/stat")).is_ok_and(|stat| {
        stat.rsplit_once(") ")
            .is_some_and(|(_, rest)| !rest.starts_with('Z'))
    })
}

/// Starts a shell that forks a long `sleep` and records its pid, the way
/// `npm run dev` forks the actual server.
#[cfg(target_os = "linux")]
async fn spawn_forking_service(dir: &std::path::Path) -> (ServiceProcess, i32) {
    let pid_file = dir.join("server.pid");
    let command = format!("sh -c 'sleep 300 & echo $! > {}; wait'", pid_file.display());
    let service = ServiceProcess::spawn(&command, Duration::from_millis(200))
        .await
        .expect("shell should start");

    for _ in 0..50 {
        if let Ok(text) = std::fs::read_to_string(&pid_file) {
            if let Ok(pid) = text.trim().parse::<i32>() {
                return (service, pid);
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("forked server never wrote its pid");
}

#[cfg(target_os = "linux")]
async fn wait_until_stopped(pid: i32) -> bool {
    for _ in 0..50 {
        if !is_running(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn shutdown_kills_processes_forked_by_the_service() {
    let dir = tempfile::tempdir().unwrap();
    let (service, server_pid) = spawn_forking_service(dir.path()).await;
    assert!(is_running(server_pid));

    service.shutdown().await.expect("shutdown should succeed");

    assert!(
        wait_until_stopped(server_pid).await,
        "forked server {server_pid} still running after shutdown"
    );
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn dropping_the_guard_kills_processes_forked_by_the_service() {
    let dir = tempfile::tempdir().unwrap();
    let (service, server_pid) = spawn_forking_service(dir.path()).await;
    assert!(is_running(server_pid));

    drop(service);

    assert!(
        wait_until_stopped(server_pid).await,
        "forked server {server_pid} still running after drop"
    );
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn with_service_tears_down_forked_processes_on_work_error() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("server.pid");
    let command = format!("sh -c 'sleep 300 & echo $! > {}; wait'", pid_file.display());

    let err = with_service(&command, Duration::from_millis(300), || async {
        Err::<(), _>(ScraperError::EmptyIdentifier)
    })
    .await
    .unwrap_err();
    assert!(matches!(err, ScraperError::EmptyIdentifier), "got: {err:?}");

    let server_pid: i32 = std::fs::read_to_string(&pid_file)
        .expect("server pid recorded during warm-up")
        .trim()
        .parse()
        .unwrap();
    assert!(wait_until_stopped(server_pid).await);
}

#[tokio::test]
async fn quoted_arguments_reach_the_service_intact() {
    let err = ServiceProcess::spawn("'shelfcheck no such binary' --flag", Duration::ZERO)
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::ServiceSpawn { ref command, ref source }
            if command.starts_with("'shelfcheck") && source.kind() == std::io::ErrorKind::NotFound),
        "got: {err:?}"
    );
}
