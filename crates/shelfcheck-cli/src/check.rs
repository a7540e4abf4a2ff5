//! `check` command: run one retailer's existence check over an identifier
//! list and write the found / not-found partitions.

use std::path::{Path, PathBuf};
use std::time::Duration;

use shelfcheck_core::AppConfig;
use shelfcheck_scraper::{check_all, CheckConfig, ExistenceChecker, ResultSet};

#[derive(Debug)]
pub(crate) struct CheckArgs {
    pub retailer: String,
    pub input: PathBuf,
    pub found_out: PathBuf,
    pub not_found_out: PathBuf,
    pub delay_ms: Option<u64>,
    pub dry_run: bool,
}

/// Run the batch for `args.retailer` and write both partitions.
///
/// When the batch aborts, the partitions for the identifiers checked so far
/// are still written before the abort error is returned.
///
/// # Errors
///
/// Returns an error if the retailer is unknown, a file cannot be read or
/// written, the checker cannot be built, or the batch aborts.
pub(crate) async fn run_check(config: &AppConfig, args: &CheckArgs) -> anyhow::Result<()> {
    let retailers = shelfcheck_core::load_retailers(&config.retailers_path)?;
    let Some(retailer) = retailers.find(&args.retailer) else {
        let known: Vec<&str> = retailers.retailers.iter().map(|r| r.name.as_str()).collect();
        anyhow::bail!(
            "retailer '{}' not found in {}; configured: [{}]",
            args.retailer,
            config.retailers_path.display(),
            known.join(", ")
        );
    };

    let identifiers = shelfcheck_core::load_identifiers(&args.input)?;
    let delay = Duration::from_millis(args.delay_ms.unwrap_or(config.inter_request_delay_ms));

    if args.dry_run {
        println!(
            "dry-run: would check {} identifiers against {} ({}) with a {}ms delay",
            identifiers.len(),
            retailer.name,
            retailer.strategy_label(),
            delay.as_millis()
        );
        return Ok(());
    }

    let check_config =
        CheckConfig::from_retailer(retailer, &config.user_agent, config.request_timeout_secs)?;
    let checker = ExistenceChecker::new(check_config)?;

    tracing::info!(
        retailer = %retailer.name,
        strategy = retailer.strategy_label(),
        identifiers = identifiers.len(),
        "starting existence check"
    );

    match check_all(&checker, &identifiers, delay).await {
        Ok(results) => {
            report(&results, &args.found_out, &args.not_found_out)?;
            Ok(())
        }
        Err(aborted) => {
            report(&aborted.completed, &args.found_out, &args.not_found_out)?;
            Err(aborted.into())
        }
    }
}

fn report(results: &ResultSet, found_out: &Path, not_found_out: &Path) -> anyhow::Result<()> {
    let summary = results.summary();
    println!(
        "Total products found: {} out of {}",
        summary.found, summary.total
    );
    write_partitions(results, found_out, not_found_out)
}

/// Write found URLs and unresolved identifiers, one per line.
pub(crate) fn write_partitions(
    results: &ResultSet,
    found_out: &Path,
    not_found_out: &Path,
) -> anyhow::Result<()> {
    write_lines(found_out, results.found().map(|(_, url)| url))?;
    write_lines(
        not_found_out,
        results.unresolved().map(|o| o.identifier.as_str()),
    )?;
    tracing::info!(
        found_out = %found_out.display(),
        not_found_out = %not_found_out.display(),
        "wrote result partitions"
    );
    Ok(())
}

fn write_lines<'a>(path: &Path, lines: impl Iterator<Item = &'a str>) -> anyhow::Result<()> {
    let mut content = String::new();
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    std::fs::write(path, content)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))
}
