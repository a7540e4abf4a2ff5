mod check;
mod import;
mod warm_cookies;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shelfcheck")]
#[command(about = "Check which products a retailer currently carries")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check every identifier in a list against one retailer
    Check {
        /// Retailer name as configured in the retailers file
        #[arg(long)]
        retailer: String,
        /// Newline-delimited file of SKUs or product URLs
        #[arg(long)]
        input: PathBuf,
        /// Where to write the URLs of found products
        #[arg(long, default_value = "products_found.txt")]
        found_out: PathBuf,
        /// Where to write identifiers that were not found or need inspection
        #[arg(long, default_value = "products_not_found.txt")]
        not_found_out: PathBuf,
        /// Pause between requests; overrides `SHELFCHECK_INTER_REQUEST_DELAY_MS`
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Print what would be checked without sending any requests
        #[arg(long)]
        dry_run: bool,
    },
    /// List configured retailers and their check strategies
    Retailers,
    /// Seed cookies for each egress IP through the scraper service
    WarmCookies {
        /// Newline-delimited file of egress IPs
        #[arg(long)]
        ips: PathBuf,
        /// Product page to request through every IP
        #[arg(long)]
        url: String,
        /// Job id sent to the service; a random one is generated if omitted
        #[arg(long)]
        job_id: Option<String>,
        /// Browser storage directory cleared before each service start
        #[arg(long)]
        storage_dir: Option<PathBuf>,
    },
    /// Import a spreadsheet export (.csv, .xlsx, .xls, .ods) into a new Postgres table
    Import {
        /// Export with a header row; the first worksheet is used for workbooks
        #[arg(long, alias = "csv")]
        file: PathBuf,
        /// Destination table; must not exist yet
        #[arg(long)]
        table: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = shelfcheck_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::Check {
            retailer,
            input,
            found_out,
            not_found_out,
            delay_ms,
            dry_run,
        }) => {
            check::run_check(
                &config,
                &check::CheckArgs {
                    retailer,
                    input,
                    found_out,
                    not_found_out,
                    delay_ms,
                    dry_run,
                },
            )
            .await?;
        }
        Some(Commands::Retailers) => run_retailers(&config)?,
        Some(Commands::WarmCookies {
            ips,
            url,
            job_id,
            storage_dir,
        }) => {
            warm_cookies::run_warm_cookies(
                &config,
                &ips,
                &url,
                job_id.as_deref(),
                storage_dir.as_deref(),
            )
            .await?;
        }
        Some(Commands::Import { file, table }) => import::run_import(&config, &file, &table).await?,
        None => println!("no command given; see `shelfcheck --help`"),
    }

    Ok(())
}

fn run_retailers(config: &shelfcheck_core::AppConfig) -> anyhow::Result<()> {
    let file = shelfcheck_core::load_retailers(&config.retailers_path)?;
    if file.retailers.is_empty() {
        println!("no retailers configured in {}", config.retailers_path.display());
        return Ok(());
    }
    for retailer in &file.retailers {
        println!(
            "{:<20} {:<18} {}",
            retailer.name,
            retailer.strategy_label(),
            retailer.origin
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests;
