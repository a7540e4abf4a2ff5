//! `import` command: load a spreadsheet export into a new Postgres table.

use std::path::Path;

use shelfcheck_core::AppConfig;

/// # Errors
///
/// Returns an error if the export cannot be read or has an unsupported
/// extension, no database is configured or reachable, or the table already
/// exists.
pub(crate) async fn run_import(
    config: &AppConfig,
    path: &Path,
    table_name: &str,
) -> anyhow::Result<()> {
    let table = shelfcheck_core::load_table(path)?;
    tracing::info!(
        path = %path.display(),
        columns = table.columns.len(),
        rows = table.row_count(),
        "loaded table"
    );

    let pool = shelfcheck_db::connect_pool_from_config(config).await?;
    let inserted = shelfcheck_db::import_table(&pool, table_name, &table).await?;
    pool.close().await;

    println!("imported {inserted} rows into {table_name}");
    Ok(())
}
