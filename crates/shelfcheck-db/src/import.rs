//! Spreadsheet import into a fresh table.
//!
//! The destination table is created by the import itself with one `TEXT`
//! column per spreadsheet column. An existing table is never touched.

use shelfcheck_core::Table;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::DbError;

/// Upper bound on rows per `INSERT` statement.
const INSERT_CHUNK_ROWS: usize = 1000;

/// Postgres caps bind parameters per statement at `u16::MAX`.
const MAX_BIND_PARAMS: usize = 65_535;

/// Postgres truncates identifiers longer than this.
const MAX_IDENT_BYTES: usize = 63;

/// Quote a Postgres identifier, doubling embedded quotes.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Rows per `INSERT` so that `rows * columns` stays under the bind limit.
#[must_use]
pub fn rows_per_insert(column_count: usize) -> usize {
    if column_count == 0 {
        return INSERT_CHUNK_ROWS;
    }
    (MAX_BIND_PARAMS / column_count).clamp(1, INSERT_CHUNK_ROWS)
}

fn validate_table_name(name: &str) -> Result<(), DbError> {
    let reason = if name.trim().is_empty() {
        Some("must be non-empty".to_string())
    } else if name.len() > MAX_IDENT_BYTES {
        Some(format!("longer than {MAX_IDENT_BYTES} bytes"))
    } else if name.contains('\0') {
        Some("contains a NUL byte".to_string())
    } else {
        None
    };
    match reason {
        Some(reason) => Err(DbError::InvalidTableName {
            name: name.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

fn create_table_sql(table_name: &str, columns: &[String]) -> String {
    let column_defs = columns
        .iter()
        .map(|c| format!("{} TEXT", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({column_defs})", quote_ident(table_name))
}

fn insert_prefix(table_name: &str, columns: &[String]) -> String {
    let column_list = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {} ({column_list}) ", quote_ident(table_name))
}

/// Import `table` into a new table `table_name`, all in one transaction.
///
/// Empty cells are stored as `NULL`. Returns the number of rows inserted.
///
/// # Errors
///
/// - [`DbError::InvalidTableName`] / [`DbError::NoColumns`] for unusable input.
/// - [`DbError::TableExists`] if `table_name` is already present.
/// - [`DbError::Sqlx`] on any database failure; nothing is committed.
pub async fn import_table(
    pool: &PgPool,
    table_name: &str,
    table: &Table,
) -> Result<u64, DbError> {
    validate_table_name(table_name)?;
    if table.columns.is_empty() {
        return Err(DbError::NoColumns);
    }

    let mut tx = pool.begin().await?;

    let existing = sqlx::query_scalar::<_, Option<String>>("SELECT to_regclass($1)::TEXT")
        .bind(quote_ident(table_name))
        .fetch_one(&mut *tx)
        .await?;
    if existing.is_some() {
        return Err(DbError::TableExists(table_name.to_owned()));
    }

    sqlx::query(&create_table_sql(table_name, &table.columns))
        .execute(&mut *tx)
        .await?;

    let prefix = insert_prefix(table_name, &table.columns);
    let mut inserted = 0u64;
    for chunk in table.rows.chunks(rows_per_insert(table.columns.len())) {
        let mut builder = QueryBuilder::<Postgres>::new(prefix.as_str());
        builder.push_values(chunk, |mut row_builder, row| {
            for cell in row {
                row_builder.push_bind(if cell.is_empty() {
                    None
                } else {
                    Some(cell.as_str())
                });
            }
        });
        inserted += builder.build().execute(&mut *tx).await?.rows_affected();
    }

    tx.commit().await?;

    tracing::info!(
        table = table_name,
        columns = table.columns.len(),
        rows = inserted,
        "table imported"
    );
    Ok(inserted)
}
