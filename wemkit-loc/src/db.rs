//! SQLite helpers for the rewrite pass
//!
//! The rewrite uses one connection for its whole lifetime: the attached
//! localization database and the temporary lookup table only exist on the
//! connection that created them.

use crate::error::{Result, RewriteError};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use std::path::Path;
use tracing::debug;

/// Column information from `pragma_table_info`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ColumnInfo {
    pub cid: i64,
    pub name: String,
    pub r#type: String,
    pub pk: i64,
}

impl ColumnInfo {
    /// Declared type contains TEXT, or no type was declared
    pub fn may_hold_text(&self) -> bool {
        let declared = self.r#type.to_uppercase();
        declared.is_empty() || declared.contains("TEXT")
    }
}

/// Open an existing database file read-write
pub async fn connect(path: &Path) -> Result<SqliteConnection> {
    if !path.is_file() {
        return Err(RewriteError::NotFound(path.to_path_buf()));
    }
    let conn = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(false)
        .connect()
        .await?;
    debug!("Opened database: {}", path.display());
    Ok(conn)
}

/// Settings for large batched updates on a private copy
pub async fn apply_bulk_pragmas(conn: &mut SqliteConnection) -> Result<()> {
    for pragma in [
        "PRAGMA journal_mode = WAL",
        "PRAGMA synchronous = NORMAL",
        "PRAGMA temp_store = MEMORY",
        "PRAGMA foreign_keys = OFF",
    ] {
        sqlx::query(pragma).execute(&mut *conn).await?;
    }
    Ok(())
}

/// Quote an SQLite identifier
///
/// ```
/// assert_eq!(wemkit_loc::db::quote_ident(r#"Odd"Name"#), r#""Odd""Name""#);
/// ```
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// User tables of the main schema in alphabetical order
pub async fn list_tables(conn: &mut SqliteConnection) -> Result<Vec<String>> {
    let tables = sqlx::query_scalar::<_, String>(
        r#"
        SELECT name
        FROM main.sqlite_master
        WHERE type = 'table'
          AND name NOT LIKE 'sqlite_%'
        ORDER BY name ASC
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(tables)
}

/// Whether `table` was declared `WITHOUT ROWID`
pub async fn is_without_rowid(conn: &mut SqliteConnection, table: &str) -> Result<bool> {
    let sql: Option<String> = sqlx::query_scalar(
        "SELECT sql FROM main.sqlite_master WHERE type = 'table' AND name = ?",
    )
    .bind(table)
    .fetch_optional(&mut *conn)
    .await?
    .flatten();

    Ok(sql
        .map(|s| s.to_uppercase().contains("WITHOUT ROWID"))
        .unwrap_or(false))
}

pub async fn table_columns(conn: &mut SqliteConnection, table: &str) -> Result<Vec<ColumnInfo>> {
    let columns = sqlx::query_as::<_, ColumnInfo>(
        "SELECT cid, name, type, pk FROM pragma_table_info(?) ORDER BY cid",
    )
    .bind(table)
    .fetch_all(&mut *conn)
    .await?;
    Ok(columns)
}

/// Columns of `table` that may hold text
pub async fn text_columns(conn: &mut SqliteConnection, table: &str) -> Result<Vec<ColumnInfo>> {
    Ok(table_columns(conn, table)
        .await?
        .into_iter()
        .filter(ColumnInfo::may_hold_text)
        .collect())
}

/// Close the connection, flushing WAL state
pub async fn close(conn: SqliteConnection) -> Result<()> {
    conn.close().await?;
    Ok(())
}
