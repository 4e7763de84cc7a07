//! Gameplay database localization rewrite
//!
//! Replaces `LOC_*` tags stored in a gameplay database with their text in
//! one target language, read from a companion localization database
//! (`LocalizedText(Language, Tag, Text)`).
//!
//! The source database is never modified: it is copied to
//! `<stem>_<language><.ext>` and the copy is rewritten. Tags that cannot be
//! translated, and translations that would collide with a value already
//! in the column, are left as-is and recorded in `auto_translate.log`
//! beside the copy.

use crate::db::{self, quote_ident, ColumnInfo};
use crate::error::{Result, RewriteError};
use crate::text::clean_text;
use sqlx::error::ErrorKind;
use sqlx::sqlite::SqliteConnection;
use sqlx::Connection;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use wemkit_common::config::LocalizationConfig;
use wemkit_common::fs::file_stem;
use wemkit_common::human_time::format_elapsed;

/// Log file written beside the rewritten copy
pub const LOG_FILE_NAME: &str = "auto_translate.log";

/// Parameters of one rewrite
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteOptions {
    pub target_language: String,
    pub gameplay_db: PathBuf,
    pub localization_db: PathBuf,
    /// Candidate rows per transaction
    pub batch_size: usize,
}

impl From<&LocalizationConfig> for RewriteOptions {
    fn from(config: &LocalizationConfig) -> Self {
        Self {
            target_language: config.target_language.clone(),
            gameplay_db: config.gameplay_db.clone(),
            localization_db: config.localization_db.clone(),
            batch_size: config.batch_size.max(1),
        }
    }
}

/// What one rewrite did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewriteReport {
    pub output_path: PathBuf,
    pub log_path: PathBuf,
    pub tables_scanned: usize,
    /// Tables skipped because they have no rowid
    pub tables_skipped: usize,
    /// Columns that held at least one `LOC_` value
    pub columns_rewritten: usize,
    pub rows_updated: usize,
    pub unresolved: usize,
    pub conflicts: usize,
}

/// `<dir>/<stem>_<language><.ext>` next to `source`
pub fn destination_path(source: &Path, language: &str) -> PathBuf {
    let stem = file_stem(source);
    let file_name = match source.extension() {
        Some(ext) => format!("{}_{}.{}", stem, language, ext.to_string_lossy()),
        None => format!("{}_{}", stem, language),
    };
    source.with_file_name(file_name)
}

/// Copy `source` to its language-specific destination, replacing any
/// previous copy
pub async fn create_output_copy(source: &Path, language: &str) -> Result<PathBuf> {
    let destination = destination_path(source, language);
    match tokio::fs::remove_file(&destination).await {
        Ok(()) => debug!("Removed previous copy {}", destination.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(RewriteError::io(&destination, e)),
    }
    tokio::fs::copy(source, &destination)
        .await
        .map_err(|e| RewriteError::io(&destination, e))?;
    info!("Created {}", destination.display());
    Ok(destination)
}

/// Append-only record of skipped substitutions
struct RewriteLog {
    path: PathBuf,
    file: tokio::fs::File,
}

impl RewriteLog {
    async fn open(path: PathBuf) -> Result<Self> {
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| RewriteError::io(&path, e))?;
        Ok(Self { path, file })
    }

    /// Log write failures are reported but never abort the rewrite
    async fn record(&mut self, mut line: String) {
        line.push('\n');
        if let Err(e) = self.file.write_all(line.as_bytes()).await {
            warn!(path = %self.path.display(), error = %e, "Failed to append to rewrite log");
        }
    }

    async fn finish(mut self) {
        if let Err(e) = self.file.flush().await {
            warn!(path = %self.path.display(), error = %e, "Failed to flush rewrite log");
        }
    }
}

/// Run the whole rewrite and return what it did
pub async fn translate_to_language(options: &RewriteOptions) -> Result<RewriteReport> {
    let start = Instant::now();

    let gameplay_db = absolute(&options.gameplay_db).await?;
    let localization_db = absolute(&options.localization_db).await?;
    let output_path = create_output_copy(&gameplay_db, &options.target_language).await?;

    let log_path = output_path
        .parent()
        .map(|dir| dir.join(LOG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME));
    let mut log = RewriteLog::open(log_path.clone()).await?;

    let mut report = RewriteReport {
        output_path: output_path.clone(),
        log_path,
        ..Default::default()
    };

    let mut conn = db::connect(&output_path).await?;
    db::apply_bulk_pragmas(&mut conn).await?;
    attach_localization(&mut conn, &localization_db, &options.target_language).await?;

    let result = rewrite_tables(&mut conn, options, &mut log, &mut report).await;

    // Detach even when a table failed so the copy is left consistent
    if let Err(e) = sqlx::query("DETACH DATABASE loc").execute(&mut conn).await {
        warn!(error = %e, "Failed to detach localization database");
    }
    log.finish().await;
    db::close(conn).await?;
    result?;

    info!(
        "Rewrote {} rows in {} columns across {} tables ({} unresolved, {} conflicts) in {}",
        report.rows_updated,
        report.columns_rewritten,
        report.tables_scanned,
        report.unresolved,
        report.conflicts,
        format_elapsed(start.elapsed())
    );
    Ok(report)
}

async fn absolute(path: &Path) -> Result<PathBuf> {
    tokio::fs::canonicalize(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RewriteError::NotFound(path.to_path_buf())
        } else {
            RewriteError::io(path, e)
        }
    })
}

/// Attach the localization database and build the `temp.loc_map` lookup
/// table for `language`
async fn attach_localization(conn: &mut SqliteConnection, localization_db: &Path, language: &str) -> Result<()> {
    sqlx::query("ATTACH DATABASE ? AS loc")
        .bind(localization_db.to_string_lossy().into_owned())
        .execute(&mut *conn)
        .await?;

    sqlx::query("DROP TABLE IF EXISTS temp.loc_map")
        .execute(&mut *conn)
        .await?;
    sqlx::query("CREATE TEMP TABLE loc_map (Tag TEXT PRIMARY KEY, Text TEXT)")
        .execute(&mut *conn)
        .await?;
    let loaded = sqlx::query(
        r#"
        INSERT OR REPLACE INTO temp.loc_map (Tag, Text)
        SELECT Tag, Text
        FROM loc.LocalizedText
        WHERE Language = ?
        "#,
    )
    .bind(language)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    info!("Loaded {} {} translations", loaded, language);
    if loaded == 0 {
        warn!(language, "Localization database has no text for this language");
    }
    Ok(())
}

async fn rewrite_tables(
    conn: &mut SqliteConnection,
    options: &RewriteOptions,
    log: &mut RewriteLog,
    report: &mut RewriteReport,
) -> Result<()> {
    let tables = db::list_tables(conn).await?;
    info!("{} tables to scan", tables.len());

    for table in tables {
        if db::is_without_rowid(conn, &table).await? {
            warn!(table = %table, "Table has no rowid, skipping");
            report.tables_skipped += 1;
            continue;
        }
        report.tables_scanned += 1;

        for column in db::text_columns(conn, &table).await? {
            if !has_loc_values(conn, &table, &column).await? {
                continue;
            }
            report.columns_rewritten += 1;
            let updated = rewrite_column(conn, &table, &column, options, log, report).await?;
            if updated > 0 {
                info!("Updated {} rows in {}.{}", updated, table, column.name);
            }
        }
    }
    Ok(())
}

async fn has_loc_values(conn: &mut SqliteConnection, table: &str, column: &ColumnInfo) -> Result<bool> {
    let sql = format!(
        "SELECT 1 FROM {} WHERE {} LIKE 'LOC_%' LIMIT 1",
        quote_ident(table),
        quote_ident(&column.name)
    );
    let hit: Option<i64> = sqlx::query_scalar(&sql).fetch_optional(&mut *conn).await?;
    Ok(hit.is_some())
}

/// How every row holding one tag is rewritten within a column
#[derive(Debug, Clone, PartialEq)]
enum TagDecision {
    Translate(String),
    /// No translation, or a blank one
    Unresolved,
    /// The cleaned translation is already a value of the column
    Collides(String),
}

/// Decide a tag on first sight, before any row holding it is rewritten
async fn decide_tag(conn: &mut SqliteConnection, tag: &str, exists_sql: &str) -> Result<TagDecision> {
    let translation: Option<String> = sqlx::query_scalar::<_, Option<String>>(
        "SELECT Text FROM temp.loc_map WHERE Tag = ?",
    )
    .bind(tag)
    .fetch_optional(&mut *conn)
    .await?
    .flatten()
    .filter(|text| !text.trim().is_empty());

    let Some(translation) = translation else {
        return Ok(TagDecision::Unresolved);
    };

    let cleaned = clean_text(&translation);
    let collides: Option<i64> = sqlx::query_scalar(exists_sql)
        .bind(&cleaned)
        .fetch_optional(&mut *conn)
        .await?;
    if collides.is_some() {
        return Ok(TagDecision::Collides(cleaned));
    }
    Ok(TagDecision::Translate(translation))
}

/// Walk `LOC_` rows of one column in rowid order, one transaction per batch.
/// Each distinct tag is decided once and that decision applies to every
/// row carrying it. Returns the number of rows updated.
async fn rewrite_column(
    conn: &mut SqliteConnection,
    table: &str,
    column: &ColumnInfo,
    options: &RewriteOptions,
    log: &mut RewriteLog,
    report: &mut RewriteReport,
) -> Result<usize> {
    let q_table = quote_ident(table);
    let q_col = quote_ident(&column.name);

    let select_batch = format!(
        "SELECT rowid, CAST({q_col} AS TEXT) FROM {q_table} \
         WHERE rowid > ? AND {q_col} LIKE 'LOC_%' ORDER BY rowid LIMIT ?"
    );
    let exists_sql = format!("SELECT 1 FROM {q_table} WHERE {q_col} = ? LIMIT 1");
    let update_sql = format!("UPDATE {q_table} SET {q_col} = ? WHERE rowid = ?");

    let batch_size = options.batch_size.max(1) as i64;
    let mut last_rowid: i64 = i64::MIN;
    let mut updated = 0usize;
    let mut decisions: HashMap<String, TagDecision> = HashMap::new();

    loop {
        let batch: Vec<(i64, String)> = sqlx::query_as(&select_batch)
            .bind(last_rowid)
            .bind(batch_size)
            .fetch_all(&mut *conn)
            .await?;
        let Some(&(last, _)) = batch.last() else {
            break;
        };
        last_rowid = last;

        let mut tx = conn.begin().await?;
        for (rowid, tag) in batch {
            let decision = match decisions.get(&tag) {
                Some(decision) => decision.clone(),
                None => {
                    let decision = decide_tag(&mut *tx, &tag, &exists_sql).await?;
                    decisions.insert(tag.clone(), decision.clone());
                    decision
                }
            };

            let translation = match decision {
                TagDecision::Translate(translation) => translation,
                TagDecision::Unresolved => {
                    report.unresolved += 1;
                    debug!(table, column = %column.name, tag = %tag, "No translation");
                    log.record(format!(
                        "[unresolved] {}.{} rowid={} value={}: no {} translation, left unchanged",
                        table, column.name, rowid, tag, options.target_language
                    ))
                    .await;
                    continue;
                }
                TagDecision::Collides(cleaned) => {
                    report.conflicts += 1;
                    warn!(table, column = %column.name, tag = %tag, "Translation collides with existing value");
                    log.record(format!(
                        "[conflict] {}.{} rowid={} value={}: '{}' already present in column, left unchanged",
                        table, column.name, rowid, tag, cleaned
                    ))
                    .await;
                    continue;
                }
            };

            match sqlx::query(&update_sql)
                .bind(&translation)
                .bind(rowid)
                .execute(&mut *tx)
                .await
            {
                Ok(result) => updated += result.rows_affected() as usize,
                Err(sqlx::Error::Database(e)) if !matches!(e.kind(), ErrorKind::Other) => {
                    report.conflicts += 1;
                    warn!(table, column = %column.name, tag = %tag, error = %e, "Update rejected by constraint");
                    log.record(format!(
                        "[conflict] {}.{} rowid={} value={}: {}, left unchanged",
                        table, column.name, rowid, tag, e
                    ))
                    .await;
                }
                Err(e) => return Err(e.into()),
            }
        }
        tx.commit().await?;
    }

    report.rows_updated += updated;
    Ok(updated)
}
