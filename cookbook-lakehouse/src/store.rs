//! DeltaStore: Core storage layer built on delta-rs
//!
//! Provides ACID writes, SQL-predicate reads, counting and paging over the
//! cookbook tables. All operations return `Result<T, CookbookError>`.
//!
//! Predicates are plain SQL `WHERE` fragments evaluated by DataFusion. Any
//! caller-supplied value must go through [`quote_literal`] before being
//! embedded in one.
//!
//! # Example
//!
//! ```rust,no_run
//! use cookbook_lakehouse::{CookbookConfig, DeltaStore};
//! use cookbook_lakehouse::store::quote_literal;
//!
//! #[tokio::main]
//! async fn main() -> cookbook_lakehouse::Result<()> {
//!     let store = DeltaStore::new(CookbookConfig::new("/data/cookbook")).await?;
//!
//!     let admins = store.count("identities", "role = 'admin'").await?;
//!     let rows = store
//!         .query("identities", &format!("address = {}", quote_literal("ana@example.com")))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use deltalake::arrow::array::{Array, Int64Array, RecordBatch, StringArray};
use deltalake::arrow::compute::cast;
use deltalake::arrow::datatypes::DataType;
use deltalake::kernel::StructField;
use deltalake::protocol::SaveMode;
use deltalake::writer::{DeltaWriter, RecordBatchWriter};
use deltalake::{open_table, DeltaTable};
use tracing::{debug, info};
use url::Url;

use crate::config::CookbookConfig;
use crate::error::{CookbookError, Result};
use crate::schema;

/// Version information from Delta transaction log
#[derive(Debug, Clone)]
pub struct VersionInfo {
    pub version: i64,
    pub timestamp: Option<i64>,
    pub operation: Option<String>,
}

/// Metrics returned by delete operations
#[derive(Debug, Clone)]
pub struct DeleteMetrics {
    pub num_deleted_rows: usize,
    pub new_version: i64,
}

/// Sort direction for paged reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Lenient parse: only `"asc"` (any case) sorts ascending
    pub fn from_str(s: &str) -> Self {
        if s.eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Offset/limit window for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub start_index: usize,
    pub limit: usize,
    pub order: SortOrder,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: usize = 9;
    pub const MAX_LIMIT: usize = 100;

    /// A zero limit falls back to the default; oversize limits are capped
    pub fn new(start_index: usize, limit: usize, order: SortOrder) -> Self {
        let limit = match limit {
            0 => Self::DEFAULT_LIMIT,
            n => n.min(Self::MAX_LIMIT),
        };
        Self {
            start_index,
            limit,
            order,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_LIMIT, SortOrder::Desc)
    }
}

/// Core Delta Lake store: manages all tables under a base path
///
/// Thread-safe: can be shared across tokio tasks via `Arc<DeltaStore>`.
pub struct DeltaStore {
    config: CookbookConfig,
}

impl DeltaStore {
    /// Create a new DeltaStore and initialize all tables
    ///
    /// Creates the directory structure and Delta tables if they don't exist.
    pub async fn new(config: CookbookConfig) -> Result<Self> {
        let store = Self { config };
        store.init_all_tables().await?;
        info!(
            path = %store.config.base_path.display(),
            "Lakehouse initialized"
        );
        Ok(store)
    }

    /// Convert a table name to a `Url` pointing at the table directory
    fn table_url(&self, name: &str) -> Result<Url> {
        let path = self.config.table_path(name);
        let path = if path.is_absolute() {
            path
        } else {
            std::env::current_dir()?.join(path)
        };
        Url::from_directory_path(&path).map_err(|_| {
            CookbookError::Config(format!("Invalid table path: {}", path.display()))
        })
    }

    /// Initialize all Delta tables (idempotent: safe to call multiple times)
    async fn init_all_tables(&self) -> Result<()> {
        for table_def in schema::all_tables() {
            self.ensure_table(
                table_def.name,
                table_def.delta_fields,
                table_def.partition_columns,
            )
            .await?;
        }
        Ok(())
    }

    /// Create a Delta table if it doesn't exist
    pub async fn ensure_table(
        &self,
        name: &str,
        fields: Vec<StructField>,
        partition_columns: Vec<String>,
    ) -> Result<()> {
        let url = self.table_url(name)?;
        let path = self.config.table_path(name);

        match open_table(url.clone()).await {
            Ok(table) => {
                debug!(table = name, version = ?table.version(), "Table already exists");
                Ok(())
            }
            Err(_) => {
                std::fs::create_dir_all(&path)?;

                let table = DeltaTable::try_from_url(url).await?;
                let mut builder = table
                    .create()
                    .with_table_name(name)
                    .with_save_mode(SaveMode::Ignore)
                    .with_columns(fields);

                if !partition_columns.is_empty() {
                    builder = builder.with_partition_columns(partition_columns);
                }

                builder.await?;
                info!(table = name, "Created Delta table");
                Ok(())
            }
        }
    }

    // ─── Write Operations ───

    /// Append records to a table (ACID transaction)
    ///
    /// Returns the new table version after the write.
    pub async fn append(&self, table_name: &str, batch: RecordBatch) -> Result<i64> {
        let url = self.table_url(table_name)?;
        let mut table = open_table(url).await?;

        let mut writer = RecordBatchWriter::for_table(&table)?;
        writer.write(batch).await?;
        let version = writer.flush_and_commit(&mut table).await?;

        debug!(table = table_name, version, "Appended records");
        Ok(version as i64)
    }

    /// Delete rows matching a SQL predicate
    pub async fn delete(&self, table_name: &str, predicate: &str) -> Result<DeleteMetrics> {
        let url = self.table_url(table_name)?;
        let table = open_table(url).await?;

        let (result_table, metrics) = table.delete().with_predicate(predicate).await?;
        let version = result_table.version().unwrap_or(-1);

        debug!(
            table = table_name,
            deleted = ?metrics.num_deleted_rows,
            version,
            "Deleted records"
        );

        Ok(DeleteMetrics {
            num_deleted_rows: metrics.num_deleted_rows,
            new_version: version,
        })
    }

    /// Rewrite columns of the rows matching a SQL predicate in one commit
    ///
    /// `assignments` pairs a column with a SQL expression, usually a
    /// [`quote_literal`] value. Returns the number of rows rewritten.
    pub async fn update(
        &self,
        table_name: &str,
        predicate: &str,
        assignments: &[(&str, String)],
    ) -> Result<usize> {
        let url = self.table_url(table_name)?;
        let table = open_table(url).await?;

        let mut builder = table.update().with_predicate(predicate);
        for (column, expression) in assignments {
            builder = builder.with_update(*column, expression.clone());
        }
        let (result_table, metrics) = builder.await?;

        debug!(
            table = table_name,
            updated = metrics.num_updated_rows,
            version = ?result_table.version(),
            "Updated records"
        );
        Ok(metrics.num_updated_rows)
    }

    // ─── Read Operations ───

    /// Read all rows from a table (current version)
    pub async fn scan(&self, table_name: &str) -> Result<Vec<RecordBatch>> {
        self.sql(table_name, "SELECT * FROM t").await
    }

    /// Query a table with a SQL WHERE clause
    ///
    /// Uses DataFusion for predicate pushdown and efficient scanning.
    pub async fn query(&self, table_name: &str, sql_where: &str) -> Result<Vec<RecordBatch>> {
        let batches = self
            .sql(table_name, &format!("SELECT * FROM t WHERE {sql_where}"))
            .await?;
        debug!(table = table_name, "Query executed");
        Ok(batches)
    }

    /// Ordered, windowed read: `WHERE … ORDER BY … LIMIT … OFFSET …`
    pub async fn query_page(
        &self,
        table_name: &str,
        sql_where: &str,
        order_by: &str,
        page: PageRequest,
    ) -> Result<Vec<RecordBatch>> {
        let sql = format!(
            "SELECT * FROM t WHERE {sql_where} ORDER BY {order_by} {} LIMIT {} OFFSET {}",
            page.order.as_sql(),
            page.limit,
            page.start_index
        );
        self.sql(table_name, &sql).await
    }

    /// Count rows matching a SQL WHERE clause
    pub async fn count(&self, table_name: &str, sql_where: &str) -> Result<usize> {
        let batches = self
            .sql(
                table_name,
                &format!("SELECT COUNT(*) AS n FROM t WHERE {sql_where}"),
            )
            .await?;

        let mut total = 0usize;
        for batch in &batches {
            if batch.num_rows() == 0 {
                continue;
            }
            let column = cast(batch.column(0), &DataType::Int64)?;
            let counts = column
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(|| CookbookError::Schema("COUNT(*) did not yield Int64".into()))?;
            total += counts.iter().flatten().map(|n| n.max(0) as usize).sum::<usize>();
        }
        Ok(total)
    }

    /// Full SQL query against a single table registered as `t`
    pub async fn sql(&self, table_name: &str, full_sql: &str) -> Result<Vec<RecordBatch>> {
        let url = self.table_url(table_name)?;
        let table = open_table(url).await?;
        let table_provider: Arc<dyn deltalake::datafusion::catalog::TableProvider> =
            Arc::new(table);

        let ctx = deltalake::datafusion::prelude::SessionContext::new();
        ctx.register_table("t", table_provider)?;

        let df = ctx.sql(full_sql).await?;
        let batches = df.collect().await?;
        Ok(batches)
    }

    /// Get the current version of a table
    pub async fn version(&self, table_name: &str) -> Result<i64> {
        let url = self.table_url(table_name)?;
        let table = open_table(url).await?;
        Ok(table.version().unwrap_or(0))
    }

    /// Get version history for a table
    pub async fn history(&self, table_name: &str, limit: Option<usize>) -> Result<Vec<VersionInfo>> {
        let url = self.table_url(table_name)?;
        let table = open_table(url).await?;

        let commits: Vec<_> = table.history(limit).await?.collect();

        Ok(commits
            .into_iter()
            .enumerate()
            .map(|(idx, ci)| VersionInfo {
                version: ci.read_version.unwrap_or(idx as i64),
                timestamp: ci.timestamp,
                operation: ci.operation,
            })
            .collect())
    }

    /// Get a reference to the config
    pub fn config(&self) -> &CookbookConfig {
        &self.config
    }
}

// ─── Predicate & row helpers ───

/// Render a string as a SQL literal, doubling embedded single quotes
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Canonical timestamp encoding for stored rows.
///
/// Fixed width, UTC, millisecond precision: lexicographic order is
/// chronological order, so `created_at >= '…'` range filters work on strings.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CookbookError::Schema(format!("bad timestamp {raw:?}: {e}")))
}

/// Fetch a column by name as a plain `StringArray`.
///
/// DataFusion may hand back view-typed strings; casting normalizes them.
pub(crate) fn utf8_column(batch: &RecordBatch, name: &str) -> Result<StringArray> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| CookbookError::Schema(format!("missing column: {name}")))?;
    let column = cast(column, &DataType::Utf8)?;
    column
        .as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .ok_or_else(|| CookbookError::Schema(format!("column {name} is not utf8")))
}

/// Nullable string cell
pub(crate) fn opt_value(array: &StringArray, i: usize) -> Option<String> {
    if array.is_null(i) {
        None
    } else {
        Some(array.value(i).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_quote_literal_escapes() {
        assert_eq!(quote_literal("plain"), "'plain'");
        assert_eq!(quote_literal("o'brien@example.com"), "'o''brien@example.com'");
        assert_eq!(quote_literal("' OR 1=1 --"), "''' OR 1=1 --'");
    }

    #[test]
    fn test_timestamp_round_trip_and_order() {
        let early = Utc.with_ymd_and_hms(2026, 1, 9, 8, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap();

        let a = format_timestamp(early);
        let b = format_timestamp(late);
        assert!(a < b);
        assert_eq!(a, "2026-01-09T08:00:00.000Z");
        assert_eq!(parse_timestamp(&a).unwrap(), early);
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::from_str("asc"), SortOrder::Asc);
        assert_eq!(SortOrder::from_str("ASC"), SortOrder::Asc);
        assert_eq!(SortOrder::from_str("desc"), SortOrder::Desc);
        assert_eq!(SortOrder::from_str("anything"), SortOrder::Desc);
    }

    #[test]
    fn test_page_request_limits() {
        assert_eq!(PageRequest::default().limit, 9);
        assert_eq!(PageRequest::new(0, 0, SortOrder::Asc).limit, 9);
        assert_eq!(PageRequest::new(5, 1_000, SortOrder::Asc).limit, 100);
        assert_eq!(PageRequest::new(5, 20, SortOrder::Asc).start_index, 5);
    }
}
