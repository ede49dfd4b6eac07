//! DuckDB data sampler

use crate::error::{DbError, DbResult};
use async_trait::async_trait;
use dt_review::{DataSampler, KeyHistogram, SamplerResult};
use duckdb::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Samples row statistics from a DuckDB database.
///
/// Calls are serialized through one connection. Queries run on tokio's
/// blocking pool, so a caller's timeout fires while a query is still
/// running; the abandoned query finishes in the background and holds the
/// connection until it does.
pub struct DuckDbSampler {
    conn: Arc<Mutex<Connection>>,
    /// Reservoir sample size for histograms; `None` scans every row
    sample_rows: Option<u64>,
}

impl DuckDbSampler {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::with_connection(conn))
    }

    /// Open a DuckDB database file
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{}: {e}", path.display())))?;
        log::debug!("Opened sample database {}", path.display());
        Ok(Self::with_connection(conn))
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn with_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            sample_rows: None,
        }
    }

    /// Build histograms from a reservoir sample of `rows` rows
    pub fn with_sample_rows(mut self, rows: u64) -> Self {
        self.sample_rows = Some(rows);
        self
    }

    /// Execute SQL statements (test fixtures, seeding)
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        lock(&self.conn)?
            .execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    /// Run `query` against the connection on the blocking pool
    async fn blocking<T, F>(&self, query: F) -> DbResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> DbResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = lock(&conn)?;
            query(&guard)
        })
        .await
        .map_err(|e| DbError::TaskFailed(e.to_string()))?
    }

    async fn count(&self, sql: String) -> DbResult<u64> {
        self.blocking(move |conn| {
            let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
            Ok(count.max(0) as u64)
        })
        .await
    }

    fn histogram_sql(&self, table: &str, columns: &[String]) -> DbResult<String> {
        let source = match self.sample_rows {
            Some(n) => format!("{} USING SAMPLE {n} ROWS", quote_ident(table)),
            None => quote_ident(table),
        };
        Ok(format!(
            "SELECT hash({}) AS h, COUNT(*) AS n FROM {source} GROUP BY h",
            column_list(columns)?
        ))
    }
}

fn lock(conn: &Mutex<Connection>) -> DbResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| DbError::MutexPoisoned(e.to_string()))
}

fn read_histogram(conn: &Connection, sql: &str) -> DbResult<KeyHistogram> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| {
        let hash: u64 = row.get(0)?;
        let count: i64 = row.get(1)?;
        Ok((hash, count.max(0) as u64))
    })?;

    let mut histogram = KeyHistogram::new();
    for row in rows {
        let (hash, count) = row?;
        *histogram.entry(hash).or_insert(0) += count;
    }
    Ok(histogram)
}

#[async_trait]
impl DataSampler for DuckDbSampler {
    async fn row_count(&self, table: &str) -> SamplerResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        Ok(self.count(sql).await?)
    }

    async fn distinct_key_count(&self, table: &str, columns: &[String]) -> SamplerResult<u64> {
        let sql = format!(
            "SELECT COUNT(*) FROM (SELECT DISTINCT {} FROM {})",
            column_list(columns)?,
            quote_ident(table)
        );
        Ok(self.count(sql).await?)
    }

    async fn key_histogram(&self, table: &str, columns: &[String]) -> SamplerResult<KeyHistogram> {
        let sql = self.histogram_sql(table, columns)?;
        Ok(self.blocking(move |conn| read_histogram(conn, &sql)).await?)
    }

    fn sampler_name(&self) -> &'static str {
        "duckdb"
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn column_list(columns: &[String]) -> DbResult<String> {
    if columns.is_empty() {
        return Err(DbError::ExecutionError(
            "sampling needs at least one key column".to_string(),
        ));
    }
    Ok(columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", "))
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
