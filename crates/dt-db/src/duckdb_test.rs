use super::*;
use dt_review::{SamplerError, TimedSampler};
use std::time::Duration;

fn seeded() -> DuckDbSampler {
    let db = DuckDbSampler::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE orders AS \
         SELECT n AS id, n % 10 AS customer_id, n % 3 AS region FROM range(1000) t(n);",
    )
    .unwrap();
    db
}

fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|c| c.to_string()).collect()
}

#[tokio::test]
async fn test_row_count() {
    let db = seeded();
    assert_eq!(db.row_count("orders").await.unwrap(), 1000);
    assert_eq!(db.sampler_name(), "duckdb");
}

#[tokio::test]
async fn test_distinct_key_count() {
    let db = seeded();
    assert_eq!(
        db.distinct_key_count("orders", &cols(&["customer_id"]))
            .await
            .unwrap(),
        10
    );
    assert_eq!(
        db.distinct_key_count("orders", &cols(&["customer_id", "region"]))
            .await
            .unwrap(),
        30
    );
}

#[tokio::test]
async fn test_histogram_covers_every_row() {
    let db = seeded();
    let histogram = db
        .key_histogram("orders", &cols(&["region"]))
        .await
        .unwrap();
    assert_eq!(histogram.len(), 3);
    assert_eq!(histogram.values().sum::<u64>(), 1000);
}

#[tokio::test]
async fn test_sampled_histogram_is_bounded() {
    let db = seeded().with_sample_rows(100);
    let histogram = db.key_histogram("orders", &cols(&["id"])).await.unwrap();
    assert_eq!(histogram.values().sum::<u64>(), 100);
}

#[tokio::test]
async fn test_missing_table_is_unavailable() {
    let db = seeded();
    let err = db.row_count("nope").await.unwrap_err();
    assert!(matches!(err, SamplerError::Unavailable(_)), "{err}");
}

#[tokio::test]
async fn test_empty_key_is_a_query_error() {
    let db = seeded();
    let err = db.distinct_key_count("orders", &[]).await.unwrap_err();
    assert!(matches!(err, SamplerError::Query(_)));
}

#[tokio::test]
async fn test_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.duckdb");
    {
        let db = DuckDbSampler::from_path(&path).unwrap();
        db.execute_batch("CREATE TABLE t AS SELECT 1 AS id;").unwrap();
    }
    let db = DuckDbSampler::new(path.to_str().unwrap()).unwrap();
    assert_eq!(db.row_count("t").await.unwrap(), 1);
}

#[tokio::test]
async fn test_timeout_fires_while_query_is_blocked() {
    let db = seeded();
    let timed = TimedSampler::new(&db, Duration::from_millis(20));

    // Hold the connection so the query cannot start on the blocking pool
    let held = db.conn.lock().unwrap();
    let err = timed.row_count("orders").await.unwrap_err();
    drop(held);

    assert!(
        matches!(err, SamplerError::Timeout { timeout_ms: 20, .. }),
        "{err}"
    );
    assert_eq!(db.row_count("orders").await.unwrap(), 1000);
}

#[tokio::test]
async fn test_queries_run_off_the_async_thread() {
    let db = seeded();
    let region = cols(&["region"]);
    let (rows, distinct) = tokio::join!(
        db.row_count("orders"),
        db.distinct_key_count("orders", &region)
    );
    assert_eq!(rows.unwrap(), 1000);
    assert_eq!(distinct.unwrap(), 3);
}
