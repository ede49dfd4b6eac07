use super::*;
use crate::test_utils::{bigint_table, FakeSampler};
use dt_core::{ColumnPair, Database, ReviewConfig, Severity};
use std::time::Duration;

fn library() -> Database {
    let mut db = Database::new("library");
    bigint_table(&mut db, "authors", &["author_id"], &["author_id"]);
    bigint_table(&mut db, "books", &["book_id", "author_id"], &["book_id"]);
    bigint_table(&mut db, "tags", &["tag", "book_id"], &[]);
    bigint_table(&mut db, "labels", &["tag", "color"], &[]);
    db.add_foreign_key(
        "books",
        "fk_author",
        "authors",
        vec![ColumnPair::new("author_id", "author_id")],
    )
    .unwrap();
    db.add_relationship(
        "tags",
        "rel_label",
        "labels",
        vec![ColumnPair::new("tag", "tag")],
    )
    .unwrap();
    db
}

async fn run(db: &Database, fake: &FakeSampler, config: ReviewConfig) -> Vec<Finding> {
    let timeout = config.sampler_timeout();
    let ctx = ReviewContext::new(db, config);
    ManyToMany
        .run(&ctx, &TimedSampler::new(fake, timeout))
        .await
}

#[tokio::test]
async fn test_keys_repeated_on_both_sides() {
    let db = library();
    let fake = FakeSampler::new()
        .rows("tags", 1000)
        .distinct("tags", &["tag"], 50)
        .rows("labels", 120)
        .distinct("labels", &["tag"], 40);

    let findings = run(&db, &fake, ReviewConfig::default()).await;
    // fk_author targets the authors PK and is never sampled
    assert_eq!(findings.len(), 1);
    let f = &findings[0];
    assert_eq!(f.category, FindingCategory::ManyToMany);
    assert_eq!(f.severity, Severity::Warning);
    assert_eq!(f.tables, vec!["tags", "labels"]);
    assert_eq!(f.evidence["left_distinct"], "50");
}

#[tokio::test]
async fn test_unique_side_is_one_to_many() {
    let db = library();
    let fake = FakeSampler::new()
        .rows("tags", 1000)
        .distinct("tags", &["tag"], 50)
        .rows("labels", 40)
        .distinct("labels", &["tag"], 40);

    assert!(run(&db, &fake, ReviewConfig::default()).await.is_empty());
}

#[tokio::test]
async fn test_duplication_ratio_is_configurable() {
    let db = library();
    let fake = FakeSampler::new()
        .rows("tags", 110)
        .distinct("tags", &["tag"], 100)
        .rows("labels", 120)
        .distinct("labels", &["tag"], 100);
    let config = ReviewConfig {
        duplication_ratio: 1.5,
        ..ReviewConfig::default()
    };
    assert!(run(&db, &fake, config).await.is_empty());
}

#[tokio::test]
async fn test_sampler_failure_degrades_to_warning() {
    let db = library();
    let fake = FakeSampler::new().failing("labels").rows("tags", 10);
    let findings = run(&db, &fake, ReviewConfig::default()).await;
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].category, FindingCategory::SamplerUnavailable);
    assert_eq!(findings[0].evidence["join"], "rel_label");
}

#[tokio::test]
async fn test_sampler_timeout_degrades_to_warning() {
    let db = library();
    let fake = FakeSampler::new().delayed(Duration::from_secs(10));
    let config = ReviewConfig {
        sampler_timeout_ms: 20,
        ..ReviewConfig::default()
    };
    let findings = run(&db, &fake, config).await;
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].message, "could not verify: sampler unavailable");
    assert!(findings[0].evidence["reason"].contains("R002"));
}
