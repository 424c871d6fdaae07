use scrapjobs_core::Record;
use scrapjobs_db::{Database, IngestReport};

use crate::integration::common::setup_test_db;

fn record(title: &str, url: &str, tags: &[&str]) -> Record {
    Record::new(
        title,
        format!("{title} description"),
        url,
        tags.iter().map(|t| t.to_string()).collect(),
    )
}

async fn stored(pool: &sqlx::PgPool, url: &str) -> Option<(String, String, Vec<String>)> {
    sqlx::query_as("SELECT title, descrip, tags FROM jobs WHERE url = $1")
        .bind(url)
        .fetch_optional(pool)
        .await
        .expect("query failed")
}

#[tokio::test]
async fn test_insert_stores_record_with_new_tag() {
    let (pool, _container) = setup_test_db().await;
    let db = Database::from_pool(pool.clone());
    db.migrate().await.unwrap();

    let job = record(
        "Senior Rust Engineer",
        "https://rustjobs.dev/featured-jobs/1",
        &["rust", "rustjobs"],
    );
    assert!(db.job_repo().insert(&job).await.unwrap());

    let (title, descrip, tags) = stored(&pool, job.url()).await.unwrap();
    assert_eq!(title, "Senior Rust Engineer");
    assert_eq!(descrip, "Senior Rust Engineer description");
    assert_eq!(tags, vec!["rust", "rustjobs", "new"]);
}

#[tokio::test]
async fn test_duplicate_url_keeps_first_row() {
    let (pool, _container) = setup_test_db().await;
    let db = Database::from_pool(pool.clone());
    db.migrate().await.unwrap();
    let repo = db.job_repo();

    let url = "https://golangprojects.com/golang-remote-jobs/7";
    assert!(repo.insert(&record("Go Developer", url, &["go"])).await.unwrap());
    let edited = record("Go Developer (edited)", url, &["go", "remote"]);
    assert!(!repo.insert(&edited).await.unwrap());

    let (title, _, tags) = stored(&pool, url).await.unwrap();
    assert_eq!(title, "Go Developer");
    assert_eq!(tags, vec!["go", "new"]);
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_insert_all_counts_inserted_and_skipped() {
    let (pool, _container) = setup_test_db().await;
    let db = Database::from_pool(pool);
    db.migrate().await.unwrap();
    let repo = db.job_repo();

    let batch = vec![
        record("A", "https://x/a", &[]),
        record("B", "https://x/b", &[]),
        record("A again", "https://x/a", &[]),
    ];
    let report = repo.insert_all(&batch).await.unwrap();
    assert_eq!(
        report,
        IngestReport {
            inserted: 2,
            skipped: 1
        }
    );

    let report = repo.insert_all(&batch[..2]).await.unwrap();
    assert_eq!(report.inserted, 0);
    assert_eq!(report.skipped, 2);
    assert_eq!(repo.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_migrate_is_idempotent() {
    let (pool, _container) = setup_test_db().await;
    let db = Database::from_pool(pool);
    db.migrate().await.unwrap();
    db.migrate().await.unwrap();

    assert_eq!(db.job_repo().count().await.unwrap(), 0);
}
