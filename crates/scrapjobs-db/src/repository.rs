use scrapjobs_core::{AppError, Record};
use sqlx::{PgPool, Pool, Postgres};

/// Tag appended to every job on ingest, marking it as not yet reviewed.
pub const NEW_TAG: &str = "new";

/// Tags stored for an ingested record: its own tags plus [`NEW_TAG`].
pub fn ingest_tags(tags: &[String]) -> Vec<String> {
    let mut stored = tags.to_vec();
    if !stored.iter().any(|tag| tag == NEW_TAG) {
        stored.push(NEW_TAG.to_string());
    }
    stored
}

/// Outcome of [`JobRepository::insert_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub inserted: usize,
    /// Records whose URL was already stored.
    pub skipped: usize,
}

/// Repository for job postings in the `jobs` table.
#[derive(Clone)]
pub struct JobRepository {
    pool: Pool<Postgres>,
}

impl JobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one record, tagged [`NEW_TAG`]. A URL already in the table is
    /// left untouched and `false` is returned.
    pub async fn insert(&self, record: &Record) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO jobs (title, descrip, url, tags)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (url) DO NOTHING
            "#,
        )
        .bind(record.title())
        .bind(record.description())
        .bind(record.url())
        .bind(ingest_tags(record.tags()))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    /// Insert records one after another, stopping at the first database error.
    pub async fn insert_all(&self, records: &[Record]) -> Result<IngestReport, AppError> {
        let mut report = IngestReport::default();
        for record in records {
            if self.insert(record).await? {
                tracing::debug!(url = record.url(), "Job inserted");
                report.inserted += 1;
            } else {
                tracing::debug!(url = record.url(), "Job already stored");
                report.skipped += 1;
            }
        }
        Ok(report)
    }

    /// Number of jobs stored.
    pub async fn count(&self) -> Result<i64, AppError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(row.0)
    }
}
