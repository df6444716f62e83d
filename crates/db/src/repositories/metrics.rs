use chrono::NaiveDate;
use sqlx::{sqlite::SqliteRow, Row};

use asha_core::domain::metrics::{DailyMetrics, MetricsRow, SearchKind};

use super::{MetricsRepository, RepositoryError};
use crate::DbPool;

pub struct SqlMetricsRepository {
    pool: DbPool,
}

impl SqlMetricsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Upsert against the UNIQUE(date) row; this is what keeps the
    /// one-row-per-date invariant under concurrent requests.
    async fn bump(&self, date: NaiveDate, column: &'static str) -> Result<(), RepositoryError> {
        let statement = format!(
            "INSERT INTO metrics (date, {column}) VALUES (?, 1)
             ON CONFLICT(date) DO UPDATE SET {column} = {column} + 1"
        );
        sqlx::query(&statement).bind(date.to_string()).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl MetricsRepository for SqlMetricsRepository {
    async fn record_interaction(&self, date: NaiveDate) -> Result<(), RepositoryError> {
        self.bump(date, "total_interactions").await
    }

    async fn record_search(
        &self,
        date: NaiveDate,
        kind: SearchKind,
    ) -> Result<(), RepositoryError> {
        let column = match kind {
            SearchKind::Job => "job_searches",
            SearchKind::FilteredJob => "filtered_job_searches",
            SearchKind::Event => "event_searches",
            SearchKind::Mentorship => "mentorship_searches",
        };
        self.bump(date, column).await
    }

    async fn record_bias_detection(&self, date: NaiveDate) -> Result<(), RepositoryError> {
        self.bump(date, "bias_detections").await
    }

    async fn fetch(&self, date: NaiveDate) -> Result<Option<MetricsRow>, RepositoryError> {
        let row = sqlx::query(
            "SELECT date, total_interactions, job_searches, filtered_job_searches,
                    event_searches, mentorship_searches, bias_detections
             FROM metrics
             WHERE date = ?",
        )
        .bind(date.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(metrics_from_row).transpose()
    }
}

fn metrics_from_row(row: SqliteRow) -> Result<MetricsRow, RepositoryError> {
    let date_raw: String = row.get("date");
    let date = date_raw
        .parse::<NaiveDate>()
        .map_err(|err| RepositoryError::Decode(format!("bad metrics date `{date_raw}`: {err}")))?;

    Ok(MetricsRow {
        date,
        counters: DailyMetrics {
            total_interactions: row.get("total_interactions"),
            job_searches: row.get("job_searches"),
            filtered_job_searches: row.get("filtered_job_searches"),
            event_searches: row.get("event_searches"),
            mentorship_searches: row.get("mentorship_searches"),
            bias_detections: row.get("bias_detections"),
        },
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use sqlx::Row;

    use asha_core::domain::metrics::SearchKind;

    use crate::repositories::{MetricsRepository, SqlMetricsRepository};
    use crate::{connect_with_settings, migrations};

    async fn test_repo() -> SqlMetricsRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");
        SqlMetricsRepository::new(pool)
    }

    fn date(value: &str) -> NaiveDate {
        value.parse().expect("date literal")
    }

    #[tokio::test]
    async fn repeated_bumps_keep_a_single_row_per_date() {
        let repo = test_repo().await;
        let today = date("2026-08-06");

        for _ in 0..3 {
            repo.record_interaction(today).await.expect("record interaction");
        }
        repo.record_search(today, SearchKind::Job).await.expect("record search");
        repo.record_search(today, SearchKind::FilteredJob).await.expect("record search");
        repo.record_bias_detection(today).await.expect("record bias");

        let row_count = sqlx::query("SELECT COUNT(*) AS count FROM metrics")
            .fetch_one(&repo.pool)
            .await
            .expect("count rows")
            .get::<i64, _>("count");
        assert_eq!(row_count, 1);

        let metrics = repo.fetch(today).await.expect("fetch").expect("row present");
        assert_eq!(metrics.counters.total_interactions, 3);
        assert_eq!(metrics.counters.job_searches, 1);
        assert_eq!(metrics.counters.filtered_job_searches, 1);
        assert_eq!(metrics.counters.bias_detections, 1);
        assert_eq!(metrics.counters.event_searches, 0);
    }

    #[tokio::test]
    async fn separate_dates_get_separate_rows() {
        let repo = test_repo().await;

        repo.record_interaction(date("2026-08-05")).await.expect("record");
        repo.record_interaction(date("2026-08-06")).await.expect("record");
        repo.record_search(date("2026-08-06"), SearchKind::Mentorship).await.expect("record");

        let yesterday = repo.fetch(date("2026-08-05")).await.expect("fetch").expect("row");
        let today = repo.fetch(date("2026-08-06")).await.expect("fetch").expect("row");

        assert_eq!(yesterday.counters.total_interactions, 1);
        assert_eq!(yesterday.counters.mentorship_searches, 0);
        assert_eq!(today.counters.mentorship_searches, 1);
    }

    #[tokio::test]
    async fn fetch_returns_none_for_untracked_date() {
        let repo = test_repo().await;
        assert!(repo.fetch(date("2020-01-01")).await.expect("fetch").is_none());
    }
}
