use chrono::NaiveDate;
use sqlx::Row;

use asha_core::domain::interaction::BiasDetection;

use super::{BiasDetectionRepository, RepositoryError};
use crate::DbPool;

pub struct SqlBiasDetectionRepository {
    pool: DbPool,
}

impl SqlBiasDetectionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl BiasDetectionRepository for SqlBiasDetectionRepository {
    async fn insert(&self, detection: &BiasDetection) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO bias_detections (interaction_id, message, bias_score, bias_type, timestamp)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&detection.interaction_id.0)
        .bind(&detection.message)
        .bind(detection.bias_score)
        .bind(&detection.bias_type)
        .bind(detection.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count_for_date(&self, date: NaiveDate) -> Result<i64, RepositoryError> {
        let day_prefix = format!("{date}%");
        let count = sqlx::query("SELECT COUNT(*) AS count FROM bias_detections WHERE timestamp LIKE ?")
            .bind(day_prefix)
            .fetch_one(&self.pool)
            .await?
            .get::<i64, _>("count");

        Ok(count)
    }
}
