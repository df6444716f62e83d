use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row};

use asha_core::domain::interaction::{Feedback, Interaction, InteractionId};

use super::{InteractionRepository, RepositoryError};
use crate::DbPool;

pub struct SqlInteractionRepository {
    pool: DbPool,
}

impl SqlInteractionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl InteractionRepository for SqlInteractionRepository {
    async fn insert(&self, interaction: &Interaction) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO interactions (id, session_id, user_message, bot_response, timestamp, feedback)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&interaction.id.0)
        .bind(&interaction.session_id)
        .bind(&interaction.user_message)
        .bind(&interaction.bot_response)
        .bind(interaction.timestamp.to_rfc3339())
        .bind(interaction.feedback.map(|feedback| feedback.as_str()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &InteractionId,
    ) -> Result<Option<Interaction>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, session_id, user_message, bot_response, timestamp, feedback
             FROM interactions
             WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(interaction_from_row).transpose()
    }

    async fn set_feedback(
        &self,
        id: &InteractionId,
        feedback: Feedback,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE interactions SET feedback = ? WHERE id = ?")
            .bind(feedback.as_str())
            .bind(&id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_for_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<Interaction>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, session_id, user_message, bot_response, timestamp, feedback
             FROM interactions
             WHERE session_id = ?
             ORDER BY timestamp ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(interaction_from_row).collect()
    }
}

fn interaction_from_row(row: SqliteRow) -> Result<Interaction, RepositoryError> {
    let timestamp_raw: String = row.get("timestamp");
    let timestamp = DateTime::parse_from_rfc3339(&timestamp_raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|err| RepositoryError::Decode(format!("bad timestamp `{timestamp_raw}`: {err}")))?;

    let feedback = row
        .get::<Option<String>, _>("feedback")
        .map(|raw| {
            raw.parse::<Feedback>()
                .map_err(|err| RepositoryError::Decode(format!("bad feedback value: {err}")))
        })
        .transpose()?;

    Ok(Interaction {
        id: InteractionId(row.get("id")),
        session_id: row.get("session_id"),
        user_message: row.get("user_message"),
        bot_response: row.get("bot_response"),
        timestamp,
        feedback,
    })
}

#[cfg(test)]
mod tests {
    use asha_core::domain::interaction::{Feedback, Interaction, InteractionId};

    use crate::repositories::{InteractionRepository, SqlInteractionRepository};
    use crate::{connect_with_settings, migrations};

    async fn test_repo() -> SqlInteractionRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");
        SqlInteractionRepository::new(pool)
    }

    #[tokio::test]
    async fn insert_and_find_round_trip() {
        let repo = test_repo().await;
        let interaction =
            Interaction::new("session-1", "any data jobs?", "I found these opportunities...");

        repo.insert(&interaction).await.expect("insert");
        let found = repo.find_by_id(&interaction.id).await.expect("find").expect("present");

        assert_eq!(found.session_id, "session-1");
        assert_eq!(found.user_message, "any data jobs?");
        assert_eq!(found.feedback, None);
    }

    #[tokio::test]
    async fn set_feedback_updates_existing_row() {
        let repo = test_repo().await;
        let interaction = Interaction::new("session-1", "hello", "welcome");
        repo.insert(&interaction).await.expect("insert");

        let updated =
            repo.set_feedback(&interaction.id, Feedback::Positive).await.expect("set feedback");
        assert!(updated);

        let found = repo.find_by_id(&interaction.id).await.expect("find").expect("present");
        assert_eq!(found.feedback, Some(Feedback::Positive));

        // Feedback is overwritable; no transition rules apply once set.
        let again =
            repo.set_feedback(&interaction.id, Feedback::Negative).await.expect("set feedback");
        assert!(again);
    }

    #[tokio::test]
    async fn set_feedback_reports_missing_interaction() {
        let repo = test_repo().await;
        let updated = repo
            .set_feedback(&InteractionId::generate(), Feedback::Neutral)
            .await
            .expect("set feedback");
        assert!(!updated);
    }

    #[tokio::test]
    async fn list_for_session_orders_by_timestamp() {
        let repo = test_repo().await;
        for message in ["first", "second", "third"] {
            let interaction = Interaction::new("session-2", message, "reply");
            repo.insert(&interaction).await.expect("insert");
        }
        repo.insert(&Interaction::new("other-session", "elsewhere", "reply"))
            .await
            .expect("insert");

        let listed = repo.list_for_session("session-2").await.expect("list");
        assert_eq!(listed.len(), 3);
        assert!(listed.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp));
    }
}
