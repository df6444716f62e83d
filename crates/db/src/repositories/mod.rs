use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use asha_core::domain::interaction::{BiasDetection, Feedback, Interaction, InteractionId};
use asha_core::domain::metrics::{MetricsRow, SearchKind};

pub mod bias;
pub mod interaction;
pub mod memory;
pub mod metrics;

pub use bias::SqlBiasDetectionRepository;
pub use interaction::SqlInteractionRepository;
pub use memory::{
    InMemoryBiasDetectionRepository, InMemoryInteractionRepository, InMemoryMetricsRepository,
};
pub use metrics::SqlMetricsRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

#[async_trait]
pub trait InteractionRepository: Send + Sync {
    async fn insert(&self, interaction: &Interaction) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: &InteractionId)
        -> Result<Option<Interaction>, RepositoryError>;

    /// Record user feedback. Returns `false` when the interaction does not
    /// exist. Overwriting previously set feedback is allowed.
    async fn set_feedback(
        &self,
        id: &InteractionId,
        feedback: Feedback,
    ) -> Result<bool, RepositoryError>;

    async fn list_for_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<Interaction>, RepositoryError>;
}

#[async_trait]
pub trait BiasDetectionRepository: Send + Sync {
    async fn insert(&self, detection: &BiasDetection) -> Result<(), RepositoryError>;

    async fn count_for_date(&self, date: NaiveDate) -> Result<i64, RepositoryError>;
}

#[async_trait]
pub trait MetricsRepository: Send + Sync {
    async fn record_interaction(&self, date: NaiveDate) -> Result<(), RepositoryError>;

    async fn record_search(&self, date: NaiveDate, kind: SearchKind)
        -> Result<(), RepositoryError>;

    async fn record_bias_detection(&self, date: NaiveDate) -> Result<(), RepositoryError>;

    async fn fetch(&self, date: NaiveDate) -> Result<Option<MetricsRow>, RepositoryError>;
}
