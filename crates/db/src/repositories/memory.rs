use std::collections::HashMap;

use chrono::NaiveDate;
use tokio::sync::RwLock;

use asha_core::domain::interaction::{BiasDetection, Feedback, Interaction, InteractionId};
use asha_core::domain::metrics::{DailyMetrics, MetricsRow, SearchKind};

use super::{
    BiasDetectionRepository, InteractionRepository, MetricsRepository, RepositoryError,
};

#[derive(Default)]
pub struct InMemoryInteractionRepository {
    interactions: RwLock<HashMap<String, Interaction>>,
}

#[async_trait::async_trait]
impl InteractionRepository for InMemoryInteractionRepository {
    async fn insert(&self, interaction: &Interaction) -> Result<(), RepositoryError> {
        let mut interactions = self.interactions.write().await;
        interactions.insert(interaction.id.0.clone(), interaction.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &InteractionId,
    ) -> Result<Option<Interaction>, RepositoryError> {
        let interactions = self.interactions.read().await;
        Ok(interactions.get(&id.0).cloned())
    }

    async fn set_feedback(
        &self,
        id: &InteractionId,
        feedback: Feedback,
    ) -> Result<bool, RepositoryError> {
        let mut interactions = self.interactions.write().await;
        match interactions.get_mut(&id.0) {
            Some(interaction) => {
                interaction.feedback = Some(feedback);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_for_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<Interaction>, RepositoryError> {
        let interactions = self.interactions.read().await;
        let mut matched: Vec<Interaction> = interactions
            .values()
            .filter(|interaction| interaction.session_id == session_id)
            .cloned()
            .collect();
        matched.sort_by_key(|interaction| interaction.timestamp);
        Ok(matched)
    }
}

#[derive(Default)]
pub struct InMemoryBiasDetectionRepository {
    detections: RwLock<Vec<BiasDetection>>,
}

#[async_trait::async_trait]
impl BiasDetectionRepository for InMemoryBiasDetectionRepository {
    async fn insert(&self, detection: &BiasDetection) -> Result<(), RepositoryError> {
        let mut detections = self.detections.write().await;
        detections.push(detection.clone());
        Ok(())
    }

    async fn count_for_date(&self, date: NaiveDate) -> Result<i64, RepositoryError> {
        let detections = self.detections.read().await;
        Ok(detections
            .iter()
            .filter(|detection| detection.timestamp.date_naive() == date)
            .count() as i64)
    }
}

#[derive(Default)]
pub struct InMemoryMetricsRepository {
    rows: RwLock<HashMap<NaiveDate, DailyMetrics>>,
}

#[async_trait::async_trait]
impl MetricsRepository for InMemoryMetricsRepository {
    async fn record_interaction(&self, date: NaiveDate) -> Result<(), RepositoryError> {
        let mut rows = self.rows.write().await;
        rows.entry(date).or_default().total_interactions += 1;
        Ok(())
    }

    async fn record_search(
        &self,
        date: NaiveDate,
        kind: SearchKind,
    ) -> Result<(), RepositoryError> {
        let mut rows = self.rows.write().await;
        let counters = rows.entry(date).or_default();
        match kind {
            SearchKind::Job => counters.job_searches += 1,
            SearchKind::FilteredJob => counters.filtered_job_searches += 1,
            SearchKind::Event => counters.event_searches += 1,
            SearchKind::Mentorship => counters.mentorship_searches += 1,
        }
        Ok(())
    }

    async fn record_bias_detection(&self, date: NaiveDate) -> Result<(), RepositoryError> {
        let mut rows = self.rows.write().await;
        rows.entry(date).or_default().bias_detections += 1;
        Ok(())
    }

    async fn fetch(&self, date: NaiveDate) -> Result<Option<MetricsRow>, RepositoryError> {
        let rows = self.rows.read().await;
        Ok(rows.get(&date).map(|counters| MetricsRow { date, counters: counters.clone() }))
    }
}
