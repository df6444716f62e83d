use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{error, info};

use asha_core::KnowledgeBase;
use asha_db::DbPool;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
    knowledge: Arc<RwLock<KnowledgeBase>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub database: HealthCheck,
    pub knowledge: HealthCheck,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool, knowledge: Arc<RwLock<KnowledgeBase>>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { db_pool, knowledge })
}

pub async fn spawn(
    bind_address: &str,
    port: u16,
    db_pool: DbPool,
    knowledge: Arc<RwLock<KnowledgeBase>>,
) -> std::io::Result<()> {
    let address = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.health.start",
        bind_address = %address,
        "health endpoint started"
    );

    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router(db_pool, knowledge)).await {
            error!(
                event_name = "system.health.error",
                error = %error,
                "health endpoint server terminated unexpectedly"
            );
        }
    });

    Ok(())
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = database_check(&state.db_pool).await;
    let knowledge = knowledge_check(&state.knowledge).await;
    let ready = database.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "asha-server runtime initialized".to_string(),
        },
        database,
        knowledge,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn database_check(pool: &DbPool) -> HealthCheck {
    match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await {
        Ok(_) => HealthCheck { status: "ready", detail: "database query succeeded".to_string() },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("database query failed: {error}") }
        }
    }
}

/// An empty knowledge base is reported but never fails the check; the chat
/// pipeline degrades to no-result replies instead.
async fn knowledge_check(knowledge: &Arc<RwLock<KnowledgeBase>>) -> HealthCheck {
    let guard = knowledge.read().await;
    if guard.is_empty() {
        HealthCheck { status: "ready", detail: "knowledge base is empty".to_string() }
    } else {
        HealthCheck {
            status: "ready",
            detail: format!(
                "{} jobs, {} events, {} mentorships loaded",
                guard.jobs.len(),
                guard.events.len(),
                guard.mentorships.len()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, Json};
    use tokio::sync::RwLock;

    use asha_core::{JobRecord, KnowledgeBase};
    use asha_db::connect_with_settings;

    use crate::health::{health, HealthState};

    fn knowledge_with_one_job() -> Arc<RwLock<KnowledgeBase>> {
        Arc::new(RwLock::new(KnowledgeBase {
            jobs: vec![JobRecord { id: "job-1".to_string(), ..JobRecord::default() }],
            ..KnowledgeBase::default()
        }))
    }

    #[tokio::test]
    async fn health_returns_ready_when_database_is_reachable() {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 5)
            .await
            .expect("pool should connect");

        let state = HealthState { db_pool: pool.clone(), knowledge: knowledge_with_one_job() };
        let (status, Json(payload)) = health(State(state)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.database.status, "ready");
        assert!(payload.knowledge.detail.contains("1 jobs"));

        pool.close().await;
    }

    #[tokio::test]
    async fn health_returns_service_unavailable_when_database_is_down() {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 5)
            .await
            .expect("pool should connect");
        pool.close().await;

        let state = HealthState { db_pool: pool, knowledge: knowledge_with_one_job() };
        let (status, Json(payload)) = health(State(state)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.database.status, "degraded");
        assert_eq!(payload.service.status, "ready");
    }
}
