//! Chat API routes.
//!
//! HTML endpoints:
//! - `GET  /`             - chat page; always mints a fresh session
//!
//! JSON API endpoints:
//! - `POST /api/chat`     - process a user message, persist the interaction
//! - `POST /api/feedback` - record feedback for an earlier interaction
//!
//! Static assets are served under `/static`.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{AppendHeaders, Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tera::Tera;
use tokio::sync::RwLock;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use asha_agent::{search_metrics_for, ChatEngine, ChatOutcome, EngineSettings};
use asha_core::config::AppConfig;
use asha_core::domain::interaction::{BiasDetection, Feedback, Interaction, InteractionId};
use asha_core::text::{escape_html, looks_like_injection};
use asha_core::{ApplicationError, KnowledgeBase};
use asha_db::{
    BiasDetectionRepository, DbPool, InteractionRepository, MetricsRepository,
    SqlBiasDetectionRepository, SqlInteractionRepository, SqlMetricsRepository,
};

use crate::session::SessionCodec;

#[derive(Clone)]
pub struct ApiState {
    db_pool: DbPool,
    knowledge: Arc<RwLock<KnowledgeBase>>,
    engine: Arc<ChatEngine>,
    sessions: Arc<SessionCodec>,
    templates: Arc<Tera>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub id: String,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

fn init_templates() -> Arc<Tera> {
    let mut tera = match Tera::new("templates/chat/**/*") {
        Ok(tera) => tera,
        Err(error) => {
            warn!(error = %error, "failed to load chat templates from filesystem, using embedded fallback");
            Tera::default()
        }
    };

    tera.add_raw_template("index.html", include_str!("../../../templates/chat/index.html")).ok();

    Arc::new(tera)
}

pub fn router(
    db_pool: DbPool,
    knowledge: Arc<RwLock<KnowledgeBase>>,
    config: &AppConfig,
) -> Router {
    let engine = ChatEngine::new(EngineSettings {
        top_k: config.knowledge.top_k,
        history_turns: config.session.history_turns,
        entity_values: config.session.entity_values,
    });

    let state = ApiState {
        db_pool,
        knowledge,
        engine: Arc::new(engine),
        sessions: Arc::new(SessionCodec::new(&config.session)),
        templates: init_templates(),
    };

    Router::new()
        .route("/", get(index_page))
        .route("/api/chat", post(chat))
        .route("/api/feedback", post(feedback))
        .nest_service("/static", ServeDir::new("static"))
        .fallback(not_found)
        .with_state(state)
}

/// Render the chat page. The previous session, if any, is discarded and a
/// fresh one is minted; reloading the page always starts a new conversation.
async fn index_page(State(state): State<ApiState>) -> Response {
    let ctx = state.sessions.issue();

    let html = match state.templates.render("index.html", &tera::Context::new()) {
        Ok(html) => html,
        Err(render_error) => {
            error!(error = %render_error, "chat template rendering failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<h1>Service temporarily unavailable</h1>".to_string()),
            )
                .into_response();
        }
    };

    match state.sessions.set_cookie_header(&ctx) {
        Ok(cookie) => {
            (AppendHeaders([(SET_COOKIE, cookie)]), Html(html)).into_response()
        }
        Err(encode_error) => {
            error!(error = %encode_error, "session cookie encoding failed");
            Html(html).into_response()
        }
    }
}

async fn not_found(State(state): State<ApiState>) -> Response {
    let html = state
        .templates
        .render("index.html", &tera::Context::new())
        .unwrap_or_else(|_| "<h1>Not found</h1>".to_string());
    (StatusCode::NOT_FOUND, Html(html)).into_response()
}

async fn chat(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Response {
    let raw_message = request.message.unwrap_or_default();
    let trimmed = raw_message.trim();
    if trimmed.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiError { error: "Message cannot be empty".to_string() }),
        )
            .into_response();
    }

    if looks_like_injection(trimmed) {
        warn!("suspicious markup or injection content in chat message");
    }
    // The engine sees the raw text (escaping would defeat the apostrophe
    // patterns); the escaped form is what gets stored and echoed.
    let stored_message = escape_html(trimmed);

    let mut ctx = state.sessions.from_headers(&headers);
    let session_id = ctx.id.clone();

    let outcome = {
        let knowledge = state.knowledge.read().await;
        state.engine.process(trimmed, &mut ctx, &knowledge)
    };

    let today = Utc::now().date_naive();
    let metrics = SqlMetricsRepository::new(state.db_pool.clone());

    match outcome {
        ChatOutcome::BiasRejected(finding) => {
            let detection =
                BiasDetection::new(&stored_message, finding.score, &finding.bias_type);

            let bias_repo = SqlBiasDetectionRepository::new(state.db_pool.clone());
            if let Err(db_error) = bias_repo.insert(&detection).await {
                return persistence_failure(&detection.interaction_id.0, db_error);
            }
            if let Err(db_error) = metrics.record_bias_detection(today).await {
                return persistence_failure(&detection.interaction_id.0, db_error);
            }

            info!(
                event_name = "chat.bias_rejected",
                interaction_id = %detection.interaction_id.0,
                bias_type = %detection.bias_type,
                "biased message rejected and recorded"
            );

            Json(ChatResponse {
                id: detection.interaction_id.0,
                message: finding.reply,
                timestamp: detection.timestamp.to_rfc3339(),
            })
            .into_response()
        }
        ChatOutcome::Reply { text, kind } => {
            let interaction = Interaction::new(session_id, &stored_message, &text);

            let interactions = SqlInteractionRepository::new(state.db_pool.clone());
            if let Err(db_error) = interactions.insert(&interaction).await {
                return persistence_failure(&interaction.id.0, db_error);
            }
            if let Err(db_error) = metrics.record_interaction(today).await {
                return persistence_failure(&interaction.id.0, db_error);
            }
            for search_kind in search_metrics_for(trimmed) {
                if let Err(db_error) = metrics.record_search(today, search_kind).await {
                    return persistence_failure(&interaction.id.0, db_error);
                }
            }

            info!(
                event_name = "chat.reply",
                interaction_id = %interaction.id.0,
                reply_kind = ?kind,
                "chat interaction recorded"
            );

            ctx.touch(state.sessions.ttl_secs());
            let body = Json(ChatResponse {
                id: interaction.id.0,
                message: text,
                timestamp: interaction.timestamp.to_rfc3339(),
            });

            match state.sessions.set_cookie_header(&ctx) {
                Ok(cookie) => (AppendHeaders([(SET_COOKIE, cookie)]), body).into_response(),
                Err(encode_error) => {
                    error!(error = %encode_error, "session cookie encoding failed");
                    body.into_response()
                }
            }
        }
    }
}

async fn feedback(
    State(state): State<ApiState>,
    Json(request): Json<FeedbackRequest>,
) -> Response {
    let (Some(raw_id), Some(raw_feedback)) = (request.id, request.feedback) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiError { error: "Missing required fields".to_string() }),
        )
            .into_response();
    };

    let interaction_id = match InteractionId::parse(&raw_id) {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiError { error: "Invalid interaction ID format".to_string() }),
            )
                .into_response();
        }
    };

    let feedback_value = match raw_feedback.parse::<Feedback>() {
        Ok(feedback) => feedback,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiError { error: "Invalid feedback value".to_string() }),
            )
                .into_response();
        }
    };

    let interactions = SqlInteractionRepository::new(state.db_pool.clone());
    match interactions.set_feedback(&interaction_id, feedback_value).await {
        Ok(true) => {
            info!(
                event_name = "chat.feedback_recorded",
                interaction_id = %interaction_id.0,
                feedback = feedback_value.as_str(),
                "feedback recorded"
            );
            Json(serde_json::json!({ "status": "success" })).into_response()
        }
        Ok(false) => {
            warn!(interaction_id = %interaction_id.0, "feedback for unknown interaction");
            (
                StatusCode::NOT_FOUND,
                Json(ApiError { error: "Interaction not found".to_string() }),
            )
                .into_response()
        }
        Err(db_error) => persistence_failure(&interaction_id.0, db_error),
    }
}

fn persistence_failure(correlation_id: &str, db_error: asha_db::RepositoryError) -> Response {
    error!(
        event_name = "chat.persistence_failure",
        correlation_id,
        error = %db_error,
        "database write failed"
    );

    let interface =
        ApplicationError::Persistence(db_error.to_string()).into_interface(correlation_id);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "message": interface.user_message(),
            "error": db_error.to_string(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
    use axum::Router;
    use tokio::sync::RwLock;
    use tower::ServiceExt;

    use asha_core::config::AppConfig;
    use asha_core::domain::interaction::{Feedback, Interaction, InteractionId};
    use asha_core::{JobRecord, KnowledgeBase};
    use asha_db::{
        connect_with_settings, migrations, DbPool, InteractionRepository,
        SqlInteractionRepository, SqlMetricsRepository,
    };

    use super::router;

    async fn test_router() -> (Router, DbPool) {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");

        let knowledge = KnowledgeBase {
            jobs: vec![JobRecord {
                id: "job-1".to_string(),
                title: "Data Analyst".to_string(),
                company: "AnalyticsFirst".to_string(),
                location: "Pune".to_string(),
                description: "Analyze data and report findings.".to_string(),
                ..JobRecord::default()
            }],
            ..KnowledgeBase::default()
        };

        let config = AppConfig::default();
        (router(pool.clone(), Arc::new(RwLock::new(knowledge)), &config), pool)
    }

    fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes =
            axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let (app, _pool) = test_router().await;

        let response = app
            .oneshot(json_request("/api/chat", serde_json::json!({ "message": "   " })))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Message cannot be empty");
    }

    #[tokio::test]
    async fn chat_reply_is_persisted_with_metrics() {
        let (app, pool) = test_router().await;

        let response = app
            .oneshot(json_request("/api/chat", serde_json::json!({ "message": "hello!" })))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response.headers().get("set-cookie").is_some(),
            "chat replies refresh the session cookie"
        );

        let body = json_body(response).await;
        let interaction_id =
            InteractionId::parse(body["id"].as_str().expect("id")).expect("valid uuid");
        assert!(body["message"].as_str().expect("message").contains("Asha"));

        let interactions = SqlInteractionRepository::new(pool.clone());
        let stored =
            interactions.find_by_id(&interaction_id).await.expect("query").expect("row exists");
        assert_eq!(stored.user_message, "hello!");

        let metrics = SqlMetricsRepository::new(pool);
        let today = chrono::Utc::now().date_naive();
        let row = asha_db::MetricsRepository::fetch(&metrics, today)
            .await
            .expect("query")
            .expect("metrics row");
        assert_eq!(row.counters.total_interactions, 1);
        assert_eq!(row.counters.bias_detections, 0);
    }

    #[tokio::test]
    async fn job_queries_bump_search_counters() {
        let (app, pool) = test_router().await;

        let response = app
            .oneshot(json_request(
                "/api/chat",
                serde_json::json!({ "message": "remote data analyst jobs?" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let metrics = SqlMetricsRepository::new(pool);
        let today = chrono::Utc::now().date_naive();
        let row = asha_db::MetricsRepository::fetch(&metrics, today)
            .await
            .expect("query")
            .expect("metrics row");
        assert_eq!(row.counters.job_searches, 1);
        assert_eq!(row.counters.filtered_job_searches, 1, "remote marks the search as filtered");
    }

    #[tokio::test]
    async fn biased_message_records_detection_without_interaction() {
        let (app, pool) = test_router().await;

        let response = app
            .oneshot(json_request(
                "/api/chat",
                serde_json::json!({ "message": "women can't code" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let rejected_id = body["id"].as_str().expect("id").to_string();

        let interactions = SqlInteractionRepository::new(pool.clone());
        let stored = interactions
            .find_by_id(&InteractionId(rejected_id))
            .await
            .expect("query");
        assert!(stored.is_none(), "bias rejections do not create interaction rows");

        let metrics = SqlMetricsRepository::new(pool);
        let today = chrono::Utc::now().date_naive();
        let row = asha_db::MetricsRepository::fetch(&metrics, today)
            .await
            .expect("query")
            .expect("metrics row");
        assert_eq!(row.counters.bias_detections, 1);
        assert_eq!(row.counters.total_interactions, 0);
    }

    #[tokio::test]
    async fn feedback_round_trip() {
        let (app, pool) = test_router().await;

        let interaction = Interaction::new("session-1", "hi", "hello!");
        SqlInteractionRepository::new(pool.clone())
            .insert(&interaction)
            .await
            .expect("seed interaction");

        let response = app
            .oneshot(json_request(
                "/api/feedback",
                serde_json::json!({ "id": interaction.id.0, "feedback": "positive" }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "success");

        let stored = SqlInteractionRepository::new(pool)
            .find_by_id(&interaction.id)
            .await
            .expect("query")
            .expect("row");
        assert_eq!(stored.feedback, Some(Feedback::Positive));
    }

    #[tokio::test]
    async fn feedback_validation_failures_are_bad_requests() {
        let (app, _pool) = test_router().await;

        let missing = app
            .clone()
            .oneshot(json_request("/api/feedback", serde_json::json!({ "id": "abc" })))
            .await
            .expect("response");
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let bad_uuid = app
            .clone()
            .oneshot(json_request(
                "/api/feedback",
                serde_json::json!({ "id": "not-a-uuid", "feedback": "positive" }),
            ))
            .await
            .expect("response");
        assert_eq!(bad_uuid.status(), StatusCode::BAD_REQUEST);

        let bad_value = app
            .clone()
            .oneshot(json_request(
                "/api/feedback",
                serde_json::json!({
                    "id": "123e4567-e89b-12d3-a456-426614174000",
                    "feedback": "amazing"
                }),
            ))
            .await
            .expect("response");
        assert_eq!(bad_value.status(), StatusCode::BAD_REQUEST);
        let body = json_body(bad_value).await;
        assert_eq!(body["error"], "Invalid feedback value");
    }

    #[tokio::test]
    async fn feedback_for_unknown_interaction_is_not_found() {
        let (app, _pool) = test_router().await;

        let response = app
            .oneshot(json_request(
                "/api/feedback",
                serde_json::json!({
                    "id": "123e4567-e89b-12d3-a456-426614174000",
                    "feedback": "neutral"
                }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn markup_in_messages_is_escaped_before_storage() {
        let (app, pool) = test_router().await;

        let response = app
            .oneshot(json_request(
                "/api/chat",
                serde_json::json!({ "message": "<script>alert(1)</script> hello" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let id = InteractionId::parse(body["id"].as_str().expect("id")).expect("uuid");

        let stored = SqlInteractionRepository::new(pool)
            .find_by_id(&id)
            .await
            .expect("query")
            .expect("row");
        assert!(!stored.user_message.contains('<'));
        assert!(stored.user_message.contains("&lt;script&gt;"));
    }
}
