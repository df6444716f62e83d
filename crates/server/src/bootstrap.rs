use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use asha_core::config::{AppConfig, ConfigError, LoadOptions};
use asha_core::{KnowledgeBase, KnowledgeError};
use asha_db::{connect_with_settings, migrations, DbPool};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub knowledge: Arc<RwLock<KnowledgeBase>>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("knowledge base load failed: {0}")]
    Knowledge(#[from] KnowledgeError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let knowledge = KnowledgeBase::load_dir(&config.knowledge.data_dir)?;
    info!(
        event_name = "system.bootstrap.knowledge_loaded",
        jobs = knowledge.jobs.len(),
        events = knowledge.events.len(),
        mentorships = knowledge.mentorships.len(),
        "knowledge base loaded"
    );

    Ok(Application { config, db_pool, knowledge: Arc::new(RwLock::new(knowledge)) })
}
