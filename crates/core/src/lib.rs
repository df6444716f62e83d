pub mod config;
pub mod domain;
pub mod errors;
pub mod knowledge;
pub mod session;
pub mod text;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::interaction::{BiasDetection, Feedback, Interaction, InteractionId};
pub use domain::metrics::{DailyMetrics, MetricsRow, SearchKind};
pub use domain::record::{
    EventRecord, JobRecord, KnowledgeDoc, KnowledgeKind, MentorshipRecord,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use knowledge::{KnowledgeBase, KnowledgeError};
pub use session::{EntityKind, Role, SessionContext, Turn};
