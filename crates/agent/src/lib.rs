//! Message-processing pipeline for the Asha career assistant.
//!
//! Every user message flows through a constrained, single-pass chain:
//! 1. **Bias detection** (`bias`) - pattern tables that reject the message
//!    outright and are recorded separately.
//! 2. **Guardrails** (`guardrails`) - off-topic, personal-question,
//!    sensitive-topic, and speculative-advice checks with canned replies.
//! 3. **Event shortcut** (`events`) - event-keyword queries skip retrieval
//!    and filter the event records directly.
//! 4. **Entity extraction** (`entities`) - regex capture of roles,
//!    locations, skills, industries, and event types into the session.
//! 5. **Retrieval** (`retrieval`) - keyword-overlap scoring over the
//!    in-memory knowledge base.
//! 6. **Response assembly** (`responder`, `filters`) - template selection
//!    and formatting for the retrieved records.
//!
//! `engine::ChatEngine` ties the stages together; everything it does is
//! deterministic apart from canned-template selection.

pub mod bias;
pub mod engine;
pub mod entities;
pub mod events;
pub mod filters;
pub mod guardrails;
pub mod responder;
pub mod retrieval;

pub use bias::{BiasDetector, BiasFinding};
pub use engine::{search_metrics_for, ChatEngine, ChatOutcome, EngineSettings, ReplyKind};
pub use entities::EntityExtractor;
pub use filters::JobFilters;
pub use guardrails::{GuardrailCategory, GuardrailChain, GuardrailHit};
pub use responder::QueryType;
pub use retrieval::ScoredDoc;
