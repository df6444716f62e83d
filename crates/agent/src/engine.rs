use tracing::{debug, info};

use asha_core::session::{Role, SessionContext};
use asha_core::{KnowledgeBase, SearchKind};

use crate::bias::{BiasDetector, BiasFinding};
use crate::entities::EntityExtractor;
use crate::events;
use crate::filters;
use crate::guardrails::{GuardrailCategory, GuardrailChain};
use crate::responder::{self, QueryType};
use crate::retrieval;

#[derive(Clone, Copy, Debug)]
pub struct EngineSettings {
    pub top_k: usize,
    pub history_turns: usize,
    pub entity_values: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self { top_k: 5, history_turns: 10, entity_values: 5 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyKind {
    Guardrail(GuardrailCategory),
    Event,
    Welcome,
    Farewell,
    Search(QueryType),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ChatOutcome {
    /// The message was rejected by the bias detector before any processing;
    /// no interaction is recorded, only the detection itself.
    BiasRejected(BiasFinding),
    Reply { text: String, kind: ReplyKind },
}

/// The single-pass message pipeline: guardrails, event shortcut, entity
/// extraction, keyword retrieval, template response.
pub struct ChatEngine {
    bias: BiasDetector,
    guardrails: GuardrailChain,
    entities: EntityExtractor,
    settings: EngineSettings,
}

impl Default for ChatEngine {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

impl ChatEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            bias: BiasDetector::new(),
            guardrails: GuardrailChain::new(),
            entities: EntityExtractor::new(),
            settings,
        }
    }

    pub fn process(
        &self,
        message: &str,
        ctx: &mut SessionContext,
        knowledge: &KnowledgeBase,
    ) -> ChatOutcome {
        if let Some(finding) = self.bias.detect(message) {
            info!(bias_type = %finding.bias_type, score = finding.score, "message rejected by bias detector");
            return ChatOutcome::BiasRejected(finding);
        }

        if let Some(hit) = self.guardrails.evaluate(message) {
            // Guardrail replies do not advance the conversation state.
            return ChatOutcome::Reply { text: hit.reply, kind: ReplyKind::Guardrail(hit.category) };
        }

        if events::is_event_query(message) {
            return self.answer_event_query(message, ctx, knowledge);
        }

        let extracted = self.entities.extract(message);
        if !extracted.is_empty() {
            debug!(kinds = extracted.len(), "merging extracted entities into session");
            ctx.merge_entities(extracted, self.settings.entity_values);
        }

        ctx.push_turn(Role::User, message, self.settings.history_turns);
        ctx.last_message = Some(message.to_string());

        if ctx.is_new_conversation() {
            let text = responder::welcome_message();
            ctx.push_turn(Role::Assistant, text.clone(), self.settings.history_turns);
            return ChatOutcome::Reply { text, kind: ReplyKind::Welcome };
        }

        if responder::is_farewell(message) {
            let text = responder::farewell_message();
            ctx.push_turn(Role::Assistant, text.clone(), self.settings.history_turns);
            return ChatOutcome::Reply { text, kind: ReplyKind::Farewell };
        }

        let query = retrieval::build_search_query(message, ctx);
        let results = retrieval::keyword_search(&query, &knowledge.documents(), self.settings.top_k);
        debug!(results = results.len(), "keyword retrieval finished");

        let (mut text, query_type) = if results.is_empty() {
            (
                "I couldn't find specific information related to your query. Would you please \
                 elaborate more?"
                    .to_string(),
                QueryType::General,
            )
        } else {
            let query_type = responder::identify_query_type(message, &results);
            let job_filters = filters::detect_job_filters(message);
            (responder::format_results(query_type, &results, &job_filters), query_type)
        };

        if let Some(reminder) = responder::maybe_care_reminder() {
            text.push_str(&reminder);
        }

        ctx.push_turn(Role::Assistant, text.clone(), self.settings.history_turns);
        ChatOutcome::Reply { text, kind: ReplyKind::Search(query_type) }
    }

    fn answer_event_query(
        &self,
        message: &str,
        ctx: &mut SessionContext,
        knowledge: &KnowledgeBase,
    ) -> ChatOutcome {
        let event_type = events::extract_event_type(message);
        let location = events::extract_event_location(message);

        let matched = events::search_events(
            &knowledge.events,
            None,
            event_type.as_deref(),
            location.as_deref(),
            5,
        );
        info!(found = matched.len(), "event query handled");

        let text = events::format_event_list(&matched);

        ctx.last_topic = Some("events".to_string());
        ctx.events_shown = matched.iter().take(5).map(|event| event.id.clone()).collect();
        ctx.last_message = Some(message.to_string());
        ctx.push_turn(Role::User, message, self.settings.history_turns);
        ctx.push_turn(Role::Assistant, text.clone(), self.settings.history_turns);

        ChatOutcome::Reply { text, kind: ReplyKind::Event }
    }
}

/// Which per-day search counters a message should bump. `job` wins over
/// `event` and `mentor`, and a refinement term additionally marks the job
/// search as filtered.
pub fn search_metrics_for(message: &str) -> Vec<SearchKind> {
    let lower = message.to_lowercase();

    if lower.contains("job") {
        let mut kinds = vec![SearchKind::Job];
        if filters::has_refinement_terms(&lower) {
            kinds.push(SearchKind::FilteredJob);
        }
        kinds
    } else if lower.contains("event") {
        vec![SearchKind::Event]
    } else if lower.contains("mentor") {
        vec![SearchKind::Mentorship]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use asha_core::session::{Role, SessionContext};
    use asha_core::{EventRecord, JobRecord, KnowledgeBase, MentorshipRecord, SearchKind};

    use crate::guardrails::GuardrailCategory;
    use crate::responder::QueryType;

    use super::{search_metrics_for, ChatEngine, ChatOutcome, ReplyKind};

    fn knowledge_fixture() -> KnowledgeBase {
        KnowledgeBase {
            jobs: vec![
                JobRecord {
                    id: "job-1".to_string(),
                    title: "Data Analyst".to_string(),
                    company: "AnalyticsFirst".to_string(),
                    location: "Hyderabad (Hybrid)".to_string(),
                    description: "Interpret data and provide reports for business decisions."
                        .to_string(),
                    ..JobRecord::default()
                },
                JobRecord {
                    id: "job-2".to_string(),
                    title: "Frontend Developer".to_string(),
                    company: "TechCorp".to_string(),
                    location: "Bangalore (Remote)".to_string(),
                    description: "Develop user interfaces with responsive design.".to_string(),
                    ..JobRecord::default()
                },
            ],
            events: vec![EventRecord {
                id: "event-1".to_string(),
                title: "Resume Workshop".to_string(),
                date: "Sep 20, 2026".to_string(),
                location: "Virtual".to_string(),
                description: "Hands-on resume feedback.".to_string(),
                organizer: "LeadHER".to_string(),
                mode: "workshop".to_string(),
                url: None,
                registration_url: None,
            }],
            mentorships: vec![MentorshipRecord {
                id: "m-1".to_string(),
                title: "Tech Leadership Circle".to_string(),
                mentor: "Priya Sharma".to_string(),
                expertise: "engineering management".to_string(),
                description: "Structured guidance toward leadership roles.".to_string(),
            }],
        }
    }

    fn warmed_up_context() -> SessionContext {
        let mut ctx = SessionContext::new(3600);
        ctx.push_turn(Role::User, "hi", 10);
        ctx.push_turn(Role::Assistant, "welcome!", 10);
        ctx
    }

    #[test]
    fn biased_message_is_rejected_without_touching_the_session() {
        let engine = ChatEngine::default();
        let mut ctx = SessionContext::new(3600);
        let knowledge = knowledge_fixture();

        let outcome = engine.process("women can't code", &mut ctx, &knowledge);

        assert!(matches!(outcome, ChatOutcome::BiasRejected(_)));
        assert!(ctx.history.is_empty());
        assert!(ctx.last_message.is_none());
    }

    #[test]
    fn guardrail_reply_leaves_history_unchanged() {
        let engine = ChatEngine::default();
        let mut ctx = warmed_up_context();
        let knowledge = knowledge_fixture();

        let outcome = engine.process("can you help me buy shoes?", &mut ctx, &knowledge);

        match outcome {
            ChatOutcome::Reply { kind: ReplyKind::Guardrail(category), .. } => {
                assert_eq!(category, GuardrailCategory::OffTopic);
            }
            other => panic!("expected guardrail reply, got {other:?}"),
        }
        assert_eq!(ctx.history.len(), 2, "guardrail hits do not advance history");
    }

    #[test]
    fn first_message_gets_a_welcome() {
        let engine = ChatEngine::default();
        let mut ctx = SessionContext::new(3600);
        let knowledge = knowledge_fixture();

        let outcome = engine.process("hello!", &mut ctx, &knowledge);

        match outcome {
            ChatOutcome::Reply { kind, ref text } => {
                assert_eq!(kind, ReplyKind::Welcome);
                assert!(text.contains("Asha"));
            }
            other => panic!("expected welcome, got {other:?}"),
        }
        assert_eq!(ctx.history.len(), 2);
    }

    #[test]
    fn farewell_is_acknowledged_in_an_ongoing_conversation() {
        let engine = ChatEngine::default();
        let mut ctx = warmed_up_context();
        let knowledge = knowledge_fixture();

        let outcome = engine.process("thanks, goodbye!", &mut ctx, &knowledge);

        assert!(matches!(outcome, ChatOutcome::Reply { kind: ReplyKind::Farewell, .. }));
    }

    #[test]
    fn job_query_retrieves_and_formats_results() {
        let engine = ChatEngine::default();
        let mut ctx = warmed_up_context();
        let knowledge = knowledge_fixture();

        let outcome = engine.process("any data analyst jobs?", &mut ctx, &knowledge);

        match outcome {
            ChatOutcome::Reply { kind: ReplyKind::Search(query_type), ref text } => {
                assert_eq!(query_type, QueryType::FilteredJob);
                assert!(text.contains("Data Analyst"));
            }
            other => panic!("expected search reply, got {other:?}"),
        }
        assert_eq!(ctx.last_message.as_deref(), Some("any data analyst jobs?"));
        assert_eq!(ctx.history.len(), 4);
    }

    #[test]
    fn event_query_takes_the_shortcut_and_updates_topic() {
        let engine = ChatEngine::default();
        let mut ctx = warmed_up_context();
        let knowledge = knowledge_fixture();

        let outcome = engine.process("any workshops I can join?", &mut ctx, &knowledge);

        match outcome {
            ChatOutcome::Reply { kind: ReplyKind::Event, ref text } => {
                assert!(text.contains("Resume Workshop"));
            }
            other => panic!("expected event reply, got {other:?}"),
        }
        assert_eq!(ctx.last_topic.as_deref(), Some("events"));
        assert_eq!(ctx.events_shown, vec!["event-1".to_string()]);
    }

    #[test]
    fn unanswerable_query_asks_for_elaboration() {
        let engine = ChatEngine::default();
        let mut ctx = warmed_up_context();
        let knowledge = KnowledgeBase::default();

        let outcome = engine.process("zzz qqq xyzzy", &mut ctx, &knowledge);

        match outcome {
            ChatOutcome::Reply { kind: ReplyKind::Search(query_type), ref text } => {
                assert_eq!(query_type, QueryType::General);
                assert!(text.contains("elaborate"));
            }
            other => panic!("expected general reply, got {other:?}"),
        }
    }

    #[test]
    fn history_respects_the_configured_cap() {
        let engine = ChatEngine::default();
        let mut ctx = warmed_up_context();
        let knowledge = knowledge_fixture();

        for index in 0..12 {
            engine.process(&format!("analyst openings round {index}"), &mut ctx, &knowledge);
        }

        assert!(ctx.history.len() <= 10);
    }

    #[test]
    fn search_metric_classification_follows_message_keywords() {
        assert_eq!(search_metrics_for("remote jobs please"), vec![
            SearchKind::Job,
            SearchKind::FilteredJob
        ]);
        assert_eq!(search_metrics_for("any jobs?"), vec![SearchKind::Job]);
        assert_eq!(search_metrics_for("upcoming events?"), vec![SearchKind::Event]);
        assert_eq!(search_metrics_for("find me a mentor"), vec![SearchKind::Mentorship]);
        assert!(search_metrics_for("hello there").is_empty());
    }
}
