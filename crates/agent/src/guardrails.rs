use rand::seq::SliceRandom;
use regex::Regex;
use tracing::info;

/// Guardrail categories checked in order; the first hit wins. The bias
/// detector runs before this chain and is handled separately because its
/// hits are persisted (see `bias`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardrailCategory {
    InclusiveLanguage,
    OffTopic,
    PersonalQuestion,
    SensitiveTopic,
    SpeculativeAdvice,
}

impl GuardrailCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InclusiveLanguage => "inclusive_language",
            Self::OffTopic => "off_topic",
            Self::PersonalQuestion => "personal_question",
            Self::SensitiveTopic => "sensitive_topic",
            Self::SpeculativeAdvice => "speculative_advice",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GuardrailHit {
    pub category: GuardrailCategory,
    pub reply: String,
}

const INCLUSIVE_LANGUAGE_PATTERNS: &[&str] = &[
    r"\b(woman'?s place|men'?s work|girls can'?t|boys don'?t|male-dominated)\b",
    r"\b(women|females?|girls) .{0,20}(can'?t|cannot|shouldn'?t|should not) .{0,20}(job|work|career|lead|manage)\b",
    r"\b(manpower|mankind|man-made|chairman|policeman|fireman|stewardess|congressman)\b",
    r"\b(assertive women|bossy|shrill|hysterical|catty)\b",
    r"\b(maternal|nurturing) (qualities|instincts|nature) for women\b",
    r"\b(technical|analytical|logical) (positions|roles|jobs) for men\b",
    r"\b(too old|too young) for (this job|this position|this role|this field)\b",
    r"\b(over the hill|past prime|set in ways|dinosaur)\b",
    r"\b(inexperienced|entitled|lazy) generation\b",
    r"\b(cultural fit|heavy accent|foreign accent|speak like a native)\b",
    r"\b(diversity hire|token|model minority)\b",
    r"\b(attractive|presentable|looks professional) (requirement|qualification|asset)?\b",
    r"\b(planning (on having|to have) children|pregnancy plans|family plans)\b",
    r"\b(handicapped|wheelchair-bound|mentally challenged|crippled)\b",
    r"\b(real man|real woman|feminine enough|masculine enough|girly|effeminate)\b",
    r"\b(poor people are|people on welfare|lower class)\b",
    r"\b(elite school|right family|right neighborhood)\b",
];

const OFF_TOPIC_PATTERNS: &[&str] = &[
    r"\b(joke|funny|humor|weather|sports|politics|religion)\b",
    r"\b(sing|dance|play a game|movie|music|book club)\b",
    r"\b(buy|purchase|shop|shopping|headphone|electronics|clothes|shoes)\b",
    r"\b(price|cheap|expensive|discount|sale|deal|offer) (of|on|for)\b",
];

const PERSONAL_QUESTION_PATTERNS: &[&str] = &[
    r"\b(your opinion|what do you think about|do you believe|what is your take)\b",
    r"\b(your favorite|you prefer|you like|you enjoy|you hate|you dislike)\b",
    r"\b(tell me about you|about yourself|your creator|who made you|are you (real|an? ai))\b",
];

const SENSITIVE_TOPIC_PATTERNS: &[&str] = &[
    r"\b(salary negotiation|pay gap|discrimination|harassment|toxic workplace)\b",
    r"\b(mental health|depression|anxiety|burnout)\b",
    r"\b(lawsuit|legal action|sue|grievance)\b",
];

const SPECULATIVE_PATTERNS: &[&str] = &[
    r"\b(predict|forecast|outlook|projection)\b",
    r"\b(will i|should i|would i|could i) (get|land|find|succeed)\b",
    r"\b(guarantee|promise|ensure|definitely) (a|an|the|me)\b",
];

const INCLUSIVE_LANGUAGE_REPLIES: &[&str] = &[
    "I noticed some wording in your question that we could make more inclusive. Would you mind \
     rephrasing it? I'm happy to help with jobs, events, and mentorship opportunities.",
    "Some of that language might unintentionally reinforce stereotypes. Could we reframe the \
     question in neutral terms? Then I can point you at the right career resources.",
    "To keep things welcoming for every professional, could you reword that? I'd love to help \
     you find opportunities that fit your goals.",
];

const OFF_TOPIC_REPLIES: &[&str] = &[
    "I'm Asha, a career assistant, so that one is outside my lane. I can help you explore job \
     openings, career events, or mentorship programs - what would be useful?",
    "That's not something I can help with, but career growth is my specialty. Would you like \
     to look at job opportunities, upcoming events, or mentorship connections?",
    "My expertise is career support rather than that topic. I'd be glad to help with job \
     searches, professional events, or finding a mentor instead.",
];

const PERSONAL_QUESTION_REPLIES: &[&str] = &[
    "I don't have personal preferences - I stick to factual career information. What kind of \
     opportunity can I look up for you?",
    "Rather than sharing opinions, I can offer concrete information on jobs, events, and \
     mentorship programs. Which would you like to explore?",
    "I'm here to provide objective career information rather than personal views. How can I \
     support your professional goals today?",
];

const SENSITIVE_TOPIC_REPLIES: &[&str] = &[
    "That's an important topic, and it deserves guidance tailored to your situation. A mentor \
     can give you that kind of support - would you like information about mentorship programs?",
    "Thank you for raising this. For sensitive workplace matters, talking with an experienced \
     mentor is usually the most helpful next step. Shall I share mentorship options?",
    "This matters, and you deserve more than generic advice. Our mentorship programs connect \
     you with professionals who can speak to your specific circumstances - want details?",
];

const SPECULATIVE_REPLIES: &[&str] = &[
    "I can't predict outcomes, but I can share current, factual information about openings, \
     events, and mentorship programs so you can decide for yourself. Where should we start?",
    "Rather than making forecasts, let me offer what's actually available right now - job \
     listings, scheduled events, or mentorship programs. Which interests you?",
];

/// The ordered regex guardrail chain; evaluated on every message before
/// entity extraction and retrieval.
pub struct GuardrailChain {
    checks: Vec<(GuardrailCategory, Vec<Regex>, &'static [&'static str])>,
}

impl Default for GuardrailChain {
    fn default() -> Self {
        Self::new()
    }
}

impl GuardrailChain {
    pub fn new() -> Self {
        Self {
            checks: vec![
                (
                    GuardrailCategory::InclusiveLanguage,
                    compile(INCLUSIVE_LANGUAGE_PATTERNS),
                    INCLUSIVE_LANGUAGE_REPLIES,
                ),
                (GuardrailCategory::OffTopic, compile(OFF_TOPIC_PATTERNS), OFF_TOPIC_REPLIES),
                (
                    GuardrailCategory::PersonalQuestion,
                    compile(PERSONAL_QUESTION_PATTERNS),
                    PERSONAL_QUESTION_REPLIES,
                ),
                (
                    GuardrailCategory::SensitiveTopic,
                    compile(SENSITIVE_TOPIC_PATTERNS),
                    SENSITIVE_TOPIC_REPLIES,
                ),
                (
                    GuardrailCategory::SpeculativeAdvice,
                    compile(SPECULATIVE_PATTERNS),
                    SPECULATIVE_REPLIES,
                ),
            ],
        }
    }

    pub fn evaluate(&self, message: &str) -> Option<GuardrailHit> {
        let lower = message.to_lowercase();

        for (category, patterns, replies) in &self.checks {
            if patterns.iter().any(|pattern| pattern.is_match(&lower)) {
                info!(category = category.as_str(), "guardrail matched");
                return Some(GuardrailHit { category: *category, reply: choose(replies) });
            }
        }

        None
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().filter_map(|pattern| Regex::new(pattern).ok()).collect()
}

fn choose(options: &[&str]) -> String {
    options
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Could we get back to your career questions?")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{GuardrailCategory, GuardrailChain};

    #[test]
    fn off_topic_shopping_is_redirected() {
        let chain = GuardrailChain::new();
        let hit = chain.evaluate("can you help me buy headphones?").expect("should hit");
        assert_eq!(hit.category, GuardrailCategory::OffTopic);
        assert!(!hit.reply.is_empty());
    }

    #[test]
    fn personal_questions_are_deflected() {
        let chain = GuardrailChain::new();
        let hit = chain.evaluate("what is your favorite movie?").expect("should hit");
        // Both off-topic (movie) and personal (your favorite) match; the
        // chain order decides, and off-topic is checked first.
        assert_eq!(hit.category, GuardrailCategory::OffTopic);

        let hit = chain.evaluate("what do you think about my resume?").expect("should hit");
        assert_eq!(hit.category, GuardrailCategory::PersonalQuestion);
    }

    #[test]
    fn sensitive_topics_route_to_mentorship() {
        let chain = GuardrailChain::new();
        let hit = chain.evaluate("I'm dealing with harassment at work").expect("should hit");
        assert_eq!(hit.category, GuardrailCategory::SensitiveTopic);
        assert!(hit.reply.to_lowercase().contains("mentor"));
    }

    #[test]
    fn prediction_requests_are_declined() {
        let chain = GuardrailChain::new();
        let hit = chain.evaluate("can you predict the job market next year?").expect("should hit");
        assert_eq!(hit.category, GuardrailCategory::SpeculativeAdvice);
    }

    #[test]
    fn exclusionary_wording_is_flagged() {
        let chain = GuardrailChain::new();
        let hit = chain.evaluate("is she too old for this job?").expect("should hit");
        assert_eq!(hit.category, GuardrailCategory::InclusiveLanguage);
    }

    #[test]
    fn plain_job_queries_pass() {
        let chain = GuardrailChain::new();
        assert!(chain.evaluate("show me marketing jobs in mumbai").is_none());
        assert!(chain.evaluate("any upcoming networking events?").is_none());
    }
}
