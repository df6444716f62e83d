use rand::seq::SliceRandom;
use regex::Regex;
use tracing::info;

/// Score reported for any pattern-table hit. The tables are binary, so a
/// single fixed confidence is recorded with each detection.
pub const PATTERN_BIAS_SCORE: f64 = 0.9;

pub const GENDER_TOXIC_LABEL: &str = "gender/toxic";

const GENDER_STEREOTYPE_PATTERNS: &[&str] = &[
    r"\b(women|females?|girls) (can'?t|cannot|shouldn'?t|don'?t|are unable to) (code|program|lead|manage|negotiate|do (math|tech|engineering))\b",
    r"\b(men|males?|boys) (can'?t|cannot|shouldn'?t|don'?t) (nurture|care|listen|be (nurses|assistants|caregivers))\b",
    r"\b(chairman|fireman|policeman|stewardess|waitress|salesgirl|cleaning lady|mailman)\b",
    r"\b(she|her) (should|needs to) (smile more|be nicer|be less aggressive|be more agreeable)\b",
    r"\b(he|him) (should|needs to) (be tough|not cry|hide emotions|man up)\b",
    r"\b(women|females?) are (too emotional|less logical|weaker|less capable|less intelligent)\b",
    r"\b(men|males?) are (too aggressive|less caring|less nurturing)\b",
    r"\ball (women|men|females?|males?) are\b",
];

const TOXICITY_PATTERNS: &[&str] = &[
    r"\b(hate|despise|detest) (women|men|girls|boys|females?|males?)\b",
    r"\b(stupid|dumb|useless|inferior) (women|men|girls|boys|females?|males?)\b",
    r"\bwomen (belong|should stay|should be) (at home|in the kitchen)\b",
    r"\b(men|women) are better than (men|women)\b",
    r"\b(women|females?) (aren'?t|are not|don'?t) (belong|fit|suitable) (in|at|for) (the )?(workplace|office|work)\b",
    r"\b(males?|females?) (only|exclusive|better suited)\b",
    r"\b(all|most|typical) (women|men) (are|should|must|can'?t)\b",
    r"\b(women|men) jobs\b",
];

#[derive(Clone, Debug, PartialEq)]
pub struct BiasFinding {
    pub score: f64,
    pub bias_type: String,
    pub reply: String,
}

/// Rule-based bias detector. A hit rejects the message before any other
/// processing and is recorded separately from normal interactions.
pub struct BiasDetector {
    gender: Vec<Regex>,
    toxicity: Vec<Regex>,
}

impl Default for BiasDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl BiasDetector {
    pub fn new() -> Self {
        Self { gender: compile(GENDER_STEREOTYPE_PATTERNS), toxicity: compile(TOXICITY_PATTERNS) }
    }

    pub fn detect(&self, message: &str) -> Option<BiasFinding> {
        let lower = message.to_lowercase();

        if self.gender.iter().any(|pattern| pattern.is_match(&lower)) {
            info!(category = "gender_stereotype", "bias pattern matched");
            return Some(BiasFinding {
                score: PATTERN_BIAS_SCORE,
                bias_type: GENDER_TOXIC_LABEL.to_string(),
                reply: choose(STEREOTYPE_REPLIES),
            });
        }

        if self.toxicity.iter().any(|pattern| pattern.is_match(&lower)) {
            info!(category = "toxicity", "bias pattern matched");
            return Some(BiasFinding {
                score: PATTERN_BIAS_SCORE,
                bias_type: GENDER_TOXIC_LABEL.to_string(),
                reply: choose(TOXICITY_REPLIES),
            });
        }

        None
    }
}

const STEREOTYPE_REPLIES: &[&str] = &[
    "Your message contains a gender-biased statement that reinforces stereotypes. We believe \
     in equal opportunities regardless of gender - could you rephrase it?",
    "That wording leans on a gender stereotype. Everyone here deserves the same opportunities; \
     please try asking in a more neutral way.",
];

const TOXICITY_REPLIES: &[&str] = &[
    "Your message contains content that could be considered offensive or discriminatory. \
     Please rephrase your request in a more respectful way.",
    "I can't help with that as phrased - the wording reads as disrespectful. A respectful \
     rephrasing will get us back to your career questions.",
];

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().filter_map(|pattern| Regex::new(pattern).ok()).collect()
}

fn choose(options: &[&str]) -> String {
    options
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Could you please rephrase your message?")
        .to_string()
}
