use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionId(pub String);

impl InteractionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(raw)
            .map(|id| Self(id.to_string()))
            .map_err(|_| DomainError::InvalidInteractionId(raw.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Positive,
    Negative,
    Neutral,
}

impl Feedback {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl std::str::FromStr for Feedback {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            other => Err(DomainError::InvalidFeedback(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interaction {
    pub id: InteractionId,
    pub session_id: String,
    pub user_message: String,
    pub bot_response: String,
    pub timestamp: DateTime<Utc>,
    pub feedback: Option<Feedback>,
}

impl Interaction {
    pub fn new(
        session_id: impl Into<String>,
        user_message: impl Into<String>,
        bot_response: impl Into<String>,
    ) -> Self {
        Self {
            id: InteractionId::generate(),
            session_id: session_id.into(),
            user_message: user_message.into(),
            bot_response: bot_response.into(),
            timestamp: Utc::now(),
            feedback: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BiasDetection {
    pub interaction_id: InteractionId,
    pub message: String,
    pub bias_score: f64,
    pub bias_type: String,
    pub timestamp: DateTime<Utc>,
}

impl BiasDetection {
    pub fn new(message: impl Into<String>, bias_score: f64, bias_type: impl Into<String>) -> Self {
        Self {
            interaction_id: InteractionId::generate(),
            message: message.into(),
            bias_score,
            bias_type: bias_type.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Feedback, InteractionId};
    use crate::errors::DomainError;

    #[test]
    fn feedback_round_trips_through_str() {
        for (value, text) in [
            (Feedback::Positive, "positive"),
            (Feedback::Negative, "negative"),
            (Feedback::Neutral, "neutral"),
        ] {
            assert_eq!(value.as_str(), text);
            assert_eq!(text.parse::<Feedback>().expect("parse feedback"), value);
        }
    }

    #[test]
    fn feedback_parse_is_case_insensitive() {
        assert_eq!("POSITIVE".parse::<Feedback>().expect("parse"), Feedback::Positive);
    }

    #[test]
    fn unknown_feedback_is_rejected() {
        let error = "excellent".parse::<Feedback>().expect_err("should reject");
        assert_eq!(error, DomainError::InvalidFeedback("excellent".to_string()));
    }

    #[test]
    fn interaction_id_rejects_malformed_uuid() {
        assert!(InteractionId::parse("not-a-uuid").is_err());
        let generated = InteractionId::generate();
        assert!(InteractionId::parse(&generated.0).is_ok());
    }
}
