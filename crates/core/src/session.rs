use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    JobRole,
    Location,
    Skill,
    Industry,
    EventType,
}

impl EntityKind {
    /// Entity kinds folded into the retrieval query. Event types steer the
    /// event shortcut instead and are deliberately excluded here.
    pub const SEARCH_RELEVANT: [EntityKind; 4] =
        [Self::JobRole, Self::Location, Self::Skill, Self::Industry];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Per-browser-session conversation state, carried in a signed cookie.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub id: String,
    pub expires_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    #[serde(default)]
    pub history: Vec<Turn>,
    #[serde(default)]
    pub entities: BTreeMap<EntityKind, Vec<String>>,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub last_topic: Option<String>,
    #[serde(default)]
    pub events_shown: Vec<String>,
}

impl SessionContext {
    pub fn new(ttl_secs: u64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            expires_at: now + Duration::seconds(ttl_secs as i64),
            last_active: now,
            history: Vec::new(),
            entities: BTreeMap::new(),
            last_message: None,
            last_topic: None,
            events_shown: Vec::new(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn touch(&mut self, ttl_secs: u64) {
        let now = Utc::now();
        self.last_active = now;
        self.expires_at = now + Duration::seconds(ttl_secs as i64);
    }

    /// True before the first exchange has been recorded.
    pub fn is_new_conversation(&self) -> bool {
        self.history.len() <= 1
    }

    pub fn push_turn(&mut self, role: Role, content: impl Into<String>, history_cap: usize) {
        self.history.push(Turn { role, content: content.into() });
        if self.history.len() > history_cap {
            let excess = self.history.len() - history_cap;
            self.history.drain(..excess);
        }
    }

    /// Merge newly extracted entity values: append, deduplicate preserving
    /// first-seen order, then keep only the most recent `entity_cap` values.
    pub fn merge_entities(
        &mut self,
        extracted: BTreeMap<EntityKind, Vec<String>>,
        entity_cap: usize,
    ) {
        for (kind, values) in extracted {
            let existing = self.entities.entry(kind).or_default();
            for value in values {
                if !existing.contains(&value) {
                    existing.push(value);
                }
            }
            if existing.len() > entity_cap {
                let excess = existing.len() - entity_cap;
                existing.drain(..excess);
            }
        }
    }

    /// The most recent `count` remembered values for an entity kind.
    pub fn recent_entities(&self, kind: EntityKind, count: usize) -> &[String] {
        match self.entities.get(&kind) {
            Some(values) => {
                let start = values.len().saturating_sub(count);
                &values[start..]
            }
            None => &[],
        }
    }
}
