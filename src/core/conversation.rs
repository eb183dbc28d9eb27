use crate::core::message::Message;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Identifier of a stored conversation: milliseconds since the Unix epoch at
/// creation time, kept strictly increasing by [`IdGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub i64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConversationId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(ConversationId)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Create an empty conversation titled after its position at creation
    /// time. Titles are never renumbered, so they may repeat after deletions.
    pub fn new(id: ConversationId, existing_count: usize) -> Self {
        Self {
            id,
            title: default_title(existing_count),
            messages: Vec::new(),
        }
    }
}

pub fn default_title(existing_count: usize) -> String {
    format!("Conversation {}", existing_count + 1)
}

/// Hands out timestamp ids, bumping past the previous id when the clock has
/// not advanced (or went backwards). Once the id space above the newest id is
/// exhausted, the lowest unused non-negative id is handed out instead.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: Option<i64>,
    issued: BTreeSet<i64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure future ids sort after `id` and never repeat it.
    pub fn observe(&mut self, id: ConversationId) {
        self.issued.insert(id.0);
        if self.last.is_none_or(|last| id.0 > last) {
            self.last = Some(id.0);
        }
    }

    pub fn next_id(&mut self) -> ConversationId {
        self.next_from_clock(Utc::now().timestamp_millis())
    }

    fn next_from_clock(&mut self, now_ms: i64) -> ConversationId {
        let id = match self.last {
            Some(last) if now_ms <= last => match last.checked_add(1) {
                Some(next) => next,
                None => self.lowest_free(),
            },
            _ => now_ms,
        };
        self.observe(ConversationId(id));
        ConversationId(id)
    }

    fn lowest_free(&self) -> i64 {
        let mut candidate = 0;
        for &id in self.issued.range(0..) {
            if id != candidate {
                break;
            }
            candidate += 1;
        }
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_title_is_positional() {
        assert_eq!(default_title(0), "Conversation 1");
        assert_eq!(Conversation::new(ConversationId(7), 2).title, "Conversation 3");
    }

    #[test]
    fn ids_stay_unique_when_clock_stalls() {
        let mut ids = IdGenerator::new();
        let a = ids.next_from_clock(1_000);
        let b = ids.next_from_clock(1_000);
        let c = ids.next_from_clock(999);
        let d = ids.next_from_clock(5_000);
        assert_eq!(a, ConversationId(1_000));
        assert_eq!(b, ConversationId(1_001));
        assert_eq!(c, ConversationId(1_002));
        assert_eq!(d, ConversationId(5_000));
    }

    #[test]
    fn observed_ids_seed_the_generator() {
        let mut ids = IdGenerator::new();
        ids.observe(ConversationId(10_000));
        ids.observe(ConversationId(3));
        assert_eq!(ids.next_from_clock(50), ConversationId(10_001));
    }

    #[test]
    fn exhausted_id_space_reuses_lowest_free_id() {
        let mut ids = IdGenerator::new();
        ids.observe(ConversationId(i64::MAX));
        ids.observe(ConversationId(0));
        assert_eq!(ids.next_from_clock(50), ConversationId(1));
        assert_eq!(ids.next_from_clock(50), ConversationId(2));
        assert_eq!(ids.next_from_clock(i64::MAX), ConversationId(3));
    }

    #[test]
    fn conversation_id_parses_from_cli_text() {
        assert_eq!(" 42 ".parse::<ConversationId>().unwrap(), ConversationId(42));
        assert!("abc".parse::<ConversationId>().is_err());
    }

    #[test]
    fn conversation_json_matches_storage_schema() {
        let conversation = Conversation {
            id: ConversationId(1_700_000_000_000),
            title: "Conversation 1".into(),
            messages: vec![Message::user("hi")],
        };
        let json = serde_json::to_string(&conversation).unwrap();
        assert_eq!(
            json,
            r#"{"id":1700000000000,"title":"Conversation 1","messages":[{"role":"user","content":"hi"}]}"#
        );
    }
}
