//! Chat messages and the bounded in-memory log

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A chat message as stored by the remote service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(deserialize_with = "lenient_id")]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub text: String,
    /// Absent or unparseable timestamps are kept as `None`
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Message {
    /// A message that exists only in this client (never sent).
    pub fn local(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            text: text.into(),
            created_at: Some(Utc::now()),
        }
    }
}

/// Ids arrive as JSON numbers from REST and sometimes as strings from the
/// realtime feed.
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(i64),
        Text(String),
    }

    match Id::deserialize(deserializer)? {
        Id::Number(n) => Ok(n),
        Id::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }))
}

/// Most recent messages, oldest first, bounded in size.
#[derive(Debug)]
pub struct MessageLog {
    messages: VecDeque<Message>,
    capacity: usize,
}

impl MessageLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Replace the contents with a history page (already in display order).
    pub fn replace(&mut self, history: Vec<Message>) {
        let skip = history.len().saturating_sub(self.capacity);
        self.messages = history.into_iter().skip(skip).collect();
    }

    /// Append in arrival order, evicting the oldest entries past capacity.
    pub fn push(&mut self, message: Message) {
        self.messages.push_back(message);
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
    }

    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn msg(id: i64) -> Message {
        Message {
            id,
            name: format!("n{id}"),
            text: format!("t{id}"),
            created_at: None,
        }
    }

    fn ids(log: &MessageLog) -> Vec<i64> {
        log.snapshot().iter().map(|m| m.id).collect()
    }

    #[test]
    fn test_parse_rest_row() {
        let m: Message = serde_json::from_str(
            r#"{"id":42,"name":"ana","text":"hi","created_at":"2024-05-01T12:30:00.123456+00:00"}"#,
        )
        .unwrap();
        assert_eq!(m.id, 42);
        assert_eq!(m.name, "ana");
        assert_eq!(
            m.created_at.map(|t| t.to_rfc3339()),
            Some("2024-05-01T12:30:00.123456+00:00".to_string())
        );
    }

    #[test]
    fn test_parse_string_id_and_bad_timestamp() {
        let m: Message =
            serde_json::from_str(r#"{"id":"7","name":"b","text":"x","created_at":"soon"}"#)
                .unwrap();
        assert_eq!(m.id, 7);
        assert_eq!(m.created_at, None);

        let m: Message = serde_json::from_str(r#"{"id":8}"#).unwrap();
        assert_eq!(m.text, "");
    }

    #[test]
    fn test_non_numeric_id_rejected() {
        assert!(serde_json::from_str::<Message>(r#"{"id":"abc"}"#).is_err());
    }

    #[test]
    fn test_log_never_exceeds_capacity() {
        let mut log = MessageLog::new(200);
        for id in 0..450 {
            log.push(msg(id));
            assert!(log.len() <= 200);
        }
        let ids = ids(&log);
        assert_eq!(ids.first(), Some(&250));
        assert_eq!(ids.last(), Some(&449));
        assert!(ids.windows(2).all(|w| w[0] + 1 == w[1]));
    }

    #[test]
    fn test_push_keeps_arrival_order() {
        let mut log = MessageLog::new(10);
        for id in [6, 5, 7] {
            log.push(msg(id));
        }
        assert_eq!(ids(&log), vec![6, 5, 7]);
    }

    #[test]
    fn test_replace_keeps_newest() {
        let mut log = MessageLog::new(3);
        log.replace((1..=5).map(msg).collect());
        assert_eq!(ids(&log), vec![3, 4, 5]);
    }
}
