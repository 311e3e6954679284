//! Realtime channel protocol
//!
//! Every frame is a JSON envelope `{topic, event, payload, ref}`. The client
//! joins one topic subscribed to table inserts, heartbeats on the `phoenix`
//! topic, and reads `postgres_changes` notifications.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::message::Message;

pub const EVENT_JOIN: &str = "phx_join";
pub const EVENT_HEARTBEAT: &str = "heartbeat";
pub const EVENT_CHANGES: &str = "postgres_changes";
pub const HEARTBEAT_TOPIC: &str = "phoenix";

/// Channel envelope
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Envelope {
    pub fn to_json(&self) -> String {
        // An envelope of strings and a `Value` always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Join request subscribing `topic` to inserts on `table`.
pub fn join(topic: &str, table: &str, reference: u64) -> Envelope {
    Envelope {
        topic: topic.to_string(),
        event: EVENT_JOIN.to_string(),
        payload: json!({
            "config": {
                "broadcast": { "self": false },
                "presence": { "key": "" },
                "postgres_changes": [
                    { "event": "INSERT", "schema": "public", "table": table }
                ]
            }
        }),
        reference: Some(reference.to_string()),
    }
}

pub fn heartbeat(reference: u64) -> Envelope {
    Envelope {
        topic: HEARTBEAT_TOPIC.to_string(),
        event: EVENT_HEARTBEAT.to_string(),
        payload: json!({}),
        reference: Some(reference.to_string()),
    }
}

#[derive(Deserialize)]
struct ChangePayload {
    data: ChangeData,
}

#[derive(Deserialize)]
struct ChangeData {
    #[serde(rename = "type")]
    kind: String,
    record: Message,
}

/// The inserted message carried by a text frame, if it is an insert
/// notification on `topic`. Anything else (replies, presence, malformed
/// frames) yields `None`.
pub fn parse_insert(frame: &str, topic: &str) -> Option<Message> {
    let envelope: Envelope = serde_json::from_str(frame).ok()?;
    if envelope.event != EVENT_CHANGES || envelope.topic != topic {
        return None;
    }
    let change: ChangePayload = serde_json::from_value(envelope.payload).ok()?;
    (change.data.kind == "INSERT").then_some(change.data.record)
}
