//! Messages produced by agents while working through a task.

use serde::{Deserialize, Serialize};

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    Assistant,
    System,
}

/// A message emitted by an agent or by the orchestration layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMessage {
    /// Unique message ID
    pub id: String,

    /// Role of the sender
    pub role: MessageRole,

    /// Message content
    pub content: String,

    /// Source agent (if from an agent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_agent: Option<String>,

    /// Timestamp (Unix millis)
    pub timestamp: u64,
}

impl AgentMessage {
    fn new(role: MessageRole, content: String, source_agent: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content,
            source_agent,
            timestamp: now_millis(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content.into(), None)
    }

    pub fn from_agent(agent: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content.into(), Some(agent.into()))
    }
}

pub(crate) fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_agent_sets_source_and_role() {
        let msg = AgentMessage::from_agent("literature", "Found 12 papers");
        assert_eq!(msg.role, MessageRole::Assistant);
        assert_eq!(msg.source_agent.as_deref(), Some("literature"));
        assert_eq!(msg.content, "Found 12 papers");
        assert!(msg.timestamp > 0);
    }

    #[test]
    fn message_ids_are_unique() {
        let a = AgentMessage::system("a");
        let b = AgentMessage::system("a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn system_message_omits_source_when_serialized() {
        let json = serde_json::to_value(AgentMessage::system("done")).unwrap();
        assert_eq!(json["role"], "system");
        assert!(json.get("source_agent").is_none());
    }
}
