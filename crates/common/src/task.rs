//! Units of work handed to agents.

use serde::{Deserialize, Serialize};

use crate::message::now_millis;

/// A task that can be assigned to an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task ID
    pub id: String,

    /// The instruction the agent works on
    pub description: String,

    /// Output of earlier agents in the same run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Creation timestamp
    pub created_at: u64,

    /// Last update timestamp
    pub updated_at: u64,
}

impl Task {
    pub fn new(description: impl Into<String>) -> Self {
        let now = now_millis();

        Self {
            id: format!("task_{}", uuid::Uuid::new_v4()),
            description: description.into(),
            context: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self.updated_at = now_millis();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation() {
        let task = Task::new("Survey CRISPR delivery methods");

        assert!(task.id.starts_with("task_"));
        assert_eq!(task.description, "Survey CRISPR delivery methods");
        assert!(task.context.is_none());
        assert!(task.created_at > 0);
    }

    #[test]
    fn test_task_with_context() {
        let task = Task::new("Summarize").with_context("Previous findings");
        assert_eq!(task.context.as_deref(), Some("Previous findings"));
        assert!(task.updated_at >= task.created_at);
    }

    #[test]
    fn test_task_unique_ids() {
        let task1 = Task::new("Task 1");
        let task2 = Task::new("Task 2");

        assert_ne!(task1.id, task2.id);
    }

    #[test]
    fn test_task_serialization_skips_empty_context() {
        let json = serde_json::to_value(Task::new("Serialization test")).unwrap();
        assert_eq!(json["description"], "Serialization test");
        assert!(json.get("context").is_none());
    }
}
