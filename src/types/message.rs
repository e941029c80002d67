//! Conversation message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::content::Content;

/// A message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: Vec<Content>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_requests: Vec<ToolExecutionRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::with_role(Role::User, text)
    }

    /// Create a plain assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, text)
    }

    /// Create an assistant message carrying tool execution requests.
    pub fn assistant_with_tools(
        text: impl Into<String>,
        tool_requests: Vec<ToolExecutionRequest>,
    ) -> Self {
        Self {
            tool_requests,
            ..Self::with_role(Role::Assistant, text)
        }
    }

    /// Create a tool result message.
    pub fn tool(text: impl Into<String>) -> Self {
        Self::with_role(Role::Tool, text)
    }

    fn with_role(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![Content::text(text)],
            tool_requests: Vec::new(),
            timestamp: Some(Utc::now()),
        }
    }

    /// Extract the text content, concatenating all text parts.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(Content::as_text)
            .collect::<Vec<_>>()
            .join("")
    }

    /// True for assistant messages that ask for at least one tool execution.
    pub fn has_tool_requests(&self) -> bool {
        self.role == Role::Assistant && !self.tool_requests.is_empty()
    }
}

/// Conversation role.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

/// A tool execution requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolExecutionRequest {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

impl ToolExecutionRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Final aggregate produced by a token source once its partials are done.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssistantReply {
    pub text: String,
    pub tool_requests: Vec<ToolExecutionRequest>,
}

impl AssistantReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_requests: Vec::new(),
        }
    }

    pub fn with_tool_requests(mut self, tool_requests: Vec<ToolExecutionRequest>) -> Self {
        self.tool_requests = tool_requests;
        self
    }

    /// Convert into the assistant message appended to conversation state.
    pub fn into_message(self) -> Message {
        Message::assistant_with_tools(self.text, self.tool_requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_requests_only_count_on_assistant_messages() {
        let request = ToolExecutionRequest::new("call-1", "read_file", serde_json::json!({}));
        let assistant = Message::assistant_with_tools("", vec![request.clone()]);
        assert!(assistant.has_tool_requests());

        let mut odd = Message::user("hi");
        odd.tool_requests.push(request);
        assert!(!odd.has_tool_requests());
        assert!(!Message::assistant("plain").has_tool_requests());
    }

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!(Role::Assistant.to_string(), "assistant");
        assert_eq!("tool".parse::<Role>().ok(), Some(Role::Tool));
    }
}
