use std::sync::Arc;

use crate::error::GraphError;
use crate::types::{AssistantReply, AttachmentMeta, Message};

/// Input handed to a [`TokenSource`] for one agent step.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRequest {
    /// Conversation so far, oldest first.
    pub messages: Vec<Message>,
    /// Text of the most recent user message.
    pub prompt: String,
    /// Attachments seeded for this request.
    pub attachments: Vec<AttachmentMeta>,
    /// Rendered attachment description, empty when there are none.
    pub attachment_context: String,
}

/// Callback sink a token source reports into.
///
/// Calls may arrive from any thread. Exactly one of `on_complete` or
/// `on_error` ends the step; anything reported after that is ignored.
pub trait StreamingHandler: Send + Sync {
    fn on_partial(&self, text: String);
    fn on_complete(&self, reply: AssistantReply);
    fn on_error(&self, error: GraphError);
}

/// Push-style producer of model output.
///
/// `start` must return promptly. Sources that generate over time keep the
/// handler and report from their own task or thread; dropping the handler
/// without a terminal call fails the step.
pub trait TokenSource: Send + Sync {
    fn start(&self, request: TokenRequest, handler: Arc<dyn StreamingHandler>);
}
