use std::sync::Arc;

use crate::types::AssistantReply;

use super::source::{StreamingHandler, TokenRequest, TokenSource};

/// Canned source that echoes the prompt back.
///
/// Reports `inprogress`, then `processed` when attachments are present, then
/// `done`, and completes with `Response: <prompt><attachment context>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoTokenSource;

impl TokenSource for EchoTokenSource {
    fn start(&self, request: TokenRequest, handler: Arc<dyn StreamingHandler>) {
        handler.on_partial("inprogress".to_string());
        if !request.attachment_context.is_empty() {
            handler.on_partial("processed".to_string());
        }
        handler.on_partial("done".to_string());
        handler.on_complete(AssistantReply::text(format!(
            "Response: {}{}",
            request.prompt, request.attachment_context
        )));
    }
}
