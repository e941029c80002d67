use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::graph::{Node, NodeStream};
use crate::state::{Channel, ConversationState};
use crate::types::{AttachmentMeta, Content};

use super::bridge;
use super::source::{TokenRequest, TokenSource};

/// Render the attachment note appended to generated text.
pub fn attachment_context(attachments: &[AttachmentMeta]) -> String {
    if attachments.is_empty() {
        return String::new();
    }
    let listed = attachments
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("\n[ResourceLinks available in state: {listed}]")
}

/// Attachments from the state channel, then any linked inline in messages.
fn collect_attachments(state: &ConversationState) -> Vec<AttachmentMeta> {
    let mut attachments = state.attachments().to_vec();
    for message in state.messages() {
        for content in &message.content {
            match content {
                Content::Text { .. } => {}
                Content::ResourceLink(meta) => {
                    if !attachments.iter().any(|known| known.uri() == meta.uri()) {
                        attachments.push(meta.clone());
                    }
                }
            }
        }
    }
    attachments
}

/// Graph node that asks a [`TokenSource`] for the next assistant turn.
///
/// Partials become chunks in production order; the reply is appended to
/// `messages` only after the source has finished.
pub struct AgentNode {
    source: Arc<dyn TokenSource>,
}

impl AgentNode {
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Node for AgentNode {
    fn writes(&self) -> Vec<Channel> {
        vec![Channel::Messages]
    }

    async fn run(&self, state: &ConversationState) -> Result<NodeStream> {
        let attachments = collect_attachments(state);
        let attachment_context = attachment_context(&attachments);
        if !attachments.is_empty() {
            tracing::debug!(attachments = attachments.len(), "passing attachment context to token source");
        }

        let request = TokenRequest {
            messages: state.messages().to_vec(),
            prompt: state.last_user_text(),
            attachments,
            attachment_context,
        };
        tracing::debug!(messages = request.messages.len(), "starting token source");

        let (handler, receiver) = bridge::channel();
        self.source.start(request, handler);
        Ok(receiver.into_events())
    }
}

impl std::fmt::Debug for AgentNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentNode").finish_non_exhaustive()
    }
}
