use std::sync::Arc;

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::adapter::TokenConsumer;
use crate::error::GraphError;
use crate::types::AttachmentLink;

use super::Session;

/// Why a prompt turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StopReason {
    EndTurn,
}

/// Protocol-level event for one prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionUpdate {
    AgentMessageChunk { text: String },
    PromptResponse { stop_reason: StopReason },
}

struct ChannelConsumer {
    session_id: String,
    tx: mpsc::UnboundedSender<SessionUpdate>,
}

impl ChannelConsumer {
    fn send(&self, update: SessionUpdate) {
        if self.tx.send(update).is_err() {
            tracing::warn!(session_id = %self.session_id, "event receiver dropped");
        }
    }
}

impl TokenConsumer for ChannelConsumer {
    fn on_next(&self, token: &str) {
        self.send(SessionUpdate::AgentMessageChunk {
            text: token.to_string(),
        });
    }

    fn on_complete(&self) {
        tracing::debug!(session_id = %self.session_id, "prompt ended");
        self.send(SessionUpdate::PromptResponse {
            stop_reason: StopReason::EndTurn,
        });
    }

    fn on_error(&self, error: GraphError) {
        tracing::error!(session_id = %self.session_id, error = %error, "prompt failed");
        self.send(SessionUpdate::AgentMessageChunk {
            text: format!("Error: {error}"),
        });
        self.send(SessionUpdate::PromptResponse {
            stop_reason: StopReason::EndTurn,
        });
    }
}

/// Run a prompt on a spawned task and expose its output as protocol events.
///
/// Yields one `AgentMessageChunk` per chunk and ends with a single
/// `PromptResponse`. Failures arrive as an `Error: ...` chunk before it.
/// Must be called from within a Tokio runtime.
pub fn prompt_events(
    session: Arc<dyn Session>,
    prompt: impl Into<String>,
    links: Vec<AttachmentLink>,
) -> BoxStream<'static, SessionUpdate> {
    let prompt = prompt.into();
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let consumer = ChannelConsumer {
            session_id: session.session_id().to_string(),
            tx,
        };
        session.stream_prompt(&prompt, &links, &consumer).await;
    });
    Box::pin(UnboundedReceiverStream::new(rx))
}
