use std::sync::{Arc, Mutex};

use futures::stream::BoxStream;
use tokio::sync::mpsc;

use crate::error::{GraphError, Result};
use crate::graph::NodeEvent;
use crate::state::StateUpdate;
use crate::types::AssistantReply;

use super::source::StreamingHandler;

#[derive(Debug)]
enum SourceSignal {
    Partial(String),
    Complete(AssistantReply),
    Failed(GraphError),
}

/// Handler side of the bridge; hand it to a [`super::TokenSource`].
///
/// Callbacks are synchronous and may run on a runtime worker, so the queue
/// is unbounded and sending never blocks. Memory held by the queue is bounded
/// by the partials a source reports ahead of the consumer within one step:
/// the first terminal signal closes the sender, and dropping the receiver
/// frees anything still queued and turns later reports into no-ops.
pub struct TokenBridge {
    tx: Mutex<Option<mpsc::UnboundedSender<SourceSignal>>>,
}

impl TokenBridge {
    fn send(&self, signal: SourceSignal) {
        let mut guard = self.tx.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let terminal = !matches!(signal, SourceSignal::Partial(_));
        let Some(tx) = guard.as_ref() else {
            tracing::trace!("token source reported after its terminal signal");
            return;
        };
        if tx.send(signal).is_err() {
            tracing::debug!("token bridge receiver dropped");
        }
        if terminal {
            guard.take();
        }
    }

    /// Whether a terminal signal has been accepted.
    pub fn is_closed(&self) -> bool {
        self.tx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_none()
    }
}

impl StreamingHandler for TokenBridge {
    fn on_partial(&self, text: String) {
        self.send(SourceSignal::Partial(text));
    }

    fn on_complete(&self, reply: AssistantReply) {
        self.send(SourceSignal::Complete(reply));
    }

    fn on_error(&self, error: GraphError) {
        self.send(SourceSignal::Failed(error));
    }
}

/// Pull side of the bridge.
pub struct BridgeReceiver {
    rx: mpsc::UnboundedReceiver<SourceSignal>,
}

impl BridgeReceiver {
    /// Drain the queue as node events.
    ///
    /// Partials become chunks in arrival order. Completion turns the reply
    /// into the node's single update and ends the stream; a failure ends it
    /// with the source's error.
    pub fn into_events(self) -> BoxStream<'static, Result<NodeEvent>> {
        let mut rx = self.rx;
        let stream = async_stream::stream! {
            loop {
                match rx.recv().await {
                    Some(SourceSignal::Partial(text)) => yield Ok(NodeEvent::Chunk(text)),
                    Some(SourceSignal::Complete(reply)) => {
                        let update = StateUpdate::new().append_message(reply.into_message());
                        yield Ok(NodeEvent::Complete(update));
                        return;
                    }
                    Some(SourceSignal::Failed(err)) => {
                        yield Err(err);
                        return;
                    }
                    None => {
                        yield Err(GraphError::token_source(
                            "token source stopped without completing",
                        ));
                        return;
                    }
                }
            }
        };
        Box::pin(stream)
    }
}

/// Create a connected handler/receiver pair.
pub fn channel() -> (Arc<TokenBridge>, BridgeReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        Arc::new(TokenBridge {
            tx: Mutex::new(Some(tx)),
        }),
        BridgeReceiver { rx },
    )
}
