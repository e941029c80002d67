use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::state::{Channel, ConversationState, StateUpdate};

/// Item produced while a node executes.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEvent {
    /// Incremental text forwarded to the caller.
    Chunk(String),
    /// Final state update; must be the last event a node produces.
    Complete(StateUpdate),
}

/// Streaming output of one node execution.
pub type NodeStream = BoxStream<'static, Result<NodeEvent>>;

/// A unit of work in the graph.
#[async_trait]
pub trait Node: Send + Sync {
    /// Channels this node may write, checked against the schema at compile time.
    fn writes(&self) -> Vec<Channel> {
        vec![Channel::Messages]
    }

    /// Start executing against the current state.
    async fn run(&self, state: &ConversationState) -> Result<NodeStream>;
}
