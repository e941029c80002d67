//! Convenience re-exports for common use.

pub use crate::adapter::{ChatGraph, GraphAdapter, PromptGraph, TokenConsumer};
pub use crate::agent::{AgentNode, EchoTokenSource, StreamingHandler, TokenRequest, TokenSource};
pub use crate::config::BridgeConfig;
pub use crate::error::{GraphError, Result};
pub use crate::graph::{CompiledGraph, GraphOutput, Route, StateGraph, END, START};
pub use crate::routing::RoutingEdge;
pub use crate::session::{AgentInfo, AgentSupport, Session, SessionUpdate};
pub use crate::session::{GraphAgentSupport, GraphSession};
pub use crate::state::{Channel, ConversationState, Schema, StateUpdate};
pub use crate::types::{AssistantReply, AttachmentLink, AttachmentMeta, Content, Message, Role};
