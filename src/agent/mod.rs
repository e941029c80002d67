//! Agent node: bridges a push-style token source into the graph's stream.

mod bridge;
mod echo;
mod node;
mod source;

pub use bridge::{channel, BridgeReceiver, TokenBridge};
pub use echo::EchoTokenSource;
pub use node::{attachment_context, AgentNode};
pub use source::{StreamingHandler, TokenRequest, TokenSource};
