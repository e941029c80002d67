//! promptgraph: streaming prompt orchestration over a conditional state graph.
//!
//! A prompt seeds a fresh [`state::ConversationState`], runs through a
//! compiled [`graph::StateGraph`] whose agent node bridges a push-style
//! [`agent::TokenSource`] into an ordered stream, and reaches the caller as
//! chunks followed by exactly one completion or error.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::collections::HashMap;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use promptgraph::prelude::*;
//!
//! # async fn example() -> promptgraph::error::Result<()> {
//! let support = GraphAgentSupport::with_token_source(
//!     Arc::new(EchoTokenSource),
//!     BridgeConfig::load()?,
//! );
//! let session = support.create_session("session-1", Path::new("."), HashMap::new());
//! let reply = session.process_prompt("Hello!", &[]).await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod agent;
pub mod codec;
pub mod config;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod routing;
pub mod session;
pub mod state;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
