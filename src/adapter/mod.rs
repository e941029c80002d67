//! Graph adapter: builds the chat graph, runs it, forwards chunks.

mod chat_graph;
mod consumer;
mod graph_adapter;

pub use chat_graph::{ChatGraph, PromptGraph};
pub use consumer::{ConsumerGuard, TokenConsumer};
pub use graph_adapter::GraphAdapter;
