//! Graph-shaped state machine: nodes, conditional edges, compile, stream.

mod compiled;
mod edge;
mod node;
mod state_graph;

pub use compiled::{CompiledGraph, GraphOutput};
pub use edge::{Edge, Route};
pub use node::{Node, NodeEvent, NodeStream};
pub use state_graph::{StateGraph, DEFAULT_MAX_ITERATIONS, END, START};
