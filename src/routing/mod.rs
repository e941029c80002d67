//! Post-turn routing for the chat graph.

use crate::error::{GraphError, Result};
use crate::graph::{Edge, Route};
use crate::state::ConversationState;

/// Loops back to the agent while the last assistant turn asks for tools.
#[derive(Debug, Default, Clone, Copy)]
pub struct RoutingEdge;

impl RoutingEdge {
    pub fn new() -> Self {
        Self
    }
}

impl Edge for RoutingEdge {
    fn route(&self, state: &ConversationState) -> Result<Route> {
        let last = state
            .last_message()
            .ok_or_else(|| GraphError::InvariantViolation("last message not found".into()))?;

        let route = if last.has_tool_requests() {
            Route::Next
        } else {
            Route::Exit
        };
        tracing::debug!(
            role = %last.role,
            tool_requests = last.tool_requests.len(),
            route = %route,
            "routing on last message"
        );
        Ok(route)
    }
}
