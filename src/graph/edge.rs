use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::Result;
use crate::state::ConversationState;

/// Routing token returned by a conditional edge.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Route {
    /// Run another step.
    Next,
    /// Stop the run.
    Exit,
}

impl Route {
    pub const ALL: [Route; 2] = [Route::Next, Route::Exit];

    pub fn as_str(self) -> &'static str {
        match self {
            Route::Next => "next",
            Route::Exit => "exit",
        }
    }
}

/// Decision evaluated after a node's update has been merged.
pub trait Edge: Send + Sync {
    fn route(&self, state: &ConversationState) -> Result<Route>;
}

impl<F> Edge for F
where
    F: Fn(&ConversationState) -> Result<Route> + Send + Sync,
{
    fn route(&self, state: &ConversationState) -> Result<Route> {
        self(state)
    }
}
