//! Outward-facing session contract consumed by a protocol layer.

mod events;
mod graph_session;

pub use events::{prompt_events, SessionUpdate, StopReason};
pub use graph_session::{GraphAgentSupport, GraphSession};

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::adapter::TokenConsumer;
use crate::error::{GraphError, Result};
use crate::types::AttachmentLink;

/// Identity reported to clients during initialisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInfo {
    pub name: String,
    pub version: String,
}

/// Factory for sessions.
pub trait AgentSupport: Send + Sync {
    fn agent_info(&self) -> AgentInfo;

    fn create_session(
        &self,
        session_id: &str,
        working_dir: &Path,
        server_refs: HashMap<String, String>,
    ) -> Arc<dyn Session>;
}

/// One client session.
#[async_trait]
pub trait Session: Send + Sync {
    fn session_id(&self) -> &str;

    /// Stream a prompt's output to `consumer`.
    ///
    /// Returns once the consumer has received its terminal callback.
    async fn stream_prompt(
        &self,
        prompt: &str,
        links: &[AttachmentLink],
        consumer: &dyn TokenConsumer,
    );

    /// Run a prompt and return every chunk concatenated.
    async fn process_prompt(&self, prompt: &str, links: &[AttachmentLink]) -> Result<String> {
        let collector = CollectingConsumer::default();
        self.stream_prompt(prompt, links, &collector).await;
        collector.finish()
    }
}

#[derive(Default)]
struct CollectingConsumer {
    text: Mutex<String>,
    outcome: Mutex<Option<Result<()>>>,
}

impl CollectingConsumer {
    fn finish(self) -> Result<String> {
        let outcome = self
            .outcome
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let text = self
            .text
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match outcome {
            Some(Ok(())) => Ok(text),
            Some(Err(err)) => Err(err),
            None => Err(GraphError::InvariantViolation(
                "session returned without a terminal callback".into(),
            )),
        }
    }

    fn set_outcome(&self, outcome: Result<()>) {
        let mut slot = self.outcome.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if slot.is_none() {
            *slot = Some(outcome);
        }
    }
}

impl TokenConsumer for CollectingConsumer {
    fn on_next(&self, token: &str) {
        self.text
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_str(token);
    }

    fn on_complete(&self) {
        self.set_outcome(Ok(()));
    }

    fn on_error(&self, error: GraphError) {
        self.set_outcome(Err(error));
    }
}
