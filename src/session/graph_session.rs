use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::Instrument;

use crate::adapter::{ChatGraph, GraphAdapter, TokenConsumer};
use crate::agent::{AgentNode, TokenSource};
use crate::config::BridgeConfig;
use crate::routing::RoutingEdge;
use crate::types::AttachmentLink;

use super::{AgentInfo, AgentSupport, Session};

/// Session factory backed by a shared [`GraphAdapter`].
#[derive(Debug, Clone)]
pub struct GraphAgentSupport {
    adapter: Arc<GraphAdapter>,
}

impl GraphAgentSupport {
    pub fn new(adapter: GraphAdapter) -> Self {
        Self {
            adapter: Arc::new(adapter),
        }
    }

    /// Wire the chat graph around `source`.
    pub fn with_token_source(source: Arc<dyn TokenSource>, config: BridgeConfig) -> Self {
        let graph = ChatGraph::new(AgentNode::new(source), RoutingEdge::new())
            .with_max_iterations(config.max_iterations);
        Self::new(GraphAdapter::new(Arc::new(graph), config))
    }

    pub fn adapter(&self) -> &GraphAdapter {
        &self.adapter
    }
}

impl AgentSupport for GraphAgentSupport {
    fn agent_info(&self) -> AgentInfo {
        let config = self.adapter.config();
        AgentInfo {
            name: config.agent_name.clone(),
            version: config.agent_version.clone(),
        }
    }

    fn create_session(
        &self,
        session_id: &str,
        working_dir: &Path,
        server_refs: HashMap<String, String>,
    ) -> Arc<dyn Session> {
        tracing::info!(
            session_id = %session_id,
            working_dir = %working_dir.display(),
            servers = server_refs.len(),
            "creating session"
        );
        Arc::new(GraphSession {
            session_id: session_id.to_string(),
            working_dir: working_dir.to_path_buf(),
            server_refs,
            adapter: Arc::clone(&self.adapter),
        })
    }
}

/// Session that runs every prompt through the shared adapter.
///
/// Each prompt gets a fresh conversation state; nothing carries over
/// between prompts.
#[derive(Debug)]
pub struct GraphSession {
    session_id: String,
    working_dir: PathBuf,
    server_refs: HashMap<String, String>,
    adapter: Arc<GraphAdapter>,
}

impl GraphSession {
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn server_refs(&self) -> &HashMap<String, String> {
        &self.server_refs
    }
}

#[async_trait]
impl Session for GraphSession {
    fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn stream_prompt(
        &self,
        prompt: &str,
        links: &[AttachmentLink],
        consumer: &dyn TokenConsumer,
    ) {
        tracing::debug!(session_id = %self.session_id, attachments = links.len(), "session prompt");
        self.adapter
            .stream_prompt(prompt, links, consumer)
            .instrument(tracing::debug_span!("session", session_id = %self.session_id))
            .await;
    }
}
