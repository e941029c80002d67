use std::sync::Arc;

use futures::stream::BoxStream;
use futures::StreamExt;
use uuid::Uuid;

use crate::config::BridgeConfig;
use crate::error::Result;
use crate::graph::{CompiledGraph, GraphOutput};
use crate::state::{Channel, ConversationState, Schema};
use crate::types::{AttachmentLink, AttachmentMeta};

use super::chat_graph::PromptGraph;
use super::consumer::{ConsumerGuard, TokenConsumer};

/// Runs prompts through a [`PromptGraph`] and forwards chunks to a consumer.
///
/// Every call builds and compiles the graph and seeds a fresh state; nothing
/// is shared between runs except the graph definition.
#[derive(Clone)]
pub struct GraphAdapter {
    graph: Arc<dyn PromptGraph>,
    config: BridgeConfig,
}

impl GraphAdapter {
    pub fn new(graph: Arc<dyn PromptGraph>, config: BridgeConfig) -> Self {
        Self { graph, config }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Build, compile, and check the graph can hold a seeded state.
    pub fn compile(&self) -> Result<CompiledGraph> {
        let graph = self.graph.build_graph()?.compile()?;
        graph
            .schema()
            .ensure_registered(&[Channel::Messages, Channel::Attachments], "seeded state")?;
        Ok(graph)
    }

    /// Initial state: the prompt as a user message plus one attachment per
    /// link, in link order.
    pub fn seed_state(
        schema: Arc<Schema>,
        prompt: &str,
        links: &[AttachmentLink],
    ) -> Result<ConversationState> {
        let attachments: Vec<AttachmentMeta> = links.iter().map(AttachmentMeta::from).collect();
        ConversationState::seed(schema, prompt, attachments)
    }

    /// Compile the graph and start a run for one prompt.
    pub fn run(
        &self,
        prompt: &str,
        links: &[AttachmentLink],
    ) -> Result<BoxStream<'static, Result<GraphOutput>>> {
        let graph = self.compile()?;
        let initial = Self::seed_state(Arc::clone(graph.schema()), prompt, links)?;
        Ok(graph.stream(initial))
    }

    /// Stream one prompt to `consumer`.
    ///
    /// Blank prompts get the configured reply without running the graph.
    /// An invalid config and construction failures are reported before any chunk. Only chunks are
    /// forwarded; snapshots stay internal.
    pub async fn stream_prompt(
        &self,
        prompt: &str,
        links: &[AttachmentLink],
        consumer: &dyn TokenConsumer,
    ) {
        let run_id = Uuid::new_v4();
        let mut guard = ConsumerGuard::new(consumer);
        tracing::info!(
            run_id = %run_id,
            prompt = %preview(prompt, self.config.prompt_preview_chars),
            attachments = links.len(),
            "streaming prompt"
        );
        for link in links {
            tracing::debug!(run_id = %run_id, name = %link.name, uri = %link.uri, "attachment link");
        }

        if let Err(err) = self.config.validate() {
            tracing::error!(run_id = %run_id, error = %err, "invalid bridge config");
            guard.error(err);
            return;
        }

        if prompt.trim().is_empty() {
            tracing::debug!(run_id = %run_id, "blank prompt, skipping graph");
            guard.next(&self.config.blank_prompt_reply);
            guard.complete();
            return;
        }

        let mut outputs = match self.run(prompt, links) {
            Ok(outputs) => outputs,
            Err(err) => {
                tracing::error!(run_id = %run_id, error = %err, "failed to start graph");
                guard.error(err);
                return;
            }
        };

        let mut steps = 0usize;
        while let Some(output) = outputs.next().await {
            match output {
                Ok(GraphOutput::Chunk { text, .. }) => guard.next(&text),
                Ok(GraphOutput::Snapshot { node, state }) => {
                    steps += 1;
                    tracing::debug!(
                        run_id = %run_id,
                        node = %node,
                        messages = state.messages().len(),
                        "step finished"
                    );
                }
                Err(err) => {
                    tracing::warn!(
                        run_id = %run_id,
                        error = %err,
                        chunks = guard.forwarded(),
                        "run failed"
                    );
                    guard.error(err);
                    return;
                }
            }
        }

        tracing::info!(run_id = %run_id, steps, chunks = guard.forwarded(), "prompt complete");
        guard.complete();
    }
}

impl std::fmt::Debug for GraphAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphAdapter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn preview(prompt: &str, max_chars: usize) -> String {
    let mut chars = prompt.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
