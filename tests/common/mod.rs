//! Shared test helpers: scripted token sources and a recording consumer.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use promptgraph::adapter::TokenConsumer;
use promptgraph::agent::{StreamingHandler, TokenRequest, TokenSource};
use promptgraph::config::BridgeConfig;
use promptgraph::error::{ErrorCategory, GraphError};
use promptgraph::session::{AgentSupport, GraphAgentSupport, Session};
use promptgraph::types::{AssistantReply, AttachmentLink, ToolExecutionRequest};

/// One thing a scripted source reports.
#[derive(Debug, Clone)]
pub enum Step {
    Partial(String),
    Reply(AssistantReply),
    Fail(String),
    /// Drop the handler without a terminal call.
    Abandon,
}

/// Token source that plays queued scripts, one per call.
///
/// With no script queued it replies `"Mock response"`.
pub struct ScriptedTokenSource {
    scripts: Mutex<VecDeque<Vec<Step>>>,
    requests: Mutex<Vec<TokenRequest>>,
    threaded: bool,
}

impl ScriptedTokenSource {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            threaded: false,
        }
    }

    /// Play every script from a spawned OS thread.
    pub fn threaded() -> Self {
        Self {
            threaded: true,
            ..Self::new()
        }
    }

    pub fn queue(&self, steps: Vec<Step>) {
        self.scripts.lock().unwrap().push_back(steps);
    }

    /// Queue partials followed by a plain reply.
    pub fn queue_text(&self, partials: &[&str], reply: &str) {
        let mut steps: Vec<Step> = partials.iter().map(|p| Step::Partial(p.to_string())).collect();
        steps.push(Step::Reply(AssistantReply::text(reply)));
        self.queue(steps);
    }

    /// Queue partials followed by a reply that asks for one tool call.
    pub fn queue_tool_call(&self, partials: &[&str], id: &str, name: &str) {
        let mut steps: Vec<Step> = partials.iter().map(|p| Step::Partial(p.to_string())).collect();
        steps.push(Step::Reply(AssistantReply::text("").with_tool_requests(vec![
            ToolExecutionRequest::new(id, name, serde_json::json!({})),
        ])));
        self.queue(steps);
    }

    /// Queue partials followed by a failure.
    pub fn queue_failure(&self, partials: &[&str], message: &str) {
        let mut steps: Vec<Step> = partials.iter().map(|p| Step::Partial(p.to_string())).collect();
        steps.push(Step::Fail(message.to_string()));
        self.queue(steps);
    }

    pub fn requests(&self) -> Vec<TokenRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

fn play(steps: Vec<Step>, handler: Arc<dyn StreamingHandler>) {
    for step in steps {
        match step {
            Step::Partial(text) => handler.on_partial(text),
            Step::Reply(reply) => handler.on_complete(reply),
            Step::Fail(message) => handler.on_error(GraphError::token_source(message)),
            Step::Abandon => return,
        }
    }
}

impl TokenSource for ScriptedTokenSource {
    fn start(&self, request: TokenRequest, handler: Arc<dyn StreamingHandler>) {
        self.requests.lock().unwrap().push(request);
        let steps = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| vec![Step::Reply(AssistantReply::text("Mock response"))]);
        if self.threaded {
            std::thread::spawn(move || play(steps, handler));
        } else {
            play(steps, handler);
        }
    }
}

/// Streams each word of the prompt from a worker thread, with small pauses.
pub struct WordSource;

impl TokenSource for WordSource {
    fn start(&self, request: TokenRequest, handler: Arc<dyn StreamingHandler>) {
        std::thread::spawn(move || {
            for word in request.prompt.split_whitespace() {
                handler.on_partial(word.to_string());
                std::thread::sleep(Duration::from_millis(2));
            }
            handler.on_complete(AssistantReply::text(request.prompt.clone()));
        });
    }
}

/// Callback observed by [`RecordingConsumer`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Next(String),
    Complete,
    Error { category: ErrorCategory, message: String },
}

#[derive(Default)]
pub struct RecordingConsumer {
    events: Mutex<Vec<Event>>,
}

impl RecordingConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn chunks(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Next(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Panics unless exactly one terminal callback arrived, last.
    pub fn terminal(&self) -> Event {
        let events = self.events();
        let terminals: Vec<&Event> = events
            .iter()
            .filter(|event| !matches!(event, Event::Next(_)))
            .collect();
        assert_eq!(terminals.len(), 1, "expected one terminal callback: {events:?}");
        let last = events.last().cloned().unwrap();
        assert!(!matches!(last, Event::Next(_)), "terminal was not last: {events:?}");
        last
    }
}

impl TokenConsumer for RecordingConsumer {
    fn on_next(&self, token: &str) {
        self.events.lock().unwrap().push(Event::Next(token.to_string()));
    }

    fn on_complete(&self) {
        self.events.lock().unwrap().push(Event::Complete);
    }

    fn on_error(&self, error: GraphError) {
        self.events.lock().unwrap().push(Event::Error {
            category: error.category(),
            message: error.to_string(),
        });
    }
}

pub fn support(source: Arc<dyn TokenSource>) -> GraphAgentSupport {
    support_with(source, BridgeConfig::default())
}

pub fn support_with(source: Arc<dyn TokenSource>, config: BridgeConfig) -> GraphAgentSupport {
    GraphAgentSupport::with_token_source(source, config)
}

pub fn session(source: Arc<dyn TokenSource>, id: &str) -> Arc<dyn Session> {
    support(source).create_session(id, Path::new("/tmp/work"), HashMap::new())
}

pub fn link(name: &str) -> AttachmentLink {
    AttachmentLink::builder()
        .name(name)
        .uri(format!("file:///dataset/{name}"))
        .build()
}
