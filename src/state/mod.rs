//! Per-request conversation state and its channel schema.
//!
//! State is only ever changed by merging a [`StateUpdate`] through the
//! channels registered in the state's [`Schema`]. Every registered channel
//! appends: new values land after existing ones, nothing is replaced.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{GraphError, Result};
use crate::types::{AttachmentMeta, Message, Role};

/// Named state channel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Channel {
    Messages,
    Attachments,
}

/// How values written to a channel combine with what is already there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    Append,
}

/// Channel registry declared once per graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    channels: Vec<(Channel, MergeStrategy)>,
}

impl Schema {
    /// Build a schema of append channels, rejecting duplicates.
    pub fn new(channels: impl IntoIterator<Item = Channel>) -> Result<Self> {
        let mut registered: Vec<(Channel, MergeStrategy)> = Vec::new();
        for channel in channels {
            if registered.iter().any(|(existing, _)| *existing == channel) {
                return Err(GraphError::Construction(format!(
                    "channel '{channel}' registered twice"
                )));
            }
            registered.push((channel, MergeStrategy::Append));
        }
        Ok(Self {
            channels: registered,
        })
    }

    /// The chat schema: `messages` and `attachments`, both appending.
    pub fn chat() -> Self {
        Self {
            channels: vec![
                (Channel::Messages, MergeStrategy::Append),
                (Channel::Attachments, MergeStrategy::Append),
            ],
        }
    }

    pub fn contains(&self, channel: Channel) -> bool {
        self.strategy(channel).is_some()
    }

    pub fn strategy(&self, channel: Channel) -> Option<MergeStrategy> {
        self.channels
            .iter()
            .find(|(registered, _)| *registered == channel)
            .map(|(_, strategy)| *strategy)
    }

    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.channels.iter().map(|(channel, _)| *channel)
    }

    /// Fail with a construction error naming the first unregistered channel.
    pub fn ensure_registered(&self, channels: &[Channel], owner: &str) -> Result<()> {
        match channels.iter().find(|channel| !self.contains(**channel)) {
            Some(missing) => Err(GraphError::Construction(format!(
                "{owner} writes unregistered channel '{missing}'"
            ))),
            None => Ok(()),
        }
    }
}

/// Values a node (or the seeding step) appends to state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    messages: Vec<Message>,
    attachments: Vec<AttachmentMeta>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn append_attachments(mut self, attachments: impl IntoIterator<Item = AttachmentMeta>) -> Self {
        self.attachments.extend(attachments);
        self
    }

    /// Channels this update writes to.
    pub fn channels(&self) -> Vec<Channel> {
        let mut channels = Vec::new();
        if !self.messages.is_empty() {
            channels.push(Channel::Messages);
        }
        if !self.attachments.is_empty() {
            channels.push(Channel::Attachments);
        }
        channels
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn attachments(&self) -> &[AttachmentMeta] {
        &self.attachments
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.attachments.is_empty()
    }
}

/// Aggregate of messages and attachment metadata for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationState {
    schema: Arc<Schema>,
    messages: Vec<Message>,
    attachments: Vec<AttachmentMeta>,
    routing_hint: Option<String>,
}

impl ConversationState {
    /// Empty state bound to a schema.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            messages: Vec::new(),
            attachments: Vec::new(),
            routing_hint: None,
        }
    }

    /// Seed a fresh state with the user prompt and the request's attachments.
    pub fn seed(
        schema: Arc<Schema>,
        prompt: impl Into<String>,
        attachments: Vec<AttachmentMeta>,
    ) -> Result<Self> {
        let mut state = Self::new(schema);
        state.merge(
            StateUpdate::new()
                .append_message(Message::user(prompt))
                .append_attachments(attachments),
        )?;
        Ok(state)
    }

    pub(crate) fn from_parts(
        schema: Arc<Schema>,
        messages: Vec<Message>,
        attachments: Vec<AttachmentMeta>,
        routing_hint: Option<String>,
    ) -> Self {
        Self {
            schema,
            messages,
            attachments,
            routing_hint,
        }
    }

    /// Append an update through the schema's channels.
    pub fn merge(&mut self, update: StateUpdate) -> Result<()> {
        for channel in update.channels() {
            if !self.schema.contains(channel) {
                return Err(GraphError::InvariantViolation(format!(
                    "merge through unregistered channel '{channel}'"
                )));
            }
        }
        let StateUpdate {
            messages,
            attachments,
        } = update;
        self.messages.extend(messages);
        self.attachments.extend(attachments);
        Ok(())
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn attachments(&self) -> &[AttachmentMeta] {
        &self.attachments
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Text of the most recent user message, or empty when there is none.
    pub fn last_user_text(&self) -> String {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == Role::User)
            .map(Message::text)
            .unwrap_or_default()
    }

    pub fn routing_hint(&self) -> Option<&str> {
        self.routing_hint.as_deref()
    }
}
