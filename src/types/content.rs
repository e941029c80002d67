//! Message content parts.

use serde::{Deserialize, Serialize};

use super::attachment::AttachmentMeta;

/// A single part of message content.
///
/// Closed set: every consumer matches on it exhaustively.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    Text { text: String },
    ResourceLink(AttachmentMeta),
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::ResourceLink(_) => None,
        }
    }

    pub fn as_resource_link(&self) -> Option<&AttachmentMeta> {
        match self {
            Self::Text { .. } => None,
            Self::ResourceLink(meta) => Some(meta),
        }
    }
}

impl From<AttachmentMeta> for Content {
    fn from(meta: AttachmentMeta) -> Self {
        Self::ResourceLink(meta)
    }
}
