//! Resource references attached to a prompt.

use std::fmt;
use std::path::Path;

use bon::{bon, Builder};
use serde::{Deserialize, Serialize};

use super::message::Role;
use crate::error::{GraphError, Result};

/// Resource link as received from the calling protocol layer.
#[derive(Debug, Clone, Builder, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentLink {
    #[builder(into)]
    pub name: String,
    #[builder(into)]
    pub uri: String,
    #[builder(into)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[builder(into)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[builder(into)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Annotations>,
    #[serde(default, rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl AttachmentLink {
    /// Build a link describing a local file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = std::fs::canonicalize(path.as_ref())?;
        let metadata = std::fs::metadata(&path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                GraphError::Configuration(format!("path has no file name: {}", path.display()))
            })?;
        let mime_type = mime_guess::from_path(&path)
            .first()
            .map(|mime| mime.essence_str().to_string());

        Ok(Self {
            name,
            uri: format!("file://{}", path.display()),
            description: None,
            mime_type,
            size: Some(metadata.len()),
            title: None,
            annotations: None,
            metadata: None,
        })
    }
}

/// Build one link per regular file in `dir`, sorted by file name.
pub fn links_from_dir(dir: impl AsRef<Path>) -> Result<Vec<AttachmentLink>> {
    let mut links = Vec::new();
    for entry in std::fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            links.push(AttachmentLink::from_path(entry.path())?);
        }
    }
    links.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(links)
}

/// Audience and priority hints carried alongside a resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Annotations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<Vec<Role>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

/// Immutable metadata for an attached resource, stored in conversation state.
///
/// Empty optional strings are normalized to `None` on construction,
/// including when deserialized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", from = "AttachmentLink")]
pub struct AttachmentMeta {
    name: String,
    uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotations: Option<Annotations>,
    #[serde(default, rename = "_meta", skip_serializing_if = "Option::is_none")]
    metadata: Option<serde_json::Value>,
}

#[bon]
impl AttachmentMeta {
    #[builder]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        #[builder(into)] name: String,
        #[builder(into)] uri: String,
        #[builder(into)] description: Option<String>,
        #[builder(into)] mime_type: Option<String>,
        size: Option<u64>,
        #[builder(into)] title: Option<String>,
        annotations: Option<Annotations>,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        Self {
            name,
            uri,
            description: non_empty(description),
            mime_type: non_empty(mime_type),
            size,
            title: non_empty(title),
            annotations,
            metadata,
        }
    }
}

impl AttachmentMeta {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn annotations(&self) -> Option<&Annotations> {
        self.annotations.as_ref()
    }

    pub fn metadata(&self) -> Option<&serde_json::Value> {
        self.metadata.as_ref()
    }

    /// Convert back into the protocol-level link.
    pub fn to_link(&self) -> AttachmentLink {
        AttachmentLink {
            name: self.name.clone(),
            uri: self.uri.clone(),
            description: self.description.clone(),
            mime_type: self.mime_type.clone(),
            size: self.size,
            title: self.title.clone(),
            annotations: self.annotations.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

impl From<AttachmentLink> for AttachmentMeta {
    fn from(link: AttachmentLink) -> Self {
        Self::builder()
            .name(link.name)
            .uri(link.uri)
            .maybe_description(link.description)
            .maybe_mime_type(link.mime_type)
            .maybe_size(link.size)
            .maybe_title(link.title)
            .maybe_annotations(link.annotations)
            .maybe_metadata(link.metadata)
            .build()
    }
}

impl From<&AttachmentLink> for AttachmentMeta {
    fn from(link: &AttachmentLink) -> Self {
        Self::from(link.clone())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl fmt::Display for AttachmentMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.uri)?;
        if let Some(mime_type) = &self.mime_type {
            write!(f, " [{mime_type}]")?;
        }
        if let Some(title) = &self.title {
            write!(f, " \"{title}\"")?;
        }
        Ok(())
    }
}
