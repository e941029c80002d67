//! Tagged-content serialization for state persistence.
//!
//! Every content value starts with a discriminator string that selects the
//! field layout. Resource links use [`RESOURCE_LINK_TAG`]; plain text written
//! before resource links existed uses [`TEXT_TAG`]. Decoders are looked up in
//! a process-wide [`ContentRegistry`] that is built once and never changes.

mod error;
pub mod state;
pub mod wire;

pub use error::CodecError;
pub use state::{decode_state, encode_state};
pub use wire::{WireReader, WireWriter};

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::types::{Annotations, AttachmentMeta, Content};

/// Discriminator for resource-link records.
pub const RESOURCE_LINK_TAG: &str = "Kind=RESOURCE_LINK";
/// Discriminator for legacy plain-text records.
pub const TEXT_TAG: &str = "TEXT";

/// Size sentinel written when an attachment has no size.
const ABSENT_SIZE: i64 = -1;

/// Reads the fields that follow a discriminator.
pub type ContentDecoder = fn(&mut WireReader<'_>) -> Result<Content, CodecError>;

static REGISTRY: OnceLock<ContentRegistry> = OnceLock::new();

/// Immutable table from discriminator to decoder.
#[derive(Debug)]
pub struct ContentRegistry {
    decoders: HashMap<&'static str, ContentDecoder>,
}

impl ContentRegistry {
    fn builtin() -> Self {
        let mut decoders: HashMap<&'static str, ContentDecoder> = HashMap::new();
        decoders.insert(RESOURCE_LINK_TAG, read_resource_link_fields);
        decoders.insert(TEXT_TAG, read_text_fields);
        Self { decoders }
    }

    /// The process-wide registry, built on first use.
    pub fn global() -> &'static Self {
        REGISTRY.get_or_init(Self::builtin)
    }

    pub fn decoder(&self, tag: &str) -> Option<ContentDecoder> {
        self.decoders.get(tag).copied()
    }

    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.decoders.keys().copied()
    }
}

/// Write one content value, discriminator first.
pub fn write_content(writer: &mut WireWriter, content: &Content) -> Result<(), CodecError> {
    match content {
        Content::Text { text } => {
            writer.write_utf(TEXT_TAG)?;
            writer.write_utf(text)
        }
        Content::ResourceLink(meta) => write_resource_link(writer, meta),
    }
}

/// Read one content value, dispatching on its discriminator.
pub fn read_content(reader: &mut WireReader<'_>) -> Result<Content, CodecError> {
    let tag = reader.read_utf()?;
    let decoder = ContentRegistry::global()
        .decoder(&tag)
        .ok_or(CodecError::UnknownTag(tag))?;
    decoder(reader)
}

pub fn encode_content(content: &Content) -> Result<Vec<u8>, CodecError> {
    let mut writer = WireWriter::new();
    write_content(&mut writer, content)?;
    Ok(writer.into_bytes())
}

/// Decode a buffer holding exactly one content value.
pub fn decode_content(bytes: &[u8]) -> Result<Content, CodecError> {
    let mut reader = WireReader::new(bytes);
    let content = read_content(&mut reader)?;
    reader.finish()?;
    Ok(content)
}

pub fn encode_attachment(meta: &AttachmentMeta) -> Result<Vec<u8>, CodecError> {
    let mut writer = WireWriter::new();
    write_resource_link(&mut writer, meta)?;
    Ok(writer.into_bytes())
}

/// Decode a buffer that must hold a resource-link record.
pub fn decode_attachment(bytes: &[u8]) -> Result<AttachmentMeta, CodecError> {
    match decode_content(bytes)? {
        Content::ResourceLink(meta) => Ok(meta),
        Content::Text { .. } => Err(CodecError::Corrupt(
            "expected a resource link, found text".to_string(),
        )),
    }
}

pub(crate) fn write_resource_link(
    writer: &mut WireWriter,
    meta: &AttachmentMeta,
) -> Result<(), CodecError> {
    let size = match meta.size() {
        Some(size) => i64::try_from(size).map_err(|_| CodecError::SizeOutOfRange(size))?,
        None => ABSENT_SIZE,
    };
    // JSON has no spelling for NaN or infinity.
    if let Some(priority) = meta.annotations().and_then(|a| a.priority) {
        if !priority.is_finite() {
            return Err(CodecError::NonFiniteNumber("annotations.priority"));
        }
    }

    writer.write_utf(RESOURCE_LINK_TAG)?;
    writer.write_utf(meta.name())?;
    writer.write_utf(meta.uri())?;
    writer.write_optional_utf(meta.description())?;
    writer.write_optional_utf(meta.mime_type())?;
    writer.write_i64(size);
    writer.write_optional_utf(meta.title())?;
    writer.write_optional_object(meta.annotations())?;
    writer.write_optional_object(meta.metadata())?;
    Ok(())
}

fn read_resource_link_fields(reader: &mut WireReader<'_>) -> Result<Content, CodecError> {
    let name = reader.read_utf()?;
    let uri = reader.read_utf()?;
    let description = reader.read_optional_utf()?;
    let mime_type = reader.read_optional_utf()?;
    let size = match reader.read_i64()? {
        ABSENT_SIZE => None,
        value => Some(
            u64::try_from(value)
                .map_err(|_| CodecError::Corrupt(format!("negative attachment size {value}")))?,
        ),
    };
    let title = reader.read_optional_utf()?;
    let annotations = reader.read_optional_object::<Annotations>()?;
    let metadata = reader.read_optional_object::<serde_json::Value>()?;

    Ok(Content::ResourceLink(
        AttachmentMeta::builder()
            .name(name)
            .uri(uri)
            .maybe_description(description)
            .maybe_mime_type(mime_type)
            .maybe_size(size)
            .maybe_title(title)
            .maybe_annotations(annotations)
            .maybe_metadata(metadata)
            .build(),
    ))
}

fn read_text_fields(reader: &mut WireReader<'_>) -> Result<Content, CodecError> {
    Ok(Content::text(reader.read_utf()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_holds_exactly_the_builtin_tags() {
        let mut tags: Vec<_> = ContentRegistry::global().tags().collect();
        tags.sort_unstable();
        assert_eq!(tags, vec![RESOURCE_LINK_TAG, TEXT_TAG]);
    }

    #[test]
    fn text_is_written_with_legacy_tag() {
        let bytes = encode_content(&Content::text("hi")).unwrap();
        let mut expected = vec![0x00, 0x04];
        expected.extend_from_slice(b"TEXT");
        expected.extend_from_slice(&[0x00, 0x02, b'h', b'i']);
        assert_eq!(bytes, expected);
    }
}
