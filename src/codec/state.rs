//! Whole-state persistence built on the content codec.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};

use super::error::CodecError;
use super::wire::{WireReader, WireWriter};
use super::{read_content, write_content, write_resource_link};
use crate::state::{Channel, ConversationState, Schema};
use crate::types::{Content, Message, Role, ToolExecutionRequest};

const STATE_HEADER: &str = "promptgraph.state/2";

/// Encode a conversation state: header, flagged routing hint, messages,
/// attachments.
pub fn encode_state(state: &ConversationState) -> Result<Vec<u8>, CodecError> {
    let mut writer = WireWriter::new();
    writer.write_utf(STATE_HEADER)?;
    writer.write_bool(state.routing_hint().is_some());
    if let Some(hint) = state.routing_hint() {
        writer.write_utf(hint)?;
    }

    writer.write_count(state.messages().len())?;
    for message in state.messages() {
        write_message(&mut writer, message)?;
    }

    writer.write_count(state.attachments().len())?;
    for meta in state.attachments() {
        write_resource_link(&mut writer, meta)?;
    }
    Ok(writer.into_bytes())
}

/// Decode a state previously written by [`encode_state`].
pub fn decode_state(bytes: &[u8], schema: Arc<Schema>) -> Result<ConversationState, CodecError> {
    let mut reader = WireReader::new(bytes);
    let header = reader.read_utf()?;
    if header != STATE_HEADER {
        return Err(CodecError::Corrupt(format!("unexpected state header '{header}'")));
    }
    let routing_hint = if reader.read_bool()? {
        Some(reader.read_utf()?)
    } else {
        None
    };

    let message_count = reader.read_count()?;
    let mut messages = Vec::with_capacity(message_count.min(1024));
    for _ in 0..message_count {
        messages.push(read_message(&mut reader)?);
    }

    let attachment_count = reader.read_count()?;
    let mut attachments = Vec::with_capacity(attachment_count.min(1024));
    for _ in 0..attachment_count {
        match read_content(&mut reader)? {
            Content::ResourceLink(meta) => attachments.push(meta),
            Content::Text { .. } => {
                return Err(CodecError::Corrupt(
                    "text record in attachments channel".to_string(),
                ))
            }
        }
    }
    reader.finish()?;

    let present = [
        (Channel::Messages, !messages.is_empty()),
        (Channel::Attachments, !attachments.is_empty()),
    ];
    if let Some((missing, _)) = present
        .iter()
        .find(|(channel, used)| *used && !schema.contains(*channel))
    {
        return Err(CodecError::Corrupt(format!(
            "state holds values for unregistered channel '{missing}'"
        )));
    }

    Ok(ConversationState::from_parts(
        schema,
        messages,
        attachments,
        routing_hint,
    ))
}

fn write_message(writer: &mut WireWriter, message: &Message) -> Result<(), CodecError> {
    writer.write_utf(&message.role.to_string())?;
    let timestamp = message
        .timestamp
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Nanos, true));
    writer.write_optional_utf(timestamp.as_deref())?;

    writer.write_count(message.content.len())?;
    for content in &message.content {
        write_content(writer, content)?;
    }

    writer.write_count(message.tool_requests.len())?;
    for request in &message.tool_requests {
        writer.write_utf(&request.id)?;
        writer.write_utf(&request.name)?;
        writer.write_object(&request.arguments)?;
    }
    Ok(())
}

fn read_message(reader: &mut WireReader<'_>) -> Result<Message, CodecError> {
    let role_tag = reader.read_utf()?;
    let role = role_tag
        .parse::<Role>()
        .map_err(|_| CodecError::Corrupt(format!("unknown role '{role_tag}'")))?;
    let timestamp = reader
        .read_optional_utf()?
        .map(|raw| {
            DateTime::parse_from_rfc3339(&raw)
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(|err| CodecError::Corrupt(format!("bad timestamp '{raw}': {err}")))
        })
        .transpose()?;

    let content_count = reader.read_count()?;
    let mut content = Vec::with_capacity(content_count.min(1024));
    for _ in 0..content_count {
        content.push(read_content(reader)?);
    }

    let request_count = reader.read_count()?;
    let mut tool_requests = Vec::with_capacity(request_count.min(1024));
    for _ in 0..request_count {
        let id = reader.read_utf()?;
        let name = reader.read_utf()?;
        let arguments = reader.read_object()?;
        tool_requests.push(ToolExecutionRequest::new(id, name, arguments));
    }

    Ok(Message {
        role,
        content,
        tool_requests,
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateUpdate;
    use crate::types::AttachmentMeta;
    use pretty_assertions::assert_eq;

    #[test]
    fn state_survives_encode_decode() {
        let schema = Arc::new(Schema::chat());
        let meta = AttachmentMeta::builder()
            .name("Controller.java")
            .uri("file:///dataset/Controller.java")
            .size(512)
            .build();
        let mut state = ConversationState::seed(schema.clone(), "review this", vec![meta.clone()]).unwrap();
        let mut user_with_link = Message::user("see attached");
        user_with_link.content.push(Content::ResourceLink(meta));
        state
            .merge(
                StateUpdate::new()
                    .append_message(Message::assistant_with_tools(
                        "",
                        vec![ToolExecutionRequest::new("c1", "grep", serde_json::json!({ "q": "main" }))],
                    ))
                    .append_message(Message::tool("3 matches"))
                    .append_message(user_with_link),
            )
            .unwrap();

        let bytes = encode_state(&state).unwrap();
        let decoded = decode_state(&bytes, schema).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn empty_routing_hint_is_kept() {
        let schema = Arc::new(Schema::chat());
        for hint in [None, Some(String::new()), Some("tools".to_string())] {
            let state = ConversationState::from_parts(
                Arc::clone(&schema),
                vec![Message::user("q")],
                Vec::new(),
                hint.clone(),
            );
            let decoded = decode_state(&encode_state(&state).unwrap(), Arc::clone(&schema)).unwrap();
            assert_eq!(decoded.routing_hint(), hint.as_deref());
        }
    }

    #[test]
    fn attachments_need_a_registered_channel() {
        let state = ConversationState::seed(
            Arc::new(Schema::chat()),
            "q",
            vec![AttachmentMeta::builder().name("a").uri("u").build()],
        )
        .unwrap();
        let bytes = encode_state(&state).unwrap();

        let messages_only = Arc::new(Schema::new([Channel::Messages]).unwrap());
        let err = decode_state(&bytes, messages_only).unwrap_err();
        assert!(matches!(err, CodecError::Corrupt(ref m) if m.contains("'attachments'")));

        let bare = ConversationState::seed(Arc::new(Schema::chat()), "q", Vec::new()).unwrap();
        let messages_only = Arc::new(Schema::new([Channel::Messages]).unwrap());
        assert!(decode_state(&encode_state(&bare).unwrap(), messages_only).is_ok());
    }

    #[test]
    fn wrong_header_is_rejected() {
        let mut writer = WireWriter::new();
        writer.write_utf("something-else").unwrap();
        let err = decode_state(writer.as_bytes(), Arc::new(Schema::chat())).unwrap_err();
        assert!(matches!(err, CodecError::Corrupt(_)));
    }
}
