//! Tests for core types.

use pretty_assertions::assert_eq;
use promptgraph::types::*;

#[test]
fn message_constructors_set_roles() {
    assert_eq!(Message::user("Hello").role, Role::User);
    assert_eq!(Message::assistant("Hi there!").role, Role::Assistant);
    assert_eq!(Message::tool("42").role, Role::Tool);
    assert_eq!(Message::user("Hello").text(), "Hello");
}

#[test]
fn reply_without_tools_becomes_plain_assistant_message() {
    let message = AssistantReply::text("done").into_message();
    assert_eq!(message.role, Role::Assistant);
    assert!(!message.has_tool_requests());
}

#[test]
fn message_text_skips_resource_links() {
    let mut message = Message::user("look at ");
    message.content.push(Content::from(
        AttachmentMeta::builder().name("a.rs").uri("file:///a.rs").build(),
    ));
    message.content.push(Content::text("this"));
    assert_eq!(message.text(), "look at this");
}

#[test]
fn content_json_is_tagged() {
    let json = serde_json::to_value(Content::text("hi")).unwrap();
    assert_eq!(json, serde_json::json!({"type": "text", "text": "hi"}));

    let link = Content::from(AttachmentMeta::builder().name("a").uri("u").build());
    let json = serde_json::to_value(&link).unwrap();
    assert_eq!(json["type"], "resource_link");
    assert_eq!(json["name"], "a");
    let back: Content = serde_json::from_value(json).unwrap();
    assert_eq!(back, link);
}

#[test]
fn role_parses_from_lowercase() {
    assert_eq!("assistant".parse::<Role>().unwrap(), Role::Assistant);
    assert_eq!(Role::Tool.to_string(), "tool");
}

#[test]
fn link_from_path_describes_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    std::fs::write(&path, "{\"k\": [1, 2]}").unwrap();

    let link = AttachmentLink::from_path(&path).unwrap();
    assert_eq!(link.name, "data.json");
    assert!(link.uri.starts_with("file://"));
    assert!(link.uri.ends_with("/data.json"));
    assert_eq!(link.size, Some(13));
    assert_eq!(link.mime_type.as_deref(), Some("application/json"));

    let meta = AttachmentMeta::from(&link);
    assert_eq!(meta.to_link(), link);
}

#[test]
fn link_from_missing_path_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = AttachmentLink::from_path(dir.path().join("nope.txt")).unwrap_err();
    assert!(matches!(err, promptgraph::error::GraphError::Io(_)));
}
