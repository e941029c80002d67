use thiserror::Error;

/// Failures while encoding or decoding tagged content.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },
    #[error("String of {0} bytes exceeds the 65535 byte limit")]
    StringTooLong(usize),
    #[error("Invalid UTF-8 in string field")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("Invalid boolean flag byte {0:#04x}")]
    InvalidFlag(u8),
    #[error("Unknown content tag: {0}")]
    UnknownTag(String),
    #[error("Corrupt record: {0}")]
    Corrupt(String),
    #[error("{0} trailing bytes after record")]
    TrailingBytes(usize),
    #[error("Size {0} does not fit a signed 64-bit field")]
    SizeOutOfRange(u64),
    #[error("Field '{0}' holds a non-finite number")]
    NonFiniteNumber(&'static str),
    #[error("Nested object error: {0}")]
    Object(#[from] serde_json::Error),
}
