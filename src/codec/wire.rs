//! Big-endian wire primitives.
//!
//! Strings carry an unsigned 16-bit byte length, integers are big-endian,
//! flags are a single `0x00`/`0x01` byte, and nested objects are JSON behind
//! an unsigned 32-bit byte length.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::CodecError;

/// Append-only output buffer.
#[derive(Debug, Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_utf(&mut self, value: &str) -> Result<(), CodecError> {
        let len = u16::try_from(value.len()).map_err(|_| CodecError::StringTooLong(value.len()))?;
        self.buf.extend_from_slice(&len.to_be_bytes());
        self.buf.extend_from_slice(value.as_bytes());
        Ok(())
    }

    /// Absent values are written as the empty string.
    pub fn write_optional_utf(&mut self, value: Option<&str>) -> Result<(), CodecError> {
        self.write_utf(value.unwrap_or(""))
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    /// Write a collection length.
    pub fn write_count(&mut self, count: usize) -> Result<(), CodecError> {
        let count = i32::try_from(count)
            .map_err(|_| CodecError::Corrupt(format!("collection of {count} entries is too large")))?;
        self.write_i32(count);
        Ok(())
    }

    pub fn write_object<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CodecError> {
        let json = serde_json::to_vec(value)?;
        let len = u32::try_from(json.len())
            .map_err(|_| CodecError::Corrupt(format!("object of {} bytes is too large", json.len())))?;
        self.buf.extend_from_slice(&len.to_be_bytes());
        self.buf.extend_from_slice(&json);
        Ok(())
    }

    /// Presence flag, then the object when present.
    pub fn write_optional_object<T: Serialize>(&mut self, value: Option<&T>) -> Result<(), CodecError> {
        self.write_bool(value.is_some());
        if let Some(value) = value {
            self.write_object(value)?;
        }
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over an encoded buffer.
#[derive(Debug)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Succeed only when every byte has been consumed.
    pub fn finish(self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            extra => Err(CodecError::TrailingBytes(extra)),
        }
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8], CodecError> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(CodecError::UnexpectedEof { needed, remaining });
        }
        let slice = &self.buf[self.pos..self.pos + needed];
        self.pos += needed;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_utf(&mut self) -> Result<String, CodecError> {
        let len = u16::from_be_bytes(self.take_array()?) as usize;
        let bytes = self.take(len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    /// The empty string decodes as absent.
    pub fn read_optional_utf(&mut self) -> Result<Option<String>, CodecError> {
        let value = self.read_utf()?;
        Ok((!value.is_empty()).then_some(value))
    }

    pub fn read_i64(&mut self) -> Result<i64, CodecError> {
        Ok(i64::from_be_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        Ok(i32::from_be_bytes(self.take_array()?))
    }

    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        match self.take(1)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::InvalidFlag(other)),
        }
    }

    pub fn read_count(&mut self) -> Result<usize, CodecError> {
        let count = self.read_i32()?;
        usize::try_from(count).map_err(|_| CodecError::Corrupt(format!("negative count {count}")))
    }

    pub fn read_object<T: DeserializeOwned>(&mut self) -> Result<T, CodecError> {
        let len = u32::from_be_bytes(self.take_array()?) as usize;
        let bytes = self.take(len)?;
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn read_optional_object<T: DeserializeOwned>(&mut self) -> Result<Option<T>, CodecError> {
        if self.read_bool()? {
            Ok(Some(self.read_object()?))
        } else {
            Ok(None)
        }
    }
}
