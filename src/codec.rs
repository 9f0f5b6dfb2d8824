//! Byte-level document codec.
//!
//! BSON encoding is explicitly out of scope for this crate (§1): the
//! storage layer only needs *some* self-describing byte encoding for a
//! document, supplied by an external collaborator. [Codec] is that seam;
//! [DefaultCodec] is a minimal, always-available implementation so the
//! crate works end to end without pulling in a real BSON crate.
//!
//! The wire format is a tag-prefixed, length-prefixed encoding in the
//! manner of the teacher's own `vlog`/`robt` entry formats: every value is
//! `[tag: u8][payload]`, with variable-length payloads (strings, binary,
//! arrays, documents) carrying a little-endian `u32` length prefix.

use std::collections::BTreeMap;

use crate::{
    err_at,
    value::{Document, Value},
    Error, Result,
};

const TAG_NULL: u8 = 0;
const TAG_FALSE: u8 = 1;
const TAG_TRUE: u8 = 2;
const TAG_INT: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_STRING: u8 = 5;
const TAG_BINARY: u8 = 6;
const TAG_ARRAY: u8 = 7;
const TAG_DOCUMENT: u8 = 8;

/// A byte-level serializer yielding self-describing bytes for a document.
pub trait Codec: Send + Sync {
    fn encode(&self, doc: &Document) -> Vec<u8>;
    fn decode(&self, bytes: &[u8]) -> Result<Document>;
}

/// The crate's built-in [Codec]. Deterministic, dependency-free, and
/// round-trips every [Value] variant.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCodec;

impl DefaultCodec {
    /// Encode a single [Value] outside of any document, used to derive a
    /// deterministic blob name for non-string document ids.
    pub(crate) fn encode_standalone(&self, value: &Value) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_value(value, &mut buf);
        buf
    }
}

impl Codec for DefaultCodec {
    fn encode(&self, doc: &Document) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_document(doc, &mut buf);
        buf
    }

    fn decode(&self, bytes: &[u8]) -> Result<Document> {
        let mut cursor = 0usize;
        let value = decode_value(bytes, &mut cursor)?;
        match value {
            Value::Document(doc) => Ok(doc),
            _ => err_at!(StorageIo, msg: "document blob did not decode to a document"),
        }
    }
}

fn encode_value(value: &Value, buf: &mut Vec<u8>) {
    match value {
        Value::Null => buf.push(TAG_NULL),
        Value::Boolean(false) => buf.push(TAG_FALSE),
        Value::Boolean(true) => buf.push(TAG_TRUE),
        Value::Int(i) => {
            buf.push(TAG_INT);
            buf.extend_from_slice(&i.to_le_bytes());
        }
        Value::Float(f) => {
            buf.push(TAG_FLOAT);
            buf.extend_from_slice(&f.to_le_bytes());
        }
        Value::String(s) => {
            buf.push(TAG_STRING);
            encode_bytes(s.as_bytes(), buf);
        }
        Value::Binary(b) => {
            buf.push(TAG_BINARY);
            encode_bytes(b, buf);
        }
        Value::Array(items) => {
            buf.push(TAG_ARRAY);
            encode_len(items.len(), buf);
            for item in items {
                encode_value(item, buf);
            }
        }
        Value::Document(doc) => {
            buf.push(TAG_DOCUMENT);
            encode_document(doc, buf);
        }
    }
}

fn encode_document(doc: &Document, buf: &mut Vec<u8>) {
    encode_len(doc.len(), buf);
    for (key, value) in doc.iter() {
        encode_bytes(key.as_bytes(), buf);
        encode_value(value, buf);
    }
}

fn encode_len(len: usize, buf: &mut Vec<u8>) {
    buf.extend_from_slice(&(len as u32).to_le_bytes());
}

fn encode_bytes(bytes: &[u8], buf: &mut Vec<u8>) {
    encode_len(bytes.len(), buf);
    buf.extend_from_slice(bytes);
}

fn decode_len(bytes: &[u8], cursor: &mut usize) -> Result<usize> {
    let end = *cursor + 4;
    let slice = bytes
        .get(*cursor..end)
        .ok_or_else(|| Error::StorageIo("truncated length prefix".to_string()))?;
    let len = u32::from_le_bytes(slice.try_into().unwrap()) as usize;
    *cursor = end;
    Ok(len)
}

fn decode_bytes<'a>(bytes: &'a [u8], cursor: &mut usize) -> Result<&'a [u8]> {
    let len = decode_len(bytes, cursor)?;
    let end = *cursor + len;
    let slice = bytes
        .get(*cursor..end)
        .ok_or_else(|| Error::StorageIo("truncated byte payload".to_string()))?;
    *cursor = end;
    Ok(slice)
}

fn decode_value(bytes: &[u8], cursor: &mut usize) -> Result<Value> {
    let tag = *bytes
        .get(*cursor)
        .ok_or_else(|| Error::StorageIo("truncated value tag".to_string()))?;
    *cursor += 1;
    let value = match tag {
        TAG_NULL => Value::Null,
        TAG_FALSE => Value::Boolean(false),
        TAG_TRUE => Value::Boolean(true),
        TAG_INT => {
            let end = *cursor + 8;
            let slice = bytes
                .get(*cursor..end)
                .ok_or_else(|| Error::StorageIo("truncated int".to_string()))?;
            *cursor = end;
            Value::Int(i64::from_le_bytes(slice.try_into().unwrap()))
        }
        TAG_FLOAT => {
            let end = *cursor + 8;
            let slice = bytes
                .get(*cursor..end)
                .ok_or_else(|| Error::StorageIo("truncated float".to_string()))?;
            *cursor = end;
            Value::Float(f64::from_le_bytes(slice.try_into().unwrap()))
        }
        TAG_STRING => {
            let slice = decode_bytes(bytes, cursor)?;
            let s = err_at!(StorageIo, String::from_utf8(slice.to_vec()))?;
            Value::String(s)
        }
        TAG_BINARY => Value::Binary(decode_bytes(bytes, cursor)?.to_vec()),
        TAG_ARRAY => {
            let len = decode_len(bytes, cursor)?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(decode_value(bytes, cursor)?);
            }
            Value::Array(items)
        }
        TAG_DOCUMENT => {
            let len = decode_len(bytes, cursor)?;
            let mut doc: BTreeMap<String, Value> = BTreeMap::new();
            for _ in 0..len {
                let key_bytes = decode_bytes(bytes, cursor)?;
                let key = err_at!(StorageIo, String::from_utf8(key_bytes.to_vec()))?;
                let value = decode_value(bytes, cursor)?;
                doc.insert(key, value);
            }
            Value::Document(doc)
        }
        other => return err_at!(StorageIo, msg: "unknown value tag {}", other),
    };
    Ok(value)
}

#[cfg(test)]
#[path = "codec_test.rs"]
mod codec_test;
