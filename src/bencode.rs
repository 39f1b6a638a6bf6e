//! Canonical bencode encoding.
//!
//! Integers are written as `i<n>e`, byte strings as `<len>:<bytes>`, lists as
//! `l...e` and dictionaries as `d...e`. `serde_bencode` emits dictionary keys
//! (struct fields and map keys alike) in ascending byte order, which is the
//! layout the info-hash is computed over.

use serde::Serialize;

use crate::error::Result;

pub use serde_bencode::value::Value;

/// Encode any serializable value as canonical bencode.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_bencode::to_bytes(value)?)
}

/// Decode bencoded bytes into a generic value tree.
pub fn decode(bytes: &[u8]) -> Result<Value> {
    Ok(serde_bencode::from_bytes(bytes)?)
}

/// Look up a key in a decoded dictionary.
pub fn dict_get<'a>(value: &'a Value, key: &[u8]) -> Option<&'a Value> {
    match value {
        Value::Dict(map) => map.get(key),
        _ => None,
    }
}
