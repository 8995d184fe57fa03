//! Serde helpers for `Arc<str>` identifiers
//!
//! Token types and modifiers are stored as `Arc<str>`. Decoding through a
//! legend shares the legend's allocation; deserializing allocates a fresh one
//! per value. On the wire they are plain strings.

use serde::{Deserialize, Deserializer, Serializer};
use std::sync::Arc;

/// Serialize a shared string as a plain string
pub fn serialize_arc_str<S>(value: &Arc<str>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value)
}

/// Deserialize a plain string into a newly allocated `Arc<str>`
pub fn deserialize_arc_str<'de, D>(deserializer: D) -> Result<Arc<str>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(Arc::from(value))
}
