//! Helpers shared across components: identifiers, payload normalization and
//! metadata merging.

use std::fmt;
use std::str::FromStr;

use md5::Md5;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::model::Metadata;

/// Separator between hashed parts, so `("ab", "c")` and `("a", "bc")` differ.
const PART_SEPARATOR: &str = "\u{1f}";

/// Build a deterministic 32-character hex identifier from displayable parts.
///
/// # Example
///
/// ```
/// use kreuzberg_flow::utils::hash_id;
///
/// let id = hash_id(&[&"source", &"file.pdf", &123]);
/// assert_eq!(id.len(), 32);
/// assert_eq!(id, hash_id(&[&"source", &"file.pdf", &123]));
/// ```
pub fn hash_id(parts: &[&dyn fmt::Display]) -> String {
    let mut hasher = Md5::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update(PART_SEPARATOR.as_bytes());
        }
        hasher.update(part.to_string().as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// SHA-256 of raw content as lowercase hex.
pub fn content_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Normalize a single payload or a list of payloads into a list.
///
/// `null` becomes an empty list, arrays are unpacked, and every other value
/// (including strings and objects) is wrapped as a single item.
pub fn normalize_to_list(value: Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        other => vec![other],
    }
}

/// Anything that may carry a `metadata` field.
pub trait MetadataSource {
    /// The raw `metadata` field, if present.
    fn metadata_value(&self) -> Option<&Value>;
}

impl MetadataSource for Value {
    fn metadata_value(&self) -> Option<&Value> {
        self.get("metadata")
    }
}

impl MetadataSource for Map<String, Value> {
    fn metadata_value(&self) -> Option<&Value> {
        self.get("metadata")
    }
}

/// Return the payload's `metadata` object, or an empty map when it is
/// missing or not an object.
pub fn ensure_metadata_dict<P: MetadataSource + ?Sized>(payload: &P) -> Metadata {
    match payload.metadata_value() {
        Some(Value::Object(map)) => map.clone(),
        _ => Metadata::new(),
    }
}

/// Conflict resolution when merging metadata maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Incoming values replace existing ones
    #[default]
    Overwrite,
    /// Existing values are kept; only new keys are added
    Keep,
    /// Differing values for the same key are an error
    Raise,
}

impl MergePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergePolicy::Overwrite => "overwrite",
            MergePolicy::Keep => "keep",
            MergePolicy::Raise => "raise",
        }
    }
}

impl FromStr for MergePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "overwrite" => Ok(MergePolicy::Overwrite),
            "keep" => Ok(MergePolicy::Keep),
            "raise" => Ok(MergePolicy::Raise),
            _ => Err(Error::InvalidArgument(
                "policy must be one of: overwrite, keep, raise".into(),
            )),
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merge two metadata maps according to `policy`.
pub fn merge_metadata(base: &Metadata, incoming: &Metadata, policy: MergePolicy) -> Result<Metadata> {
    let mut merged = base.clone();

    for (key, value) in incoming {
        match merged.get(key) {
            None => {
                merged.insert(key.clone(), value.clone());
            }
            Some(existing) => match policy {
                MergePolicy::Overwrite => {
                    merged.insert(key.clone(), value.clone());
                }
                MergePolicy::Keep => {}
                MergePolicy::Raise => {
                    if existing != value {
                        return Err(Error::InvalidArgument(format!(
                            "metadata conflict for key '{}': {} != {}",
                            key, existing, value
                        )));
                    }
                }
            },
        }
    }

    Ok(merged)
}
