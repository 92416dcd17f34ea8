//! File references and their raw contents.
//!
//! The serializable [`FileDescriptor`] lives in [`FormData`]; the bytes live in
//! a [`FileSideTable`] keyed by the same field name and never pass through
//! JSON.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::form_data::FormData;

/// Lightweight metadata describing an uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
            duration_secs: None,
        }
    }

    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration_secs = Some(seconds);
        self
    }

    /// Returns `true` when `value` looks like a file reference: an object with
    /// a string `name` and a numeric `size`.
    pub fn is_file_shaped(value: &Value) -> bool {
        match value.as_object() {
            Some(map) => {
                map.get("name").map_or(false, Value::is_string)
                    && map.get("size").map_or(false, Value::is_number)
            }
            None => false,
        }
    }

    /// Parses a descriptor out of a file-shaped JSON value.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !Self::is_file_shaped(value) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn is_video(&self) -> bool {
        self.mime_type.starts_with("video/")
    }
}

impl fmt::Display for FileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes, {})", self.name, self.size, self.mime_type)
    }
}

/// Raw file contents paired with their descriptor.
#[derive(Clone, PartialEq)]
pub struct FileBlob {
    pub descriptor: FileDescriptor,
    pub bytes: Vec<u8>,
}

impl FileBlob {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        let descriptor = FileDescriptor::new(name, bytes.len() as u64, mime_type);
        Self { descriptor, bytes }
    }

    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.descriptor.duration_secs = Some(seconds);
        self
    }
}

impl fmt::Debug for FileBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileBlob")
            .field("descriptor", &self.descriptor)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Binary contents held outside the serializable form state.
#[derive(Debug, Clone, Default)]
pub struct FileSideTable {
    blobs: BTreeMap<String, FileBlob>,
}

impl FileSideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `blob` under `field`, replacing any previous upload.
    pub fn attach(&mut self, field: impl Into<String>, blob: FileBlob) -> FileDescriptor {
        let descriptor = blob.descriptor.clone();
        self.blobs.insert(field.into(), blob);
        descriptor
    }

    pub fn detach(&mut self, field: &str) -> Option<FileBlob> {
        self.blobs.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&FileBlob> {
        self.blobs.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.blobs.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.blobs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn clear(&mut self) {
        self.blobs.clear();
    }

    /// Lists top-level file references in `data` that have no binary
    /// counterpart in this table.
    pub fn dangling_references(&self, data: &FormData) -> Vec<String> {
        data.iter()
            .filter(|(_, value)| FileDescriptor::is_file_shaped(value))
            .filter(|(key, _)| !self.blobs.contains_key(*key))
            .map(|(key, _)| key.to_string())
            .collect()
    }
}
