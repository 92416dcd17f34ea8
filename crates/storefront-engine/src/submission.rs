//! Packs form data into a transport payload.
//!
//! Classification per field: side-table binary first, then composite values
//! as JSON text, then scalars as plain text. The reducer's completion value is
//! appended as `completionPercentage`.

use std::fmt;

use serde_json::{Map, Value};
use storefront_domain::{FileBlob, FileSideTable, FormData};

pub const COMPLETION_FIELD: &str = "completionPercentage";

/// Create a new store or update an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionKind {
    Create,
    Update { store_id: String },
}

impl fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionKind::Create => f.write_str("create"),
            SubmissionKind::Update { store_id } => write!(f, "update {store_id}"),
        }
    }
}

/// One transport-ready field value.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadPart {
    Binary(FileBlob),
    Json(String),
    Scalar(String),
}

impl PayloadPart {
    pub fn kind(&self) -> &'static str {
        match self {
            PayloadPart::Binary(_) => "binary",
            PayloadPart::Json(_) => "json",
            PayloadPart::Scalar(_) => "scalar",
        }
    }
}

/// Ordered multipart-style payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubmissionPayload {
    parts: Vec<(String, PayloadPart)>,
}

impl SubmissionPayload {
    pub fn parts(&self) -> &[(String, PayloadPart)] {
        &self.parts
    }

    pub fn get(&self, field: &str) -> Option<&PayloadPart> {
        self.parts
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, part)| part)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Field name and part kind for each entry, for logs and previews.
    pub fn manifest(&self) -> Vec<(&str, &'static str)> {
        self.parts
            .iter()
            .map(|(name, part)| (name.as_str(), part.kind()))
            .collect()
    }

    /// Decodes the payload back into a flat profile map, the way a backend
    /// would store it. Binaries become their descriptors.
    pub fn to_profile_fields(&self) -> Map<String, Value> {
        self.parts
            .iter()
            .map(|(name, part)| {
                let value = match part {
                    PayloadPart::Binary(blob) => blob.descriptor.to_value(),
                    PayloadPart::Json(text) => {
                        serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.clone()))
                    }
                    PayloadPart::Scalar(text) => Value::String(text.clone()),
                };
                (name.clone(), value)
            })
            .collect()
    }

    fn push(&mut self, name: impl Into<String>, part: PayloadPart) {
        self.parts.push((name.into(), part));
    }
}

/// Builds the payload for `data`, attaching raw bytes from `files`.
pub fn pack_submission(data: &FormData, files: &FileSideTable, completion: u8) -> SubmissionPayload {
    let mut payload = SubmissionPayload::default();
    for (name, value) in data.iter() {
        if name == COMPLETION_FIELD {
            continue;
        }
        let part = if let Some(blob) = files.get(name) {
            PayloadPart::Binary(blob.clone())
        } else {
            match value {
                Value::Object(_) | Value::Array(_) => PayloadPart::Json(value.to_string()),
                Value::String(text) => PayloadPart::Scalar(text.clone()),
                other => PayloadPart::Scalar(other.to_string()),
            }
        };
        payload.push(name, part);
    }
    payload.push(COMPLETION_FIELD, PayloadPart::Scalar(completion.to_string()));
    tracing::debug!(parts = payload.len(), "submission payload packed");
    payload
}
