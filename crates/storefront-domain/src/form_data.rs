//! Field store for everything the wizard collects.
//!
//! Fields are addressed by dotted paths (`storeAddress.state`). Writes create
//! intermediate objects on demand; reads never allocate.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A parsed dotted field path such as `storeAddress.openingHours`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PathError::Empty);
        }
        let mut segments = Vec::new();
        for segment in trimmed.split('.') {
            if segment.is_empty() {
                return Err(PathError::EmptySegment {
                    path: trimmed.to_string(),
                });
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Errors raised while parsing or walking a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    Empty,
    EmptySegment { path: String },
    NotAnObject { segment: String },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::Empty => f.write_str("field path cannot be empty"),
            PathError::EmptySegment { path } => {
                write!(f, "field path `{path}` contains an empty segment")
            }
            PathError::NotAnObject { segment } => {
                write!(f, "cannot write below `{segment}`: value is not an object")
            }
        }
    }
}

impl std::error::Error for PathError {}

/// All wizard-collected data, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData {
    fields: Map<String, Value>,
}

impl FormData {
    pub fn new() -> Self {
        Self { fields: Map::new() }
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Reads the value at `path`, if every segment resolves.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let path = FieldPath::parse(path).ok()?;
        self.get_path(&path)
    }

    pub fn get_path(&self, path: &FieldPath) -> Option<&Value> {
        let (first, rest) = path.segments().split_first()?;
        let mut current = self.fields.get(first)?;
        for segment in rest {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Writes `value` at `path`, creating intermediate objects as needed.
    pub fn set(&mut self, path: &str, value: Value) -> Result<(), PathError> {
        let path = FieldPath::parse(path)?;
        self.set_path(&path, value)
    }

    pub fn set_path(&mut self, path: &FieldPath, value: Value) -> Result<(), PathError> {
        let segments = path.segments();
        let (last, parents) = match segments.split_last() {
            Some(split) => split,
            None => return Err(PathError::Empty),
        };
        let mut current = &mut self.fields;
        for segment in parents {
            let slot = current
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if slot.is_null() {
                *slot = Value::Object(Map::new());
            }
            current = match slot {
                Value::Object(map) => map,
                _ => {
                    return Err(PathError::NotAnObject {
                        segment: segment.clone(),
                    })
                }
            };
        }
        current.insert(last.clone(), value);
        Ok(())
    }

    /// Removes the value at `path`, returning it when present.
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        let path = FieldPath::parse(path).ok()?;
        let (last, parents) = path.segments().split_last()?;
        let mut current = &mut self.fields;
        for segment in parents {
            current = current.get_mut(segment)?.as_object_mut()?;
        }
        current.remove(last)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Convenience accessor for string-valued fields.
    pub fn str_value(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Reads a flag, treating `"true"` strings as set.
    pub fn flag(&self, path: &str) -> bool {
        match self.get(path) {
            Some(Value::Bool(value)) => *value,
            Some(Value::String(value)) => value == "true",
            _ => false,
        }
    }
}
