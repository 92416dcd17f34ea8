//! Profile completion scoring.
//!
//! A [`RequiredFieldSet`] defines what "100% complete" means; the calculator
//! counts how many of those fields currently hold a meaningful value.

use serde_json::Value;
use storefront_domain::{FileDescriptor, FormData, StoreAddress};

/// How a single required field decides whether it is complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionRule {
    /// Shape-driven: lists must be non-empty, objects must have a key,
    /// scalars must not be null or an empty string, files must be present.
    Present,
    /// Object whose listed sub-fields must all be filled.
    AllOf(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredField {
    pub name: String,
    pub rule: CompletionRule,
}

impl RequiredField {
    /// Builds a required field, picking the rule the field name implies.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let rule = if name == "storeAddress" {
            CompletionRule::AllOf(
                StoreAddress::REQUIRED_PARTS
                    .iter()
                    .map(|part| part.to_string())
                    .collect(),
            )
        } else {
            CompletionRule::Present
        };
        Self { name, rule }
    }

    pub fn with_rule(name: impl Into<String>, rule: CompletionRule) -> Self {
        Self {
            name: name.into(),
            rule,
        }
    }

    pub fn is_complete(&self, data: &FormData) -> bool {
        let value = match data.get(&self.name) {
            Some(value) => value,
            None => return false,
        };
        match &self.rule {
            CompletionRule::Present => is_filled(value),
            CompletionRule::AllOf(parts) => match value.as_object() {
                Some(map) => parts
                    .iter()
                    .all(|part| map.get(part).map_or(false, is_filled)),
                None => false,
            },
        }
    }
}

/// Ordered, immutable list of fields that make up a complete profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredFieldSet {
    fields: Vec<RequiredField>,
}

impl RequiredFieldSet {
    pub fn new(fields: Vec<RequiredField>) -> Self {
        let mut unique: Vec<RequiredField> = Vec::with_capacity(fields.len());
        for field in fields {
            if !unique.iter().any(|existing| existing.name == field.name) {
                unique.push(field);
            }
        }
        Self { fields: unique }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(RequiredField::new).collect())
    }

    pub fn fields(&self) -> &[RequiredField] {
        &self.fields
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.name == name)
    }

    /// Required fields that do not yet count as complete.
    pub fn missing<'a>(&'a self, data: &FormData) -> Vec<&'a str> {
        self.fields
            .iter()
            .filter(|field| !field.is_complete(data))
            .map(|field| field.name.as_str())
            .collect()
    }
}

/// Percentage (0..=100) of `required` fields that are complete in `data`.
///
/// An empty set is vacuously complete and yields 100.
pub fn calculate_completion(data: &FormData, required: &RequiredFieldSet) -> u8 {
    if required.is_empty() {
        return 100;
    }
    let completed = required
        .fields()
        .iter()
        .filter(|field| field.is_complete(data))
        .count();
    let ratio = completed as f64 / required.len() as f64;
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}

fn is_filled(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ if FileDescriptor::is_file_shaped(value) => true,
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}
