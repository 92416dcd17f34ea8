//! Typed views over the composite store fields held in [`FormData`].
//!
//! [`FormData`]: crate::form_data::FormData

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Physical store location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreAddress {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub local_government: String,
    #[serde(default)]
    pub full_address: String,
    #[serde(default)]
    pub opening_hours: Vec<OpeningHours>,
}

impl StoreAddress {
    /// Sub-fields that must all be non-empty for the address to count.
    pub const REQUIRED_PARTS: [&'static str; 3] = ["state", "localGovernment", "fullAddress"];

    pub fn new(
        state: impl Into<String>,
        local_government: impl Into<String>,
        full_address: impl Into<String>,
    ) -> Self {
        Self {
            state: state.into(),
            local_government: local_government.into(),
            full_address: full_address.into(),
            opening_hours: Vec::new(),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// One row of a store's weekly opening hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHours {
    pub day: String,
    pub from: String,
    pub to: String,
}

/// Delivery price for one state/LGA zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryZone {
    pub state: String,
    pub local_government: String,
    #[serde(default)]
    pub delivery_fee: Option<f64>,
    #[serde(default)]
    pub mark_for_free_delivery: bool,
}

impl DeliveryZone {
    pub fn priced(
        state: impl Into<String>,
        local_government: impl Into<String>,
        fee: f64,
    ) -> Self {
        Self {
            state: state.into(),
            local_government: local_government.into(),
            delivery_fee: Some(fee),
            mark_for_free_delivery: false,
        }
    }

    pub fn free(state: impl Into<String>, local_government: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            local_government: local_government.into(),
            delivery_fee: None,
            mark_for_free_delivery: true,
        }
    }

    /// Checks the priced-or-free invariant.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.state.trim().is_empty() {
            return Err(RecordError::MissingZoneState);
        }
        match self.delivery_fee {
            Some(fee) if !fee.is_finite() || fee < 0.0 => Err(RecordError::NegativeFee(fee)),
            Some(_) => Ok(()),
            None if self.mark_for_free_delivery => Ok(()),
            None => Err(RecordError::UnpricedZone {
                state: self.state.clone(),
                local_government: self.local_government.clone(),
            }),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Social profile links captured on the category step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instagram: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub facebook: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub twitter: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tiktok: String,
}

impl SocialLinks {
    pub const PLATFORMS: [&'static str; 4] = ["instagram", "facebook", "twitter", "tiktok"];
}

/// Adds `name` to a category list unless an equal entry already exists.
///
/// Returns `true` when the list changed.
pub fn insert_category(categories: &mut Vec<String>, name: &str) -> bool {
    let name = name.trim();
    if name.is_empty() || categories.iter().any(|existing| existing == name) {
        return false;
    }
    categories.push(name.to_string());
    true
}

/// Removes duplicate and blank categories while keeping first occurrences.
pub fn dedupe_categories(categories: &[String]) -> Vec<String> {
    let mut unique = Vec::with_capacity(categories.len());
    for name in categories {
        insert_category(&mut unique, name);
    }
    unique
}

/// Field holding the store's category list.
pub const CATEGORIES_FIELD: &str = "categories";

/// Dedupes a `categories` value on its way into the form data. Anything other
/// than a list of strings is returned untouched and left to validation.
pub fn normalize_categories(value: Value) -> Value {
    let names = value.as_array().and_then(|items| {
        items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
    });
    match names {
        Some(names) => Value::from(dedupe_categories(&names)),
        None => value,
    }
}

/// Errors raised by record invariants.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    MissingZoneState,
    NegativeFee(f64),
    UnpricedZone {
        state: String,
        local_government: String,
    },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::MissingZoneState => f.write_str("delivery zone needs a state"),
            RecordError::NegativeFee(fee) => {
                write!(f, "delivery fee must be zero or more (got {fee})")
            }
            RecordError::UnpricedZone {
                state,
                local_government,
            } => write!(
                f,
                "delivery zone {state}/{local_government} needs a fee or free delivery"
            ),
        }
    }
}

impl std::error::Error for RecordError {}
