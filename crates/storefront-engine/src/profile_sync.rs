//! One-way hydration of the reducer from a fetched store profile.

use std::sync::Arc;

use serde_json::Value;
use storefront_domain::FieldPath;

use crate::error::CoreError;
use crate::gateway::RemoteProfile;
use crate::reducer::RegistrationStore;
use crate::submission::COMPLETION_FIELD;

/// Outcome of replaying a profile into the reducer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HydrationReport {
    pub applied: usize,
    pub coerced: Vec<String>,
    /// Keys that are not plain top-level field names, left out of the replay.
    pub skipped: Vec<String>,
    /// Required fields the profile left incomplete.
    pub missing_required: Vec<String>,
}

/// Replays fetched profiles into a [`RegistrationStore`] once per profile
/// object.
#[derive(Debug, Default)]
pub struct ProfileSync {
    last: Option<Arc<RemoteProfile>>,
}

impl ProfileSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replays `profile` unless this exact `Arc` was already applied.
    ///
    /// Returns `None` when the profile was skipped.
    pub fn sync(
        &mut self,
        store: &mut RegistrationStore,
        profile: &Arc<RemoteProfile>,
    ) -> Result<Option<HydrationReport>, CoreError> {
        if let Some(last) = &self.last {
            if Arc::ptr_eq(last, profile) {
                return Ok(None);
            }
        }
        let report = hydrate(store, profile)?;
        self.last = Some(Arc::clone(profile));
        Ok(Some(report))
    }

    pub fn forget(&mut self) {
        self.last = None;
    }
}

/// Writes every top-level profile key through the reducer's update path.
pub fn hydrate(
    store: &mut RegistrationStore,
    profile: &RemoteProfile,
) -> Result<HydrationReport, CoreError> {
    let mut report = HydrationReport::default();
    for (key, value) in &profile.fields {
        if !is_top_level_key(key) {
            tracing::warn!(
                store_id = %profile.store_id,
                key = %key,
                "skipping profile key that is not a top-level field"
            );
            report.skipped.push(key.clone());
            continue;
        }
        let (value, coerced) = coerce_boolean_string(value);
        if let Err(err) = store.update_field(key, value) {
            tracing::warn!(
                store_id = %profile.store_id,
                key = %key,
                error = %err,
                "profile key not applied"
            );
            report.skipped.push(key.clone());
            continue;
        }
        if coerced {
            report.coerced.push(key.clone());
        }
        report.applied += 1;
    }

    if let Some(trusted) = profile
        .fields
        .get(COMPLETION_FIELD)
        .and_then(trusted_completion)
    {
        store.set_profile_completion(trusted);
    }

    report.missing_required = store
        .state()
        .required_fields
        .missing(store.form_data())
        .into_iter()
        .map(str::to_string)
        .collect();
    if !report.missing_required.is_empty() {
        tracing::warn!(
            store_id = %profile.store_id,
            missing = ?report.missing_required,
            "hydrated profile is missing required fields"
        );
    }
    tracing::info!(
        store_id = %profile.store_id,
        applied = report.applied,
        "profile hydrated"
    );
    Ok(report)
}

/// Profiles are flat; a dotted or blank key would otherwise be written as a
/// nested path or abort the replay.
fn is_top_level_key(key: &str) -> bool {
    FieldPath::parse(key).map_or(false, |path| !path.is_nested() && path.to_string() == key)
}

fn coerce_boolean_string(value: &Value) -> (Value, bool) {
    match value.as_str() {
        Some("true") => (Value::Bool(true), true),
        Some("false") => (Value::Bool(false), true),
        _ => (value.clone(), false),
    }
}

fn trusted_completion(value: &Value) -> Option<u8> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if number.is_finite() && (0.0..=100.0).contains(&number) {
        Some(number.round() as u8)
    } else {
        None
    }
}
