//! Collaborator boundary for fetching and submitting store profiles.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::submission::{SubmissionKind, SubmissionPayload};

/// Failure reported by a [`ProfileGateway`], carrying a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GatewayError {
    pub message: String,
}

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A store profile as returned by the backend: a flat field map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RemoteProfile {
    pub store_id: String,
    pub fields: Map<String, Value>,
}

impl RemoteProfile {
    pub fn new(store_id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            store_id: store_id.into(),
            fields,
        }
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub store_id: String,
    pub profile: Option<RemoteProfile>,
}

/// Abstraction over whatever serves and accepts store profiles.
pub trait ProfileGateway: Send + Sync {
    fn fetch_profile(&self, identity: &str) -> Result<RemoteProfile, GatewayError>;
    fn submit(
        &self,
        kind: &SubmissionKind,
        payload: &SubmissionPayload,
    ) -> Result<SubmissionReceipt, GatewayError>;
}

/// Process-local gateway used by the CLI and tests.
#[derive(Debug, Default)]
pub struct InMemoryProfileGateway {
    profiles: Mutex<HashMap<String, Map<String, Value>>>,
    submissions: Mutex<Vec<(SubmissionKind, SubmissionPayload)>>,
    fail_next_submit: Mutex<Option<String>>,
    next_id: Mutex<u64>,
}

impl InMemoryProfileGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn insert_profile(&self, profile: RemoteProfile) {
        if let Ok(mut profiles) = self.profiles.lock() {
            profiles.insert(profile.store_id, profile.fields);
        }
    }

    /// Makes the next `submit` call fail with `message`.
    pub fn fail_next_submit(&self, message: impl Into<String>) {
        if let Ok(mut slot) = self.fail_next_submit.lock() {
            *slot = Some(message.into());
        }
    }

    pub fn submissions(&self) -> Vec<(SubmissionKind, SubmissionPayload)> {
        self.submissions
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    fn allocate_id(&self) -> Result<String, GatewayError> {
        let mut next = self
            .next_id
            .lock()
            .map_err(|_| GatewayError::new("gateway state poisoned"))?;
        *next += 1;
        Ok(format!("store-{:04}", *next))
    }
}

impl ProfileGateway for InMemoryProfileGateway {
    fn fetch_profile(&self, identity: &str) -> Result<RemoteProfile, GatewayError> {
        let profiles = self
            .profiles
            .lock()
            .map_err(|_| GatewayError::new("gateway state poisoned"))?;
        profiles
            .get(identity)
            .cloned()
            .map(|fields| RemoteProfile::new(identity, fields))
            .ok_or_else(|| GatewayError::new(format!("No store profile found for `{identity}`")))
    }

    fn submit(
        &self,
        kind: &SubmissionKind,
        payload: &SubmissionPayload,
    ) -> Result<SubmissionReceipt, GatewayError> {
        if let Some(message) = self
            .fail_next_submit
            .lock()
            .map_err(|_| GatewayError::new("gateway state poisoned"))?
            .take()
        {
            return Err(GatewayError::new(message));
        }

        let store_id = match kind {
            SubmissionKind::Create => self.allocate_id()?,
            SubmissionKind::Update { store_id } => store_id.clone(),
        };
        let fields = payload.to_profile_fields();
        {
            let mut profiles = self
                .profiles
                .lock()
                .map_err(|_| GatewayError::new("gateway state poisoned"))?;
            profiles.insert(store_id.clone(), fields.clone());
        }
        self.submissions
            .lock()
            .map_err(|_| GatewayError::new("gateway state poisoned"))?
            .push((kind.clone(), payload.clone()));

        Ok(SubmissionReceipt {
            profile: Some(RemoteProfile::new(store_id.clone(), fields)),
            store_id,
        })
    }
}
