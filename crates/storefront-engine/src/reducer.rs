//! Registration reducer: the single owner of wizard form state.
//!
//! Every mutation goes through [`RegistrationStore::dispatch`] (or one of its
//! named wrappers), so the completion percentage is recomputed in the same
//! transition that changes the data.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use storefront_domain::{
    normalize_categories, FormData, WizardStep, CATEGORIES_FIELD, FIRST_STEP,
};

use crate::completion::{calculate_completion, RequiredFieldSet};
use crate::error::CoreError;
use crate::validation::required_field_policy;

pub const GENERIC_SUBMISSION_ERROR: &str =
    "Something went wrong while saving your store. Please try again.";

/// Lifecycle of the asynchronous submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SubmissionStatus::Idle => "idle",
            SubmissionStatus::Loading => "loading",
            SubmissionStatus::Succeeded => "succeeded",
            SubmissionStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Snapshot of the reducer state.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationState {
    pub form_data: FormData,
    pub current_step: WizardStep,
    pub profile_completion: u8,
    pub required_fields: Arc<RequiredFieldSet>,
    pub status: SubmissionStatus,
    pub error: Option<String>,
}

impl RegistrationState {
    pub fn new(required_fields: Arc<RequiredFieldSet>) -> Self {
        Self {
            form_data: FormData::new(),
            current_step: FIRST_STEP,
            profile_completion: 0,
            required_fields,
            status: SubmissionStatus::Idle,
            error: None,
        }
    }
}

/// Phases of the three-step submission lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionPhase {
    Pending,
    Fulfilled,
    Rejected { message: Option<String> },
}

/// Every transition the reducer accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationAction {
    UpdateField { name: String, value: Value },
    SetStep(WizardStep),
    Reset,
    SetProfileCompletion(u8),
    Submission(SubmissionPhase),
    DismissError,
}

/// Owns the [`RegistrationState`] and applies actions atomically.
#[derive(Debug, Clone)]
pub struct RegistrationStore {
    state: RegistrationState,
}

impl Default for RegistrationStore {
    fn default() -> Self {
        Self::new(Arc::new(required_field_policy()))
    }
}

impl RegistrationStore {
    pub fn new(required_fields: Arc<RequiredFieldSet>) -> Self {
        Self {
            state: RegistrationState::new(required_fields),
        }
    }

    pub fn state(&self) -> &RegistrationState {
        &self.state
    }

    pub fn form_data(&self) -> &FormData {
        &self.state.form_data
    }

    pub fn current_step(&self) -> WizardStep {
        self.state.current_step
    }

    pub fn profile_completion(&self) -> u8 {
        self.state.profile_completion
    }

    pub fn status(&self) -> SubmissionStatus {
        self.state.status
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn dispatch(&mut self, action: RegistrationAction) -> Result<(), CoreError> {
        match action {
            RegistrationAction::UpdateField { name, value } => self.update_field(&name, value),
            RegistrationAction::SetStep(step) => {
                self.set_step(step);
                Ok(())
            }
            RegistrationAction::Reset => {
                self.reset();
                Ok(())
            }
            RegistrationAction::SetProfileCompletion(value) => {
                self.set_profile_completion(value);
                Ok(())
            }
            RegistrationAction::Submission(phase) => {
                self.apply_submission(phase);
                Ok(())
            }
            RegistrationAction::DismissError => {
                self.dismiss_error();
                Ok(())
            }
        }
    }

    /// Writes `value` at the dotted `name` and recomputes completion.
    pub fn update_field(&mut self, name: &str, value: Value) -> Result<(), CoreError> {
        let value = if name.trim() == CATEGORIES_FIELD {
            normalize_categories(value)
        } else {
            value
        };
        self.state.form_data.set(name, value)?;
        self.recompute_completion();
        tracing::debug!(
            field = name,
            completion = self.state.profile_completion,
            "field updated"
        );
        Ok(())
    }

    /// Removes a field entirely and recomputes completion.
    pub fn clear_field(&mut self, name: &str) -> Option<Value> {
        let removed = self.state.form_data.remove(name);
        self.recompute_completion();
        removed
    }

    /// Moves to `step` without bounds or validation checks.
    pub fn set_step(&mut self, step: WizardStep) {
        tracing::debug!(from = self.state.current_step, to = step, "step changed");
        self.state.current_step = step;
    }

    /// Restores a fresh state; previously handed-out data is never reused.
    pub fn reset(&mut self) {
        let required = Arc::clone(&self.state.required_fields);
        self.state = RegistrationState::new(required);
        tracing::debug!("registration reset");
    }

    pub fn set_profile_completion(&mut self, value: u8) {
        self.state.profile_completion = value.min(100);
    }

    pub fn dismiss_error(&mut self) {
        self.state.error = None;
        if self.state.status == SubmissionStatus::Failed {
            self.state.status = SubmissionStatus::Idle;
        }
    }

    fn apply_submission(&mut self, phase: SubmissionPhase) {
        match phase {
            SubmissionPhase::Pending => {
                self.state.status = SubmissionStatus::Loading;
                self.state.error = None;
            }
            SubmissionPhase::Fulfilled => {
                self.state.status = SubmissionStatus::Succeeded;
                self.recompute_completion();
                tracing::info!(
                    completion = self.state.profile_completion,
                    "registration submitted"
                );
            }
            SubmissionPhase::Rejected { message } => {
                let message = message
                    .filter(|text| !text.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_SUBMISSION_ERROR.to_string());
                tracing::warn!(error = %message, "registration submission failed");
                self.state.status = SubmissionStatus::Failed;
                self.state.error = Some(message);
            }
        }
    }

    fn recompute_completion(&mut self) {
        self.state.profile_completion =
            calculate_completion(&self.state.form_data, &self.state.required_fields);
    }
}
