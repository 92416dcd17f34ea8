//! A single wizard session: reducer, step views, file side-table and the
//! profile gateway, wired together.
//!
//! Submission is split into [`RegistrationSession::begin_submission`] and
//! [`RegistrationSession::finish_submission`]. Tickets carry the session
//! generation; `reset`/`unmount` bump it, so a completion that arrives after
//! the session restarted is discarded instead of written into fresh state.

use std::sync::Arc;

use serde_json::Value;
use storefront_domain::{
    FieldPath, FileBlob, FileDescriptor, FileSideTable, FormData, SubStep, WizardMode,
    WizardStep, FIRST_STEP,
};

use crate::completion::RequiredFieldSet;
use crate::error::CoreError;
use crate::gateway::{GatewayError, ProfileGateway, RemoteProfile, SubmissionReceipt};
use crate::profile_sync::{HydrationReport, ProfileSync};
use crate::reducer::{
    RegistrationAction, RegistrationState, RegistrationStore, SubmissionPhase, SubmissionStatus,
};
use crate::submission::{pack_submission, SubmissionKind, SubmissionPayload};
use crate::validation::{
    required_field_policy, validate_sub_step, ValidationErrors, ValidationPolicy,
};
use crate::views::{ProceedOutcome, WizardViews};

/// Partial progress handed back by "Save and Exit".
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub form_data: FormData,
    pub current_step: WizardStep,
    pub profile_completion: u8,
}

/// Proof that a submission was started by a particular session generation.
#[derive(Debug)]
pub struct SubmissionTicket {
    generation: u64,
    kind: SubmissionKind,
    payload: SubmissionPayload,
}

impl SubmissionTicket {
    pub fn kind(&self) -> &SubmissionKind {
        &self.kind
    }

    pub fn payload(&self) -> &SubmissionPayload {
        &self.payload
    }
}

pub struct RegistrationSession {
    store: RegistrationStore,
    views: WizardViews,
    files: FileSideTable,
    gateway: Arc<dyn ProfileGateway>,
    sync: ProfileSync,
    identity: Option<String>,
    generation: u64,
    in_flight: Option<u64>,
}

impl std::fmt::Debug for RegistrationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationSession")
            .field("mode", &self.mode())
            .field("identity", &self.identity)
            .field("current_step", &self.store.current_step())
            .field("generation", &self.generation)
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

impl RegistrationSession {
    pub fn new(mode: WizardMode, gateway: Arc<dyn ProfileGateway>) -> Self {
        Self::with_options(
            mode,
            gateway,
            ValidationPolicy::default(),
            required_field_policy(),
        )
    }

    pub fn with_options(
        mode: WizardMode,
        gateway: Arc<dyn ProfileGateway>,
        policy: ValidationPolicy,
        required_fields: RequiredFieldSet,
    ) -> Self {
        Self {
            store: RegistrationStore::new(Arc::new(required_fields)),
            views: WizardViews::new(mode, policy),
            files: FileSideTable::new(),
            gateway,
            sync: ProfileSync::new(),
            identity: None,
            generation: 0,
            in_flight: None,
        }
    }

    pub fn mode(&self) -> WizardMode {
        self.views.mode()
    }

    pub fn state(&self) -> &RegistrationState {
        self.store.state()
    }

    pub fn form_data(&self) -> &FormData {
        self.store.form_data()
    }

    pub fn files(&self) -> &FileSideTable {
        &self.files
    }

    pub fn views(&self) -> &WizardViews {
        &self.views
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn current_step(&self) -> WizardStep {
        self.store.current_step()
    }

    pub fn current_sub_step(&self) -> Option<SubStep> {
        self.views.plan().sub_step(self.current_step())
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Errors held by the view that owns the current step.
    pub fn current_errors(&self) -> Option<&ValidationErrors> {
        self.views
            .active(self.current_step())
            .map(|view| view.errors())
    }

    /// Starts the session. In upgrade mode the stored profile for `identity`
    /// is fetched and replayed; fetch failures leave the defaults in place.
    pub fn mount(&mut self, identity: Option<&str>) -> Result<Option<HydrationReport>, CoreError> {
        self.identity = identity.map(str::to_string);
        if self.mode() != WizardMode::Upgrade {
            return Ok(None);
        }
        let identity = match identity {
            Some(identity) => identity,
            None => {
                tracing::warn!("upgrade session mounted without a store identity");
                return Ok(None);
            }
        };
        match self.gateway.fetch_profile(identity) {
            Ok(profile) => self.apply_remote_profile(&Arc::new(profile)),
            Err(err) => {
                tracing::warn!(identity, error = %err, "profile fetch failed; keeping defaults");
                Ok(None)
            }
        }
    }

    /// Replays a fetched profile unless this same object was already applied.
    pub fn apply_remote_profile(
        &mut self,
        profile: &Arc<RemoteProfile>,
    ) -> Result<Option<HydrationReport>, CoreError> {
        if self.mode() != WizardMode::Upgrade {
            return Ok(None);
        }
        self.sync.sync(&mut self.store, profile)
    }

    /// Tears the session down; in-flight submissions become stale.
    pub fn unmount(&mut self) {
        self.reset();
        self.identity = None;
    }

    pub fn reset(&mut self) {
        self.store.reset();
        self.files.clear();
        self.views.clear_errors();
        self.sync.forget();
        self.generation += 1;
        self.in_flight = None;
    }

    pub fn dispatch(&mut self, action: RegistrationAction) -> Result<(), CoreError> {
        if matches!(action, RegistrationAction::Reset) {
            self.reset();
            return Ok(());
        }
        self.store.dispatch(action)
    }

    pub fn update_field(&mut self, name: &str, value: Value) -> Result<(), CoreError> {
        self.store.update_field(name, value)?;
        self.views.clear_error(name);
        Ok(())
    }

    pub fn clear_field(&mut self, name: &str) -> Option<Value> {
        self.views.clear_error(name);
        if self.files.detach(name).is_some() {
            tracing::debug!(field = name, "attachment dropped with field");
        }
        self.store.clear_field(name)
    }

    /// Stores `blob` in the side-table and its descriptor in the form data.
    ///
    /// Attachments live on top-level fields only; the payload packs binaries
    /// by top-level key.
    pub fn attach_file(&mut self, field: &str, blob: FileBlob) -> Result<FileDescriptor, CoreError> {
        if FieldPath::parse(field)?.is_nested() {
            return Err(CoreError::InvalidOperation(format!(
                "attachments must target a top-level field, not `{field}`"
            )));
        }
        let descriptor = blob.descriptor.clone();
        self.store.update_field(field, descriptor.to_value())?;
        self.files.attach(field, blob);
        self.views.clear_error(field);
        Ok(descriptor)
    }

    pub fn detach_file(&mut self, field: &str) -> Option<FileBlob> {
        let blob = self.files.detach(field)?;
        self.store.clear_field(field);
        Some(blob)
    }

    pub fn set_step(&mut self, step: WizardStep) {
        self.store.set_step(step);
    }

    pub fn proceed(&mut self) -> ProceedOutcome {
        let step = self.store.current_step();
        match self.views.active_mut(step) {
            Some(view) => view.proceed(&mut self.store),
            None => ProceedOutcome::NotActive,
        }
    }

    pub fn back(&mut self) -> WizardStep {
        let step = self.store.current_step();
        match self.views.active_mut(step) {
            Some(view) => view.back(&mut self.store),
            None => {
                let previous = step.saturating_sub(1).max(FIRST_STEP);
                self.store.set_step(previous);
                previous
            }
        }
    }

    pub fn set_change_password(&mut self, enabled: bool) -> bool {
        self.views.set_change_password(enabled)
    }

    pub fn change_password(&self) -> bool {
        self.views
            .views()
            .first()
            .map_or(false, |view| view.context().change_password)
    }

    pub fn dismiss_error(&mut self) {
        self.store.dismiss_error();
    }

    /// Leaves an upgrade session early, keeping progress in memory.
    pub fn save_and_exit(&self) -> Result<SessionSnapshot, CoreError> {
        if self.mode() != WizardMode::Upgrade {
            return Err(CoreError::InvalidOperation(
                "save and exit is only available when upgrading a store".into(),
            ));
        }
        tracing::info!(step = self.current_step(), "saved and exited wizard");
        Ok(SessionSnapshot {
            form_data: self.store.form_data().clone(),
            current_step: self.store.current_step(),
            profile_completion: self.store.profile_completion(),
        })
    }

    /// Validates every sub-step in order; on the first failure the wizard
    /// jumps to that step and its view keeps the errors.
    pub fn validate_all(&mut self) -> Result<(), CoreError> {
        for (step, sub_step) in self.views.plan().sub_steps() {
            let view = match self.views.active_mut(step) {
                Some(view) => view,
                None => continue,
            };
            let context = *view.context();
            if let Err(errors) = validate_sub_step(sub_step, self.store.form_data(), &context) {
                let count = errors.len();
                tracing::debug!(step, %sub_step, count, "submission blocked by validation");
                view.replace_errors(errors);
                self.store.set_step(step);
                return Err(CoreError::Validation { step, count });
            }
        }
        Ok(())
    }

    /// Validates, packs, and marks the submission as pending.
    pub fn begin_submission(&mut self) -> Result<SubmissionTicket, CoreError> {
        if self.in_flight.is_some() || self.store.status() == SubmissionStatus::Loading {
            return Err(CoreError::SubmissionInFlight);
        }
        self.validate_all()?;

        let kind = match self.mode() {
            WizardMode::Register => SubmissionKind::Create,
            WizardMode::Upgrade => match &self.identity {
                Some(store_id) => SubmissionKind::Update {
                    store_id: store_id.clone(),
                },
                None => {
                    return Err(CoreError::InvalidOperation(
                        "cannot update a store without its identity".into(),
                    ))
                }
            },
        };

        let dangling = self.files.dangling_references(self.store.form_data());
        if !dangling.is_empty() {
            tracing::warn!(fields = ?dangling, "file references without attachments");
        }

        let payload = pack_submission(
            self.store.form_data(),
            &self.files,
            self.store.profile_completion(),
        );
        self.store
            .dispatch(RegistrationAction::Submission(SubmissionPhase::Pending))?;
        self.in_flight = Some(self.generation);
        tracing::info!(%kind, parts = payload.len(), "submission started");
        Ok(SubmissionTicket {
            generation: self.generation,
            kind,
            payload,
        })
    }

    /// Applies the gateway result for `ticket`.
    pub fn finish_submission(
        &mut self,
        ticket: SubmissionTicket,
        result: Result<SubmissionReceipt, GatewayError>,
    ) -> Result<SubmissionReceipt, CoreError> {
        if ticket.generation != self.generation {
            tracing::warn!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale submission result"
            );
            return Err(CoreError::StaleSubmission);
        }
        self.in_flight = None;
        match result {
            Ok(receipt) => {
                self.store
                    .dispatch(RegistrationAction::Submission(SubmissionPhase::Fulfilled))?;
                self.files.clear();
                self.identity = Some(receipt.store_id.clone());
                Ok(receipt)
            }
            Err(err) => {
                self.store
                    .dispatch(RegistrationAction::Submission(SubmissionPhase::Rejected {
                        message: Some(err.message.clone()),
                    }))?;
                Err(CoreError::Gateway(err))
            }
        }
    }

    /// Runs the whole submission against the session's gateway.
    pub fn submit(&mut self) -> Result<SubmissionReceipt, CoreError> {
        let ticket = self.begin_submission()?;
        let result = self.gateway.submit(&ticket.kind, &ticket.payload);
        self.finish_submission(ticket, result)
    }
}
