//! Headless wizard step views.
//!
//! Each [`LevelView`] owns one row of the [`StepPlan`], validates only the
//! sub-step currently on screen, and keeps its own error map. Views never hold
//! form data; they read it from and write steps to the [`RegistrationStore`].

use storefront_domain::{
    StepPlan, StepView, SubStep, ViewSpan, WizardMode, WizardStep, FIRST_STEP,
};

use crate::reducer::RegistrationStore;
use crate::validation::{validate_sub_step, ValidationContext, ValidationErrors, ValidationPolicy};

/// What happened when the user pressed "Proceed".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProceedOutcome {
    Advanced { to: WizardStep },
    /// Local validation failed; the step did not change.
    Blocked { errors: usize },
    /// The final sub-step validated; the caller may submit.
    ReadyToSubmit,
    /// The current step belongs to another view.
    NotActive,
}

#[derive(Debug, Clone)]
pub struct LevelView {
    span: ViewSpan,
    is_final: bool,
    context: ValidationContext,
    errors: ValidationErrors,
}

impl LevelView {
    pub fn new(plan: &StepPlan, view: StepView, policy: ValidationPolicy) -> Option<Self> {
        let span = plan.span(view)?.clone();
        Some(Self {
            is_final: span.end() == plan.last_step(),
            span,
            context: ValidationContext::new(plan.mode()).with_policy(policy),
            errors: ValidationErrors::new(),
        })
    }

    pub fn view(&self) -> StepView {
        self.span.view
    }

    pub fn owns(&self, step: WizardStep) -> bool {
        self.span.steps.contains(&step)
    }

    /// Position of `step` inside this view, starting at 1.
    pub fn display_step(&self, step: WizardStep) -> Option<u8> {
        self.owns(step).then(|| step - self.span.start() + 1)
    }

    pub fn sub_step(&self, step: WizardStep) -> Option<SubStep> {
        let index = self.display_step(step)? - 1;
        self.span.sub_steps.get(usize::from(index)).copied()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn clear_error(&mut self, field: &str) {
        self.errors.clear_field(field);
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn replace_errors(&mut self, errors: ValidationErrors) {
        self.errors = errors;
    }

    pub fn context(&self) -> &ValidationContext {
        &self.context
    }

    /// Enables the upgrade-only password change toggle.
    ///
    /// Returns `false` in register mode, where the password is always required.
    pub fn set_change_password(&mut self, enabled: bool) -> bool {
        if self.context.mode != WizardMode::Upgrade {
            return false;
        }
        self.context.change_password = enabled;
        if !enabled {
            self.errors.remove("password");
        }
        true
    }

    /// Validates the visible sub-step and advances by one on success.
    pub fn proceed(&mut self, store: &mut RegistrationStore) -> ProceedOutcome {
        let step = store.current_step();
        let sub_step = match self.sub_step(step) {
            Some(sub_step) => sub_step,
            None => return ProceedOutcome::NotActive,
        };

        match validate_sub_step(sub_step, store.form_data(), &self.context) {
            Err(errors) => {
                tracing::debug!(
                    view = %self.span.view,
                    step,
                    errors = errors.len(),
                    "proceed blocked by validation"
                );
                let count = errors.len();
                self.errors = errors;
                ProceedOutcome::Blocked { errors: count }
            }
            Ok(()) => {
                self.errors.clear();
                if self.is_final && step == self.span.end() {
                    return ProceedOutcome::ReadyToSubmit;
                }
                let next = step + 1;
                store.set_step(next);
                ProceedOutcome::Advanced { to: next }
            }
        }
    }

    /// Steps back by one without validating. No-op on the first step.
    pub fn back(&mut self, store: &mut RegistrationStore) -> WizardStep {
        let step = store.current_step();
        if step > FIRST_STEP {
            store.set_step(step - 1);
        }
        store.current_step()
    }
}

/// The three step views for one wizard mode.
#[derive(Debug, Clone)]
pub struct WizardViews {
    plan: StepPlan,
    views: Vec<LevelView>,
}

impl WizardViews {
    pub fn new(mode: WizardMode, policy: ValidationPolicy) -> Self {
        let plan = StepPlan::for_mode(mode);
        let views = StepView::ALL
            .iter()
            .filter_map(|view| LevelView::new(&plan, *view, policy))
            .collect();
        Self { plan, views }
    }

    pub fn plan(&self) -> &StepPlan {
        &self.plan
    }

    pub fn mode(&self) -> WizardMode {
        self.plan.mode()
    }

    pub fn views(&self) -> &[LevelView] {
        &self.views
    }

    pub fn active(&self, step: WizardStep) -> Option<&LevelView> {
        self.views.iter().find(|view| view.owns(step))
    }

    pub fn active_mut(&mut self, step: WizardStep) -> Option<&mut LevelView> {
        self.views.iter_mut().find(|view| view.owns(step))
    }

    pub fn view_mut(&mut self, view: StepView) -> Option<&mut LevelView> {
        self.views.iter_mut().find(|level| level.view() == view)
    }

    pub fn set_change_password(&mut self, enabled: bool) -> bool {
        let mut applied = false;
        for view in &mut self.views {
            applied |= view.set_change_password(enabled);
        }
        applied
    }

    pub fn clear_error(&mut self, field: &str) {
        for view in &mut self.views {
            view.clear_error(field);
        }
    }

    pub fn clear_errors(&mut self) {
        for view in &mut self.views {
            view.clear_errors();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filled_store_info(store: &mut RegistrationStore) {
        store.update_field("storeName", json!("Acme")).unwrap();
        store.update_field("location", json!("Lagos")).unwrap();
        store.update_field("email", json!("owner@acme.io")).unwrap();
        store.update_field("phone", json!("0801")).unwrap();
    }

    #[test]
    fn proceed_blocks_without_touching_step() {
        let mut store = RegistrationStore::default();
        let mut views = WizardViews::new(WizardMode::Register, ValidationPolicy::default());
        let view = views.active_mut(1).unwrap();

        let outcome = view.proceed(&mut store);
        assert_eq!(outcome, ProceedOutcome::Blocked { errors: 5 });
        assert_eq!(store.current_step(), 1);
        assert!(view.errors().get("storeName").is_some());
    }

    #[test]
    fn proceed_advances_exactly_one_step() {
        let mut store = RegistrationStore::default();
        filled_store_info(&mut store);
        store.update_field("password", json!("secret1")).unwrap();
        let mut views = WizardViews::new(WizardMode::Register, ValidationPolicy::default());

        let outcome = views.active_mut(1).unwrap().proceed(&mut store);
        assert_eq!(outcome, ProceedOutcome::Advanced { to: 2 });
        assert_eq!(store.current_step(), 2);
    }

    #[test]
    fn level_two_maps_global_steps_to_display_steps() {
        let views = WizardViews::new(WizardMode::Register, ValidationPolicy::default());
        let level_two = views.active(4).unwrap();

        assert_eq!(level_two.view(), StepView::BusinessVerification);
        assert_eq!(level_two.display_step(4), Some(1));
        assert_eq!(level_two.display_step(5), Some(2));
        assert_eq!(level_two.display_step(6), None);
        assert_eq!(level_two.sub_step(5), Some(SubStep::Documents));
    }

    #[test]
    fn inactive_view_does_not_proceed() {
        let mut store = RegistrationStore::default();
        let mut views = WizardViews::new(WizardMode::Register, ValidationPolicy::default());
        let level_three = views.view_mut(StepView::StorePresence).unwrap();
        assert_eq!(level_three.proceed(&mut store), ProceedOutcome::NotActive);
    }

    #[test]
    fn back_is_unvalidated_and_keeps_data() {
        let mut store = RegistrationStore::default();
        store.update_field("businessName", json!("Acme Ltd")).unwrap();
        store.set_step(4);
        let mut views = WizardViews::new(WizardMode::Register, ValidationPolicy::default());

        let step = views.active_mut(4).unwrap().back(&mut store);
        assert_eq!(step, 3);
        assert_eq!(store.form_data().str_value("businessName"), Some("Acme Ltd"));
    }

    #[test]
    fn back_on_first_step_stays_put() {
        let mut store = RegistrationStore::default();
        let mut views = WizardViews::new(WizardMode::Register, ValidationPolicy::default());
        assert_eq!(views.active_mut(1).unwrap().back(&mut store), 1);
    }

    #[test]
    fn final_step_reports_ready_to_submit() {
        let mut store = RegistrationStore::default();
        store.update_field("brandColor", json!("#ff6600")).unwrap();
        store.set_step(7);
        let mut views = WizardViews::new(WizardMode::Register, ValidationPolicy::default());

        let outcome = views.active_mut(7).unwrap().proceed(&mut store);
        assert_eq!(outcome, ProceedOutcome::ReadyToSubmit);
        assert_eq!(store.current_step(), 7);
    }

    #[test]
    fn change_password_toggle_is_upgrade_only() {
        let mut register = WizardViews::new(WizardMode::Register, ValidationPolicy::default());
        assert!(!register.set_change_password(true));

        let mut upgrade = WizardViews::new(WizardMode::Upgrade, ValidationPolicy::default());
        assert!(upgrade.set_change_password(true));

        let mut store = RegistrationStore::default();
        filled_store_info(&mut store);
        store.update_field("password", json!("short")).unwrap();
        let outcome = upgrade.active_mut(1).unwrap().proceed(&mut store);
        assert_eq!(outcome, ProceedOutcome::Blocked { errors: 1 });

        upgrade.set_change_password(false);
        let outcome = upgrade.active_mut(1).unwrap().proceed(&mut store);
        assert_eq!(outcome, ProceedOutcome::Advanced { to: 2 });
    }
}
