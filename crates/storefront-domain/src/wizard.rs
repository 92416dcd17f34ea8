//! Wizard modes, step views, and the table mapping views to global steps.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Global, 1-based step counter shared by every step view.
pub type WizardStep = u8;

pub const FIRST_STEP: WizardStep = 1;

/// Whether the wizard is creating a new store or editing an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardMode {
    #[default]
    Register,
    Upgrade,
}

impl WizardMode {
    pub fn as_str(self) -> &'static str {
        match self {
            WizardMode::Register => "register",
            WizardMode::Upgrade => "upgrade",
        }
    }
}

impl fmt::Display for WizardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WizardMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "register" => Ok(WizardMode::Register),
            "upgrade" => Ok(WizardMode::Upgrade),
            other => Err(format!("unknown wizard mode `{other}` (use register|upgrade)")),
        }
    }
}

/// The three screens that split the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepView {
    /// Store info, images, categories and socials.
    StoreSetup,
    /// Business details and verification documents.
    BusinessVerification,
    /// Location, delivery pricing and branding.
    StorePresence,
}

impl StepView {
    pub const ALL: [StepView; 3] = [
        StepView::StoreSetup,
        StepView::BusinessVerification,
        StepView::StorePresence,
    ];

    pub fn title(self) -> &'static str {
        match self {
            StepView::StoreSetup => "Store Setup",
            StepView::BusinessVerification => "Business Verification",
            StepView::StorePresence => "Store Presence",
        }
    }
}

impl fmt::Display for StepView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A single validated screen inside a step view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubStep {
    StoreInfo,
    Images,
    CategoriesSocial,
    BusinessInfo,
    Documents,
    StoreLocation,
    Branding,
    /// Upgrade mode shows location and branding on one screen.
    StorePresenceCombined,
}

impl SubStep {
    pub fn title(self) -> &'static str {
        match self {
            SubStep::StoreInfo => "Store information",
            SubStep::Images => "Store images",
            SubStep::CategoriesSocial => "Categories & social links",
            SubStep::BusinessInfo => "Business information",
            SubStep::Documents => "Verification documents",
            SubStep::StoreLocation => "Location & delivery",
            SubStep::Branding => "Branding",
            SubStep::StorePresenceCombined => "Location, delivery & branding",
        }
    }
}

impl fmt::Display for SubStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One row of the [`StepPlan`] table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSpan {
    pub view: StepView,
    pub steps: RangeInclusive<WizardStep>,
    pub sub_steps: Vec<SubStep>,
}

impl ViewSpan {
    fn new(view: StepView, start: WizardStep, sub_steps: Vec<SubStep>) -> Self {
        let end = start + sub_steps.len() as WizardStep - 1;
        Self {
            view,
            steps: start..=end,
            sub_steps,
        }
    }

    pub fn start(&self) -> WizardStep {
        *self.steps.start()
    }

    pub fn end(&self) -> WizardStep {
        *self.steps.end()
    }
}

/// Explicit mapping from each step view to its global step range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPlan {
    mode: WizardMode,
    spans: Vec<ViewSpan>,
}

impl StepPlan {
    pub fn for_mode(mode: WizardMode) -> Self {
        let presence = match mode {
            WizardMode::Register => vec![SubStep::StoreLocation, SubStep::Branding],
            WizardMode::Upgrade => vec![SubStep::StorePresenceCombined],
        };
        let spans = vec![
            ViewSpan::new(
                StepView::StoreSetup,
                1,
                vec![
                    SubStep::StoreInfo,
                    SubStep::Images,
                    SubStep::CategoriesSocial,
                ],
            ),
            ViewSpan::new(
                StepView::BusinessVerification,
                4,
                vec![SubStep::BusinessInfo, SubStep::Documents],
            ),
            ViewSpan::new(StepView::StorePresence, 6, presence),
        ];
        Self { mode, spans }
    }

    pub fn mode(&self) -> WizardMode {
        self.mode
    }

    pub fn spans(&self) -> &[ViewSpan] {
        &self.spans
    }

    pub fn span(&self, view: StepView) -> Option<&ViewSpan> {
        self.spans.iter().find(|span| span.view == view)
    }

    pub fn total_steps(&self) -> WizardStep {
        self.spans.last().map_or(FIRST_STEP, ViewSpan::end)
    }

    pub fn last_step(&self) -> WizardStep {
        self.total_steps()
    }

    /// The view that owns `step`, if it is inside the plan.
    pub fn view_for(&self, step: WizardStep) -> Option<StepView> {
        self.span_for(step).map(|span| span.view)
    }

    /// 1-based position of `step` inside its owning view.
    pub fn display_step(&self, step: WizardStep) -> Option<u8> {
        self.span_for(step).map(|span| step - span.start() + 1)
    }

    pub fn sub_step(&self, step: WizardStep) -> Option<SubStep> {
        let span = self.span_for(step)?;
        span.sub_steps.get(usize::from(step - span.start())).copied()
    }

    /// Every sub-step paired with its global step, in order.
    pub fn sub_steps(&self) -> Vec<(WizardStep, SubStep)> {
        self.spans
            .iter()
            .flat_map(|span| span.steps.clone().zip(span.sub_steps.iter().copied()))
            .collect()
    }

    fn span_for(&self, step: WizardStep) -> Option<&ViewSpan> {
        self.spans.iter().find(|span| span.steps.contains(&step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_plan_spans_seven_steps() {
        let plan = StepPlan::for_mode(WizardMode::Register);
        assert_eq!(plan.total_steps(), 7);
        assert_eq!(plan.view_for(1), Some(StepView::StoreSetup));
        assert_eq!(plan.view_for(5), Some(StepView::BusinessVerification));
        assert_eq!(plan.view_for(7), Some(StepView::StorePresence));
        assert_eq!(plan.view_for(8), None);
        assert_eq!(plan.view_for(0), None);
    }

    #[test]
    fn display_step_is_offset_from_view_start() {
        let plan = StepPlan::for_mode(WizardMode::Register);
        assert_eq!(plan.display_step(4), Some(1));
        assert_eq!(plan.display_step(5), Some(2));
        assert_eq!(plan.display_step(6), Some(1));
        assert_eq!(plan.display_step(7), Some(2));
        assert_eq!(plan.display_step(3), Some(3));
    }

    #[test]
    fn upgrade_plan_collapses_store_presence() {
        let plan = StepPlan::for_mode(WizardMode::Upgrade);
        assert_eq!(plan.total_steps(), 6);
        assert_eq!(plan.sub_step(6), Some(SubStep::StorePresenceCombined));
        assert_eq!(plan.sub_step(7), None);
    }

    #[test]
    fn sub_steps_are_listed_in_order() {
        let plan = StepPlan::for_mode(WizardMode::Register);
        let steps: Vec<_> = plan.sub_steps().into_iter().map(|(step, _)| step).collect();
        assert_eq!(steps, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(plan.sub_step(2), Some(SubStep::Images));
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Upgrade".parse::<WizardMode>(), Ok(WizardMode::Upgrade));
        assert!("publish".parse::<WizardMode>().is_err());
    }
}
