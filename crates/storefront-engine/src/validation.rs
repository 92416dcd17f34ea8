//! Declarative, sub-step scoped field validation.
//!
//! Each [`SubStep`] owns a list of [`FieldCheck`]s. Checks flagged as counting
//! toward completion also define the default [`RequiredFieldSet`], so the
//! completion policy cannot drift from what the screens collect.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use storefront_domain::{
    DeliveryZone, FileDescriptor, FormData, SocialLinks, StepPlan, SubStep, WizardMode,
};

use crate::completion::{RequiredField, RequiredFieldSet};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern compiles"));
static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://.+").expect("url pattern compiles"));

pub const DEFAULT_PASSWORD_MIN_LENGTH: usize = 6;
pub const DEFAULT_MAX_VIDEO_SECONDS: u32 = 60;

/// Tunable limits applied by the field checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub password_min_length: usize,
    pub max_video_seconds: u32,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            password_min_length: DEFAULT_PASSWORD_MIN_LENGTH,
            max_video_seconds: DEFAULT_MAX_VIDEO_SECONDS,
        }
    }
}

/// Inputs to validation that do not live in the form data.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext {
    pub mode: WizardMode,
    /// Upgrade-only toggle: the owner wants to set a new password.
    pub change_password: bool,
    pub policy: ValidationPolicy,
}

impl ValidationContext {
    pub fn new(mode: WizardMode) -> Self {
        Self {
            mode,
            change_password: false,
            policy: ValidationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_change_password(mut self, enabled: bool) -> Self {
        self.change_password = enabled;
        self
    }
}

/// Field-keyed validation messages for one sub-step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    messages: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.messages.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.messages.get(field).map(String::as_str)
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.messages.remove(field)
    }

    /// Drops the error for `field` and for anything nested below it.
    pub fn clear_field(&mut self, field: &str) {
        let prefix = format!("{field}.");
        self.messages
            .retain(|key, _| key != field && !key.starts_with(&prefix));
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.messages
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// What a single check asserts about its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    Email,
    /// Mandatory in register mode; in upgrade mode only when changing it.
    Password,
    FilePresent,
    NonEmptyList,
    /// Every filled platform link must be an http(s) URL.
    SocialLinks,
    RequiredWhen { flag: &'static str },
    /// File required when every listed flag is set; videos are length-capped.
    FileRequiredWhen { flags: &'static [&'static str] },
    DeliveryZones,
}

/// One declarative check on one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldCheck {
    pub field: &'static str,
    pub label: &'static str,
    pub rule: Rule,
    /// Top-level field this check contributes to the completion policy.
    pub completion_field: Option<&'static str>,
}

impl FieldCheck {
    const fn counted(field: &'static str, label: &'static str, rule: Rule) -> Self {
        Self {
            field,
            label,
            rule,
            completion_field: Some(field),
        }
    }

    const fn uncounted(field: &'static str, label: &'static str, rule: Rule) -> Self {
        Self {
            field,
            label,
            rule,
            completion_field: None,
        }
    }

    const fn counted_as(
        field: &'static str,
        label: &'static str,
        rule: Rule,
        completion_field: &'static str,
    ) -> Self {
        Self {
            field,
            label,
            rule,
            completion_field: Some(completion_field),
        }
    }

    fn apply(&self, data: &FormData, ctx: &ValidationContext, errors: &mut ValidationErrors) {
        let value = data.get(self.field);
        match self.rule {
            Rule::Required => {
                if !has_text(value) {
                    errors.insert(self.field, format!("{} is required", self.label));
                }
            }
            Rule::Email => match value.and_then(Value::as_str).map(str::trim) {
                None | Some("") => {
                    errors.insert(self.field, format!("{} is required", self.label));
                }
                Some(email) if !EMAIL_PATTERN.is_match(email) => {
                    errors.insert(self.field, "Enter a valid email address");
                }
                Some(_) => {}
            },
            Rule::Password => {
                let needed = match ctx.mode {
                    WizardMode::Register => true,
                    WizardMode::Upgrade => ctx.change_password,
                };
                if !needed {
                    return;
                }
                let password = value.and_then(Value::as_str).unwrap_or_default();
                if password.is_empty() {
                    errors.insert(self.field, format!("{} is required", self.label));
                } else if password.chars().count() < ctx.policy.password_min_length {
                    errors.insert(
                        self.field,
                        format!(
                            "{} must be at least {} characters",
                            self.label, ctx.policy.password_min_length
                        ),
                    );
                }
            }
            Rule::FilePresent => {
                if !has_file(value) {
                    errors.insert(self.field, format!("Upload a {}", self.label.to_lowercase()));
                }
            }
            Rule::NonEmptyList => {
                let filled = value
                    .and_then(Value::as_array)
                    .map_or(false, |items| !items.is_empty());
                if !filled {
                    errors.insert(
                        self.field,
                        format!("Select at least one {}", self.label.to_lowercase()),
                    );
                }
            }
            Rule::SocialLinks => {
                let links = match value.and_then(Value::as_object) {
                    Some(links) => links,
                    None => return,
                };
                for platform in SocialLinks::PLATFORMS {
                    let link = links
                        .get(platform)
                        .and_then(Value::as_str)
                        .map(str::trim)
                        .unwrap_or_default();
                    if !link.is_empty() && !URL_PATTERN.is_match(link) {
                        errors.insert(
                            format!("{}.{platform}", self.field),
                            "Link must start with http:// or https://",
                        );
                    }
                }
            }
            Rule::RequiredWhen { flag } => {
                if data.flag(flag) && !has_text(value) {
                    errors.insert(self.field, format!("{} is required", self.label));
                }
            }
            Rule::FileRequiredWhen { flags } => {
                if !flags.iter().all(|flag| data.flag(flag)) {
                    return;
                }
                match value.and_then(FileDescriptor::from_value) {
                    None if !has_file(value) => {
                        errors.insert(self.field, format!("Upload a {}", self.label.to_lowercase()));
                    }
                    Some(descriptor)
                        if descriptor.is_video()
                            && descriptor
                                .duration_secs
                                .map_or(false, |secs| secs > ctx.policy.max_video_seconds) =>
                    {
                        errors.insert(
                            self.field,
                            format!(
                                "{} must be {} seconds or shorter",
                                self.label, ctx.policy.max_video_seconds
                            ),
                        );
                    }
                    _ => {}
                }
            }
            Rule::DeliveryZones => {
                let zones = value.and_then(Value::as_array).cloned().unwrap_or_default();
                if zones.is_empty() {
                    errors.insert(self.field, "Add at least one delivery zone");
                    return;
                }
                for (index, zone) in zones.into_iter().enumerate() {
                    let outcome = serde_json::from_value::<DeliveryZone>(zone)
                        .map_err(|err| err.to_string())
                        .and_then(|zone| zone.validate().map_err(|err| err.to_string()));
                    if let Err(message) = outcome {
                        errors.insert(format!("{}.{index}", self.field), message);
                    }
                }
            }
        }
    }
}

const STORE_INFO: &[FieldCheck] = &[
    FieldCheck::counted("storeName", "Store name", Rule::Required),
    FieldCheck::counted("location", "Location", Rule::Required),
    FieldCheck::counted("email", "Email", Rule::Email),
    FieldCheck::counted("phone", "Phone number", Rule::Required),
    FieldCheck::uncounted("password", "Password", Rule::Password),
];

const IMAGES: &[FieldCheck] = &[
    FieldCheck::counted("profilePicture", "Profile picture", Rule::FilePresent),
    FieldCheck::counted("storeBanner", "Store banner", Rule::FilePresent),
];

const CATEGORIES_SOCIAL: &[FieldCheck] = &[
    FieldCheck::counted("categories", "Category", Rule::NonEmptyList),
    FieldCheck::uncounted("socialLinks", "Social links", Rule::SocialLinks),
];

const BUSINESS_INFO: &[FieldCheck] = &[
    FieldCheck::counted("businessName", "Business name", Rule::Required),
    FieldCheck::counted("businessType", "Business type", Rule::Required),
    FieldCheck::counted("ninNumber", "NIN number", Rule::Required),
    FieldCheck::counted("cacNumber", "CAC number", Rule::Required),
];

const DOCUMENTS: &[FieldCheck] = &[
    FieldCheck::counted("ninSlip", "NIN slip", Rule::FilePresent),
    FieldCheck::counted("cacCertificate", "CAC certificate", Rule::FilePresent),
];

const PHYSICAL_STORE: &str = "hasPhysicalStore";

const STORE_LOCATION: &[FieldCheck] = &[
    FieldCheck::counted_as(
        "storeAddress.state",
        "State",
        Rule::RequiredWhen {
            flag: PHYSICAL_STORE,
        },
        "storeAddress",
    ),
    FieldCheck::counted_as(
        "storeAddress.localGovernment",
        "Local government",
        Rule::RequiredWhen {
            flag: PHYSICAL_STORE,
        },
        "storeAddress",
    ),
    FieldCheck::counted_as(
        "storeAddress.fullAddress",
        "Full address",
        Rule::RequiredWhen {
            flag: PHYSICAL_STORE,
        },
        "storeAddress",
    ),
    FieldCheck::uncounted(
        "storeVideo",
        "Store video",
        Rule::FileRequiredWhen {
            flags: &[PHYSICAL_STORE, "includeStoreVideo"],
        },
    ),
    FieldCheck::counted("deliveryPricing", "Delivery pricing", Rule::DeliveryZones),
];

const BRANDING: &[FieldCheck] = &[FieldCheck::counted(
    "brandColor",
    "Brand color",
    Rule::Required,
)];

/// The checks that guard `sub_step`.
pub fn checks_for(sub_step: SubStep) -> Vec<FieldCheck> {
    match sub_step {
        SubStep::StoreInfo => STORE_INFO.to_vec(),
        SubStep::Images => IMAGES.to_vec(),
        SubStep::CategoriesSocial => CATEGORIES_SOCIAL.to_vec(),
        SubStep::BusinessInfo => BUSINESS_INFO.to_vec(),
        SubStep::Documents => DOCUMENTS.to_vec(),
        SubStep::StoreLocation => STORE_LOCATION.to_vec(),
        SubStep::Branding => BRANDING.to_vec(),
        SubStep::StorePresenceCombined => STORE_LOCATION
            .iter()
            .chain(BRANDING.iter())
            .copied()
            .collect(),
    }
}

/// Validates only the fields that belong to `sub_step`.
pub fn validate_sub_step(
    sub_step: SubStep,
    data: &FormData,
    ctx: &ValidationContext,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for check in checks_for(sub_step) {
        check.apply(data, ctx, &mut errors);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Required-field policy derived from the register-mode step schemas.
pub fn required_field_policy() -> RequiredFieldSet {
    let plan = StepPlan::for_mode(WizardMode::Register);
    let fields = plan
        .sub_steps()
        .into_iter()
        .flat_map(|(_, sub_step)| checks_for(sub_step))
        .filter_map(|check| check.completion_field)
        .map(RequiredField::new)
        .collect();
    RequiredFieldSet::new(fields)
}

fn has_text(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(text)) => !text.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(_) => true,
    }
}

fn has_file(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_object)
        .and_then(|map| map.get("name"))
        .and_then(Value::as_str)
        .map_or(false, |name| !name.is_empty())
}
