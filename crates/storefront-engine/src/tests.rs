use std::sync::Arc;

use serde_json::{json, Value};
use storefront_domain::{DeliveryZone, FileBlob, FileDescriptor, FormData, WizardMode};

use crate::{
    calculate_completion, error::CoreError, GatewayError, InMemoryProfileGateway, PayloadPart,
    ProceedOutcome, ProfileGateway, RegistrationSession, RegistrationStore, RemoteProfile,
    RequiredFieldSet, SubmissionKind, SubmissionReceipt, SubmissionStatus, COMPLETION_FIELD,
    GENERIC_SUBMISSION_ERROR,
};

fn required(names: &[&str]) -> RequiredFieldSet {
    RequiredFieldSet::from_names(names.iter().copied())
}

fn data(value: Value) -> FormData {
    FormData::from_map(value.as_object().cloned().unwrap_or_default())
}

fn register_session() -> (Arc<InMemoryProfileGateway>, RegistrationSession) {
    let gateway = InMemoryProfileGateway::shared();
    let session = RegistrationSession::new(WizardMode::Register, gateway.clone());
    (gateway, session)
}

fn fill_everything(session: &mut RegistrationSession) {
    for (field, value) in [
        ("storeName", json!("Acme")),
        ("location", json!("Lagos")),
        ("email", json!("owner@acme.io")),
        ("phone", json!("08012345678")),
        ("password", json!("secret1")),
        ("categories", json!(["Fashion"])),
        ("businessName", json!("Acme Ltd")),
        ("businessType", json!("Retail")),
        ("ninNumber", json!("12345678901")),
        ("cacNumber", json!("RC-1234")),
        ("hasPhysicalStore", json!(false)),
        (
            "deliveryPricing",
            json!([DeliveryZone::priced("Lagos State", "Ikeja", 500.0).to_value()]),
        ),
        ("brandColor", json!("#ff6600")),
    ] {
        session.update_field(field, value).expect("update field");
    }
    for (field, name, mime) in [
        ("profilePicture", "avatar.png", "image/png"),
        ("storeBanner", "banner.jpg", "image/jpeg"),
        ("ninSlip", "nin.pdf", "application/pdf"),
        ("cacCertificate", "cac.pdf", "application/pdf"),
    ] {
        session
            .attach_file(field, FileBlob::new(name, mime, vec![1, 2, 3]))
            .expect("attach file");
    }
}

#[test]
fn scenario_a_blank_email_counts_as_missing() {
    let form = data(json!({ "email": "", "storeName": "Acme" }));
    assert_eq!(calculate_completion(&form, &required(&["email", "storeName"])), 50);
}

#[test]
fn scenario_b_delivery_pricing_needs_an_entry() {
    let set = required(&["deliveryPricing"]);
    let mut form = data(json!({ "deliveryPricing": [] }));
    assert_eq!(calculate_completion(&form, &set), 0);

    form.set(
        "deliveryPricing",
        json!([{
            "state": "Lagos State",
            "localGovernment": "Ikeja",
            "deliveryFee": 500,
            "markForFreeDelivery": false
        }]),
    )
    .unwrap();
    assert_eq!(calculate_completion(&form, &set), 100);
}

#[test]
fn scenario_c_partial_address_is_incomplete() {
    let form = data(json!({
        "storeAddress": { "state": "Lagos State", "localGovernment": "", "fullAddress": "12 Road" }
    }));
    assert_eq!(calculate_completion(&form, &required(&["storeAddress"])), 0);
}

#[test]
fn scenario_d_register_without_password_never_reaches_gateway() {
    let (gateway, mut session) = register_session();
    fill_everything(&mut session);
    session.clear_field("password");
    session.set_step(7);

    let err = session.submit().unwrap_err();
    assert!(matches!(err, CoreError::Validation { step: 1, count: 1 }));
    assert_eq!(session.current_step(), 1);
    assert_eq!(
        session.current_errors().and_then(|errors| errors.get("password")),
        Some("Password is required")
    );
    assert!(gateway.submissions().is_empty());
    assert_eq!(session.state().status, SubmissionStatus::Idle);
}

#[test]
fn completion_never_drops_when_a_missing_field_is_filled() {
    let set = required(&["storeName", "email", "categories", "storeAddress"]);
    let mut form = FormData::new();
    let mut previous = calculate_completion(&form, &set);

    for (field, value) in [
        ("categories", json!(["Food"])),
        ("email", json!("a@b.co")),
        ("storeAddress.state", json!("Lagos State")),
        ("storeAddress.localGovernment", json!("Ikeja")),
        ("storeAddress.fullAddress", json!("1 Road")),
        ("storeName", json!("Acme")),
    ] {
        form.set(field, value).unwrap();
        let next = calculate_completion(&form, &set);
        assert!(next >= previous, "{field}: {next} < {previous}");
        previous = next;
    }
    assert_eq!(previous, 100);
}

#[test]
fn completion_stays_within_bounds() {
    assert_eq!(calculate_completion(&FormData::new(), &RequiredFieldSet::default()), 100);
    assert_eq!(calculate_completion(&FormData::new(), &required(&["a", "b", "c"])), 0);

    let form = data(json!({ "a": "x", "b": 0, "c": false, "d": "ignored" }));
    let score = calculate_completion(&form, &required(&["a", "b", "c", "e", "f", "g"]));
    assert!(score <= 100);
    assert_eq!(score, 50);
}

#[test]
fn completion_is_stable_across_calls() {
    let form = data(json!({ "storeName": "Acme", "phone": "" }));
    let set = required(&["storeName", "phone", "email"]);
    assert_eq!(calculate_completion(&form, &set), calculate_completion(&form, &set));
}

#[test]
fn reset_never_aliases_captured_form_data() {
    let mut store = RegistrationStore::default();
    store.update_field("storeName", json!("Before")).unwrap();
    let captured = store.form_data().clone();

    store.reset();
    store.update_field("storeName", json!("After")).unwrap();
    store.update_field("email", json!("new@acme.io")).unwrap();

    assert_eq!(captured.str_value("storeName"), Some("Before"));
    assert!(!captured.contains("email"));
}

#[test]
fn dotted_write_leaves_sibling_defaults() {
    let mut store = RegistrationStore::default();
    store.update_field("storeAddress.state", json!("Lagos")).unwrap();

    assert_eq!(store.form_data().str_value("storeAddress.state"), Some("Lagos"));
    assert_eq!(store.form_data().get("storeAddress.localGovernment"), None);
}

#[test]
fn stepping_forward_and_back_keeps_form_data() {
    let mut store = RegistrationStore::default();
    store.update_field("storeName", json!("Acme")).unwrap();
    store.set_step(3);
    let before = store.form_data().clone();

    store.set_step(4);
    store.set_step(3);
    assert_eq!(store.current_step(), 3);
    assert_eq!(store.form_data(), &before);
}

#[test]
fn register_walkthrough_submits_once_and_clears_attachments() {
    let (gateway, mut session) = register_session();
    fill_everything(&mut session);

    for expected in 2..=7 {
        assert_eq!(session.proceed(), ProceedOutcome::Advanced { to: expected });
    }
    assert_eq!(session.proceed(), ProceedOutcome::ReadyToSubmit);

    let receipt = session.submit().expect("submit");
    assert_eq!(receipt.store_id, "store-0001");
    assert_eq!(session.identity(), Some("store-0001"));
    assert_eq!(session.state().status, SubmissionStatus::Succeeded);
    assert!(session.files().is_empty());

    let submissions = gateway.submissions();
    assert_eq!(submissions.len(), 1);
    let (kind, payload) = &submissions[0];
    assert_eq!(kind, &SubmissionKind::Create);
    assert!(matches!(payload.get("storeBanner"), Some(PayloadPart::Binary(_))));
    // online-only store: storeAddress stays unfilled
    assert_eq!(
        payload.get(COMPLETION_FIELD),
        Some(&PayloadPart::Scalar("94".into()))
    );
}

#[test]
fn upgrade_mount_hydrates_and_updates_in_place() {
    let gateway = InMemoryProfileGateway::shared();
    let avatar = FileDescriptor::new("avatar.png", 2048, "image/png").to_value();
    gateway.insert_profile(RemoteProfile::new(
        "store-7",
        json!({
            "storeName": "Acme",
            "location": "Lagos",
            "email": "owner@acme.io",
            "phone": "0801",
            "hasPhysicalStore": "false",
            "profilePicture": avatar,
            "completionPercentage": 40
        })
        .as_object()
        .cloned()
        .unwrap(),
    ));

    let mut session = RegistrationSession::new(WizardMode::Upgrade, gateway.clone());
    let report = session.mount(Some("store-7")).unwrap().expect("hydrated");

    assert_eq!(report.coerced, vec!["hasPhysicalStore".to_string()]);
    assert_eq!(session.form_data().get("hasPhysicalStore"), Some(&json!(false)));
    assert_eq!(session.state().profile_completion, 40);
    assert_eq!(session.proceed(), ProceedOutcome::Advanced { to: 2 });

    let snapshot = session.save_and_exit().unwrap();
    assert_eq!(snapshot.current_step, 2);
    assert_eq!(snapshot.form_data.str_value("storeName"), Some("Acme"));
}

#[test]
fn upgrade_with_unknown_identity_keeps_defaults() {
    let gateway = InMemoryProfileGateway::shared();
    let mut session = RegistrationSession::new(WizardMode::Upgrade, gateway);
    assert!(session.mount(Some("missing")).unwrap().is_none());
    assert!(session.form_data().is_empty());
    assert_eq!(session.identity(), Some("missing"));
}

#[test]
fn upgrade_submission_targets_the_mounted_store() {
    let gateway = InMemoryProfileGateway::shared();
    gateway.insert_profile(RemoteProfile::new("store-9", Default::default()));
    let mut session = RegistrationSession::new(WizardMode::Upgrade, gateway.clone());
    session.mount(Some("store-9")).unwrap();
    fill_everything(&mut session);
    session.clear_field("password");

    session.submit().expect("update");
    let (kind, _) = &gateway.submissions()[0];
    assert_eq!(
        kind,
        &SubmissionKind::Update {
            store_id: "store-9".into()
        }
    );
}

#[test]
fn save_and_exit_is_rejected_in_register_mode() {
    let (_, session) = register_session();
    assert!(matches!(
        session.save_and_exit(),
        Err(CoreError::InvalidOperation(_))
    ));
}

#[test]
fn second_submission_is_refused_while_first_is_pending() {
    let (gateway, mut session) = register_session();
    fill_everything(&mut session);

    let ticket = session.begin_submission().expect("begin");
    assert!(session.is_submitting());
    assert_eq!(session.state().status, SubmissionStatus::Loading);
    assert!(matches!(
        session.begin_submission(),
        Err(CoreError::SubmissionInFlight)
    ));

    let result = gateway.submit(ticket.kind(), ticket.payload());
    session.finish_submission(ticket, result).expect("finish");
    assert!(!session.is_submitting());
    assert_eq!(gateway.submissions().len(), 1);
}

#[test]
fn result_arriving_after_reset_is_discarded() {
    let (_, mut session) = register_session();
    fill_everything(&mut session);
    let ticket = session.begin_submission().expect("begin");

    session.reset();
    let late = Ok(SubmissionReceipt {
        store_id: "store-late".into(),
        profile: None,
    });
    assert!(matches!(
        session.finish_submission(ticket, late),
        Err(CoreError::StaleSubmission)
    ));
    assert_eq!(session.state().status, SubmissionStatus::Idle);
    assert_eq!(session.identity(), None);
    assert!(session.form_data().is_empty());
}

#[test]
fn rejected_submission_keeps_data_until_dismissed() {
    let (gateway, mut session) = register_session();
    fill_everything(&mut session);
    gateway.fail_next_submit("Store name already taken");

    let err = session.submit().unwrap_err();
    assert!(matches!(err, CoreError::Gateway(GatewayError { .. })));
    assert_eq!(session.state().status, SubmissionStatus::Failed);
    assert_eq!(session.state().error.as_deref(), Some("Store name already taken"));
    assert_eq!(session.form_data().str_value("storeName"), Some("Acme"));
    assert_eq!(session.files().len(), 4);

    session.dismiss_error();
    assert_eq!(session.state().status, SubmissionStatus::Idle);
    assert!(session.state().error.is_none());

    session.submit().expect("retry succeeds");
    assert_eq!(session.state().status, SubmissionStatus::Succeeded);
}

#[test]
fn rejection_without_message_uses_generic_text() {
    let (_, mut session) = register_session();
    fill_everything(&mut session);
    let ticket = session.begin_submission().expect("begin");

    let _ = session.finish_submission(ticket, Err(GatewayError::new("")));
    assert_eq!(session.state().error.as_deref(), Some(GENERIC_SUBMISSION_ERROR));
}

#[test]
fn updating_a_field_clears_its_view_error() {
    let (_, mut session) = register_session();
    assert!(matches!(session.proceed(), ProceedOutcome::Blocked { .. }));
    assert!(session
        .current_errors()
        .and_then(|errors| errors.get("storeName"))
        .is_some());

    session.update_field("storeName", json!("Acme")).unwrap();
    assert!(session
        .current_errors()
        .and_then(|errors| errors.get("storeName"))
        .is_none());
}

#[test]
fn shared_required_set_survives_session_reset() {
    let gateway = InMemoryProfileGateway::shared();
    let mut session = RegistrationSession::with_options(
        WizardMode::Register,
        gateway,
        Default::default(),
        required(&["storeName"]),
    );
    session.update_field("storeName", json!("Acme")).unwrap();
    assert_eq!(session.state().profile_completion, 100);

    session.reset();
    session.update_field("storeName", json!("Acme")).unwrap();
    assert_eq!(session.state().profile_completion, 100);
    assert_eq!(session.state().required_fields.len(), 1);
}

#[test]
fn duplicate_categories_are_collapsed_before_submission() {
    let (gateway, mut session) = register_session();
    fill_everything(&mut session);
    session
        .update_field("categories", json!(["Fashion", "Fashion", " Beauty"]))
        .unwrap();
    assert_eq!(
        session.form_data().get("categories"),
        Some(&json!(["Fashion", "Beauty"]))
    );

    session.submit().expect("submit");
    let (_, payload) = &gateway.submissions()[0];
    assert_eq!(
        payload.get("categories"),
        Some(&PayloadPart::Json("[\"Fashion\",\"Beauty\"]".into()))
    );
}

#[test]
fn hydration_skips_malformed_keys_and_keeps_going() {
    let gateway = InMemoryProfileGateway::shared();
    gateway.insert_profile(RemoteProfile::new(
        "store-3",
        json!({ "storeName": "Acme", "": "x", "zzz": "later" })
            .as_object()
            .cloned()
            .unwrap(),
    ));
    let mut session = RegistrationSession::new(WizardMode::Upgrade, gateway);

    let report = session.mount(Some("store-3")).unwrap().expect("hydrated");
    assert_eq!(report.skipped, vec![String::new()]);
    assert_eq!(session.form_data().str_value("storeName"), Some("Acme"));
    assert_eq!(session.form_data().str_value("zzz"), Some("later"));
}

#[test]
fn attachments_on_nested_paths_are_rejected() {
    let (_, mut session) = register_session();
    let blob = FileBlob::new("tour.mp4", "video/mp4", vec![1, 2, 3]);

    assert!(matches!(
        session.attach_file("storeAddress.video", blob),
        Err(CoreError::InvalidOperation(_))
    ));
    assert!(session.files().is_empty());
    assert!(!session.form_data().contains("storeAddress"));
}
