mod common;

use common::ScriptEnv;
use predicates::prelude::*;
use predicates::str::contains;

const STORE_INFO: &str = "\
set storeName \"Acme Stores\"
set location Lagos
set email owner@acme.io
set phone 08012345678
set password secret1
";

#[test]
fn register_flow_submits_a_new_store() {
    let env = ScriptEnv::new();
    let avatar = env.write_file("avatar.png", b"png");
    let banner = env.write_file("banner.jpg", b"jpg");
    let nin = env.write_file("nin.pdf", b"pdf");
    let cac = env.write_file("cac.pdf", b"pdf");

    let script = format!(
        "{STORE_INFO}proceed
attach profilePicture {avatar}
attach storeBanner {banner}
proceed
set categories '[\"Fashion\"]'
proceed
set businessName \"Acme Ltd\"
set businessType Retail
set ninNumber 12345678901
set cacNumber RC-1234
proceed
attach ninSlip {nin}
attach cacCertificate {cac}
proceed
set hasPhysicalStore false
set deliveryPricing '[{{\"state\":\"Lagos State\",\"localGovernment\":\"Ikeja\",\"deliveryFee\":500}}]'
proceed
set brandColor \"#ff6600\"
proceed
submit
status
exit
",
        avatar = avatar.display(),
        banner = banner.display(),
        nin = nin.display(),
        cac = cac.display(),
    );

    env.command()
        .write_stdin(script)
        .assert()
        .success()
        .stdout(contains("Step 2: Store images"))
        .stdout(contains("Attached avatar.png (3 bytes, image/png) to profilePicture."))
        .stdout(contains("All steps complete."))
        .stdout(contains("Store saved as `store-0001`"))
        .stdout(contains("Submission  : succeeded"));
}

#[test]
fn proceed_lists_field_errors() {
    let env = ScriptEnv::new();
    env.command()
        .write_stdin("set storeName Acme\nset email owner@acme\nproceed\nerrors\nexit\n")
        .assert()
        .success()
        .stdout(contains("field(s) need attention"))
        .stdout(contains("email: Enter a valid email address"))
        .stdout(contains("location: Location is required"));
}

#[test]
fn submit_jumps_to_the_first_incomplete_step() {
    let env = ScriptEnv::new();
    env.command()
        .write_stdin(format!("{STORE_INFO}proceed\nsubmit\nstep\nexit\n"))
        .assert()
        .success()
        .stdout(contains("Cannot submit yet: step 2 is incomplete."))
        .stdout(contains("profilePicture: Upload a profile picture"))
        .stdout(contains("Step 2 of 7."));
}

#[test]
fn upgrade_flow_hydrates_and_updates_a_stored_profile() {
    let env = ScriptEnv::new();
    let profile = env.write_file(
        "profile.json",
        br##"{
  "storeId": "store-42",
  "fields": {
    "storeName": "Acme",
    "location": "Lagos",
    "email": "owner@acme.io",
    "phone": "08012345678",
    "profilePicture": { "name": "avatar.png", "size": 3, "type": "image/png" },
    "storeBanner": { "name": "banner.jpg", "size": 3, "type": "image/jpeg" },
    "categories": ["Fashion"],
    "businessName": "Acme Ltd",
    "businessType": "Retail",
    "ninNumber": "12345678901",
    "cacNumber": "RC-1234",
    "ninSlip": { "name": "nin.pdf", "size": 3, "type": "application/pdf" },
    "cacCertificate": { "name": "cac.pdf", "size": 3, "type": "application/pdf" },
    "hasPhysicalStore": "false",
    "deliveryPricing": [{ "state": "Lagos State", "localGovernment": "Ikeja", "deliveryFee": 500 }]
  }
}"##,
    );

    let script = format!(
        "mode upgrade
load-profile {}
mount store-42
set brandColor \"#123456\"
submit
exit
",
        profile.display()
    );

    env.command()
        .write_stdin(script)
        .assert()
        .success()
        .stdout(contains("Profile `store-42` loaded (15 fields)."))
        .stdout(contains("Loaded profile `store-42`"))
        .stdout(contains("Still missing:").and(contains("brandColor")))
        .stdout(contains("Store saved as `store-42`"));
}

#[test]
fn password_toggle_is_upgrade_only() {
    let env = ScriptEnv::new();
    env.command()
        .write_stdin("toggle change-password\nmode upgrade\ntoggle change-password\nexit\n")
        .assert()
        .success()
        .stdout(contains("A password is always required when registering."))
        .stdout(contains("Password change enabled."));
}

#[test]
fn save_exit_is_rejected_in_register_mode() {
    let env = ScriptEnv::new();
    env.command()
        .write_stdin("mode upgrade\nset storeName Acme\nsave-exit\nmode register\nsave-exit\nexit\n")
        .assert()
        .success()
        .stdout(contains("Progress saved"))
        .stdout(contains("ERROR:"));
}

#[test]
fn unknown_command_suggests_the_closest_name() {
    let env = ScriptEnv::new();
    env.command()
        .write_stdin("procede\nexit\n")
        .assert()
        .success()
        .stdout(contains("Unknown command `procede`"))
        .stdout(contains("Suggestion: `proceed`?"));
}

#[test]
fn config_changes_persist_to_disk() {
    let env = ScriptEnv::new();
    env.command()
        .write_stdin("config set password_min_length 8\nconfig show\nexit\n")
        .assert()
        .success()
        .stdout(contains("password_min_length").and(contains("8")));

    let saved = std::fs::read_to_string(env.config_path()).expect("config saved");
    assert!(saved.contains("\"password_min_length\": 8"));
}
