use std::path::Path;

use storefront_domain::WizardMode;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;
use crate::utils::persistence;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "load-profile",
            "Make a stored profile available from a JSON file",
            "load-profile <file.json>",
            cmd_load_profile,
        ),
        CommandEntry::new(
            "mount",
            "Start the session, loading the store profile in upgrade mode",
            "mount [store-id]",
            cmd_mount,
        ),
    ]
}

fn cmd_load_profile(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = args.first().ok_or_else(|| {
        CommandError::InvalidArguments("usage: load-profile <file.json>".into())
    })?;
    let profile = persistence::load_profile_from_file(Path::new(path))?;
    let store_id = profile.store_id.clone();
    let fields = profile.fields.len();
    context.gateway().insert_profile(profile);
    io::print_success(format!("Profile `{store_id}` loaded ({fields} fields)."));
    io::print_hint(format!("Run `mount {store_id}` in upgrade mode to edit it."));
    Ok(())
}

fn cmd_mount(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let identity = args.first().copied();
    let mode = context.session().mode();
    let report = context.session_mut().mount(identity)?;

    match (mode, report) {
        (WizardMode::Register, _) => {
            io::print_info("Register session started with an empty form.");
        }
        (WizardMode::Upgrade, Some(report)) => {
            io::print_success(format!(
                "Loaded profile `{}`: {} field(s), completion {}%.",
                identity.unwrap_or_default(),
                report.applied,
                context.session().state().profile_completion
            ));
            if !report.missing_required.is_empty() {
                io::print_warning(format!(
                    "Still missing: {}",
                    report.missing_required.join(", ")
                ));
            }
        }
        (WizardMode::Upgrade, None) => {
            io::print_warning("No stored profile found; starting from defaults.");
        }
    }
    Ok(())
}
