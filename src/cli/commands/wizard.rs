use std::path::Path;

use serde_json::Value;
use storefront_domain::WizardMode;
use storefront_engine::ProceedOutcome;

use crate::cli::core::{print_validation_errors, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::utils::persistence;

const CHANGE_PASSWORD: &str = "change-password";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "mode",
            "Show or switch the wizard mode (restarts the session)",
            "mode [register|upgrade]",
            cmd_mode,
        ),
        CommandEntry::new(
            "set",
            "Set a field; JSON arrays, objects, quoted strings and true/false/null are parsed",
            "set <field[.nested]> <value>",
            cmd_set,
        ),
        CommandEntry::new("unset", "Remove a field", "unset <field>", cmd_unset),
        CommandEntry::new(
            "attach",
            "Attach a local file to a file field",
            "attach <field> <path> [duration-seconds]",
            cmd_attach,
        ),
        CommandEntry::new(
            "detach",
            "Remove a file attachment",
            "detach <field>",
            cmd_detach,
        ),
        CommandEntry::new(
            "toggle",
            "Flip a boolean field, or the upgrade-only password change",
            "toggle <field|change-password>",
            cmd_toggle,
        ),
        CommandEntry::new(
            "proceed",
            "Validate the current step and move forward",
            "proceed",
            cmd_proceed,
        ),
        CommandEntry::new("back", "Go back one step", "back", cmd_back),
        CommandEntry::new(
            "step",
            "Show the current step or jump to one without validation",
            "step [number]",
            cmd_step,
        ),
        CommandEntry::new(
            "status",
            "Show wizard progress and submission state",
            "status",
            cmd_status,
        ),
        CommandEntry::new(
            "errors",
            "List validation errors on the current step",
            "errors",
            cmd_errors,
        ),
        CommandEntry::new(
            "show",
            "Print the form data, or one field",
            "show [field]",
            cmd_show,
        ),
        CommandEntry::new(
            "submit",
            "Validate every step and save the store",
            "submit",
            cmd_submit,
        ),
        CommandEntry::new(
            "save-exit",
            "Keep progress and leave the wizard (upgrade only)",
            "save-exit",
            cmd_save_exit,
        ),
        CommandEntry::new(
            "dismiss",
            "Clear the last submission error",
            "dismiss",
            cmd_dismiss,
        ),
        CommandEntry::new(
            "reset",
            "Discard all progress and start over",
            "reset",
            cmd_reset,
        ),
    ]
}

/// Structured input is parsed as JSON; everything else stays text so values
/// like phone numbers keep their leading zeros.
fn parse_field_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    let structured = trimmed.starts_with(|c| matches!(c, '[' | '{' | '"'))
        || matches!(trimmed, "true" | "false" | "null");
    if structured {
        if let Ok(value) = serde_json::from_str(trimmed) {
            return value;
        }
    }
    Value::String(raw.to_string())
}

fn usage(text: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {text}"))
}

fn cmd_mode(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(raw) = args.first() else {
        io::print_info(format!("Current mode: {}", context.session().mode()));
        return Ok(());
    };
    let mode: WizardMode = raw.parse().map_err(CommandError::InvalidArguments)?;
    context.switch_mode(mode);
    io::print_success(format!(
        "Started a new {} session ({} steps).",
        mode,
        context.session().views().plan().total_steps()
    ));
    Ok(())
}

fn cmd_set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 2 {
        return Err(usage("set <field[.nested]> <value>"));
    }
    let field = args[0];
    let value = parse_field_value(&args[1..].join(" "));
    context.session_mut().update_field(field, value)?;
    io::print_success(format!(
        "Updated {field} (completion {}%).",
        context.session().state().profile_completion
    ));
    Ok(())
}

fn cmd_unset(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let field = args.first().ok_or_else(|| usage("unset <field>"))?;
    match context.session_mut().clear_field(field) {
        Some(_) => io::print_success(format!("Removed {field}.")),
        None => io::print_warning(format!("{field} was not set.")),
    }
    Ok(())
}

fn cmd_attach(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (field, path) = match args {
        [field, path, ..] => (*field, *path),
        _ => return Err(usage("attach <field> <path> [duration-seconds]")),
    };
    let duration = match args.get(2) {
        Some(raw) => Some(raw.parse::<u32>().map_err(|_| {
            CommandError::InvalidArguments(format!("`{raw}` is not a duration in seconds"))
        })?),
        None => None,
    };
    let blob = persistence::load_attachment(Path::new(path), duration)?;
    let descriptor = context.session_mut().attach_file(field, blob)?;
    io::print_success(format!(
        "Attached {} ({} bytes, {}) to {field}.",
        descriptor.name, descriptor.size, descriptor.mime_type
    ));
    Ok(())
}

fn cmd_detach(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let field = args.first().ok_or_else(|| usage("detach <field>"))?;
    match context.session_mut().detach_file(field) {
        Some(blob) => io::print_success(format!("Detached {} from {field}.", blob.descriptor.name)),
        None => io::print_warning(format!("No attachment on {field}.")),
    }
    Ok(())
}

fn cmd_toggle(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let target = args
        .first()
        .ok_or_else(|| usage("toggle <field|change-password>"))?;

    if target.eq_ignore_ascii_case(CHANGE_PASSWORD) {
        let enabled = !context.session().change_password();
        if context.session_mut().set_change_password(enabled) {
            io::print_success(format!(
                "Password change {}.",
                if enabled { "enabled" } else { "disabled" }
            ));
        } else {
            io::print_warning("A password is always required when registering.");
        }
        return Ok(());
    }

    let next = !context.session().form_data().flag(target);
    context.session_mut().update_field(target, Value::Bool(next))?;
    io::print_success(format!("{target} = {next}"));
    Ok(())
}

fn cmd_proceed(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    match context.session_mut().proceed() {
        ProceedOutcome::Advanced { to } => {
            let title = context
                .session()
                .current_sub_step()
                .map(|sub_step| sub_step.title())
                .unwrap_or_default();
            io::print_success(format!("Step {to}: {title}"));
        }
        ProceedOutcome::Blocked { errors } => {
            io::print_warning(format!("{errors} field(s) need attention:"));
            if let Some(errors) = context.session().current_errors() {
                print_validation_errors(errors);
            }
        }
        ProceedOutcome::ReadyToSubmit => {
            io::print_success("All steps complete. Run `submit` to save your store.");
        }
        ProceedOutcome::NotActive => {
            io::print_warning("The current step is outside the wizard; use `step 1`.");
        }
    }
    Ok(())
}

fn cmd_back(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let step = context.session_mut().back();
    io::print_info(format!("Now on step {step}."));
    Ok(())
}

fn cmd_step(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let total = context.session().views().plan().total_steps();
    let Some(raw) = args.first() else {
        io::print_info(format!("Step {} of {total}.", context.session().current_step()));
        return Ok(());
    };
    let step = raw
        .parse::<u8>()
        .ok()
        .filter(|step| (1..=total).contains(step))
        .ok_or_else(|| CommandError::InvalidArguments(format!("step must be 1-{total}")))?;
    context.session_mut().set_step(step);
    io::print_info(format!("Now on step {step}."));
    Ok(())
}

fn cmd_status(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let session = context.session();
    let plan = session.views().plan();
    let step = session.current_step();
    let state = session.state();

    output_section("Wizard status");
    io::print_info(format!("  Mode        : {}", session.mode()));
    io::print_info(format!(
        "  Store       : {}",
        session.identity().unwrap_or("(new)")
    ));
    match (plan.view_for(step), plan.display_step(step)) {
        (Some(view), Some(display)) => {
            let in_view = plan.span(view).map_or(0, |span| span.sub_steps.len());
            io::print_info(format!(
                "  Step        : {step}/{} ({}, {display} of {in_view})",
                plan.total_steps(),
                view.title()
            ));
        }
        _ => io::print_info(format!("  Step        : {step}/{}", plan.total_steps())),
    }
    if let Some(sub_step) = session.current_sub_step() {
        io::print_info(format!("  Screen      : {}", sub_step.title()));
    }
    io::print_info(format!("  Completion  : {}%", state.profile_completion));
    io::print_info(format!("  Submission  : {}", state.status));
    io::print_info(format!("  Attachments : {}", session.files().len()));
    if let Some(error) = &state.error {
        io::print_warning(format!("Last error: {error}"));
    }
    Ok(())
}

fn cmd_errors(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    match context.session().current_errors() {
        Some(errors) if !errors.is_empty() => print_validation_errors(errors),
        _ => io::print_info("No validation errors on this step."),
    }
    Ok(())
}

fn cmd_show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let session = context.session();
    if let Some(field) = args.first() {
        match session.form_data().get(field) {
            Some(value) => io::print_info(format!(
                "{field} = {}",
                serde_json::to_string_pretty(value)?
            )),
            None => io::print_warning(format!("{field} is not set.")),
        }
        return Ok(());
    }

    output_section("Form data");
    io::print_info(serde_json::to_string_pretty(session.form_data())?);
    let attached: Vec<&str> = session.files().fields().collect();
    if !attached.is_empty() {
        io::print_info(format!("Attachments: {}", attached.join(", ")));
    }
    Ok(())
}

fn cmd_submit(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let receipt = context.session_mut().submit()?;
    io::print_success(format!(
        "Store saved as `{}` (completion {}%).",
        receipt.store_id,
        context.session().state().profile_completion
    ));
    Ok(())
}

fn cmd_save_exit(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let snapshot = context.session().save_and_exit()?;
    output_section("Progress saved");
    io::print_info(format!("  Step        : {}", snapshot.current_step));
    io::print_info(format!("  Completion  : {}%", snapshot.profile_completion));
    io::print_info(format!("  Fields      : {}", snapshot.form_data.len()));
    io::print_hint("Progress lives in this session only; run `exit` to leave.");
    Ok(())
}

fn cmd_dismiss(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.session_mut().dismiss_error();
    io::print_info("Error dismissed.");
    Ok(())
}

fn cmd_reset(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if !context.confirm("Discard all wizard progress?")? {
        io::print_info("Reset cancelled.");
        return Ok(());
    }
    context.session_mut().reset();
    io::print_success("Wizard reset to step 1.");
    Ok(())
}
