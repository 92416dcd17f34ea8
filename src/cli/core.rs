//! Shell context, dispatch and error reporting.

use std::{io, sync::Arc};

use dialoguer::theme::ColorfulTheme;
use storefront_config::{Config, ConfigError, ConfigManager};
use storefront_domain::WizardMode;
use storefront_engine::{
    required_field_policy, CoreError, InMemoryProfileGateway, RegistrationSession,
    RequiredFieldSet, ValidationErrors, ValidationPolicy,
};
use strsim::levenshtein;
use thiserror::Error;

pub use crate::errors::CliError;
use crate::errors::StorefrontError;

use super::commands;
use super::io as cli_io;
use super::registry::{CommandEntry, CommandRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storefront(#[from] StorefrontError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

/// Everything a command handler can touch.
pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) registry: CommandRegistry,
    theme: ColorfulTheme,
    config_manager: ConfigManager,
    config: Config,
    gateway: Arc<InMemoryProfileGateway>,
    session: RegistrationSession,
    pub(crate) last_command: Option<String>,
    pub(crate) running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config_manager = crate::utils::paths::config_manager()?;
        Self::with_config_manager(mode, config_manager)
    }

    pub fn with_config_manager(
        mode: CliMode,
        config_manager: ConfigManager,
    ) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let config = config_manager.load()?;
        cli_io::apply_config(&config);

        let wizard_mode = config
            .default_mode
            .parse::<WizardMode>()
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "invalid default mode in config");
                WizardMode::Register
            });
        let gateway = InMemoryProfileGateway::shared();
        let session = build_session(&config, wizard_mode, &gateway);

        Ok(Self {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            config_manager,
            config,
            gateway,
            session,
            last_command: None,
            running: true,
        })
    }

    pub fn session(&self) -> &RegistrationSession {
        &self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut RegistrationSession {
        &mut self.session
    }

    pub(crate) fn gateway(&self) -> &InMemoryProfileGateway {
        &self.gateway
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    /// Applies `update` to the config, then saves it.
    pub(crate) fn update_config(
        &mut self,
        update: impl FnOnce(&mut Config) -> Result<(), ConfigError>,
    ) -> CommandResult {
        let mut next = self.config.clone();
        update(&mut next)?;
        self.config_manager.save(&next)?;
        cli_io::apply_config(&next);
        self.config = next;
        Ok(())
    }

    /// Tears down the current session and starts a fresh one in `mode`.
    pub(crate) fn switch_mode(&mut self, mode: WizardMode) {
        self.session.unmount();
        self.session = build_session(&self.config, mode, &self.gateway);
        tracing::info!(mode = %mode, "wizard session restarted");
    }

    pub(crate) fn prompt(&self) -> String {
        let plan = self.session.views().plan();
        format!(
            "storefront[{} {}/{}]> ",
            self.session.mode(),
            self.session.current_step(),
            plan.total_steps()
        )
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match crate::cli::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                self.print_warning(&err.to_string());
                return Ok(LoopControl::Continue);
            }
        };
        if tokens.is_empty() {
            return Ok(LoopControl::Continue);
        }
        let command = tokens[0].to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.dispatch(&command, &tokens[0], &args)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &input.to_lowercase()), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", name));
            }
        }
    }

    /// Asks before destructive actions; scripts always proceed.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, prompt, false)
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        match cli_io::confirm_action(&self.theme, "Exit shell?", true) {
            Ok(answer) => Ok(answer),
            Err(CommandError::Dialoguer(err)) => Err(err.into()),
            Err(_) => Ok(true),
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        tracing::debug!(command = ?self.last_command, error = %err, "command failed");
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                self.print_error(&message);
                self.print_hint("Use `help <command>` for usage details.");
            }
            CommandError::Core(CoreError::Validation { step, .. }) => {
                self.print_error(&format!("Cannot submit yet: step {step} is incomplete."));
                if let Some(errors) = self.session.current_errors() {
                    print_validation_errors(errors);
                }
                self.print_hint("Fix the fields above, then run `submit` again.");
            }
            CommandError::Core(CoreError::Gateway(err)) => {
                self.print_error(&self.session.state().error.clone().unwrap_or(err.message));
                self.print_hint("Your answers are kept. Run `dismiss` to clear the error.");
            }
            other => self.print_error(&other.to_string()),
        }
        Ok(())
    }

    pub(crate) fn print_error(&self, message: &str) {
        cli_io::print_error(message);
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }

    pub(crate) fn print_hint(&self, message: &str) {
        cli_io::print_hint(message);
    }
}

pub(crate) fn print_validation_errors(errors: &ValidationErrors) {
    for (field, message) in errors.iter() {
        cli_io::print_info(format!("  - {field}: {message}"));
    }
}

fn build_session(
    config: &Config,
    mode: WizardMode,
    gateway: &Arc<InMemoryProfileGateway>,
) -> RegistrationSession {
    let policy = ValidationPolicy {
        password_min_length: config.password_min_length,
        max_video_seconds: config.max_video_seconds,
    };
    let required = match &config.required_fields {
        Some(names) => RequiredFieldSet::from_names(names.iter().map(String::as_str)),
        None => required_field_policy(),
    };
    RegistrationSession::with_options(mode, gateway.clone(), policy, required)
}
