use colored::Colorize;
use std::fmt;
use std::sync::{OnceLock, RwLock};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Hint,
    Section,
}

#[derive(Clone, Copy, Debug)]
pub struct OutputPreferences {
    /// Screen-reader friendly: no colour, no decoration beyond labels.
    pub plain: bool,
    pub color: bool,
}

impl Default for OutputPreferences {
    fn default() -> Self {
        Self {
            plain: false,
            color: true,
        }
    }
}

static PREFERENCES: OnceLock<RwLock<OutputPreferences>> = OnceLock::new();

pub fn set_preferences(prefs: OutputPreferences) {
    let lock = PREFERENCES.get_or_init(|| RwLock::new(OutputPreferences::default()));
    if let Ok(mut guard) = lock.write() {
        *guard = prefs;
    }
}

fn preferences() -> OutputPreferences {
    PREFERENCES
        .get_or_init(|| RwLock::new(OutputPreferences::default()))
        .read()
        .map(|guard| *guard)
        .unwrap_or_default()
}

fn label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "INFO",
        MessageKind::Success => "OK",
        MessageKind::Warning => "WARNING",
        MessageKind::Error => "ERROR",
        MessageKind::Hint => "HINT",
        MessageKind::Section => "",
    }
}

fn render(kind: MessageKind, message: impl fmt::Display, prefs: &OutputPreferences) -> String {
    let text = message.to_string();
    let formatted = match kind {
        MessageKind::Section if prefs.plain => text.trim().to_string(),
        MessageKind::Section => format!("=== {} ===", text.trim()),
        MessageKind::Info if !prefs.plain => text,
        _ => format!("{}: {}", label(kind), text),
    };

    if prefs.plain || !prefs.color {
        return formatted;
    }
    match kind {
        MessageKind::Success => formatted.bright_green().to_string(),
        MessageKind::Warning => formatted.bright_yellow().to_string(),
        MessageKind::Error => formatted.bright_red().to_string(),
        MessageKind::Hint => formatted.bright_cyan().to_string(),
        MessageKind::Section => formatted.bold().to_string(),
        MessageKind::Info => formatted,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = render(kind, message, &preferences());
    match kind {
        MessageKind::Section => println!("\n{}", formatted),
        _ => println!("{}", formatted),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn hint(message: impl fmt::Display) {
    print(MessageKind::Hint, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_output_keeps_labels_without_colour() {
        let prefs = OutputPreferences {
            plain: true,
            color: true,
        };
        assert_eq!(render(MessageKind::Warning, "careful", &prefs), "WARNING: careful");
        assert_eq!(render(MessageKind::Section, " Status ", &prefs), "Status");
        assert_eq!(render(MessageKind::Info, "hello", &prefs), "INFO: hello");
    }

    #[test]
    fn colourless_sections_are_framed() {
        let prefs = OutputPreferences {
            plain: false,
            color: false,
        };
        assert_eq!(render(MessageKind::Section, "Status", &prefs), "=== Status ===");
        assert_eq!(render(MessageKind::Info, "hello", &prefs), "hello");
    }
}
