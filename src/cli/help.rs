use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{CommandEntry, CommandRegistry};

/// Overview groups, in display order. Commands not listed land in "Other".
const GROUPS: &[(&str, &[&str])] = &[
    ("Session", &["mode", "mount", "load-profile", "reset", "exit"]),
    ("Fields", &["set", "unset", "attach", "detach", "toggle", "show"]),
    ("Navigation", &["proceed", "back", "step", "status", "errors"]),
    ("Saving", &["submit", "save-exit", "dismiss"]),
];

pub fn print_overview(registry: &CommandRegistry) {
    output_section("Available commands");
    let mut listed = Vec::new();
    for (group, names) in GROUPS {
        let entries: Vec<&CommandEntry> = names
            .iter()
            .filter_map(|name| registry.get(name))
            .collect();
        if entries.is_empty() {
            continue;
        }
        io::print_info(format!("{group}:"));
        for entry in entries {
            print_row(entry);
            listed.push(entry.name);
        }
    }

    let rest: Vec<&CommandEntry> = registry
        .list()
        .filter(|entry| !listed.contains(&entry.name))
        .collect();
    if !rest.is_empty() {
        io::print_info("Other:");
        rest.into_iter().for_each(print_row);
    }
    io::print_info("Use `help <command>` for usage details.");
}

fn print_row(entry: &CommandEntry) {
    io::print_info(format!("  {:<14} {}", entry.name, entry.description));
}

pub fn print_command(entry: &CommandEntry) {
    output_section(entry.name);
    io::print_info(entry.description);
    io::print_info(format!("  usage: {}", entry.usage));
}
