use std::process;

use storefront_core::{cli, init_with_filter, utils};

fn main() {
    let log_filter = utils::paths::config_manager()
        .and_then(|manager| manager.load())
        .ok()
        .and_then(|config| config.log_filter);
    init_with_filter(log_filter.as_deref());

    if let Err(err) = cli::run_cli() {
        eprintln!("storefront_cli: {err}");
        process::exit(1);
    }
}
