pub mod build_info;
pub mod paths;
pub mod persistence;

use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "storefront_core=info";

/// Installs the global fmt subscriber on stderr.
///
/// `RUST_LOG` is honoured first; `extra` (usually the configured log filter)
/// is layered on top when it parses.
pub fn init_tracing(extra: Option<&str>) {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = DEFAULT_DIRECTIVE.parse::<Directive>() {
        filter = filter.add_directive(directive);
    }
    for raw in extra.into_iter().flat_map(|value| value.split(',')) {
        match raw.trim().parse::<Directive>() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(err) => eprintln!("Ignoring log filter `{raw}`: {err}"),
        }
    }
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
