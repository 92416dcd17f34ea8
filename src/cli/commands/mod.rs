pub mod config;
pub mod profile;
pub mod system;
pub mod wizard;

use crate::cli::registry::CommandRegistry;

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    for entry in system::definitions()
        .into_iter()
        .chain(wizard::definitions())
        .chain(profile::definitions())
        .chain(config::definitions())
    {
        registry.register(entry);
    }
}
