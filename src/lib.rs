#![doc(test(attr(deny(warnings))))]

//! Storefront Core drives the store registration wizard: completion scoring,
//! per-step validation, profile hydration and submission packing, fronted by
//! a line-oriented shell.

pub mod cli;
pub mod errors;
pub mod utils;

pub use storefront_config as config;
pub use storefront_domain as domain;
pub use storefront_engine as engine;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default filter.
pub fn init() {
    init_with_filter(None);
}

/// Initializes global tracing, adding `filter` as an extra directive.
/// Only the first call has any effect.
pub fn init_with_filter(filter: Option<&str>) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(filter);
        tracing::info!("Storefront Core tracing initialized.");
    });
}
