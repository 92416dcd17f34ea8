//! storefront-engine
//!
//! Registration wizard logic: completion scoring, step validation, the
//! registration reducer, headless step views, profile hydration, submission
//! packing, and the session that ties them to a profile gateway.
//! Depends on storefront-domain. No terminal I/O.

pub mod completion;
pub mod error;
pub mod gateway;
pub mod profile_sync;
pub mod reducer;
pub mod session;
pub mod submission;
pub mod validation;
pub mod views;

#[cfg(test)]
mod tests;

pub use completion::*;
pub use error::CoreError;
pub use gateway::*;
pub use profile_sync::*;
pub use reducer::*;
pub use session::*;
pub use submission::*;
pub use validation::*;
pub use views::*;
