//! storefront-domain
//!
//! Pure data types for the storefront registration wizard (form data, file
//! descriptors, store records, wizard steps). No I/O, no logging.

pub mod files;
pub mod form_data;
pub mod store;
pub mod wizard;

pub use files::*;
pub use form_data::*;
pub use store::*;
pub use wizard::*;
