//! Core iTerm2 profile operations

pub mod catalog;
pub mod color;
pub mod dynamic;
pub mod profile;
pub mod scheme;
pub mod store;

// Re-exports for library consumers
pub use profile::{Derivation, Profile};
pub use scheme::{ColorScheme, SchemeError};
pub use store::PreferenceStore;
