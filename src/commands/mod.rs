//! CLI commands

pub mod add;
pub mod convert;
pub mod embed;
pub mod import;
pub mod list;
pub mod rebuild;
pub mod standalone;
pub mod utils;
