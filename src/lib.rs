//! iterm-profiles library
//!
//! Installs, converts and rebuilds iTerm2 color-scheme profiles.
//!
//! # Disclaimer
//!
//! This tool is not affiliated with or endorsed by iTerm2 or its authors.
//! It edits locally stored preference files on your machine for personal use.

pub mod commands;
pub mod config;
pub mod iterm;
