//! Built-in scheme tables
//!
//! Scheme file names follow the iTerm2-Color-Schemes collection.

use std::path::{Path, PathBuf};

use super::scheme::{scheme_path, SCHEME_EXTENSION};

/// Curated set installed by `add`, `import` and `embed`: (profile name, file stem)
pub const CURATED: &[(&str, &str)] = &[
    ("Dracula", "Dracula"),
    ("Gruvbox Dark", "Gruvbox Dark"),
    ("Nord", "Nord"),
    ("Atom One Dark", "Atom One Dark"),
    ("Solarized Dark", "Solarized Dark Higher Contrast"),
    ("Monokai", "Monokai Remastered"),
    ("Tokyo Night", "TokyoNight"),
    ("Catppuccin", "Catppuccin Mocha"),
    ("Palenight", "Pale Night Hc"),
    ("Ayu", "Ayu"),
];

/// Schemes suited to long coding sessions, used by `standalone`
pub const RECOMMENDED: &[&str] = &[
    // Top tier
    "TokyoNight Storm",
    "Catppuccin Mocha",
    "Gruvbox Material Dark",
    "Nord",
    "Atom One Dark",
    // High contrast
    "Dracula",
    "Monokai Pro",
    "Oceanic Next",
    "Material Darker",
    // Colorful
    "Ayu Mirage",
    "TokyoNight Moon",
    "Snazzy",
    "Material Ocean",
    // Classics
    "Solarized Dark Patched",
    "Gruvbox Dark",
    "Tomorrow Night",
    // Others
    "TokyoNight Night",
    "Catppuccin Frappe",
    "Monokai Remastered",
    "One Dark Two",
];

/// Repository to scheme bindings, used by `rebuild`
pub const REPO_SCHEMES: &[(&str, &str)] = &[
    ("mac-setup", "Solarized Dark Patched"),
    ("transcript_extraction_dev", "Dracula"),
    ("budget_claude", "Gruvbox Dark"),
    ("budget_cursor", "Monokai Soda"),
    ("budget_tracing", "Nord"),
    ("budget", "Monokai Remastered"),
    ("agentic_ai_learning", "Gruvbox Material Dark"),
    ("intro-to-langsmith", "Dracula+"),
    ("seafoam", "Seafoam Pastel"),
];

/// A profile name paired with the scheme file it is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeRef {
    pub profile_name: String,
    pub file_stem: String,
}

impl SchemeRef {
    pub fn new(profile_name: impl Into<String>, file_stem: impl Into<String>) -> Self {
        Self {
            profile_name: profile_name.into(),
            file_stem: file_stem.into(),
        }
    }

    /// Parse a command-line scheme argument
    ///
    /// Accepts `Profile Name=File Stem` or a bare name. A bare name that
    /// matches a curated profile uses that profile's file; otherwise the
    /// name is also the file stem. A trailing `.itermcolors` is ignored.
    pub fn parse(arg: &str) -> Self {
        match arg.split_once('=') {
            Some((name, stem)) => Self::new(name.trim(), strip_extension(stem.trim())),
            None => {
                let name = strip_extension(arg.trim());
                let stem = CURATED
                    .iter()
                    .find(|(profile, _)| *profile == name)
                    .map(|(_, stem)| *stem)
                    .unwrap_or(name);
                Self::new(name, stem)
            }
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.file_stem, SCHEME_EXTENSION)
    }

    pub fn path_in(&self, scheme_dir: &Path) -> PathBuf {
        scheme_path(scheme_dir, &self.file_stem)
    }
}

fn strip_extension(name: &str) -> &str {
    name.strip_suffix(".itermcolors").unwrap_or(name)
}

/// Scheme refs from arguments, or `fallback` when none were given
pub fn resolve(args: &[String], fallback: fn() -> Vec<SchemeRef>) -> Vec<SchemeRef> {
    if args.is_empty() {
        fallback()
    } else {
        args.iter().map(|arg| SchemeRef::parse(arg)).collect()
    }
}

pub fn curated() -> Vec<SchemeRef> {
    CURATED
        .iter()
        .map(|(name, stem)| SchemeRef::new(*name, *stem))
        .collect()
}

pub fn recommended() -> Vec<SchemeRef> {
    RECOMMENDED
        .iter()
        .map(|name| SchemeRef::new(*name, *name))
        .collect()
}

/// A repository directory bound to a scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoBinding {
    pub repo: String,
    pub scheme: String,
}

impl RepoBinding {
    /// Parse `repo=Scheme Name`
    pub fn parse(arg: &str) -> Option<Self> {
        let (repo, scheme) = arg.split_once('=')?;
        let (repo, scheme) = (repo.trim(), strip_extension(scheme.trim()));
        if repo.is_empty() || scheme.is_empty() {
            return None;
        }
        Some(Self {
            repo: repo.to_string(),
            scheme: scheme.to_string(),
        })
    }

    pub fn scheme_ref(&self) -> SchemeRef {
        SchemeRef::new(self.repo.as_str(), self.scheme.as_str())
    }
}

pub fn repo_bindings() -> Vec<RepoBinding> {
    REPO_SCHEMES
        .iter()
        .map(|(repo, scheme)| RepoBinding {
            repo: repo.to_string(),
            scheme: scheme.to_string(),
        })
        .collect()
}
