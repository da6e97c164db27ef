//! Rebuild command - Dynamic profiles bound to repository directories
//!
//! Each profile switches in automatically when the session's working
//! directory is inside its repository.

use anyhow::{Context, Result};
use plist::{Dictionary, Value};
use std::path::{Path, PathBuf};

use super::embed::dynamic_template;
use super::utils::{self, BatchReport};
use crate::config::{self, Paths, StandardSettings};
use crate::iterm::catalog::{self, RepoBinding, SchemeRef};
use crate::iterm::{Derivation, Profile};

pub const OUTPUT_FILE: &str = "RepoProfiles.json";

const TAGS: &[&str] = &["repo", "auto-switch"];

/// Options for the rebuild command
#[derive(Debug, Clone)]
pub struct RebuildOptions {
    /// `repo=Scheme` arguments (built-in table when empty)
    pub bindings: Vec<String>,
    /// Directory containing the repositories
    pub repo_dir: Option<PathBuf>,
    /// Profile the dynamic profiles inherit from
    pub parent: String,
    /// Font override
    pub font: Option<String>,
    pub dry_run: bool,
}

/// Parse binding arguments, falling back to the built-in table
pub fn resolve_bindings(args: &[String]) -> Result<Vec<RepoBinding>> {
    if args.is_empty() {
        return Ok(catalog::repo_bindings());
    }
    args.iter()
        .map(|arg| {
            RepoBinding::parse(arg)
                .with_context(|| format!("Invalid binding '{}', expected repo=Scheme", arg))
        })
        .collect()
}

/// Fields that bind a profile to `<repo_dir>/<repo>`
pub fn binding_fields(repo_dir: &Path, repo: &str) -> Dictionary {
    let working_dir = repo_dir.join(repo).display().to_string();

    let mut rule = Dictionary::new();
    rule.insert("Pattern".to_string(), Value::from(format!("{}*", working_dir)));
    rule.insert("Type".to_string(), Value::from("Path"));

    let mut switching = Dictionary::new();
    switching.insert("Enabled".to_string(), Value::from(true));
    switching.insert(
        "Rules".to_string(),
        Value::Array(vec![Value::Dictionary(rule)]),
    );

    let mut fields = Dictionary::new();
    fields.insert("Custom Directory".to_string(), Value::from("Yes"));
    fields.insert("Working Directory".to_string(), Value::from(working_dir));
    fields.insert(
        "Bound Hosts".to_string(),
        Value::Array(vec![Value::from("*")]),
    );
    fields.insert(
        "Tags".to_string(),
        Value::Array(TAGS.iter().map(|tag| Value::from(*tag)).collect()),
    );
    fields.insert("Badge Text".to_string(), Value::from(repo));
    fields.insert(
        "Automatic Profile Switching".to_string(),
        Value::Dictionary(switching),
    );
    fields
}

/// Build one directory-bound profile per repository
pub fn build_repo_profiles(
    bindings: &[RepoBinding],
    scheme_dir: &Path,
    repo_dir: &Path,
    parent: &str,
    settings: &StandardSettings,
) -> Result<(Vec<Profile>, BatchReport)> {
    utils::require_dir(scheme_dir, "Schemes directory")?;
    let template = dynamic_template(parent);
    let fields = settings.to_fields();
    let refs: Vec<SchemeRef> = bindings.iter().map(RepoBinding::scheme_ref).collect();

    Ok(utils::build_from_schemes(&refs, scheme_dir, |scheme_ref, scheme| {
        let repo = scheme_ref.profile_name.as_str();
        Derivation::new()
            .force_all(&fields)
            .force_all(&binding_fields(repo_dir, repo))
            .derive(&template, repo, scheme.colors())
    }))
}

/// Execute the rebuild command
pub fn execute(paths: &Paths, options: RebuildOptions) -> Result<()> {
    println!("Rebuilding repository profiles...\n");

    let bindings = resolve_bindings(&options.bindings)?;
    let scheme_dir = paths.scheme_dir_or(config::downloaded_schemes_dir)?;
    let repo_dir = match options.repo_dir {
        Some(dir) => dir,
        None => config::default_repo_dir()?,
    };
    let output = paths.output_path_or(OUTPUT_FILE)?;
    let settings = StandardSettings::with_font(options.font);

    if !repo_dir.is_dir() {
        tracing::warn!("Repository directory does not exist: {}", repo_dir.display());
    }

    let (profiles, report) = build_repo_profiles(
        &bindings,
        &scheme_dir,
        &repo_dir,
        &options.parent,
        &settings,
    )?;

    for binding in &bindings {
        if report.added.contains(&binding.repo) {
            println!("  {} → {}", binding.repo, binding.scheme);
        }
    }
    report.print_items("Built");

    utils::commit_dynamic(&output, &profiles, options.dry_run)?;
    report.print_summary();

    utils::print_next_steps(&[
        "cd into a repository and the matching profile switches in",
        "Check Settings → Profiles → Advanced → Automatic Profile Switching",
    ]);

    Ok(())
}
