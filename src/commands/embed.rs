//! Embed command - Write a dynamic profiles file from installed color presets

use anyhow::Result;
use std::path::Path;

use super::convert::DEFAULT_INPUT;
use super::utils::{self, BatchReport};
use crate::config::{self, Paths, StandardSettings};
use crate::iterm::catalog::{self, SchemeRef};
use crate::iterm::profile::DYNAMIC_PARENT_KEY;
use crate::iterm::{Derivation, Profile};

/// Options for the embed command
#[derive(Debug, Clone)]
pub struct EmbedOptions {
    /// Scheme arguments (curated list when empty)
    pub schemes: Vec<String>,
    /// Profile the dynamic profiles inherit from
    pub parent: String,
    /// Font override
    pub font: Option<String>,
    pub dry_run: bool,
}

/// The base every dynamic profile is derived from
pub fn dynamic_template(parent: &str) -> Profile {
    let mut template = Profile::new();
    template.insert(DYNAMIC_PARENT_KEY, parent);
    template
}

/// Build one dynamic profile per scheme with its colors embedded
pub fn embed_schemes(
    schemes: &[SchemeRef],
    scheme_dir: &Path,
    parent: &str,
    settings: &StandardSettings,
) -> Result<(Vec<Profile>, BatchReport)> {
    utils::require_dir(scheme_dir, "Color presets directory")?;
    let template = dynamic_template(parent);
    let derivation = Derivation::new().force_all(&settings.to_fields());

    Ok(utils::build_from_schemes(schemes, scheme_dir, |scheme_ref, scheme| {
        derivation.derive(&template, &scheme_ref.profile_name, scheme.colors())
    }))
}

/// Execute the embed command
pub fn execute(paths: &Paths, options: EmbedOptions) -> Result<()> {
    println!("Creating dynamic profiles with embedded colors...\n");

    let scheme_dir = paths.scheme_dir_or(config::color_presets_dir)?;
    let output = paths.output_path_or(DEFAULT_INPUT)?;
    let schemes = catalog::resolve(&options.schemes, catalog::curated);
    let settings = StandardSettings::with_font(options.font);

    let (profiles, report) = embed_schemes(&schemes, &scheme_dir, &options.parent, &settings)?;
    report.print_items("Embedded colors for");

    utils::commit_dynamic(&output, &profiles, options.dry_run)?;
    report.print_summary();

    utils::print_next_steps(&[
        "iTerm2 picks up dynamic profiles automatically",
        "Open Settings → Profiles and look for the new profiles",
        "Run `convert` to turn them into editable profiles",
    ]);

    Ok(())
}
