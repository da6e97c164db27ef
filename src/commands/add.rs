//! Add command - Add preset-name profiles to the preference store
//!
//! Each new profile is a copy of the template with `Color Preset Name` set,
//! so iTerm2 applies a color preset that is already imported.

use anyhow::Result;
use owo_colors::OwoColorize;

use super::utils::{self, BatchReport, WriteOptions};
use crate::config::{Paths, StandardSettings};
use crate::iterm::catalog::{self, SchemeRef};
use crate::iterm::profile::COLOR_PRESET_KEY;
use crate::iterm::{Derivation, PreferenceStore};

/// Options for the add command
#[derive(Debug, Clone)]
pub struct AddOptions {
    /// Scheme arguments (curated list when empty)
    pub schemes: Vec<String>,
    /// Name of the profile to copy
    pub template: String,
    /// Font override
    pub font: Option<String>,
    pub write: WriteOptions,
}

/// Append one profile per scheme, skipping names that already exist
pub fn add_preset_profiles(
    store: &mut PreferenceStore,
    schemes: &[SchemeRef],
    template: &str,
    settings: &StandardSettings,
) -> Result<BatchReport> {
    let base = utils::find_template(store, template)?.clone();
    let mut report = BatchReport::default();

    for scheme in schemes {
        let name = scheme.profile_name.as_str();
        if store.contains(name) {
            report.skip(name);
            continue;
        }

        let profile = Derivation::new()
            .force_all(&settings.to_fields())
            .force(COLOR_PRESET_KEY, name)
            .derive(&base, name, &plist::Dictionary::new());

        store.push(profile);
        report.add(name);
    }

    Ok(report)
}

/// Execute the add command
pub fn execute(paths: &Paths, options: AddOptions) -> Result<()> {
    println!("Adding color scheme profiles to iTerm2...\n");

    let mut store = utils::load_store(&paths.store_path()?)?;
    let names: Vec<&str> = {
        let mut names: Vec<&str> = store.names().into_iter().collect();
        names.sort_unstable();
        names
    };
    println!("Existing profiles: {}\n", names.join(", "));

    let schemes = catalog::resolve(&options.schemes, catalog::curated);
    let settings = StandardSettings::with_font(options.font);
    let report = add_preset_profiles(&mut store, &schemes, &options.template, &settings)?;

    report.print_items("Added");

    if !report.has_changes() {
        println!("\n{} No new profiles to add", "⚠".yellow());
        return Ok(());
    }

    if utils::commit_store(&store, &report, options.write)? {
        println!(
            "\n{} Successfully added {} new profiles",
            "✓".green(),
            report.added.len()
        );
    }
    report.print_summary();

    utils::print_next_steps(&[
        "Restart iTerm2 completely (Cmd+Q, then reopen)",
        "Go to Settings → Profiles to see all profiles",
        "Select any profile from the dropdown menu",
        "Download color schemes from iterm2colorschemes.com if needed",
    ]);

    Ok(())
}
