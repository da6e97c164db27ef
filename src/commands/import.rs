//! Import command - Add full-color scheme profiles to the preference store

use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::Path;

use super::utils::{self, BatchReport, WriteOptions};
use crate::config::{self, Paths, StandardSettings};
use crate::iterm::catalog::{self, SchemeRef};
use crate::iterm::{ColorScheme, Derivation, PreferenceStore};

/// Options for the import command
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Scheme arguments (curated list when empty)
    pub schemes: Vec<String>,
    /// Name of the profile to copy
    pub template: String,
    /// Font override
    pub font: Option<String>,
    pub write: WriteOptions,
}

/// Append one profile per scheme file, skipping names that already exist
///
/// A scheme that cannot be loaded is recorded as a failure and the rest of
/// the batch continues.
pub fn import_schemes(
    store: &mut PreferenceStore,
    schemes: &[SchemeRef],
    scheme_dir: &Path,
    template: &str,
    settings: &StandardSettings,
) -> Result<BatchReport> {
    utils::require_dir(scheme_dir, "Schemes directory")?;
    let base = utils::find_template(store, template)?.clone();
    let derivation = Derivation::new().force_all(&settings.to_fields());
    let mut report = BatchReport::default();

    for scheme_ref in schemes {
        let name = scheme_ref.profile_name.as_str();
        if store.contains(name) {
            report.skip(name);
            continue;
        }

        match ColorScheme::load(scheme_ref.path_in(scheme_dir)) {
            Ok(scheme) => {
                tracing::debug!(
                    "Loaded {} colors for '{}' from {}",
                    scheme.color_count(),
                    name,
                    scheme.path().display()
                );
                store.push(derivation.derive(&base, name, scheme.colors()));
                report.add(name);
            }
            Err(error) => report.fail(name, error),
        }
    }

    Ok(report)
}

/// Execute the import command
pub fn execute(paths: &Paths, options: ImportOptions) -> Result<()> {
    println!("Importing color schemes into iTerm2...\n");

    let scheme_dir = paths.scheme_dir_or(config::downloaded_schemes_dir)?;
    let mut store = utils::load_store(&paths.store_path()?)?;

    let schemes = catalog::resolve(&options.schemes, catalog::curated);
    let settings = StandardSettings::with_font(options.font);
    let report = import_schemes(
        &mut store,
        &schemes,
        &scheme_dir,
        &options.template,
        &settings,
    )?;

    report.print_items("Imported");

    if !report.has_changes() {
        println!("\n{} No new profiles to add", "⚠".yellow());
        report.print_summary();
        return Ok(());
    }

    if utils::commit_store(&store, &report, options.write)? {
        println!(
            "\n{} Successfully imported {} color schemes",
            "✓".green(),
            report.added.len()
        );
    }
    report.print_summary();

    utils::print_next_steps(&[
        "Restart iTerm2 completely (Cmd+Q, then reopen)",
        "Go to Settings → Profiles",
        "Your new profiles have the full color schemes applied",
    ]);

    Ok(())
}
