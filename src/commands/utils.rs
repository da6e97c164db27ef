//! Shared utilities for commands

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;

use crate::config;
use crate::iterm::catalog::SchemeRef;
use crate::iterm::{dynamic, ColorScheme, PreferenceStore, Profile, SchemeError};

/// A scheme that could not be turned into a profile
#[derive(Debug)]
pub struct ItemFailure {
    pub name: String,
    pub error: SchemeError,
}

/// Outcome of processing a batch of profiles
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Profiles created in this run
    pub added: Vec<String>,
    /// Profiles left alone because the name already existed
    pub skipped: Vec<String>,
    /// Profiles that could not be built
    pub failed: Vec<ItemFailure>,
}

impl BatchReport {
    pub fn add(&mut self, name: impl Into<String>) {
        self.added.push(name.into());
    }

    pub fn skip(&mut self, name: impl Into<String>) {
        self.skipped.push(name.into());
    }

    pub fn fail(&mut self, name: impl Into<String>, error: SchemeError) {
        self.failed.push(ItemFailure {
            name: name.into(),
            error,
        });
    }

    pub fn has_changes(&self) -> bool {
        !self.added.is_empty()
    }

    /// Print one line per processed item
    pub fn print_items(&self, added_label: &str) {
        for name in &self.added {
            println!("{} {} '{}'", "✓".green(), added_label, name);
        }
        for name in &self.skipped {
            println!("{} Skipping '{}' - already exists", "⚠".yellow(), name);
        }
        for failure in &self.failed {
            eprintln!("{} {}: {}", "Failed:".red(), failure.name, failure.error);
        }
    }

    /// Print the closing counts
    pub fn print_summary(&self) {
        if !self.skipped.is_empty() {
            println!(
                "{} Skipped {} existing: {}",
                "⚠".yellow(),
                self.skipped.len(),
                self.skipped.join(", ")
            );
        }
        if !self.failed.is_empty() {
            let names: Vec<&str> = self.failed.iter().map(|f| f.name.as_str()).collect();
            println!(
                "{} Failed {}: {}",
                "✗".red(),
                self.failed.len(),
                names.join(", ")
            );
        }
    }
}

/// How store-mutating commands write their result
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Build everything but write nothing
    pub dry_run: bool,
    /// Keep a timestamped copy of the previous preference file
    pub backup: bool,
}

/// Load the preference store, failing the whole run if it is unreadable
pub fn load_store(path: &Path) -> Result<PreferenceStore> {
    println!("Reading iTerm2 preferences: {}", path.display());
    let store = PreferenceStore::load(path).context("Error reading iTerm2 preferences")?;
    println!("Found {} existing profiles", store.len());
    Ok(store)
}

/// Locate the template profile, failing the whole run if it is absent
pub fn find_template<'a>(store: &'a PreferenceStore, name: &str) -> Result<&'a Profile> {
    store
        .find(name)
        .with_context(|| format!("Could not find '{}' profile to use as template", name))
}

/// Write the store if the batch added anything
///
/// Returns whether the store was written.
pub fn commit_store(
    store: &PreferenceStore,
    report: &BatchReport,
    options: WriteOptions,
) -> Result<bool> {
    if !report.has_changes() {
        return Ok(false);
    }

    if options.dry_run {
        println!(
            "\n{} Would write {} new profile(s) to {}",
            "[DRY-RUN]".blue(),
            report.added.len(),
            store.path().display()
        );
        return Ok(false);
    }

    if is_iterm_running() {
        println!(
            "{} iTerm2 is running and may overwrite these changes when it quits.",
            "Warning:".yellow()
        );
    }

    if options.backup {
        let backup = store.backup()?;
        println!("{} {}", "Backup:".green(), backup.display());
    }

    println!(
        "\nWriting {} new profile(s) to iTerm2 preferences...",
        report.added.len()
    );
    store.save().context("Error writing iTerm2 preferences")?;
    println!("{} Successfully updated iTerm2 preferences", "✓".green());

    refresh_preferences();
    Ok(true)
}

/// Write a dynamic profiles file, replacing whatever was there
///
/// Returns whether the file was written.
pub fn commit_dynamic(path: &Path, profiles: &[Profile], dry_run: bool) -> Result<bool> {
    if profiles.is_empty() {
        println!("\n{} No profiles were built, nothing to write", "⚠".yellow());
        return Ok(false);
    }

    if dry_run {
        println!(
            "\n{} Would write {} profile(s) to {}",
            "[DRY-RUN]".blue(),
            profiles.len(),
            path.display()
        );
        return Ok(false);
    }

    dynamic::save(path, profiles)?;
    println!(
        "\n{} Wrote {} profile(s) to {}",
        "✓".green(),
        profiles.len(),
        path.display()
    );
    Ok(true)
}

/// Load each scheme and build a profile from it, skipping duplicate names
pub fn build_from_schemes<F>(
    refs: &[SchemeRef],
    scheme_dir: &Path,
    mut build: F,
) -> (Vec<Profile>, BatchReport)
where
    F: FnMut(&SchemeRef, &ColorScheme) -> Profile,
{
    let mut profiles: Vec<Profile> = Vec::new();
    let mut report = BatchReport::default();

    for scheme_ref in refs {
        let name = &scheme_ref.profile_name;
        if profiles.iter().any(|p| p.name() == Some(name.as_str())) {
            report.skip(name.as_str());
            continue;
        }

        match ColorScheme::load(scheme_ref.path_in(scheme_dir)) {
            Ok(scheme) => {
                profiles.push(build(scheme_ref, &scheme));
                report.add(name.as_str());
            }
            Err(error) => report.fail(name.as_str(), error),
        }
    }

    (profiles, report)
}

/// Fail the whole run if a scheme directory is missing
pub fn require_dir(dir: &Path, what: &str) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("{} not found: {}", what, dir.display());
    }
    Ok(())
}

/// Print a boxed list of follow-up steps
pub fn print_next_steps(steps: &[&str]) {
    let rule = "=".repeat(60);
    println!("\n{}", rule);
    println!("Next steps:");
    for (i, step) in steps.iter().enumerate() {
        println!("{}. {}", i + 1, step);
    }
    println!("{}", rule);
}

/// Check if iTerm2 is running
pub fn is_iterm_running() -> bool {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("pgrep")
            .args(["-x", "iTerm2"])
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    #[cfg(not(target_os = "macos"))]
    {
        false
    }
}

/// Ask cfprefsd to re-read the preference domain. Failures are ignored.
pub fn refresh_preferences() {
    #[cfg(target_os = "macos")]
    {
        let status = std::process::Command::new("defaults")
            .args(["read", config::ITERM_DOMAIN])
            .output();
        tracing::debug!(
            "defaults read {}: {:?}",
            config::ITERM_DOMAIN,
            status.map(|o| o.status)
        );
    }

    #[cfg(not(target_os = "macos"))]
    {
        tracing::debug!("Skipping preference refresh for {}", config::ITERM_DOMAIN);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plist::{Dictionary, Value};
    use std::path::PathBuf;

    #[test]
    fn test_batch_report() {
        let mut report = BatchReport::default();
        assert!(!report.has_changes());

        report.add("Nord");
        report.skip("Dracula");
        report.fail("Ayu", SchemeError::Missing(PathBuf::from("/s/Ayu.itermcolors")));

        assert!(report.has_changes());
        assert_eq!(report.added, vec!["Nord"]);
        assert_eq!(report.skipped, vec!["Dracula"]);
        assert_eq!(report.failed[0].name, "Ayu");
    }

    #[test]
    fn test_build_from_schemes_reports_per_item() {
        let dir = tempfile::tempdir().unwrap();
        let mut colors = Dictionary::new();
        colors.insert("Ansi 0 Color".to_string(), Value::Dictionary(Dictionary::new()));
        Value::Dictionary(colors)
            .to_file_xml(dir.path().join("Nord.itermcolors"))
            .unwrap();

        let refs = vec![
            SchemeRef::new("Nord", "Nord"),
            SchemeRef::new("Missing", "Missing"),
            SchemeRef::new("Nord", "Nord"),
        ];

        let (profiles, report) = build_from_schemes(&refs, dir.path(), |r, scheme| {
            let mut p = Profile::new();
            p.insert("Name", r.profile_name.as_str());
            p.insert("Colors", scheme.color_count() as i64);
            p
        });

        assert_eq!(profiles.len(), 1);
        assert_eq!(report.added, vec!["Nord"]);
        assert_eq!(report.skipped, vec!["Nord"]);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(report.failed[0].error, SchemeError::Missing(_)));
    }

    #[test]
    fn test_commit_dynamic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("Out.json");
        let mut p = Profile::new();
        p.insert("Name", "Nord");

        assert!(!commit_dynamic(&path, &[], false).unwrap());
        assert!(!commit_dynamic(&path, &[p.clone()], true).unwrap());
        assert!(!path.exists());

        assert!(commit_dynamic(&path, &[p], false).unwrap());
        assert_eq!(dynamic::load(&path).unwrap()[0].name(), Some("Nord"));
    }

    #[test]
    fn test_require_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(require_dir(dir.path(), "Schemes directory").is_ok());
        assert!(require_dir(&dir.path().join("nope"), "Schemes directory").is_err());
    }

    #[test]
    fn test_commit_store_without_changes() {
        let store = PreferenceStore::from_value(
            "/nonexistent/prefs.plist",
            crate::iterm::store::PlistFormat::Xml,
            Value::Dictionary(Dictionary::new()),
        )
        .unwrap();

        // Nothing added: nothing written, no error even though the path is bogus
        let written =
            commit_store(&store, &BatchReport::default(), WriteOptions::default()).unwrap();
        assert!(!written);
    }
}
