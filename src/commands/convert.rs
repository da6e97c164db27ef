//! Convert command - Turn dynamic profiles into regular profiles
//!
//! Dynamic profiles can't be edited in iTerm2's settings UI. Converting them
//! copies each one into the preference store as an ordinary profile.

use anyhow::Result;
use owo_colors::OwoColorize;
use plist::Dictionary;
use std::path::PathBuf;

use super::utils::{self, BatchReport, WriteOptions};
use crate::config::{self, Paths};
use crate::iterm::profile::{COLOR_PRESET_KEY, CUSTOM_COMMAND_KEY, DYNAMIC_ONLY_KEYS};
use crate::iterm::{dynamic, Derivation, PreferenceStore, Profile};

/// Default dynamic profiles file read by `convert` and `restore`
pub const DEFAULT_INPUT: &str = "ColorProfiles.json";

/// How colors are carried over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertMode {
    /// Copy the record as is, colors included
    Convert,
    /// Rewrite every color in normalized form and drop the preset name
    Restore,
}

impl ConvertMode {
    fn derivation(self) -> Derivation {
        let derivation = Derivation::new()
            .exclude(DYNAMIC_ONLY_KEYS.iter().copied())
            .default_value(CUSTOM_COMMAND_KEY, "No");

        match self {
            ConvertMode::Convert => derivation,
            ConvertMode::Restore => derivation.exclude([COLOR_PRESET_KEY]),
        }
    }
}

/// Options for the convert and restore commands
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Dynamic profiles file (DynamicProfiles/ColorProfiles.json by default)
    pub input: Option<PathBuf>,
    pub mode: ConvertMode,
    pub write: WriteOptions,
}

/// Append a regular profile for each dynamic profile not already in the store
pub fn convert_profiles(
    store: &mut PreferenceStore,
    dynamic_profiles: Vec<Profile>,
    mode: ConvertMode,
) -> BatchReport {
    let derivation = mode.derivation();
    let mut report = BatchReport::default();

    for record in dynamic_profiles {
        let name = record.display_name().to_string();
        if store.contains(&name) {
            report.skip(name);
            continue;
        }

        let profile = match mode {
            ConvertMode::Convert => derivation.derive(&record, &name, &Dictionary::new()),
            ConvertMode::Restore => {
                let (base, colors) = record.split_colors();
                derivation.derive(&base, &name, &colors)
            }
        };

        store.push(profile);
        report.add(name);
    }

    report
}

/// Execute the convert or restore command
pub fn execute(paths: &Paths, options: ConvertOptions) -> Result<()> {
    let input = match options.input {
        Some(path) => path,
        None => config::dynamic_profiles_dir()?.join(DEFAULT_INPUT),
    };

    match options.mode {
        ConvertMode::Convert => println!("Converting dynamic profiles to regular profiles...\n"),
        ConvertMode::Restore => println!("Restoring color profiles as regular profiles...\n"),
    }

    println!("Reading dynamic profiles: {}", input.display());
    let dynamic_profiles = dynamic::load(&input)?;
    println!("Found {} dynamic profiles\n", dynamic_profiles.len());

    let mut store = utils::load_store(&paths.store_path()?)?;
    let report = convert_profiles(&mut store, dynamic_profiles, options.mode);

    report.print_items("Added");

    if !report.has_changes() {
        println!("\n{} No new profiles to add", "⚠".yellow());
        return Ok(());
    }

    if utils::commit_store(&store, &report, options.write)? {
        println!(
            "\n{} Successfully converted {} profiles",
            "✓".green(),
            report.added.len()
        );
    }
    report.print_summary();

    utils::print_next_steps(&[
        "Restart iTerm2 completely (Cmd+Q, then reopen)",
        "The converted profiles are now editable in Settings → Profiles",
        "Remove the dynamic profiles file if you no longer need it",
    ]);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iterm::store::PlistFormat;
    use plist::Value;

    fn empty_store() -> PreferenceStore {
        let mut root = Dictionary::new();
        root.insert("New Bookmarks".to_string(), Value::Array(Vec::new()));
        PreferenceStore::from_value("prefs.plist", PlistFormat::Xml, Value::Dictionary(root))
            .unwrap()
    }

    fn dynamic_record(name: &str) -> Profile {
        let mut color = Dictionary::new();
        color.insert("Red Component".to_string(), Value::Real(0.1));
        color.insert("Green Component".to_string(), Value::Real(0.2));
        color.insert("Blue Component".to_string(), Value::Real(0.3));
        color.insert("Extra".to_string(), Value::from("dropped"));

        let mut p = Profile::new();
        p.insert("Name", name);
        p.insert("Guid", "dyn-1");
        p.insert("Dynamic Profile Parent Name", "Default");
        p.insert("Tags", Value::Array(vec![Value::from("repo")]));
        p.insert("Color Preset Name", name);
        p.insert("Background Color", Value::Dictionary(color));
        p.insert("Ansi 3 Color", "not a color");
        p
    }

    #[test]
    fn test_convert_strips_dynamic_keys() {
        let mut store = empty_store();
        let report = convert_profiles(&mut store, vec![dynamic_record("X")], ConvertMode::Convert);

        assert_eq!(report.added, vec!["X"]);
        let x = store.find("X").unwrap();
        assert!(!x.contains_key("Dynamic Profile Parent Name"));
        assert!(!x.contains_key("Tags"));
        assert_ne!(x.guid(), Some("dyn-1"));
        assert_eq!(x.get("Custom Command").and_then(Value::as_string), Some("No"));
        // Convert keeps colors verbatim
        assert!(x.contains_key("Ansi 3 Color"));
        assert_eq!(x.get("Color Preset Name").and_then(Value::as_string), Some("X"));
    }

    #[test]
    fn test_convert_keeps_existing_custom_command() {
        let mut store = empty_store();
        let mut record = dynamic_record("X");
        record.insert("Custom Command", "Yes");

        convert_profiles(&mut store, vec![record], ConvertMode::Convert);
        assert_eq!(
            store.find("X").unwrap().get("Custom Command").and_then(Value::as_string),
            Some("Yes")
        );
    }

    #[test]
    fn test_restore_normalizes_colors() {
        let mut store = empty_store();
        convert_profiles(&mut store, vec![dynamic_record("X")], ConvertMode::Restore);

        let x = store.find("X").unwrap();
        assert!(!x.contains_key("Color Preset Name"));
        assert!(!x.contains_key("Ansi 3 Color"));

        let background = x.get("Background Color").and_then(Value::as_dictionary).unwrap();
        assert_eq!(background.len(), 3);
        assert!(!background.contains_key("Extra"));
    }

    #[test]
    fn test_convert_skips_existing_and_unnamed() {
        let mut store = empty_store();
        let unnamed = Profile::new();

        let first = convert_profiles(
            &mut store,
            vec![dynamic_record("X"), unnamed.clone()],
            ConvertMode::Convert,
        );
        assert_eq!(first.added, vec!["X", "Unnamed"]);

        let second = convert_profiles(
            &mut store,
            vec![dynamic_record("X"), unnamed],
            ConvertMode::Convert,
        );
        assert!(second.added.is_empty());
        assert_eq!(second.skipped, vec!["X", "Unnamed"]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_execute_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths {
            store_path: Some(dir.path().join("prefs.plist")),
            ..Default::default()
        };
        let options = ConvertOptions {
            input: Some(dir.path().join("missing.json")),
            mode: ConvertMode::Convert,
            write: WriteOptions::default(),
        };

        assert!(execute(&paths, options).is_err());
    }
}
