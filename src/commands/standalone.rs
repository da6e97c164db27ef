//! Standalone command - Dynamic profiles for schemes suited to coding

use anyhow::Result;
use owo_colors::OwoColorize;
use plist::Value;
use std::path::Path;

use super::embed::dynamic_template;
use super::utils::{self, BatchReport};
use crate::config::{self, Paths, StandardSettings};
use crate::iterm::catalog::{self, SchemeRef};
use crate::iterm::{Derivation, Profile};

pub const OUTPUT_FILE: &str = "CodeDevProfiles.json";

const TAGS: &[&str] = &["standalone", "code-dev"];

/// Options for the standalone command
#[derive(Debug, Clone)]
pub struct StandaloneOptions {
    /// Scheme arguments (recommended list when empty)
    pub schemes: Vec<String>,
    /// Profile the dynamic profiles inherit from
    pub parent: String,
    /// Font override
    pub font: Option<String>,
    pub dry_run: bool,
}

fn tags() -> Value {
    Value::Array(TAGS.iter().map(|tag| Value::from(*tag)).collect())
}

/// Build one tagged, badged dynamic profile per scheme
pub fn build_standalone(
    schemes: &[SchemeRef],
    scheme_dir: &Path,
    parent: &str,
    settings: &StandardSettings,
) -> Result<(Vec<Profile>, BatchReport)> {
    utils::require_dir(scheme_dir, "Schemes directory")?;
    let template = dynamic_template(parent);
    let fields = settings.to_fields();

    Ok(utils::build_from_schemes(schemes, scheme_dir, |scheme_ref, scheme| {
        let name = scheme_ref.profile_name.as_str();
        Derivation::new()
            .force_all(&fields)
            .force("Tags", tags())
            .force("Badge Text", name)
            .force("Silence Bell", true)
            .derive(&template, name, scheme.colors())
    }))
}

/// Execute the standalone command
pub fn execute(paths: &Paths, options: StandaloneOptions) -> Result<()> {
    println!("Creating standalone coding profiles...\n");

    let scheme_dir = paths.scheme_dir_or(config::downloaded_schemes_dir)?;
    let output = paths.output_path_or(OUTPUT_FILE)?;
    let schemes = catalog::resolve(&options.schemes, catalog::recommended);
    let settings = StandardSettings::with_font(options.font);

    let (profiles, report) =
        build_standalone(&schemes, &scheme_dir, &options.parent, &settings)?;

    for profile in &profiles {
        let hex = profile
            .background()
            .map(|color| color.to_hex())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} {} (background {})",
            "✓".green(),
            profile.display_name(),
            hex
        );
    }

    utils::commit_dynamic(&output, &profiles, options.dry_run)?;

    if !report.failed.is_empty() {
        println!("\n{} Missing schemes:", "Warning:".yellow());
        for failure in &report.failed {
            println!("  - {}: {}", failure.name, failure.error);
        }
    }

    utils::print_next_steps(&[
        "Open Settings → Profiles and filter by the 'code-dev' tag",
        "Pick a profile per window; nothing switches automatically",
    ]);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plist::Dictionary;

    #[test]
    fn test_standalone_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut color = Dictionary::new();
        color.insert("Blue Component".to_string(), Value::Real(1.0));
        let mut colors = Dictionary::new();
        colors.insert("Background Color".to_string(), Value::Dictionary(color));
        Value::Dictionary(colors)
            .to_file_xml(dir.path().join("Snazzy.itermcolors"))
            .unwrap();

        let (profiles, report) = build_standalone(
            &[
                SchemeRef::new("Snazzy", "Snazzy"),
                SchemeRef::new("Ghost", "Ghost"),
            ],
            dir.path(),
            "Default",
            &StandardSettings::default(),
        )
        .unwrap();

        assert_eq!(profiles.len(), 1);
        assert_eq!(report.failed.len(), 1);

        let snazzy = &profiles[0];
        assert_eq!(snazzy.get("Tags"), Some(&tags()));
        assert_eq!(
            snazzy.get("Badge Text").and_then(Value::as_string),
            Some("Snazzy")
        );
        assert_eq!(
            snazzy.get("Silence Bell").and_then(Value::as_boolean),
            Some(true)
        );
        assert!(!snazzy.contains_key("Automatic Profile Switching"));
        assert_eq!(snazzy.background().unwrap().to_hex(), "#0000ff");
    }
}
