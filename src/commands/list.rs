//! List command - Show profiles in the preference store or a dynamic profiles file

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use std::path::PathBuf;

use crate::config::Paths;
use crate::iterm::profile::COLOR_PRESET_KEY;
use crate::iterm::{dynamic, PreferenceStore, Profile};

/// One line of the profile table
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRow {
    pub name: String,
    pub guid: Option<String>,
    /// `Color Preset Name`, if set
    pub preset: Option<String>,
    /// Number of color fields
    pub colors: usize,
    /// Background as `#rrggbb`
    pub background: Option<String>,
    /// Whether this is the profile new ones are copied from
    pub is_template: bool,
}

impl ProfileRow {
    pub fn from_profile(profile: &Profile, template: &str) -> Self {
        let name = profile.display_name().to_string();
        Self {
            is_template: name == template,
            name,
            guid: profile.guid().map(str::to_string),
            preset: profile
                .get(COLOR_PRESET_KEY)
                .and_then(|v| v.as_string())
                .map(str::to_string),
            colors: profile.color_fields().count(),
            background: profile.background().map(|c| c.to_hex()),
        }
    }
}

/// Options for the list command
#[derive(Debug, Clone)]
pub struct ListOptions {
    /// List this dynamic profiles file instead of the store
    pub dynamic: Option<PathBuf>,
    /// Show the Guid of each profile
    pub with_id: bool,
    /// Only show profiles whose name contains this pattern
    pub filter: Option<String>,
    /// Profile marked as the template
    pub template: String,
}

/// Build table rows, filtered by name
pub fn rows(profiles: &[Profile], template: &str, filter: Option<&str>) -> Vec<ProfileRow> {
    let filter = filter.map(str::to_lowercase);
    profiles
        .iter()
        .map(|profile| ProfileRow::from_profile(profile, template))
        .filter(|row| match &filter {
            Some(pattern) => row.name.to_lowercase().contains(pattern.as_str()),
            None => true,
        })
        .collect()
}

/// Execute the list command and return formatted output
pub fn execute(paths: &Paths, options: ListOptions) -> Result<String> {
    let (source, profiles) = match &options.dynamic {
        Some(path) => (path.clone(), dynamic::load(path)?),
        None => {
            let path = paths.store_path()?;
            let store = PreferenceStore::load(&path)?;
            (path, store.profiles().to_vec())
        }
    };

    let rows = rows(&profiles, &options.template, options.filter.as_deref());

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![Cell::new("Name")];
    if options.with_id {
        header.push(Cell::new("Guid"));
    }
    header.push(Cell::new("Preset"));
    header.push(Cell::new("Colors"));
    header.push(Cell::new("Background"));
    table.set_header(header);

    for row in &rows {
        let name = if row.is_template {
            format!("{} *", row.name)
        } else {
            row.name.clone()
        };

        let mut cells = vec![Cell::new(name)];
        if options.with_id {
            cells.push(Cell::new(row.guid.as_deref().unwrap_or("-")));
        }
        cells.push(Cell::new(row.preset.as_deref().unwrap_or("-")));
        cells.push(Cell::new(row.colors));
        cells.push(Cell::new(row.background.as_deref().unwrap_or("-")));
        table.add_row(cells);
    }

    let mut output = table.to_string();
    if rows.len() < profiles.len() {
        output.push_str(&format!(
            "\n\nShowing {} of {} profiles in {}",
            rows.len(),
            profiles.len(),
            source.display()
        ));
    } else {
        output.push_str(&format!(
            "\n\n{} profiles in {}",
            profiles.len(),
            source.display()
        ));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plist::{Dictionary, Value};

    fn profile(name: &str) -> Profile {
        let mut background = Dictionary::new();
        background.insert("Red Component".to_string(), Value::Real(1.0));

        let mut p = Profile::new();
        p.insert("Name", name);
        p.insert("Guid", format!("{}-guid", name));
        p.insert("Background Color", Value::Dictionary(background));
        p.insert("Ansi 1 Color", Value::Dictionary(Dictionary::new()));
        p
    }

    #[test]
    fn test_row_from_profile() {
        let mut nord = profile("Nord");
        nord.insert("Color Preset Name", "Nord");

        let row = ProfileRow::from_profile(&nord, "Default");
        assert_eq!(row.name, "Nord");
        assert_eq!(row.guid.as_deref(), Some("Nord-guid"));
        assert_eq!(row.preset.as_deref(), Some("Nord"));
        assert_eq!(row.colors, 2);
        assert_eq!(row.background.as_deref(), Some("#ff0000"));
        assert!(!row.is_template);
    }

    #[test]
    fn test_rows_filter_and_template() {
        let profiles = vec![profile("Default"), profile("Nord"), profile("Nord Light")];

        let all = rows(&profiles, "Default", None);
        assert_eq!(all.len(), 3);
        assert!(all[0].is_template);

        let filtered = rows(&profiles, "Default", Some("nord"));
        let names: Vec<&str> = filtered.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Nord", "Nord Light"]);
    }

    #[test]
    fn test_execute_dynamic_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Profiles.json");
        dynamic::save(&path, &[profile("Nord")]).unwrap();

        let options = ListOptions {
            dynamic: Some(path),
            with_id: true,
            filter: None,
            template: "Default".to_string(),
        };
        let output = execute(&Paths::default(), options).unwrap();

        assert!(output.contains("Nord-guid"));
        assert!(output.contains("1 profiles in"));
    }
}
