//! Platform-specific configuration and paths

use anyhow::{Context, Result};
use plist::{Dictionary, Value};
use std::path::PathBuf;

/// Preferences domain of iTerm2
pub const ITERM_DOMAIN: &str = "com.googlecode.iterm2";

/// Get the iTerm2 preference file
/// - ~/Library/Preferences/com.googlecode.iterm2.plist
pub fn preferences_plist() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home
        .join("Library")
        .join("Preferences")
        .join(format!("{}.plist", ITERM_DOMAIN)))
}

/// Get the iTerm2 application support directory
/// - ~/Library/Application Support/iTerm2/
pub fn iterm_support_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home
        .join("Library")
        .join("Application Support")
        .join("iTerm2"))
}

/// Get the dynamic profiles directory
/// - ~/Library/Application Support/iTerm2/DynamicProfiles/
pub fn dynamic_profiles_dir() -> Result<PathBuf> {
    Ok(iterm_support_dir()?.join("DynamicProfiles"))
}

/// Get the directory of color presets imported into iTerm2
/// - ~/Library/Application Support/iTerm2/ColorPresets/
pub fn color_presets_dir() -> Result<PathBuf> {
    Ok(iterm_support_dir()?.join("ColorPresets"))
}

/// Get the unpacked iTerm2-Color-Schemes download
/// - ~/Downloads/iTerm2-Color-Schemes-master/schemes/
pub fn downloaded_schemes_dir() -> Result<PathBuf> {
    let downloads = match dirs::download_dir() {
        Some(dir) => dir,
        None => dirs::home_dir()
            .context("Could not determine home directory")?
            .join("Downloads"),
    };
    Ok(downloads
        .join("iTerm2-Color-Schemes-master")
        .join("schemes"))
}

/// Get the directory holding repositories bound to profiles
/// - ~/work/repo/
pub fn default_repo_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join("work").join("repo"))
}

/// Explicit path overrides, resolved against platform defaults on use
#[derive(Debug, Clone, Default)]
pub struct Paths {
    pub store_path: Option<PathBuf>,
    pub scheme_dir: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
}

impl Paths {
    /// Preference store, defaulting to the iTerm2 plist
    pub fn store_path(&self) -> Result<PathBuf> {
        match &self.store_path {
            Some(path) => Ok(path.clone()),
            None => preferences_plist(),
        }
    }

    /// Scheme directory, defaulting to `default`
    pub fn scheme_dir_or(&self, default: fn() -> Result<PathBuf>) -> Result<PathBuf> {
        match &self.scheme_dir {
            Some(dir) => Ok(dir.clone()),
            None => default(),
        }
    }

    /// Dynamic profiles file, defaulting to `file_name` in the DynamicProfiles dir
    pub fn output_path_or(&self, file_name: &str) -> Result<PathBuf> {
        match &self.output_path {
            Some(path) => Ok(path.clone()),
            None => Ok(dynamic_profiles_dir()?.join(file_name)),
        }
    }
}

/// Settings forced onto every profile built from a scheme
#[derive(Debug, Clone, PartialEq)]
pub struct StandardSettings {
    pub font: String,
    pub scrollback_lines: i64,
    pub unlimited_scrollback: bool,
    pub terminal_type: String,
    pub use_bold_font: bool,
    pub use_bright_bold: bool,
    pub use_italic_font: bool,
    pub visual_bell: bool,
}

impl Default for StandardSettings {
    fn default() -> Self {
        Self {
            font: "JetBrainsMono-Regular 13".to_string(),
            scrollback_lines: 100_000,
            unlimited_scrollback: false,
            terminal_type: "xterm-256color".to_string(),
            use_bold_font: true,
            use_bright_bold: true,
            use_italic_font: true,
            visual_bell: true,
        }
    }
}

impl StandardSettings {
    /// Defaults with an optional font override
    pub fn with_font(font: Option<String>) -> Self {
        let mut settings = Self::default();
        if let Some(font) = font {
            settings.font = font;
        }
        settings
    }

    /// The profile fields these settings map to
    pub fn to_fields(&self) -> Dictionary {
        let mut fields = Dictionary::new();
        fields.insert("Normal Font".to_string(), Value::from(self.font.as_str()));
        fields.insert(
            "Scrollback Lines".to_string(),
            Value::from(self.scrollback_lines),
        );
        fields.insert(
            "Unlimited Scrollback".to_string(),
            Value::from(self.unlimited_scrollback),
        );
        fields.insert(
            "Terminal Type".to_string(),
            Value::from(self.terminal_type.as_str()),
        );
        fields.insert("Use Bold Font".to_string(), Value::from(self.use_bold_font));
        fields.insert(
            "Use Bright Bold".to_string(),
            Value::from(self.use_bright_bold),
        );
        fields.insert(
            "Use Italic Font".to_string(),
            Value::from(self.use_italic_font),
        );
        fields.insert("Visual Bell".to_string(), Value::from(self.visual_bell));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_exist() {
        // These should not panic
        let _ = preferences_plist();
        let _ = dynamic_profiles_dir();
        let _ = color_presets_dir();
        let _ = downloaded_schemes_dir();
        let _ = default_repo_dir();
    }

    #[test]
    fn test_preferences_plist_name() {
        if let Ok(path) = preferences_plist() {
            assert!(path.ends_with("Library/Preferences/com.googlecode.iterm2.plist"));
        }
    }

    #[test]
    fn test_overrides_win() {
        let paths = Paths {
            store_path: Some(PathBuf::from("/tmp/prefs.plist")),
            scheme_dir: Some(PathBuf::from("/tmp/schemes")),
            output_path: Some(PathBuf::from("/tmp/out.json")),
        };

        assert_eq!(paths.store_path().unwrap(), PathBuf::from("/tmp/prefs.plist"));
        assert_eq!(
            paths.scheme_dir_or(color_presets_dir).unwrap(),
            PathBuf::from("/tmp/schemes")
        );
        assert_eq!(
            paths.output_path_or("ColorProfiles.json").unwrap(),
            PathBuf::from("/tmp/out.json")
        );
    }

    #[test]
    fn test_output_default_file_name() {
        if let Ok(path) = Paths::default().output_path_or("RepoProfiles.json") {
            assert!(path.ends_with("DynamicProfiles/RepoProfiles.json"));
        }
    }

    #[test]
    fn test_standard_settings_fields() {
        let fields = StandardSettings::with_font(Some("Menlo 14".to_string())).to_fields();
        assert_eq!(fields.len(), 8);
        assert_eq!(
            fields.get("Normal Font").and_then(Value::as_string),
            Some("Menlo 14")
        );
        assert_eq!(
            fields
                .get("Scrollback Lines")
                .and_then(Value::as_signed_integer),
            Some(100_000)
        );
        assert_eq!(
            fields.get("Unlimited Scrollback").and_then(Value::as_boolean),
            Some(false)
        );
    }
}
