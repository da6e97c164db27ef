//! Color scheme sources (`.itermcolors` files)

use plist::{Dictionary, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::color;

pub const SCHEME_EXTENSION: &str = "itermcolors";

/// Failure scoped to a single scheme
///
/// These are reported per name; the rest of the batch keeps going.
#[derive(Debug, Error)]
pub enum SchemeError {
    #[error("scheme file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to parse {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: plist::Error,
    },

    #[error("{} does not contain a color dictionary", .0.display())]
    NotADictionary(PathBuf),
}

/// A named palette loaded from disk. Read-only.
#[derive(Debug, Clone)]
pub struct ColorScheme {
    path: PathBuf,
    colors: Dictionary,
}

impl ColorScheme {
    /// Load a scheme file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SchemeError> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(SchemeError::Missing(path.to_path_buf()));
        }

        let value = Value::from_file(path).map_err(|source| SchemeError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

        let colors = value
            .into_dictionary()
            .ok_or_else(|| SchemeError::NotADictionary(path.to_path_buf()))?;

        tracing::debug!("Loaded {} entries from {}", colors.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            colors,
        })
    }

    /// Build a scheme from an in-memory dictionary
    pub fn from_dictionary(path: impl Into<PathBuf>, colors: Dictionary) -> Self {
        Self {
            path: path.into(),
            colors,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw scheme entries, used as color overrides
    pub fn colors(&self) -> &Dictionary {
        &self.colors
    }

    /// Number of entries that are color fields
    pub fn color_count(&self) -> usize {
        self.colors
            .keys()
            .filter(|key| color::is_color_field(key))
            .count()
    }
}

/// Path of a scheme file inside a scheme directory
pub fn scheme_path(scheme_dir: &Path, file_stem: &str) -> PathBuf {
    scheme_dir.join(format!("{}.{}", file_stem, SCHEME_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iterm::color::{BLUE_COMPONENT, GREEN_COMPONENT, RED_COMPONENT};
    use std::fs;

    fn write_scheme(dir: &Path, stem: &str) -> PathBuf {
        let mut bg = Dictionary::new();
        bg.insert(RED_COMPONENT.to_string(), Value::Real(0.18));
        bg.insert(GREEN_COMPONENT.to_string(), Value::Real(0.2));
        bg.insert(BLUE_COMPONENT.to_string(), Value::Real(0.25));

        let mut colors = Dictionary::new();
        colors.insert("Background Color".to_string(), Value::Dictionary(bg));
        colors.insert("Ansi 0 Color".to_string(), Value::Dictionary(Dictionary::new()));

        let path = scheme_path(dir, stem);
        Value::Dictionary(colors).to_file_xml(&path).unwrap();
        path
    }

    #[test]
    fn test_scheme_path() {
        assert_eq!(
            scheme_path(Path::new("/schemes"), "Gruvbox Dark"),
            PathBuf::from("/schemes/Gruvbox Dark.itermcolors")
        );
    }

    #[test]
    fn test_load_scheme() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_scheme(dir.path(), "Nord");

        let scheme = ColorScheme::load(&path).unwrap();
        assert_eq!(scheme.path(), path.as_path());
        assert_eq!(scheme.color_count(), 2);
        assert!(scheme.colors().contains_key("Background Color"));
    }

    #[test]
    fn test_load_missing_scheme() {
        let dir = tempfile::tempdir().unwrap();
        let err = ColorScheme::load(dir.path().join("Nope.itermcolors")).unwrap_err();
        assert!(matches!(err, SchemeError::Missing(_)));
        assert!(err.to_string().contains("Nope.itermcolors"));
    }

    #[test]
    fn test_load_malformed_scheme() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Broken.itermcolors");
        fs::write(
            &path,
            r#"<?xml version="1.0"?><plist version="1.0"><dict><key>Broken"#,
        )
        .unwrap();

        let err = ColorScheme::load(&path).unwrap_err();
        assert!(matches!(err, SchemeError::Malformed { .. }));
    }

    #[test]
    fn test_load_non_dictionary_scheme() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Array.itermcolors");
        Value::Array(vec![Value::Boolean(true)])
            .to_file_xml(&path)
            .unwrap();

        let err = ColorScheme::load(&path).unwrap_err();
        assert!(matches!(err, SchemeError::NotADictionary(_)));
    }
}
