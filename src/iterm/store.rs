//! iTerm2 preference store
//!
//! Handles `~/Library/Preferences/com.googlecode.iterm2.plist`. Saved
//! profiles live in the `New Bookmarks` array; every other top-level key is
//! carried through untouched.

use anyhow::{Context, Result};
use plist::{Dictionary, Value};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

use super::profile::Profile;

/// Top-level key holding the saved profiles
pub const BOOKMARKS_KEY: &str = "New Bookmarks";

const BINARY_MAGIC: &[u8] = b"bplist";

/// On-disk encoding of a property list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlistFormat {
    Binary,
    Xml,
}

impl PlistFormat {
    /// Sniff the format from the leading bytes
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(BINARY_MAGIC) {
            Self::Binary
        } else {
            Self::Xml
        }
    }
}

/// Structural problems with a preference document
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("preference file is not a dictionary")]
    NotADictionary,

    #[error("'New Bookmarks' is not an array")]
    BookmarksNotArray,

    #[error("'New Bookmarks' entry {0} is not a dictionary")]
    MalformedProfile(usize),
}

/// The loaded preference document
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    format: PlistFormat,
    root: Dictionary,
    profiles: Vec<Profile>,
}

impl PreferenceStore {
    /// Read the preference file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let bytes =
            fs::read(path).with_context(|| format!("Failed to read: {}", path.display()))?;
        let format = PlistFormat::detect(&bytes);

        let value = Value::from_reader(Cursor::new(bytes))
            .with_context(|| format!("Failed to parse: {}", path.display()))?;

        let store = Self::from_value(path, format, value)
            .with_context(|| format!("Unexpected layout in: {}", path.display()))?;

        tracing::info!(
            "Loaded {} profiles from {} ({:?})",
            store.profiles.len(),
            path.display(),
            format
        );
        Ok(store)
    }

    /// Build a store from an already-parsed document
    pub fn from_value(
        path: impl Into<PathBuf>,
        format: PlistFormat,
        value: Value,
    ) -> Result<Self, StoreError> {
        let mut root = value.into_dictionary().ok_or(StoreError::NotADictionary)?;

        // The bookmarks slot stays in `root` so `to_value` writes it back in place
        let profiles = match root.get_mut(BOOKMARKS_KEY) {
            None => Vec::new(),
            Some(Value::Array(entries)) => std::mem::take(entries)
                .into_iter()
                .enumerate()
                .map(|(i, entry)| {
                    Profile::from_value(entry).ok_or(StoreError::MalformedProfile(i))
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(StoreError::BookmarksNotArray),
        };

        Ok(Self {
            path: path.into(),
            format,
            root,
            profiles,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> PlistFormat {
        self.format
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Names of all saved profiles
    pub fn names(&self) -> HashSet<&str> {
        self.profiles.iter().map(Profile::display_name).collect()
    }

    /// Find the first profile with the given name
    pub fn find(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name() == Some(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Append a profile. Callers check [`contains`](Self::contains) first.
    pub fn push(&mut self, profile: Profile) {
        self.profiles.push(profile);
    }

    /// Rebuild the full document, keeping the original key order
    pub fn to_value(&self) -> Value {
        let mut root = self.root.clone();
        root.insert(
            BOOKMARKS_KEY.to_string(),
            Value::Array(
                self.profiles
                    .iter()
                    .cloned()
                    .map(Profile::into_value)
                    .collect(),
            ),
        );
        Value::Dictionary(root)
    }

    /// Persist the store in its original format
    ///
    /// The document is written to a temporary file next to the target and
    /// renamed over it, so the previous file survives any failure.
    pub fn save(&self) -> Result<()> {
        let value = self.to_value();
        let format = self.format;

        write_atomically(&self.path, |file| {
            let encoded = match format {
                PlistFormat::Binary => value.to_writer_binary(file),
                PlistFormat::Xml => value.to_writer_xml(file),
            };
            encoded.context("Failed to encode preferences")
        })?;

        tracing::info!(
            "Saved {} profiles to {}",
            self.profiles.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Copy the current on-disk file to a timestamped `.bak` next to it
    pub fn backup(&self) -> Result<PathBuf> {
        let file_name = self
            .path
            .file_name()
            .context("Preference path has no file name")?
            .to_string_lossy();
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let backup_path = self
            .path
            .with_file_name(format!("{}.{}.bak", file_name, stamp));

        fs::copy(&self.path, &backup_path).with_context(|| {
            format!(
                "Failed to back up {} to {}",
                self.path.display(),
                backup_path.display()
            )
        })?;

        Ok(backup_path)
    }
}

/// Write a file through a temporary sibling and an atomic rename
///
/// A symlinked target is written through: the link is resolved and the
/// file it points at is replaced. An existing file keeps its permissions.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let existing = fs::metadata(path).ok();
    let target = match existing {
        Some(_) => fs::canonicalize(path)
            .with_context(|| format!("Failed to resolve: {}", path.display()))?,
        None => path.to_path_buf(),
    };

    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in: {}", dir.display()))?;

    write(tmp.as_file_mut())?;
    if let Some(metadata) = existing {
        tmp.as_file()
            .set_permissions(metadata.permissions())
            .with_context(|| format!("Failed to set permissions: {}", tmp.path().display()))?;
    }
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("Failed to flush: {}", tmp.path().display()))?;

    tmp.persist(&target)
        .with_context(|| format!("Failed to write: {}", target.display()))?;
    Ok(())
}
