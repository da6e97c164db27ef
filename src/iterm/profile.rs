//! Profile records and the merge operation that derives new ones
//!
//! A profile is an ordered dictionary of iTerm2 settings. New profiles are
//! never built field by field: they are derived from a base record (the
//! store's `Default` profile, or a fixed template for dynamic profiles) by
//! [`Derivation::derive`].

use plist::{Dictionary, Value};
use uuid::Uuid;

use super::color;

pub const NAME_KEY: &str = "Name";
pub const GUID_KEY: &str = "Guid";
pub const COLOR_PRESET_KEY: &str = "Color Preset Name";
pub const CUSTOM_COMMAND_KEY: &str = "Custom Command";
pub const DYNAMIC_PARENT_KEY: &str = "Dynamic Profile Parent Name";

/// Name used when a record has no `Name` field
pub const UNNAMED: &str = "Unnamed";

/// Keys that only make sense on dynamic profiles
///
/// Directory bindings and switching rules point at the dynamic profile's
/// identity and must not survive conversion into a regular profile.
pub const DYNAMIC_ONLY_KEYS: &[&str] = &[
    "Dynamic Profile Parent Name",
    "Dynamic Profile Filename",
    "Automatic Profile Switching",
    "Custom Directory",
    "Working Directory",
    "Bound Hosts",
    "Tags",
    "Badge Text",
];

/// Generate a fresh profile identifier
pub fn new_guid() -> String {
    Uuid::new_v4().to_string()
}

/// A single iTerm2 profile
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    fields: Dictionary,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dictionary(fields: Dictionary) -> Self {
        Self { fields }
    }

    /// Wrap a plist value, if it is a dictionary
    pub fn from_value(value: Value) -> Option<Self> {
        value.into_dictionary().map(Self::from_dictionary)
    }

    pub fn as_dictionary(&self) -> &Dictionary {
        &self.fields
    }

    pub fn into_dictionary(self) -> Dictionary {
        self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Dictionary(self.fields)
    }

    pub fn name(&self) -> Option<&str> {
        self.get(NAME_KEY).and_then(Value::as_string)
    }

    /// Name for display and duplicate checks
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or(UNNAMED)
    }

    pub fn guid(&self) -> Option<&str> {
        self.get(GUID_KEY).and_then(Value::as_string)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Remove a field, keeping the order of the others
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let value = self.fields.get(key).cloned()?;
        self.fields = without_keys(std::mem::take(&mut self.fields), &[key]);
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate over the color fields of this profile
    pub fn color_fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .filter(|(key, _)| color::is_color_field(key))
            .map(|(key, value)| (key.as_str(), value))
    }

    /// Split into a color-free profile and its color fields
    pub fn split_colors(self) -> (Profile, Dictionary) {
        let mut base = Dictionary::new();
        let mut colors = Dictionary::new();

        for (key, value) in self.fields {
            if color::is_color_field(&key) {
                colors.insert(key, value);
            } else {
                base.insert(key, value);
            }
        }

        (Profile::from_dictionary(base), colors)
    }

    /// Parsed background color, if present and well-formed
    pub fn background(&self) -> Option<color::Color> {
        self.get("Background Color").and_then(color::Color::from_value)
    }
}

/// Drop `keys` from `fields` without reordering the rest
fn without_keys<S: AsRef<str>>(fields: Dictionary, keys: &[S]) -> Dictionary {
    fields
        .into_iter()
        .filter(|(key, _)| !keys.iter().any(|k| k.as_ref() == key.as_str()))
        .collect()
}

impl From<Dictionary> for Profile {
    fn from(fields: Dictionary) -> Self {
        Self::from_dictionary(fields)
    }
}

/// Recipe for deriving new profiles from a base record
///
/// Applied in this order:
/// 1. copy the base
/// 2. assign the new name and a fresh `Guid`
/// 3. overwrite the forced fields
/// 4. write normalized color overrides (malformed colors are skipped)
/// 5. fill defaults for fields that are still missing
/// 6. remove excluded fields
///
/// Exclusion runs last, so an excluded key never survives even if the base,
/// the overrides, or the forced fields carry it. `Name` and `Guid` cannot be
/// excluded.
#[derive(Debug, Clone, Default)]
pub struct Derivation {
    exclude: Vec<String>,
    force: Dictionary,
    defaults: Dictionary,
}

impl Derivation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove these keys from every derived profile
    pub fn exclude<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(
            keys.into_iter()
                .map(Into::into)
                .filter(|key| key != NAME_KEY && key != GUID_KEY),
        );
        self
    }

    /// Always set `key` to `value`
    pub fn force(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.force.insert(key.into(), value.into());
        self
    }

    /// Always set every field in `fields`
    pub fn force_all(mut self, fields: &Dictionary) -> Self {
        for (key, value) in fields {
            self.force.insert(key.clone(), value.clone());
        }
        self
    }

    /// Set `key` to `value` only when the derived profile lacks it
    pub fn default_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    /// Derive a new profile named `name` from `base`
    ///
    /// Only the color fields of `overrides` are applied. The result always
    /// carries a newly generated `Guid`.
    pub fn derive(&self, base: &Profile, name: &str, overrides: &Dictionary) -> Profile {
        let mut fields = base.fields.clone();

        fields.insert(NAME_KEY.to_string(), Value::String(name.to_string()));
        fields.insert(GUID_KEY.to_string(), Value::String(new_guid()));

        for (key, value) in &self.force {
            fields.insert(key.clone(), value.clone());
        }

        for (key, value) in overrides {
            if !color::is_color_field(key) {
                continue;
            }
            match color::normalize(value) {
                Some(normalized) => {
                    fields.insert(key.clone(), normalized);
                }
                None => {
                    tracing::debug!("Skipping malformed color '{}' for '{}'", key, name);
                }
            }
        }

        for (key, value) in &self.defaults {
            if !fields.contains_key(key) {
                fields.insert(key.clone(), value.clone());
            }
        }

        Profile::from_dictionary(without_keys(fields, &self.exclude))
    }
}
