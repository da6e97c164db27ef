//! Dynamic profiles
//!
//! iTerm2 reloads JSON files from
//! `~/Library/Application Support/iTerm2/DynamicProfiles/` without a restart.
//! Each file has the shape `{"Profiles": [ {...}, {...} ]}`.
//!
//! Profiles are kept as plist dictionaries everywhere else, so values are
//! converted at this boundary.

use anyhow::{Context, Result};
use plist::{Dictionary, Value as PlistValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as JsonValue};
use std::fs;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

use super::profile::Profile;
use super::store::write_atomically;

/// Conversion failures between JSON and plist values
#[derive(Debug, Error, PartialEq)]
pub enum ConversionError {
    #[error("null is not representable in a property list (at {0})")]
    Null(String),

    #[error("{kind} values cannot be written to JSON (at {path})")]
    Unsupported { kind: &'static str, path: String },

    #[error("non-finite number cannot be written to JSON (at {0})")]
    NonFinite(String),
}

/// The on-disk envelope
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DynamicProfilesFile {
    #[serde(rename = "Profiles", default)]
    pub profiles: Vec<JsonValue>,
}

/// Read all profiles from a dynamic profiles file
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Profile>> {
    let path = path.as_ref();

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read: {}", path.display()))?;
    let file: DynamicProfilesFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse: {}", path.display()))?;

    let profiles = file
        .profiles
        .iter()
        .enumerate()
        .map(|(i, entry)| -> Result<Profile> {
            let location = format!("Profiles[{}]", i);
            match json_to_plist(entry, &location)? {
                PlistValue::Dictionary(fields) => Ok(Profile::from_dictionary(fields)),
                _ => anyhow::bail!("{} is not an object", location),
            }
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("Invalid profile in: {}", path.display()))?;

    tracing::info!("Loaded {} dynamic profiles from {}", profiles.len(), path.display());
    Ok(profiles)
}

/// Write profiles as a dynamic profiles file, replacing it
///
/// Parent directories are created as needed.
pub fn save<P: AsRef<Path>>(path: P, profiles: &[Profile]) -> Result<()> {
    let path = path.as_ref();

    let file = to_file(profiles)?;
    let json = serde_json::to_string_pretty(&file)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create: {}", parent.display()))?;
    }

    write_atomically(path, |out| {
        out.write_all(json.as_bytes())
            .context("Failed to write dynamic profiles")
    })?;

    tracing::info!("Wrote {} dynamic profiles to {}", profiles.len(), path.display());
    Ok(())
}

/// Build the JSON envelope for a set of profiles
pub fn to_file(profiles: &[Profile]) -> Result<DynamicProfilesFile> {
    let profiles = profiles
        .iter()
        .map(|profile| {
            let location = format!("'{}'", profile.display_name());
            dictionary_to_json(profile.as_dictionary(), &location)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DynamicProfilesFile { profiles })
}

/// Convert a JSON value into a plist value
///
/// Integers stay integers and other numbers become reals. `null` has no
/// plist counterpart and is rejected.
pub fn json_to_plist(value: &JsonValue, path: &str) -> Result<PlistValue, ConversionError> {
    Ok(match value {
        JsonValue::Null => return Err(ConversionError::Null(path.to_string())),
        JsonValue::Bool(b) => PlistValue::Boolean(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                PlistValue::Integer(i.into())
            } else if let Some(u) = n.as_u64() {
                PlistValue::Integer(u.into())
            } else {
                PlistValue::Real(n.as_f64().unwrap_or_default())
            }
        }
        JsonValue::String(s) => PlistValue::String(s.clone()),
        JsonValue::Array(items) => PlistValue::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| json_to_plist(item, &format!("{}[{}]", path, i)))
                .collect::<Result<_, _>>()?,
        ),
        JsonValue::Object(map) => {
            let mut dict = Dictionary::new();
            for (key, item) in map {
                dict.insert(
                    key.clone(),
                    json_to_plist(item, &format!("{}.{}", path, key))?,
                );
            }
            PlistValue::Dictionary(dict)
        }
    })
}

/// Convert a plist value into a JSON value
///
/// Dates, binary data and UIDs have no JSON form and are rejected.
pub fn plist_to_json(value: &PlistValue, path: &str) -> Result<JsonValue, ConversionError> {
    Ok(match value {
        PlistValue::Boolean(b) => JsonValue::Bool(*b),
        PlistValue::Integer(i) => match (i.as_signed(), i.as_unsigned()) {
            (Some(v), _) => JsonValue::from(v),
            (None, Some(v)) => JsonValue::from(v),
            (None, None) => return Err(ConversionError::NonFinite(path.to_string())),
        },
        PlistValue::Real(r) => Number::from_f64(*r)
            .map(JsonValue::Number)
            .ok_or_else(|| ConversionError::NonFinite(path.to_string()))?,
        PlistValue::String(s) => JsonValue::String(s.clone()),
        PlistValue::Array(items) => JsonValue::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| plist_to_json(item, &format!("{}[{}]", path, i)))
                .collect::<Result<_, _>>()?,
        ),
        PlistValue::Dictionary(dict) => dictionary_to_json(dict, path)?,
        PlistValue::Date(_) => return Err(unsupported("date", path)),
        PlistValue::Data(_) => return Err(unsupported("data", path)),
        PlistValue::Uid(_) => return Err(unsupported("uid", path)),
        _ => return Err(unsupported("unknown", path)),
    })
}

fn dictionary_to_json(dict: &Dictionary, path: &str) -> Result<JsonValue, ConversionError> {
    let mut map = Map::new();
    for (key, item) in dict {
        map.insert(key.clone(), plist_to_json(item, &format!("{}.{}", path, key))?);
    }
    Ok(JsonValue::Object(map))
}

fn unsupported(kind: &'static str, path: &str) -> ConversionError {
    ConversionError::Unsupported {
        kind,
        path: path.to_string(),
    }
}
