//! Color fields and color component normalization
//!
//! iTerm2 stores each color as a dictionary of components:
//!
//! ```text
//! <key>Background Color</key>
//! <dict>
//!     <key>Red Component</key>   <real>0.156</real>
//!     <key>Green Component</key> <real>0.164</real>
//!     <key>Blue Component</key>  <real>0.211</real>
//!     <key>Alpha Component</key> <real>1</real>
//!     <key>Color Space</key>     <string>sRGB</string>
//! </dict>
//! ```

use plist::{Dictionary, Value};

pub const RED_COMPONENT: &str = "Red Component";
pub const GREEN_COMPONENT: &str = "Green Component";
pub const BLUE_COMPONENT: &str = "Blue Component";
pub const ALPHA_COMPONENT: &str = "Alpha Component";
pub const COLOR_SPACE: &str = "Color Space";

/// Number of ANSI palette entries (`Ansi 0 Color` .. `Ansi 15 Color`)
pub const ANSI_COLOR_COUNT: u8 = 16;

/// Non-ANSI color fields understood by iTerm2
const NAMED_COLOR_FIELDS: &[&str] = &[
    "Foreground Color",
    "Background Color",
    "Bold Color",
    "Link Color",
    "Cursor Color",
    "Cursor Text Color",
    "Cursor Guide Color",
    "Selection Color",
    "Selected Text Color",
    "Badge Color",
    "Tab Color",
    "Underline Color",
    "Match Background Color",
];

/// Appearance-specific variants written by newer iTerm2 versions
const APPEARANCE_SUFFIXES: &[&str] = &[" (Light)", " (Dark)"];

/// Check whether a profile field name holds a color value
///
/// Accepts the ANSI palette entries, the named color fields, and their
/// ` (Light)` / ` (Dark)` variants. Fields that merely mention "Color"
/// (e.g. `Color Preset Name`) are not color fields.
pub fn is_color_field(name: &str) -> bool {
    let base = APPEARANCE_SUFFIXES
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .unwrap_or(name);

    NAMED_COLOR_FIELDS.contains(&base) || ansi_index(base).is_some()
}

/// Parse `Ansi <n> Color` into its palette index
fn ansi_index(name: &str) -> Option<u8> {
    let digits = name.strip_prefix("Ansi ")?.strip_suffix(" Color")?;

    // Reject "Ansi 01 Color" and friends
    if digits.is_empty() || (digits.len() > 1 && digits.starts_with('0')) {
        return None;
    }

    digits
        .parse::<u8>()
        .ok()
        .filter(|index| *index < ANSI_COLOR_COUNT)
}

/// All color field names for the ANSI palette
pub fn ansi_color_fields() -> impl Iterator<Item = String> {
    (0..ANSI_COLOR_COUNT).map(|i| format!("Ansi {} Color", i))
}

/// A color projected onto the recognized component keys
#[derive(Debug, Clone, PartialEq)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: Option<f64>,
    pub color_space: Option<String>,
}

impl Color {
    /// Project a raw color value onto the component keys
    ///
    /// Missing RGB components default to 0.0. Returns `None` when the value is
    /// not a dictionary or a present component has the wrong type.
    pub fn from_value(value: &Value) -> Option<Self> {
        let dict = value.as_dictionary()?;

        let color_space = match dict.get(COLOR_SPACE) {
            Some(v) => Some(v.as_string()?.to_string()),
            None => None,
        };

        Some(Self {
            red: component(dict, RED_COMPONENT)?.unwrap_or(0.0),
            green: component(dict, GREEN_COMPONENT)?.unwrap_or(0.0),
            blue: component(dict, BLUE_COMPONENT)?.unwrap_or(0.0),
            alpha: component(dict, ALPHA_COMPONENT)?,
            color_space,
        })
    }

    /// Convert back into the dictionary form iTerm2 expects
    pub fn to_value(&self) -> Value {
        let mut dict = Dictionary::new();
        dict.insert(RED_COMPONENT.to_string(), Value::Real(self.red));
        dict.insert(GREEN_COMPONENT.to_string(), Value::Real(self.green));
        dict.insert(BLUE_COMPONENT.to_string(), Value::Real(self.blue));
        if let Some(alpha) = self.alpha {
            dict.insert(ALPHA_COMPONENT.to_string(), Value::Real(alpha));
        }
        if let Some(space) = &self.color_space {
            dict.insert(COLOR_SPACE.to_string(), Value::String(space.clone()));
        }
        Value::Dictionary(dict)
    }

    /// Format as `#rrggbb` (components clamped to [0,1])
    pub fn to_hex(&self) -> String {
        let byte = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            byte(self.red),
            byte(self.green),
            byte(self.blue)
        )
    }
}

/// Read one numeric component
///
/// Outer `None` means malformed, inner `None` means absent.
fn component(dict: &Dictionary, key: &str) -> Option<Option<f64>> {
    match dict.get(key) {
        None => Some(None),
        Some(value) => as_f64(value).map(Some),
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Real(r) => Some(*r),
        Value::Integer(i) => i
            .as_signed()
            .map(|v| v as f64)
            .or_else(|| i.as_unsigned().map(|v| v as f64)),
        _ => None,
    }
}

/// Normalize a color value, or `None` if it is malformed
pub fn normalize(value: &Value) -> Option<Value> {
    Color::from_value(value).map(|color| color.to_value())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(entries: &[(&str, Value)]) -> Value {
        let mut d = Dictionary::new();
        for (k, v) in entries {
            d.insert(k.to_string(), v.clone());
        }
        Value::Dictionary(d)
    }

    #[test]
    fn test_named_color_fields() {
        assert!(is_color_field("Background Color"));
        assert!(is_color_field("Foreground Color"));
        assert!(is_color_field("Cursor Text Color"));
        assert!(is_color_field("Selected Text Color"));
    }

    #[test]
    fn test_ansi_color_fields() {
        assert!(is_color_field("Ansi 0 Color"));
        assert!(is_color_field("Ansi 15 Color"));
        assert!(!is_color_field("Ansi 16 Color"));
        assert!(!is_color_field("Ansi 01 Color"));
        assert!(!is_color_field("Ansi  Color"));
        assert_eq!(ansi_color_fields().count(), 16);
        assert!(ansi_color_fields().all(|name| is_color_field(&name)));
    }

    #[test]
    fn test_appearance_variants() {
        assert!(is_color_field("Background Color (Dark)"));
        assert!(is_color_field("Ansi 3 Color (Light)"));
        assert!(!is_color_field("Background Color (Dim)"));
    }

    #[test]
    fn test_not_color_fields() {
        // Substring matches on "Color" used to sneak these in
        assert!(!is_color_field("Color Preset Name"));
        assert!(!is_color_field("Use Bright Bold"));
        assert!(!is_color_field("Name"));
        assert!(!is_color_field("Smart Cursor Color"));
    }

    #[test]
    fn test_normalize_exact_rgb() {
        let value = dict(&[
            (RED_COMPONENT, Value::Real(0.1)),
            (GREEN_COMPONENT, Value::Real(0.2)),
            (BLUE_COMPONENT, Value::Real(0.3)),
        ]);

        // No extra keys, no precision loss
        assert_eq!(normalize(&value), Some(value));
    }

    #[test]
    fn test_normalize_coerces_integers() {
        let value = dict(&[
            (RED_COMPONENT, Value::Integer(1i64.into())),
            (GREEN_COMPONENT, Value::Integer(0i64.into())),
            (BLUE_COMPONENT, Value::Real(0.5)),
        ]);

        let expected = dict(&[
            (RED_COMPONENT, Value::Real(1.0)),
            (GREEN_COMPONENT, Value::Real(0.0)),
            (BLUE_COMPONENT, Value::Real(0.5)),
        ]);
        assert_eq!(normalize(&value), Some(expected));
    }

    #[test]
    fn test_normalize_defaults_missing_components() {
        let value = dict(&[(GREEN_COMPONENT, Value::Real(0.4))]);
        let color = Color::from_value(&value).unwrap();
        assert_eq!(color.red, 0.0);
        assert_eq!(color.green, 0.4);
        assert_eq!(color.blue, 0.0);
        assert_eq!(color.alpha, None);
    }

    #[test]
    fn test_normalize_keeps_alpha_and_color_space() {
        let value = dict(&[
            (RED_COMPONENT, Value::Real(0.1)),
            (GREEN_COMPONENT, Value::Real(0.2)),
            (BLUE_COMPONENT, Value::Real(0.3)),
            (ALPHA_COMPONENT, Value::Integer(1i64.into())),
            (COLOR_SPACE, Value::String("sRGB".to_string())),
            ("Comment", Value::String("dropped".to_string())),
        ]);

        let normalized = normalize(&value).unwrap();
        let d = normalized.as_dictionary().unwrap();
        assert_eq!(d.len(), 5);
        assert_eq!(d.get(ALPHA_COMPONENT), Some(&Value::Real(1.0)));
        assert_eq!(
            d.get(COLOR_SPACE).and_then(|v| v.as_string()),
            Some("sRGB")
        );
        assert!(d.get("Comment").is_none());
    }

    #[test]
    fn test_normalize_rejects_malformed() {
        assert_eq!(normalize(&Value::String("#ffffff".to_string())), None);
        assert_eq!(normalize(&Value::Real(0.5)), None);

        let bad_component = dict(&[(RED_COMPONENT, Value::String("high".to_string()))]);
        assert_eq!(normalize(&bad_component), None);

        let bad_space = dict(&[
            (RED_COMPONENT, Value::Real(0.1)),
            (COLOR_SPACE, Value::Boolean(true)),
        ]);
        assert_eq!(normalize(&bad_space), None);
    }

    #[test]
    fn test_to_hex() {
        let color = Color {
            red: 1.0,
            green: 0.5,
            blue: 0.0,
            alpha: None,
            color_space: None,
        };
        assert_eq!(color.to_hex(), "#ff8000");

        let out_of_range = Color {
            red: 1.5,
            green: -0.2,
            blue: 0.0,
            alpha: None,
            color_space: None,
        };
        assert_eq!(out_of_range.to_hex(), "#ff0000");
    }
}
