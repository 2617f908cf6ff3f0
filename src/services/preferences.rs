//! UI preferences backed by the `preferences` table.
//!
//! Each preference is one JSON document under a fixed key. Missing or
//! unreadable rows fall back to defaults.

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::entry::ItemType;
use crate::types::errors::PreferencesError;
use crate::types::settings::{ColorSettings, GeneratorOptions};

pub const ICON_COLORS_KEY: &str = "iconColors";
pub const GENERATOR_OPTIONS_KEY: &str = "generatorOptions";

/// True for `#rrggbb`.
pub fn is_hex_color(value: &str) -> bool {
    value.len() == 7 && value.starts_with('#') && value[1..].bytes().all(|b| b.is_ascii_hexdigit())
}

pub trait PreferenceStoreTrait {
    fn color_settings(&self) -> Result<ColorSettings, PreferencesError>;
    fn update_color(&self, type_name: &str, color: &str) -> Result<ColorSettings, PreferencesError>;
    fn reset_colors(&self) -> Result<ColorSettings, PreferencesError>;
    fn generator_options(&self) -> Result<GeneratorOptions, PreferencesError>;
    fn set_generator_options(&self, options: GeneratorOptions) -> Result<GeneratorOptions, PreferencesError>;
}

/// Preference store over a borrowed SQLite connection.
pub struct PreferenceStore<'a> {
    conn: &'a Connection,
}

impl<'a> PreferenceStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    /// Reads `key`. A row that no longer parses is treated as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PreferencesError> {
        let raw: Option<String> = self
            .conn
            .query_row("SELECT value FROM preferences WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(raw.and_then(|text| match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring unreadable preference");
                None
            }
        }))
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), PreferencesError> {
        let text = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, text, Self::now()],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), PreferencesError> {
        self.conn.execute("DELETE FROM preferences WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl<'a> PreferenceStoreTrait for PreferenceStore<'a> {
    fn color_settings(&self) -> Result<ColorSettings, PreferencesError> {
        Ok(self.get(ICON_COLORS_KEY)?.unwrap_or_default())
    }

    fn update_color(&self, type_name: &str, color: &str) -> Result<ColorSettings, PreferencesError> {
        let item_type =
            ItemType::parse_any(type_name).ok_or_else(|| PreferencesError::UnknownType(type_name.to_string()))?;
        let color = color.trim().to_lowercase();
        if !is_hex_color(&color) {
            return Err(PreferencesError::InvalidColor {
                type_name: item_type.to_string(),
                value: color,
            });
        }
        let mut colors = self.color_settings()?;
        colors.set(item_type, color);
        self.set(ICON_COLORS_KEY, &colors)?;
        Ok(colors)
    }

    fn reset_colors(&self) -> Result<ColorSettings, PreferencesError> {
        self.remove(ICON_COLORS_KEY)?;
        Ok(ColorSettings::default())
    }

    fn generator_options(&self) -> Result<GeneratorOptions, PreferencesError> {
        Ok(self
            .get::<GeneratorOptions>(GENERATOR_OPTIONS_KEY)?
            .unwrap_or_default()
            .clamped())
    }

    fn set_generator_options(&self, options: GeneratorOptions) -> Result<GeneratorOptions, PreferencesError> {
        let options = options.clamped();
        self.set(GENERATOR_OPTIONS_KEY, &options)?;
        Ok(options)
    }
}
