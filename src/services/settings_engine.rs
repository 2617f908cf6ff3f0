// vaultdesk Settings Engine
// Loads, validates, updates and persists `ClientSettings` as JSON at the
// platform config path. Environment overrides sit on top of the file and are
// never written back.

use std::fs;
use std::path::Path;

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::ClientSettings;

pub const BACKEND_URL_ENV: &str = "VAULTDESK_BACKEND_URL";
pub const LOG_LEVEL_ENV: &str = "VAULTDESK_LOG";

/// Sections shared with the server. Changing them orphans existing
/// accounts, so they can only be tuned in the settings file.
pub const FILE_ONLY_SECTIONS: [&str; 2] = ["kdf", "proof"];

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<ClientSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &ClientSettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Applies environment overrides read through `lookup`.
pub fn apply_overrides<F>(settings: &mut ClientSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(BACKEND_URL_ENV).filter(|v| !v.trim().is_empty()) {
        settings.backend.base_url = url.trim().to_string();
    }
    if let Some(level) = lookup(LOG_LEVEL_ENV).filter(|v| !v.trim().is_empty()) {
        settings.logging.level = level.trim().to_string();
    }
}

/// Checks cross-field constraints serde can't express.
pub fn validate(settings: &ClientSettings) -> Result<(), SettingsError> {
    let url = settings.backend.base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(SettingsError::InvalidValue(format!(
            "backend.base_url must use http or https: {}",
            url
        )));
    }
    if settings.backend.timeout_secs == 0 {
        return Err(SettingsError::InvalidValue(
            "backend.timeout_secs must be positive".to_string(),
        ));
    }

    let proof = &settings.proof;
    if proof.login_min > proof.login_max || proof.register_min > proof.register_max {
        return Err(SettingsError::InvalidValue(
            "proof ranges must satisfy min <= max".to_string(),
        ));
    }
    if proof.login_max >= proof.register_min {
        return Err(SettingsError::InvalidValue(
            "proof.login_max must be below proof.register_min".to_string(),
        ));
    }

    let kdf = &settings.kdf;
    if kdf.iterations == 0 || kdf.parallelism == 0 {
        return Err(SettingsError::InvalidValue(
            "kdf.iterations and kdf.parallelism must be positive".to_string(),
        ));
    }
    if kdf.memory_kib < 8 * kdf.parallelism {
        return Err(SettingsError::InvalidValue(format!(
            "kdf.memory_kib must be at least {}",
            8 * kdf.parallelism
        )));
    }
    Ok(())
}

/// Settings engine implementation that persists settings as JSON on disk.
pub struct SettingsEngine {
    config_path: String,
    /// What the file holds.
    stored: ClientSettings,
    /// `stored` plus environment overrides.
    effective: ClientSettings,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// Without `path_override`, uses `settings.json` in the platform config dir.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = match path_override {
            Some(p) => p,
            None => platform::get_config_dir()
                .join("settings.json")
                .to_string_lossy()
                .to_string(),
        };

        Self {
            config_path,
            stored: ClientSettings::default(),
            effective: ClientSettings::default(),
        }
    }

    /// Settings as stored on disk, without environment overrides.
    pub fn stored_settings(&self) -> &ClientSettings {
        &self.stored
    }

    /// Puts back settings that were valid before a failed update.
    fn restore(&mut self, previous: ClientSettings) {
        self.stored = previous;
        if let Err(e) = self.refresh_effective() {
            tracing::warn!(error = %e, "restored settings no longer validate");
        }
    }

    fn refresh_effective(&mut self) -> Result<(), SettingsError> {
        let mut effective = self.stored.clone();
        apply_overrides(&mut effective, |k| std::env::var(k).ok());
        validate(&effective)?;
        self.effective = effective;
        Ok(())
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the JSON config file.
    ///
    /// A missing file yields defaults. A malformed or invalid one is an error.
    fn load(&mut self) -> Result<ClientSettings, SettingsError> {
        let path = Path::new(&self.config_path);

        self.stored = if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;
            serde_json::from_str(&content).map_err(|e| {
                SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
            })?
        } else {
            ClientSettings::default()
        };

        self.refresh_effective()?;
        tracing::debug!(path = %self.config_path, "settings loaded");
        Ok(self.effective.clone())
    }

    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.stored).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Effective settings, overrides included.
    fn get_settings(&self) -> &ClientSettings {
        &self.effective
    }

    /// Updates one setting by dot path, e.g. `"backend.base_url"`, then
    /// saves. Keys under [`FILE_ONLY_SECTIONS`] are refused.
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }
        let parts: Vec<&str> = key.split('.').collect();
        if FILE_ONLY_SECTIONS.contains(&parts[0]) {
            return Err(SettingsError::InvalidKey(format!(
                "Key '{}' is fixed by the server protocol and can only be set in {}",
                key, self.config_path
            )));
        }

        let mut json_value = serde_json::to_value(&self.stored).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        {
            let (last, parents) = match parts.split_last() {
                Some(split) => split,
                None => return Err(SettingsError::InvalidKey("Key cannot be empty".to_string())),
            };
            let mut current = &mut json_value;
            for part in parents {
                current = current
                    .get_mut(*part)
                    .ok_or_else(|| SettingsError::InvalidKey(format!("Key '{}' not found in settings", key)))?;
            }
            match current {
                serde_json::Value::Object(map) if map.contains_key(*last) => {
                    map.insert(last.to_string(), value);
                }
                serde_json::Value::Object(_) => {
                    return Err(SettingsError::InvalidKey(format!("Key '{}' not found in settings", key)));
                }
                _ => {
                    return Err(SettingsError::InvalidKey(format!(
                        "Cannot navigate to key '{}': intermediate value is not an object",
                        key
                    )));
                }
            }
        }

        let updated: ClientSettings = serde_json::from_value(json_value)
            .map_err(|e| SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e)))?;
        validate(&updated)?;

        let previous = std::mem::replace(&mut self.stored, updated);
        if let Err(e) = self.refresh_effective().and_then(|()| self.save()) {
            self.restore(previous);
            return Err(e);
        }
        tracing::info!(key, "setting updated");
        Ok(())
    }

    /// Restores defaults for everything except [`FILE_ONLY_SECTIONS`].
    fn reset(&mut self) -> Result<(), SettingsError> {
        let defaults = ClientSettings {
            kdf: self.stored.kdf,
            proof: self.stored.proof,
            ..ClientSettings::default()
        };
        let previous = std::mem::replace(&mut self.stored, defaults);
        if let Err(e) = self.refresh_effective().and_then(|()| self.save()) {
            self.restore(previous);
            return Err(e);
        }
        Ok(())
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
