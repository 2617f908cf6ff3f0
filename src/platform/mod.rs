//! Per-OS locations for vaultdesk's settings file and database.
//!
//! `VAULTDESK_DATA_DIR`, when set, replaces both directories.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

pub const DATA_DIR_ENV: &str = "VAULTDESK_DATA_DIR";

fn data_dir_override() -> Option<PathBuf> {
    std::env::var_os(DATA_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Directory holding `settings.json`.
///
/// - **Linux**: `$XDG_CONFIG_HOME/vaultdesk` or `~/.config/vaultdesk`
/// - **macOS**: `~/Library/Application Support/vaultdesk`
/// - **Windows**: `%APPDATA%\vaultdesk`
pub fn get_config_dir() -> PathBuf {
    if let Some(dir) = data_dir_override() {
        return dir;
    }
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Directory holding the preferences database.
///
/// - **Linux**: `$XDG_DATA_HOME/vaultdesk` or `~/.local/share/vaultdesk`
/// - **macOS**: same as the config dir
/// - **Windows**: `%LOCALAPPDATA%\vaultdesk`
pub fn get_data_dir() -> PathBuf {
    if let Some(dir) = data_dir_override() {
        return dir;
    }
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}

/// Default path of the preferences database.
pub fn default_database_path() -> PathBuf {
    get_data_dir().join("vaultdesk.db")
}
