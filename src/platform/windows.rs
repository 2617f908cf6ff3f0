// Config: %APPDATA%\vaultdesk
// Data:   %LOCALAPPDATA%\vaultdesk

use std::env;
use std::path::PathBuf;

fn env_dir(var: &str) -> PathBuf {
    let base = env::var(var)
        .or_else(|_| env::var("USERPROFILE"))
        .unwrap_or_else(|_| String::from("C:\\"));
    PathBuf::from(base).join("vaultdesk")
}

pub fn get_config_dir() -> PathBuf {
    env_dir("APPDATA")
}

pub fn get_data_dir() -> PathBuf {
    env_dir("LOCALAPPDATA")
}
