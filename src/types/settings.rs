use serde::{Deserialize, Serialize};

use super::entry::ItemType;

/// Top-level client settings container, persisted as `settings.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClientSettings {
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub kdf: KdfParams,
    #[serde(default)]
    pub proof: ProofParams,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Where the vault server lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct KdfParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024,
            iterations: 1,
            parallelism: 4,
        }
    }
}

/// Hash-chain iteration ranges for the credential proof.
///
/// Registration draws from the high range and login from the low one, so a
/// login chain can always be extended to reach a registered answer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProofParams {
    pub register_min: u32,
    pub register_max: u32,
    pub login_min: u32,
    pub login_max: u32,
}

impl Default for ProofParams {
    fn default() -> Self {
        Self {
            register_min: 60_000,
            register_max: 800_000,
            login_min: 1_000,
            login_max: 59_999,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Per-type icon colors, stored as `#rrggbb`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColorSettings {
    pub website: String,
    pub identity: String,
    pub card: String,
    pub crypto: String,
    pub memo: String,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            website: "#3b82f6".to_string(),
            identity: "#22c55e".to_string(),
            card: "#a855f7".to_string(),
            crypto: "#f59e0b".to_string(),
            memo: "#64748b".to_string(),
        }
    }
}

impl ColorSettings {
    pub fn get(&self, item_type: ItemType) -> &str {
        match item_type {
            ItemType::Website => &self.website,
            ItemType::Identity => &self.identity,
            ItemType::Card => &self.card,
            ItemType::Crypto => &self.crypto,
            ItemType::Memo => &self.memo,
        }
    }

    pub fn set(&mut self, item_type: ItemType, color: String) {
        let slot = match item_type {
            ItemType::Website => &mut self.website,
            ItemType::Identity => &mut self.identity,
            ItemType::Card => &mut self.card,
            ItemType::Crypto => &mut self.crypto,
            ItemType::Memo => &mut self.memo,
        };
        *slot = color;
    }
}

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 32;
pub const DEFAULT_PASSWORD_LENGTH: usize = 16;

/// Password generator toggles. Lowercase letters are always in the pool.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub length: usize,
    pub uppercase: bool,
    pub numbers: bool,
    pub symbols: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            length: DEFAULT_PASSWORD_LENGTH,
            uppercase: true,
            numbers: true,
            symbols: true,
        }
    }
}

impl GeneratorOptions {
    /// Returns a copy with the length pulled into the supported range.
    pub fn clamped(mut self) -> Self {
        self.length = self.length.clamp(MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH);
        self
    }
}
