//! App Core for vaultdesk.
//!
//! Central struct holding the session's keys, caches and services.

use crate::database::connection::Database;
use crate::managers::category_manager::{CategoryManager, CategoryManagerTrait};
use crate::managers::session_manager::{SessionManager, SessionManagerTrait};
use crate::managers::vault_cache::{VaultCache, VaultCacheTrait};
use crate::services::clipboard::{default_clipboard, ClipboardSink};
use crate::services::credential_proof::CredentialProof;
use crate::services::crypto_service::CryptoService;
use crate::services::keyring::KeyRing;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::transport::{BackendTransport, HttpTransport};

/// In-memory database path accepted by [`App::new`].
pub const IN_MEMORY: &str = ":memory:";

/// Central application struct.
///
/// Service structs that borrow state (`AuthService`, `VaultService`,
/// `CategoryService`, `RecoveryService`, `PreferenceStore`) are created on
/// demand from these fields.
pub struct App {
    pub db: Database,
    pub transport: Box<dyn BackendTransport>,
    pub crypto: CryptoService,
    pub proof: CredentialProof,
    pub keyring: KeyRing,
    pub session_manager: SessionManager,
    pub category_manager: CategoryManager,
    pub vault_cache: VaultCache,
    pub settings_engine: SettingsEngine,
    pub clipboard: Box<dyn ClipboardSink>,
}

impl App {
    /// Loads settings from the platform config dir and talks HTTP to the
    /// configured server.
    ///
    /// An unreadable settings file is logged and replaced by defaults.
    pub fn new(db_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings_engine = SettingsEngine::new(None);
        if let Err(e) = settings_engine.load() {
            tracing::warn!(error = %e, path = settings_engine.get_config_path(), "using default settings");
        }
        let transport = HttpTransport::new(&settings_engine.get_settings().backend)?;
        Self::with_transport(settings_engine, db_path, Box::new(transport), default_clipboard())
    }

    /// Builds an app around an already loaded settings engine and a given
    /// transport and clipboard.
    pub fn with_transport(
        settings_engine: SettingsEngine,
        db_path: &str,
        transport: Box<dyn BackendTransport>,
        clipboard: Box<dyn ClipboardSink>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let db = if db_path == IN_MEMORY {
            Database::open_in_memory()?
        } else {
            Database::open(db_path)?
        };

        let settings = settings_engine.get_settings();
        let crypto = CryptoService::new(settings.kdf);
        let proof = CredentialProof::new(settings.proof);

        Ok(Self {
            db,
            transport,
            crypto,
            proof,
            keyring: KeyRing::new(),
            session_manager: SessionManager::new(),
            category_manager: CategoryManager::new(),
            vault_cache: VaultCache::new(),
            settings_engine,
            clipboard,
        })
    }

    /// Forgets every key, cached entry and the server session cookie.
    pub fn lock(&mut self) {
        self.keyring.clear();
        self.session_manager.sign_out();
        self.category_manager.clear();
        self.vault_cache.clear();
        if let Err(e) = self.transport.reset_session() {
            tracing::warn!(error = %e, "could not reset backend session");
        }
    }

    /// Shutdown sequence: drop secrets before the process exits.
    pub fn shutdown(&mut self) {
        self.lock();
        tracing::info!("vaultdesk shut down");
    }
}
