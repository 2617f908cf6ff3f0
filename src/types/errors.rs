use thiserror::Error;

// === CryptoError ===

/// Errors related to cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Failed to derive a key from a password.
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),
    /// Encryption operation failed.
    #[error("Encryption failed: {0}")]
    Encryption(String),
    /// Decryption operation failed.
    #[error("Decryption failed: {0}")]
    Decryption(String),
    /// Failed to generate random bytes.
    #[error("Random generation failed: {0}")]
    RandomGeneration(String),
    /// The provided key is invalid.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    /// Text could not be decoded from base64.
    #[error("Invalid base64: {0}")]
    Encoding(String),
}

// === BackendError ===

/// Errors raised while talking to the vault server.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Network(String),
    /// The server answered with a non-success status.
    #[error("{path} failed with status: {code}")]
    Status { path: String, code: u16, body: String },
    /// The response body was not the expected JSON.
    #[error("Failed to decode response from {path}: {message}")]
    Decode { path: String, message: String },
    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl BackendError {
    /// Returns the HTTP status code if the server answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            BackendError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

// === AuthError ===

/// Errors related to login, registration, and recovery.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password does not meet security requirements")]
    WeakPassword,
    /// The server rejected the credentials. Carries the server's message.
    #[error("{0}")]
    Rejected(String),
    /// The vault key could not be opened with the derived master key.
    #[error("incorrect password")]
    IncorrectPassword,
    #[error("Seed phrase must contain exactly 12 words (found {0})")]
    SeedPhraseLength(usize),
    #[error("Seed phrase does not match this account")]
    SeedPhraseMismatch,
    #[error("Email is required")]
    MissingEmail,
    #[error("No account is signed in")]
    NotSignedIn,
    #[error("Invalid server public key: {0}")]
    PublicKey(String),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

// === VaultError ===

/// Errors related to vault item operations.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("vault is locked")]
    Locked,
    #[error("Unknown item type: {0}")]
    UnknownType(String),
    #[error("Item data does not match type {type_name}: {message}")]
    InvalidData { type_name: String, message: String },
    #[error("Item not found: {0}")]
    NotFound(u64),
    #[error("Item {id} has no field named {field}")]
    UnknownField { id: u64, field: String },
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

// === CategoryError ===

/// Errors related to category operations.
#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("vault is locked")]
    Locked,
    #[error("Category name must be between 1 and 30 characters")]
    InvalidName,
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

// === StorageError ===

/// Errors opening or migrating the local preferences database.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Cannot create data directory {path}: {source}")]
    DataDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

// === PreferencesError ===

/// Errors from the SQLite-backed UI preference store.
#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("Preferences database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Preferences serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid color for {type_name}: {value}")]
    InvalidColor { type_name: String, value: String },
    #[error("Unknown item type: {0}")]
    UnknownType(String),
}

// === ClipboardError ===

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
}

// === ValidationError ===

/// Field-level input validation failures surfaced to the UI.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Password length must be between {min} and {max}")]
    LengthOutOfRange { min: usize, max: usize },
}
