// vaultdesk services
// Services do the work behind the bindings: crypto, the server protocol, vault items, helpers.

pub mod auth_service;
pub mod category_service;
pub mod clipboard;
pub mod credential_proof;
pub mod crypto_service;
pub mod datetime;
pub mod generator;
pub mod keyring;
pub mod notifier;
pub mod preferences;
pub mod recovery_service;
pub mod settings_engine;
pub mod strength;
pub mod transport;
pub mod validation;
pub mod vault_service;
