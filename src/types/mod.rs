// vaultdesk shared type definitions
// Each submodule defines types used across the application.

pub mod category;
pub mod entry;
pub mod errors;
pub mod settings;
pub mod toast;
pub mod wire;
