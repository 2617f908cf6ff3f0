//! vaultdesk: desktop client for an end-to-end encrypted password vault.
//!
//! Secrets are sealed on this machine before they reach the server. This
//! library crate exposes all modules for the binaries and integration tests.

pub mod app;
pub mod database;
pub mod logging;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;

#[cfg(feature = "gui")]
pub mod ui;
