//! vaultdesk database layer.
//!
//! Holds UI preferences only. Vault items never touch the local disk.
//!
//! ```no_run
//! use vaultdesk::database::Database;
//!
//! let db = Database::open("vaultdesk.db").expect("failed to open database");
//! let conn = db.connection();
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
