// vaultdesk state managers
// Managers hold UI-facing state between binding calls: session, categories, vault entries.

pub mod category_manager;
pub mod session_manager;
pub mod vault_cache;
