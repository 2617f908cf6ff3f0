//! Vault cache for vaultdesk.
//!
//! Keeps the entries from the last `GetPasswordList` so the UI can filter,
//! search, copy and flip bookmarks without another round trip. Nothing here
//! is ever written to disk.

use serde::{Deserialize, Serialize};

use crate::types::entry::{ItemType, PasswordEntry};

/// Sidebar filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum VaultFilter {
    #[default]
    All,
    Bookmarks,
    Category(u64),
    Type(ItemType),
}

impl VaultFilter {
    pub fn matches(&self, entry: &PasswordEntry) -> bool {
        match self {
            VaultFilter::All => true,
            VaultFilter::Bookmarks => entry.is_bookmarked,
            VaultFilter::Category(id) => entry.category_id == Some(*id),
            VaultFilter::Type(t) => entry.item_type() == *t,
        }
    }
}

/// Trait defining vault cache operations.
pub trait VaultCacheTrait {
    fn replace(&mut self, entries: Vec<PasswordEntry>);
    fn get(&self, id: u64) -> Option<&PasswordEntry>;
    fn filter(&self, filter: VaultFilter, search: &str) -> Vec<PasswordEntry>;
    fn set_bookmark(&mut self, id: u64, bookmarked: bool) -> Option<bool>;
    fn remove(&mut self, id: u64) -> Option<PasswordEntry>;
    fn clear(&mut self);
}

#[derive(Debug, Default)]
pub struct VaultCache {
    entries: Vec<PasswordEntry>,
}

impl VaultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips a bookmark locally, runs `commit`, and restores the old value
    /// if `commit` fails.
    ///
    /// Entries that aren't cached are committed without a local change.
    pub fn toggle_bookmark_with<T, E, F>(&mut self, id: u64, bookmarked: bool, commit: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let previous = self.set_bookmark(id, bookmarked);
        let outcome = commit();
        if outcome.is_err() {
            if let Some(old) = previous {
                self.set_bookmark(id, old);
                tracing::debug!(item_id = id, "bookmark rolled back");
            }
        }
        outcome
    }
}

impl VaultCacheTrait for VaultCache {
    fn replace(&mut self, entries: Vec<PasswordEntry>) {
        self.entries = entries;
    }

    fn get(&self, id: u64) -> Option<&PasswordEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries matching `filter` whose title contains `search`, ignoring case.
    fn filter(&self, filter: VaultFilter, search: &str) -> Vec<PasswordEntry> {
        let needle = search.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|e| filter.matches(e))
            .filter(|e| needle.is_empty() || e.title.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Sets the bookmark flag and returns the previous one.
    fn set_bookmark(&mut self, id: u64, bookmarked: bool) -> Option<bool> {
        let entry = self.entries.iter_mut().find(|e| e.id == id)?;
        Some(std::mem::replace(&mut entry.is_bookmarked, bookmarked))
    }

    fn remove(&mut self, id: u64) -> Option<PasswordEntry> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(pos))
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}
