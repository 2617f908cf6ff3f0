//! Category Manager for vaultdesk.
//!
//! Holds the last category list fetched from the server and the category
//! the user has selected in the sidebar. The list is always replaced whole.

use crate::types::category::Category;

/// Trait defining category cache operations.
pub trait CategoryManagerTrait {
    fn replace(&mut self, categories: Vec<Category>);
    fn categories(&self) -> &[Category];
    fn name_by_id(&self, id: u64) -> Option<&str>;
    fn id_by_name(&self, name: &str) -> Option<u64>;
    fn set_active(&mut self, id: Option<u64>) -> Option<&Category>;
    fn active(&self) -> Option<&Category>;
    fn clear(&mut self);
}

#[derive(Debug, Default)]
pub struct CategoryManager {
    categories: Vec<Category>,
    active: Option<u64>,
}

impl CategoryManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CategoryManagerTrait for CategoryManager {
    /// Swaps in a fresh list. An active category that vanished is cleared.
    fn replace(&mut self, categories: Vec<Category>) {
        self.categories = categories;
        if let Some(id) = self.active {
            if !self.categories.iter().any(|c| c.id == id) {
                self.active = None;
            }
        }
    }

    fn categories(&self) -> &[Category] {
        &self.categories
    }

    fn name_by_id(&self, id: u64) -> Option<&str> {
        self.categories.iter().find(|c| c.id == id).map(|c| c.name.as_str())
    }

    /// Exact match first, then case-insensitive.
    fn id_by_name(&self, name: &str) -> Option<u64> {
        let name = name.trim();
        self.categories
            .iter()
            .find(|c| c.name == name)
            .or_else(|| self.categories.iter().find(|c| c.name.eq_ignore_ascii_case(name)))
            .map(|c| c.id)
    }

    /// Selects a category by id, or clears the selection with `None`.
    /// Unknown ids clear it too.
    fn set_active(&mut self, id: Option<u64>) -> Option<&Category> {
        self.active = id.filter(|id| self.categories.iter().any(|c| c.id == *id));
        self.active()
    }

    fn active(&self) -> Option<&Category> {
        let id = self.active?;
        self.categories.iter().find(|c| c.id == id)
    }

    fn clear(&mut self) {
        self.categories.clear();
        self.active = None;
    }
}
