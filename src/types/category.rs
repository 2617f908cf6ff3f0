use serde::{Deserialize, Serialize};

/// Longest category name the UI accepts, in characters.
pub const MAX_CATEGORY_NAME_LEN: usize = 30;

/// A user-defined tag with a cached item count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub count: u64,
}

/// Category names must be 1 to 30 characters long.
pub fn is_valid_category_name(name: &str) -> bool {
    let len = name.chars().count();
    len > 0 && len <= MAX_CATEGORY_NAME_LEN
}
