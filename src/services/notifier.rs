//! Turns binding failures into user-facing toasts.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::toast::Toast;

pub const SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";
pub const SERVER_ERROR: &str = "The server ran into a problem. Please try again later.";
pub const NETWORK_ERROR: &str = "Unable to reach the server. Check your connection and try again.";

// Matches the `... failed with status: NNN` text of `BackendError::Status`.
const STATUS_PATTERN: &str = r"failed with status: (\d{3})\b";

fn status_regex() -> Option<&'static Regex> {
    static STATUS_RE: OnceLock<Option<Regex>> = OnceLock::new();
    STATUS_RE.get_or_init(|| Regex::new(STATUS_PATTERN).ok()).as_ref()
}

/// HTTP status carried by a backend failure message, if any.
pub fn status_in(message: &str) -> Option<u16> {
    status_regex()?
        .captures(message)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}

/// Best-effort human-readable text for a failure message.
pub fn describe_failure(message: &str) -> String {
    let lower = message.to_lowercase();
    let status = status_in(message);
    if status == Some(401) {
        SESSION_EXPIRED.to_string()
    } else if status == Some(500) {
        SERVER_ERROR.to_string()
    } else if lower.contains("network error")
        || lower.contains("failed to fetch")
        || lower.contains("connection")
        || lower.contains("timed out")
    {
        NETWORK_ERROR.to_string()
    } else {
        message.to_string()
    }
}

/// Toast title for a failed binding.
pub fn failure_title(method: &str) -> &'static str {
    match method {
        "LoginUser" => "Sign in failed",
        "RegisterUser" => "Registration failed",
        "ConfirmSeedPhrase" => "Could not confirm seed phrase",
        "LogoutUser" => "Sign out failed",
        "SessionCheck" => "Session check failed",
        "RecoveryProcess" => "Account recovery failed",
        "CreateItemClient" => "Failed to create item",
        "UpdateItemClient" => "Failed to update item",
        "DeleteItemClient" => "Failed to delete item",
        "GetPasswordList" | "FilterPasswordList" => "Failed to load vault",
        "ToggleBookmark" => "Failed to update bookmark",
        "CopyField" => "Failed to copy",
        "GetCategoryList" | "SetActiveCategory" | "GetCategoryNameById" | "GetCategoryIdByName" => {
            "Failed to load categories"
        }
        "CreateCategoryClient" => "Failed to create category",
        "UpdateCategoryClient" => "Failed to rename category",
        "DeleteCategoryClient" => "Failed to delete category",
        "GeneratePassword" | "GenerateUsername" => "Generator error",
        "GetColorSettings" | "UpdateColorSetting" | "ResetColorSettings" => "Failed to save colors",
        "GetGeneratorOptions" | "SetGeneratorOptions" => "Failed to save generator options",
        "GetSettings" | "SetSetting" => "Failed to update settings",
        _ => "Something went wrong",
    }
}

/// Destructive toast for a failed binding.
pub fn failure_toast(method: &str, message: &str) -> Toast {
    Toast::destructive(failure_title(method), describe_failure(message))
}
