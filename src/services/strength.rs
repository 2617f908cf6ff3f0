//! Password strength scoring and the registration gate.

use serde::Serialize;

/// Minimum length accepted by [`is_password_valid`].
pub const MIN_VALID_LENGTH: usize = 12;

const SYMBOLS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";
const COMMON_PATTERNS: [&str; 4] = ["password", "123456", "qwerty", "admin"];

/// Which requirements a password meets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChecks {
    pub has_min_length: bool,
    pub has_upper_case: bool,
    pub has_lower_case: bool,
    pub has_number: bool,
    pub has_symbol: bool,
    pub has_no_common_patterns: bool,
    pub has_no_email_parts: bool,
}

impl PasswordChecks {
    pub fn evaluate(password: &str, email: &str) -> Self {
        let lower = password.to_lowercase();
        Self {
            has_min_length: password.chars().count() >= MIN_VALID_LENGTH,
            has_upper_case: password.chars().any(|c| c.is_ascii_uppercase()),
            has_lower_case: password.chars().any(|c| c.is_ascii_lowercase()),
            has_number: password.chars().any(|c| c.is_ascii_digit()),
            has_symbol: password.chars().any(|c| SYMBOLS.contains(c)),
            has_no_common_patterns: !COMMON_PATTERNS.iter().any(|p| lower.contains(p)),
            has_no_email_parts: !contains_email_parts(password, email),
        }
    }

    fn all_classes(&self) -> bool {
        self.has_upper_case && self.has_lower_case && self.has_number && self.has_symbol
    }
}

/// Score, tier label and gate result for one password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrengthReport {
    pub score: u8,
    pub label: &'static str,
    pub is_valid: bool,
    pub checks: PasswordChecks,
}

/// True when the password contains the email, its local part or the first
/// label of its domain. Fragments of three characters or fewer are ignored.
pub fn contains_email_parts(password: &str, email: &str) -> bool {
    if email.is_empty() || password.is_empty() {
        return false;
    }
    let email = email.to_lowercase();
    let password = password.to_lowercase();

    if password.contains(&email) {
        return true;
    }

    let mut parts = email.split('@');
    let local = parts.next().unwrap_or_default();
    if local.chars().count() > 3 && password.contains(local) {
        return true;
    }

    if let Some(domain) = parts.next() {
        let domain_name = domain.split('.').next().unwrap_or_default();
        if domain_name.chars().count() > 3 && password.contains(domain_name) {
            return true;
        }
    }
    false
}

/// Weighted 0-100 score.
pub fn score(password: &str, email: &str) -> u8 {
    if password.is_empty() {
        return 0;
    }
    let checks = PasswordChecks::evaluate(password, email);

    let mut total: i32 = (password.chars().count() as i32 * 4).min(25);
    if checks.has_upper_case {
        total += 15;
    }
    if checks.has_lower_case {
        total += 10;
    }
    if checks.has_number {
        total += 15;
    }
    if checks.has_symbol {
        total += 20;
    }
    if !checks.has_no_common_patterns {
        total -= 20;
    }
    if !checks.has_no_email_parts {
        total -= 25;
    }
    if checks.all_classes() {
        total += 15;
    }
    total.clamp(0, 100) as u8
}

/// Five-tier label. Empty passwords get an empty label.
pub fn label(password: &str, score: u8) -> &'static str {
    if password.is_empty() {
        return "";
    }
    match score {
        0..=29 => "Very Weak",
        30..=49 => "Weak",
        50..=69 => "Moderate",
        70..=89 => "Strong",
        _ => "Very Strong",
    }
}

/// Registration gate: at least 12 characters, every class, no email parts.
pub fn is_password_valid(password: &str, email: &str) -> bool {
    let checks = PasswordChecks::evaluate(password, email);
    checks.has_min_length && checks.all_classes() && checks.has_no_email_parts
}

pub fn check(password: &str, email: &str) -> StrengthReport {
    let score = score(password, email);
    StrengthReport {
        score,
        label: label(password, score),
        is_valid: is_password_valid(password, email),
        checks: PasswordChecks::evaluate(password, email),
    }
}
