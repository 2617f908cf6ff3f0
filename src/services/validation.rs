use std::sync::OnceLock;

use regex::Regex;

/// Words in a recovery seed phrase.
pub const SEED_PHRASE_WORDS: usize = 12;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$";

fn email_regex() -> Option<&'static Regex> {
    static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL_RE.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

/// Checks the email format the same way the login and register forms do.
pub fn validate_email(email: &str) -> bool {
    if email.len() < 5 {
        return false;
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || !parts[1].contains('.') {
        return false;
    }

    let tld = parts[1].rsplit('.').next().unwrap_or_default();
    if tld.len() < 2 {
        return false;
    }

    if email.contains("..") {
        return false;
    }

    email_regex().is_some_and(|re| re.is_match(email))
}

pub fn seed_phrase_word_count(phrase: &str) -> usize {
    phrase.split_whitespace().count()
}

/// Collapses runs of whitespace so phrases compare word by word.
pub fn normalize_seed_phrase(phrase: &str) -> String {
    phrase.split_whitespace().collect::<Vec<_>>().join(" ")
}
