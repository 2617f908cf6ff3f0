//! Client-side password and username generation.
//!
//! Characters are picked as `word % pool.len()` from random 32-bit words,
//! so pools whose size doesn't divide 2^32 carry a slight bias.

use crate::services::crypto_service::CryptoServiceTrait;
use crate::types::errors::{CryptoError, ValidationError};
use crate::types::settings::{GeneratorOptions, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*_+-|.";

pub const ADJECTIVES: [&str; 8] = ["Happy", "Clever", "Brave", "Swift", "Wise", "Cool", "Smart", "Bold"];
pub const NOUNS: [&str; 8] = ["Fox", "Eagle", "Wolf", "Lion", "Tiger", "Bear", "Hawk", "Deer"];

pub const DEFAULT_EMAIL_PROVIDER: &str = "@gmail.com";

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// The character pool for a set of toggles. Lowercase is always included.
pub fn pool(options: &GeneratorOptions) -> String {
    let mut chars = String::from(LOWERCASE);
    if options.uppercase {
        chars.push_str(UPPERCASE);
    }
    if options.numbers {
        chars.push_str(DIGITS);
    }
    if options.symbols {
        chars.push_str(SYMBOLS);
    }
    chars
}

pub fn generate_password(
    crypto: &dyn CryptoServiceTrait,
    options: &GeneratorOptions,
) -> Result<String, GeneratorError> {
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&options.length) {
        return Err(ValidationError::LengthOutOfRange {
            min: MIN_PASSWORD_LENGTH,
            max: MAX_PASSWORD_LENGTH,
        }
        .into());
    }

    let chars: Vec<char> = pool(options).chars().collect();
    let words = crypto.random_u32s(options.length)?;
    Ok(words
        .into_iter()
        .map(|w| chars[w as usize % chars.len()])
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsernameStyle {
    /// `CleverFox42`
    Random,
    /// `cleverfox42@gmail.com`
    Email { provider: String },
}

pub fn generate_username(
    crypto: &dyn CryptoServiceTrait,
    style: &UsernameStyle,
) -> Result<String, CryptoError> {
    let adjective = ADJECTIVES[crypto.random_range(0, ADJECTIVES.len() as u32 - 1)? as usize];
    let noun = NOUNS[crypto.random_range(0, NOUNS.len() as u32 - 1)? as usize];
    let number = crypto.random_range(1, 999)?;

    Ok(match style {
        UsernameStyle::Random => format!("{}{}{}", adjective, noun, number),
        UsernameStyle::Email { provider } => format!(
            "{}{}{}{}",
            adjective.to_lowercase(),
            noun.to_lowercase(),
            number,
            provider
        ),
    })
}
