//! Password-derived key material and the "sandwich" credential proof.
//!
//! The server never sees the password. It stores eight hash-chain answers
//! from registration, each seeded with the master hash and salted with one
//! 32-byte slice of the stretched email. A login proof runs the same chains
//! for fewer rounds, so the server can extend them to meet the stored
//! answers.

use base64::{engine::general_purpose::STANDARD, Engine};
use zeroize::Zeroizing;

use crate::services::crypto_service::CryptoServiceTrait;
use crate::types::errors::CryptoError;
use crate::types::settings::ProofParams;

/// Number of hash chains in one proof.
pub const CHAIN_COUNT: usize = 8;

/// Length of each email slice used to salt a chain.
pub const CHUNK_LENGTH: usize = 32;

/// Timestamp layout sent with a login proof.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Eight chain answers and the round counts that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandwichProof {
    pub answers: Vec<Vec<u8>>,
    pub iterations: Vec<u32>,
}

impl SandwichProof {
    /// Answers as base64, joined with `|` (`hp1-hpr` / `hq1-hqr`).
    pub fn answers_b64(&self) -> String {
        self.answers
            .iter()
            .map(|a| STANDARD.encode(a))
            .collect::<Vec<_>>()
            .join("|")
    }

    /// Round counts joined with `|`.
    pub fn iterations_str(&self) -> String {
        self.iterations
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// What a login request carries besides the encrypted email.
#[derive(Debug, Clone)]
pub struct LoginProof {
    pub hq1_hqr: String,
    pub hqt: String,
    pub timestamp: String,
}

/// Derives keys and proofs with the configured iteration ranges.
pub struct CredentialProof {
    params: ProofParams,
}

impl CredentialProof {
    pub fn new(params: ProofParams) -> Self {
        Self { params }
    }

    /// Argon2id(password, salt = email), 32 bytes. Protects the vault key.
    pub fn master_key(
        &self,
        crypto: &dyn CryptoServiceTrait,
        password: &str,
        email: &str,
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let salt = (!email.is_empty()).then_some(email.as_bytes());
        Ok(Zeroizing::new(crypto.argon2id(password.as_bytes(), salt, 32)?))
    }

    /// SHA-256 of the unsalted Argon2id password hash. Seeds every chain.
    pub fn master_hash(
        &self,
        crypto: &dyn CryptoServiceTrait,
        password: &str,
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let stretched = Zeroizing::new(crypto.argon2id(password.as_bytes(), None, 32)?);
        Ok(Zeroizing::new(crypto.sha256(&stretched)))
    }

    /// Stretches the email to 256 bytes and cuts it into eight salts.
    pub fn email_chunks(
        &self,
        crypto: &dyn CryptoServiceTrait,
        email: &str,
    ) -> Result<Vec<Vec<u8>>, CryptoError> {
        let stretched = crypto.argon2id(email.as_bytes(), None, CHAIN_COUNT * CHUNK_LENGTH)?;
        Ok(stretched.chunks(CHUNK_LENGTH).map(<[u8]>::to_vec).collect())
    }

    pub fn register_sandwich(
        &self,
        crypto: &dyn CryptoServiceTrait,
        password: &str,
        email: &str,
    ) -> Result<SandwichProof, CryptoError> {
        self.sandwich(crypto, password, email, self.params.register_min, self.params.register_max)
    }

    pub fn login_sandwich(
        &self,
        crypto: &dyn CryptoServiceTrait,
        password: &str,
        email: &str,
    ) -> Result<SandwichProof, CryptoError> {
        self.sandwich(crypto, password, email, self.params.login_min, self.params.login_max)
    }

    fn sandwich(
        &self,
        crypto: &dyn CryptoServiceTrait,
        password: &str,
        email: &str,
        min: u32,
        max: u32,
    ) -> Result<SandwichProof, CryptoError> {
        let seed = self.master_hash(crypto, password)?;
        let chunks = self.email_chunks(crypto, email)?;

        let mut answers = Vec::with_capacity(CHAIN_COUNT);
        let mut iterations = Vec::with_capacity(CHAIN_COUNT);
        for chunk in &chunks {
            let rounds = crypto.random_range(min, max)?;
            answers.push(crypto.hash_chain(&seed, chunk, rounds));
            iterations.push(rounds);
        }
        Ok(SandwichProof { answers, iterations })
    }

    /// Builds the login fields for a proof taken at `timestamp`.
    pub fn login_proof(
        &self,
        crypto: &dyn CryptoServiceTrait,
        proof: &SandwichProof,
        timestamp: &str,
    ) -> Result<LoginProof, CryptoError> {
        Ok(LoginProof {
            hq1_hqr: proof.answers_b64(),
            hqt: hqt(crypto, proof, timestamp)?,
            timestamp: timestamp.to_string(),
        })
    }
}

/// HqT = base64(Argon2id(answers | iterations | timestamp)).
pub fn hqt(
    crypto: &dyn CryptoServiceTrait,
    proof: &SandwichProof,
    timestamp: &str,
) -> Result<String, CryptoError> {
    let packed = format!("{}|{}|{}", proof.answers_b64(), proof.iterations_str(), timestamp);
    Ok(STANDARD.encode(crypto.argon2id(packed.as_bytes(), None, 32)?))
}

/// Local time in the login timestamp layout.
pub fn login_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// base64(SHA-256(trimmed, lowercased email)). Identifies the account to
/// the recovery endpoints.
pub fn email_hash(crypto: &dyn CryptoServiceTrait, email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    STANDARD.encode(crypto.sha256(normalized.as_bytes()))
}
