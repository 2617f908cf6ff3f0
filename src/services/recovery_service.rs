//! Seed-phrase account recovery.
//!
//! The server keeps `seal(SHA256(seed), vault_key || seed)`. Whoever knows
//! the seed phrase can open it, take the vault key and re-protect it under a
//! new password.

use bip39::Mnemonic;
use zeroize::Zeroizing;

use crate::services::auth_service::{fetch_public_key, wrap_for_server};
use crate::services::credential_proof::{email_hash, CredentialProof};
use crate::services::crypto_service::{CryptoServiceTrait, KEY_LENGTH};
use crate::services::strength::is_password_valid;
use crate::services::transport::{decode, encode, BackendTransport, HttpMethod};
use crate::services::validation::{normalize_seed_phrase, seed_phrase_word_count, validate_email, SEED_PHRASE_WORDS};
use crate::types::errors::{AuthError, CryptoError};
use crate::types::wire::{
    AckResponse, RecoveryProcessPayload, RecoveryRequestPayload, RecoveryRequestResponse, RecoverySetupPayload,
};

/// 128 bits of entropy give a 12-word phrase.
const SEED_ENTROPY_BYTES: usize = 16;

/// Draws a fresh 12-word BIP39 phrase.
pub fn generate_seed_phrase(crypto: &dyn CryptoServiceTrait) -> Result<String, CryptoError> {
    let entropy = Zeroizing::new(crypto.generate_random_bytes(SEED_ENTROPY_BYTES)?);
    let mnemonic = Mnemonic::from_entropy(&entropy)
        .map_err(|e| CryptoError::RandomGeneration(format!("mnemonic error: {}", e)))?;
    Ok(mnemonic.to_string())
}

/// What `/recovery/request` hands back, plus the session key used for it.
pub struct RecoveryTicket {
    pub session_key: Zeroizing<Vec<u8>>,
    pub wrapped_session_key: String,
    pub encrypted_revaultkey: String,
}

pub struct RecoveryService<'a> {
    transport: &'a dyn BackendTransport,
    crypto: &'a dyn CryptoServiceTrait,
    proof: &'a CredentialProof,
}

impl<'a> RecoveryService<'a> {
    pub fn new(
        transport: &'a dyn BackendTransport,
        crypto: &'a dyn CryptoServiceTrait,
        proof: &'a CredentialProof,
    ) -> Self {
        Self {
            transport,
            crypto,
            proof,
        }
    }

    /// Asks the server for the sealed recovery blob of `email`.
    pub fn request(&self, email: &str, public_pem: &str) -> Result<RecoveryTicket, AuthError> {
        let session_key = Zeroizing::new(self.crypto.generate_random_bytes(KEY_LENGTH)?);
        let wrapped_session_key = wrap_for_server(self.crypto, public_pem, &session_key)?;
        let hashed = email_hash(self.crypto, email);

        let payload = RecoveryRequestPayload {
            encrypted_email: self.crypto.seal_b64(hashed.as_bytes(), &session_key)?,
            encrypted_sessionkey: wrapped_session_key.clone(),
        };
        let body = encode("/recovery/request", &payload)?;
        let value = self.transport.request(HttpMethod::Post, "/recovery/request", Some(&body))?;
        let response: RecoveryRequestResponse = decode("/recovery/request", value)?;

        let encrypted_revaultkey = response
            .encrypted_revaultkey
            .filter(|k| response.success && !k.is_empty())
            .ok_or_else(|| AuthError::Rejected("recovery request failed".to_string()))?;

        Ok(RecoveryTicket {
            session_key,
            wrapped_session_key,
            encrypted_revaultkey,
        })
    }

    /// Resets the password with the seed phrase and returns a new phrase.
    ///
    /// The session stays signed out; the user logs in with the new password.
    pub fn process(&self, email: &str, new_password: &str, seed_phrase: &str) -> Result<String, AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::MissingEmail);
        }
        if !validate_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        let words = seed_phrase_word_count(seed_phrase);
        if words != SEED_PHRASE_WORDS {
            return Err(AuthError::SeedPhraseLength(words));
        }
        if !is_password_valid(new_password, email) {
            return Err(AuthError::WeakPassword);
        }
        let seed_phrase = Zeroizing::new(normalize_seed_phrase(seed_phrase));

        let public_pem = fetch_public_key(self.transport)?;
        let ticket = self.request(email, &public_pem)?;

        let seed_key = Zeroizing::new(self.crypto.sha256(seed_phrase.as_bytes()));
        let blob = Zeroizing::new(
            self.crypto
                .open_b64(&ticket.encrypted_revaultkey, &seed_key)
                .map_err(|_| AuthError::SeedPhraseMismatch)?,
        );
        if blob.len() <= KEY_LENGTH {
            return Err(AuthError::SeedPhraseMismatch);
        }
        let (vault_key, embedded) = blob.split_at(KEY_LENGTH);
        let embedded = std::str::from_utf8(embedded).map_err(|_| AuthError::SeedPhraseMismatch)?;
        if normalize_seed_phrase(embedded) != *seed_phrase {
            return Err(AuthError::SeedPhraseMismatch);
        }
        let vault_key = Zeroizing::new(vault_key.to_vec());

        let master_key = self.proof.master_key(self.crypto, new_password, email)?;
        let sandwich = self.proof.register_sandwich(self.crypto, new_password, email)?;
        let session_key = &ticket.session_key;

        let payload = RecoveryProcessPayload {
            encrypted_email: self.crypto.seal_b64(email.as_bytes(), session_key)?,
            encrypted_hp1_hpr: self.crypto.seal_b64(sandwich.answers_b64().as_bytes(), session_key)?,
            encrypted_iteration: self.crypto.seal_b64(sandwich.iterations_str().as_bytes(), session_key)?,
            protected_vault_key: self.crypto.seal_b64(&vault_key, &master_key)?,
            encrypted_sessionkey: ticket.wrapped_session_key.clone(),
        };
        let body = encode("/recovery/process", &payload)?;
        let value = self.transport.request(HttpMethod::Post, "/recovery/process", Some(&body))?;
        let response: AckResponse = decode("/recovery/process", value)?;
        if !response.success {
            return Err(AuthError::Rejected(format!("recovery failed: {}", response.message)));
        }
        tracing::info!("recovery accepted, issuing a new seed phrase");

        self.setup(email, &vault_key)
    }

    /// Seals `vault_key || seed` under a fresh seed phrase and uploads it.
    pub fn setup(&self, email: &str, vault_key: &[u8]) -> Result<String, AuthError> {
        let seed_phrase = generate_seed_phrase(self.crypto)?;
        let seed_key = Zeroizing::new(self.crypto.sha256(seed_phrase.as_bytes()));

        let mut blob = Zeroizing::new(Vec::with_capacity(vault_key.len() + seed_phrase.len()));
        blob.extend_from_slice(vault_key);
        blob.extend_from_slice(seed_phrase.as_bytes());

        let payload = RecoverySetupPayload {
            hashemail: email_hash(self.crypto, email),
            encrypted_recoverykey: self.crypto.seal_b64(&blob, &seed_key)?,
        };
        let body = encode("/recovery/setup", &payload)?;
        let value = self.transport.request(HttpMethod::Post, "/recovery/setup", Some(&body))?;
        let response: AckResponse = decode("/recovery/setup", value)?;
        if !response.success {
            return Err(AuthError::Rejected(format!("recovery setup failed: {}", response.message)));
        }
        Ok(seed_phrase)
    }
}
