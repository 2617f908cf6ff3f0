//! Login, registration, logout and session checks against the vault server.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::Value;
use zeroize::Zeroizing;

use crate::services::credential_proof::{login_timestamp, CredentialProof};
use crate::services::crypto_service::{CryptoServiceTrait, KEY_LENGTH};
use crate::services::keyring::KeyRing;
use crate::services::recovery_service::RecoveryService;
use crate::services::strength::is_password_valid;
use crate::services::transport::{decode, encode, BackendTransport, HttpMethod};
use crate::services::validation::validate_email;
use crate::types::errors::{AuthError, BackendError};
use crate::types::wire::{
    AckResponse, LoginPayload, LoginResponse, PublicKeyResponse, RegisterPayload, SessionCheckResponse,
};

/// Fetches the server's RSA public key (PEM).
pub fn fetch_public_key(transport: &dyn BackendTransport) -> Result<String, AuthError> {
    let value = transport.request(HttpMethod::Get, "/publickey", None)?;
    let response: PublicKeyResponse = decode("/publickey", value)?;
    if response.public_key.trim().is_empty() {
        return Err(AuthError::PublicKey("server sent an empty key".to_string()));
    }
    Ok(response.public_key)
}

/// RSA-OAEP encrypts `data` for the server and encodes it as base64.
pub fn wrap_for_server(
    crypto: &dyn CryptoServiceTrait,
    public_pem: &str,
    data: &[u8],
) -> Result<String, AuthError> {
    let wrapped = crypto
        .rsa_oaep_encrypt(public_pem, data)
        .map_err(|e| AuthError::PublicKey(e.to_string()))?;
    Ok(STANDARD.encode(wrapped))
}

/// Message shown for a rejected login, from the most to the least specific.
pub fn login_error_message(code: u16, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(Value::String(msg)) = map.get("message") {
            if !msg.is_empty() {
                return msg.clone();
            }
        }
    }
    if body.contains("Password not match") {
        return "Password not match".to_string();
    }
    if !body.trim().is_empty() {
        return body.to_string();
    }
    format!("login failed with status: {}", code)
}

/// Authentication flows. Borrows the application's transport and crypto for
/// the duration of one call.
pub struct AuthService<'a> {
    transport: &'a dyn BackendTransport,
    crypto: &'a dyn CryptoServiceTrait,
    proof: &'a CredentialProof,
}

impl<'a> AuthService<'a> {
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

    /// Proves the password to the server and unlocks the vault key.
    ///
    /// On success `keyring` holds the master and vault keys. On failure it
    /// is left untouched.
    pub fn login(&self, keyring: &mut KeyRing, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        if !validate_email(email) {
            return Err(AuthError::InvalidEmail);
        }

        let master_key = self.proof.master_key(self.crypto, password, email)?;
        let sandwich = self.proof.login_sandwich(self.crypto, password, email)?;
        let login = self.proof.login_proof(self.crypto, &sandwich, &login_timestamp())?;

        let public_pem = fetch_public_key(self.transport)?;
        let payload = LoginPayload {
            email: wrap_for_server(self.crypto, &public_pem, email.as_bytes())?,
            hqt: login.hqt,
            hq1_hqr: login.hq1_hqr,
            timestamp: login.timestamp,
        };

        let body = encode("/login", &payload)?;
        let value = match self.transport.request(HttpMethod::Post, "/login", Some(&body)) {
            Ok(v) => v,
            Err(BackendError::Status { code, body, .. }) => {
                return Err(AuthError::Rejected(login_error_message(code, &body)));
            }
            Err(e) => return Err(e.into()),
        };
        let response: LoginResponse = decode("/login", value)?;

        let encrypted_vault = response
            .encrypted_vault
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or(AuthError::IncorrectPassword)?;
        let vault_key = Zeroizing::new(
            self.crypto
                .open_b64(encrypted_vault, &master_key)
                .map_err(|_| AuthError::IncorrectPassword)?,
        );
        if vault_key.len() != KEY_LENGTH {
            return Err(AuthError::IncorrectPassword);
        }

        keyring.clear();
        keyring.set_master_key(master_key);
        keyring.set_vault_key(vault_key);

        tracing::info!(success = response.success, "login accepted");
        Ok(response)
    }

    /// Creates the account and its recovery record. Returns the seed phrase
    /// the user has to write down.
    pub fn register(
        &self,
        keyring: &mut KeyRing,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<String, AuthError> {
        if !validate_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        if password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        if !is_password_valid(password, email) {
            return Err(AuthError::WeakPassword);
        }

        let master_key = self.proof.master_key(self.crypto, password, email)?;
        let sandwich = self.proof.register_sandwich(self.crypto, password, email)?;
        let session_key = Zeroizing::new(self.crypto.generate_random_bytes(KEY_LENGTH)?);
        let vault_key = Zeroizing::new(self.crypto.generate_random_bytes(KEY_LENGTH)?);

        let public_pem = fetch_public_key(self.transport)?;
        let payload = RegisterPayload {
            email: wrap_for_server(self.crypto, &public_pem, email.as_bytes())?,
            encrypted_hp1_hpr: self.crypto.seal_b64(sandwich.answers_b64().as_bytes(), &session_key)?,
            encrypted_iteration: self.crypto.seal_b64(sandwich.iterations_str().as_bytes(), &session_key)?,
            protected_vault_key: self.crypto.seal_b64(&vault_key, &master_key)?,
            encrypted_sessionkey: wrap_for_server(self.crypto, &public_pem, &session_key)?,
        };

        let body = encode("/register", &payload)?;
        let value = self.transport.request(HttpMethod::Post, "/register", Some(&body))?;
        let response: AckResponse = decode("/register", value)?;
        if !response.success {
            return Err(AuthError::Rejected(format!("registration failed: {}", response.message)));
        }
        tracing::info!("registration accepted");

        let seed_phrase =
            RecoveryService::new(self.transport, self.crypto, self.proof).setup(email, &vault_key)?;

        keyring.clear();
        keyring.set_master_key(master_key);
        keyring.set_vault_key(vault_key);
        Ok(seed_phrase)
    }

    pub fn logout(&self) -> Result<AckResponse, AuthError> {
        let value = self.transport.request(HttpMethod::Post, "/logout", None)?;
        Ok(decode("/logout", value)?)
    }

    pub fn session_check(&self) -> Result<SessionCheckResponse, AuthError> {
        let value = self.transport.request(HttpMethod::Post, "/session/check", None)?;
        Ok(decode("/session/check", value)?)
    }
}
