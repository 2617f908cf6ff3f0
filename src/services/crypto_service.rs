use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::Rng;
use ring::aead::{self, Aad, BoundKey, Nonce, NonceSequence, UnboundKey, AES_256_GCM};
use ring::digest::{self, SHA256};
use ring::rand::{SecureRandom, SystemRandom};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Oaep, RsaPublicKey};
use zeroize::Zeroize;

use crate::types::errors::CryptoError;
use crate::types::settings::KdfParams;

/// AES-256-GCM key length in bytes.
pub const KEY_LENGTH: usize = 32;

/// AES-256-GCM nonce/IV length in bytes.
pub const NONCE_LENGTH: usize = 12;

/// AES-256-GCM authentication tag length in bytes.
pub const TAG_LENGTH: usize = 16;

/// Shortest possible sealed blob: an IV and a tag around empty plaintext.
pub const MIN_SEALED_LENGTH: usize = NONCE_LENGTH + TAG_LENGTH;

/// Trait defining the cryptographic primitives the client relies on.
pub trait CryptoServiceTrait {
    /// Encrypts with AES-256-GCM under a fresh IV. Output is `IV || ct || tag`.
    fn seal(&self, plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Reverses [`seal`](Self::seal).
    fn open(&self, sealed: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Seals and encodes the result as standard base64.
    fn seal_b64(&self, plaintext: &[u8], key: &[u8]) -> Result<String, CryptoError> {
        Ok(STANDARD.encode(self.seal(plaintext, key)?))
    }

    /// Decodes standard base64 and opens the sealed blob.
    fn open_b64(&self, encoded: &str, key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let sealed = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CryptoError::Encoding(e.to_string()))?;
        self.open(&sealed, key)
    }

    fn sha256(&self, data: &[u8]) -> Vec<u8>;

    /// Argon2id with the configured cost. `salt` is hashed first; `None`
    /// hashes the empty string.
    fn argon2id(&self, password: &[u8], salt: Option<&[u8]>, out_len: usize) -> Result<Vec<u8>, CryptoError>;

    /// Runs `state = SHA256(state || salt)` `rounds` times starting at `seed`.
    fn hash_chain(&self, seed: &[u8], salt: &[u8], rounds: u32) -> Vec<u8>;

    /// RSA-OAEP-SHA256 under a PEM public key (SPKI or PKCS#1).
    fn rsa_oaep_encrypt(&self, public_pem: &str, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>;

    fn generate_random_bytes(&self, length: usize) -> Result<Vec<u8>, CryptoError>;

    /// Draws `count` uniformly random 32-bit words.
    fn random_u32s(&self, count: usize) -> Result<Vec<u32>, CryptoError>;

    /// Uniform integer in `min..=max`.
    fn random_range(&self, min: u32, max: u32) -> Result<u32, CryptoError>;

    /// Securely clears sensitive data from memory by overwriting with zeros.
    fn zeroize_memory(&self, data: &mut [u8]);
}

/// A nonce sequence that yields exactly one nonce.
struct SingleNonce {
    nonce: Option<[u8; NONCE_LENGTH]>,
}

impl SingleNonce {
    fn new(nonce_bytes: [u8; NONCE_LENGTH]) -> Self {
        Self {
            nonce: Some(nonce_bytes),
        }
    }
}

impl NonceSequence for SingleNonce {
    fn advance(&mut self) -> Result<Nonce, ring::error::Unspecified> {
        self.nonce
            .take()
            .map(Nonce::assume_unique_for_key)
            .ok_or(ring::error::Unspecified)
    }
}

/// Implementation of the client crypto on `ring`, `argon2` and `rsa`.
pub struct CryptoService {
    rng: SystemRandom,
    kdf: KdfParams,
}

impl CryptoService {
    pub fn new(kdf: KdfParams) -> Self {
        Self {
            rng: SystemRandom::new(),
            kdf,
        }
    }

    fn check_key(key: &[u8]) -> Result<(), CryptoError> {
        if key.len() != KEY_LENGTH {
            return Err(CryptoError::InvalidKey(format!(
                "Key must be {} bytes, got {}",
                KEY_LENGTH,
                key.len()
            )));
        }
        Ok(())
    }

    fn parse_public_key(pem: &str) -> Result<RsaPublicKey, CryptoError> {
        let pem = pem.trim();
        RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map_err(|e| CryptoError::InvalidKey(format!("Unreadable RSA public key: {}", e)))
    }
}

impl Default for CryptoService {
    fn default() -> Self {
        Self::new(KdfParams::default())
    }
}

impl CryptoServiceTrait for CryptoService {
    fn seal(&self, plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Self::check_key(key)?;

        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| CryptoError::RandomGeneration("Failed to generate nonce".to_string()))?;

        let unbound_key = UnboundKey::new(&AES_256_GCM, key)
            .map_err(|_| CryptoError::Encryption("Failed to create encryption key".to_string()))?;
        let mut sealing_key = aead::SealingKey::new(unbound_key, SingleNonce::new(nonce_bytes));

        // ring appends the tag, so only the IV has to be prepended.
        let mut sealed = Vec::with_capacity(NONCE_LENGTH + plaintext.len() + TAG_LENGTH);
        sealed.extend_from_slice(&nonce_bytes);
        let mut in_out = plaintext.to_vec();
        sealing_key
            .seal_in_place_append_tag(Aad::empty(), &mut in_out)
            .map_err(|_| CryptoError::Encryption("Encryption operation failed".to_string()))?;
        sealed.extend_from_slice(&in_out);
        in_out.zeroize();

        Ok(sealed)
    }

    fn open(&self, sealed: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Self::check_key(key)?;

        if sealed.len() < MIN_SEALED_LENGTH {
            return Err(CryptoError::Decryption(format!(
                "Ciphertext must be at least {} bytes, got {}",
                MIN_SEALED_LENGTH,
                sealed.len()
            )));
        }

        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        nonce_bytes.copy_from_slice(&sealed[..NONCE_LENGTH]);

        let unbound_key = UnboundKey::new(&AES_256_GCM, key)
            .map_err(|_| CryptoError::Decryption("Failed to create decryption key".to_string()))?;
        let mut opening_key = aead::OpeningKey::new(unbound_key, SingleNonce::new(nonce_bytes));

        let mut in_out = sealed[NONCE_LENGTH..].to_vec();
        let plaintext = opening_key
            .open_in_place(Aad::empty(), &mut in_out)
            .map_err(|_| CryptoError::Decryption("invalid key or corrupted data".to_string()))?
            .to_vec();
        in_out.zeroize();

        Ok(plaintext)
    }

    fn sha256(&self, data: &[u8]) -> Vec<u8> {
        digest::digest(&SHA256, data).as_ref().to_vec()
    }

    fn argon2id(&self, password: &[u8], salt: Option<&[u8]>, out_len: usize) -> Result<Vec<u8>, CryptoError> {
        let params = Params::new(
            self.kdf.memory_kib,
            self.kdf.iterations,
            self.kdf.parallelism,
            Some(out_len),
        )
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
        let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let salt = self.sha256(salt.unwrap_or_default());
        let mut out = vec![0u8; out_len];
        argon
            .hash_password_into(password, &salt, &mut out)
            .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
        Ok(out)
    }

    fn hash_chain(&self, seed: &[u8], salt: &[u8], rounds: u32) -> Vec<u8> {
        let mut state = seed.to_vec();
        let mut buf = Vec::with_capacity(digest::SHA256_OUTPUT_LEN + salt.len());
        for _ in 0..rounds {
            buf.clear();
            buf.extend_from_slice(&state);
            buf.extend_from_slice(salt);
            state.zeroize();
            state = self.sha256(&buf);
        }
        buf.zeroize();
        state
    }

    fn rsa_oaep_encrypt(&self, public_pem: &str, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let key = Self::parse_public_key(public_pem)?;
        key.encrypt(&mut rand::rngs::OsRng, Oaep::new::<sha2::Sha256>(), plaintext)
            .map_err(|e| CryptoError::Encryption(format!("RSA-OAEP: {}", e)))
    }

    fn generate_random_bytes(&self, length: usize) -> Result<Vec<u8>, CryptoError> {
        let mut bytes = vec![0u8; length];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| CryptoError::RandomGeneration("Failed to generate random bytes".to_string()))?;
        Ok(bytes)
    }

    fn random_u32s(&self, count: usize) -> Result<Vec<u32>, CryptoError> {
        let bytes = self.generate_random_bytes(count * 4)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    fn random_range(&self, min: u32, max: u32) -> Result<u32, CryptoError> {
        if min > max {
            return Err(CryptoError::RandomGeneration(format!(
                "Empty range {}..={}",
                min, max
            )));
        }
        Ok(rand::rngs::OsRng.gen_range(min..=max))
    }

    fn zeroize_memory(&self, data: &mut [u8]) {
        data.zeroize();
    }
}
