//! Encrypted wallet files.
//!
//! Wallet secrets are serialized to JSON, encrypted under a key stretched
//! from the user's passphrase, and stored next to the plaintext metadata:
//!
//! ```json
//! {
//!     "meta": {"displayName": "Main Wallet", "created": "...", "genesisID": ""},
//!     "crypto": {
//!         "cipher": "XSALSA20-POLY1305",
//!         "cipherText": "<hex>",
//!         "cipherParams": {"iv": "<hex>"},
//!         "kdf": "ARGON2ID",
//!         "kdfparams": {
//!             "dklen": 32,
//!             "hash": "BLAKE2B",
//!             "salt": "<hex>",
//!             "iterations": 3,
//!             "memory": 65536,
//!             "parallelism": 4
//!         }
//!     }
//! }
//! ```
//!
//! Every parameter needed to decrypt is recorded in the file. Algorithm
//! names are compared case-insensitively and hex fields decode in either
//! case.

use crate::wallet::secret::SecretBytes;
use crate::wallet::wallet::{Wallet, WalletMetadata, WalletSecrets};
use aes_gcm::Aes256Gcm;
use argon2::{Argon2, Params, Version};
use crypto_secretbox::{
    aead::{generic_array::GenericArray, Aead, KeyInit},
    XSalsa20Poly1305,
};
use hmac::Hmac;
use rand::{rngs::OsRng, TryRngCore};
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha512};
use thiserror::Error;
use zeroize::Zeroizing;

/// Length of the derived symmetric key.
pub const KEY_LENGTH: usize = 32;

/// Length of freshly generated salts.
pub const SALT_LENGTH: usize = 16;

/// Default Argon2id memory cost in KiB (64 MiB).
pub const ARGON2_MEMORY_KIB: u32 = 65536;
pub const ARGON2_ITERATIONS: u32 = 3;
pub const ARGON2_PARALLELISM: u32 = 4;

/// Default PBKDF2 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 210_000;

/// Upper bounds on cost parameters read from a wallet file. Anything above
/// these is treated as corruption rather than attempted.
pub const MAX_ARGON2_MEMORY_KIB: u32 = 4 * 1024 * 1024;
pub const MAX_ARGON2_ITERATIONS: u32 = 64;
pub const MAX_ARGON2_PARALLELISM: u32 = 16;
pub const MAX_PBKDF2_ITERATIONS: u32 = 10_000_000;

const KDF_ARGON2ID: &str = "ARGON2ID";
const KDF_PBKDF2: &str = "PBKDF2";
const HASH_BLAKE2B: &str = "BLAKE2B";
const HASH_SHA256: &str = "SHA256";
const HASH_SHA512: &str = "SHA512";
const CIPHER_XSALSA20_POLY1305: &str = "XSALSA20-POLY1305";
const CIPHER_AES_256_GCM: &str = "AES-256-GCM";

/// Errors that can occur while encrypting or decrypting wallet secrets.
#[derive(Debug, Error)]
pub enum KeystoreError {
    #[error("malformed field '{field}': {reason}")]
    MalformedField { field: &'static str, reason: String },

    #[error("decryption failed: wrong passphrase or corrupted wallet file")]
    DecryptionFailed,

    #[error("unsupported key derivation function: {0}")]
    UnsupportedKdf(String),

    #[error("unsupported cipher: {0}")]
    UnsupportedCipher(String),

    #[error("entropy source unavailable: {0}")]
    EntropySource(String),

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid wallet secrets: {0}")]
    InvalidSecrets(String),
}

/// Hash used inside PBKDF2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pbkdf2Hash {
    Sha256,
    Sha512,
}

impl Pbkdf2Hash {
    pub fn name(&self) -> &'static str {
        match self {
            Pbkdf2Hash::Sha256 => HASH_SHA256,
            Pbkdf2Hash::Sha512 => HASH_SHA512,
        }
    }
}

/// Passphrase stretching function and its cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kdf {
    Argon2id {
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    },
    Pbkdf2 {
        hash: Pbkdf2Hash,
        iterations: u32,
    },
}

impl Default for Kdf {
    fn default() -> Self {
        Kdf::Argon2id {
            memory_kib: ARGON2_MEMORY_KIB,
            iterations: ARGON2_ITERATIONS,
            parallelism: ARGON2_PARALLELISM,
        }
    }
}

impl Kdf {
    pub fn pbkdf2() -> Self {
        Kdf::Pbkdf2 {
            hash: Pbkdf2Hash::Sha512,
            iterations: PBKDF2_ITERATIONS,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Kdf::Argon2id { .. } => KDF_ARGON2ID,
            Kdf::Pbkdf2 { .. } => KDF_PBKDF2,
        }
    }

    fn params(&self, salt: &[u8]) -> KdfParams {
        match *self {
            Kdf::Argon2id {
                memory_kib,
                iterations,
                parallelism,
            } => KdfParams {
                dklen: KEY_LENGTH as u32,
                hash: HASH_BLAKE2B.to_string(),
                salt: hex::encode(salt),
                iterations,
                memory: Some(memory_kib),
                parallelism: Some(parallelism),
            },
            Kdf::Pbkdf2 { hash, iterations } => KdfParams {
                dklen: KEY_LENGTH as u32,
                hash: hash.name().to_string(),
                salt: hex::encode(salt),
                iterations,
                memory: None,
                parallelism: None,
            },
        }
    }

    /// Recover the KDF recorded in a file.
    fn from_file(name: &str, params: &KdfParams) -> Result<Self, KeystoreError> {
        if name.eq_ignore_ascii_case(KDF_ARGON2ID) {
            if !params.hash.eq_ignore_ascii_case(HASH_BLAKE2B) {
                return Err(KeystoreError::UnsupportedKdf(format!(
                    "{name} with hash {}",
                    params.hash
                )));
            }
            let memory_kib = params.memory.unwrap_or(ARGON2_MEMORY_KIB);
            let parallelism = params.parallelism.unwrap_or(ARGON2_PARALLELISM);
            check_bound("kdfparams.memory", memory_kib, MAX_ARGON2_MEMORY_KIB)?;
            check_bound("kdfparams.iterations", params.iterations, MAX_ARGON2_ITERATIONS)?;
            check_bound("kdfparams.parallelism", parallelism, MAX_ARGON2_PARALLELISM)?;
            return Ok(Kdf::Argon2id {
                memory_kib,
                iterations: params.iterations,
                parallelism,
            });
        }

        if name.eq_ignore_ascii_case(KDF_PBKDF2) {
            let hash = if params.hash.eq_ignore_ascii_case(HASH_SHA512) {
                Pbkdf2Hash::Sha512
            } else if params.hash.eq_ignore_ascii_case(HASH_SHA256) {
                Pbkdf2Hash::Sha256
            } else {
                return Err(KeystoreError::UnsupportedKdf(format!(
                    "{name} with hash {}",
                    params.hash
                )));
            };
            check_bound("kdfparams.iterations", params.iterations, MAX_PBKDF2_ITERATIONS)?;
            return Ok(Kdf::Pbkdf2 {
                hash,
                iterations: params.iterations,
            });
        }

        Err(KeystoreError::UnsupportedKdf(name.to_string()))
    }

    fn derive_key(
        &self,
        passphrase: &str,
        salt: &[u8],
    ) -> Result<SecretBytes<KEY_LENGTH>, KeystoreError> {
        let mut key = SecretBytes::<KEY_LENGTH>::zeroed();
        match *self {
            Kdf::Argon2id {
                memory_kib,
                iterations,
                parallelism,
            } => {
                let params = Params::new(memory_kib, iterations, parallelism, Some(KEY_LENGTH))
                    .map_err(|e| KeystoreError::KeyDerivation(e.to_string()))?;
                Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params)
                    .hash_password_into(passphrase.as_bytes(), salt, key.as_mut_bytes())
                    .map_err(|e| KeystoreError::KeyDerivation(e.to_string()))?;
            }
            Kdf::Pbkdf2 { hash, iterations } => {
                if iterations == 0 {
                    return Err(KeystoreError::KeyDerivation(
                        "PBKDF2 iteration count must be positive".to_string(),
                    ));
                }
                let out = key.as_mut_bytes();
                match hash {
                    Pbkdf2Hash::Sha256 => {
                        pbkdf2::pbkdf2::<Hmac<Sha256>>(passphrase.as_bytes(), salt, iterations, out)
                    }
                    Pbkdf2Hash::Sha512 => {
                        pbkdf2::pbkdf2::<Hmac<Sha512>>(passphrase.as_bytes(), salt, iterations, out)
                    }
                }
                .map_err(|e| KeystoreError::KeyDerivation(e.to_string()))?;
            }
        }
        Ok(key)
    }
}

/// Authenticated cipher used for the secrets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cipher {
    #[default]
    XSalsa20Poly1305,
    Aes256Gcm,
}

impl Cipher {
    pub fn name(&self) -> &'static str {
        match self {
            Cipher::XSalsa20Poly1305 => CIPHER_XSALSA20_POLY1305,
            Cipher::Aes256Gcm => CIPHER_AES_256_GCM,
        }
    }

    /// Length of the initialization vector.
    pub fn iv_length(&self) -> usize {
        match self {
            Cipher::XSalsa20Poly1305 => 24,
            Cipher::Aes256Gcm => 12,
        }
    }

    pub fn from_name(name: &str) -> Result<Self, KeystoreError> {
        if name.eq_ignore_ascii_case(CIPHER_XSALSA20_POLY1305) {
            Ok(Cipher::XSalsa20Poly1305)
        } else if name.eq_ignore_ascii_case(CIPHER_AES_256_GCM) {
            Ok(Cipher::Aes256Gcm)
        } else {
            Err(KeystoreError::UnsupportedCipher(name.to_string()))
        }
    }

    fn encrypt(
        &self,
        key: &SecretBytes<KEY_LENGTH>,
        iv: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, KeystoreError> {
        match self {
            Cipher::XSalsa20Poly1305 => XSalsa20Poly1305::new_from_slice(key.as_bytes())
                .map_err(|e| KeystoreError::Encryption(e.to_string()))?
                .encrypt(GenericArray::from_slice(iv), plaintext),
            Cipher::Aes256Gcm => Aes256Gcm::new_from_slice(key.as_bytes())
                .map_err(|e| KeystoreError::Encryption(e.to_string()))?
                .encrypt(GenericArray::from_slice(iv), plaintext),
        }
        .map_err(|e| KeystoreError::Encryption(e.to_string()))
    }

    /// Decrypt and authenticate. Any failure is reported as
    /// [`KeystoreError::DecryptionFailed`] and no plaintext is returned.
    fn decrypt(
        &self,
        key: &SecretBytes<KEY_LENGTH>,
        iv: &[u8],
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, KeystoreError> {
        match self {
            Cipher::XSalsa20Poly1305 => XSalsa20Poly1305::new_from_slice(key.as_bytes())
                .map_err(|e| KeystoreError::Encryption(e.to_string()))?
                .decrypt(GenericArray::from_slice(iv), ciphertext),
            Cipher::Aes256Gcm => Aes256Gcm::new_from_slice(key.as_bytes())
                .map_err(|e| KeystoreError::Encryption(e.to_string()))?
                .decrypt(GenericArray::from_slice(iv), ciphertext),
        }
        .map(Zeroizing::new)
        .map_err(|_| KeystoreError::DecryptionFailed)
    }
}

/// KDF and cipher choice for new wallet files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncryptionParams {
    pub kdf: Kdf,
    pub cipher: Cipher,
}

impl EncryptionParams {
    pub fn new(kdf: Kdf, cipher: Cipher) -> Self {
        Self { kdf, cipher }
    }
}

/// Cipher parameters of a wallet file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherParams {
    pub iv: String,
}

/// KDF parameters of a wallet file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    pub dklen: u32,
    pub hash: String,
    pub salt: String,
    pub iterations: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallelism: Option<u32>,
}

/// The encrypted secrets envelope (`"crypto"` in the file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedSecrets {
    pub cipher: String,
    #[serde(rename = "cipherText")]
    pub cipher_text: String,
    #[serde(rename = "cipherParams")]
    pub cipher_params: CipherParams,
    pub kdf: String,
    pub kdfparams: KdfParams,
}

impl EncryptedSecrets {
    /// Encrypt `plaintext` under a key stretched from `passphrase`.
    ///
    /// A fresh salt and IV are drawn for every call.
    pub fn seal(
        plaintext: &[u8],
        passphrase: &str,
        params: &EncryptionParams,
    ) -> Result<Self, KeystoreError> {
        let salt = random_bytes(SALT_LENGTH)?;
        let iv = random_bytes(params.cipher.iv_length())?;

        let key = params.kdf.derive_key(passphrase, &salt)?;
        let ciphertext = params.cipher.encrypt(&key, &iv, plaintext)?;

        Ok(Self {
            cipher: params.cipher.name().to_string(),
            cipher_text: hex::encode(ciphertext),
            cipher_params: CipherParams {
                iv: hex::encode(&iv),
            },
            kdf: params.kdf.name().to_string(),
            kdfparams: params.kdf.params(&salt),
        })
    }

    /// Decrypt the envelope, returning the plaintext in a wiping buffer.
    ///
    /// Algorithm names and field encodings are checked before the
    /// (expensive) key derivation runs.
    pub fn open(&self, passphrase: &str) -> Result<Zeroizing<Vec<u8>>, KeystoreError> {
        let cipher = Cipher::from_name(&self.cipher)?;
        let kdf = Kdf::from_file(&self.kdf, &self.kdfparams)?;

        if self.kdfparams.dklen as usize != KEY_LENGTH {
            return Err(KeystoreError::MalformedField {
                field: "kdfparams.dklen",
                reason: format!("expected {KEY_LENGTH}, got {}", self.kdfparams.dklen),
            });
        }

        let salt = decode_hex("kdfparams.salt", &self.kdfparams.salt)?;
        if salt.is_empty() {
            return Err(KeystoreError::MalformedField {
                field: "kdfparams.salt",
                reason: "empty salt".to_string(),
            });
        }

        let iv = decode_hex("cipherParams.iv", &self.cipher_params.iv)?;
        if iv.len() != cipher.iv_length() {
            return Err(KeystoreError::MalformedField {
                field: "cipherParams.iv",
                reason: format!(
                    "expected {} bytes for {}, got {}",
                    cipher.iv_length(),
                    cipher.name(),
                    iv.len()
                ),
            });
        }

        let ciphertext = decode_hex("cipherText", &self.cipher_text)?;

        let key = kdf.derive_key(passphrase, &salt)?;
        cipher.decrypt(&key, &iv, &ciphertext)
    }

    /// The KDF recorded in this envelope.
    pub fn kdf_params(&self) -> Result<Kdf, KeystoreError> {
        Kdf::from_file(&self.kdf, &self.kdfparams)
    }
}

/// An encrypted wallet file: plaintext metadata plus the secrets envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedWalletFile {
    pub meta: WalletMetadata,
    pub crypto: EncryptedSecrets,
}

impl EncryptedWalletFile {
    /// Encrypt `wallet`'s secrets.
    pub fn encrypt(
        wallet: &Wallet,
        passphrase: &str,
        params: &EncryptionParams,
    ) -> Result<Self, KeystoreError> {
        let plaintext = Zeroizing::new(serde_json::to_vec(wallet.secrets())?);
        let crypto = EncryptedSecrets::seal(&plaintext, passphrase, params)?;
        tracing::info!(
            kdf = %crypto.kdf,
            cipher = %crypto.cipher,
            accounts = wallet.accounts().len(),
            "encrypted wallet secrets"
        );
        Ok(Self {
            meta: wallet.metadata().clone(),
            crypto,
        })
    }

    /// Decrypt with `passphrase` and rebuild the wallet.
    pub fn decrypt(&self, passphrase: &str) -> Result<Wallet, KeystoreError> {
        let plaintext = self.crypto.open(passphrase)?;
        let secrets: WalletSecrets = serde_json::from_slice(&plaintext)
            .map_err(|e| KeystoreError::InvalidSecrets(e.to_string()))?;
        tracing::info!(
            kdf = %self.crypto.kdf,
            cipher = %self.crypto.cipher,
            accounts = secrets.accounts().len(),
            "decrypted wallet secrets"
        );
        Ok(Wallet::from_parts(self.meta.clone(), secrets))
    }

    pub fn from_json(data: &[u8]) -> Result<Self, KeystoreError> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, KeystoreError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

fn decode_hex(field: &'static str, value: &str) -> Result<Vec<u8>, KeystoreError> {
    hex::decode(value).map_err(|e| KeystoreError::MalformedField {
        field,
        reason: e.to_string(),
    })
}

fn check_bound(field: &'static str, value: u32, max: u32) -> Result<(), KeystoreError> {
    if value > max {
        return Err(KeystoreError::MalformedField {
            field,
            reason: format!("{value} exceeds the maximum of {max}"),
        });
    }
    Ok(())
}

fn random_bytes(len: usize) -> Result<Vec<u8>, KeystoreError> {
    let mut bytes = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| KeystoreError::EntropySource(e.to_string()))?;
    Ok(bytes)
}
