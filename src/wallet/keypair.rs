//! Ed25519 keypairs for wallet accounts.
//!
//! A [`KeyPair`] either owns its private key (derived from a seed) or is a
//! handle to a key living on a hardware signer. Both expose the same public
//! key, path and signing surface; hardware keypairs sign by delegating to the
//! device.

// Allow unused_assignments - the ZeroizeOnDrop derive macro generates code that clippy
// incorrectly flags as unused assignments when it reads/writes struct fields for zeroization
#![allow(unused_assignments)]

use crate::utils::now_time_string;
use crate::wallet::hd::HdPath;
use crate::wallet::secret::SecretBytes;
use crate::wallet::signer::{HardwareSigner, SignerError};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sp_core::{ed25519, Pair};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of an ed25519 public key.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Length of the stored secret key: 32-byte private seed followed by the
/// 32-byte public key.
pub const SECRET_KEY_LENGTH: usize = 64;

/// Length of an ed25519 signature.
pub const SIGNATURE_LENGTH: usize = 64;

/// Errors that can occur during keypair operations.
#[derive(Debug, Error)]
pub enum KeypairError {
    #[error("invalid secret key length: expected {SECRET_KEY_LENGTH} bytes, got {0}")]
    InvalidSecretKeyLength(usize),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("secret key does not match public key")]
    PublicKeyMismatch,

    #[error("keypair has no local private key; sign through the hardware signer")]
    RequiresSigner,

    #[error("signer error: {0}")]
    Signer(#[from] SignerError),
}

/// A 32-byte ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Encode, Decode)]
pub struct PublicKey(pub [u8; PUBLIC_KEY_LENGTH]);

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.0
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeypairError> {
        let arr: [u8; PUBLIC_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            KeypairError::InvalidPublicKey(format!(
                "expected {PUBLIC_KEY_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Check an ed25519 signature against this key.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let Ok(sig_arr) = <[u8; SIGNATURE_LENGTH]>::try_from(signature) else {
            return false;
        };
        let sig = ed25519::Signature::from_raw(sig_arr);
        let public = ed25519::Public::from_raw(self.0);
        ed25519::Pair::verify(&sig, message, &public)
    }
}

impl From<[u8; PUBLIC_KEY_LENGTH]> for PublicKey {
    fn from(bytes: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

impl std::str::FromStr for PublicKey {
    type Err = KeypairError;

    /// Parse a hex public key, with or without a `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_start_matches("0x");
        let bytes = hex::decode(s).map_err(|e| KeypairError::InvalidPublicKey(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

/// Where the private half of a keypair lives.
#[derive(Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    /// Seed-derived: 32-byte private seed || 32-byte public key.
    Local(SecretBytes<SECRET_KEY_LENGTH>),
    /// Held by a hardware signer; nothing private is kept in memory.
    Hardware,
}

/// A wallet keypair together with its derivation metadata.
///
/// Equality ignores the `created` timestamp: two derivations of the same
/// path from the same source compare equal.
#[derive(Clone)]
pub struct KeyPair {
    display_name: String,
    created: String,
    path: HdPath,
    public_key: PublicKey,
    material: KeyMaterial,
}

impl PartialEq for KeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.display_name == other.display_name
            && self.path == other.path
            && self.public_key == other.public_key
            && self.material == other.material
    }
}

impl Eq for KeyPair {}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Don't expose the private key in debug output
        f.debug_struct("KeyPair")
            .field("path", &self.path.to_string())
            .field("public_key", &self.public_key)
            .field("hardware", &self.is_hardware())
            .finish()
    }
}

impl KeyPair {
    /// Build a keypair from a 32-byte ed25519 private seed.
    ///
    /// The seed buffer is consumed and wiped.
    pub fn from_secret_seed(seed: SecretBytes<32>, path: HdPath) -> Result<Self, KeypairError> {
        let pair = ed25519::Pair::from_seed(seed.as_bytes());
        let public_key = PublicKey(pair.public().0);

        let mut secret = SecretBytes::<SECRET_KEY_LENGTH>::zeroed();
        secret.as_mut_bytes()[..32].copy_from_slice(seed.as_bytes());
        secret.as_mut_bytes()[32..].copy_from_slice(&public_key.0);

        Ok(Self {
            display_name: default_display_name(&path),
            created: now_time_string(),
            path,
            public_key,
            material: KeyMaterial::Local(secret),
        })
    }

    /// Restore a seed-derived keypair from its 64-byte secret key.
    ///
    /// Fails if the trailing public key does not match the private seed.
    pub fn from_secret_key(secret_key: &[u8], path: HdPath) -> Result<Self, KeypairError> {
        if secret_key.len() != SECRET_KEY_LENGTH {
            return Err(KeypairError::InvalidSecretKeyLength(secret_key.len()));
        }
        let seed = SecretBytes::<32>::from_slice(&secret_key[..32])
            .ok_or(KeypairError::InvalidSecretKeyLength(secret_key.len()))?;
        let keypair = Self::from_secret_seed(seed, path)?;
        if keypair.public_key.0[..] != secret_key[32..] {
            return Err(KeypairError::PublicKeyMismatch);
        }
        Ok(keypair)
    }

    /// A keypair whose private key stays on a hardware signer.
    pub fn hardware(public_key: PublicKey, path: HdPath) -> Self {
        Self {
            display_name: default_display_name(&path),
            created: now_time_string(),
            path,
            public_key,
            material: KeyMaterial::Hardware,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn path(&self) -> &HdPath {
        &self.path
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn set_display_name(&mut self, name: impl Into<String>) {
        self.display_name = name.into();
    }

    pub fn created(&self) -> &str {
        &self.created
    }

    /// Carry over the creation time of the key this one was derived from.
    pub(crate) fn inherit_created(mut self, parent: &KeyPair) -> Self {
        self.created = parent.created.clone();
        self
    }

    pub fn is_hardware(&self) -> bool {
        matches!(self.material, KeyMaterial::Hardware)
    }

    /// The 64-byte secret key, or `None` for hardware keypairs.
    ///
    /// WARNING: This exposes the private key. Handle with care.
    pub fn secret_key(&self) -> Option<&SecretBytes<SECRET_KEY_LENGTH>> {
        match &self.material {
            KeyMaterial::Local(secret) => Some(secret),
            KeyMaterial::Hardware => None,
        }
    }

    /// Sign with the local private key.
    ///
    /// Hardware keypairs return [`KeypairError::RequiresSigner`]; use
    /// [`KeyPair::sign_with`] for those.
    pub fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_LENGTH], KeypairError> {
        match &self.material {
            KeyMaterial::Local(secret) => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&secret.as_bytes()[..32]);
                let pair = ed25519::Pair::from_seed(&seed);
                seed.zeroize();
                Ok(pair.sign(message).0)
            }
            KeyMaterial::Hardware => Err(KeypairError::RequiresSigner),
        }
    }

    /// Sign, delegating to `signer` when the key lives on the device.
    pub fn sign_with(
        &self,
        signer: &dyn HardwareSigner,
        message: &[u8],
    ) -> Result<[u8; SIGNATURE_LENGTH], KeypairError> {
        match self.material {
            KeyMaterial::Local(_) => self.sign(message),
            KeyMaterial::Hardware => Ok(signer.sign(&self.path, message)?),
        }
    }

    /// Verify a signature against this keypair's public key.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        self.public_key.verify(message, signature)
    }
}

fn default_display_name(path: &HdPath) -> String {
    match path.last() {
        Some(index) if path.depth() > HdPath::master().depth() => format!("Child Key {}", index),
        _ => "Master Key".to_string(),
    }
}

/// On-disk (plaintext, inside the encrypted envelope) form of a keypair.
#[derive(Serialize, Deserialize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
struct KeyPairRepr {
    #[zeroize(skip)]
    display_name: String,
    #[zeroize(skip)]
    created: String,
    #[zeroize(skip)]
    path: HdPath,
    #[zeroize(skip)]
    public_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    secret_key: Option<String>,
}

impl Serialize for KeyPair {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = KeyPairRepr {
            display_name: self.display_name.clone(),
            created: self.created.clone(),
            path: self.path.clone(),
            public_key: hex::encode(self.public_key.0),
            secret_key: self.secret_key().map(|s| hex::encode(s.as_bytes())),
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for KeyPair {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error as _;

        let repr = KeyPairRepr::deserialize(deserializer)?;
        let public_key: PublicKey = repr.public_key.parse().map_err(D::Error::custom)?;

        let material = match &repr.secret_key {
            Some(secret_hex) => {
                let mut bytes = hex::decode(secret_hex).map_err(D::Error::custom)?;
                let restored = KeyPair::from_secret_key(&bytes, repr.path.clone());
                bytes.zeroize();
                let restored = restored.map_err(D::Error::custom)?;
                if restored.public_key != public_key {
                    return Err(D::Error::custom(KeypairError::PublicKeyMismatch));
                }
                restored.material
            }
            None => KeyMaterial::Hardware,
        };

        Ok(Self {
            display_name: repr.display_name.clone(),
            created: repr.created.clone(),
            path: repr.path.clone(),
            public_key,
            material,
        })
    }
}
