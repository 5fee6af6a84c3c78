//! Hierarchical deterministic derivation of wallet keypairs.
//!
//! Seed-backed wallets use SLIP-0010 for ed25519: every level is hardened,
//! the master node comes from `HMAC-SHA512("ed25519 seed", seed)` and each
//! child from `HMAC-SHA512(chain_code, 0x00 || key || ser32(i | 2^31))`.
//!
//! ```text
//! master   m/44'/540'/0'/0'
//! account  m/44'/540'/0'/0'/i'
//! ```
//!
//! Hardware-backed wallets run the same paths on the device; this module only
//! asks the signer for the resulting public keys.

use crate::config::{
    BIP44_ACCOUNT, BIP44_CHANGE, BIP44_COIN_TYPE, BIP44_PURPOSE, MAX_ACCOUNTS_PER_WALLET,
};
use crate::wallet::keypair::{KeyPair, KeypairError};
use crate::wallet::secret::{SecretBytes, Seed};
use crate::wallet::signer::{HardwareSigner, SignerError};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::Sha512;
use thiserror::Error;
use zeroize::Zeroize;

type HmacSha512 = Hmac<Sha512>;

/// The hardened index offset (0x80000000) per BIP-32/SLIP-0010.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// HMAC key for master key generation per SLIP-0010.
const MASTER_HMAC_KEY: &[u8] = b"ed25519 seed";

/// Errors that can occur during key derivation.
#[derive(Debug, Error)]
pub enum DerivationError {
    #[error("invalid number of accounts: {requested} (maximum {max})")]
    InvalidAccountCount { requested: usize, max: usize },

    #[error("derivation index {0} is out of range for hardened derivation")]
    InvalidIndex(u32),

    #[error("invalid derivation path: {0}")]
    InvalidPath(String),

    #[error("key source does not match the master keypair")]
    ProvenanceMismatch,

    #[error("HMAC failure: {0}")]
    Hmac(String),

    #[error("signer error: {0}")]
    Signer(#[from] SignerError),

    #[error("keypair error: {0}")]
    Keypair(#[from] KeypairError),
}

/// A fully hardened derivation path such as `m/44'/540'/0'/0'/3'`.
///
/// Indices are stored without the hardened bit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HdPath(Vec<u32>);

impl HdPath {
    /// The path every wallet's master keypair lives at.
    pub fn master() -> Self {
        Self(vec![BIP44_PURPOSE, BIP44_COIN_TYPE, BIP44_ACCOUNT, BIP44_CHANGE])
    }

    /// Extend this path by one hardened level.
    pub fn child(&self, index: u32) -> Result<Self, DerivationError> {
        if index >= HARDENED_OFFSET {
            return Err(DerivationError::InvalidIndex(index));
        }
        let mut indices = self.0.clone();
        indices.push(index);
        Ok(Self(indices))
    }

    pub fn indices(&self) -> &[u32] {
        &self.0
    }

    /// The last index on the path, if any.
    pub fn last(&self) -> Option<u32> {
        self.0.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl std::fmt::Display for HdPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "m")?;
        for index in &self.0 {
            write!(f, "/{}'", index)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for HdPath {
    type Err = DerivationError;

    /// Parse `m/44'/540'/0'`; `h` is accepted as the hardened marker too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix('m')
            .ok_or_else(|| DerivationError::InvalidPath(format!("must start with 'm': {s}")))?;
        if rest.is_empty() {
            return Ok(Self(Vec::new()));
        }
        let rest = rest
            .strip_prefix('/')
            .ok_or_else(|| DerivationError::InvalidPath(s.to_string()))?;

        let mut indices = Vec::new();
        for segment in rest.split('/') {
            let number = segment
                .strip_suffix('\'')
                .or_else(|| segment.strip_suffix('h'))
                .ok_or_else(|| {
                    DerivationError::InvalidPath(format!(
                        "ed25519 requires hardened segments, got '{segment}'"
                    ))
                })?;
            let index: u32 = number
                .parse()
                .map_err(|_| DerivationError::InvalidPath(format!("bad index '{segment}'")))?;
            if index >= HARDENED_OFFSET {
                return Err(DerivationError::InvalidIndex(index));
            }
            indices.push(index);
        }
        Ok(Self(indices))
    }
}

impl Serialize for HdPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HdPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Where child keys come from.
///
/// Seed-backed wallets derive locally; hardware-backed wallets have no seed
/// and ask the device.
#[derive(Clone, Copy)]
pub enum KeySource<'a> {
    Seed(&'a Seed),
    Hardware(&'a dyn HardwareSigner),
}

impl std::fmt::Debug for KeySource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Seed(_) => write!(f, "KeySource::Seed(..)"),
            KeySource::Hardware(_) => write!(f, "KeySource::Hardware"),
        }
    }
}

/// Derive the 32-byte ed25519 private seed at `path` (SLIP-0010).
pub fn derive_secret(seed: &Seed, path: &HdPath) -> Result<SecretBytes<32>, DerivationError> {
    let (mut key, mut chain_code) = hmac_split(MASTER_HMAC_KEY, &[&seed.as_bytes()[..]])?;

    for &index in path.indices() {
        let hardened = (index | HARDENED_OFFSET).to_be_bytes();
        let (child_key, child_chain) =
            hmac_split(chain_code.as_bytes(), &[&[0x00u8][..], &key.as_bytes()[..], &hardened[..]])?;
        key = child_key;
        chain_code = child_chain;
    }

    Ok(key)
}

/// HMAC-SHA512 over `parts`, split into (IL, IR).
fn hmac_split(
    key: &[u8],
    parts: &[&[u8]],
) -> Result<(SecretBytes<32>, SecretBytes<32>), DerivationError> {
    let mut mac =
        HmacSha512::new_from_slice(key).map_err(|e| DerivationError::Hmac(e.to_string()))?;
    for part in parts {
        mac.update(part);
    }
    let mut out = mac.finalize().into_bytes();

    let mut left = SecretBytes::<32>::zeroed();
    let mut right = SecretBytes::<32>::zeroed();
    left.as_mut_bytes().copy_from_slice(&out[..32]);
    right.as_mut_bytes().copy_from_slice(&out[32..]);
    out.as_mut_slice().zeroize();

    Ok((left, right))
}

/// Derive the master keypair from a BIP39 seed.
pub fn master_from_seed(seed: &Seed) -> Result<KeyPair, DerivationError> {
    let path = HdPath::master();
    let secret = derive_secret(seed, &path)?;
    Ok(KeyPair::from_secret_seed(secret, path)?)
}

/// Build the master keypair of a hardware-backed wallet.
///
/// Only the public key is fetched; the returned keypair holds no private
/// material and signs through the device.
pub fn master_from_hardware(signer: &dyn HardwareSigner) -> Result<KeyPair, DerivationError> {
    let path = HdPath::master();
    let public_key = signer.public_key(&path)?;
    tracing::debug!(path = %path, "fetched master public key from hardware signer");
    Ok(KeyPair::hardware(public_key, path))
}

/// Derive account `index` under `master`.
///
/// A seed-derived master needs [`KeySource::Seed`] with the seed it came from
/// (the keypair does not keep its chain code); a hardware master needs
/// [`KeySource::Hardware`].
pub fn derive_child(
    master: &KeyPair,
    source: KeySource<'_>,
    index: u32,
) -> Result<KeyPair, DerivationError> {
    let path = master.path().child(index)?;
    match (source, master.is_hardware()) {
        (KeySource::Seed(seed), false) => {
            let secret = derive_secret(seed, &path)?;
            Ok(KeyPair::from_secret_seed(secret, path)?.inherit_created(master))
        }
        (KeySource::Hardware(signer), true) => {
            let public_key = signer.public_key(&path)?;
            Ok(KeyPair::hardware(public_key, path).inherit_created(master))
        }
        _ => Err(DerivationError::ProvenanceMismatch),
    }
}

/// Derive accounts `0..n` in order.
///
/// Stops at the first failure and returns only the error.
pub fn derive_accounts(
    master: &KeyPair,
    source: KeySource<'_>,
    n: usize,
) -> Result<Vec<KeyPair>, DerivationError> {
    if n > MAX_ACCOUNTS_PER_WALLET {
        return Err(DerivationError::InvalidAccountCount {
            requested: n,
            max: MAX_ACCOUNTS_PER_WALLET,
        });
    }

    let mut accounts = Vec::with_capacity(n);
    for index in 0..n {
        // n <= MAX_ACCOUNTS_PER_WALLET, so the cast cannot truncate
        accounts.push(derive_child(master, source, index as u32)?);
    }
    tracing::debug!(count = n, "derived accounts");
    Ok(accounts)
}
