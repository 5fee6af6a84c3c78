//! Principal addresses derived from account templates.
//!
//! An account's address is known before the account ever appears on chain:
//! it is a hash of the template it will be spawned from together with the
//! template's spawn arguments.
//!
//! ```text
//! hash    = BLAKE3( SCALE(template) || SCALE(args) )
//! address = [0u8; 4] || hash[12..32]                     (24 bytes)
//! text    = bech32(hrp, address)
//! ```
//!
//! The network prefix (`hrp`) is always an explicit argument; nothing here
//! reads or writes process-wide state, so addresses for different networks
//! can be computed concurrently.

use crate::wallet::keypair::PublicKey;
use bech32::{FromBase32, ToBase32, Variant};
use parity_scale_codec::{Decode, Encode};
use thiserror::Error;

/// Length of an address in bytes.
pub const ADDRESS_LENGTH: usize = 24;

/// Leading bytes of an address that are always zero.
pub const ADDRESS_RESERVED_SPACE: usize = 4;

/// Template of single-signature wallet accounts.
pub const WALLET_TEMPLATE: Address = Address::template(1);

/// Template of multi-signature accounts.
pub const MULTISIG_TEMPLATE: Address = Address::template(2);

/// Errors that can occur while encoding or decoding addresses.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid bech32 encoding: {0}")]
    InvalidEncoding(String),

    #[error("address has network prefix '{found}', expected '{expected}'")]
    WrongNetwork { expected: String, found: String },

    #[error("invalid address length: expected {ADDRESS_LENGTH} bytes, got {0}")]
    InvalidLength(usize),
}

/// A 24-byte account or template address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Encode, Decode)]
pub struct Address(pub [u8; ADDRESS_LENGTH]);

impl Address {
    /// Template addresses are all zero except for the last byte.
    pub const fn template(id: u8) -> Self {
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes[ADDRESS_LENGTH - 1] = id;
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Render as bech32 under the given network prefix.
    pub fn to_bech32(&self, hrp: &str) -> Result<String, AddressError> {
        bech32::encode(hrp, self.0.to_base32(), Variant::Bech32)
            .map_err(|e| AddressError::InvalidEncoding(e.to_string()))
    }

    /// Parse a bech32 address and check that it belongs to `hrp`.
    pub fn from_bech32(text: &str, hrp: &str) -> Result<Self, AddressError> {
        let (found, data, variant) =
            bech32::decode(text).map_err(|e| AddressError::InvalidEncoding(e.to_string()))?;
        if variant != Variant::Bech32 {
            return Err(AddressError::InvalidEncoding(
                "expected bech32, got bech32m".to_string(),
            ));
        }
        if !found.eq_ignore_ascii_case(hrp) {
            return Err(AddressError::WrongNetwork {
                expected: hrp.to_string(),
                found,
            });
        }
        let bytes = Vec::<u8>::from_base32(&data)
            .map_err(|e| AddressError::InvalidEncoding(e.to_string()))?;
        let arr: [u8; ADDRESS_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::InvalidLength(bytes.len()))?;
        Ok(Self(arr))
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({})", hex::encode(self.0))
    }
}

/// Spawn arguments of the single-signature wallet template.
#[derive(Debug, Clone, Encode, Decode)]
pub struct WalletSpawnArguments {
    pub public_key: PublicKey,
}

/// Compute the principal address of an account spawned from `template`
/// with `args`.
pub fn compute_principal<A: Encode>(template: &Address, args: &A) -> Address {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&template.encode());
    hasher.update(&args.encode());
    let hash = hasher.finalize();

    let mut bytes = [0u8; ADDRESS_LENGTH];
    let tail = &hash.as_bytes()[32 - (ADDRESS_LENGTH - ADDRESS_RESERVED_SPACE)..];
    bytes[ADDRESS_RESERVED_SPACE..].copy_from_slice(tail);
    Address(bytes)
}

/// Principal address of the single-signature wallet owned by `public_key`.
pub fn wallet_principal(public_key: &PublicKey) -> Address {
    let args = WalletSpawnArguments {
        public_key: *public_key,
    };
    compute_principal(&WALLET_TEMPLATE, &args)
}

/// Bech32 address of the single-signature wallet owned by `public_key`.
///
/// # Example
/// ```
/// use smcli::wallet::{public_key_to_address, PublicKey};
/// let address = public_key_to_address(&PublicKey([1u8; 32]), "sm").unwrap();
/// assert!(address.starts_with("sm1"));
/// ```
pub fn public_key_to_address(public_key: &PublicKey, hrp: &str) -> Result<String, AddressError> {
    wallet_principal(public_key).to_bech32(hrp)
}
