//! Capability interface to an external hardware signer.
//!
//! A hardware signer keeps its seed on the device. It performs HD derivation
//! internally for the path it is given, hands back public keys and signs on
//! request. The transport (USB HID, BLE, ...) is not part of this crate;
//! integrations implement [`HardwareSigner`] on top of it.

use crate::wallet::hd::HdPath;
use crate::wallet::keypair::{PublicKey, SIGNATURE_LENGTH};
use thiserror::Error;

/// Errors reported by a hardware signer.
///
/// Signer calls are synchronous and may block; the implementation decides
/// how long to wait and reports `Timeout` or `Cancelled` when it gives up.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error("hardware signer timed out")]
    Timeout,

    #[error("hardware signer disconnected")]
    Disconnected,

    #[error("hardware signer request cancelled")]
    Cancelled,

    #[error("hardware signer rejected the request: {0}")]
    Rejected(String),
}

/// A device that derives and signs with keys it never exports.
pub trait HardwareSigner {
    /// Public key of the key at `path`, derived on the device.
    fn public_key(&self, path: &HdPath) -> Result<PublicKey, SignerError>;

    /// Sign `message` with the key at `path`.
    fn sign(&self, path: &HdPath, message: &[u8]) -> Result<[u8; SIGNATURE_LENGTH], SignerError>;
}

impl<T: HardwareSigner + ?Sized> HardwareSigner for &T {
    fn public_key(&self, path: &HdPath) -> Result<PublicKey, SignerError> {
        (**self).public_key(path)
    }

    fn sign(&self, path: &HdPath, message: &[u8]) -> Result<[u8; SIGNATURE_LENGTH], SignerError> {
        (**self).sign(path, message)
    }
}
