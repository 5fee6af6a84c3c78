//! Error types for smcli

use crate::wallet::{
    AddressError, DerivationError, KeypairError, KeystoreError, MnemonicError, MultisigError,
    SignerError, StoreError, WalletError,
};
use thiserror::Error;

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for smcli
///
/// Wraps the error of every wallet module unchanged, so callers can match on
/// the original variant.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Mnemonic(#[from] MnemonicError),

    #[error(transparent)]
    Derivation(#[from] DerivationError),

    #[error(transparent)]
    Signer(#[from] SignerError),

    #[error(transparent)]
    Keypair(#[from] KeypairError),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Multisig(#[from] MultisigError),

    #[error(transparent)]
    Keystore(#[from] KeystoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl Error {
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Error::InvalidParameter(msg.into())
    }

    /// True for errors caused by bad user input rather than the environment.
    ///
    /// Errors wrapped in [`WalletError`] are classified by their source.
    pub fn is_input_error(&self) -> bool {
        match self {
            Error::Mnemonic(e) => is_input_mnemonic(e),
            Error::Derivation(e) => is_input_derivation(e),
            Error::Multisig(e) => is_input_multisig(e),
            Error::Keystore(e) => is_input_keystore(e),
            Error::Wallet(WalletError::Mnemonic(e)) => is_input_mnemonic(e),
            Error::Wallet(WalletError::Derivation(e)) => is_input_derivation(e),
            Error::Wallet(WalletError::Keystore(e)) => is_input_keystore(e),
            Error::InvalidParameter(_) => true,
            _ => false,
        }
    }
}

fn is_input_mnemonic(e: &MnemonicError) -> bool {
    matches!(
        e,
        MnemonicError::WhitespaceViolation
            | MnemonicError::InvalidMnemonic(_)
            | MnemonicError::InvalidWordCount(_)
    )
}

fn is_input_derivation(e: &DerivationError) -> bool {
    matches!(e, DerivationError::InvalidAccountCount { .. })
}

fn is_input_multisig(e: &MultisigError) -> bool {
    matches!(
        e,
        MultisigError::InvalidThreshold { .. } | MultisigError::InvalidParticipantCount(_)
    )
}

fn is_input_keystore(e: &KeystoreError) -> bool {
    matches!(e, KeystoreError::MalformedField { .. })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions_preserve_variant() {
        let err: Error = MultisigError::InvalidParticipantCount(1).into();
        assert!(matches!(
            err,
            Error::Multisig(MultisigError::InvalidParticipantCount(1))
        ));
        assert!(err.is_input_error());

        let err: Error = KeystoreError::DecryptionFailed.into();
        assert!(!err.is_input_error());
        assert_eq!(
            err.to_string(),
            "decryption failed: wrong passphrase or corrupted wallet file"
        );
    }

    #[test]
    fn test_wallet_errors_classified_by_source() {
        let err: Error = WalletError::from(MnemonicError::WhitespaceViolation).into();
        assert!(err.is_input_error());

        let err: Error = WalletError::from(DerivationError::InvalidAccountCount {
            requested: 101,
            max: 100,
        })
        .into();
        assert!(err.is_input_error());

        let err: Error = WalletError::from(DerivationError::ProvenanceMismatch).into();
        assert!(!err.is_input_error());

        let err: Error = WalletError::from(KeystoreError::DecryptionFailed).into();
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_invalid_parameter() {
        let err = Error::invalid_parameter("threshold");
        assert_eq!(err.to_string(), "Invalid parameter: threshold");
    }
}
