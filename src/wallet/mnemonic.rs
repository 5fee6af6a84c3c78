//! BIP39 recovery phrases: generation, strict validation and seed derivation.
//!
//! Phrases are accepted only in canonical form: words separated by exactly
//! one ASCII space with no leading or trailing whitespace. The BIP39 parser
//! on its own tolerates sloppy spacing, so the canonical-form check runs
//! before the word-count/checksum check.

// Allow unused_assignments - the ZeroizeOnDrop derive macro generates code that clippy
// incorrectly flags as unused assignments when it reads/writes struct fields for zeroization
#![allow(unused_assignments)]

use crate::wallet::secret::Seed;
use bip39::Mnemonic as Bip39Mnemonic;
use rand::{rngs::OsRng, TryRngCore};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Entropy drawn for a new phrase, sized to an ed25519 private key seed.
pub const DEFAULT_ENTROPY_BITS: usize = 256;

/// Errors that can occur during mnemonic operations.
#[derive(Debug, Error)]
pub enum MnemonicError {
    #[error("whitespace violation in mnemonic phrase")]
    WhitespaceViolation,

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("invalid word count: {0}. Must be 12, 15, 18, 21, or 24")]
    InvalidWordCount(usize),

    #[error("entropy source unavailable: {0}")]
    EntropySource(String),
}

/// A validated BIP39 mnemonic phrase.
///
/// The phrase is securely zeroed from memory when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct Mnemonic {
    #[zeroize(skip)]
    inner: Bip39Mnemonic,
    phrase: String,
}

impl std::fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Don't expose the actual phrase in debug output
        f.debug_struct("Mnemonic")
            .field("word_count", &self.word_count())
            .finish()
    }
}

impl PartialEq for Mnemonic {
    fn eq(&self, other: &Self) -> bool {
        self.phrase == other.phrase
    }
}

impl Eq for Mnemonic {}

impl Mnemonic {
    /// Generate a new 24-word phrase from 256 bits of OS entropy.
    ///
    /// # Example
    /// ```
    /// use smcli::wallet::Mnemonic;
    /// let mnemonic = Mnemonic::generate().unwrap();
    /// assert_eq!(mnemonic.word_count(), 24);
    /// ```
    pub fn generate() -> Result<Self, MnemonicError> {
        Self::generate_with_words(DEFAULT_ENTROPY_BITS / 32 * 3)
    }

    /// Generate a new mnemonic with the specified number of words.
    ///
    /// # Arguments
    /// * `word_count` - Number of words (12, 15, 18, 21, or 24)
    pub fn generate_with_words(word_count: usize) -> Result<Self, MnemonicError> {
        let entropy_bits = match word_count {
            12 => 128,
            15 => 160,
            18 => 192,
            21 => 224,
            24 => 256,
            _ => return Err(MnemonicError::InvalidWordCount(word_count)),
        };

        let mut entropy = vec![0u8; entropy_bits / 8];
        let drawn = OsRng
            .try_fill_bytes(&mut entropy)
            .map_err(|e| MnemonicError::EntropySource(e.to_string()));
        if let Err(e) = drawn {
            entropy.zeroize();
            return Err(e);
        }

        let inner = Bip39Mnemonic::from_entropy(&entropy)
            .map_err(|e| MnemonicError::InvalidMnemonic(e.to_string()));
        entropy.zeroize();
        let inner = inner?;

        let phrase = inner.to_string();
        tracing::debug!(words = word_count, "generated new mnemonic");
        Ok(Self { inner, phrase })
    }

    /// Validate a user-supplied phrase and wrap it.
    ///
    /// Rejects the phrase with [`MnemonicError::WhitespaceViolation`] unless
    /// re-joining its words with single spaces reproduces it exactly, and
    /// with [`MnemonicError::InvalidMnemonic`] if the word count or checksum
    /// is wrong.
    ///
    /// # Example
    /// ```
    /// use smcli::wallet::Mnemonic;
    /// let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
    /// assert!(Mnemonic::from_phrase(phrase).is_ok());
    /// assert!(Mnemonic::from_phrase(&format!("{} ", phrase)).is_err());
    /// ```
    pub fn from_phrase(phrase: &str) -> Result<Self, MnemonicError> {
        let mut canonical = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
        let exact = canonical == phrase;
        canonical.zeroize();
        if !exact {
            return Err(MnemonicError::WhitespaceViolation);
        }

        let inner = Bip39Mnemonic::parse_normalized(phrase)
            .map_err(|e| MnemonicError::InvalidMnemonic(e.to_string()))?;

        Ok(Self {
            inner,
            phrase: phrase.to_string(),
        })
    }

    /// Check a phrase without keeping it.
    pub fn validate(phrase: &str) -> Result<(), MnemonicError> {
        Self::from_phrase(phrase).map(|_| ())
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn word_count(&self) -> usize {
        self.inner.word_count()
    }

    /// Derive the 64-byte BIP39 seed.
    ///
    /// Pure: the same phrase and passphrase always give the same seed.
    pub fn to_seed(&self, passphrase: &str) -> Seed {
        let mut raw = self.inner.to_seed(passphrase);
        let seed = Seed::new(raw);
        raw.zeroize();
        seed
    }
}
