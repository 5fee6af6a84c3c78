//! Fixed-size secret buffers that are wiped when they go out of scope.
//!
//! Seeds, derived private keys and symmetric keys all live in a
//! [`SecretBytes`]. The buffer is overwritten on drop, so every exit path
//! (including `?` early returns and panics that unwind) clears the memory.

// Allow unused_assignments - the ZeroizeOnDrop derive macro generates code that clippy
// incorrectly flags as unused assignments when it reads/writes struct fields for zeroization
#![allow(unused_assignments)]

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of a BIP39 seed in bytes.
pub const SEED_LENGTH: usize = 64;

/// A fixed-size byte buffer holding secret material.
///
/// Does not implement `Debug` output of its contents, `Display`, or `Copy`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes<const N: usize>([u8; N]);

impl<const N: usize> SecretBytes<N> {
    /// Take ownership of `bytes`. The caller's copy is not touched, so pass
    /// a temporary or wipe the source afterwards.
    pub fn new(bytes: [u8; N]) -> Self {
        Self(bytes)
    }

    /// A buffer of zeroes, to be filled in place.
    pub fn zeroed() -> Self {
        Self([0u8; N])
    }

    /// Copy from a slice, wiping nothing on the source side.
    ///
    /// Returns `None` when the slice length is not `N`.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != N {
            return None;
        }
        let mut out = Self::zeroed();
        out.0.copy_from_slice(bytes);
        Some(out)
    }

    pub fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }

    pub fn as_mut_bytes(&mut self) -> &mut [u8; N] {
        &mut self.0
    }

    /// Run `f` with a borrow of the secret and wipe the buffer afterwards.
    ///
    /// This is the acquire/use/wipe pattern for call sites that need the
    /// bytes exactly once; the wipe happens even if `f` returns an error.
    pub fn consume<T>(self, f: impl FnOnce(&[u8; N]) -> T) -> T {
        f(&self.0)
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }
}

impl<const N: usize> PartialEq for SecretBytes<N> {
    fn eq(&self, other: &Self) -> bool {
        // no early exit on the first differing byte
        self.0
            .iter()
            .zip(other.0.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl<const N: usize> Eq for SecretBytes<N> {}

impl<const N: usize> std::fmt::Debug for SecretBytes<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretBytes<{}>(..)", N)
    }
}

/// A BIP39 seed. Only exists while a wallet is being built.
pub type Seed = SecretBytes<SEED_LENGTH>;
