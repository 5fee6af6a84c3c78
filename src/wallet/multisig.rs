//! Spawn parameters for multi-signature accounts.
//!
//! A multisig account is addressed exactly like a single-signature wallet,
//! but from the multisig template and with `(threshold, participants)` as
//! spawn arguments. Participant order is part of the address.

use crate::wallet::address::{compute_principal, Address, AddressError, MULTISIG_TEMPLATE};
use crate::wallet::keypair::PublicKey;
use parity_scale_codec::{Decode, Encode};
use thiserror::Error;

/// Smallest number of participants a multisig account can have.
pub const MIN_PARTICIPANTS: usize = 2;

/// Errors that can occur while building multisig spawn parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MultisigError {
    #[error("invalid number of participants: {0} (at least {MIN_PARTICIPANTS} required)")]
    InvalidParticipantCount(usize),

    #[error("invalid threshold: {threshold} for {participants} participants")]
    InvalidThreshold { threshold: u8, participants: usize },

    #[error("address error: {0}")]
    Address(#[from] AddressError),
}

/// Spawn arguments of the multisig template, in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct MultisigSpawnArguments {
    pub required: u8,
    pub public_keys: Vec<PublicKey>,
}

/// Validated multisig parameters and the address they spawn at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultisigSpawn {
    args: MultisigSpawnArguments,
    address: Address,
}

impl MultisigSpawn {
    /// Validate `threshold` against `participants` and compute the address.
    ///
    /// The participant count is checked first, so a single participant is
    /// always reported as [`MultisigError::InvalidParticipantCount`] whatever
    /// the threshold.
    pub fn build(threshold: u8, participants: Vec<PublicKey>) -> Result<Self, MultisigError> {
        if participants.len() < MIN_PARTICIPANTS {
            return Err(MultisigError::InvalidParticipantCount(participants.len()));
        }
        if threshold < 1 || usize::from(threshold) > participants.len() {
            return Err(MultisigError::InvalidThreshold {
                threshold,
                participants: participants.len(),
            });
        }

        let args = MultisigSpawnArguments {
            required: threshold,
            public_keys: participants,
        };
        let address = compute_principal(&MULTISIG_TEMPLATE, &args);
        tracing::debug!(
            threshold,
            participants = args.public_keys.len(),
            "computed multisig principal"
        );
        Ok(Self { args, address })
    }

    pub fn threshold(&self) -> u8 {
        self.args.required
    }

    pub fn participants(&self) -> &[PublicKey] {
        &self.args.public_keys
    }

    pub fn arguments(&self) -> &MultisigSpawnArguments {
        &self.args
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// The address as bech32 under `hrp`.
    pub fn address_string(&self, hrp: &str) -> Result<String, AddressError> {
        self.address.to_bech32(hrp)
    }
}

/// Validate the parameters and return the multisig account's address.
pub fn spawn_multisig(threshold: u8, participants: &[PublicKey]) -> Result<Address, MultisigError> {
    MultisigSpawn::build(threshold, participants.to_vec()).map(|spawn| spawn.address())
}
