//! Multisig commands.

use crate::cli::utils::print_success;
use crate::config::Config;
use crate::wallet::{MultisigSpawn, PublicKey};
use clap::{Args, Subcommand};

/// Multisig command container
#[derive(Args, Clone)]
pub struct MultisigCommand {
    #[command(subcommand)]
    pub command: MultisigCommands,
}

/// Available multisig operations
#[derive(Subcommand, Clone)]
pub enum MultisigCommands {
    /// Compute the address of a multisig account
    Address {
        /// Number of signatures required
        #[arg(short, long)]
        threshold: u8,
        /// Participant public key in hex; repeat in signing order
        #[arg(short, long = "pubkey", required = true)]
        pubkeys: Vec<String>,
    },
}

/// Execute multisig commands
pub fn execute(cmd: MultisigCommand, config: &Config) -> anyhow::Result<()> {
    match cmd.command {
        MultisigCommands::Address { threshold, pubkeys } => {
            let address = multisig_address(threshold, &pubkeys, &config.hrp)?;
            print_success(&format!(
                "{}-of-{} multisig address: {}",
                threshold,
                pubkeys.len(),
                address
            ));
            Ok(())
        }
    }
}

fn multisig_address(threshold: u8, pubkeys: &[String], hrp: &str) -> anyhow::Result<String> {
    let participants = pubkeys
        .iter()
        .map(|key| {
            key.parse::<PublicKey>()
                .map_err(|e| anyhow::anyhow!("invalid public key '{}': {}", key, e))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let spawn = MultisigSpawn::build(threshold, participants)?;
    Ok(spawn.address_string(hrp)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multisig_address() {
        let keys = vec!["01".repeat(32), "02".repeat(32)];
        let a = multisig_address(2, &keys, "stest").unwrap();
        assert!(a.starts_with("stest1"));
        assert_eq!(a, multisig_address(2, &keys, "stest").unwrap());
    }

    #[test]
    fn test_multisig_address_rejects_bad_input() {
        assert!(multisig_address(1, &["zz".to_string(), "02".repeat(32)], "sm").is_err());
        assert!(multisig_address(2, &["01".repeat(32)], "sm").is_err());
        assert!(multisig_address(0, &["01".repeat(32), "02".repeat(32)], "sm").is_err());
    }
}
