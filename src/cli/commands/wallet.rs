//! Wallet commands: create, restore, read and list wallet files.

use crate::cli::utils::{
    confirm, create_table_with_headers, format_truncated, print_info, print_success,
    print_warning, prompt_mnemonic, prompt_new_passphrase, prompt_passphrase, spinner,
};
use crate::cli::Cli;
use crate::config::{Config, DEFAULT_ACCOUNTS, MAX_ACCOUNTS_PER_WALLET};
use crate::error::Error;
use crate::wallet::{
    default_wallet_path, list_wallet_files, public_key_to_address, read_wallet_file,
    write_wallet_file, EncryptionParams, Kdf, KeyPair, StoreError, Wallet,
};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

/// Wallet command container
#[derive(Args, Clone)]
pub struct WalletCommand {
    #[command(subcommand)]
    pub command: WalletCommands,
}

/// Available wallet operations
#[derive(Subcommand, Clone)]
pub enum WalletCommands {
    /// Create a new wallet, or restore one from a recovery phrase
    Create {
        /// Number of accounts to derive
        #[arg(short, long, default_value_t = DEFAULT_ACCOUNTS)]
        accounts: usize,
        /// Restore from an existing recovery phrase instead of generating one
        #[arg(long)]
        restore: bool,
        /// Output file (default: <wallet dir>/wallet_<created>.json)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Display name stored in the wallet metadata
        #[arg(long)]
        name: Option<String>,
        /// Use PBKDF2 instead of Argon2id for the passphrase
        #[arg(long)]
        pbkdf2: bool,
    },

    /// Decrypt a wallet file and show its accounts
    Read {
        /// Wallet file
        path: PathBuf,
        /// Also show the recovery phrase and private keys
        #[arg(long)]
        private: bool,
    },

    /// List wallet files
    List {
        /// Directory to search (default: the wallet directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

/// Execute wallet commands
pub fn execute(cmd: WalletCommand, cli: &Cli, config: &Config) -> anyhow::Result<()> {
    match cmd.command {
        WalletCommands::Create {
            accounts,
            restore,
            out,
            name,
            pbkdf2,
        } => create_wallet(accounts, restore, out, name, pbkdf2, cli, config),
        WalletCommands::Read { path, private } => read_wallet(&path, private, config),
        WalletCommands::List { dir } => list_wallets(dir.as_deref().unwrap_or(&config.wallet_dir)),
    }
}

fn create_wallet(
    accounts: usize,
    restore: bool,
    out: Option<PathBuf>,
    name: Option<String>,
    pbkdf2: bool,
    cli: &Cli,
    config: &Config,
) -> anyhow::Result<()> {
    if accounts > MAX_ACCOUNTS_PER_WALLET {
        return Err(Error::invalid_parameter(format!(
            "at most {} accounts per wallet, got {}",
            MAX_ACCOUNTS_PER_WALLET, accounts
        ))
        .into());
    }

    let mut wallet = if restore {
        let phrase = prompt_mnemonic()?;
        Wallet::from_mnemonic(&phrase, accounts)?
    } else {
        Wallet::from_random_mnemonic(accounts)?
    };
    wallet.set_display_name(name.unwrap_or_else(|| config.display_name.clone()));
    wallet.set_genesis_id(config.genesis_id.clone());

    if !restore {
        if let Some(mnemonic) = wallet.mnemonic() {
            print_warning("IMPORTANT: Write down this recovery phrase and keep it safe!");
            println!();
            println!("{}", mnemonic.phrase());
            println!();
            if !confirm("Have you saved the recovery phrase?", cli.no_prompt) {
                print_info("Aborted");
                return Ok(());
            }
        }
    }

    let passphrase = prompt_new_passphrase()?;
    let params = if pbkdf2 {
        EncryptionParams::new(Kdf::pbkdf2(), Default::default())
    } else {
        EncryptionParams::default()
    };

    let sp = spinner("Encrypting wallet...");
    let file = wallet.encrypt(&passphrase, &params);
    sp.finish_and_clear();
    let file = file?;

    let path = out.unwrap_or_else(|| default_wallet_path(&config.wallet_dir, &file));
    match write_wallet_file(&path, &file, false) {
        Ok(()) => {}
        Err(StoreError::AlreadyExists(existing)) => {
            print_warning(&format!("{} already exists", existing.display()));
            if !confirm("Overwrite existing wallet file?", cli.no_prompt) {
                print_info("Aborted");
                return Ok(());
            }
            write_wallet_file(&path, &file, true)?;
        }
        Err(e) => return Err(e.into()),
    }

    print_success(&format!("Wallet saved to {}", path.display()));
    print_accounts(wallet.accounts(), &config.hrp, false)?;
    Ok(())
}

fn read_wallet(path: &Path, private: bool, config: &Config) -> anyhow::Result<()> {
    let file = read_wallet_file(path)?;
    let passphrase = prompt_passphrase("Enter the wallet passphrase")?;

    let sp = spinner("Decrypting wallet...");
    let wallet = file.decrypt(&passphrase);
    sp.finish_and_clear();
    let wallet = wallet?;

    println!("Name:       {}", wallet.display_name());
    println!("Created:    {}", wallet.metadata().created);
    if !wallet.genesis_id().is_empty() {
        println!("Genesis ID: {}", wallet.genesis_id());
    }
    println!(
        "Master key: {} ({})",
        wallet.master_keypair().public_key(),
        wallet.master_keypair().path()
    );

    if private {
        print_warning("Private material below. Do not share it.");
        match wallet.mnemonic() {
            Some(mnemonic) => println!("Recovery phrase: {}", mnemonic.phrase()),
            None => println!("Recovery phrase: (hardware wallet)"),
        }
    }

    println!();
    print_accounts(wallet.accounts(), &config.hrp, private)
}

fn print_accounts(accounts: &[KeyPair], hrp: &str, private: bool) -> anyhow::Result<()> {
    if accounts.is_empty() {
        print_info("No accounts");
        return Ok(());
    }

    let mut headers = vec!["Account", "Path", "Public Key", "Address"];
    if private {
        headers.push("Secret Key");
    }
    let mut table = create_table_with_headers(&headers);

    for account in accounts {
        let mut row = vec![
            account.display_name().to_string(),
            account.path().to_string(),
            if private {
                account.public_key().to_string()
            } else {
                format_truncated(&account.public_key().to_string())
            },
            public_key_to_address(account.public_key(), hrp)?,
        ];
        if private {
            row.push(
                account
                    .secret_key()
                    .map(|secret| hex::encode(secret.as_bytes()))
                    .unwrap_or_else(|| "(hardware)".to_string()),
            );
        }
        table.add_row(row);
    }

    println!("{table}");
    Ok(())
}

fn list_wallets(dir: &Path) -> anyhow::Result<()> {
    let files = list_wallet_files(dir)?;
    if files.is_empty() {
        print_info(&format!("No wallets found in {}", dir.display()));
        return Ok(());
    }

    let mut table = create_table_with_headers(&["File", "Name", "Created"]);
    for path in &files {
        // Other JSON files may share the directory
        let (name, created) = match read_wallet_file(path) {
            Ok(file) => (file.meta.display_name, file.meta.created),
            Err(_) => continue,
        };
        table.add_row(vec![path.display().to_string(), name, created]);
    }

    println!("{table}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::Cipher;
    use clap::Parser;
    use tempfile::tempdir;

    #[test]
    fn test_list_wallets_skips_foreign_json() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("other.json"), b"{}").unwrap();

        let params = EncryptionParams::new(
            Kdf::Argon2id {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
            Cipher::default(),
        );
        let file = Wallet::from_random_mnemonic(1)
            .unwrap()
            .encrypt("pw", &params)
            .unwrap();
        write_wallet_file(&default_wallet_path(dir.path(), &file), &file, false).unwrap();

        list_wallets(dir.path()).unwrap();
    }

    #[test]
    fn test_create_rejects_too_many_accounts() {
        let cli = Cli::parse_from(["smcli", "--no-prompt", "wallet", "list"]);
        let err = create_wallet(
            MAX_ACCOUNTS_PER_WALLET + 1,
            false,
            None,
            None,
            false,
            &cli,
            &Config::new(),
        )
        .unwrap_err();
        assert!(err
            .downcast_ref::<Error>()
            .is_some_and(Error::is_input_error));
    }

    #[test]
    fn test_print_accounts() {
        let wallet = Wallet::from_random_mnemonic(2).unwrap();
        print_accounts(wallet.accounts(), "sm", true).unwrap();
        print_accounts(&[], "sm", false).unwrap();
    }
}
