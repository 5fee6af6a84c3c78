//! CLI command implementations
//!
//! Each module contains the command definitions and execution logic
//! for a specific category of operations.

pub mod multisig;
pub mod wallet;
