//! Squads v4 program interface.
//!
//! Only the parts needed to inspect a multisig and to propose vault transactions
//! are implemented here: PDA derivation, the `Multisig` account layout, the compact
//! transaction message and the `vault_transaction_create` / `proposal_create`
//! instructions. See <https://github.com/Squads-Protocol/v4> for the program.

mod small_vec;

/// Functions for constructing Program Derived Addresses.
pub mod pda;

/// Account layouts.
pub mod accounts;

/// Compact transaction message.
pub mod message;

/// Instruction builders.
pub mod instructions;

use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;

pub use self::{
    accounts::{Member, Multisig, Permission, Permissions},
    message::TransactionMessage,
    pda::{get_proposal_pda, get_transaction_pda, get_vault_pda},
    small_vec::SmallVec,
};

/// Program ID of Squads v4 on mainnet-beta and devnet.
pub const ID: Pubkey = solana_sdk::pubkey!("SQDS4ep65T869zMMBKyuUq6aD6EgTu8psMjkvj52pCf");

/// Anchor discriminator: the first 8 bytes of `sha256("{namespace}:{name}")`.
pub(crate) fn discriminator(namespace: &str, name: &str) -> [u8; 8] {
    let hash = Sha256::digest(format!("{namespace}:{name}").as_bytes());
    let mut discriminator = [0; 8];
    discriminator.copy_from_slice(&hash[..8]);
    discriminator
}
