//! # Squads Connect SDK
//!
//! Inspect a Squads v4 multisig and propose SOL transfers out of its vault.

#![deny(missing_docs)]

/// Error type.
pub mod error;

/// Squads v4 program interface.
pub mod squads;

/// Reading chain state.
pub mod chain;

/// Wallet capability.
pub mod wallet;

/// Vault inspection.
pub mod inspector;

/// Proposal construction and submission.
pub mod proposal;

/// Connect, load and submit flow.
pub mod flow;

/// Utils.
pub mod utils;

pub use error::{Error, ErrorKind};

/// Result type.
pub type Result<T> = std::result::Result<T, Error>;

pub use squads_connect_solana_utils as solana_utils;

pub use chain::ChainReader;
pub use flow::{Connection, Failure, FlowConfig, FlowEvent, FlowState, VaultTransferFlow};
pub use inspector::{VaultConfig, VaultInspector};
pub use proposal::{
    MessagePayer, PreparedProposal, ProposalBuilder, ProposalOptions, ProposalSubmission,
    TransferRequest,
};
pub use utils::{Lamport, Sol};
#[cfg(client)]
pub use wallet::LocalWallet;
pub use wallet::{WalletProvider, WalletSession};
