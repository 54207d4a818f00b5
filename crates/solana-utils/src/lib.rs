#![deny(missing_docs)]
#![deny(unreachable_pub)]

//! # Squads Connect Solana Utils

/// Error type.
pub mod error;

/// Cluster.
pub mod cluster;

/// Signer.
pub mod signer;

/// RPC configuration.
pub mod config;

/// RPC client extension.
#[cfg(client)]
pub mod client;

/// Utils.
pub mod utils;

pub use crate::error::Error;

/// Result type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(client)]
pub use solana_client;
pub use solana_sdk;
