/// Amounts.
pub mod amount;

/// Serialization utils.
pub mod serde;

/// Test utils.
#[cfg(test)]
pub(crate) mod test;

pub use self::amount::{Lamport, Sol};
pub use self::serde::StringPubkey;
