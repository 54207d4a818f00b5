/// Inspect.
pub mod inspect;

/// Block explorer links.
pub mod explorer;

pub use self::{
    explorer::{account_url, Explorer},
    inspect::inspect_transaction,
};
