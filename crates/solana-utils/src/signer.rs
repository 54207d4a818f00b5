use std::sync::Arc;

use solana_sdk::signer::Signer;

/// Shared signer that can be moved across tasks.
pub type LocalSignerRef = Arc<dyn Signer + Send + Sync>;

/// Wrap the given signer into a [`LocalSignerRef`].
pub fn local_signer(signer: impl Signer + Send + Sync + 'static) -> LocalSignerRef {
    Arc::new(signer)
}
