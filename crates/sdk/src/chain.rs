use std::{future::Future, sync::Arc, time::Duration};

use solana_sdk::{account::Account, hash::Hash, pubkey::Pubkey};

/// Read access to chain state.
pub trait ChainReader {
    /// Fetch an account. Returns `None` if it does not exist.
    fn fetch_account(
        &self,
        address: &Pubkey,
    ) -> impl Future<Output = crate::Result<Option<Account>>>;

    /// Fetch the latest blockhash.
    fn fetch_latest_blockhash(&self) -> impl Future<Output = crate::Result<Hash>>;
}

impl<T: ChainReader> ChainReader for Arc<T> {
    fn fetch_account(
        &self,
        address: &Pubkey,
    ) -> impl Future<Output = crate::Result<Option<Account>>> {
        (**self).fetch_account(address)
    }

    fn fetch_latest_blockhash(&self) -> impl Future<Output = crate::Result<Hash>> {
        (**self).fetch_latest_blockhash()
    }
}

impl<T: ChainReader> ChainReader for &T {
    fn fetch_account(
        &self,
        address: &Pubkey,
    ) -> impl Future<Output = crate::Result<Option<Account>>> {
        (**self).fetch_account(address)
    }

    fn fetch_latest_blockhash(&self) -> impl Future<Output = crate::Result<Hash>> {
        (**self).fetch_latest_blockhash()
    }
}

#[cfg(client)]
impl ChainReader for solana_client::nonblocking::rpc_client::RpcClient {
    async fn fetch_account(&self, address: &Pubkey) -> crate::Result<Option<Account>> {
        tracing::debug!(%address, "fetching account");
        let response = self
            .get_account_with_commitment(address, self.commitment())
            .await
            .map_err(crate::Error::from_client_error)?;
        Ok(response.value)
    }

    async fn fetch_latest_blockhash(&self) -> crate::Result<Hash> {
        tracing::debug!("fetching latest blockhash");
        self.get_latest_blockhash()
            .await
            .map_err(crate::Error::from_client_error)
    }
}

/// Await the future, failing with [`Error::Timeout`](crate::Error::Timeout) after `timeout`.
pub(crate) async fn with_timeout<T>(
    timeout: Option<Duration>,
    fut: impl Future<Output = crate::Result<T>>,
) -> crate::Result<T> {
    match timeout {
        Some(duration) => tokio::time::timeout(duration, fut)
            .await
            .map_err(|_| crate::Error::Timeout(duration))?,
        None => fut.await,
    }
}

#[cfg(test)]
mod tests {
    use std::future::pending;

    use super::*;

    #[tokio::test]
    async fn stalled_call_times_out() {
        let timeout = Duration::from_millis(20);
        let err = with_timeout(Some(timeout), pending::<crate::Result<()>>())
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Timeout(d) if d == timeout));
    }

    #[tokio::test]
    async fn no_timeout_passes_through() -> crate::Result<()> {
        let value = with_timeout(None, async { Ok(7) }).await?;
        assert_eq!(value, 7);
        Ok(())
    }
}
