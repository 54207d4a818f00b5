use std::{future::Future, time::Duration};

use solana_client::{
    client_error::ClientError as SolanaClientError, nonblocking::rpc_client::RpcClient,
    rpc_client::SerializableTransaction, rpc_config::RpcSendTransactionConfig,
    rpc_request::RpcError,
};
use solana_sdk::{commitment_config::CommitmentConfig, signature::Signature};
use tokio::time::sleep;

const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Send a transaction and wait until it lands or its blockhash expires.
pub trait SendAndConfirm {
    /// Send and confirm the given transaction with the given send config.
    fn send_and_confirm_transaction_with_config(
        &self,
        transaction: &impl SerializableTransaction,
        config: RpcSendTransactionConfig,
    ) -> impl Future<Output = std::result::Result<Signature, SolanaClientError>>;
}

impl SendAndConfirm for RpcClient {
    async fn send_and_confirm_transaction_with_config(
        &self,
        transaction: &impl SerializableTransaction,
        config: RpcSendTransactionConfig,
    ) -> std::result::Result<Signature, SolanaClientError> {
        let signature = self
            .send_transaction_with_config(transaction, config)
            .await?;
        tracing::debug!(%signature, "sent transaction, waiting for confirmation");

        let recent_blockhash = if transaction.uses_durable_nonce() {
            let (recent_blockhash, ..) = self
                .get_latest_blockhash_with_commitment(CommitmentConfig::processed())
                .await?;
            recent_blockhash
        } else {
            *transaction.get_recent_blockhash()
        };

        loop {
            match self.get_signature_status(&signature).await? {
                Some(Ok(_)) => return Ok(signature),
                Some(Err(err)) => return Err(err.into()),
                None => {
                    if !self
                        .is_blockhash_valid(&recent_blockhash, CommitmentConfig::processed())
                        .await?
                    {
                        break;
                    }
                    sleep(STATUS_POLL_INTERVAL).await;
                }
            }
        }

        Err(RpcError::ForUser(
            "unable to confirm transaction. \
             This can happen in situations such as transaction expiration \
             and insufficient fee-payer funds"
                .to_string(),
        )
        .into())
    }
}
