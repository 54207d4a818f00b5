use std::future::Future;

use solana_sdk::{message::VersionedMessage, pubkey::Pubkey, signature::Signature};

/// An authenticated wallet connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletSession {
    /// Connected address.
    pub address: Pubkey,
    /// Whether the session is still connected.
    pub connected: bool,
}

impl WalletSession {
    /// Create a connected session for the given address.
    pub fn new(address: Pubkey) -> Self {
        Self {
            address,
            connected: true,
        }
    }
}

/// A wallet able to sign and broadcast transactions.
pub trait WalletProvider {
    /// Ask the wallet for its address.
    ///
    /// A refusal must be reported as [`Error::UserRejected`](crate::Error::UserRejected).
    fn connect(&self) -> impl Future<Output = crate::Result<Pubkey>>;

    /// Sign the message with the wallet and broadcast it.
    fn sign_and_send_transaction(
        &self,
        message: VersionedMessage,
    ) -> impl Future<Output = crate::Result<Signature>>;

    /// Release the connection.
    fn disconnect(&self) -> impl Future<Output = crate::Result<()>> {
        async { Ok(()) }
    }
}

impl<T: WalletProvider> WalletProvider for &T {
    fn connect(&self) -> impl Future<Output = crate::Result<Pubkey>> {
        (**self).connect()
    }

    fn sign_and_send_transaction(
        &self,
        message: VersionedMessage,
    ) -> impl Future<Output = crate::Result<Signature>> {
        (**self).sign_and_send_transaction(message)
    }

    fn disconnect(&self) -> impl Future<Output = crate::Result<()>> {
        (**self).disconnect()
    }
}

#[cfg(client)]
pub use self::local::LocalWallet;

#[cfg(client)]
mod local {
    use std::sync::Arc;

    use solana_client::{
        nonblocking::rpc_client::RpcClient, rpc_config::RpcSendTransactionConfig,
    };
    use solana_sdk::{
        message::VersionedMessage, pubkey::Pubkey, signature::Signature, signer::Signer,
        transaction::VersionedTransaction,
    };
    use squads_connect_solana_utils::{client::SendAndConfirm, signer::LocalSignerRef};

    use super::WalletProvider;

    /// Wallet backed by a local signer, broadcasting through an RPC client.
    #[derive(Clone)]
    pub struct LocalWallet {
        signer: LocalSignerRef,
        client: Arc<RpcClient>,
        send_config: RpcSendTransactionConfig,
    }

    impl LocalWallet {
        /// Create a new local wallet.
        pub fn new(signer: LocalSignerRef, client: Arc<RpcClient>) -> Self {
            Self {
                signer,
                client,
                send_config: RpcSendTransactionConfig::default(),
            }
        }

        /// Set the send config.
        pub fn with_send_config(mut self, config: RpcSendTransactionConfig) -> Self {
            self.send_config = config;
            self
        }

        /// Sign the message without sending it.
        pub fn sign(&self, message: VersionedMessage) -> crate::Result<VersionedTransaction> {
            let signers: Vec<&dyn Signer> = vec![&*self.signer];
            VersionedTransaction::try_new(message, &signers).map_err(crate::Error::from_signer_error)
        }
    }

    impl WalletProvider for LocalWallet {
        async fn connect(&self) -> crate::Result<Pubkey> {
            self.signer
                .try_pubkey()
                .map_err(crate::Error::from_signer_error)
        }

        async fn sign_and_send_transaction(
            &self,
            message: VersionedMessage,
        ) -> crate::Result<Signature> {
            let transaction = self.sign(message)?;
            let signature = self
                .client
                .send_and_confirm_transaction_with_config(&transaction, self.send_config)
                .await
                .map_err(crate::Error::from_send_error)?;
            tracing::debug!(%signature, "transaction confirmed");
            Ok(signature)
        }
    }

}
