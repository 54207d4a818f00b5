use std::{path::Path, sync::Arc};

use enum_dispatch::enum_dispatch;
use eyre::OptionExt;
use squads_connect_sdk::{
    solana_utils::{
        config::Config as RpcConfig, signer::LocalSignerRef,
        solana_client::nonblocking::rpc_client::RpcClient,
        solana_sdk::{pubkey::Pubkey, signer::Signer},
    },
    wallet::LocalWallet,
    ErrorKind,
};

use crate::{config::Config, wallet::ConfirmingWallet};

use explorer::Explorer;
use get_pubkey::GetPubkey;
use init_config::InitConfig;
use inspect::Inspect;
use transfer::Transfer;

mod explorer;
mod get_pubkey;
mod init_config;
mod inspect;
mod transfer;

/// Commands.
#[enum_dispatch]
#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Initialize config file.
    InitConfig(InitConfig),
    /// Get the wallet address.
    GetPubkey(GetPubkey),
    /// Inspect the multisig and its vault.
    Inspect(Inspect),
    /// Propose a SOL transfer out of the vault.
    Transfer(Transfer),
    /// Print the explorer link of the multisig or its vault.
    Explorer(Explorer),
}

#[enum_dispatch(Commands)]
pub(crate) trait Command {
    fn is_client_required(&self) -> bool {
        false
    }

    async fn execute(&self, ctx: Context<'_>) -> eyre::Result<()>;
}

/// Command context.
pub(crate) struct Context<'a> {
    config_path: &'a Path,
    config: &'a Config,
    client: Option<&'a CommandClient>,
}

impl<'a> Context<'a> {
    pub(super) fn new(
        config_path: &'a Path,
        config: &'a Config,
        client: Option<&'a CommandClient>,
    ) -> Self {
        Self {
            config_path,
            config,
            client,
        }
    }

    pub(crate) fn config_path(&self) -> &Path {
        self.config_path
    }

    pub(crate) fn config(&self) -> &Config {
        self.config
    }

    pub(crate) fn client(&self) -> eyre::Result<&CommandClient> {
        self.client.ok_or_eyre("client is not provided")
    }
}

/// RPC client and wallet shared by the commands.
pub(crate) struct CommandClient {
    rpc_config: RpcConfig<Option<LocalSignerRef>>,
    rpc: Arc<RpcClient>,
    wallet_error: Option<squads_connect_sdk::Error>,
}

impl CommandClient {
    pub(crate) fn new(config: &Config) -> eyre::Result<Self> {
        let (signer, wallet_error) = match config.wallet() {
            Ok(signer) => (Some(signer), None),
            Err(err) => {
                tracing::debug!(%err, "wallet is not available");
                (None, Some(err))
            }
        };
        let rpc_config = config.rpc_config(signer)?;
        let rpc = Arc::new(rpc_config.rpc());
        Ok(Self {
            rpc_config,
            rpc,
            wallet_error,
        })
    }

    pub(crate) fn rpc(&self) -> &Arc<RpcClient> {
        &self.rpc
    }

    pub(crate) fn rpc_config(&self) -> &RpcConfig<Option<LocalSignerRef>> {
        &self.rpc_config
    }

    pub(crate) fn signer(&self) -> squads_connect_sdk::Result<&LocalSignerRef> {
        self.rpc_config.payer_ref().as_ref().ok_or_else(|| {
            let msg = self
                .wallet_error
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "no wallet configured".to_string());
            squads_connect_sdk::Error::WalletUnavailable(msg)
        })
    }

    pub(crate) fn payer(&self) -> squads_connect_sdk::Result<Pubkey> {
        Ok(self.signer()?.pubkey())
    }

    /// Wallet provider for the flow, `None` if the keypair could not be loaded.
    pub(crate) fn wallet(&self, skip_confirmation: bool) -> Option<ConfirmingWallet> {
        let signer = self.signer().ok()?.clone();
        let wallet = LocalWallet::new(signer, self.rpc.clone());
        Some(ConfirmingWallet::new(wallet, skip_confirmation))
    }
}

/// Convert an sdk error into a report carrying its status line.
pub(crate) fn status_report(err: squads_connect_sdk::Error) -> eyre::Report {
    match config_hint(err.kind()) {
        Some(hint) => eyre::eyre!("{} {hint}", err.status()),
        None => eyre::eyre!(err.status()),
    }
}

/// Where the CLI reads the missing setting from.
fn config_hint(kind: ErrorKind) -> Option<&'static str> {
    match kind {
        ErrorKind::WalletUnavailable => Some(
            "Set `wallet` in the config file, SQUADS_CONNECT_WALLET or `--wallet` \
             to a readable keypair file.",
        ),
        ErrorKind::Config => Some(
            "Set `multisig` in the config file, SQUADS_CONNECT_MULTISIG or `--multisig`.",
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use squads_connect_sdk::Error;

    use super::*;

    #[test]
    fn status_report_names_cli_settings() {
        let report = status_report(Error::ConfigMissing("multisig"));
        assert!(report.to_string().contains("SQUADS_CONNECT_MULTISIG"));

        let report = status_report(Error::WalletUnavailable("no wallet configured".into()));
        assert!(report.to_string().contains("keypair file"));

        let report = status_report(Error::Network("refused".into()));
        assert_eq!(report.to_string(), Error::Network("refused".into()).status());
    }
}
