/// Output format.
pub mod output;

use std::time::Duration;

use squads_connect_sdk::{
    solana_utils::{
        cluster::Cluster,
        config::Config as RpcConfig,
        signer::LocalSignerRef,
        solana_sdk::{
            commitment_config::{CommitmentConfig, CommitmentLevel},
            pubkey::Pubkey,
        },
        utils::Explorer,
    },
    squads::get_vault_pda,
    utils::StringPubkey,
    FlowConfig, ProposalOptions,
};

use crate::wallet::signer_from_source;

const DEFAULT_WALLET: &str = "~/.config/solana/id.json";
static DEFAULT_CLUSTER: Cluster = Cluster::Mainnet;
const DEFAULT_COMMITMENT: CommitmentLevel = CommitmentLevel::Confirmed;
const DEFAULT_TIMEOUT: &str = "30s";

/// Configuration.
///
/// Unset fields are skipped when serializing so that command-line flags only
/// override the values that are actually given.
#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// Path or `file://` URL of the wallet keypair. [default: ~/.config/solana/id.json]
    #[arg(long, short, env = "SQUADS_CONNECT_WALLET")]
    #[serde(skip_serializing_if = "Option::is_none")]
    wallet: Option<String>,
    /// Cluster name or RPC URL to connect to. [default: mainnet]
    #[arg(long = "url", short = 'u', env = "SQUADS_CONNECT_URL")]
    #[serde(rename = "url", skip_serializing_if = "Option::is_none")]
    cluster: Option<Cluster>,
    /// Commitment level. [default: confirmed]
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    commitment: Option<CommitmentLevel>,
    /// Multisig account address.
    #[arg(long, short, env = "SQUADS_CONNECT_MULTISIG")]
    #[serde(skip_serializing_if = "Option::is_none")]
    multisig: Option<StringPubkey>,
    /// Expected vault address, checked against the derived one.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    vault: Option<StringPubkey>,
    /// Default transfer recipient.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    recipient: Option<StringPubkey>,
    /// Vault index. [default: 0]
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    vault_index: Option<u8>,
    /// Squads program ID.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    squads_program: Option<StringPubkey>,
    /// Timeout of each RPC request, e.g. `30s`. [default: 30s]
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<String>,
    /// Block explorer used for links. [default: solscan]
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    explorer: Option<Explorer>,
}

impl Config {
    /// Config written by `init-config`.
    pub fn init() -> Self {
        Self {
            wallet: Some(DEFAULT_WALLET.to_string()),
            cluster: Some(Cluster::Mainnet),
            commitment: Some(DEFAULT_COMMITMENT),
            timeout: Some(DEFAULT_TIMEOUT.to_string()),
            explorer: Some(Explorer::default()),
            ..Default::default()
        }
    }

    /// Wallet source.
    pub fn wallet_source(&self) -> &str {
        self.wallet.as_deref().unwrap_or(DEFAULT_WALLET)
    }

    /// Creates a wallet based on the config.
    pub fn wallet(&self) -> squads_connect_sdk::Result<LocalSignerRef> {
        signer_from_source(self.wallet_source()).map_err(|err| {
            squads_connect_sdk::Error::WalletUnavailable(format!(
                "failed to load `{}`: {err}",
                self.wallet_source()
            ))
        })
    }

    /// Cluster.
    pub fn cluster(&self) -> &Cluster {
        self.cluster.as_ref().unwrap_or(&DEFAULT_CLUSTER)
    }

    /// Commitment config.
    pub fn commitment(&self) -> CommitmentConfig {
        CommitmentConfig {
            commitment: self.commitment.unwrap_or(DEFAULT_COMMITMENT),
        }
    }

    /// Request timeout.
    pub fn timeout(&self) -> eyre::Result<Duration> {
        let timeout = self.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT);
        humantime::parse_duration(timeout)
            .map_err(|err| eyre::eyre!("invalid timeout `{timeout}`: {err}"))
    }

    /// Multisig address.
    pub fn multisig(&self) -> squads_connect_sdk::Result<Pubkey> {
        self.multisig
            .as_deref()
            .copied()
            .ok_or(squads_connect_sdk::Error::ConfigMissing("multisig"))
    }

    /// Configured vault address.
    pub fn expected_vault(&self) -> Option<&Pubkey> {
        self.vault.as_deref()
    }

    /// Default recipient.
    pub fn recipient(&self) -> Option<&Pubkey> {
        self.recipient.as_deref()
    }

    /// Vault index.
    pub fn vault_index(&self) -> u8 {
        self.vault_index.unwrap_or_default()
    }

    /// Squads program ID.
    pub fn squads_program_id(&self) -> &Pubkey {
        self.squads_program
            .as_deref()
            .unwrap_or(&squads_connect_sdk::squads::ID)
    }

    /// Vault derived from the multisig.
    pub fn derived_vault(&self) -> squads_connect_sdk::Result<Pubkey> {
        let multisig = self.multisig()?;
        Ok(get_vault_pda(&multisig, self.vault_index(), Some(self.squads_program_id())).0)
    }

    /// Block explorer.
    pub fn explorer(&self) -> Explorer {
        self.explorer.unwrap_or_default()
    }

    /// RPC config.
    pub fn rpc_config<C>(&self, payer: C) -> eyre::Result<RpcConfig<C>> {
        Ok(RpcConfig::new(self.cluster().clone(), payer, self.commitment())
            .set_timeout(Some(self.timeout()?)))
    }

    /// Flow config.
    pub fn flow_config(&self, proposal: ProposalOptions) -> eyre::Result<FlowConfig> {
        Ok(FlowConfig {
            multisig: self.multisig.as_deref().copied(),
            vault_index: self.vault_index(),
            program_id: *self.squads_program_id(),
            expected_vault: self.expected_vault().copied(),
            timeout: Some(self.timeout()?),
            proposal,
        })
    }
}
