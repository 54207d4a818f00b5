use std::{fmt, str::FromStr};

use url::Url;

const MAINNET_URL: &str = "https://api.mainnet-beta.solana.com";
const DEVNET_URL: &str = "https://api.devnet.solana.com";
const TESTNET_URL: &str = "https://api.testnet.solana.com";
const LOCALNET_URL: &str = "http://127.0.0.1:8899";

/// Solana cluster.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(serde, derive(serde_with::SerializeDisplay, serde_with::DeserializeFromStr))]
pub enum Cluster {
    /// Mainnet-beta.
    #[default]
    Mainnet,
    /// Devnet.
    Devnet,
    /// Testnet.
    Testnet,
    /// Local validator.
    Localnet,
    /// Custom RPC endpoint.
    Custom(String),
}

impl Cluster {
    /// Returns the RPC URL of the cluster.
    pub fn url(&self) -> &str {
        match self {
            Self::Mainnet => MAINNET_URL,
            Self::Devnet => DEVNET_URL,
            Self::Testnet => TESTNET_URL,
            Self::Localnet => LOCALNET_URL,
            Self::Custom(url) => url,
        }
    }

    /// Returns whether this is the mainnet cluster.
    pub fn is_mainnet(&self) -> bool {
        matches!(self, Self::Mainnet) || self.url() == MAINNET_URL
    }

    /// Create a Solana RPC client for this cluster.
    #[cfg(client)]
    pub fn rpc(
        &self,
        commitment: solana_sdk::commitment_config::CommitmentConfig,
    ) -> solana_client::nonblocking::rpc_client::RpcClient {
        solana_client::nonblocking::rpc_client::RpcClient::new_with_commitment(
            self.url().to_string(),
            commitment,
        )
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mainnet => write!(f, "mainnet"),
            Self::Devnet => write!(f, "devnet"),
            Self::Testnet => write!(f, "testnet"),
            Self::Localnet => write!(f, "localnet"),
            Self::Custom(url) => write!(f, "{url}"),
        }
    }
}

impl FromStr for Cluster {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "m" | "mainnet" | "mainnet-beta" => Ok(Self::Mainnet),
            "d" | "devnet" => Ok(Self::Devnet),
            "t" | "testnet" => Ok(Self::Testnet),
            "l" | "localnet" => Ok(Self::Localnet),
            _ if s.starts_with("http") => {
                Url::parse(s)?;
                Ok(Self::Custom(s.to_string()))
            }
            _ => Err(crate::Error::ParseCluster(
                "expecting a cluster name (mainnet, devnet, testnet, localnet) or an http(s) url",
            )),
        }
    }
}
