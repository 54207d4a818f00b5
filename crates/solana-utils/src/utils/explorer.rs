use std::{fmt, str::FromStr};

use solana_sdk::pubkey::Pubkey;
use url::form_urlencoded::Serializer;

use crate::cluster::Cluster;

/// Public block explorer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(serde, derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(serde, serde(rename_all = "kebab-case"))]
pub enum Explorer {
    /// <https://solscan.io>
    #[default]
    Solscan,
    /// <https://explorer.solana.com>
    SolanaExplorer,
}

impl Explorer {
    fn account_base(&self) -> &'static str {
        match self {
            Self::Solscan => "https://solscan.io/account",
            Self::SolanaExplorer => "https://explorer.solana.com/address",
        }
    }
}

impl fmt::Display for Explorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solscan => write!(f, "solscan"),
            Self::SolanaExplorer => write!(f, "solana-explorer"),
        }
    }
}

impl FromStr for Explorer {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solscan" => Ok(Self::Solscan),
            "solana-explorer" | "explorer" => Ok(Self::SolanaExplorer),
            _ => Err(crate::Error::ParseExplorer(
                "unknown explorer, expecting `solscan` or `solana-explorer`",
            )),
        }
    }
}

/// Both explorers default to mainnet when no `cluster` query is given.
pub(crate) fn append_cluster_query(serializer: &mut Serializer<'_, String>, cluster: &Cluster) {
    match cluster {
        Cluster::Mainnet => {}
        Cluster::Devnet | Cluster::Testnet => {
            serializer.append_pair("cluster", &cluster.to_string());
        }
        Cluster::Localnet | Cluster::Custom(_) if !cluster.is_mainnet() => {
            serializer
                .append_pair("cluster", "custom")
                .append_pair("customUrl", cluster.url());
        }
        _ => {}
    }
}

/// Returns the explorer page of the given account.
pub fn account_url(explorer: Explorer, address: &Pubkey, cluster: &Cluster) -> String {
    let mut serializer = Serializer::new(String::new());
    append_cluster_query(&mut serializer, cluster);
    let query = serializer.finish();
    let base = explorer.account_base();
    if query.is_empty() {
        format!("{base}/{address}")
    } else {
        format!("{base}/{address}?{query}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_links_have_no_query() {
        let address = Pubkey::new_unique();
        assert_eq!(
            account_url(Explorer::Solscan, &address, &Cluster::Mainnet),
            format!("https://solscan.io/account/{address}")
        );
    }

    #[test]
    fn devnet_and_custom_links() {
        let address = Pubkey::new_unique();
        assert_eq!(
            account_url(Explorer::SolanaExplorer, &address, &Cluster::Devnet),
            format!("https://explorer.solana.com/address/{address}?cluster=devnet")
        );
        let custom = Cluster::Custom("http://127.0.0.1:8899".to_string());
        let url = account_url(Explorer::Solscan, &address, &custom);
        assert!(url.contains("cluster=custom"));
        assert!(url.contains("customUrl=http%3A%2F%2F127.0.0.1%3A8899"));
    }

    #[test]
    fn parse_explorer() {
        assert_eq!("solscan".parse::<Explorer>().unwrap(), Explorer::Solscan);
        assert_eq!(
            "solana-explorer".parse::<Explorer>().unwrap(),
            Explorer::SolanaExplorer
        );
        assert!("etherscan".parse::<Explorer>().is_err());
    }
}
