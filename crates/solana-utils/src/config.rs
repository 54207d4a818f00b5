use std::{ops::Deref, time::Duration};

use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey, signer::Signer};

use crate::cluster::Cluster;

/// Connection config shared by the RPC client and the wallet.
#[derive(Clone)]
pub struct Config<C> {
    cluster: Cluster,
    payer: C,
    commitment: CommitmentConfig,
    timeout: Option<Duration>,
}

impl<C> Config<C> {
    /// Create a new config.
    pub fn new(cluster: Cluster, payer: C, commitment: CommitmentConfig) -> Self {
        Self {
            cluster,
            payer,
            commitment,
            timeout: None,
        }
    }

    /// Get cluster.
    pub fn cluster(&self) -> &Cluster {
        &self.cluster
    }

    /// Get commitment config.
    pub fn commitment(&self) -> &CommitmentConfig {
        &self.commitment
    }

    /// Get the request timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Get the payer.
    pub fn payer_ref(&self) -> &C {
        &self.payer
    }

    /// Create a Solana RPC Client.
    ///
    /// The configured timeout, if any, is applied to every HTTP request.
    #[cfg(client)]
    pub fn rpc(&self) -> solana_client::nonblocking::rpc_client::RpcClient {
        use solana_client::nonblocking::rpc_client::RpcClient;

        match self.timeout {
            Some(timeout) => RpcClient::new_with_timeout_and_commitment(
                self.cluster.url().to_string(),
                timeout,
                self.commitment,
            ),
            None => self.cluster.rpc(self.commitment),
        }
    }

    /// Set payer.
    pub fn set_payer<C2>(self, payer: C2) -> Config<C2> {
        Config {
            cluster: self.cluster,
            payer,
            commitment: self.commitment,
            timeout: self.timeout,
        }
    }

    /// Set cluster.
    pub fn set_cluster(mut self, url: impl AsRef<str>) -> crate::Result<Self> {
        self.cluster = url.as_ref().parse()?;
        Ok(self)
    }

    /// Set the request timeout.
    pub fn set_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl<C> Config<C>
where
    C: Deref,
    C::Target: Signer,
{
    /// Get payer pubkey.
    pub fn payer(&self) -> Pubkey {
        self.payer.pubkey()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use solana_sdk::signature::Keypair;

    use super::*;

    #[test]
    fn config_setters() -> crate::Result<()> {
        let keypair = Arc::new(Keypair::new());
        let expected = keypair.pubkey();
        let config = Config::new(Cluster::Devnet, keypair, CommitmentConfig::confirmed())
            .set_cluster("localnet")?
            .set_timeout(Some(Duration::from_secs(5)));
        assert_eq!(config.cluster(), &Cluster::Localnet);
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.payer(), expected);
        Ok(())
    }
}
