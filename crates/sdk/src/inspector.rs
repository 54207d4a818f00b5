use std::time::Duration;

use solana_sdk::{account::Account, pubkey::Pubkey};

use crate::{
    chain::{with_timeout, ChainReader},
    squads::{get_vault_pda, Member, Multisig},
};

/// Decoded multisig configuration together with its vault.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(serde, derive(serde::Serialize))]
pub struct VaultConfig {
    /// Squads program owning the multisig.
    #[cfg_attr(serde, serde(with = "crate::utils::serde::pubkey"))]
    pub program_id: Pubkey,
    /// Multisig account address.
    #[cfg_attr(serde, serde(with = "crate::utils::serde::pubkey"))]
    pub multisig: Pubkey,
    /// Vault PDA.
    #[cfg_attr(serde, serde(with = "crate::utils::serde::pubkey"))]
    pub vault: Pubkey,
    /// Vault index.
    pub vault_index: u8,
    /// Approvals required.
    pub threshold: u16,
    /// Members in account order.
    pub members: Vec<Member>,
    /// Account layout version.
    pub version: u8,
    /// Index of the last created transaction.
    pub transaction_index: u64,
    /// Transactions up to this index are stale.
    pub stale_transaction_index: u64,
    /// Seconds between approval and execution.
    pub time_lock: u32,
    /// Config authority, default if the multisig is autonomous.
    #[cfg_attr(serde, serde(with = "crate::utils::serde::pubkey"))]
    pub config_authority: Pubkey,
}

impl VaultConfig {
    /// Member addresses.
    pub fn member_keys(&self) -> impl Iterator<Item = &Pubkey> + '_ {
        self.members.iter().map(|member| &member.key)
    }

    /// Returns the member with the given key.
    pub fn member(&self, key: &Pubkey) -> Option<&Member> {
        self.members.iter().find(|member| member.key == *key)
    }

    /// Returns whether the multisig is controlled by a config authority.
    pub fn is_controlled(&self) -> bool {
        self.config_authority != Pubkey::default()
    }

    /// Warn if the configured vault differs from the derived one.
    ///
    /// Returns whether they match. The derived vault is always the one used.
    pub fn check_expected_vault(&self, expected: Option<&Pubkey>) -> bool {
        match expected {
            Some(expected) if *expected != self.vault => {
                tracing::warn!(
                    %expected,
                    derived = %self.vault,
                    "configured vault differs from the derived one, using the derived vault"
                );
                false
            }
            _ => true,
        }
    }
}

/// Fetches and decodes multisig accounts.
#[derive(Debug, Clone)]
pub struct VaultInspector {
    program_id: Pubkey,
    vault_index: u8,
    timeout: Option<Duration>,
}

impl Default for VaultInspector {
    fn default() -> Self {
        Self::new(0)
    }
}

impl VaultInspector {
    /// Create an inspector for the given vault index.
    pub fn new(vault_index: u8) -> Self {
        Self {
            program_id: crate::squads::ID,
            vault_index,
            timeout: None,
        }
    }

    /// Use another Squads deployment.
    pub fn with_program_id(mut self, program_id: Pubkey) -> Self {
        self.program_id = program_id;
        self
    }

    /// Set the timeout of each RPC call.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the program ID.
    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    /// Get the vault index.
    pub fn vault_index(&self) -> u8 {
        self.vault_index
    }

    /// Derive the vault PDA of the multisig.
    pub fn derive_vault(&self, multisig: &Pubkey) -> Pubkey {
        get_vault_pda(multisig, self.vault_index, Some(&self.program_id)).0
    }

    /// Decode a fetched multisig account.
    pub fn decode(&self, multisig: &Pubkey, account: &Account) -> crate::Result<VaultConfig> {
        if account.owner != self.program_id {
            return Err(crate::Error::WrongProgramOwner {
                address: *multisig,
                owner: account.owner,
                expected: self.program_id,
            });
        }
        let decoded = Multisig::try_from_account_data(&account.data)?;
        Ok(VaultConfig {
            program_id: self.program_id,
            multisig: *multisig,
            vault: self.derive_vault(multisig),
            vault_index: self.vault_index,
            threshold: decoded.threshold,
            members: decoded.members,
            version: Multisig::LAYOUT_VERSION,
            transaction_index: decoded.transaction_index,
            stale_transaction_index: decoded.stale_transaction_index,
            time_lock: decoded.time_lock,
            config_authority: decoded.config_authority,
        })
    }

    /// Fetch and decode the multisig account.
    pub async fn inspect(
        &self,
        rpc: &impl ChainReader,
        multisig: &Pubkey,
    ) -> crate::Result<VaultConfig> {
        let account = with_timeout(self.timeout, rpc.fetch_account(multisig))
            .await?
            .ok_or(crate::Error::AccountNotFound(*multisig))?;
        let config = self.decode(multisig, &account)?;
        tracing::debug!(
            %multisig,
            vault = %config.vault,
            threshold = config.threshold,
            members = config.members.len(),
            transaction_index = config.transaction_index,
            "loaded multisig"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use solana_sdk::system_program;

    use super::*;
    use crate::{
        utils::test::{multisig, MockChain},
        ErrorKind,
    };

    #[tokio::test]
    async fn inspect_multisig() -> crate::Result<()> {
        let chain = MockChain::new();
        let address = Pubkey::new_unique();
        let members = [Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique()];
        chain.set_multisig(address, &multisig(2, &members, 5));

        let inspector = VaultInspector::default();
        let config = inspector.inspect(&chain, &address).await?;
        assert_eq!(config.threshold, 2);
        assert!(usize::from(config.threshold) <= config.members.len());
        assert_eq!(config.member_keys().copied().collect::<Vec<_>>(), members);
        assert_eq!(config.transaction_index, 5);
        assert_eq!(config.version, 4);
        assert_eq!(config.vault, get_vault_pda(&address, 0, None).0);
        assert!(!config.is_controlled());
        assert!(config.check_expected_vault(None));
        assert!(config.check_expected_vault(Some(&config.vault)));
        assert!(!config.check_expected_vault(Some(&Pubkey::new_unique())));
        assert_eq!(chain.calls(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn missing_account() {
        let chain = MockChain::new();
        let address = Pubkey::new_unique();
        let err = VaultInspector::default()
            .inspect(&chain, &address)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::AccountNotFound(a) if a == address));
    }

    #[tokio::test]
    async fn system_owned_account_is_wrong_type() {
        let chain = MockChain::new();
        let address = Pubkey::new_unique();
        let data = multisig(1, &[Pubkey::new_unique()], 0)
            .to_account_data()
            .unwrap();
        chain.set_account(
            address,
            Account {
                lamports: 10,
                data,
                owner: system_program::ID,
                executable: false,
                rent_epoch: 0,
            },
        );
        let err = VaultInspector::default()
            .inspect(&chain, &address)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WrongAccountType);
        assert!(err.status().contains("vault"));
    }

    #[tokio::test]
    async fn custom_program_and_vault_index() -> crate::Result<()> {
        let program_id = Pubkey::new_unique();
        let address = Pubkey::new_unique();
        let mut account = Account::new(1, 0, &program_id);
        account.data = multisig(1, &[Pubkey::new_unique()], 0).to_account_data()?;

        let inspector = VaultInspector::new(3).with_program_id(program_id);
        let config = inspector.decode(&address, &account)?;
        assert_eq!(config.vault_index, 3);
        assert_eq!(config.vault, get_vault_pda(&address, 3, Some(&program_id)).0);
        assert_eq!(config.program_id, program_id);

        // Same data under the default program is rejected.
        let err = VaultInspector::new(3).decode(&address, &account).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WrongAccountType);
        Ok(())
    }

    #[tokio::test]
    async fn stalled_rpc_times_out() {
        let chain = MockChain::new().with_delay(Duration::from_secs(5));
        let err = VaultInspector::default()
            .with_timeout(Some(Duration::from_millis(20)))
            .inspect(&chain, &Pubkey::new_unique())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }
}
