use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

use super::discriminator;

/// Member permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Permission {
    /// Can create vault transactions and proposals.
    Initiate = 1 << 0,
    /// Can approve or reject proposals.
    Vote = 1 << 1,
    /// Can execute approved transactions.
    Execute = 1 << 2,
}

/// Bitmask of [`Permission`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, BorshSerialize, BorshDeserialize)]
#[cfg_attr(serde, derive(serde::Serialize))]
pub struct Permissions {
    /// Raw mask.
    pub mask: u8,
}

impl Permissions {
    /// Create from a list of permissions.
    pub fn from_vec(permissions: &[Permission]) -> Self {
        Self {
            mask: permissions.iter().fold(0, |mask, p| mask | *p as u8),
        }
    }

    /// Returns whether the permission is granted.
    pub fn has(&self, permission: Permission) -> bool {
        self.mask & (permission as u8) != 0
    }
}

/// Multisig member.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
#[cfg_attr(serde, derive(serde::Serialize))]
pub struct Member {
    /// Member address.
    #[cfg_attr(serde, serde(with = "crate::utils::serde::pubkey"))]
    pub key: Pubkey,
    /// Granted permissions.
    pub permissions: Permissions,
}

/// The `Multisig` account of Squads v4.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Multisig {
    /// Key used to seed the multisig PDA.
    pub create_key: Pubkey,
    /// Can change the config without proposals if not default.
    pub config_authority: Pubkey,
    /// Approvals required to pass a proposal.
    pub threshold: u16,
    /// Seconds between approval and execution.
    pub time_lock: u32,
    /// Index of the last created transaction.
    pub transaction_index: u64,
    /// Transactions up to this index are stale.
    pub stale_transaction_index: u64,
    /// Receiver of rent reclaimed from closed accounts.
    pub rent_collector: Option<Pubkey>,
    /// PDA bump.
    pub bump: u8,
    /// Members sorted by key.
    pub members: Vec<Member>,
}

impl Multisig {
    /// Layout version of the accounts this type decodes.
    pub const LAYOUT_VERSION: u8 = 4;

    /// Account discriminator.
    pub fn discriminator() -> [u8; 8] {
        discriminator("account", "Multisig")
    }

    /// Decode from raw account data, discriminator included.
    ///
    /// Bytes after the encoded members are ignored since the program reallocates
    /// the account with spare room for new members.
    pub fn try_from_account_data(data: &[u8]) -> crate::Result<Self> {
        let Some((disc, mut rest)) = data.split_first_chunk::<8>() else {
            return Err(crate::Error::decode(format!(
                "account data too short: {} bytes",
                data.len()
            )));
        };
        if *disc != Self::discriminator() {
            return Err(crate::Error::decode(
                "discriminator mismatch, not a Squads v4 multisig account",
            ));
        }
        let multisig = Self::deserialize(&mut rest)
            .map_err(|err| crate::Error::decode(format!("invalid multisig layout: {err}")))?;
        multisig.validate()?;
        Ok(multisig)
    }

    /// Encode into account data, discriminator included.
    pub fn to_account_data(&self) -> crate::Result<Vec<u8>> {
        let mut data = Self::discriminator().to_vec();
        self.serialize(&mut data)?;
        Ok(data)
    }

    fn validate(&self) -> crate::Result<()> {
        if self.members.is_empty() {
            return Err(crate::Error::decode("multisig has no members"));
        }
        if self.threshold == 0 || usize::from(self.threshold) > self.members.len() {
            return Err(crate::Error::decode(format!(
                "invalid threshold {} for {} members",
                self.threshold,
                self.members.len()
            )));
        }
        Ok(())
    }

    /// Returns the member with the given key.
    pub fn member(&self, key: &Pubkey) -> Option<&Member> {
        self.members.iter().find(|member| member.key == *key)
    }
}
