use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::{message::VersionedMessage, pubkey::Pubkey};

use super::small_vec::SmallVec;

/// The transaction message stored in a vault transaction.
///
/// Unvalidated instruction data, must be treated as untrusted.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct TransactionMessage {
    /// The number of signer pubkeys in the account_keys vec.
    pub num_signers: u8,
    /// The number of writable signer pubkeys in the account_keys vec.
    pub num_writable_signers: u8,
    /// The number of writable non-signer pubkeys in the account_keys vec.
    pub num_writable_non_signers: u8,
    /// Unique account keys, program IDs included.
    pub account_keys: SmallVec<u8, Pubkey>,
    /// The list of instructions to execute.
    pub instructions: SmallVec<u8, CompiledInstruction>,
    /// Address table lookups used to load additional accounts.
    pub address_table_lookups: SmallVec<u8, MessageAddressTableLookup>,
}

/// Compiled instruction.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CompiledInstruction {
    /// Index of the program ID in `account_keys`.
    pub program_id_index: u8,
    /// Indices into `account_keys` of the instruction accounts.
    pub account_indexes: SmallVec<u8, u8>,
    /// Instruction data.
    pub data: SmallVec<u16, u8>,
}

/// Address table lookup.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct MessageAddressTableLookup {
    /// Address lookup table account key.
    pub account_key: Pubkey,
    /// Indexes of writable addresses.
    pub writable_indexes: SmallVec<u8, u8>,
    /// Indexes of readonly addresses.
    pub readonly_indexes: SmallVec<u8, u8>,
}

impl TransactionMessage {
    /// Convert a compiled [`VersionedMessage`]. The blockhash is dropped.
    pub fn from_versioned(message: &VersionedMessage) -> crate::Result<Self> {
        let header = message.header();
        let account_keys = message.static_account_keys();
        let num_accounts = u8::try_from(account_keys.len())
            .map_err(|_| crate::Error::invalid_input("too many accounts in message"))?;
        let num_signers = header.num_required_signatures;
        let num_non_signers = num_accounts
            .checked_sub(num_signers)
            .ok_or_else(|| crate::Error::invalid_input("malformed message header"))?;

        let instructions = message
            .instructions()
            .iter()
            .map(|ix| CompiledInstruction {
                program_id_index: ix.program_id_index,
                account_indexes: ix.accounts.clone().into(),
                data: ix.data.clone().into(),
            })
            .collect::<Vec<_>>();
        let address_table_lookups = message
            .address_table_lookups()
            .unwrap_or_default()
            .iter()
            .map(|atl| MessageAddressTableLookup {
                account_key: atl.account_key,
                writable_indexes: atl.writable_indexes.clone().into(),
                readonly_indexes: atl.readonly_indexes.clone().into(),
            })
            .collect::<Vec<_>>();

        Ok(Self {
            num_signers,
            num_writable_signers: num_signers.saturating_sub(header.num_readonly_signed_accounts),
            num_writable_non_signers: num_non_signers
                .saturating_sub(header.num_readonly_unsigned_accounts),
            account_keys: account_keys.to_vec().into(),
            instructions: instructions.into(),
            address_table_lookups: address_table_lookups.into(),
        })
    }

    /// Encode into the bytes expected by `vault_transaction_create`.
    pub fn to_bytes(&self) -> crate::Result<Vec<u8>> {
        Ok(borsh::to_vec(self)?)
    }

    /// Returns whether the account at the given index is a static writable account.
    pub fn is_static_writable_index(&self, key_index: usize) -> bool {
        let num_signers = usize::from(self.num_signers);

        if key_index >= self.account_keys.len() {
            return false;
        }

        if key_index < usize::from(self.num_writable_signers) {
            return true;
        }

        if key_index >= num_signers {
            let index_into_non_signers = key_index - num_signers;
            return index_into_non_signers < usize::from(self.num_writable_non_signers);
        }

        false
    }

    /// Returns whether the account at the given index is a signer.
    pub fn is_signer_index(&self, key_index: usize) -> bool {
        key_index < usize::from(self.num_signers)
    }
}

#[cfg(test)]
mod tests {
    use solana_sdk::{
        hash::Hash,
        message::{v0, Message},
        system_instruction, system_program,
    };

    use super::*;

    #[test]
    fn convert_transfer_message() -> crate::Result<()> {
        let payer = Pubkey::new_unique();
        let vault = Pubkey::new_unique();
        let recipient = Pubkey::new_unique();
        let ix = system_instruction::transfer(&vault, &recipient, 42);
        let message = v0::Message::try_compile(&payer, &[ix.clone()], &[], Hash::new_unique())
            .map_err(squads_connect_solana_utils::Error::from)?;
        let message = TransactionMessage::from_versioned(&VersionedMessage::V0(message))?;

        // payer and vault are signers, recipient is a writable non-signer.
        assert_eq!(message.num_signers, 2);
        assert_eq!(message.num_writable_signers, 2);
        assert_eq!(message.num_writable_non_signers, 1);
        assert_eq!(message.account_keys.len(), 4);
        assert!(message.is_signer_index(1));
        assert!(message.is_static_writable_index(2));
        assert!(!message.is_static_writable_index(3));
        assert_eq!(message.account_keys[3], system_program::ID);

        let compiled = &message.instructions[0];
        assert_eq!(&*compiled.data, ix.data.as_slice());
        assert_eq!(message.address_table_lookups.len(), 0);
        Ok(())
    }

    #[test]
    fn legacy_and_v0_agree() -> crate::Result<()> {
        let payer = Pubkey::new_unique();
        let ix = system_instruction::transfer(&payer, &Pubkey::new_unique(), 1);
        let blockhash = Hash::new_unique();
        let legacy = VersionedMessage::Legacy(Message::new_with_blockhash(
            &[ix.clone()],
            Some(&payer),
            &blockhash,
        ));
        let v0 = VersionedMessage::V0(
            v0::Message::try_compile(&payer, &[ix], &[], blockhash)
                .map_err(squads_connect_solana_utils::Error::from)?,
        );
        assert_eq!(
            TransactionMessage::from_versioned(&legacy)?,
            TransactionMessage::from_versioned(&v0)?
        );
        Ok(())
    }

    #[test]
    fn bytes_round_trip() -> crate::Result<()> {
        let payer = Pubkey::new_unique();
        let ix = system_instruction::transfer(&payer, &Pubkey::new_unique(), 7);
        let message = VersionedMessage::Legacy(Message::new(&[ix], Some(&payer)));
        let message = TransactionMessage::from_versioned(&message)?;
        let bytes = message.to_bytes()?;
        assert_eq!(bytes[..3], [1, 1, 1]);
        assert_eq!(TransactionMessage::try_from_slice(&bytes)?, message);
        Ok(())
    }
}
