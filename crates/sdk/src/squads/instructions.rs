use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use super::discriminator;

/// Arguments of `vault_transaction_create`.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct VaultTransactionCreateArgs {
    /// Index of the vault this transaction belongs to.
    pub vault_index: u8,
    /// Number of ephemeral signing PDAs required by the transaction.
    pub ephemeral_signers: u8,
    /// Encoded [`TransactionMessage`](super::TransactionMessage).
    pub transaction_message: Vec<u8>,
    /// Optional memo, for indexing only.
    pub memo: Option<String>,
}

/// Arguments of `proposal_create`.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ProposalCreateArgs {
    /// Index of the multisig transaction this proposal is associated with.
    pub transaction_index: u64,
    /// Whether the proposal should be initialized with status `Draft`.
    pub draft: bool,
}

fn instruction_data(name: &str, args: &impl BorshSerialize) -> crate::Result<Vec<u8>> {
    let mut data = discriminator("global", name).to_vec();
    args.serialize(&mut data)?;
    Ok(data)
}

/// Create a `vault_transaction_create` instruction.
///
/// Creates the transaction account and bumps the multisig transaction index.
pub fn vault_transaction_create(
    program_id: &Pubkey,
    multisig: &Pubkey,
    transaction: &Pubkey,
    creator: &Pubkey,
    rent_payer: &Pubkey,
    args: &VaultTransactionCreateArgs,
) -> crate::Result<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*multisig, false),
            AccountMeta::new(*transaction, false),
            AccountMeta::new_readonly(*creator, true),
            AccountMeta::new(*rent_payer, true),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data: instruction_data("vault_transaction_create", args)?,
    })
}

/// Create a `proposal_create` instruction.
pub fn proposal_create(
    program_id: &Pubkey,
    multisig: &Pubkey,
    proposal: &Pubkey,
    creator: &Pubkey,
    rent_payer: &Pubkey,
    args: &ProposalCreateArgs,
) -> crate::Result<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*multisig, false),
            AccountMeta::new(*proposal, false),
            AccountMeta::new_readonly(*creator, true),
            AccountMeta::new(*rent_payer, true),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data: instruction_data("proposal_create", args)?,
    })
}
