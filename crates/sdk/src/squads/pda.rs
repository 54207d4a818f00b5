use solana_sdk::pubkey::Pubkey;

/// Seed prefix shared by every Squads PDA.
pub const SEED_PREFIX: &[u8] = b"multisig";
/// Multisig seed.
pub const SEED_MULTISIG: &[u8] = b"multisig";
/// Proposal seed.
pub const SEED_PROPOSAL: &[u8] = b"proposal";
/// Transaction seed.
pub const SEED_TRANSACTION: &[u8] = b"transaction";
/// Vault seed.
pub const SEED_VAULT: &[u8] = b"vault";

/// Find the multisig PDA created with the given create key.
pub fn get_multisig_pda(create_key: &Pubkey, program_id: Option<&Pubkey>) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[SEED_PREFIX, SEED_MULTISIG, create_key.as_ref()],
        program_id.unwrap_or(&super::ID),
    )
}

/// Find the proposal PDA of the given transaction index.
pub fn get_proposal_pda(
    multisig_pda: &Pubkey,
    transaction_index: u64,
    program_id: Option<&Pubkey>,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            SEED_PREFIX,
            multisig_pda.as_ref(),
            SEED_TRANSACTION,
            &transaction_index.to_le_bytes(),
            SEED_PROPOSAL,
        ],
        program_id.unwrap_or(&super::ID),
    )
}

/// Find the vault transaction PDA of the given transaction index.
pub fn get_transaction_pda(
    multisig_pda: &Pubkey,
    transaction_index: u64,
    program_id: Option<&Pubkey>,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            SEED_PREFIX,
            multisig_pda.as_ref(),
            SEED_TRANSACTION,
            &transaction_index.to_le_bytes(),
        ],
        program_id.unwrap_or(&super::ID),
    )
}

/// Find the vault PDA, i.e. the spending authority of the multisig.
pub fn get_vault_pda(multisig_pda: &Pubkey, index: u8, program_id: Option<&Pubkey>) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[SEED_PREFIX, multisig_pda.as_ref(), SEED_VAULT, &[index]],
        program_id.unwrap_or(&super::ID),
    )
}
