use std::time::Duration;

use solana_sdk::{
    instruction::Instruction,
    message::{v0, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    system_instruction,
};

use crate::{
    chain::{with_timeout, ChainReader},
    inspector::{VaultConfig, VaultInspector},
    squads::{
        get_proposal_pda, get_transaction_pda,
        instructions::{
            proposal_create, vault_transaction_create, ProposalCreateArgs,
            VaultTransactionCreateArgs,
        },
        Permission, TransactionMessage,
    },
    utils::{Lamport, Sol},
    wallet::WalletProvider,
};

/// A validated SOL transfer out of the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    /// Recipient.
    pub recipient: Pubkey,
    /// Amount.
    pub amount: Sol,
}

impl TransferRequest {
    /// Parse user input.
    pub fn parse(recipient: &str, amount: &str) -> crate::Result<Self> {
        let recipient = recipient.trim().parse().map_err(|_| {
            crate::Error::invalid_input(format!("`{recipient}` is not a valid address"))
        })?;
        Ok(Self {
            recipient,
            amount: amount.parse()?,
        })
    }

    /// Amount in lamports.
    pub fn lamports(&self) -> crate::Result<Lamport> {
        self.amount.to_lamports()
    }
}

/// Payer of the inner (vault) message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(serde, derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(serde, serde(rename_all = "kebab-case"))]
pub enum MessagePayer {
    /// The connecting wallet.
    #[default]
    Wallet,
    /// The vault itself.
    Vault,
}

/// Proposal options.
#[derive(Debug, Clone, Default)]
pub struct ProposalOptions {
    /// Memo stored with the vault transaction.
    pub memo: Option<String>,
    /// Create the proposal as a draft.
    pub draft: bool,
    /// Payer of the inner message.
    pub message_payer: MessagePayer,
}

/// An unsigned proposal transaction.
#[derive(Debug, Clone)]
pub struct PreparedProposal {
    /// Transaction index the proposal will be created at.
    pub transaction_index: u64,
    /// Vault transaction PDA.
    pub transaction: Pubkey,
    /// Proposal PDA.
    pub proposal: Pubkey,
    /// Outer message to be signed by the wallet.
    pub message: VersionedMessage,
    /// Transferred amount.
    pub lamports: Lamport,
}

/// A submitted proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(serde, derive(serde::Serialize))]
pub struct ProposalSubmission {
    /// Transaction index of the proposal.
    pub transaction_index: u64,
    /// Signature of the outer transaction.
    #[cfg_attr(serde, serde(with = "crate::utils::serde::signature"))]
    pub signature: Signature,
    /// Vault transaction PDA.
    #[cfg_attr(serde, serde(with = "crate::utils::serde::pubkey"))]
    pub transaction: Pubkey,
    /// Proposal PDA.
    #[cfg_attr(serde, serde(with = "crate::utils::serde::pubkey"))]
    pub proposal: Pubkey,
}

/// Builds `vault_transaction_create` + `proposal_create` transactions.
#[derive(Debug, Clone, Default)]
pub struct ProposalBuilder {
    options: ProposalOptions,
    timeout: Option<Duration>,
}

impl ProposalBuilder {
    /// Create a new builder.
    pub fn new(options: ProposalOptions) -> Self {
        Self {
            options,
            timeout: None,
        }
    }

    /// Set the timeout of each RPC call.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the options.
    pub fn options(&self) -> &ProposalOptions {
        &self.options
    }

    /// The transfer executed by the vault.
    pub fn transfer_instruction(
        vault: &VaultConfig,
        request: &TransferRequest,
    ) -> crate::Result<Instruction> {
        let lamports = request.lamports()?;
        Ok(system_instruction::transfer(
            &vault.vault,
            &request.recipient,
            lamports.get(),
        ))
    }

    /// Build the outer message without signing it.
    ///
    /// The multisig is read again so that the proposal uses the latest transaction index.
    pub async fn prepare(
        &self,
        rpc: &impl ChainReader,
        vault: &VaultConfig,
        creator: &Pubkey,
        request: &TransferRequest,
    ) -> crate::Result<PreparedProposal> {
        let lamports = request.lamports()?;
        let transfer = Self::transfer_instruction(vault, request)?;

        let blockhash = with_timeout(self.timeout, rpc.fetch_latest_blockhash()).await?;

        let inner_payer = match self.options.message_payer {
            MessagePayer::Wallet => *creator,
            MessagePayer::Vault => vault.vault,
        };
        let inner = v0::Message::try_compile(&inner_payer, &[transfer], &[], blockhash)
            .map_err(squads_connect_solana_utils::Error::from)?;
        let transaction_message =
            TransactionMessage::from_versioned(&VersionedMessage::V0(inner))?.to_bytes()?;

        let latest = VaultInspector::new(vault.vault_index)
            .with_program_id(vault.program_id)
            .with_timeout(self.timeout)
            .inspect(rpc, &vault.multisig)
            .await?;
        let transaction_index = latest
            .transaction_index
            .checked_add(1)
            .ok_or_else(|| crate::Error::decode("transaction index overflow"))?;
        if !latest
            .member(creator)
            .is_some_and(|member| member.permissions.has(Permission::Initiate))
        {
            tracing::warn!(%creator, "creator is not a member with the initiate permission");
        }

        let program_id = &vault.program_id;
        let transaction = get_transaction_pda(&vault.multisig, transaction_index, Some(program_id)).0;
        let proposal = get_proposal_pda(&vault.multisig, transaction_index, Some(program_id)).0;

        let create_transaction = vault_transaction_create(
            program_id,
            &vault.multisig,
            &transaction,
            creator,
            creator,
            &VaultTransactionCreateArgs {
                vault_index: vault.vault_index,
                ephemeral_signers: 0,
                transaction_message,
                memo: self.options.memo.clone(),
            },
        )?;
        let create_proposal = proposal_create(
            program_id,
            &vault.multisig,
            &proposal,
            creator,
            creator,
            &ProposalCreateArgs {
                transaction_index,
                draft: self.options.draft,
            },
        )?;
        let message =
            v0::Message::try_compile(creator, &[create_transaction, create_proposal], &[], blockhash)
                .map_err(squads_connect_solana_utils::Error::from)?;

        Ok(PreparedProposal {
            transaction_index,
            transaction,
            proposal,
            message: VersionedMessage::V0(message),
            lamports,
        })
    }

    /// Build the proposal and hand it to the wallet to sign and broadcast.
    pub async fn submit(
        &self,
        rpc: &impl ChainReader,
        wallet: &impl WalletProvider,
        vault: &VaultConfig,
        creator: &Pubkey,
        request: &TransferRequest,
    ) -> crate::Result<ProposalSubmission> {
        let prepared = self.prepare(rpc, vault, creator, request).await?;
        let signature = wallet.sign_and_send_transaction(prepared.message).await?;
        tracing::info!(
            %signature,
            transaction_index = prepared.transaction_index,
            proposal = %prepared.proposal,
            lamports = prepared.lamports.get(),
            "proposal submitted"
        );
        Ok(ProposalSubmission {
            transaction_index: prepared.transaction_index,
            signature,
            transaction: prepared.transaction,
            proposal: prepared.proposal,
        })
    }
}
