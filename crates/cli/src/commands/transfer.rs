use squads_connect_sdk::{
    solana_utils::{
        solana_sdk::pubkey::Pubkey,
        utils::{account_url, inspect_transaction},
    },
    utils::StringPubkey,
    MessagePayer, ProposalBuilder, ProposalOptions, TransferRequest, VaultInspector,
    VaultTransferFlow,
};

use super::status_report;

/// Propose a SOL transfer out of the vault.
#[derive(Debug, clap::Args)]
pub struct Transfer {
    /// Recipient. Defaults to the configured `recipient`.
    #[arg(long)]
    to: Option<StringPubkey>,
    /// Amount in SOL, e.g. `1.5`.
    #[arg(long)]
    amount: String,
    /// Memo stored with the vault transaction.
    #[arg(long)]
    memo: Option<String>,
    /// Create the proposal as a draft.
    #[arg(long)]
    draft: bool,
    /// Let the vault pay for the inner transaction instead of the wallet.
    #[arg(long)]
    vault_payer: bool,
    /// Skip the confirmation prompt.
    #[arg(long, short)]
    yes: bool,
    /// Print the inspector URL of the transaction instead of sending it.
    #[arg(long, conflicts_with = "yes")]
    dry_run: bool,
}

impl Transfer {
    fn recipient(&self, default: Option<&Pubkey>) -> squads_connect_sdk::Result<String> {
        self.to
            .as_deref()
            .or(default)
            .map(ToString::to_string)
            .ok_or_else(|| {
                squads_connect_sdk::Error::invalid_input(
                    "no recipient, pass `--to` or set `recipient` in the config",
                )
            })
    }

    fn options(&self) -> ProposalOptions {
        ProposalOptions {
            memo: self.memo.clone(),
            draft: self.draft,
            message_payer: if self.vault_payer {
                MessagePayer::Vault
            } else {
                MessagePayer::Wallet
            },
        }
    }
}

impl super::Command for Transfer {
    fn is_client_required(&self) -> bool {
        true
    }

    async fn execute(&self, ctx: super::Context<'_>) -> eyre::Result<()> {
        let config = ctx.config();
        let client = ctx.client()?;
        let recipient = self.recipient(config.recipient()).map_err(status_report)?;

        if self.dry_run {
            let request = TransferRequest::parse(&recipient, &self.amount).map_err(status_report)?;
            let creator = client.payer().map_err(status_report)?;
            let multisig = config.multisig().map_err(status_report)?;
            let timeout = Some(config.timeout()?);
            let vault = VaultInspector::new(config.vault_index())
                .with_program_id(*config.squads_program_id())
                .with_timeout(timeout)
                .inspect(client.rpc(), &multisig)
                .await
                .map_err(status_report)?;
            let prepared = ProposalBuilder::new(self.options())
                .with_timeout(timeout)
                .prepare(client.rpc(), &vault, &creator, &request)
                .await
                .map_err(status_report)?;
            println!(
                "Proposal #{} would move {} from {} to {}",
                prepared.transaction_index, prepared.lamports, vault.vault, request.recipient
            );
            println!(
                "{}",
                inspect_transaction(&prepared.message, Some(client.rpc_config().cluster()), false)
            );
            return Ok(());
        }

        let wallet = client.wallet(self.yes);
        if let Err(err) = client.signer() {
            tracing::warn!("{err}");
        }
        let flow = VaultTransferFlow::new(
            client.rpc().clone(),
            wallet,
            config.flow_config(self.options())?,
        );

        flow.connect().await.map_err(status_report)?;
        flow.load_vault().await.map_err(status_report)?;
        println!("{}", flow.status());

        let submission = flow
            .submit(&recipient, &self.amount)
            .await
            .map_err(status_report)?;
        println!("{}", flow.status());
        println!(
            "Proposal: {}",
            account_url(
                config.explorer(),
                &submission.proposal,
                client.rpc_config().cluster()
            )
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Cli {
        #[command(flatten)]
        transfer: Transfer,
    }

    #[test]
    fn recipient_falls_back_to_config() {
        let default = Pubkey::new_unique();
        let cli = Cli::parse_from(["transfer", "--amount", "1.5"]);
        assert_eq!(
            cli.transfer.recipient(Some(&default)).unwrap(),
            default.to_string()
        );
        let err = cli.transfer.recipient(None).unwrap_err();
        assert_eq!(err.kind(), squads_connect_sdk::ErrorKind::InvalidInput);

        let to = Pubkey::new_unique();
        let cli = Cli::parse_from(["transfer", "--amount", "1", "--to", &to.to_string()]);
        assert_eq!(cli.transfer.recipient(Some(&default)).unwrap(), to.to_string());
    }

    #[test]
    fn proposal_options_from_flags() {
        let cli = Cli::parse_from([
            "transfer",
            "--amount",
            "1",
            "--memo",
            "rent",
            "--draft",
            "--vault-payer",
        ]);
        let options = cli.transfer.options();
        assert_eq!(options.memo.as_deref(), Some("rent"));
        assert!(options.draft);
        assert_eq!(options.message_payer, MessagePayer::Vault);
    }
}
