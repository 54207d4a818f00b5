use squads_connect_sdk::{solana_utils::utils::account_url, VaultInspector};

use crate::config::output::OutputFormat;

use super::status_report;

/// Inspect the multisig and its vault.
#[derive(Debug, clap::Args)]
pub struct Inspect {
    /// Output format.
    #[arg(long, short, value_enum, default_value_t)]
    format: OutputFormat,
}

impl super::Command for Inspect {
    fn is_client_required(&self) -> bool {
        true
    }

    async fn execute(&self, ctx: super::Context<'_>) -> eyre::Result<()> {
        let config = ctx.config();
        let client = ctx.client()?;
        let multisig = config.multisig().map_err(status_report)?;

        let vault = VaultInspector::new(config.vault_index())
            .with_program_id(*config.squads_program_id())
            .with_timeout(Some(config.timeout()?))
            .inspect(client.rpc(), &multisig)
            .await
            .map_err(status_report)?;
        vault.check_expected_vault(config.expected_vault());

        println!("{}", self.format.display_keyed_account(&multisig, &vault)?);
        if matches!(self.format, OutputFormat::Table) {
            println!("{}", self.format.display_many(&vault.members)?);
            println!(
                "Vault: {}",
                account_url(config.explorer(), &vault.vault, client.rpc_config().cluster())
            );
        }
        Ok(())
    }
}
