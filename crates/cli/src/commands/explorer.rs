use squads_connect_sdk::solana_utils::utils::account_url;

use super::status_report;

/// Print the explorer link of the multisig, or of its vault.
#[derive(Debug, clap::Args)]
pub struct Explorer {
    /// Link to the vault instead of the multisig.
    #[arg(long)]
    vault: bool,
}

impl super::Command for Explorer {
    async fn execute(&self, ctx: super::Context<'_>) -> eyre::Result<()> {
        let config = ctx.config();
        let address = if self.vault {
            config.derived_vault()
        } else {
            config.multisig()
        }
        .map_err(status_report)?;
        println!(
            "{}",
            account_url(config.explorer(), &address, config.cluster())
        );
        Ok(())
    }
}
