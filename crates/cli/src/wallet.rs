use std::path::PathBuf;

use eyre::OptionExt;
use squads_connect_sdk::{
    solana_utils::{
        signer::{local_signer, LocalSignerRef},
        solana_sdk::{
            message::VersionedMessage,
            pubkey::Pubkey,
            signature::{read_keypair_file, Signature},
        },
    },
    wallet::LocalWallet,
    Error, WalletProvider,
};
use url::Url;

/// Parse url or path.
fn parse_url_or_path(source: &str) -> eyre::Result<Url> {
    let url = match Url::parse(source) {
        Ok(url) => url,
        Err(_) => {
            let path = shellexpand::tilde(source);
            let path: PathBuf = path.parse()?;
            let path = std::fs::canonicalize(path)?;
            Url::from_file_path(&path)
                .ok()
                .ok_or_eyre("invalid file path")?
        }
    };

    Ok(url)
}

/// Load signer from url.
pub fn signer_from_source(source: &str) -> eyre::Result<LocalSignerRef> {
    let url = parse_url_or_path(source)?;

    match url.scheme() {
        "file" => {
            let keypair = read_keypair_file(url.path()).map_err(|err| eyre::eyre!("{err}"))?;
            Ok(local_signer(keypair))
        }
        scheme => Err(eyre::eyre!("unsupported scheme: {scheme}")),
    }
}

/// Local wallet that asks for confirmation before signing.
pub struct ConfirmingWallet {
    inner: LocalWallet,
    skip_confirmation: bool,
}

impl ConfirmingWallet {
    /// Wrap the wallet.
    pub fn new(inner: LocalWallet, skip_confirmation: bool) -> Self {
        Self {
            inner,
            skip_confirmation,
        }
    }

    fn confirm(&self) -> squads_connect_sdk::Result<()> {
        if self.skip_confirmation {
            return Ok(());
        }
        let confirmation = dialoguer::Confirm::new()
            .with_prompt("Sign and send the proposal transaction?")
            .default(false)
            .interact()
            .map_err(|err| Error::WalletUnavailable(err.to_string()))?;
        if confirmation {
            Ok(())
        } else {
            Err(Error::UserRejected("declined at the prompt".to_string()))
        }
    }
}

impl WalletProvider for ConfirmingWallet {
    async fn connect(&self) -> squads_connect_sdk::Result<Pubkey> {
        self.inner.connect().await
    }

    async fn sign_and_send_transaction(
        &self,
        message: VersionedMessage,
    ) -> squads_connect_sdk::Result<Signature> {
        self.confirm()?;
        self.inner.sign_and_send_transaction(message).await
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use squads_connect_sdk::solana_utils::solana_sdk::signature::{
        write_keypair, Keypair, Signer,
    };

    use super::*;

    #[test]
    fn test_parse_url_or_path() -> eyre::Result<()> {
        let url = parse_url_or_path("file:///tmp/id.json")?;
        assert_eq!(url.scheme(), "file");
        assert!(parse_url_or_path("~/definitely/missing/id.json").is_err());
        Ok(())
    }

    #[test]
    fn load_keypair_file() -> eyre::Result<()> {
        let keypair = Keypair::new();
        let path = std::env::temp_dir().join(format!("squads-connect-{}.json", keypair.pubkey()));
        let mut file = std::fs::File::create(&path)?;
        write_keypair(&keypair, &mut file).map_err(|err| eyre::eyre!("{err}"))?;
        file.flush()?;

        let signer = signer_from_source(path.to_str().ok_or_eyre("non-utf8 path")?)?;
        assert_eq!(signer.pubkey(), keypair.pubkey());
        std::fs::remove_file(&path)?;
        Ok(())
    }

    #[test]
    fn unsupported_scheme() {
        assert!(signer_from_source("usb://ledger").is_err());
    }
}
