use std::{
    collections::HashMap,
    env,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use solana_sdk::{
    account::Account, hash::Hash, message::VersionedMessage, pubkey::Pubkey,
    signature::Signature,
};
use tracing::subscriber::set_default;
use tracing_subscriber::EnvFilter;

use crate::{
    chain::ChainReader,
    squads::{Member, Multisig, Permission, Permissions},
    wallet::WalletProvider,
};

/// Setup fmt tracing subscriber.
pub(crate) fn setup_fmt_tracing(default_rust_log: &str) -> impl Drop {
    if env::var(EnvFilter::DEFAULT_ENV).is_err() {
        env::set_var(EnvFilter::DEFAULT_ENV, default_rust_log);
    }
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::builder().from_env_lossy())
        .with_test_writer()
        .finish();
    set_default(subscriber)
}

/// In-memory chain counting every call.
#[derive(Default)]
pub(crate) struct MockChain {
    accounts: Mutex<HashMap<Pubkey, Account>>,
    blockhash: Hash,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockChain {
    pub(crate) fn new() -> Self {
        Self {
            blockhash: Hash::new_unique(),
            ..Default::default()
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn set_account(&self, address: Pubkey, account: Account) {
        self.accounts.lock().unwrap().insert(address, account);
    }

    pub(crate) fn set_multisig(&self, address: Pubkey, multisig: &Multisig) {
        let data = multisig.to_account_data().unwrap();
        self.set_account(
            address,
            Account {
                lamports: 1_000_000,
                data,
                owner: crate::squads::ID,
                executable: false,
                rent_epoch: 0,
            },
        );
    }

    pub(crate) fn blockhash(&self) -> Hash {
        self.blockhash
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl ChainReader for MockChain {
    async fn fetch_account(&self, address: &Pubkey) -> crate::Result<Option<Account>> {
        self.tick().await;
        Ok(self.accounts.lock().unwrap().get(address).cloned())
    }

    async fn fetch_latest_blockhash(&self) -> crate::Result<Hash> {
        self.tick().await;
        Ok(self.blockhash)
    }
}

/// Wallet recording the messages it was asked to sign.
pub(crate) struct MockWallet {
    address: Pubkey,
    reject: bool,
    messages: Mutex<Vec<VersionedMessage>>,
}

impl MockWallet {
    pub(crate) fn new(address: Pubkey) -> Self {
        Self {
            address,
            reject: false,
            messages: Default::default(),
        }
    }

    pub(crate) fn rejecting(address: Pubkey) -> Self {
        Self {
            reject: true,
            ..Self::new(address)
        }
    }

    pub(crate) fn messages(&self) -> Vec<VersionedMessage> {
        self.messages.lock().unwrap().clone()
    }
}

impl WalletProvider for MockWallet {
    async fn connect(&self) -> crate::Result<Pubkey> {
        if self.reject {
            return Err(crate::Error::UserRejected("connection declined".into()));
        }
        Ok(self.address)
    }

    async fn sign_and_send_transaction(
        &self,
        message: VersionedMessage,
    ) -> crate::Result<Signature> {
        if self.reject {
            return Err(crate::Error::UserRejected("signature declined".into()));
        }
        self.messages.lock().unwrap().push(message);
        Ok(Signature::new_unique())
    }
}

/// A multisig with full-permission members.
pub(crate) fn multisig(threshold: u16, members: &[Pubkey], transaction_index: u64) -> Multisig {
    Multisig {
        create_key: Pubkey::new_unique(),
        config_authority: Pubkey::default(),
        threshold,
        time_lock: 0,
        transaction_index,
        stale_transaction_index: 0,
        rent_collector: None,
        bump: 255,
        members: members
            .iter()
            .map(|key| Member {
                key: *key,
                permissions: Permissions::from_vec(&[
                    Permission::Initiate,
                    Permission::Vote,
                    Permission::Execute,
                ]),
            })
            .collect(),
    }
}
