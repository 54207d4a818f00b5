use std::{
    mem,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use solana_sdk::pubkey::Pubkey;

use crate::{
    chain::ChainReader,
    inspector::{VaultConfig, VaultInspector},
    proposal::{ProposalBuilder, ProposalOptions, ProposalSubmission, TransferRequest},
    wallet::{WalletProvider, WalletSession},
    Error, ErrorKind,
};

/// Flow configuration.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Multisig account address.
    pub multisig: Option<Pubkey>,
    /// Vault index.
    pub vault_index: u8,
    /// Squads program ID.
    pub program_id: Pubkey,
    /// Vault address the user expects, checked against the derived one.
    pub expected_vault: Option<Pubkey>,
    /// Timeout of each RPC call.
    pub timeout: Option<Duration>,
    /// Proposal options.
    pub proposal: ProposalOptions,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            multisig: None,
            vault_index: 0,
            program_id: crate::squads::ID,
            expected_vault: None,
            timeout: None,
            proposal: ProposalOptions::default(),
        }
    }
}

/// A connected wallet and, once loaded, its vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// Wallet session.
    pub session: WalletSession,
    /// Loaded vault.
    pub vault: Option<VaultConfig>,
}

/// A classified failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Error class.
    pub kind: ErrorKind,
    /// Error message.
    pub message: String,
}

impl From<&Error> for Failure {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Flow state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FlowState {
    /// No wallet connected.
    #[default]
    Disconnected,
    /// Waiting for the wallet.
    Connecting,
    /// Wallet connected.
    Connected(Connection),
    /// Fetching the multisig.
    Loading(Connection),
    /// Waiting for the proposal to be signed and sent.
    Submitting(Connection),
    /// Proposal submitted.
    Done(Connection, ProposalSubmission),
    /// The last request failed. The connection is kept for retries.
    Failed(Option<Connection>, Failure),
}

/// Flow event.
#[derive(Debug, Clone)]
pub enum FlowEvent {
    /// The user asked to connect.
    ConnectRequested,
    /// The wallet returned its address.
    Connected(WalletSession),
    /// The user asked to load the multisig.
    LoadRequested,
    /// The multisig was decoded.
    VaultLoaded(VaultConfig),
    /// The user asked to submit a proposal.
    SubmitRequested,
    /// The proposal was broadcast.
    Submitted(ProposalSubmission),
    /// The current request failed.
    Failed(Failure),
    /// The wallet was disconnected.
    Disconnected,
}

impl FlowState {
    /// Returns whether a request is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Connecting | Self::Loading(_) | Self::Submitting(_)
        )
    }

    /// Current connection, if any.
    pub fn connection(&self) -> Option<&Connection> {
        match self {
            Self::Disconnected | Self::Connecting => None,
            Self::Connected(connection)
            | Self::Loading(connection)
            | Self::Submitting(connection)
            | Self::Done(connection, _) => Some(connection),
            Self::Failed(connection, _) => connection.as_ref(),
        }
    }

    /// Current wallet session, if any.
    pub fn session(&self) -> Option<&WalletSession> {
        self.connection().map(|connection| &connection.session)
    }

    /// Loaded vault, if any.
    pub fn vault(&self) -> Option<&VaultConfig> {
        self.connection()
            .and_then(|connection| connection.vault.as_ref())
    }

    /// Apply the event, returning the next state.
    pub fn apply(&self, event: FlowEvent) -> crate::Result<Self> {
        const IN_PROGRESS: &str = "a request is in progress";

        let next = match (self, event) {
            (state, FlowEvent::Failed(failure)) => {
                Self::Failed(state.connection().cloned(), failure)
            }
            (state, FlowEvent::ConnectRequested | FlowEvent::Disconnected)
                if state.is_busy() =>
            {
                return Err(Error::Busy(IN_PROGRESS));
            }
            (_, FlowEvent::ConnectRequested) => Self::Connecting,
            (_, FlowEvent::Disconnected) => Self::Disconnected,
            (Self::Connecting, FlowEvent::Connected(session)) => Self::Connected(Connection {
                session,
                vault: None,
            }),
            (state, FlowEvent::LoadRequested | FlowEvent::SubmitRequested) if state.is_busy() => {
                return Err(Error::Busy(IN_PROGRESS));
            }
            (state, FlowEvent::LoadRequested) => match state.connection() {
                Some(connection) => Self::Loading(connection.clone()),
                None => return Err(Error::InvalidState("wallet is not connected")),
            },
            (Self::Loading(connection), FlowEvent::VaultLoaded(vault)) => {
                Self::Connected(Connection {
                    session: connection.session,
                    vault: Some(vault),
                })
            }
            (state, FlowEvent::SubmitRequested) => match state.connection() {
                Some(connection) if connection.vault.is_some() => {
                    Self::Submitting(connection.clone())
                }
                Some(_) => return Err(Error::InvalidState("multisig is not loaded")),
                None => return Err(Error::InvalidState("wallet is not connected")),
            },
            (Self::Submitting(connection), FlowEvent::Submitted(submission)) => {
                Self::Done(connection.clone(), submission)
            }
            (_, FlowEvent::Connected(_) | FlowEvent::VaultLoaded(_) | FlowEvent::Submitted(_)) => {
                return Err(Error::InvalidState("unexpected response"));
            }
        };
        Ok(next)
    }

    /// Render the state as a single status line.
    pub fn status(&self) -> String {
        match self {
            Self::Disconnected => "Not connected.".to_string(),
            Self::Connecting => "Connecting wallet...".to_string(),
            Self::Loading(_) => "Loading multisig...".to_string(),
            Self::Submitting(_) => "Submitting proposal...".to_string(),
            Self::Connected(Connection {
                session,
                vault: None,
            }) => format!("Connected as {}.", session.address),
            Self::Connected(Connection {
                session,
                vault: Some(vault),
            }) => format!(
                "Connected as {}. Multisig {}: threshold {} of {} members, vault {}, transaction index {}.",
                session.address,
                vault.multisig,
                vault.threshold,
                vault.members.len(),
                vault.vault,
                vault.transaction_index,
            ),
            Self::Done(_, submission) => format!(
                "Proposal #{} submitted: {}.",
                submission.transaction_index, submission.signature
            ),
            Self::Failed(_, failure) => {
                format!("Error: {}. {}", failure.message, failure.kind.guidance())
            }
        }
    }
}

fn lock(state: &Mutex<FlowState>) -> MutexGuard<'_, FlowState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An in-flight request. Dropping it before [`InFlight::finish`] restores the previous state.
struct InFlight<'a> {
    state: &'a Mutex<FlowState>,
    previous: Option<FlowState>,
}

impl<'a> InFlight<'a> {
    fn begin(state: &'a Mutex<FlowState>, event: FlowEvent) -> crate::Result<Self> {
        let mut current = lock(state);
        let next = current.apply(event)?;
        let previous = mem::replace(&mut *current, next);
        Ok(Self {
            state,
            previous: Some(previous),
        })
    }

    fn current(&self) -> FlowState {
        lock(self.state).clone()
    }

    fn finish(mut self, event: FlowEvent) -> crate::Result<()> {
        let result = {
            let mut current = lock(self.state);
            current.apply(event).map(|next| *current = next)
        };
        if result.is_ok() {
            self.previous = None;
        }
        result
    }

    fn fail(self, err: Error) -> Error {
        if let Err(apply_err) = self.finish(FlowEvent::Failed(Failure::from(&err))) {
            tracing::debug!(%apply_err, "failed to record failure");
        }
        err
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            tracing::debug!("request cancelled");
            *lock(self.state) = previous;
        }
    }
}

/// Connect a wallet, load a multisig and propose SOL transfers out of its vault.
pub struct VaultTransferFlow<R, W> {
    rpc: R,
    wallet: Option<W>,
    config: FlowConfig,
    state: Mutex<FlowState>,
}

impl<R, W> VaultTransferFlow<R, W>
where
    R: ChainReader,
    W: WalletProvider,
{
    /// Create a new flow. `wallet` is `None` when no wallet provider is available.
    pub fn new(rpc: R, wallet: Option<W>, config: FlowConfig) -> Self {
        Self {
            rpc,
            wallet,
            config,
            state: Mutex::default(),
        }
    }

    /// Get the config.
    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Get the current state.
    pub fn state(&self) -> FlowState {
        lock(&self.state).clone()
    }

    /// Current status line.
    pub fn status(&self) -> String {
        lock(&self.state).status()
    }

    /// Record a failure that happened before any request started.
    fn reject(&self, err: Error) -> Error {
        let mut state = lock(&self.state);
        if !state.is_busy() {
            if let Ok(next) = state.apply(FlowEvent::Failed(Failure::from(&err))) {
                *state = next;
            }
        }
        err
    }

    fn wallet(&self) -> crate::Result<&W> {
        self.wallet
            .as_ref()
            .ok_or_else(|| Error::WalletUnavailable("no wallet provider".to_string()))
    }

    /// Connect the wallet.
    pub async fn connect(&self) -> crate::Result<WalletSession> {
        let wallet = self.wallet().map_err(|err| self.reject(err))?;
        let request = InFlight::begin(&self.state, FlowEvent::ConnectRequested)?;
        let address = match wallet.connect().await {
            Ok(address) => address,
            Err(err) => return Err(request.fail(err)),
        };
        let session = WalletSession::new(address);
        request.finish(FlowEvent::Connected(session))?;
        tracing::debug!(%address, "wallet connected");
        Ok(session)
    }

    /// Fetch and decode the configured multisig.
    pub async fn load_vault(&self) -> crate::Result<VaultConfig> {
        let multisig = self
            .config
            .multisig
            .ok_or(Error::ConfigMissing("multisig"))
            .map_err(|err| self.reject(err))?;
        let request = InFlight::begin(&self.state, FlowEvent::LoadRequested)?;
        let inspector = VaultInspector::new(self.config.vault_index)
            .with_program_id(self.config.program_id)
            .with_timeout(self.config.timeout);
        let vault = match inspector.inspect(&self.rpc, &multisig).await {
            Ok(vault) => vault,
            Err(err) => return Err(request.fail(err)),
        };
        vault.check_expected_vault(self.config.expected_vault.as_ref());
        request.finish(FlowEvent::VaultLoaded(vault.clone()))?;
        Ok(vault)
    }

    /// Propose transferring `amount` SOL from the vault to `recipient`.
    pub async fn submit(
        &self,
        recipient: &str,
        amount: &str,
    ) -> crate::Result<ProposalSubmission> {
        let wallet = self.wallet().map_err(|err| self.reject(err))?;
        let transfer = TransferRequest::parse(recipient, amount).map_err(|err| self.reject(err))?;
        let request = InFlight::begin(&self.state, FlowEvent::SubmitRequested)?;
        let (session, vault) = match request.current() {
            FlowState::Submitting(Connection {
                session,
                vault: Some(vault),
            }) => (session, vault),
            _ => return Err(request.fail(Error::InvalidState("multisig is not loaded"))),
        };
        let builder =
            ProposalBuilder::new(self.config.proposal.clone()).with_timeout(self.config.timeout);
        let submission = match builder
            .submit(&self.rpc, wallet, &vault, &session.address, &transfer)
            .await
        {
            Ok(submission) => submission,
            Err(err) => return Err(request.fail(err)),
        };
        request.finish(FlowEvent::Submitted(submission.clone()))?;
        Ok(submission)
    }

    /// Disconnect the wallet.
    pub async fn disconnect(&self) -> crate::Result<()> {
        if lock(&self.state).is_busy() {
            return Err(Error::Busy("a request is in progress"));
        }
        if let Some(wallet) = self.wallet.as_ref() {
            wallet.disconnect().await?;
        }
        let mut state = lock(&self.state);
        *state = state.apply(FlowEvent::Disconnected)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use solana_sdk::{account::Account, system_program};

    use super::*;
    use crate::utils::test::{multisig, setup_fmt_tracing, MockChain, MockWallet};

    struct Fixture {
        chain: Arc<MockChain>,
        multisig: Pubkey,
        member: Pubkey,
    }

    fn fixture() -> Fixture {
        let chain = Arc::new(MockChain::new());
        let multisig_address = Pubkey::new_unique();
        let members = [Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique()];
        chain.set_multisig(multisig_address, &multisig(2, &members, 5));
        Fixture {
            chain,
            multisig: multisig_address,
            member: members[1],
        }
    }

    fn config(multisig: Pubkey) -> FlowConfig {
        FlowConfig {
            multisig: Some(multisig),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn no_wallet_fails_without_network_calls() {
        let _guard = setup_fmt_tracing("debug");
        let Fixture { chain, multisig, .. } = fixture();
        let flow = VaultTransferFlow::new(chain.clone(), None::<MockWallet>, config(multisig));

        let err = flow.connect().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WalletUnavailable);
        let err = flow
            .submit(&Pubkey::new_unique().to_string(), "1")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WalletUnavailable);
        assert_eq!(chain.calls(), 0);
        assert!(flow.status().starts_with("Error: wallet unavailable"));
    }

    #[tokio::test]
    async fn rejected_connection() {
        let Fixture { chain, multisig, member } = fixture();
        let flow = VaultTransferFlow::new(
            chain.clone(),
            Some(MockWallet::rejecting(member)),
            config(multisig),
        );
        let err = flow.connect().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UserRejected);
        assert!(matches!(flow.state(), FlowState::Failed(None, _)));
        assert_eq!(chain.calls(), 0);
    }

    #[tokio::test]
    async fn connect_load_and_submit() -> crate::Result<()> {
        let _guard = setup_fmt_tracing("debug");
        let Fixture { chain, multisig, member } = fixture();
        let flow = VaultTransferFlow::new(chain.clone(), Some(MockWallet::new(member)), config(multisig));

        let session = flow.connect().await?;
        assert_eq!(session.address, member);
        assert!(session.connected);

        let vault = flow.load_vault().await?;
        assert_eq!(vault.threshold, 2);
        assert!(flow.status().contains("threshold 2 of 3 members"));

        let recipient = Pubkey::new_unique();
        let submission = flow.submit(&recipient.to_string(), "1.5").await?;
        assert_eq!(submission.transaction_index, 6);
        assert!(matches!(flow.state(), FlowState::Done(_, ref s) if *s == submission));
        assert!(flow.status().starts_with("Proposal #6 submitted"));

        flow.disconnect().await?;
        assert_eq!(flow.state(), FlowState::Disconnected);
        Ok(())
    }

    #[tokio::test]
    async fn invalid_amount_keeps_session() -> crate::Result<()> {
        let Fixture { chain, multisig, member } = fixture();
        let flow = VaultTransferFlow::new(chain.clone(), Some(MockWallet::new(member)), config(multisig));
        flow.connect().await?;
        flow.load_vault().await?;
        let calls = chain.calls();

        let recipient = Pubkey::new_unique().to_string();
        for amount in ["0", "-2", "ten"] {
            let err = flow.submit(&recipient, amount).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }
        assert_eq!(chain.calls(), calls);
        assert_eq!(flow.state().session().map(|s| s.address), Some(member));
        assert!(flow.state().vault().is_some());

        let submission = flow.submit(&recipient, "0.25").await?;
        assert_eq!(submission.transaction_index, 6);
        Ok(())
    }

    #[tokio::test]
    async fn missing_multisig_config() -> crate::Result<()> {
        let Fixture { chain, member, .. } = fixture();
        let flow = VaultTransferFlow::new(chain.clone(), Some(MockWallet::new(member)), FlowConfig::default());
        flow.connect().await?;
        let err = flow.load_vault().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(chain.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn wrong_owner_builds_no_proposal() -> crate::Result<()> {
        let Fixture { chain, member, .. } = fixture();
        let vault_like = Pubkey::new_unique();
        chain.set_account(vault_like, Account::new(1_000_000, 0, &system_program::ID));
        let wallet = MockWallet::new(member);
        let flow = VaultTransferFlow::new(chain.clone(), Some(&wallet), config(vault_like));
        flow.connect().await?;

        let err = flow.load_vault().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WrongAccountType);
        assert!(flow.status().contains("not a Squads multisig account"));

        let err = flow
            .submit(&Pubkey::new_unique().to_string(), "1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        assert!(wallet.messages().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn overlapping_requests_are_rejected() -> crate::Result<()> {
        let Fixture { multisig, member, .. } = fixture();
        let chain = MockChain::new().with_delay(Duration::from_millis(50));
        chain.set_multisig(multisig, &crate::utils::test::multisig(1, &[member], 0));
        let flow = VaultTransferFlow::new(chain, Some(MockWallet::new(member)), config(multisig));
        flow.connect().await?;
        flow.load_vault().await?;

        let recipient = Pubkey::new_unique().to_string();
        let (first, second) = tokio::join!(flow.submit(&recipient, "1"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            flow.submit(&recipient, "1").await
        });
        assert_eq!(first?.transaction_index, 1);
        assert!(matches!(second, Err(Error::Busy(_))));
        Ok(())
    }

    #[tokio::test]
    async fn cancelled_request_restores_state() -> crate::Result<()> {
        let Fixture { multisig, member, .. } = fixture();
        let chain = MockChain::new().with_delay(Duration::from_millis(200));
        chain.set_multisig(multisig, &crate::utils::test::multisig(1, &[member], 0));
        let flow = VaultTransferFlow::new(chain, Some(MockWallet::new(member)), config(multisig));
        flow.connect().await?;

        let cancelled = tokio::time::timeout(Duration::from_millis(20), flow.load_vault()).await;
        assert!(cancelled.is_err());
        assert!(matches!(flow.state(), FlowState::Connected(_)));
        Ok(())
    }

    #[tokio::test]
    async fn stalled_rpc_times_out() -> crate::Result<()> {
        let Fixture { multisig, member, .. } = fixture();
        let chain = MockChain::new().with_delay(Duration::from_secs(5));
        let flow = VaultTransferFlow::new(
            chain,
            Some(MockWallet::new(member)),
            FlowConfig {
                timeout: Some(Duration::from_millis(20)),
                ..config(multisig)
            },
        );
        flow.connect().await?;
        let err = flow.load_vault().await.unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
        assert!(matches!(
            flow.state(),
            FlowState::Failed(Some(_), Failure { kind: ErrorKind::Network, .. })
        ));
        Ok(())
    }

    #[test]
    fn busy_states_reject_requests() {
        let connection = Connection {
            session: WalletSession::new(Pubkey::new_unique()),
            vault: None,
        };
        let busy = [
            FlowState::Connecting,
            FlowState::Loading(connection.clone()),
            FlowState::Submitting(connection),
        ];
        for state in busy {
            for event in [
                FlowEvent::ConnectRequested,
                FlowEvent::LoadRequested,
                FlowEvent::SubmitRequested,
                FlowEvent::Disconnected,
            ] {
                assert!(matches!(state.apply(event), Err(Error::Busy(_))));
            }
        }
    }

    #[test]
    fn failure_keeps_connection() -> crate::Result<()> {
        let session = WalletSession::new(Pubkey::new_unique());
        let state = FlowState::Connecting.apply(FlowEvent::Connected(session))?;
        let state = state.apply(FlowEvent::LoadRequested)?;
        let failure = Failure::from(&Error::Network("refused".into()));
        let state = state.apply(FlowEvent::Failed(failure))?;
        assert_eq!(state.session(), Some(&session));
        assert!(!state.is_busy());
        assert!(state.status().contains("Check the network connection"));
        assert!(matches!(
            state.apply(FlowEvent::SubmitRequested),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(state.apply(FlowEvent::LoadRequested)?, FlowState::Loading(_)));
        Ok(())
    }
}
