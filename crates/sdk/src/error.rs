use std::time::Duration;

use solana_sdk::{pubkey::Pubkey, signer::SignerError};

/// SDK Error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No wallet provider is available.
    #[error("wallet unavailable: {0}")]
    WalletUnavailable(String),
    /// The user rejected the request in the wallet.
    #[error("user rejected: {0}")]
    UserRejected(String),
    /// A required configuration value is not set.
    #[error("config missing: `{0}` is not set")]
    ConfigMissing(&'static str),
    /// The account does not exist.
    #[error("account not found: {0}")]
    AccountNotFound(Pubkey),
    /// The account is owned by an unexpected program.
    #[error("{}", wrong_owner(.address, .owner, .expected))]
    WrongProgramOwner {
        /// The inspected account.
        address: Pubkey,
        /// Its actual owner.
        owner: Pubkey,
        /// The expected owner.
        expected: Pubkey,
    },
    /// The account data does not match the expected layout.
    #[error("decode: {0}")]
    Decode(String),
    /// The RPC endpoint refused to serve the request.
    #[error("access denied: {0}")]
    AccessDenied(String),
    /// The RPC endpoint returned an error.
    #[error("rpc: {0}")]
    Rpc(String),
    /// The RPC endpoint could not be reached.
    #[error("network: {0}")]
    Network(String),
    /// A network call did not complete in time.
    #[error("timeout: no response after {0:?}")]
    Timeout(Duration),
    /// Bad recipient or amount.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Signing or broadcasting was rejected.
    #[error("submission failed: {0}")]
    SubmissionFailed(String),
    /// Another request of the same flow is still running.
    #[error("busy: {0}")]
    Busy(&'static str),
    /// The request is not valid in the current state.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
    /// Borsh encoding error.
    #[error("borsh: {0}")]
    Borsh(#[from] std::io::Error),
    /// Error from [`squads_connect_solana_utils`].
    #[error("utils: {0}")]
    SolanaUtils(#[from] squads_connect_solana_utils::Error),
}

fn wrong_owner(address: &Pubkey, owner: &Pubkey, expected: &Pubkey) -> String {
    let mut msg = format!("account {address} is owned by {owner}, expected {expected}");
    if *owner == solana_sdk::system_program::ID {
        msg.push_str(
            " (a system-owned account is usually a vault or wallet address, not the multisig)",
        );
    }
    msg
}

/// Error classes, each mapped to its own guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(serde, derive(serde::Serialize))]
#[cfg_attr(serde, serde(rename_all = "kebab-case"))]
pub enum ErrorKind {
    /// No wallet.
    WalletUnavailable,
    /// Rejected by the user.
    UserRejected,
    /// Missing configuration.
    Config,
    /// Account does not exist.
    NotFound,
    /// Account exists but is not a multisig.
    WrongAccountType,
    /// Layout or version mismatch.
    Decode,
    /// Access denied or RPC error.
    AccessDenied,
    /// Connectivity problem or timeout.
    Network,
    /// Bad user input.
    InvalidInput,
    /// Signing or broadcast failure.
    Submission,
    /// Overlapping request or wrong state.
    Busy,
    /// Anything else.
    Other,
}

impl ErrorKind {
    /// Guidance shown to the user for this class of error.
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::WalletUnavailable => "No wallet is available. Connect a wallet and retry.",
            Self::UserRejected => "The request was rejected. Retry when ready.",
            Self::Config => "Configure the multisig account address.",
            Self::NotFound => {
                "No account exists at this address on the selected cluster. \
                 Check the address and the RPC URL."
            }
            Self::WrongAccountType => {
                "The configured address is not a Squads multisig account. \
                 If it is the vault address, configure the multisig account address instead; \
                 the vault is derived from it."
            }
            Self::Decode => {
                "The account data does not match the Squads v4 multisig layout. \
                 Make sure this is a Squads v4 multisig and the program ID is correct."
            }
            Self::AccessDenied => {
                "The RPC endpoint refused the request. \
                 Use an RPC URL that allows account reads, such as a dedicated provider endpoint."
            }
            Self::Network => {
                "Could not reach the RPC endpoint in time. \
                 Check the network connection and the RPC URL."
            }
            Self::InvalidInput => {
                "Check the recipient address and enter an amount greater than 0 \
                 with at most 9 decimal places."
            }
            Self::Submission => {
                "The transaction was not accepted. Make sure the wallet is a multisig member \
                 with the initiate permission and holds enough SOL for fees and rent."
            }
            Self::Busy => "Wait for the current request to finish.",
            Self::Other => "Unexpected error.",
        }
    }
}

impl Error {
    /// Create a decode error.
    pub fn decode(msg: impl ToString) -> Self {
        Self::Decode(msg.to_string())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl ToString) -> Self {
        Self::InvalidInput(msg.to_string())
    }

    /// Create a submission error.
    pub fn submission(msg: impl ToString) -> Self {
        Self::SubmissionFailed(msg.to_string())
    }

    /// Returns the class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::WalletUnavailable(_) => ErrorKind::WalletUnavailable,
            Self::UserRejected(_) => ErrorKind::UserRejected,
            Self::ConfigMissing(_) => ErrorKind::Config,
            Self::AccountNotFound(_) => ErrorKind::NotFound,
            Self::WrongProgramOwner { .. } => ErrorKind::WrongAccountType,
            Self::Decode(_) => ErrorKind::Decode,
            Self::AccessDenied(_) | Self::Rpc(_) => ErrorKind::AccessDenied,
            Self::Network(_) | Self::Timeout(_) => ErrorKind::Network,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::SubmissionFailed(_) => ErrorKind::Submission,
            Self::Busy(_) | Self::InvalidState(_) => ErrorKind::Busy,
            Self::Borsh(_) | Self::SolanaUtils(_) => ErrorKind::Other,
        }
    }

    /// Returns the guidance for this error.
    pub fn guidance(&self) -> &'static str {
        self.kind().guidance()
    }

    /// Render the error as a single status line.
    pub fn status(&self) -> String {
        format!("Error: {self}. {}", self.guidance())
    }

    /// Classify an error returned by the wallet signer.
    pub fn from_signer_error(err: SignerError) -> Self {
        match err {
            SignerError::UserCancel(msg) => Self::UserRejected(msg),
            SignerError::NoDeviceFound | SignerError::Connection(_) => {
                Self::WalletUnavailable(err.to_string())
            }
            err => Self::SubmissionFailed(err.to_string()),
        }
    }

    /// Classify an error returned by the RPC client.
    #[cfg(client)]
    pub fn from_client_error(err: solana_client::client_error::ClientError) -> Self {
        use solana_client::client_error::ClientErrorKind;

        const UNAUTHORIZED: u16 = 401;
        const FORBIDDEN: u16 = 403;
        const TOO_MANY_REQUESTS: u16 = 429;

        let msg = err.to_string();
        match err.kind() {
            ClientErrorKind::Io(_) => Self::Network(msg),
            ClientErrorKind::Reqwest(reqwest_err) => match reqwest_err.status() {
                Some(status)
                    if matches!(
                        status.as_u16(),
                        UNAUTHORIZED | FORBIDDEN | TOO_MANY_REQUESTS
                    ) =>
                {
                    Self::AccessDenied(msg)
                }
                Some(_) => Self::Rpc(msg),
                None => Self::Network(msg),
            },
            ClientErrorKind::TransactionError(_) => Self::SubmissionFailed(msg),
            ClientErrorKind::SigningError(_) => Self::SubmissionFailed(msg),
            _ => Self::Rpc(msg),
        }
    }

    /// Classify an error returned while broadcasting or confirming a transaction.
    ///
    /// Preflight rejections and unconfirmed transactions are submission failures.
    /// Connectivity and access problems keep their [`Error::from_client_error`] class.
    #[cfg(client)]
    pub fn from_send_error(err: solana_client::client_error::ClientError) -> Self {
        use solana_client::{client_error::ClientErrorKind, rpc_request::RpcError};

        match err.kind() {
            ClientErrorKind::RpcError(
                RpcError::RpcResponseError { .. } | RpcError::ForUser(_),
            ) => Self::SubmissionFailed(err.to_string()),
            _ => Self::from_client_error(err),
        }
    }
}
