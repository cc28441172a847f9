use thiserror::Error;
use xbridge_core::DomainError;

/// Coarse classification callers branch on
///
/// Validation failures mean the exchange data (or the caller's input)
/// violated a normalization invariant; they are never silently repaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Network or upstream protocol failure
    Transport,
    /// Credentials missing or refused
    Auth,
    /// Data or input violated an invariant (precision, sorting, crossing)
    Validation,
    /// Order-level failure (unknown id, already closed, rejected)
    Order,
    /// Account state prevents the operation (e.g. insufficient funds)
    Account,
    /// Connector used before `init`
    State,
    /// Operation not offered by this venue
    Unsupported,
}

/// Errors surfaced through the [`ApiClient`](crate::ApiClient) port
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Exchange API error {code}: {message}")]
    Api { code: i32, message: String },

    #[error("Malformed exchange response: {0}")]
    Parse(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Connector not initialized")]
    NotInitialized,

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order rejected: {0}")]
    Rejected(String),

    #[error("Operation not supported: {0}")]
    Unsupported(&'static str),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Transport(_) | ClientError::Api { .. } | ClientError::Parse(_) => {
                ErrorKind::Transport
            }
            ClientError::Auth(_) => ErrorKind::Auth,
            ClientError::NotInitialized => ErrorKind::State,
            ClientError::UnknownSymbol(_) => ErrorKind::Validation,
            ClientError::OrderNotFound(_) | ClientError::Rejected(_) => ErrorKind::Order,
            ClientError::Unsupported(_) => ErrorKind::Unsupported,
            ClientError::Domain(e) => match e {
                DomainError::OrderClosed { .. } => ErrorKind::Order,
                DomainError::InsufficientBalance { .. } => ErrorKind::Account,
                _ => ErrorKind::Validation,
            },
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Returns true if retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Api { code, .. } => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
