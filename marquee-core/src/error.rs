//! Error types for Marquee operations

use thiserror::Error;

/// Distinguishes "the keyed entity is absent" from every other 4xx.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientErrorKind {
    NotFound,
    Other,
}

/// Classified failure of a call to an upstream service.
///
/// `Display` is the message alone so that the upstream body text reaches the
/// final caller byte-for-byte.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    /// The upstream rejected the request or does not know the resource.
    #[error("{message}")]
    Client {
        kind: ClientErrorKind,
        status: u16,
        message: String,
    },

    /// The upstream is malfunctioning or unreachable.
    #[error("{message}")]
    Server { status: u16, message: String },
}

impl UpstreamError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Client {
            kind: ClientErrorKind::NotFound,
            status: 404,
            message: message.into(),
        }
    }

    pub fn client(status: u16, message: impl Into<String>) -> Self {
        Self::Client {
            kind: ClientErrorKind::Other,
            status,
            message: message.into(),
        }
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Status the upstream answered with (502 for transport failures).
    pub fn status(&self) -> u16 {
        match self {
            Self::Client { status, .. } | Self::Server { status, .. } => *status,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Client { message, .. } | Self::Server { message, .. } => message,
        }
    }

    pub fn is_client(&self) -> bool {
        matches!(self, Self::Client { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Client {
                kind: ClientErrorKind::NotFound,
                ..
            }
        )
    }

    pub fn is_server(&self) -> bool {
        matches!(self, Self::Server { .. })
    }
}

/// Local input failed its field constraints.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Every violated constraint, sorted and comma-joined on display.
    #[error("{}", .messages.join(","))]
    ConstraintViolations { messages: Vec<String> },
}

impl ValidationError {
    /// Build from violation messages in any order.
    pub fn from_violations(mut messages: Vec<String>) -> Self {
        messages.sort();
        Self::ConstraintViolations { messages }
    }
}

/// Document store errors.
///
/// Absent documents are `Ok(None)`, not an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Store unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Master error type for all Marquee errors.
#[derive(Debug, Clone, Error)]
pub enum MarqueeError {
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for Marquee operations.
pub type MarqueeResult<T> = Result<T, MarqueeError>;

// =============================================================================
// TESTS
// =============================================================================
