//! Error types and the transport-error classifier

use stratus_schema::{Operation, SchemaError};
use thiserror::Error;

/// Transport-independent error shape for remote API failures
///
/// Service adapters construct one from whatever their SDK surfaces. The
/// classifier predicates below inspect it without rewrapping, so upstream
/// callers can still match on code and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Service error code (e.g. "ResourceNotFoundException")
    pub code: String,

    /// Human-readable message from the service
    pub message: String,

    /// HTTP status, when the transport exposes one
    pub status: Option<u16>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Whether the error carries exactly this service code
pub fn is_code(err: &ApiError, code: &str) -> bool {
    err.code == code
}

/// Whether the error is the service's "does not exist" answer
///
/// Not-found codes are per-service; callers pass the codes their service
/// uses. HTTP 404 is accepted for services that only speak status codes.
pub fn is_not_found(err: &ApiError, codes: &[&str]) -> bool {
    codes.iter().any(|c| err.code == *c) || err.status == Some(404)
}

/// Whether the error has the given code and its message contains the fragment
pub fn is_message_contains(err: &ApiError, code: &str, fragment: &str) -> bool {
    err.code == code && err.message.contains(fragment)
}

const THROTTLE_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "ThrottledException",
    "RequestLimitExceeded",
    "TooManyRequestsException",
    "SlowDown",
];

/// Whether the remote asked us to back off
pub fn is_throttled(err: &ApiError) -> bool {
    THROTTLE_CODES.contains(&err.code.as_str()) || err.status == Some(429)
}

const SKIPPABLE_SWEEP_CODES: &[&str] = &[
    "UnsupportedOperation",
    "InvalidAction",
    "OptInRequired",
    "SubscriptionRequiredException",
];

const SKIPPABLE_SWEEP_FRAGMENTS: &[&str] = &[
    "is not supported in this region",
    "is not available in this region",
    "not signed up for this service",
];

/// Whether a sweep may treat this region-level error as a no-op skip
/// (service unsupported in the region or partition)
pub fn is_skippable_sweep_error(err: &ApiError) -> bool {
    SKIPPABLE_SWEEP_CODES.contains(&err.code.as_str())
        || SKIPPABLE_SWEEP_FRAGMENTS
            .iter()
            .any(|f| err.message.contains(f))
}

/// Errors surfaced by the lifecycle driver and its collaborators
///
/// Messages name the resource type, the identifier and the operation so
/// users can match on them in their own tooling.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{resource} ({id}) not found")]
    NotFound { resource: String, id: String },

    #[error("Invalid configuration: {0}")]
    Validation(#[from] SchemaError),

    #[error("Timed out during {operation} of {resource} ({id}): {cause}")]
    TimedOut {
        resource: String,
        id: String,
        operation: Operation,
        cause: String,
    },

    #[error("{resource} ({id}) entered unexpected state {state:?} during {operation}")]
    UnexpectedState {
        resource: String,
        id: String,
        operation: Operation,
        state: String,
    },

    #[error("Error during {operation} of {resource} ({id}): {source}")]
    Api {
        resource: String,
        id: String,
        operation: Operation,
        source: ApiError,
    },

    #[error("No {service} client registered for region {region}")]
    MissingClient { service: String, region: String },

    #[error("Unexpected identifier format {id:?}: expected {expected}")]
    InvalidId { id: String, expected: String },

    #[error("{resource} was created but no identifier was set")]
    MissingId { resource: String },

    #[error("{resource} does not support in-place updates")]
    NoUpdate { resource: String },

    #[error(
        "Attribute {attribute} of {resource} ({id}) cannot be updated in place; replacement required"
    )]
    ForceNew {
        resource: String,
        id: String,
        attribute: String,
    },

    #[error("Cannot upgrade state of {resource} from version {from}: {message}")]
    Upgrade {
        resource: String,
        from: u64,
        message: String,
    },
}

impl ProviderError {
    /// Wrap a transport error with resource/operation context
    pub fn api(
        resource: impl Into<String>,
        id: impl Into<String>,
        operation: Operation,
        source: ApiError,
    ) -> Self {
        Self::Api {
            resource: resource.into(),
            id: id.into(),
            operation,
            source,
        }
    }

    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
