//! Error types for xledger.
//!
//! All errors use the `XL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Transfer validation (synchronous rejection, no state change)
//! - 2xx: Balance errors
//! - 3xx: Registry errors
//! - 4xx: Reference tracking errors
//! - 5xx: Confidential settlement errors
//! - 6xx: Atomic teleport saga errors
//! - 7xx: Callable execution errors
//! - 8xx: Authority errors
//! - 9xx: General / internal errors
//!
//! Duplicate deliveries have no variant: they are absorbed as
//! no-op outcomes, never surfaced as failures.

use thiserror::Error;

use crate::{AssetStandard, AssetStatus, ChainId, ReferenceId, ReferenceStatus, ResourceId, TokenId, WindowId};

/// Central error enum for all xledger operations.
#[derive(Debug, Error)]
pub enum XledgerError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// Leg arrays are empty, of unequal length, or otherwise malformed.
    #[error("XL_ERR_100: Malformed transfer legs: {reason}")]
    MalformedLegs { reason: String },

    /// A leg carries more callables than allowed.
    #[error("XL_ERR_101: Leg {leg} has {count} callables, max is {max}")]
    TooManyCallables { leg: usize, count: usize, max: usize },

    /// More legs than the configured batch size.
    #[error("XL_ERR_102: Transfer has {count} legs, max is {max}")]
    TooManyLegs { count: usize, max: usize },

    /// Zero or otherwise unusable amount.
    #[error("XL_ERR_103: Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// Destination is not a registered participant.
    #[error("XL_ERR_104: Unknown destination: {0}")]
    UnknownDestination(ChainId),

    /// Destination participant is registered but not ACTIVE.
    #[error("XL_ERR_105: Destination not active: {0}")]
    DestinationFrozen(ChainId),

    /// A leg addresses the origin chain itself.
    #[error("XL_ERR_106: Leg addresses its own origin {0}")]
    SelfTransfer(ChainId),

    /// The transfer form isn't available for this asset.
    #[error("XL_ERR_107: Unsupported transfer: {reason}")]
    UnsupportedTransfer { reason: String },

    // =================================================================
    // Balance Errors (2xx)
    // =================================================================
    #[error("XL_ERR_200: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("XL_ERR_201: Token {0} not owned by sender")]
    TokenNotOwned(TokenId),

    #[error("XL_ERR_202: Token {0} already exists")]
    TokenAlreadyExists(TokenId),

    #[error("XL_ERR_203: Balance overflow")]
    BalanceOverflow,

    // =================================================================
    // Registry Errors (3xx)
    // =================================================================
    #[error("XL_ERR_300: Resource not found: {0}")]
    ResourceNotFound(ResourceId),

    /// Asset exists but isn't approved.
    #[error("XL_ERR_301: Resource {resource} is {status}, not ACTIVE")]
    ResourceNotActive {
        resource: ResourceId,
        status: AssetStatus,
    },

    /// Asset is frozen; inbound credit rejected.
    #[error("XL_ERR_302: Asset frozen: {0}")]
    AssetFrozen(ResourceId),

    #[error("XL_ERR_303: Invalid status transition: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("XL_ERR_304: Participant not found: {0}")]
    ParticipantNotFound(ChainId),

    #[error("XL_ERR_305: Participant already registered: {0}")]
    ParticipantAlreadyRegistered(ChainId),

    /// Only the issuer chain may mint.
    #[error("XL_ERR_306: {chain} is not the issuer of {resource}")]
    NotIssuer { resource: ResourceId, chain: ChainId },

    /// Requested operation doesn't fit the asset's standard.
    #[error("XL_ERR_307: Standard mismatch: asset is {actual}, operation needs {expected}")]
    StandardMismatch {
        expected: String,
        actual: AssetStandard,
    },

    /// The asset has no handle on this chain yet.
    #[error("XL_ERR_308: Asset not instantiated on this chain: {0}")]
    UnknownLocalAsset(ResourceId),

    // =================================================================
    // Reference Errors (4xx)
    // =================================================================
    /// SENT is exactly-once.
    #[error("XL_ERR_400: Reference {0} already sent")]
    ReferenceAlreadySent(ReferenceId),

    /// A receipt arrived for a reference that was never sent.
    #[error("XL_ERR_401: Reference {0} was never sent")]
    ReferenceNotSent(ReferenceId),

    #[error("XL_ERR_402: Reference {reference} on {chain}: cannot go {from} -> {to}")]
    InvalidReferenceTransition {
        reference: ReferenceId,
        chain: ChainId,
        from: ReferenceStatus,
        to: ReferenceStatus,
    },

    /// A receipt names a chain the transfer never addressed.
    #[error("XL_ERR_403: Reference {reference} has no leg for {chain}")]
    UnknownLeg {
        reference: ReferenceId,
        chain: ChainId,
    },

    // =================================================================
    // Settlement Errors (5xx)
    // =================================================================
    #[error("XL_ERR_500: Proof rejected: {reason}")]
    ProofRejected { reason: String },

    /// Supply conservation broken. Critical safety alert.
    #[error("XL_ERR_501: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    /// Conservation can only be checked once no legs are in flight.
    #[error("XL_ERR_502: Settlement in flight: {in_flight_legs} legs undelivered, {pending_chains} chains pending")]
    SettlementInFlight {
        in_flight_legs: usize,
        pending_chains: usize,
    },

    #[error("XL_ERR_503: Settlement window {0} is full")]
    WindowFull(WindowId),

    /// An envelope reached a chain it wasn't addressed to.
    #[error("XL_ERR_504: Message for {expected} delivered to {actual}")]
    WrongDestination { expected: ChainId, actual: ChainId },

    // =================================================================
    // Atomic Saga Errors (6xx)
    // =================================================================
    #[error("XL_ERR_600: No teleport saga for reference {0}")]
    SagaNotFound(ReferenceId),

    /// A confirmed teleport cannot be compensated, nor a compensated one
    /// confirmed.
    #[error("XL_ERR_601: Teleport {reference} already {state}")]
    SagaAlreadyTerminal { reference: ReferenceId, state: String },

    // =================================================================
    // Callable Errors (7xx)
    // =================================================================
    /// Logged by the dispatcher, never propagated past the credit.
    #[error("XL_ERR_700: Callable on {target} failed: {reason}")]
    CallableFailed { target: String, reason: String },

    // =================================================================
    // Authority Errors (8xx)
    // =================================================================
    #[error("XL_ERR_800: Authority signature invalid")]
    InvalidAuthoritySignature,

    #[error("XL_ERR_801: Authority nonce {0} already used")]
    AuthorityNonceReused(u64),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    #[error("XL_ERR_900: Internal error: {0}")]
    Internal(String),

    #[error("XL_ERR_901: Serialization error: {0}")]
    Serialization(String),

    #[error("XL_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

impl XledgerError {
    /// Whether this is a synchronous validation rejection (1xx).
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MalformedLegs { .. }
                | Self::TooManyCallables { .. }
                | Self::TooManyLegs { .. }
                | Self::InvalidAmount { .. }
                | Self::UnknownDestination(_)
                | Self::DestinationFrozen(_)
                | Self::SelfTransfer(_)
                | Self::UnsupportedTransfer { .. }
        )
    }

    /// Whether the relay should redeliver later instead of dropping the
    /// message: a receipt that overtook its transfer, or a full window.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::ReferenceNotSent(_) | Self::WindowFull(_))
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, XledgerError>;
