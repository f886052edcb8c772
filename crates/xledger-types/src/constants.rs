//! System-wide constants for xledger.

/// Hard cap on callables attached to a single transfer leg.
/// Exceeding it rejects the call; callables are never truncated.
pub const MAX_CALLABLES_PER_LEG: usize = 5;

/// Default maximum number of destination legs in one transfer call.
pub const DEFAULT_MAX_LEGS_PER_TRANSFER: usize = 5;

/// Default cap on deltas folded into pending within one settlement window.
pub const DEFAULT_MAX_PENDING_DELTAS_PER_WINDOW: usize = 10_000;

/// Default coordination chain id.
pub const DEFAULT_COORDINATION_CHAIN_ID: u64 = 999;

/// Domain separator for reference id derivation.
pub const REFERENCE_ID_DOMAIN: &[u8] = b"xledger:reference_id:v1:";

/// Domain separator for the second Pedersen generator.
pub const PEDERSEN_H_DOMAIN: &[u8] = b"xledger:pedersen:h:v1";

/// Domain separator for registry authority command payloads.
pub const AUTHORITY_COMMAND_DOMAIN: &[u8] = b"xledger:registry:command:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
