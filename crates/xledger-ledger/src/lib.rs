//! # xledger-ledger
//!
//! Per-chain state for **xledger**:
//!
//! - [`ReferenceLedger`]: an arena of [`AssetHandle`]s keyed by resource id,
//!   created lazily from registry metadata the first time an asset arrives
//! - [`AssetHandle`]: plain fungible, non-fungible, multi-token, or
//!   confidential balances
//! - [`ReferenceTracker`]: the permanent `(reference_id, chain)` status log
//!   that makes redelivery a no-op

pub mod asset_handle;
pub mod ledger;
pub mod reference_tracker;

pub use asset_handle::AssetHandle;
pub use ledger::{LocalAsset, ReferenceLedger};
pub use reference_tracker::{ReferenceRecord, ReferenceTracker};
