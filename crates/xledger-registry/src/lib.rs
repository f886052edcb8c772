//! # xledger-registry
//!
//! The coordination chain's **Resource Registry**.
//!
//! - [`ResourceRegistry`]: issues resource ids, keeps asset metadata and the
//!   authority-controlled asset status, and tracks participant chains
//! - [`RegistryView`]: the read-only seam dispatchers resolve assets and
//!   participants through
//! - [`Authority`] / [`SignedCommand`]: ed25519-signed, nonce-protected
//!   status changes
//!
//! ## Asset lifecycle
//!
//! ```text
//! register_candidate ──▶ NEW ──approve──▶ ACTIVE ⇄ INACTIVE
//!                                           freeze / unfreeze
//! ```

pub mod authority;
pub mod registry;

pub use authority::{Authority, CommandVerifier, RegistryAction, SignedCommand};
pub use registry::{RegistryView, ResourceRegistry};
