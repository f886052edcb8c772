//! # xledger-dispatch
//!
//! The per-chain **Cross-Chain Dispatcher**.
//!
//! - [`CrossChainDispatcher`]: initiates transfers (fan-out, single-leg, and
//!   atomic teleport), credits inbound legs, and keeps this chain's view of
//!   every reference id
//! - [`CallableRouter`]: runs up to five destination-side callables after a
//!   credit, isolating failures
//! - [`TeleportSaga`]: debit, then confirm or compensate, at the origin
//! - [`Outbox`] / [`Inbox`]: the hand-off points to the external relay
//!
//! ## Message flow
//!
//! ```text
//!  origin dispatcher            relay              destination dispatcher
//!  ─────────────────            ─────              ──────────────────────
//!  debit, SENT ──▶ outbox ──▶ (at least once) ──▶ inbox ──▶ credit, RECEIVED
//!                     │                                        │
//!                     └──▶ coordination chain ◀── receipt ─────┘
//!                          (confidential assets only)
//! ```

pub mod callable;
pub mod dispatcher;
pub mod relay;
pub mod teleport;

pub use callable::{CallContext, CallableExecutor, CallableRouter};
pub use dispatcher::{CrossChainDispatcher, InboundOutcome};
pub use relay::{Inbox, Outbox};
pub use teleport::{TeleportSaga, TeleportState};
