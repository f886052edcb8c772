//! # xledger-types
//!
//! Shared types, errors, and configuration for **xledger**, a settlement
//! layer for asset transfers across independently operated ledger chains
//! joined through a coordination chain.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`ChainId`], [`HolderId`], [`ResourceId`], [`ReferenceId`], [`TokenId`], [`WindowId`]
//! - **Asset model**: [`AssetStandard`], [`AssetStatus`], [`AssetMetadata`], [`AssetRecord`]
//! - **Participant model**: [`Participant`], [`ParticipantStatus`], [`ParticipantRole`]
//! - **Commitments**: [`Commitment`], [`Blinding`], [`Opening`]
//! - **Transfer model**: [`TransferLeg`], [`LegAmount`], [`Callable`], [`TransferValue`], [`ReferenceStatus`]
//! - **Relay messages**: [`Envelope`], [`TransferMessage`], [`AtomicReport`], [`CoordinationMessage`]
//! - **Configuration**: [`DispatcherConfig`], [`SettlementConfig`], [`NetworkConfig`]
//! - **Errors**: [`XledgerError`] with `XL_ERR_` prefix codes

pub mod asset;
pub mod commitment;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod message;
pub mod participant;
pub mod transfer;

pub use asset::*;
pub use commitment::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use message::*;
pub use participant::*;
pub use transfer::*;

// Constants are accessed via `xledger_types::constants::FOO`.
