//! Configuration types for dispatchers and the settlement engine.

use serde::{Deserialize, Serialize};

use crate::{ChainId, Result, XledgerError, constants};

/// Configuration for one chain's cross-chain dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// The chain this dispatcher runs on.
    pub chain_id: ChainId,
    /// Where settlement deltas for confidential assets are sent.
    pub coordination_chain_id: ChainId,
    /// Maximum destination legs per transfer call.
    pub max_legs_per_transfer: usize,
    /// Maximum callables per leg. May be lowered, never raised above
    /// [`constants::MAX_CALLABLES_PER_LEG`].
    pub max_callables_per_leg: usize,
}

impl DispatcherConfig {
    #[must_use]
    pub fn for_chain(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            coordination_chain_id: ChainId(constants::DEFAULT_COORDINATION_CHAIN_ID),
            max_legs_per_transfer: constants::DEFAULT_MAX_LEGS_PER_TRANSFER,
            max_callables_per_leg: constants::MAX_CALLABLES_PER_LEG,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.chain_id == self.coordination_chain_id {
            return Err(XledgerError::Configuration(format!(
                "ledger chain {} cannot be the coordination chain",
                self.chain_id
            )));
        }
        if self.max_legs_per_transfer == 0 {
            return Err(XledgerError::Configuration(
                "max_legs_per_transfer must be > 0".into(),
            ));
        }
        if self.max_callables_per_leg > constants::MAX_CALLABLES_PER_LEG {
            return Err(XledgerError::Configuration(format!(
                "max_callables_per_leg {} exceeds hard cap {}",
                self.max_callables_per_leg,
                constants::MAX_CALLABLES_PER_LEG
            )));
        }
        Ok(())
    }
}

/// Configuration for the coordination chain's settlement engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementConfig {
    pub coordination_chain_id: ChainId,
    /// Deltas accepted into one window before it must be finalized.
    pub max_pending_deltas_per_window: usize,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            coordination_chain_id: ChainId(constants::DEFAULT_COORDINATION_CHAIN_ID),
            max_pending_deltas_per_window: constants::DEFAULT_MAX_PENDING_DELTAS_PER_WINDOW,
        }
    }
}

impl SettlementConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_pending_deltas_per_window == 0 {
            return Err(XledgerError::Configuration(
                "max_pending_deltas_per_window must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// The set of chains joined through one coordination chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub coordination_chain_id: ChainId,
    pub participants: Vec<ChainId>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            coordination_chain_id: ChainId(constants::DEFAULT_COORDINATION_CHAIN_ID),
            participants: Vec::new(),
        }
    }
}

impl NetworkConfig {
    /// Dispatcher config for one participant of this network.
    pub fn dispatcher(&self, chain_id: ChainId) -> Result<DispatcherConfig> {
        if !self.participants.contains(&chain_id) {
            return Err(XledgerError::Configuration(format!(
                "{chain_id} is not part of this network"
            )));
        }
        let cfg = DispatcherConfig {
            coordination_chain_id: self.coordination_chain_id,
            ..DispatcherConfig::for_chain(chain_id)
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Settlement config for this network's coordination chain.
    #[must_use]
    pub fn settlement(&self) -> SettlementConfig {
        SettlementConfig {
            coordination_chain_id: self.coordination_chain_id,
            ..SettlementConfig::default()
        }
    }
}
