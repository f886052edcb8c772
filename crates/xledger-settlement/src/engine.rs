//! The Confidential Settlement Engine.
//!
//! Keeps, per `(chain, asset)`, a `finalized` commitment and a `pending`
//! accumulator. Every confidential event folds a signed delta into pending:
//!
//! | event                        | chain       | delta             |
//! |------------------------------|-------------|-------------------|
//! | mint `v` with blinding `r`   | minter      | `+Commit(v, r)`   |
//! | burn `v` with blinding `r`   | burner      | `-Commit(v, r)`   |
//! | outbound transfer            | origin      | `origin_delta`    |
//! | receipt for one leg          | destination | `+leg commitment` |
//!
//! [`ConfidentialSettlementEngine::finalize`] closes the current window:
//! `finalized ⊕= pending`, `pending = identity`. Addition of points is
//! commutative and associative, so the order deltas arrived in never
//! changes the result. Finalization takes `&mut self`, so no delta can land
//! between reading and resetting an accumulator.
//!
//! A leg's commitment is held in flight from the moment its transfer is
//! applied until its destination's receipt arrives; it only reaches the
//! destination's pending accumulator then.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use xledger_ledger::ReferenceTracker;
use xledger_types::{
    Blinding, ChainId, CommittedLeg, Commitment, CoordinationMessage, Envelope, ReferenceId,
    ReferenceStatus, RelayPayload, ResourceId, Result, SettlementConfig, WindowId, XledgerError,
    committed_value,
};

use crate::supply_conservation::SupplyConservation;
use crate::verifier::{BalancedDeltaVerifier, ProofVerifier};

// ---------------------------------------------------------------------------
// State records
// ---------------------------------------------------------------------------

/// Commitment state of one asset on one chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainCommitment {
    pub finalized: Commitment,
    pub pending: Commitment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeltaKind {
    Mint,
    Burn,
    TransferOut,
    TransferIn,
}

/// One delta folded into pending during the current window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDelta {
    pub window: WindowId,
    pub reference_id: ReferenceId,
    pub resource_id: ResourceId,
    pub chain: ChainId,
    pub kind: DeltaKind,
    pub delta: Commitment,
}

/// Summary of one finalized window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowReport {
    pub window: WindowId,
    pub deltas: usize,
    /// Every `(chain, asset)` whose pending accumulator received a delta.
    pub touched: BTreeSet<(ChainId, ResourceId)>,
    pub finalized_at: DateTime<Utc>,
}

/// Result of applying one coordination message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    Applied,
    /// Already applied; nothing changed.
    Duplicate,
}

#[derive(Debug)]
struct InFlight {
    resource_id: ResourceId,
    /// Legs whose receipt hasn't arrived yet.
    legs: BTreeMap<ChainId, Commitment>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct ConfidentialSettlementEngine {
    config: SettlementConfig,
    /// `(chain, asset) → commitments`, addressed by stable keys.
    state: HashMap<(ChainId, ResourceId), ChainCommitment>,
    window: WindowId,
    pending_log: Vec<PendingDelta>,
    last_window_pending: Option<WindowId>,
    tallied: BTreeSet<WindowId>,
    references: ReferenceTracker,
    /// Mint/burn reference ids already folded.
    supply_events: HashSet<ReferenceId>,
    in_flight: HashMap<ReferenceId, InFlight>,
    verifier: Box<dyn ProofVerifier>,
    supply: SupplyConservation,
}

impl ConfidentialSettlementEngine {
    /// Create an engine with the [`BalancedDeltaVerifier`].
    pub fn new(config: SettlementConfig) -> Result<Self> {
        Self::with_verifier(config, Box::new(BalancedDeltaVerifier))
    }

    pub fn with_verifier(config: SettlementConfig, verifier: Box<dyn ProofVerifier>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: HashMap::new(),
            window: WindowId(0),
            pending_log: Vec::new(),
            last_window_pending: None,
            tallied: BTreeSet::new(),
            references: ReferenceTracker::new(),
            supply_events: HashSet::new(),
            in_flight: HashMap::new(),
            verifier,
            supply: SupplyConservation::new(),
        })
    }

    #[must_use]
    pub fn chain_id(&self) -> ChainId {
        self.config.coordination_chain_id
    }

    // =================================================================
    // Inbound
    // =================================================================

    /// Apply a relay envelope addressed to the coordination chain.
    pub fn handle(&mut self, envelope: &Envelope) -> Result<SettlementOutcome> {
        if envelope.destination != self.config.coordination_chain_id {
            return Err(XledgerError::WrongDestination {
                expected: envelope.destination,
                actual: self.config.coordination_chain_id,
            });
        }
        match &envelope.payload {
            RelayPayload::Coordination(msg) => {
                // A chain only reports its own side of a transfer.
                let reporter = match msg {
                    CoordinationMessage::ConfidentialTransfer { origin_chain, .. } => *origin_chain,
                    CoordinationMessage::ConfidentialReceipt { dest_chain, .. } => *dest_chain,
                    CoordinationMessage::Mint { chain, .. } | CoordinationMessage::Burn { chain, .. } => *chain,
                };
                if reporter != envelope.source {
                    return Err(XledgerError::UnsupportedTransfer {
                        reason: format!("{} cannot report for {reporter}", envelope.source),
                    });
                }
                self.apply(msg)
            }
            _ => Err(XledgerError::UnsupportedTransfer {
                reason: "coordination chain only accepts settlement messages".into(),
            }),
        }
    }

    /// Fold one coordination message into the current window.
    ///
    /// Replays are absorbed as [`SettlementOutcome::Duplicate`]. A receipt
    /// that overtakes its transfer is refused with the retriable
    /// [`XledgerError::ReferenceNotSent`].
    pub fn apply(&mut self, msg: &CoordinationMessage) -> Result<SettlementOutcome> {
        match msg {
            CoordinationMessage::ConfidentialTransfer {
                reference_id,
                resource_id,
                origin_chain,
                origin_delta,
                legs,
                proof,
            } => self.apply_transfer(*reference_id, *resource_id, *origin_chain, *origin_delta, legs, proof),
            CoordinationMessage::ConfidentialReceipt {
                reference_id,
                resource_id,
                dest_chain,
            } => self.apply_receipt(*reference_id, *resource_id, *dest_chain),
            CoordinationMessage::Mint {
                reference_id,
                resource_id,
                chain,
                value,
                blinding,
            } => self.apply_supply(*reference_id, *resource_id, *chain, *value, *blinding, DeltaKind::Mint),
            CoordinationMessage::Burn {
                reference_id,
                resource_id,
                chain,
                value,
                blinding,
            } => self.apply_supply(*reference_id, *resource_id, *chain, *value, *blinding, DeltaKind::Burn),
        }
    }

    fn apply_transfer(
        &mut self,
        reference_id: ReferenceId,
        resource_id: ResourceId,
        origin: ChainId,
        origin_delta: Commitment,
        legs: &[CommittedLeg],
        proof: &[u8],
    ) -> Result<SettlementOutcome> {
        if self.references.status(&reference_id, origin) == ReferenceStatus::Sent {
            warn!(reference = %reference_id, %origin, "Duplicate confidential transfer ignored");
            return Ok(SettlementOutcome::Duplicate);
        }
        let mut dests = BTreeMap::new();
        for leg in legs {
            if leg.dest_chain == origin {
                return Err(XledgerError::SelfTransfer(origin));
            }
            if dests.insert(leg.dest_chain, leg.commitment).is_some() {
                return Err(XledgerError::MalformedLegs {
                    reason: format!("two legs address {}", leg.dest_chain),
                });
            }
        }
        self.ensure_capacity(1)?;
        self.verifier
            .verify_transfer(resource_id, &origin_delta, legs, proof)?;
        self.references.set_sent(reference_id, origin)?;

        self.fold(origin, resource_id, reference_id, DeltaKind::TransferOut, origin_delta);
        self.in_flight.insert(
            reference_id,
            InFlight {
                resource_id,
                legs: dests,
            },
        );
        info!(
            reference = %reference_id,
            resource = %resource_id,
            %origin,
            legs = legs.len(),
            window = %self.window,
            "Confidential transfer folded into pending"
        );
        Ok(SettlementOutcome::Applied)
    }

    fn apply_receipt(
        &mut self,
        reference_id: ReferenceId,
        resource_id: ResourceId,
        dest: ChainId,
    ) -> Result<SettlementOutcome> {
        if self.references.is_received(&reference_id, dest) {
            warn!(reference = %reference_id, chain = %dest, "Duplicate receipt ignored");
            return Ok(SettlementOutcome::Duplicate);
        }
        let Some(flight) = self.in_flight.get(&reference_id) else {
            let sent = self
                .references
                .record(&reference_id)
                .is_some_and(|r| r.origin.is_some());
            return Err(if sent {
                XledgerError::UnknownLeg {
                    reference: reference_id,
                    chain: dest,
                }
            } else {
                XledgerError::ReferenceNotSent(reference_id)
            });
        };
        let commitment = match flight.legs.get(&dest) {
            Some(c) if flight.resource_id == resource_id => *c,
            _ => {
                return Err(XledgerError::UnknownLeg {
                    reference: reference_id,
                    chain: dest,
                });
            }
        };
        self.ensure_capacity(1)?;
        self.references.set_received(reference_id, dest)?;

        self.fold(dest, resource_id, reference_id, DeltaKind::TransferIn, commitment);
        if let Some(flight) = self.in_flight.get_mut(&reference_id) {
            flight.legs.remove(&dest);
            if flight.legs.is_empty() {
                self.in_flight.remove(&reference_id);
            }
        }
        debug!(reference = %reference_id, chain = %dest, "Receipt folded into pending");
        Ok(SettlementOutcome::Applied)
    }

    fn apply_supply(
        &mut self,
        reference_id: ReferenceId,
        resource_id: ResourceId,
        chain: ChainId,
        value: u128,
        blinding: Blinding,
        kind: DeltaKind,
    ) -> Result<SettlementOutcome> {
        if self.supply_events.contains(&reference_id) {
            warn!(reference = %reference_id, %chain, ?kind, "Duplicate supply event ignored");
            return Ok(SettlementOutcome::Duplicate);
        }
        let signed = committed_value(value)?;
        self.ensure_capacity(1)?;

        let delta = match kind {
            DeltaKind::Mint => {
                self.supply.record_mint(resource_id, value, blinding)?;
                Commitment::commit(signed, &blinding)
            }
            DeltaKind::Burn => {
                self.supply.record_burn(resource_id, value, blinding)?;
                -Commitment::commit(signed, &blinding)
            }
            DeltaKind::TransferOut | DeltaKind::TransferIn => {
                return Err(XledgerError::Internal(format!("{kind:?} is not a supply delta")));
            }
        };
        self.supply_events.insert(reference_id);
        self.fold(chain, resource_id, reference_id, kind, delta);
        info!(reference = %reference_id, resource = %resource_id, %chain, ?kind, value = %value, "Supply delta folded into pending");
        Ok(SettlementOutcome::Applied)
    }

    fn ensure_capacity(&self, extra: usize) -> Result<()> {
        if self.pending_log.len() + extra > self.config.max_pending_deltas_per_window {
            return Err(XledgerError::WindowFull(self.window));
        }
        Ok(())
    }

    fn fold(
        &mut self,
        chain: ChainId,
        resource_id: ResourceId,
        reference_id: ReferenceId,
        kind: DeltaKind,
        delta: Commitment,
    ) {
        self.state.entry((chain, resource_id)).or_default().pending += delta;
        self.pending_log.push(PendingDelta {
            window: self.window,
            reference_id,
            resource_id,
            chain,
            kind,
            delta,
        });
        self.last_window_pending = Some(self.window);
    }

    // =================================================================
    // Finalization
    // =================================================================

    /// Close the current window: fold every pending accumulator into its
    /// finalized commitment and open the next window.
    pub fn finalize(&mut self) -> WindowReport {
        let window = self.window;
        let deltas = std::mem::take(&mut self.pending_log);
        for state in self.state.values_mut() {
            let pending = std::mem::take(&mut state.pending);
            state.finalized += pending;
        }
        let touched: BTreeSet<_> = deltas.iter().map(|d| (d.chain, d.resource_id)).collect();
        self.tallied.insert(window);
        self.window = window.next();
        info!(
            %window,
            deltas = deltas.len(),
            touched = touched.len(),
            in_flight = self.in_flight.len(),
            "Settlement window finalized"
        );
        WindowReport {
            window,
            deltas: deltas.len(),
            touched,
            finalized_at: Utc::now(),
        }
    }

    // =================================================================
    // Queries
    // =================================================================

    #[must_use]
    pub fn balance_finalised(&self, chain: ChainId, resource: ResourceId) -> Commitment {
        self.state
            .get(&(chain, resource))
            .map_or_else(Commitment::identity, |s| s.finalized)
    }

    #[must_use]
    pub fn balance_pending(&self, chain: ChainId, resource: ResourceId) -> Commitment {
        self.state
            .get(&(chain, resource))
            .map_or_else(Commitment::identity, |s| s.pending)
    }

    #[must_use]
    pub fn current_window(&self) -> WindowId {
        self.window
    }

    /// Deltas folded into pending during the current window.
    #[must_use]
    pub fn pending_deltas(&self) -> &[PendingDelta] {
        &self.pending_log
    }

    /// The most recent window that received a delta.
    #[must_use]
    pub fn last_window_pending(&self) -> Option<WindowId> {
        self.last_window_pending
    }

    /// Whether `window` has been finalized.
    #[must_use]
    pub fn pending_balances_tallied(&self, window: WindowId) -> bool {
        self.tallied.contains(&window)
    }

    /// Delivery status of `reference_id` on `chain`, as the coordination
    /// chain has recorded it.
    #[must_use]
    pub fn reference_status(&self, reference_id: &ReferenceId, chain: ChainId) -> ReferenceStatus {
        self.references.status(reference_id, chain)
    }

    /// Legs applied at their origin whose receipt hasn't arrived.
    #[must_use]
    pub fn in_flight_legs(&self, resource: ResourceId) -> usize {
        self.in_flight
            .values()
            .filter(|f| f.resource_id == resource)
            .map(|f| f.legs.len())
            .sum()
    }

    /// Chains holding any commitment state for `resource`.
    #[must_use]
    pub fn chains_for(&self, resource: ResourceId) -> BTreeSet<ChainId> {
        self.state
            .keys()
            .filter(|(_, r)| *r == resource)
            .map(|(c, _)| *c)
            .collect()
    }

    #[must_use]
    pub fn supply(&self) -> &SupplyConservation {
        &self.supply
    }

    /// Check that the finalized commitments of every chain add up to minted
    /// minus burned.
    ///
    /// # Errors
    /// [`XledgerError::SettlementInFlight`] while legs are undelivered or
    /// pending deltas are unfinalized;
    /// [`XledgerError::SupplyInvariantViolation`] if the sum is wrong.
    pub fn verify_supply(&self, resource: ResourceId) -> Result<()> {
        let in_flight_legs = self.in_flight_legs(resource);
        let pending_chains = self
            .state
            .iter()
            .filter(|((_, r), s)| *r == resource && !s.pending.is_identity())
            .count();
        if in_flight_legs > 0 || pending_chains > 0 {
            return Err(XledgerError::SettlementInFlight {
                in_flight_legs,
                pending_chains,
            });
        }
        let total: Commitment = self
            .state
            .iter()
            .filter(|((_, r), _)| *r == resource)
            .map(|(_, s)| s.finalized)
            .sum();
        self.supply.verify(resource, &total)
    }
}
