//! The Cross-Chain Dispatcher.
//!
//! One per ledger chain. Outbound, it validates a transfer request, debits
//! the sender for every leg at once, mints a single reference id, marks it
//! SENT, and queues one message per leg. Inbound, it credits the holder
//! (creating the local asset handle on first sight), runs the leg's
//! callables, and marks the reference RECEIVED for this chain.
//!
//! ## Outbound
//!
//! ```text
//! validate ──▶ debit all legs ──▶ SENT ──▶ outbox: Transfer × legs
//!   (no mutation on failure)               (+ ConfidentialTransfer to the
//!                                             coordination chain)
//! ```
//!
//! ## Inbound
//!
//! ```text
//! RECEIVED already? ── yes ──▶ Duplicate
//!      │ no
//!      ▼
//! asset ACTIVE + credit ok? ── no ──▶ Rejected (atomic: report Failed)
//!      │ yes
//!      ▼
//! callables (failures logged) ──▶ RECEIVED ──▶ receipt / report Delivered
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};

use rand::rngs::OsRng;
use tracing::{debug, info, warn};
use xledger_ledger::{ReferenceLedger, ReferenceTracker};
use xledger_registry::RegistryView;
use xledger_types::{
    AssetStandard, AssetStatus, AtomicReport, Blinding, CallTarget, Callable, ChainId,
    CommittedLeg, Commitment, ContractAddress, CoordinationMessage, DeliveryOutcome,
    DispatcherConfig, Envelope, HolderId, LegAmount, Opening, ParticipantStatus, ReferenceId,
    ReferenceStatus, RelayPayload, ResourceId, Result, TokenId, TransferLeg, TransferMessage,
    TransferMode, TransferValue, XledgerError, committed_value,
};

use crate::callable::{CallContext, CallableExecutor, CallableRouter};
use crate::relay::{Inbox, Outbox};
use crate::teleport::TeleportSaga;

/// What applying one inbound envelope did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundOutcome {
    /// Holder credited and RECEIVED recorded.
    Credited { failed_callables: usize },
    /// Already applied; nothing changed.
    Duplicate,
    /// Credit refused. The reference stays UNSET on this chain.
    Rejected { reason: String },
    /// Teleport confirmed by its destination.
    Confirmed,
    /// Teleport failed at its destination and was re-credited here.
    Compensated,
}

pub struct CrossChainDispatcher {
    config: DispatcherConfig,
    ledger: ReferenceLedger,
    references: ReferenceTracker,
    sagas: HashMap<ReferenceId, TeleportSaga>,
    /// Atomic legs this chain refused. Redelivery is refused again, so a
    /// compensated teleport can never also be credited here.
    rejected_atomic: HashSet<ReferenceId>,
    callables: CallableRouter,
    inbox: Inbox,
    outbox: Outbox,
    /// Per-chain call counter feeding reference id derivation.
    nonce: u64,
}

impl CrossChainDispatcher {
    pub fn new(config: DispatcherConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ledger: ReferenceLedger::new(config.chain_id),
            references: ReferenceTracker::new(),
            sagas: HashMap::new(),
            rejected_atomic: HashSet::new(),
            callables: CallableRouter::new(),
            inbox: Inbox::new(),
            outbox: Outbox::new(config.chain_id),
            nonce: 0,
            config,
        })
    }

    #[must_use]
    pub fn chain_id(&self) -> ChainId {
        self.config.chain_id
    }

    #[must_use]
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn register_callable(&mut self, target: CallTarget, executor: Box<dyn CallableExecutor>) {
        self.callables.register(target, executor);
    }

    // =================================================================
    // Outbound transfers
    // =================================================================

    /// Validate and initiate a transfer of `resource_id` from `sender` to
    /// every leg. Returns the reference id shared by all legs.
    ///
    /// Completes locally: the sender is debited and the reference is SENT
    /// before this returns; delivery happens whenever the relay gets to it.
    ///
    /// # Errors
    /// Validation and balance errors, all raised before any state changes.
    pub fn initiate_transfer(
        &mut self,
        registry: &impl RegistryView,
        resource_id: ResourceId,
        sender: HolderId,
        legs: Vec<TransferLeg>,
        mode: TransferMode,
    ) -> Result<ReferenceId> {
        self.validate_legs(registry, &legs, mode)?;
        let standard = self.outbound_standard(registry, resource_id)?;
        if mode == TransferMode::Atomic && standard.is_confidential() {
            return Err(XledgerError::UnsupportedTransfer {
                reason: "atomic teleport is only available for plain assets".into(),
            });
        }
        let values = legs
            .iter()
            .map(|leg| value_for(standard, &leg.amount))
            .collect::<Result<Vec<_>>>()?;

        let chain = self.config.chain_id;
        match self.ledger.get(resource_id) {
            Some(asset) => asset.handle.ensure_can_debit(&sender, &values)?,
            // Nothing of an asset this chain never saw can be held here.
            None => {
                return Err(XledgerError::InsufficientBalance {
                    needed: values.iter().map(TransferValue::quantity).sum(),
                    available: 0,
                });
            }
        }

        let committed = legs
            .iter()
            .zip(&values)
            .filter_map(|(leg, value)| match value {
                TransferValue::Confidential { amount, blinding } => Some(
                    committed_value(*amount).map(|v| CommittedLeg {
                        dest_chain: leg.dest_chain,
                        commitment: Commitment::commit(v, blinding),
                    }),
                ),
                _ => None,
            })
            .collect::<Result<Vec<_>>>()?;

        // Validation done; from here on nothing fails short of a bug.
        let reference_id = ReferenceId::derive(chain, resource_id, sender, self.nonce);
        self.references.set_sent(reference_id, chain)?;
        self.nonce += 1;
        let asset = self.ledger.get_mut(resource_id)?;
        for value in &values {
            asset.handle.debit(sender, value)?;
        }

        let leg_count = legs.len();
        for (leg, value) in legs.into_iter().zip(values) {
            debug!(
                reference = %reference_id,
                dest = %leg.dest_chain,
                holder = %leg.holder,
                callables = leg.callables.len(),
                "Queued transfer leg"
            );
            if mode == TransferMode::Atomic {
                self.sagas.insert(
                    reference_id,
                    TeleportSaga::new(reference_id, resource_id, sender, leg.dest_chain, value.clone()),
                );
            }
            self.outbox.push(
                leg.dest_chain,
                RelayPayload::Transfer(TransferMessage {
                    reference_id,
                    resource_id,
                    origin_chain: chain,
                    dest_chain: leg.dest_chain,
                    sender,
                    holder: leg.holder,
                    value,
                    callables: leg.callables,
                    mode,
                }),
            );
        }

        if !committed.is_empty() {
            let origin_delta = -committed.iter().map(|l| l.commitment).sum::<Commitment>();
            self.outbox.push(
                self.config.coordination_chain_id,
                RelayPayload::Coordination(CoordinationMessage::ConfidentialTransfer {
                    reference_id,
                    resource_id,
                    origin_chain: chain,
                    origin_delta,
                    legs: committed,
                    proof: Vec::new(),
                }),
            );
        }

        info!(
            reference = %reference_id,
            resource = %resource_id,
            %chain,
            sender = %sender,
            legs = leg_count,
            ?mode,
            "Cross-chain transfer initiated"
        );
        Ok(reference_id)
    }

    /// Parallel-array form: one entry per destination leg.
    ///
    /// # Errors
    /// [`XledgerError::MalformedLegs`] if the arrays differ in length, plus
    /// everything [`initiate_transfer`](Self::initiate_transfer) rejects.
    #[allow(clippy::too_many_arguments)]
    pub fn cross_transfer(
        &mut self,
        registry: &impl RegistryView,
        resource_id: ResourceId,
        sender: HolderId,
        holders: &[HolderId],
        amounts: &[LegAmount],
        chain_ids: &[ChainId],
        callables: &[Vec<Callable>],
    ) -> Result<ReferenceId> {
        let n = holders.len();
        if amounts.len() != n || chain_ids.len() != n || callables.len() != n {
            return Err(XledgerError::MalformedLegs {
                reason: format!(
                    "array lengths differ: holders={n}, amounts={}, chains={}, callables={}",
                    amounts.len(),
                    chain_ids.len(),
                    callables.len()
                ),
            });
        }
        let legs = holders
            .iter()
            .zip(amounts)
            .zip(chain_ids)
            .zip(callables)
            .map(|(((holder, amount), chain), calls)| {
                TransferLeg::new(*holder, amount.clone(), *chain).with_callables(calls.clone())
            })
            .collect();
        self.initiate_transfer(registry, resource_id, sender, legs, TransferMode::Standard)
    }

    /// Single-leg form with at most one callable.
    ///
    /// A nil `callee_resource`, a zero `callee_address`, and an empty
    /// `payload` together mean "no callable". Naming both targets is
    /// malformed.
    #[allow(clippy::too_many_arguments)]
    pub fn linear_cross_transfer(
        &mut self,
        registry: &impl RegistryView,
        resource_id: ResourceId,
        sender: HolderId,
        holder: HolderId,
        amount: LegAmount,
        chain_id: ChainId,
        callee_resource: ResourceId,
        callee_address: ContractAddress,
        payload: Vec<u8>,
    ) -> Result<ReferenceId> {
        let target = match (callee_resource.is_nil(), callee_address.is_zero()) {
            (false, false) => {
                return Err(XledgerError::MalformedLegs {
                    reason: "callable names both a resource and a contract".into(),
                });
            }
            (false, true) => Some(CallTarget::Resource(callee_resource)),
            (true, false) => Some(CallTarget::Contract(callee_address)),
            (true, true) if payload.is_empty() => None,
            (true, true) => {
                return Err(XledgerError::MalformedLegs {
                    reason: "callable payload without a target".into(),
                });
            }
        };
        let callables = target
            .map(|t| vec![Callable::new(t, payload)])
            .unwrap_or_default();
        let leg = TransferLeg::new(holder, amount, chain_id).with_callables(callables);
        self.initiate_transfer(registry, resource_id, sender, vec![leg], TransferMode::Standard)
    }

    /// Single-leg transfer that is re-credited here if the destination
    /// refuses it.
    pub fn teleport_atomic(
        &mut self,
        registry: &impl RegistryView,
        resource_id: ResourceId,
        sender: HolderId,
        holder: HolderId,
        amount: LegAmount,
        chain_id: ChainId,
    ) -> Result<ReferenceId> {
        let leg = TransferLeg::new(holder, amount, chain_id);
        self.initiate_transfer(registry, resource_id, sender, vec![leg], TransferMode::Atomic)
    }

    fn validate_legs(&self, registry: &impl RegistryView, legs: &[TransferLeg], mode: TransferMode) -> Result<()> {
        if legs.is_empty() {
            return Err(XledgerError::MalformedLegs {
                reason: "transfer has no legs".into(),
            });
        }
        if legs.len() > self.config.max_legs_per_transfer {
            return Err(XledgerError::TooManyLegs {
                count: legs.len(),
                max: self.config.max_legs_per_transfer,
            });
        }
        if mode == TransferMode::Atomic && legs.len() != 1 {
            return Err(XledgerError::MalformedLegs {
                reason: "atomic teleport takes exactly one leg".into(),
            });
        }
        let mut destinations = BTreeSet::new();
        for (index, leg) in legs.iter().enumerate() {
            if leg.callables.len() > self.config.max_callables_per_leg {
                return Err(XledgerError::TooManyCallables {
                    leg: index,
                    count: leg.callables.len(),
                    max: self.config.max_callables_per_leg,
                });
            }
            if leg.dest_chain == self.config.chain_id {
                return Err(XledgerError::SelfTransfer(leg.dest_chain));
            }
            // RECEIVED is keyed by (reference, chain); two legs to one chain
            // would collapse into one.
            if !destinations.insert(leg.dest_chain) {
                return Err(XledgerError::MalformedLegs {
                    reason: format!("more than one leg addresses {}", leg.dest_chain),
                });
            }
            match registry.participant_status(leg.dest_chain) {
                Ok(ParticipantStatus::Active) => {}
                Ok(_) => return Err(XledgerError::DestinationFrozen(leg.dest_chain)),
                Err(_) => return Err(XledgerError::UnknownDestination(leg.dest_chain)),
            }
        }
        Ok(())
    }

    /// The standard of an asset leaving this chain. Assets this chain has
    /// never seen are looked up in the registry and must be ACTIVE.
    fn outbound_standard(&self, registry: &impl RegistryView, resource_id: ResourceId) -> Result<AssetStandard> {
        if let Some(asset) = self.ledger.get(resource_id) {
            return Ok(asset.handle.standard());
        }
        let resolved = registry.resolve(resource_id)?;
        let status = registry.asset_status(resource_id)?;
        if status != AssetStatus::Active {
            return Err(XledgerError::ResourceNotActive {
                resource: resource_id,
                status,
            });
        }
        Ok(resolved.standard)
    }

    // =================================================================
    // Inbound
    // =================================================================

    /// Queue an envelope the relay delivered.
    pub fn deliver(&mut self, envelope: Envelope) {
        self.inbox.push(envelope);
    }

    /// Apply everything in the inbox, in delivery order.
    pub fn drain_inbox(&mut self, registry: &impl RegistryView) -> Vec<Result<InboundOutcome>> {
        let mut outcomes = Vec::with_capacity(self.inbox.len());
        while let Some(envelope) = self.inbox.pop() {
            outcomes.push(self.handle(registry, &envelope));
        }
        outcomes
    }

    /// Apply one envelope addressed to this chain.
    pub fn handle(&mut self, registry: &impl RegistryView, envelope: &Envelope) -> Result<InboundOutcome> {
        if envelope.destination != self.config.chain_id {
            return Err(XledgerError::WrongDestination {
                expected: envelope.destination,
                actual: self.config.chain_id,
            });
        }
        match &envelope.payload {
            RelayPayload::Transfer(msg) => self.apply_inbound(registry, msg),
            RelayPayload::AtomicReport(report) => self.apply_report(report),
            RelayPayload::Coordination(_) => Err(XledgerError::UnsupportedTransfer {
                reason: "settlement messages belong to the coordination chain".into(),
            }),
        }
    }

    /// Credit one inbound leg.
    ///
    /// Redelivery of a leg already RECEIVED here is a no-op. A refused
    /// credit leaves the reference UNSET and, for atomic legs, reports the
    /// failure back to the origin.
    pub fn apply_inbound(&mut self, registry: &impl RegistryView, msg: &TransferMessage) -> Result<InboundOutcome> {
        let chain = self.config.chain_id;
        if msg.dest_chain != chain {
            return Err(XledgerError::WrongDestination {
                expected: msg.dest_chain,
                actual: chain,
            });
        }
        if self.references.is_received(&msg.reference_id, chain) {
            warn!(reference = %msg.reference_id, %chain, "Duplicate delivery ignored");
            return Ok(InboundOutcome::Duplicate);
        }
        if self.rejected_atomic.contains(&msg.reference_id) {
            warn!(reference = %msg.reference_id, %chain, "Redelivered atomic leg refused again");
            return Ok(self.reject(msg, "atomic leg already refused".into()));
        }

        if let Err(e) = self.credit(registry, msg) {
            return Ok(self.reject(msg, e.to_string()));
        }

        let ctx = CallContext {
            chain,
            origin_chain: msg.origin_chain,
            reference_id: msg.reference_id,
            resource_id: msg.resource_id,
            holder: msg.holder,
            value: &msg.value,
        };
        let failed_callables = self.callables.run(&ctx, &msg.callables).len();
        self.references.set_received(msg.reference_id, chain)?;

        if matches!(msg.value, TransferValue::Confidential { .. }) {
            self.outbox.push(
                self.config.coordination_chain_id,
                RelayPayload::Coordination(CoordinationMessage::ConfidentialReceipt {
                    reference_id: msg.reference_id,
                    resource_id: msg.resource_id,
                    dest_chain: chain,
                }),
            );
        }
        if msg.mode == TransferMode::Atomic {
            self.report(msg, DeliveryOutcome::Delivered);
        }
        info!(
            reference = %msg.reference_id,
            resource = %msg.resource_id,
            %chain,
            origin = %msg.origin_chain,
            holder = %msg.holder,
            failed_callables,
            "Inbound leg credited"
        );
        Ok(InboundOutcome::Credited { failed_callables })
    }

    /// Check the asset and credit the holder. Nothing changes on error
    /// beyond creating the local handle.
    fn credit(&mut self, registry: &impl RegistryView, msg: &TransferMessage) -> Result<()> {
        match registry.asset_status(msg.resource_id)? {
            AssetStatus::Active => {}
            AssetStatus::Inactive => return Err(XledgerError::AssetFrozen(msg.resource_id)),
            status @ AssetStatus::New => {
                return Err(XledgerError::ResourceNotActive {
                    resource: msg.resource_id,
                    status,
                });
            }
        }
        let asset = self.ledger.get_or_create(registry, msg.resource_id)?;
        asset.handle.credit(msg.holder, &msg.value)
    }

    fn reject(&mut self, msg: &TransferMessage, reason: String) -> InboundOutcome {
        warn!(
            reference = %msg.reference_id,
            chain = %self.config.chain_id,
            origin = %msg.origin_chain,
            %reason,
            "Inbound credit rejected"
        );
        if msg.mode == TransferMode::Atomic {
            self.rejected_atomic.insert(msg.reference_id);
            self.report(
                msg,
                DeliveryOutcome::Failed {
                    reason: reason.clone(),
                },
            );
        }
        InboundOutcome::Rejected { reason }
    }

    fn report(&mut self, msg: &TransferMessage, outcome: DeliveryOutcome) {
        self.outbox.push(
            msg.origin_chain,
            RelayPayload::AtomicReport(AtomicReport {
                reference_id: msg.reference_id,
                resource_id: msg.resource_id,
                origin_chain: msg.origin_chain,
                dest_chain: self.config.chain_id,
                outcome,
            }),
        );
    }

    /// Settle a teleport from its destination's report.
    ///
    /// A failure re-credits the sender exactly once, however often the
    /// report is redelivered.
    pub fn apply_report(&mut self, report: &AtomicReport) -> Result<InboundOutcome> {
        let chain = self.config.chain_id;
        if report.origin_chain != chain {
            return Err(XledgerError::WrongDestination {
                expected: report.origin_chain,
                actual: chain,
            });
        }
        let saga = self
            .sagas
            .get_mut(&report.reference_id)
            .ok_or(XledgerError::SagaNotFound(report.reference_id))?;

        match &report.outcome {
            DeliveryOutcome::Delivered => {
                if saga.confirm()? {
                    info!(reference = %report.reference_id, dest = %report.dest_chain, "Teleport confirmed");
                    Ok(InboundOutcome::Confirmed)
                } else {
                    Ok(InboundOutcome::Duplicate)
                }
            }
            DeliveryOutcome::Failed { reason } => {
                if !saga.needs_compensation()? {
                    return Ok(InboundOutcome::Duplicate);
                }
                let asset = self.ledger.get_mut(saga.resource_id)?;
                asset.handle.credit(saga.sender, &saga.value)?;
                saga.mark_compensated();
                info!(
                    reference = %report.reference_id,
                    dest = %report.dest_chain,
                    sender = %saga.sender,
                    %reason,
                    "Teleport compensated: sender re-credited"
                );
                Ok(InboundOutcome::Compensated)
            }
        }
    }

    /// Envelopes queued for the relay since the last call.
    pub fn take_outbound(&mut self) -> Vec<Envelope> {
        self.outbox.take()
    }

    // =================================================================
    // Local ledger operations
    // =================================================================

    /// Issue new units to `holder`. Only the asset's issuer chain may mint.
    pub fn mint(
        &mut self,
        registry: &impl RegistryView,
        resource_id: ResourceId,
        holder: HolderId,
        amount: LegAmount,
    ) -> Result<()> {
        let chain = self.config.chain_id;
        let resolved = registry.resolve(resource_id)?;
        if resolved.issuer_chain != chain {
            return Err(XledgerError::NotIssuer {
                resource: resource_id,
                chain,
            });
        }
        let status = registry.asset_status(resource_id)?;
        if status != AssetStatus::Active {
            return Err(XledgerError::ResourceNotActive {
                resource: resource_id,
                status,
            });
        }
        let value = value_for(resolved.standard, &amount)?;
        self.ledger
            .get_or_create(registry, resource_id)?
            .handle
            .credit(holder, &value)?;
        if let TransferValue::Confidential { amount, blinding } = value {
            self.emit_supply(resource_id, holder, amount, blinding, true);
        }
        info!(resource = %resource_id, %chain, holder = %holder, "Minted");
        Ok(())
    }

    /// Destroy units held by `holder`.
    pub fn burn(&mut self, resource_id: ResourceId, holder: HolderId, amount: LegAmount) -> Result<()> {
        let asset = self.ledger.get_mut(resource_id)?;
        let value = value_for(asset.handle.standard(), &amount)?;
        asset.handle.debit(holder, &value)?;
        if let TransferValue::Confidential { amount, blinding } = value {
            self.emit_supply(resource_id, holder, amount, blinding, false);
        }
        info!(resource = %resource_id, chain = %self.config.chain_id, holder = %holder, "Burned");
        Ok(())
    }

    /// Move units between two holders on this chain.
    pub fn transfer(&mut self, resource_id: ResourceId, from: HolderId, to: HolderId, amount: LegAmount) -> Result<()> {
        let asset = self.ledger.get_mut(resource_id)?;
        let value = match value_for(asset.handle.standard(), &amount)? {
            // Stays on this chain; the commitment at the coordination chain
            // doesn't move.
            TransferValue::Confidential { amount, .. } => TransferValue::Confidential {
                amount,
                blinding: Blinding::zero(),
            },
            other => other,
        };
        asset.handle.transfer(from, to, &value)
    }

    fn emit_supply(&mut self, resource_id: ResourceId, holder: HolderId, value: u128, blinding: Blinding, mint: bool) {
        let chain = self.config.chain_id;
        let reference_id = ReferenceId::derive(chain, resource_id, holder, self.nonce);
        self.nonce += 1;
        let msg = if mint {
            CoordinationMessage::Mint {
                reference_id,
                resource_id,
                chain,
                value,
                blinding,
            }
        } else {
            CoordinationMessage::Burn {
                reference_id,
                resource_id,
                chain,
                value,
                blinding,
            }
        };
        self.outbox
            .push(self.config.coordination_chain_id, RelayPayload::Coordination(msg));
    }

    // =================================================================
    // Queries
    // =================================================================

    /// `referenceIdStatus` as seen from this chain.
    #[must_use]
    pub fn reference_id_status(&self, reference_id: &ReferenceId) -> ReferenceStatus {
        self.references.status(reference_id, self.config.chain_id)
    }

    #[must_use]
    pub fn balance_of(&self, resource_id: ResourceId, holder: &HolderId) -> u128 {
        self.ledger
            .get(resource_id)
            .map_or(0, |a| a.handle.balance_of(holder))
    }

    #[must_use]
    pub fn multi_balance_of(&self, resource_id: ResourceId, holder: &HolderId, token_id: TokenId) -> u128 {
        self.ledger
            .get(resource_id)
            .map_or(0, |a| a.handle.multi_balance_of(holder, token_id))
    }

    #[must_use]
    pub fn owner_of(&self, resource_id: ResourceId, token_id: TokenId) -> Option<HolderId> {
        self.ledger
            .get(resource_id)
            .and_then(|a| a.handle.owner_of(token_id))
    }

    /// Private opening of this chain's commitment for a confidential asset.
    #[must_use]
    pub fn opening(&self, resource_id: ResourceId) -> Option<Opening> {
        self.ledger
            .get(resource_id)
            .and_then(|a| a.handle.opening().copied())
    }

    #[must_use]
    pub fn saga(&self, reference_id: &ReferenceId) -> Option<&TeleportSaga> {
        self.sagas.get(reference_id)
    }

    #[must_use]
    pub fn ledger(&self) -> &ReferenceLedger {
        &self.ledger
    }
}

/// Turn a requested leg amount into the wire value for `standard`.
/// Confidential values get a fresh random blinding and must fit a
/// commitment value.
fn value_for(standard: AssetStandard, amount: &LegAmount) -> Result<TransferValue> {
    let value = match (standard, amount) {
        (AssetStandard::PlainFungible, LegAmount::Amount(a)) => TransferValue::Fungible { amount: *a },
        (AssetStandard::Confidential, LegAmount::Amount(a)) => {
            committed_value(*a)?;
            TransferValue::Confidential {
                amount: *a,
                blinding: Blinding::random(&mut OsRng),
            }
        }
        (AssetStandard::PlainNonFungible, LegAmount::Tokens(ids)) => TransferValue::NonFungible {
            token_ids: ids.clone(),
        },
        (AssetStandard::PlainMulti, LegAmount::Multi { token_id, amount }) => TransferValue::Multi {
            token_id: *token_id,
            amount: *amount,
        },
        (actual, _) => {
            return Err(XledgerError::StandardMismatch {
                expected: format!("{amount:?}"),
                actual,
            });
        }
    };
    if value.quantity() == 0 {
        return Err(XledgerError::InvalidAmount {
            reason: "leg moves nothing".into(),
        });
    }
    Ok(value)
}
