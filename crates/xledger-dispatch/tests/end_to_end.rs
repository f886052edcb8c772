//! End-to-end tests across dispatchers, the relay, and the coordination
//! chain.
//!
//! A small in-process network: one registry, one settlement engine, and a
//! dispatcher per ledger chain. The relay is simulated by [`Network`], which
//! moves envelopes from outboxes to inboxes through their wire encoding and
//! can hold back, duplicate, or reorder them.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;
use xledger_dispatch::{
    CallContext, CallableExecutor, CrossChainDispatcher, InboundOutcome, TeleportState,
};
use xledger_registry::{Authority, RegistryAction, ResourceRegistry};
use xledger_settlement::{ConfidentialSettlementEngine, SettlementOutcome};
use xledger_types::*;

const A: ChainId = ChainId(1);
const B: ChainId = ChainId(2);
const C: ChainId = ChainId(3);

const ALICE: HolderId = HolderId([0xa1; 20]);
const BOB: HolderId = HolderId([0xb0; 20]);
const CAROL: HolderId = HolderId([0xca; 20]);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// =================================================================
// Harness
// =================================================================

/// Registry, engine, dispatchers, and the envelopes in transit between them.
struct Network {
    authority: Authority,
    registry: ResourceRegistry,
    engine: ConfidentialSettlementEngine,
    chains: BTreeMap<ChainId, CrossChainDispatcher>,
    coordination: ChainId,
    in_transit: Vec<Envelope>,
    inbound: Vec<(ChainId, InboundOutcome)>,
    settled: Vec<SettlementOutcome>,
    errors: Vec<XledgerError>,
}

impl Network {
    fn new() -> Self {
        init_tracing();
        let config = NetworkConfig {
            participants: vec![A, B, C],
            ..NetworkConfig::default()
        };
        let mut authority = Authority::dummy();
        let mut registry = ResourceRegistry::new(authority.verifying_key());
        let mut chains = BTreeMap::new();
        for &chain in &config.participants {
            for action in [
                RegistryAction::RegisterParticipant {
                    chain_id: chain,
                    name: format!("ledger-{}", chain.0),
                    role: ParticipantRole::Participant,
                },
                RegistryAction::ActivateParticipant(chain),
            ] {
                registry
                    .execute(&authority.sign(action).expect("sign"))
                    .expect("participant setup");
            }
            let dispatcher =
                CrossChainDispatcher::new(config.dispatcher(chain).expect("dispatcher config"))
                    .expect("dispatcher");
            chains.insert(chain, dispatcher);
        }
        Self {
            authority,
            registry,
            engine: ConfidentialSettlementEngine::new(config.settlement()).expect("engine"),
            chains,
            coordination: config.coordination_chain_id,
            in_transit: Vec::new(),
            inbound: Vec::new(),
            settled: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn command(&mut self, action: RegistryAction) {
        let cmd = self.authority.sign(action).expect("sign");
        self.registry.execute(&cmd).expect("registry command");
    }

    /// Register and approve an asset issued on `issuer`.
    fn issue(&mut self, symbol: &str, issuer: ChainId, standard: AssetStandard) -> ResourceId {
        let id = self
            .registry
            .register_candidate(AssetMetadata::dummy(symbol, issuer, standard))
            .expect("candidate");
        self.command(RegistryAction::ApproveAsset(id));
        id
    }

    fn chain(&mut self, chain: ChainId) -> &mut CrossChainDispatcher {
        self.chains.get_mut(&chain).expect("known chain")
    }

    /// A dispatcher alongside the registry it validates against.
    fn split(&mut self, chain: ChainId) -> (&mut CrossChainDispatcher, &ResourceRegistry) {
        (self.chains.get_mut(&chain).expect("known chain"), &self.registry)
    }

    fn mint(&mut self, chain: ChainId, resource: ResourceId, holder: HolderId, amount: LegAmount) {
        let dispatcher = self.chains.get_mut(&chain).expect("known chain");
        dispatcher
            .mint(&self.registry, resource, holder, amount)
            .expect("mint");
    }

    fn transfer(
        &mut self,
        origin: ChainId,
        resource: ResourceId,
        sender: HolderId,
        legs: Vec<TransferLeg>,
    ) -> ReferenceId {
        let dispatcher = self.chains.get_mut(&origin).expect("known chain");
        dispatcher
            .initiate_transfer(&self.registry, resource, sender, legs, TransferMode::Standard)
            .expect("transfer")
    }

    /// Pick up every outbox.
    fn collect(&mut self) {
        for dispatcher in self.chains.values_mut() {
            self.in_transit.extend(dispatcher.take_outbound());
        }
    }

    /// Pull matching envelopes out of transit.
    fn hold(&mut self, keep: impl Fn(&Envelope) -> bool) -> Vec<Envelope> {
        self.collect();
        let (held, rest) = std::mem::take(&mut self.in_transit)
            .into_iter()
            .partition(|e| keep(e));
        self.in_transit = rest;
        held
    }

    fn release(&mut self, envelopes: Vec<Envelope>) {
        self.in_transit.extend(envelopes);
    }

    fn duplicate_in_transit(&mut self) {
        self.collect();
        let copies = self.in_transit.clone();
        self.in_transit.extend(copies);
    }

    fn reverse_in_transit(&mut self) {
        self.collect();
        self.in_transit.reverse();
    }

    /// Deliver one round. Retriable failures go back into transit. Returns
    /// how many envelopes were consumed.
    fn step(&mut self) -> usize {
        let mut consumed = 0;
        for envelope in std::mem::take(&mut self.in_transit) {
            let bytes = envelope.to_bytes().expect("encode");
            let envelope = Envelope::from_bytes(&bytes).expect("decode");

            if envelope.destination == self.coordination {
                match self.engine.handle(&envelope) {
                    Ok(outcome) => {
                        self.settled.push(outcome);
                        consumed += 1;
                    }
                    Err(e) if e.is_retriable() => self.in_transit.push(envelope),
                    Err(e) => {
                        self.errors.push(e);
                        consumed += 1;
                    }
                }
                continue;
            }

            let chain = envelope.destination;
            let dispatcher = self.chains.get_mut(&chain).expect("known chain");
            dispatcher.deliver(envelope);
            for result in dispatcher.drain_inbox(&self.registry) {
                match result {
                    Ok(outcome) => self.inbound.push((chain, outcome)),
                    Err(e) => self.errors.push(e),
                }
                consumed += 1;
            }
        }
        consumed
    }

    /// Deliver until nothing moves.
    fn settle(&mut self) {
        for _ in 0..64 {
            self.collect();
            if self.in_transit.is_empty() || self.step() == 0 {
                return;
            }
        }
        panic!("relay did not quiesce");
    }

    fn outcomes_on(&self, chain: ChainId) -> Vec<&InboundOutcome> {
        self.inbound
            .iter()
            .filter(|(c, _)| *c == chain)
            .map(|(_, o)| o)
            .collect()
    }

    /// Every chain's opening must open the commitment the coordination chain
    /// finalized for it.
    fn assert_openings_match(&self, resource: ResourceId) {
        for (&chain, dispatcher) in &self.chains {
            let finalized = self.engine.balance_finalised(chain, resource);
            match dispatcher.opening(resource) {
                Some(opening) => assert_eq!(
                    opening.commitment(),
                    finalized,
                    "opening on {chain} does not match its finalized commitment"
                ),
                None => assert!(finalized.is_identity(), "{chain} has no handle but a balance"),
            }
        }
    }
}

fn leg(holder: HolderId, amount: u128, dest: ChainId) -> TransferLeg {
    TransferLeg::new(holder, LegAmount::Amount(amount), dest)
}

struct Recorder(Arc<Mutex<Vec<(ChainId, Vec<u8>)>>>);

impl CallableExecutor for Recorder {
    fn execute(&mut self, ctx: &CallContext<'_>, payload: &[u8]) -> Result<()> {
        self.0
            .lock()
            .expect("lock")
            .push((ctx.origin_chain, payload.to_vec()));
        Ok(())
    }
}

struct Failing;

impl CallableExecutor for Failing {
    fn execute(&mut self, _ctx: &CallContext<'_>, _payload: &[u8]) -> Result<()> {
        Err(XledgerError::Internal("callee reverted".into()))
    }
}

// =================================================================
// Confidential fan-out
// =================================================================

#[test]
fn confidential_fan_out_settles_on_every_chain() {
    let mut net = Network::new();
    let res = net.issue("CNF", A, AssetStandard::Confidential);
    net.mint(A, res, ALICE, LegAmount::Amount(1000));
    net.settle();
    net.engine.finalize();

    let (origin, registry) = net.split(A);
    let reference = origin
        .cross_transfer(
            registry,
            res,
            ALICE,
            &[BOB, CAROL],
            &[LegAmount::Amount(5), LegAmount::Amount(5)],
            &[B, C],
            &[Vec::new(), Vec::new()],
        )
        .expect("cross transfer");
    net.settle();
    let report = net.engine.finalize();

    assert!(net.errors.is_empty(), "{:?}", net.errors);
    assert_eq!(net.chain(A).reference_id_status(&reference), ReferenceStatus::Sent);
    assert_eq!(net.chain(B).reference_id_status(&reference), ReferenceStatus::Received);
    assert_eq!(net.chain(C).reference_id_status(&reference), ReferenceStatus::Received);
    assert_eq!(net.engine.reference_status(&reference, A), ReferenceStatus::Sent);
    assert_eq!(net.engine.reference_status(&reference, B), ReferenceStatus::Received);
    assert_eq!(net.engine.reference_status(&reference, C), ReferenceStatus::Received);

    assert_eq!(net.chain(A).opening(res).expect("opening").value, 990);
    assert_eq!(net.chain(A).balance_of(res, &ALICE), 990);
    assert_eq!(net.chain(B).balance_of(res, &BOB), 5);
    assert_eq!(net.chain(C).balance_of(res, &CAROL), 5);

    assert!(report.touched.contains(&(A, res)));
    assert!(report.touched.contains(&(B, res)));
    assert!(report.touched.contains(&(C, res)));
    assert!(net.engine.pending_balances_tallied(report.window));

    net.assert_openings_match(res);
    net.engine.verify_supply(res).expect("supply conserved");
}

#[test]
fn receipt_overtaking_its_transfer_is_retried() {
    let mut net = Network::new();
    let res = net.issue("CNF", A, AssetStandard::Confidential);
    net.mint(A, res, ALICE, LegAmount::Amount(100));
    net.settle();

    let reference = net.transfer(A, res, ALICE, vec![leg(BOB, 10, B)]);
    let coordination = net.coordination;
    let held = net.hold(|e| e.source == A && e.destination == coordination);
    assert_eq!(held.len(), 1);
    net.settle();

    // B credited, but its receipt waits for the transfer.
    assert_eq!(net.chain(B).reference_id_status(&reference), ReferenceStatus::Received);
    assert_eq!(net.engine.reference_status(&reference, B), ReferenceStatus::Unset);
    assert_eq!(net.in_transit.len(), 1);

    net.release(held);
    net.settle();
    net.engine.finalize();
    assert_eq!(net.engine.reference_status(&reference, B), ReferenceStatus::Received);
    net.assert_openings_match(res);
    net.engine.verify_supply(res).expect("supply conserved");
}

#[test]
fn concurrent_transfers_commute() {
    fn run(reverse: bool) -> Vec<u128> {
        let mut net = Network::new();
        let res = net.issue("CNF", A, AssetStandard::Confidential);
        net.mint(A, res, ALICE, LegAmount::Amount(100));
        net.transfer(A, res, ALICE, vec![leg(BOB, 50, B)]);
        net.settle();
        net.engine.finalize();

        net.transfer(A, res, ALICE, vec![leg(BOB, 10, B), leg(CAROL, 10, C)]);
        net.transfer(B, res, BOB, vec![leg(ALICE, 5, A), leg(CAROL, 5, C)]);
        if reverse {
            net.reverse_in_transit();
        }
        net.settle();
        net.engine.finalize();

        assert!(net.errors.is_empty(), "{:?}", net.errors);
        net.assert_openings_match(res);
        net.engine.verify_supply(res).expect("supply conserved");
        vec![
            net.chain(A).balance_of(res, &ALICE),
            net.chain(B).balance_of(res, &BOB),
            net.chain(C).balance_of(res, &CAROL),
        ]
    }

    let forward = run(false);
    assert_eq!(forward, vec![35, 50, 15]);
    assert_eq!(run(true), forward);
}

#[test]
fn mint_and_burn_keep_supply_conserved() {
    let mut net = Network::new();
    let res = net.issue("CNF", A, AssetStandard::Confidential);
    net.mint(A, res, ALICE, LegAmount::Amount(1000));
    net.transfer(A, res, ALICE, vec![leg(BOB, 300, B)]);
    net.settle();
    net.chain(B)
        .burn(res, BOB, LegAmount::Amount(100))
        .expect("burn");
    net.mint(A, res, CAROL, LegAmount::Amount(50));
    net.settle();
    net.engine.finalize();

    assert_eq!(net.engine.supply().total_minted(res), 1050);
    assert_eq!(net.engine.supply().total_burned(res), 100);
    assert_eq!(net.chain(B).balance_of(res, &BOB), 200);
    net.assert_openings_match(res);
    net.engine.verify_supply(res).expect("supply conserved");
}

#[test]
fn largest_commitment_value_settles_and_conserves_supply() {
    let max = i128::MAX.unsigned_abs();
    let mut net = Network::new();
    let res = net.issue("CNF", A, AssetStandard::Confidential);
    net.mint(A, res, ALICE, LegAmount::Amount(max));
    net.settle();
    net.engine.finalize();

    let (origin, registry) = net.split(A);
    let err = origin
        .initiate_transfer(registry, res, ALICE, vec![leg(BOB, max + 1, B)], TransferMode::Standard)
        .expect_err("past the commitment range");
    assert!(matches!(err, XledgerError::InvalidAmount { .. }));
    assert!(origin.take_outbound().is_empty());

    let reference = net.transfer(A, res, ALICE, vec![leg(BOB, max, B)]);
    net.settle();
    net.engine.finalize();

    assert!(net.errors.is_empty(), "{:?}", net.errors);
    assert_eq!(net.chain(B).reference_id_status(&reference), ReferenceStatus::Received);
    assert_eq!(net.chain(A).balance_of(res, &ALICE), 0);
    assert_eq!(net.chain(B).balance_of(res, &BOB), max);
    assert_eq!(net.engine.supply().total_minted(res), max);
    net.assert_openings_match(res);
    net.engine.verify_supply(res).expect("supply conserved");
}

#[test]
fn unfinalized_window_is_in_flight() {
    let mut net = Network::new();
    let res = net.issue("CNF", A, AssetStandard::Confidential);
    net.mint(A, res, ALICE, LegAmount::Amount(10));
    net.settle();
    assert!(matches!(
        net.engine.verify_supply(res),
        Err(XledgerError::SettlementInFlight { .. })
    ));
    net.engine.finalize();
    net.engine.verify_supply(res).expect("supply conserved");
}

// =================================================================
// Callables
// =================================================================

#[test]
fn six_callables_rejected_before_anything_moves() {
    let mut net = Network::new();
    let res = net.issue("PLN", A, AssetStandard::PlainFungible);
    net.mint(A, res, ALICE, LegAmount::Amount(100));

    let callables: Vec<Callable> = (1..=6u8)
        .map(|n| Callable::new(CallTarget::Contract(ContractAddress([n; 20])), vec![n]))
        .collect();
    let (origin, registry) = net.split(A);
    let err = origin
        .initiate_transfer(
            registry,
            res,
            ALICE,
            vec![leg(BOB, 10, B).with_callables(callables)],
            TransferMode::Standard,
        )
        .expect_err("six callables");

    assert!(matches!(err, XledgerError::TooManyCallables { count: 6, max: 5, .. }));
    assert_eq!(net.chain(A).balance_of(res, &ALICE), 100);
    net.collect();
    assert!(net.in_transit.is_empty());
}

#[test]
fn five_callables_run_in_order_after_credit() {
    let mut net = Network::new();
    let res = net.issue("PLN", A, AssetStandard::PlainFungible);
    net.mint(A, res, ALICE, LegAmount::Amount(100));

    let log = Arc::new(Mutex::new(Vec::new()));
    let callables: Vec<Callable> = (1..=5u8)
        .map(|n| {
            let target = CallTarget::Contract(ContractAddress([n; 20]));
            net.chain(B)
                .register_callable(target, Box::new(Recorder(Arc::clone(&log))));
            Callable::new(target, vec![n])
        })
        .collect();

    net.transfer(A, res, ALICE, vec![leg(BOB, 10, B).with_callables(callables)]);
    net.settle();

    assert_eq!(
        net.outcomes_on(B),
        vec![&InboundOutcome::Credited { failed_callables: 0 }]
    );
    let calls = log.lock().expect("lock");
    assert_eq!(calls.len(), 5);
    assert!(calls.iter().all(|(origin, _)| *origin == A));
    assert_eq!(calls.iter().map(|(_, p)| p[0]).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
}

#[test]
fn callable_failure_keeps_the_credit() {
    let mut net = Network::new();
    let res = net.issue("PLN", A, AssetStandard::PlainFungible);
    net.mint(A, res, ALICE, LegAmount::Amount(100));

    let failing = CallTarget::Contract(ContractAddress([0xee; 20]));
    net.chain(B).register_callable(failing, Box::new(Failing));
    let unregistered = CallTarget::Resource(res);

    let reference = net.transfer(
        A,
        res,
        ALICE,
        vec![leg(BOB, 10, B).with_callables(vec![
            Callable::new(failing, b"go".to_vec()),
            Callable::new(unregistered, Vec::new()),
        ])],
    );
    net.settle();

    assert_eq!(
        net.outcomes_on(B),
        vec![&InboundOutcome::Credited { failed_callables: 2 }]
    );
    assert_eq!(net.chain(B).balance_of(res, &BOB), 10);
    assert_eq!(net.chain(B).reference_id_status(&reference), ReferenceStatus::Received);
}

#[test]
fn single_leg_form_delivers_its_callable() {
    let mut net = Network::new();
    let res = net.issue("PLN", A, AssetStandard::PlainFungible);
    net.mint(A, res, ALICE, LegAmount::Amount(100));

    let log = Arc::new(Mutex::new(Vec::new()));
    let callee = ContractAddress([0x42; 20]);
    net.chain(B)
        .register_callable(CallTarget::Contract(callee), Box::new(Recorder(Arc::clone(&log))));

    let (origin, registry) = net.split(A);
    origin
        .linear_cross_transfer(
            registry,
            res,
            ALICE,
            BOB,
            LegAmount::Amount(7),
            B,
            ResourceId::nil(),
            callee,
            b"deposit".to_vec(),
        )
        .expect("linear transfer");
    net.settle();

    assert_eq!(net.chain(B).balance_of(res, &BOB), 7);
    assert_eq!(*log.lock().expect("lock"), vec![(A, b"deposit".to_vec())]);
}

// =================================================================
// Idempotency and lazy instantiation
// =================================================================

#[test]
fn redelivery_is_idempotent() {
    let mut net = Network::new();
    let res = net.issue("CNF", A, AssetStandard::Confidential);
    net.mint(A, res, ALICE, LegAmount::Amount(100));
    net.settle();

    let reference = net.transfer(A, res, ALICE, vec![leg(BOB, 10, B)]);
    net.duplicate_in_transit();
    net.settle();
    net.engine.finalize();

    assert!(net.errors.is_empty(), "{:?}", net.errors);
    assert_eq!(net.chain(B).balance_of(res, &BOB), 10);
    let outcomes = net.outcomes_on(B);
    assert_eq!(
        outcomes
            .iter()
            .filter(|o| matches!(o, InboundOutcome::Credited { .. }))
            .count(),
        1
    );
    assert!(outcomes.contains(&&InboundOutcome::Duplicate));
    assert!(net.settled.contains(&SettlementOutcome::Duplicate));
    assert_eq!(net.engine.reference_status(&reference, B), ReferenceStatus::Received);
    net.assert_openings_match(res);
    net.engine.verify_supply(res).expect("supply conserved");
}

#[test]
fn first_delivery_instantiates_the_asset() {
    let mut net = Network::new();
    let res = net.issue("PLN", A, AssetStandard::PlainFungible);
    net.mint(A, res, ALICE, LegAmount::Amount(100));
    assert!(!net.chain(C).ledger().contains(res));

    net.transfer(A, res, ALICE, vec![leg(CAROL, 1, C)]);
    net.settle();

    let local = net.chain(C).ledger().get(res).expect("instantiated");
    assert_eq!(local.resource.issuer_chain, A);
    assert_eq!(local.handle.standard(), AssetStandard::PlainFungible);
    assert_eq!(net.chain(C).balance_of(res, &CAROL), 1);
}

#[test]
fn non_fungible_and_multi_token_legs() {
    let mut net = Network::new();
    let nft = net.issue("NFT", A, AssetStandard::PlainNonFungible);
    net.mint(A, nft, ALICE, LegAmount::Tokens(vec![TokenId(1), TokenId(2), TokenId(3)]));
    let multi = net.issue("MLT", A, AssetStandard::PlainMulti);
    net.mint(A, multi, ALICE, LegAmount::Multi { token_id: TokenId(9), amount: 40 });

    net.transfer(
        A,
        nft,
        ALICE,
        vec![
            TransferLeg::new(BOB, LegAmount::Tokens(vec![TokenId(2)]), B),
            TransferLeg::new(CAROL, LegAmount::Tokens(vec![TokenId(3)]), C),
        ],
    );
    net.transfer(
        A,
        multi,
        ALICE,
        vec![TransferLeg::new(BOB, LegAmount::Multi { token_id: TokenId(9), amount: 15 }, B)],
    );
    net.settle();

    assert_eq!(net.chain(A).owner_of(nft, TokenId(1)), Some(ALICE));
    assert_eq!(net.chain(A).owner_of(nft, TokenId(2)), None);
    assert_eq!(net.chain(B).owner_of(nft, TokenId(2)), Some(BOB));
    assert_eq!(net.chain(C).owner_of(nft, TokenId(3)), Some(CAROL));
    assert_eq!(net.chain(A).multi_balance_of(multi, &ALICE, TokenId(9)), 25);
    assert_eq!(net.chain(B).multi_balance_of(multi, &BOB, TokenId(9)), 15);

    // Token 2 came home to a chain that already knows the asset.
    net.transfer(
        B,
        nft,
        BOB,
        vec![TransferLeg::new(ALICE, LegAmount::Tokens(vec![TokenId(2)]), A)],
    );
    net.settle();
    assert_eq!(net.chain(A).owner_of(nft, TokenId(2)), Some(ALICE));
}

// =================================================================
// Rejections
// =================================================================

#[test]
fn frozen_asset_leaves_standard_leg_unset() {
    let mut net = Network::new();
    let res = net.issue("PLN", A, AssetStandard::PlainFungible);
    net.mint(A, res, ALICE, LegAmount::Amount(100));

    let reference = net.transfer(A, res, ALICE, vec![leg(BOB, 30, B)]);
    let transfer = net.hold(|e| e.destination == B);
    net.command(RegistryAction::FreezeAsset(res));
    net.release(transfer.clone());
    net.settle();

    let on_b = net.outcomes_on(B);
    assert!(matches!(on_b.as_slice(), [InboundOutcome::Rejected { .. }]));
    assert_eq!(net.chain(A).reference_id_status(&reference), ReferenceStatus::Sent);
    assert_eq!(net.chain(B).reference_id_status(&reference), ReferenceStatus::Unset);
    // No mint-back on the origin.
    assert_eq!(net.chain(A).balance_of(res, &ALICE), 70);
    assert_eq!(net.chain(B).balance_of(res, &BOB), 0);

    // The relay retries after the asset is thawed.
    net.command(RegistryAction::UnfreezeAsset(res));
    net.release(transfer);
    net.settle();
    assert_eq!(net.chain(B).reference_id_status(&reference), ReferenceStatus::Received);
    assert_eq!(net.chain(B).balance_of(res, &BOB), 30);
}

#[test]
fn rejected_confidential_leg_stays_in_flight() {
    let mut net = Network::new();
    let res = net.issue("CNF", A, AssetStandard::Confidential);
    net.mint(A, res, ALICE, LegAmount::Amount(100));
    net.settle();

    net.transfer(A, res, ALICE, vec![leg(BOB, 10, B)]);
    net.command(RegistryAction::FreezeAsset(res));
    net.settle();
    net.engine.finalize();

    assert!(matches!(
        net.engine.verify_supply(res),
        Err(XledgerError::SettlementInFlight { in_flight_legs: 1, .. })
    ));
}

#[test]
fn unknown_and_frozen_destinations_rejected_synchronously() {
    let mut net = Network::new();
    let res = net.issue("PLN", A, AssetStandard::PlainFungible);
    net.mint(A, res, ALICE, LegAmount::Amount(100));
    net.command(RegistryAction::FreezeParticipant(C));

    let (origin, registry) = net.split(A);
    let unknown = origin
        .initiate_transfer(registry, res, ALICE, vec![leg(BOB, 1, ChainId(77))], TransferMode::Standard)
        .expect_err("unknown destination");
    assert!(matches!(unknown, XledgerError::UnknownDestination(ChainId(77))));

    let frozen = origin
        .initiate_transfer(
            registry,
            res,
            ALICE,
            vec![leg(BOB, 1, B), leg(CAROL, 1, C)],
            TransferMode::Standard,
        )
        .expect_err("frozen destination");
    assert!(matches!(frozen, XledgerError::DestinationFrozen(c) if c == C));
    assert_eq!(net.chain(A).balance_of(res, &ALICE), 100);
}

// =================================================================
// Atomic teleport
// =================================================================

#[test]
fn teleport_confirms_on_delivery() {
    let mut net = Network::new();
    let res = net.issue("PLN", A, AssetStandard::PlainFungible);
    net.mint(A, res, ALICE, LegAmount::Amount(100));

    let (origin, registry) = net.split(A);
    let reference = origin
        .teleport_atomic(registry, res, ALICE, BOB, LegAmount::Amount(40), B)
        .expect("teleport");
    assert_eq!(
        net.chain(A).saga(&reference).expect("saga").state,
        TeleportState::Debited
    );
    net.settle();

    assert_eq!(
        net.chain(A).saga(&reference).expect("saga").state,
        TeleportState::Confirmed
    );
    assert_eq!(net.chain(A).balance_of(res, &ALICE), 60);
    assert_eq!(net.chain(B).balance_of(res, &BOB), 40);
    assert!(net.outcomes_on(A).contains(&&InboundOutcome::Confirmed));
}

#[test]
fn teleport_compensates_exactly_once() {
    let mut net = Network::new();
    let res = net.issue("PLN", A, AssetStandard::PlainFungible);
    net.mint(A, res, ALICE, LegAmount::Amount(100));

    let (origin, registry) = net.split(A);
    let reference = origin
        .teleport_atomic(registry, res, ALICE, BOB, LegAmount::Amount(40), B)
        .expect("teleport");
    assert_eq!(net.chain(A).balance_of(res, &ALICE), 60);

    let transfer = net.hold(|e| e.destination == B);
    net.command(RegistryAction::FreezeAsset(res));
    net.release(transfer.clone());
    net.duplicate_in_transit();
    net.settle();

    assert_eq!(
        net.chain(A).saga(&reference).expect("saga").state,
        TeleportState::Compensated
    );
    assert_eq!(net.chain(A).balance_of(res, &ALICE), 100);
    assert_eq!(net.chain(B).reference_id_status(&reference), ReferenceStatus::Unset);
    let on_a = net.outcomes_on(A);
    assert_eq!(on_a.iter().filter(|o| ***o == InboundOutcome::Compensated).count(), 1);
    assert!(on_a.contains(&&InboundOutcome::Duplicate));

    // Even once thawed, a refused atomic leg is never credited.
    net.command(RegistryAction::UnfreezeAsset(res));
    net.release(transfer);
    net.settle();
    assert_eq!(net.chain(B).balance_of(res, &BOB), 0);
    assert_eq!(net.chain(A).balance_of(res, &ALICE), 100);
    assert!(net.errors.is_empty(), "{:?}", net.errors);
}

#[test]
fn confidential_teleport_refused() {
    let mut net = Network::new();
    let res = net.issue("CNF", A, AssetStandard::Confidential);
    net.mint(A, res, ALICE, LegAmount::Amount(100));

    let (origin, registry) = net.split(A);
    let err = origin
        .teleport_atomic(registry, res, ALICE, BOB, LegAmount::Amount(1), B)
        .expect_err("confidential teleport");
    assert!(matches!(err, XledgerError::UnsupportedTransfer { .. }));
}
