//! Transfer Reference Tracker.
//!
//! Records the per-chain delivery status of every reference id:
//!
//! ```text
//!   origin:       UNSET ──set_sent──▶ SENT          (exactly once)
//!   destination:  UNSET ──set_received──▶ RECEIVED  (idempotent)
//! ```
//!
//! Unlike a settlement idempotency cache, records are never evicted; they
//! double as the audit trail.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use xledger_types::{ChainId, ReferenceId, ReferenceStatus, Result, XledgerError};

/// Everything known about one reference id.
#[derive(Debug, Clone)]
pub struct ReferenceRecord {
    /// The chain that marked it SENT, once known.
    pub origin: Option<ChainId>,
    pub per_chain: BTreeMap<ChainId, ReferenceStatus>,
    pub first_seen: DateTime<Utc>,
}

impl ReferenceRecord {
    fn new() -> Self {
        Self {
            origin: None,
            per_chain: BTreeMap::new(),
            first_seen: Utc::now(),
        }
    }

    #[must_use]
    pub fn status(&self, chain: ChainId) -> ReferenceStatus {
        self.per_chain
            .get(&chain)
            .copied()
            .unwrap_or(ReferenceStatus::Unset)
    }

    /// Chains that have marked the reference RECEIVED.
    pub fn received_chains(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.per_chain
            .iter()
            .filter(|(_, s)| **s == ReferenceStatus::Received)
            .map(|(c, _)| *c)
    }
}

/// Permanent `(reference_id, chain) → status` records.
#[derive(Debug, Default)]
pub struct ReferenceTracker {
    records: HashMap<ReferenceId, ReferenceRecord>,
}

impl ReferenceTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` SENT on its origin chain.
    ///
    /// # Errors
    /// [`XledgerError::ReferenceAlreadySent`] if any chain already sent it,
    /// [`XledgerError::InvalidReferenceTransition`] if `origin` already
    /// received it.
    pub fn set_sent(&mut self, id: ReferenceId, origin: ChainId) -> Result<()> {
        if let Some(record) = self.records.get(&id) {
            if record.origin.is_some() {
                return Err(XledgerError::ReferenceAlreadySent(id));
            }
            let current = record.status(origin);
            if current != ReferenceStatus::Unset {
                return Err(XledgerError::InvalidReferenceTransition {
                    reference: id,
                    chain: origin,
                    from: current,
                    to: ReferenceStatus::Sent,
                });
            }
        }
        let record = self.records.entry(id).or_insert_with(ReferenceRecord::new);
        record.origin = Some(origin);
        record.per_chain.insert(origin, ReferenceStatus::Sent);
        Ok(())
    }

    /// Mark `id` RECEIVED on `chain`.
    ///
    /// Returns `Ok(false)` if it already was, so redelivery is a no-op.
    ///
    /// # Errors
    /// [`XledgerError::InvalidReferenceTransition`] if `chain` is the
    /// reference's origin.
    pub fn set_received(&mut self, id: ReferenceId, chain: ChainId) -> Result<bool> {
        let record = self.records.entry(id).or_insert_with(ReferenceRecord::new);
        match record.status(chain) {
            ReferenceStatus::Received => Ok(false),
            ReferenceStatus::Sent => Err(XledgerError::InvalidReferenceTransition {
                reference: id,
                chain,
                from: ReferenceStatus::Sent,
                to: ReferenceStatus::Received,
            }),
            ReferenceStatus::Unset => {
                record.per_chain.insert(chain, ReferenceStatus::Received);
                Ok(true)
            }
        }
    }

    #[must_use]
    pub fn status(&self, id: &ReferenceId, chain: ChainId) -> ReferenceStatus {
        self.records
            .get(id)
            .map_or(ReferenceStatus::Unset, |r| r.status(chain))
    }

    #[must_use]
    pub fn is_received(&self, id: &ReferenceId, chain: ChainId) -> bool {
        self.status(id, chain) == ReferenceStatus::Received
    }

    #[must_use]
    pub fn record(&self, id: &ReferenceId) -> Option<&ReferenceRecord> {
        self.records.get(id)
    }

    /// Number of reference ids tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
