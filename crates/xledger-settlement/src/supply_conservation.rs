//! Supply conservation over commitments.
//!
//! Mint and burn values are public, and so are the blindings the minter
//! supplied. That is enough to compute the commitment the whole network's
//! finalized balances must add up to:
//!
//! ```text
//! ∀ asset: Σ_chains finalized == Commit(Σ minted - Σ burned, Σ r_mint - Σ r_burn)
//! ```
//!
//! The check compares points only; no chain's balance is ever opened.

use std::collections::{BTreeSet, HashMap};

use xledger_types::{Blinding, Commitment, ResourceId, Result, XledgerError};

#[derive(Debug, Clone, Copy)]
struct SupplyTotals {
    value: u128,
    blinding: Blinding,
}

impl Default for SupplyTotals {
    fn default() -> Self {
        Self {
            value: 0,
            blinding: Blinding::zero(),
        }
    }
}

/// Per-asset mint and burn totals.
#[derive(Debug, Default)]
pub struct SupplyConservation {
    minted: HashMap<ResourceId, SupplyTotals>,
    burned: HashMap<ResourceId, SupplyTotals>,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_mint(&mut self, resource: ResourceId, value: u128, blinding: Blinding) -> Result<()> {
        Self::record(self.minted.entry(resource).or_default(), value, blinding)
    }

    pub fn record_burn(&mut self, resource: ResourceId, value: u128, blinding: Blinding) -> Result<()> {
        Self::record(self.burned.entry(resource).or_default(), value, blinding)
    }

    fn record(totals: &mut SupplyTotals, value: u128, blinding: Blinding) -> Result<()> {
        totals.value = totals
            .value
            .checked_add(value)
            .ok_or(XledgerError::BalanceOverflow)?;
        totals.blinding += blinding;
        Ok(())
    }

    #[must_use]
    pub fn total_minted(&self, resource: ResourceId) -> u128 {
        self.minted.get(&resource).map_or(0, |t| t.value)
    }

    #[must_use]
    pub fn total_burned(&self, resource: ResourceId) -> u128 {
        self.burned.get(&resource).map_or(0, |t| t.value)
    }

    /// `Commit(minted - burned, r_minted - r_burned)`.
    pub fn expected_commitment(&self, resource: ResourceId) -> Result<Commitment> {
        let minted = self.minted.get(&resource).copied().unwrap_or_default();
        let burned = self.burned.get(&resource).copied().unwrap_or_default();
        let net = i128::try_from(minted.value)
            .ok()
            .zip(i128::try_from(burned.value).ok())
            .map(|(m, b)| m - b)
            .ok_or(XledgerError::BalanceOverflow)?;
        Ok(Commitment::commit(net, &(minted.blinding - burned.blinding)))
    }

    /// Check `actual` (the sum of every chain's finalized commitment)
    /// against the recorded supply.
    ///
    /// # Errors
    /// [`XledgerError::SupplyInvariantViolation`] on mismatch.
    pub fn verify(&self, resource: ResourceId, actual: &Commitment) -> Result<()> {
        let expected = self.expected_commitment(resource)?;
        if *actual != expected {
            return Err(XledgerError::SupplyInvariantViolation {
                reason: format!(
                    "Asset {resource}: finalized sum {} != expected {} (minted={}, burned={})",
                    actual.short(),
                    expected.short(),
                    self.total_minted(resource),
                    self.total_burned(resource),
                ),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn tracked_resources(&self) -> BTreeSet<ResourceId> {
        self.minted.keys().chain(self.burned.keys()).copied().collect()
    }
}
