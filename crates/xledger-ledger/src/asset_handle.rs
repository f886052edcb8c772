//! Local asset handles: one tagged variant per asset standard.
//!
//! A handle owns a chain's view of one asset. Credits and debits take the
//! [`TransferValue`] that travels on the wire, so the same value that left
//! the origin is the one applied at the destination.

use std::collections::{BTreeMap, HashMap};

use xledger_types::{AssetStandard, HolderId, Opening, Result, TokenId, TransferValue, XledgerError};

// ---------------------------------------------------------------------------
// Per-standard state
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct FungibleBalances {
    balances: HashMap<HolderId, u128>,
}

#[derive(Debug, Default, Clone)]
pub struct NonFungibleOwners {
    /// Ordered so listings are deterministic.
    owners: BTreeMap<TokenId, HolderId>,
}

#[derive(Debug, Default, Clone)]
pub struct MultiBalances {
    balances: HashMap<(HolderId, TokenId), u128>,
}

/// Confidential balances as the chain itself sees them.
///
/// Holder amounts stay on this chain; only commitments leave it. `opening`
/// is the running `(value, blinding)` behind the chain's aggregate
/// commitment at the coordination chain.
#[derive(Debug, Default, Clone)]
pub struct ConfidentialBalances {
    balances: HashMap<HolderId, u128>,
    opening: Opening,
}

/// A chain's local state for one asset.
#[derive(Debug, Clone)]
pub enum AssetHandle {
    Fungible(FungibleBalances),
    NonFungible(NonFungibleOwners),
    Multi(MultiBalances),
    Confidential(ConfidentialBalances),
}

fn mismatch(expected: &str, actual: AssetStandard) -> XledgerError {
    XledgerError::StandardMismatch {
        expected: expected.to_string(),
        actual,
    }
}

fn add(balance: u128, amount: u128) -> Result<u128> {
    balance.checked_add(amount).ok_or(XledgerError::BalanceOverflow)
}

impl AssetHandle {
    /// An empty handle of the given standard.
    #[must_use]
    pub fn new(standard: AssetStandard) -> Self {
        match standard {
            AssetStandard::PlainFungible => Self::Fungible(FungibleBalances::default()),
            AssetStandard::PlainNonFungible => Self::NonFungible(NonFungibleOwners::default()),
            AssetStandard::PlainMulti => Self::Multi(MultiBalances::default()),
            AssetStandard::Confidential => Self::Confidential(ConfidentialBalances::default()),
        }
    }

    #[must_use]
    pub fn standard(&self) -> AssetStandard {
        match self {
            Self::Fungible(_) => AssetStandard::PlainFungible,
            Self::NonFungible(_) => AssetStandard::PlainNonFungible,
            Self::Multi(_) => AssetStandard::PlainMulti,
            Self::Confidential(_) => AssetStandard::Confidential,
        }
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Fungible or confidential balance, or the number of tokens owned.
    #[must_use]
    pub fn balance_of(&self, holder: &HolderId) -> u128 {
        match self {
            Self::Fungible(f) => f.balances.get(holder).copied().unwrap_or(0),
            Self::Confidential(c) => c.balances.get(holder).copied().unwrap_or(0),
            Self::NonFungible(n) => n.owners.values().filter(|o| *o == holder).count() as u128,
            Self::Multi(m) => m
                .balances
                .iter()
                .filter(|((h, _), _)| h == holder)
                .map(|(_, amount)| *amount)
                .sum(),
        }
    }

    /// Balance of one token id in a multi-token asset.
    #[must_use]
    pub fn multi_balance_of(&self, holder: &HolderId, token_id: TokenId) -> u128 {
        match self {
            Self::Multi(m) => m.balances.get(&(*holder, token_id)).copied().unwrap_or(0),
            _ => 0,
        }
    }

    #[must_use]
    pub fn owner_of(&self, token_id: TokenId) -> Option<HolderId> {
        match self {
            Self::NonFungible(n) => n.owners.get(&token_id).copied(),
            _ => None,
        }
    }

    /// Tokens `holder` owns, in id order.
    #[must_use]
    pub fn tokens_of(&self, holder: &HolderId) -> Vec<TokenId> {
        match self {
            Self::NonFungible(n) => n
                .owners
                .iter()
                .filter(|(_, o)| *o == holder)
                .map(|(t, _)| *t)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Everything held on this chain.
    #[must_use]
    pub fn local_supply(&self) -> u128 {
        match self {
            Self::Fungible(f) => f.balances.values().sum(),
            Self::Confidential(c) => c.balances.values().sum(),
            Self::NonFungible(n) => n.owners.len() as u128,
            Self::Multi(m) => m.balances.values().sum(),
        }
    }

    /// The opening behind this chain's commitment. Confidential only.
    #[must_use]
    pub fn opening(&self) -> Option<&Opening> {
        match self {
            Self::Confidential(c) => Some(&c.opening),
            _ => None,
        }
    }

    // =================================================================
    // Mutations
    // =================================================================

    /// Check that `holder` can cover every value in `values` at once.
    ///
    /// Debiting the same values afterwards cannot fail.
    pub fn ensure_can_debit(&self, holder: &HolderId, values: &[TransferValue]) -> Result<()> {
        match self {
            Self::Fungible(_) | Self::Confidential(_) => {
                let mut needed = 0u128;
                for value in values {
                    let amount = match (self, value) {
                        (Self::Fungible(_), TransferValue::Fungible { amount })
                        | (Self::Confidential(_), TransferValue::Confidential { amount, .. }) => *amount,
                        _ => return Err(mismatch("matching amount value", self.standard())),
                    };
                    needed = add(needed, amount)?;
                }
                let available = self.balance_of(holder);
                if available < needed {
                    return Err(XledgerError::InsufficientBalance { needed, available });
                }
                Ok(())
            }
            Self::NonFungible(n) => {
                let mut seen = Vec::new();
                for value in values {
                    let TransferValue::NonFungible { token_ids } = value else {
                        return Err(mismatch("token ids", self.standard()));
                    };
                    for token in token_ids {
                        if seen.contains(token) || n.owners.get(token) != Some(holder) {
                            return Err(XledgerError::TokenNotOwned(*token));
                        }
                        seen.push(*token);
                    }
                }
                Ok(())
            }
            Self::Multi(m) => {
                let mut needed: BTreeMap<TokenId, u128> = BTreeMap::new();
                for value in values {
                    let TransferValue::Multi { token_id, amount } = value else {
                        return Err(mismatch("token id and amount", self.standard()));
                    };
                    let entry = needed.entry(*token_id).or_default();
                    *entry = add(*entry, *amount)?;
                }
                for (token_id, needed) in needed {
                    let available = m.balances.get(&(*holder, token_id)).copied().unwrap_or(0);
                    if available < needed {
                        return Err(XledgerError::InsufficientBalance { needed, available });
                    }
                }
                Ok(())
            }
        }
    }

    /// Credit `holder` with `value`.
    pub fn credit(&mut self, holder: HolderId, value: &TransferValue) -> Result<()> {
        let standard = self.standard();
        match (self, value) {
            (Self::Fungible(f), TransferValue::Fungible { amount }) => {
                let entry = f.balances.entry(holder).or_default();
                *entry = add(*entry, *amount)?;
            }
            (Self::Confidential(c), TransferValue::Confidential { amount, blinding }) => {
                let balance = add(c.balances.get(&holder).copied().unwrap_or(0), *amount)?;
                let mut opening = c.opening;
                opening.credit(*amount, *blinding)?;
                c.balances.insert(holder, balance);
                c.opening = opening;
            }
            (Self::NonFungible(n), TransferValue::NonFungible { token_ids }) => {
                if let Some(existing) = token_ids.iter().find(|t| n.owners.contains_key(*t)) {
                    return Err(XledgerError::TokenAlreadyExists(*existing));
                }
                for token in token_ids {
                    n.owners.insert(*token, holder);
                }
            }
            (Self::Multi(m), TransferValue::Multi { token_id, amount }) => {
                let entry = m.balances.entry((holder, *token_id)).or_default();
                *entry = add(*entry, *amount)?;
            }
            _ => return Err(mismatch("value of the asset's own standard", standard)),
        }
        Ok(())
    }

    /// Debit `holder` by `value`.
    pub fn debit(&mut self, holder: HolderId, value: &TransferValue) -> Result<()> {
        self.ensure_can_debit(&holder, std::slice::from_ref(value))?;
        let standard = self.standard();
        match (self, value) {
            (Self::Fungible(f), TransferValue::Fungible { amount }) => {
                let entry = f.balances.entry(holder).or_default();
                *entry -= *amount;
            }
            (Self::Confidential(c), TransferValue::Confidential { amount, blinding }) => {
                let mut opening = c.opening;
                opening.debit(*amount, *blinding)?;
                let entry = c.balances.entry(holder).or_default();
                *entry -= *amount;
                c.opening = opening;
            }
            (Self::NonFungible(n), TransferValue::NonFungible { token_ids }) => {
                for token in token_ids {
                    n.owners.remove(token);
                }
            }
            (Self::Multi(m), TransferValue::Multi { token_id, amount }) => {
                let entry = m.balances.entry((holder, *token_id)).or_default();
                *entry -= *amount;
            }
            _ => return Err(mismatch("value of the asset's own standard", standard)),
        }
        Ok(())
    }

    /// Move `value` between two holders on this chain.
    ///
    /// Confidential transfers stay inside the chain, so the opening is
    /// unchanged: the debit and credit cancel under any blinding.
    pub fn transfer(&mut self, from: HolderId, to: HolderId, value: &TransferValue) -> Result<()> {
        self.debit(from, value)?;
        self.credit(to, value)
    }
}
