//! Pedersen commitments over Ristretto.
//!
//! `Commit(v, r) = v·G + r·H` where `G` is the Ristretto basepoint and `H`
//! is hashed to the group from a fixed domain separator, so nobody knows
//! `log_G(H)`. The scheme is additively homomorphic:
//!
//! ```text
//! Commit(v1, r1) ⊕ Commit(v2, r2) == Commit(v1 + v2, r1 + r2)
//! ```
//!
//! which lets the settlement engine fold confidential deltas without ever
//! seeing the values behind them.

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::sync::LazyLock;

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::Identity;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::Sha512;

use crate::{Result, XledgerError, constants};

static PEDERSEN_H: LazyLock<RistrettoPoint> =
    LazyLock::new(|| RistrettoPoint::hash_from_bytes::<Sha512>(constants::PEDERSEN_H_DOMAIN));

/// A confidential amount as a commitment value. Amounts above `i128::MAX`
/// cannot be committed.
pub fn committed_value(amount: u128) -> Result<i128> {
    i128::try_from(amount).map_err(|_| XledgerError::InvalidAmount {
        reason: format!("{amount} does not fit a signed commitment value"),
    })
}

/// Map a signed value into the scalar field.
fn scalar_from_signed(value: i128) -> Scalar {
    let magnitude = Scalar::from(value.unsigned_abs());
    if value < 0 { -magnitude } else { magnitude }
}

// ---------------------------------------------------------------------------
// Blinding
// ---------------------------------------------------------------------------

/// The blinding factor `r` of a commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blinding(pub Scalar);

impl Blinding {
    /// The zero blinding. Commitments with it hide nothing.
    #[must_use]
    pub fn zero() -> Self {
        Self(Scalar::ZERO)
    }

    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        Self(Scalar::from(value))
    }

    /// Sample a uniformly random blinding.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self(Scalar::random(rng))
    }
}

impl Add for Blinding {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Blinding {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Blinding {
    type Output = Self;
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl AddAssign for Blinding {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::iter::Sum for Blinding {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

// ---------------------------------------------------------------------------
// Commitment
// ---------------------------------------------------------------------------

/// A Pedersen commitment to a signed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment(pub RistrettoPoint);

impl Commitment {
    /// The identity commitment, `Commit(0, 0)`.
    #[must_use]
    pub fn identity() -> Self {
        Self(RistrettoPoint::identity())
    }

    /// Commit to `value` under `blinding`. Negative values encode debits.
    #[must_use]
    pub fn commit(value: i128, blinding: &Blinding) -> Self {
        Self(scalar_from_signed(value) * RISTRETTO_BASEPOINT_POINT + blinding.0 * *PEDERSEN_H)
    }

    /// Whether `(value, blinding)` opens this commitment.
    #[must_use]
    pub fn opens_to(&self, value: i128, blinding: &Blinding) -> bool {
        *self == Self::commit(value, blinding)
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Compressed 32-byte encoding.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.compress().to_bytes()
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.to_bytes()[..4])
    }
}

impl Default for Commitment {
    fn default() -> Self {
        Self::identity()
    }
}

impl Add for Commitment {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Commitment {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Commitment {
    type Output = Self;
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl AddAssign for Commitment {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Commitment {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl std::iter::Sum for Commitment {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::identity(), Add::add)
    }
}

// ---------------------------------------------------------------------------
// Opening
// ---------------------------------------------------------------------------

/// The private opening `(value, blinding)` of a commitment.
///
/// A ledger chain keeps the opening of its own per-asset commitment; the
/// coordination chain never sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opening {
    pub value: i128,
    pub blinding: Blinding,
}

impl Opening {
    #[must_use]
    pub fn new(value: i128, blinding: Blinding) -> Self {
        Self { value, blinding }
    }

    #[must_use]
    pub fn zero() -> Self {
        Self::new(0, Blinding::zero())
    }

    #[must_use]
    pub fn commitment(&self) -> Commitment {
        Commitment::commit(self.value, &self.blinding)
    }

    /// Fold a credit of `value` under `blinding`. Unchanged on error.
    pub fn credit(&mut self, value: u128, blinding: Blinding) -> Result<()> {
        self.value = self
            .value
            .checked_add(committed_value(value)?)
            .ok_or(XledgerError::BalanceOverflow)?;
        self.blinding += blinding;
        Ok(())
    }

    /// Fold a debit of `value` under `blinding`. Unchanged on error.
    pub fn debit(&mut self, value: u128, blinding: Blinding) -> Result<()> {
        self.value = self
            .value
            .checked_sub(committed_value(value)?)
            .ok_or(XledgerError::BalanceOverflow)?;
        self.blinding += -blinding;
        Ok(())
    }
}

impl Default for Opening {
    fn default() -> Self {
        Self::zero()
    }
}
