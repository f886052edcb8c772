//! Atomic teleport saga.
//!
//! ```text
//!            debit + SENT
//!                 │
//!                 ▼
//!            ┌─────────┐  Delivered  ┌───────────┐
//!            │ DEBITED ├────────────▶│ CONFIRMED │
//!            └────┬────┘             └───────────┘
//!                 │ Failed
//!                 ▼
//!          ┌─────────────┐
//!          │ COMPENSATED │  (re-credit at origin)
//!          └─────────────┘
//! ```
//!
//! Both terminal states are idempotent under repeated reports. The origin
//! balance is short between debit and compensation; there is no
//! synchronous rollback.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use xledger_types::{ChainId, HolderId, ReferenceId, ResourceId, Result, TransferValue, XledgerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeleportState {
    /// Origin debited, waiting for the destination's report.
    Debited,
    /// Destination credited. Terminal.
    Confirmed,
    /// Destination rejected; origin re-credited. Terminal.
    Compensated,
}

impl TeleportState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Compensated)
    }
}

impl fmt::Display for TeleportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debited => write!(f, "DEBITED"),
            Self::Confirmed => write!(f, "CONFIRMED"),
            Self::Compensated => write!(f, "COMPENSATED"),
        }
    }
}

/// One in-progress or settled teleport, kept at the origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeleportSaga {
    pub reference_id: ReferenceId,
    pub resource_id: ResourceId,
    pub sender: HolderId,
    pub dest_chain: ChainId,
    /// What was debited, and what compensation re-credits.
    pub value: TransferValue,
    pub state: TeleportState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeleportSaga {
    #[must_use]
    pub fn new(
        reference_id: ReferenceId,
        resource_id: ResourceId,
        sender: HolderId,
        dest_chain: ChainId,
        value: TransferValue,
    ) -> Self {
        let now = Utc::now();
        Self {
            reference_id,
            resource_id,
            sender,
            dest_chain,
            value,
            state: TeleportState::Debited,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a successful delivery. Returns `false` if already confirmed.
    pub fn confirm(&mut self) -> Result<bool> {
        match self.state {
            TeleportState::Debited => {
                self.transition(TeleportState::Confirmed);
                Ok(true)
            }
            TeleportState::Confirmed => Ok(false),
            TeleportState::Compensated => Err(self.terminal()),
        }
    }

    /// Whether a failure report still needs the re-credit applied.
    ///
    /// # Errors
    /// [`XledgerError::SagaAlreadyTerminal`] if the teleport was confirmed.
    pub fn needs_compensation(&self) -> Result<bool> {
        match self.state {
            TeleportState::Debited => Ok(true),
            TeleportState::Compensated => Ok(false),
            TeleportState::Confirmed => Err(self.terminal()),
        }
    }

    /// Mark the re-credit as applied. Call only after
    /// [`needs_compensation`](Self::needs_compensation) returned `true` and
    /// the credit succeeded.
    pub fn mark_compensated(&mut self) {
        if self.state == TeleportState::Debited {
            self.transition(TeleportState::Compensated);
        }
    }

    fn transition(&mut self, to: TeleportState) {
        self.state = to;
        self.updated_at = Utc::now();
    }

    fn terminal(&self) -> XledgerError {
        XledgerError::SagaAlreadyTerminal {
            reference: self.reference_id,
            state: self.state.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saga() -> TeleportSaga {
        let resource_id = ResourceId::new();
        let sender = HolderId([1; 20]);
        TeleportSaga::new(
            ReferenceId::derive(ChainId(1), resource_id, sender, 0),
            resource_id,
            sender,
            ChainId(2),
            TransferValue::Fungible { amount: 10 },
        )
    }

    #[test]
    fn starts_debited() {
        let s = saga();
        assert_eq!(s.state, TeleportState::Debited);
        assert!(!s.state.is_terminal());
    }

    #[test]
    fn confirm_is_idempotent() {
        let mut s = saga();
        assert!(s.confirm().unwrap());
        assert!(!s.confirm().unwrap());
        assert_eq!(s.state, TeleportState::Confirmed);
        assert!(s.state.is_terminal());
    }

    #[test]
    fn compensation_is_idempotent() {
        let mut s = saga();
        assert!(s.needs_compensation().unwrap());
        s.mark_compensated();
        assert!(!s.needs_compensation().unwrap());
        s.mark_compensated();
        assert_eq!(s.state, TeleportState::Compensated);
    }

    #[test]
    fn confirmed_cannot_compensate() {
        let mut s = saga();
        s.confirm().unwrap();
        assert!(matches!(
            s.needs_compensation(),
            Err(XledgerError::SagaAlreadyTerminal { .. })
        ));
        s.mark_compensated();
        assert_eq!(s.state, TeleportState::Confirmed);
    }

    #[test]
    fn compensated_cannot_confirm() {
        let mut s = saga();
        s.mark_compensated();
        assert!(s.confirm().is_err());
    }
}
