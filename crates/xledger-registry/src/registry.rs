//! The Resource Registry and participant registry.
//!
//! Lives on the coordination chain. Anyone may register a candidate asset;
//! every status change afterwards is a [`SignedCommand`] from the registry
//! authority. A rejected command leaves the registry untouched and does not
//! burn its nonce.

use std::collections::BTreeMap;

use chrono::Utc;
use ed25519_dalek::VerifyingKey;
use tracing::{info, warn};
use xledger_types::{
    AssetMetadata, AssetRecord, AssetStatus, ChainId, Participant, ParticipantRole,
    ParticipantStatus, ResolvedResource, ResourceId, Result, XledgerError,
};

use crate::authority::{CommandVerifier, RegistryAction, SignedCommand};

/// Read access the dispatchers need from the registry.
pub trait RegistryView {
    /// Issuer metadata for `id`, used to seed a lazily created asset handle.
    fn resolve(&self, id: ResourceId) -> Result<ResolvedResource>;

    fn asset_status(&self, id: ResourceId) -> Result<AssetStatus>;

    fn participant_status(&self, chain: ChainId) -> Result<ParticipantStatus>;

    /// Is `chain` a registered, ACTIVE participant?
    fn is_active_participant(&self, chain: ChainId) -> bool {
        matches!(self.participant_status(chain), Ok(ParticipantStatus::Active))
    }
}

/// Asset and participant records, keyed by id.
pub struct ResourceRegistry {
    /// UUIDv7 keys, so iteration follows registration order.
    assets: BTreeMap<ResourceId, AssetRecord>,
    participants: BTreeMap<ChainId, Participant>,
    verifier: CommandVerifier,
}

impl ResourceRegistry {
    #[must_use]
    pub fn new(authority: VerifyingKey) -> Self {
        Self {
            assets: BTreeMap::new(),
            participants: BTreeMap::new(),
            verifier: CommandVerifier::new(authority),
        }
    }

    // =================================================================
    // Assets
    // =================================================================

    /// Register a candidate asset. It starts out NEW and cannot move until
    /// the authority approves it.
    pub fn register_candidate(&mut self, metadata: AssetMetadata) -> Result<ResourceId> {
        if metadata.symbol.is_empty() {
            return Err(XledgerError::Configuration("asset symbol must not be empty".into()));
        }
        let resource_id = ResourceId::new();
        let now = Utc::now();
        info!(
            resource = %resource_id,
            symbol = %metadata.symbol,
            issuer = %metadata.issuer_chain,
            standard = %metadata.standard,
            "Registered candidate asset"
        );
        self.assets.insert(
            resource_id,
            AssetRecord {
                resource_id,
                metadata,
                status: AssetStatus::New,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(resource_id)
    }

    #[must_use]
    pub fn asset(&self, id: ResourceId) -> Option<&AssetRecord> {
        self.assets.get(&id)
    }

    /// All assets, in registration order.
    pub fn assets(&self) -> impl Iterator<Item = &AssetRecord> {
        self.assets.values()
    }

    pub fn assets_with_status(&self, status: AssetStatus) -> impl Iterator<Item = &AssetRecord> {
        self.assets.values().filter(move |a| a.status == status)
    }

    // =================================================================
    // Participants
    // =================================================================

    #[must_use]
    pub fn participant(&self, chain: ChainId) -> Option<&Participant> {
        self.participants.get(&chain)
    }

    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    // =================================================================
    // Authority commands
    // =================================================================

    /// Verify and apply one authority command.
    pub fn execute(&mut self, cmd: &SignedCommand) -> Result<()> {
        if let Err(e) = self.verifier.check(cmd) {
            warn!(nonce = cmd.nonce, error = %e, "Rejected authority command");
            return Err(e);
        }
        match &cmd.action {
            RegistryAction::ApproveAsset(id) => self.set_asset_status(*id, AssetStatus::Active, true)?,
            RegistryAction::FreezeAsset(id) => self.set_asset_status(*id, AssetStatus::Inactive, false)?,
            RegistryAction::UnfreezeAsset(id) => self.set_asset_status(*id, AssetStatus::Active, false)?,
            RegistryAction::RegisterParticipant {
                chain_id,
                name,
                role,
            } => self.register_participant(*chain_id, name, *role)?,
            RegistryAction::ActivateParticipant(chain) => {
                self.set_participant_status(*chain, ParticipantStatus::Active, &[ParticipantStatus::New])?;
            }
            RegistryAction::FreezeParticipant(chain) => {
                self.set_participant_status(*chain, ParticipantStatus::Frozen, &[ParticipantStatus::Active])?;
            }
            RegistryAction::UnfreezeParticipant(chain) => {
                self.set_participant_status(*chain, ParticipantStatus::Active, &[ParticipantStatus::Frozen])?;
            }
            RegistryAction::DeactivateParticipant(chain) => {
                self.set_participant_status(*chain, ParticipantStatus::Inactive, &[ParticipantStatus::Active])?;
            }
        }
        self.verifier.consume(cmd);
        Ok(())
    }

    /// `approval` restricts the move to NEW → ACTIVE; otherwise only the
    /// reversible ACTIVE ⇄ INACTIVE toggle is allowed.
    fn set_asset_status(&mut self, id: ResourceId, target: AssetStatus, approval: bool) -> Result<()> {
        let record = self
            .assets
            .get_mut(&id)
            .ok_or(XledgerError::ResourceNotFound(id))?;
        let from = record.status;
        let allowed = from.can_transition_to(target) && (from == AssetStatus::New) == approval;
        if !allowed {
            return Err(XledgerError::InvalidStatusTransition {
                from: from.to_string(),
                to: target.to_string(),
            });
        }
        record.status = target;
        record.updated_at = Utc::now();
        info!(resource = %id, %from, to = %target, "Asset status changed");
        Ok(())
    }

    fn register_participant(&mut self, chain_id: ChainId, name: &str, role: ParticipantRole) -> Result<()> {
        if self.participants.contains_key(&chain_id) {
            return Err(XledgerError::ParticipantAlreadyRegistered(chain_id));
        }
        let now = Utc::now();
        self.participants.insert(
            chain_id,
            Participant {
                chain_id,
                name: name.to_string(),
                role,
                status: ParticipantStatus::New,
                created_at: now,
                updated_at: now,
            },
        );
        info!(chain = %chain_id, name, ?role, "Registered participant");
        Ok(())
    }

    fn set_participant_status(
        &mut self,
        chain: ChainId,
        target: ParticipantStatus,
        from_any_of: &[ParticipantStatus],
    ) -> Result<()> {
        let participant = self
            .participants
            .get_mut(&chain)
            .ok_or(XledgerError::ParticipantNotFound(chain))?;
        let from = participant.status;
        if !from_any_of.contains(&from) || !from.can_transition_to(target) {
            return Err(XledgerError::InvalidStatusTransition {
                from: from.to_string(),
                to: target.to_string(),
            });
        }
        participant.status = target;
        participant.updated_at = Utc::now();
        info!(%chain, %from, to = %target, "Participant status changed");
        Ok(())
    }
}

impl RegistryView for ResourceRegistry {
    fn resolve(&self, id: ResourceId) -> Result<ResolvedResource> {
        self.assets
            .get(&id)
            .map(AssetRecord::resolved)
            .ok_or(XledgerError::ResourceNotFound(id))
    }

    fn asset_status(&self, id: ResourceId) -> Result<AssetStatus> {
        self.assets
            .get(&id)
            .map(|a| a.status)
            .ok_or(XledgerError::ResourceNotFound(id))
    }

    fn participant_status(&self, chain: ChainId) -> Result<ParticipantStatus> {
        self.participants
            .get(&chain)
            .map(|p| p.status)
            .ok_or(XledgerError::ParticipantNotFound(chain))
    }
}
