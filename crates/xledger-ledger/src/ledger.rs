//! The per-chain Reference Ledger.
//!
//! An arena of asset handles keyed by resource id. A chain that receives an
//! asset it has never seen creates the handle on the spot, seeded from the
//! issuer metadata the registry resolves.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::info;
use xledger_registry::RegistryView;
use xledger_types::{ChainId, ResolvedResource, ResourceId, Result, XledgerError};

use crate::asset_handle::AssetHandle;

/// A handle plus the metadata it was created from.
#[derive(Debug, Clone)]
pub struct LocalAsset {
    pub resource: ResolvedResource,
    pub handle: AssetHandle,
    pub created_at: DateTime<Utc>,
}

/// One chain's balances for every asset it knows.
#[derive(Debug)]
pub struct ReferenceLedger {
    chain_id: ChainId,
    assets: HashMap<ResourceId, LocalAsset>,
}

impl ReferenceLedger {
    #[must_use]
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            assets: HashMap::new(),
        }
    }

    #[must_use]
    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// The handle for `id`, created from the registry's metadata on first
    /// use.
    ///
    /// # Errors
    /// Whatever `registry.resolve` returns for unknown ids. Nothing is
    /// created in that case.
    pub fn get_or_create(
        &mut self,
        registry: &impl RegistryView,
        id: ResourceId,
    ) -> Result<&mut LocalAsset> {
        if !self.assets.contains_key(&id) {
            let resource = registry.resolve(id)?;
            info!(
                chain = %self.chain_id,
                resource = %id,
                standard = %resource.standard,
                issuer = %resource.issuer_chain,
                "Instantiated local asset handle"
            );
            self.assets.insert(
                id,
                LocalAsset {
                    handle: AssetHandle::new(resource.standard),
                    resource,
                    created_at: Utc::now(),
                },
            );
        }
        self.assets
            .get_mut(&id)
            .ok_or(XledgerError::UnknownLocalAsset(id))
    }

    #[must_use]
    pub fn get(&self, id: ResourceId) -> Option<&LocalAsset> {
        self.assets.get(&id)
    }

    /// The existing handle for `id`, without touching the registry.
    pub fn get_mut(&mut self, id: ResourceId) -> Result<&mut LocalAsset> {
        self.assets
            .get_mut(&id)
            .ok_or(XledgerError::UnknownLocalAsset(id))
    }

    #[must_use]
    pub fn contains(&self, id: ResourceId) -> bool {
        self.assets.contains_key(&id)
    }

    pub fn resource_ids(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.assets.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xledger_registry::{Authority, RegistryAction, ResourceRegistry};
    use xledger_types::{AssetMetadata, AssetStandard, HolderId, TransferValue};

    fn registry_with(standard: AssetStandard) -> (ResourceRegistry, ResourceId) {
        let mut auth = Authority::dummy();
        let mut reg = ResourceRegistry::new(auth.verifying_key());
        let id = reg
            .register_candidate(AssetMetadata::dummy("TKN", ChainId(1), standard))
            .unwrap();
        reg.execute(&auth.sign(RegistryAction::ApproveAsset(id)).unwrap())
            .unwrap();
        (reg, id)
    }

    #[test]
    fn lazily_creates_handle_of_issuer_standard() {
        let (reg, id) = registry_with(AssetStandard::PlainNonFungible);
        let mut ledger = ReferenceLedger::new(ChainId(2));
        assert!(!ledger.contains(id));

        let asset = ledger.get_or_create(&reg, id).unwrap();
        assert_eq!(asset.handle.standard(), AssetStandard::PlainNonFungible);
        assert_eq!(asset.resource.issuer_chain, ChainId(1));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn second_lookup_reuses_handle() {
        let (reg, id) = registry_with(AssetStandard::PlainFungible);
        let mut ledger = ReferenceLedger::new(ChainId(2));
        ledger
            .get_or_create(&reg, id)
            .unwrap()
            .handle
            .credit(HolderId([1; 20]), &TransferValue::Fungible { amount: 5 })
            .unwrap();
        let again = ledger.get_or_create(&reg, id).unwrap();
        assert_eq!(again.handle.balance_of(&HolderId([1; 20])), 5);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn unknown_resource_creates_nothing() {
        let (reg, _) = registry_with(AssetStandard::PlainFungible);
        let mut ledger = ReferenceLedger::new(ChainId(2));
        let err = ledger.get_or_create(&reg, ResourceId::new()).unwrap_err();
        assert!(matches!(err, XledgerError::ResourceNotFound(_)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn get_mut_requires_existing_handle() {
        let mut ledger = ReferenceLedger::new(ChainId(2));
        assert!(matches!(
            ledger.get_mut(ResourceId::new()),
            Err(XledgerError::UnknownLocalAsset(_))
        ));
    }
}
