//! Signed authority commands.
//!
//! Every status change in the registry is a [`RegistryAction`] signed by
//! the registry authority's ed25519 key. The signed bytes are
//!
//! ```text
//! "xledger:registry:command:v1:" || nonce(8, LE) || json(action)
//! ```
//!
//! and each nonce is accepted once. Key custody is external; [`Authority`]
//! only wraps a key someone else already manages.

use std::collections::HashSet;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use xledger_types::{
    ChainId, ParticipantRole, ResourceId, Result, XledgerError, constants,
};

/// A status change only the registry authority may perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryAction {
    ApproveAsset(ResourceId),
    FreezeAsset(ResourceId),
    UnfreezeAsset(ResourceId),
    RegisterParticipant {
        chain_id: ChainId,
        name: String,
        role: ParticipantRole,
    },
    ActivateParticipant(ChainId),
    FreezeParticipant(ChainId),
    UnfreezeParticipant(ChainId),
    DeactivateParticipant(ChainId),
}

/// A [`RegistryAction`] with its nonce and authority signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedCommand {
    pub action: RegistryAction,
    pub nonce: u64,
    /// Ed25519 signature over [`SignedCommand::signing_payload`].
    pub signature: Vec<u8>,
}

impl SignedCommand {
    /// Canonical bytes the authority signs.
    pub fn signing_payload(action: &RegistryAction, nonce: u64) -> Result<Vec<u8>> {
        let body =
            serde_json::to_vec(action).map_err(|e| XledgerError::Serialization(e.to_string()))?;
        let mut payload = Vec::with_capacity(constants::AUTHORITY_COMMAND_DOMAIN.len() + 8 + body.len());
        payload.extend_from_slice(constants::AUTHORITY_COMMAND_DOMAIN);
        payload.extend_from_slice(&nonce.to_le_bytes());
        payload.extend_from_slice(&body);
        Ok(payload)
    }
}

/// Signs registry commands with the authority key.
pub struct Authority {
    signing_key: SigningKey,
    next_nonce: u64,
}

impl Authority {
    #[must_use]
    pub fn new(signing_key: SigningKey) -> Self {
        Self {
            signing_key,
            next_nonce: 0,
        }
    }

    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Sign `action` under the next unused nonce.
    pub fn sign(&mut self, action: RegistryAction) -> Result<SignedCommand> {
        let nonce = self.next_nonce;
        let payload = SignedCommand::signing_payload(&action, nonce)?;
        let signature = self.signing_key.sign(&payload);
        self.next_nonce += 1;
        Ok(SignedCommand {
            action,
            nonce,
            signature: signature.to_bytes().to_vec(),
        })
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl Authority {
    /// An authority with a fixed, well-known key. Tests only.
    pub fn dummy() -> Self {
        Self::new(SigningKey::from_bytes(&[7u8; 32]))
    }
}

/// Verifies commands against the authority's public key and rejects
/// replayed nonces.
pub struct CommandVerifier {
    authority: VerifyingKey,
    used_nonces: HashSet<u64>,
}

impl CommandVerifier {
    #[must_use]
    pub fn new(authority: VerifyingKey) -> Self {
        Self {
            authority,
            used_nonces: HashSet::new(),
        }
    }

    /// Check the signature and nonce without consuming the nonce.
    pub fn check(&self, cmd: &SignedCommand) -> Result<()> {
        if self.used_nonces.contains(&cmd.nonce) {
            return Err(XledgerError::AuthorityNonceReused(cmd.nonce));
        }
        let signature = Signature::from_slice(&cmd.signature)
            .map_err(|_| XledgerError::InvalidAuthoritySignature)?;
        let payload = SignedCommand::signing_payload(&cmd.action, cmd.nonce)?;
        self.authority
            .verify(&payload, &signature)
            .map_err(|_| XledgerError::InvalidAuthoritySignature)
    }

    /// Mark a checked command's nonce as used.
    pub fn consume(&mut self, cmd: &SignedCommand) {
        self.used_nonces.insert(cmd.nonce);
    }

    #[must_use]
    pub fn used_nonce_count(&self) -> usize {
        self.used_nonces.len()
    }
}
