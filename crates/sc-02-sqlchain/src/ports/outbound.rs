//! Outbound ports: capabilities the chain consumes.

use crate::domain::{ProjectConfig, ProjectConfigType};
use shared_types::{DatabaseId, Hash, PublicKey, Signature};

/// Signs on behalf of this node. Key storage lives behind the implementation.
pub trait Signer: Send + Sync {
    fn public_key(&self) -> PublicKey;

    fn sign(&self, message: &Hash) -> Signature;
}

/// Checks signatures made by any participant.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, public_key: &PublicKey, message: &Hash, signature: &Signature) -> bool;
}

/// Read-only view of project configuration.
pub trait PolicyStore: Send + Sync {
    fn get(
        &self,
        database_id: &DatabaseId,
        kind: ProjectConfigType,
        key: &str,
    ) -> Option<ProjectConfig>;
}
