//! Ed25519 signer and verifier over `shared-crypto`.

use crate::ports::{SignatureVerifier, Signer};
use shared_crypto::Ed25519KeyPair;
use shared_types::{Hash, PublicKey, Signature};

pub struct Ed25519Signer {
    keypair: Ed25519KeyPair,
}

impl Ed25519Signer {
    pub fn new(keypair: Ed25519KeyPair) -> Self {
        Self { keypair }
    }

    pub fn generate() -> Self {
        Self::new(Ed25519KeyPair::generate())
    }
}

impl Signer for Ed25519Signer {
    fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    fn sign(&self, message: &Hash) -> Signature {
        self.keypair.sign(message)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, public_key: &PublicKey, message: &Hash, signature: &Signature) -> bool {
        shared_crypto::verify(public_key, message, signature).is_ok()
    }
}
