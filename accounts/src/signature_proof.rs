use log::{debug, warn};
use merkle::MerklePath;
use primitives::{Address, PublicKey, Signature};
use readerwriter::{Decodable, Encodable, ExactSizeEncodable, Reader, WriteError, Writer};
use serde::{Deserialize, Serialize};

use super::{AccountError, Transaction};

/// Proof that a transaction was authorized by the owner of an address.
///
/// The address of a single-key owner is the hash of its public key.
/// A multi-key address is the hash of the Merkle root over all signer
/// combinations' aggregate keys; the proof then carries the path from the
/// signing combination's key to that root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureProof {
    public_key: PublicKey,
    merkle_path: MerklePath,
    signature: Option<Signature>,
}

/// Plain projection of a [SignatureProof].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainSignatureProof {
    /// Hex signature, absent before signing.
    pub signature: Option<Signature>,
    /// Hex public key.
    pub public_key: PublicKey,
    /// Address of the public key itself.
    pub signer: Address,
    /// Number of Merkle path nodes.
    pub path_length: usize,
}

impl SignatureProof {
    /// Proof for a single-key owner.
    pub fn single_sig(public_key: PublicKey, signature: Option<Signature>) -> Self {
        SignatureProof {
            public_key,
            merkle_path: MerklePath::empty(),
            signature,
        }
    }

    /// Proof for a multi-key owner: `signer_key` is the aggregate key of the signing
    /// combination and `public_keys` are the aggregate keys of all combinations.
    pub fn multi_sig(
        signer_key: PublicKey,
        public_keys: &[PublicKey],
        signature: Option<Signature>,
    ) -> Result<Self, AccountError> {
        let merkle_path = MerklePath::compute(public_keys, &signer_key)
            .ok_or(AccountError::ProofError("signer key is not a candidate key"))?;
        Ok(SignatureProof {
            public_key: signer_key,
            merkle_path,
            signature,
        })
    }

    /// Decodes the proof carried by a transaction and verifies it against
    /// the transaction's sender and signed content. Malformed and overlong
    /// proofs are rejected.
    pub fn verify_transaction(transaction: &Transaction) -> bool {
        match SignatureProof::decode_exact(transaction.proof()) {
            Ok(proof) => proof.verify(Some(transaction.sender()), &transaction.serialize_content()),
            Err(e) => {
                warn!("Invalid SignatureProof: {}", e);
                false
            }
        }
    }

    /// Verifies the signature over `message` and, if `sender` is given,
    /// that the proof's signer owns that address.
    pub fn verify(&self, sender: Option<&Address>, message: &[u8]) -> bool {
        if let Some(sender) = sender {
            if !self.is_signed_by(sender) {
                warn!("Invalid SignatureProof - signer does not match sender address");
                return false;
            }
        }

        let signature = match &self.signature {
            Some(signature) => signature,
            None => {
                warn!("Invalid SignatureProof - signature is missing");
                return false;
            }
        };

        if !signature.verify(&self.public_key, message) {
            warn!("Invalid SignatureProof - signature is invalid");
            return false;
        }

        true
    }

    /// True if the key and path hash to `address`.
    pub fn is_signed_by(&self, address: &Address) -> bool {
        let root = self.merkle_path.compute_root(&self.public_key);
        let signer = Address::from_hash(&root);
        if signer != *address {
            debug!("signer {} is not {}", signer, address);
        }
        signer == *address
    }

    /// Key of the signer, or the signing combination's aggregate key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Path from the signer key to the address root; empty for single-key owners.
    pub fn merkle_path(&self) -> &MerklePath {
        &self.merkle_path
    }

    /// The signature, if already set.
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// Sets the signature.
    pub fn set_signature(&mut self, signature: Signature) {
        self.signature = Some(signature);
    }

    /// Plain projection.
    pub fn to_plain(&self) -> PlainSignatureProof {
        PlainSignatureProof {
            signature: self.signature,
            public_key: self.public_key,
            signer: self.public_key.to_address(),
            path_length: self.merkle_path.len(),
        }
    }
}

impl Encodable for SignatureProof {
    fn encode(&self, w: &mut impl Writer) -> Result<(), WriteError> {
        self.public_key.encode(w)?;
        self.merkle_path.encode(w)?;
        // Unsigned proofs are serialized while a transaction is being built
        // and never go over the wire.
        if let Some(signature) = &self.signature {
            signature.encode(w)?;
        }
        Ok(())
    }
}

impl ExactSizeEncodable for SignatureProof {
    fn encoded_length(&self) -> usize {
        self.public_key.encoded_length()
            + self.merkle_path.encoded_length()
            + self.signature.map(|s| s.encoded_length()).unwrap_or(0)
    }
}

/// Decoding always expects the signature to be present.
impl Decodable for SignatureProof {
    type Error = AccountError;

    fn decode(r: &mut impl Reader) -> Result<Self, AccountError> {
        let public_key = PublicKey::decode(r)?;
        let merkle_path = MerklePath::decode(r)?;
        let signature = Signature::decode(r)?;
        Ok(SignatureProof {
            public_key,
            merkle_path,
            signature: Some(signature),
        })
    }
}
