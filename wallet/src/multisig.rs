use accounts::{AccountType, NetworkId, SignatureProof, Transaction, TransactionFlags};
use log::{debug, warn};
use merkle::MerkleTree;
use musig::CommitmentPair;
use primitives::{Address, Commitment, PartialSignature, PublicKey, RandomSecret};
use rand_core::{CryptoRng, RngCore};
use readerwriter::{Decodable, Encodable, ExactSizeEncodable, Reader, WriteError, Writer};

use super::{KeyPair, StoredKeyPair, WalletError};

/// Wallet for a k-of-n multi-signature basic account.
///
/// The address commits to the aggregate key of every k-sized subset of the
/// participants: it is the hash of the Merkle root over those aggregate keys
/// in byte order. Any k participants can later sign with the aggregate key of
/// their subset and prove its membership with a Merkle path.
///
/// Signing takes two rounds over a channel the wallet does not provide:
/// 1. every signer calls [MultiSigWallet::create_commitment] and shares the commitment;
///    the commitments are summed with [musig::aggregate_commitments],
/// 2. every signer calls [MultiSigWallet::partially_sign_transaction] with the
///    aggregate commitment; any signer combines the shares with
///    [MultiSigWallet::complete_transaction].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiSigWallet {
    key_pair: KeyPair,
    min_signatures: u8,
    public_keys: Vec<PublicKey>,
    address: Address,
}

impl MultiSigWallet {
    /// Creates the wallet of `key_pair` for a `min_signatures`-of-`public_keys.len()`
    /// account. The order of `public_keys` does not matter.
    pub fn from_public_keys(
        key_pair: KeyPair,
        min_signatures: usize,
        public_keys: &[PublicKey],
    ) -> Result<Self, WalletError> {
        if public_keys.is_empty() {
            return Err(WalletError::NoPublicKeys);
        }
        if min_signatures == 0 || min_signatures > public_keys.len() {
            return Err(WalletError::InvalidThreshold {
                min_signatures,
                keys: public_keys.len(),
            });
        }
        if !public_keys.contains(key_pair.public_key()) {
            return Err(WalletError::NotAParticipant);
        }

        let mut sorted = public_keys.to_vec();
        sorted.sort();

        let combinations = combinations(&sorted, min_signatures);
        if combinations.len() > u8::MAX as usize {
            return Err(WalletError::TooManyCombinations(combinations.len()));
        }
        let candidates = combinations
            .iter()
            .map(|keys| musig::aggregate_public_keys(keys))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "{}-of-{} wallet with {} candidate keys",
            min_signatures,
            sorted.len(),
            candidates.len()
        );

        Ok(MultiSigWallet::new(
            key_pair,
            min_signatures as u8,
            candidates,
        ))
    }

    fn new(key_pair: KeyPair, min_signatures: u8, mut public_keys: Vec<PublicKey>) -> Self {
        public_keys.sort();
        let address = Address::from_hash(&MerkleTree::compute_root(&public_keys));
        MultiSigWallet {
            key_pair,
            min_signatures,
            public_keys,
            address,
        }
    }

    /// Address of the multi-signature account.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// This participant's key pair.
    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// Number of signers required.
    pub fn min_signatures(&self) -> usize {
        self.min_signatures as usize
    }

    /// Aggregate keys of all signer subsets, sorted.
    pub fn public_keys(&self) -> &[PublicKey] {
        &self.public_keys
    }

    /// Creates an unsigned extended transaction from the multi-signature account.
    pub fn create_transaction(
        &self,
        recipient: Address,
        value: u64,
        fee: u64,
        validity_start_height: u32,
        network_id: NetworkId,
    ) -> Result<Transaction, WalletError> {
        Ok(Transaction::new_extended(
            self.address,
            AccountType::BASIC,
            recipient,
            AccountType::BASIC,
            value,
            fee,
            validity_start_height,
            TransactionFlags::empty(),
            Vec::new(),
            Vec::new(),
            network_id,
        )?)
    }

    /// Draws this signer's single-use nonce for one signing session.
    pub fn create_commitment<R: RngCore + CryptoRng>(&self, rng: &mut R) -> CommitmentPair {
        CommitmentPair::generate(rng)
    }

    /// This signer's share of the signature. `signer_keys` are the public keys
    /// of the signing subset, in any order.
    pub fn partially_sign_transaction(
        &self,
        transaction: &Transaction,
        signer_keys: &[PublicKey],
        aggregate_commitment: &Commitment,
        secret: &RandomSecret,
    ) -> Result<PartialSignature, WalletError> {
        Ok(musig::create_partial_signature(
            self.key_pair.private_key(),
            self.key_pair.public_key(),
            signer_keys,
            secret,
            aggregate_commitment,
            &transaction.serialize_content(),
        )?)
    }

    /// Combines exactly `min_signatures` shares into a proof for the signing subset
    /// with aggregate key `aggregate_public_key`.
    pub fn sign_transaction(
        &self,
        transaction: &Transaction,
        aggregate_public_key: &PublicKey,
        aggregate_commitment: &Commitment,
        partial_signatures: &[PartialSignature],
    ) -> Result<SignatureProof, WalletError> {
        if partial_signatures.len() != self.min_signatures() {
            return Err(WalletError::WrongNumberOfPartialSignatures {
                expected: self.min_signatures(),
                actual: partial_signatures.len(),
            });
        }
        let signature =
            musig::combine_partial_signatures(aggregate_commitment, partial_signatures)?;
        if !signature.verify(aggregate_public_key, &transaction.serialize_content()) {
            warn!("combined signature does not verify for {:?}", aggregate_public_key);
            return Err(WalletError::InvalidSignature);
        }
        Ok(SignatureProof::multi_sig(
            *aggregate_public_key,
            &self.public_keys,
            Some(signature),
        )?)
    }

    /// [MultiSigWallet::sign_transaction] and store the proof in the transaction.
    pub fn complete_transaction(
        &self,
        mut transaction: Transaction,
        aggregate_public_key: &PublicKey,
        aggregate_commitment: &Commitment,
        partial_signatures: &[PartialSignature],
    ) -> Result<Transaction, WalletError> {
        let proof = self.sign_transaction(
            &transaction,
            aggregate_public_key,
            aggregate_commitment,
            partial_signatures,
        )?;
        transaction.set_signature_proof(&proof)?;
        Ok(transaction)
    }

    /// Unencrypted export: key pair, threshold and candidate keys.
    pub fn export_plain(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    /// Loads an unlocked wallet from [MultiSigWallet::export_plain] output.
    pub fn load_plain(bytes: &[u8]) -> Result<Self, WalletError> {
        if bytes.is_empty() {
            return Err(WalletError::InvalidSeed);
        }
        MultiSigWallet::decode_exact(bytes)
    }
}

/// All `k`-sized subsets of `items`, preserving their order.
fn combinations<T: Copy>(items: &[T], k: usize) -> Vec<Vec<T>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if items.len() < k {
        return Vec::new();
    }
    let (first, rest) = (items[0], &items[1..]);
    let mut result: Vec<Vec<T>> = combinations(rest, k - 1)
        .into_iter()
        .map(|mut c| {
            c.insert(0, first);
            c
        })
        .collect();
    result.extend(combinations(rest, k));
    result
}

impl Encodable for MultiSigWallet {
    fn encode(&self, w: &mut impl Writer) -> Result<(), WriteError> {
        self.key_pair.encode(w)?;
        w.write_u8(b"min_signatures", self.min_signatures)?;
        w.write_u8(b"count", self.public_keys.len() as u8)?;
        for key in &self.public_keys {
            key.encode(w)?;
        }
        Ok(())
    }
}

impl ExactSizeEncodable for MultiSigWallet {
    fn encoded_length(&self) -> usize {
        self.key_pair.encoded_length() + 1 + 1 + self.public_keys.len() * PublicKey::SIZE
    }
}

impl Decodable for MultiSigWallet {
    type Error = WalletError;

    fn decode(r: &mut impl Reader) -> Result<Self, WalletError> {
        let key_pair = StoredKeyPair::decode(r)?.into_unlocked()?;
        let min_signatures = r.read_u8()?;
        let count = r.read_u8()? as usize;
        let public_keys = (0..count)
            .map(|_| PublicKey::decode(r))
            .collect::<Result<Vec<_>, _>>()?;
        if min_signatures == 0 || public_keys.is_empty() {
            return Err(WalletError::InvalidSeed);
        }
        Ok(MultiSigWallet::new(key_pair, min_signatures, public_keys))
    }
}

#[cfg(test)]
mod tests {
    use super::combinations;

    #[test]
    fn combinations_of_four() {
        let items = [1, 2, 3, 4];
        assert_eq!(combinations(&items, 1).len(), 4);
        assert_eq!(
            combinations(&items, 2),
            vec![
                vec![1, 2],
                vec![1, 3],
                vec![1, 4],
                vec![2, 3],
                vec![2, 4],
                vec![3, 4]
            ]
        );
        assert_eq!(combinations(&items, 4), vec![vec![1, 2, 3, 4]]);
        assert!(combinations(&items, 5).is_empty());
    }
}
