use accounts::{NetworkId, SignatureProof, Transaction};
use primitives::{Address, PublicKey, Signature};
use rand_core::{CryptoRng, RngCore};
use readerwriter::{Decodable, Encodable, ExactSizeEncodable, Reader, WriteError, Writer};

use super::{KeyPair, StoredKeyPair, WalletError};

/// Single-key wallet owning a basic account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wallet {
    key_pair: KeyPair,
    address: Address,
}

impl Wallet {
    /// Wallet for an existing key pair.
    pub fn new(key_pair: KeyPair) -> Self {
        let address = key_pair.address();
        Wallet { key_pair, address }
    }

    /// Wallet with a fresh key pair.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Wallet::new(KeyPair::generate(rng))
    }

    /// Address of the basic account.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The owner's public key.
    pub fn public_key(&self) -> &PublicKey {
        self.key_pair.public_key()
    }

    /// The owner's key pair.
    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// Releases the key pair, e.g. to lock it.
    pub fn into_key_pair(self) -> KeyPair {
        self.key_pair
    }

    /// Creates a signed basic transaction.
    pub fn create_transaction(
        &self,
        recipient: Address,
        value: u64,
        fee: u64,
        validity_start_height: u32,
        network_id: NetworkId,
    ) -> Result<Transaction, WalletError> {
        let mut transaction = Transaction::new_basic(
            *self.public_key(),
            recipient,
            value,
            fee,
            validity_start_height,
            None,
            network_id,
        )?;
        let proof = self.sign_transaction(&transaction);
        transaction.set_signature_proof(&proof)?;
        Ok(transaction)
    }

    /// Signs the transaction's content with this wallet's key.
    pub fn sign_transaction(&self, transaction: &Transaction) -> SignatureProof {
        let signature = Signature::create(
            self.key_pair.private_key(),
            self.key_pair.public_key(),
            &transaction.serialize_content(),
        );
        SignatureProof::single_sig(*self.public_key(), Some(signature))
    }

    /// Unencrypted export of the key pair.
    pub fn export_plain(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    /// Loads an unlocked wallet from [Wallet::export_plain] output.
    pub fn load_plain(bytes: &[u8]) -> Result<Self, WalletError> {
        if bytes.is_empty() {
            return Err(WalletError::InvalidSeed);
        }
        Wallet::decode_exact(bytes)
    }
}

impl Encodable for Wallet {
    fn encode(&self, w: &mut impl Writer) -> Result<(), WriteError> {
        self.key_pair.encode(w)
    }
}

impl ExactSizeEncodable for Wallet {
    fn encoded_length(&self) -> usize {
        self.key_pair.encoded_length()
    }
}

impl Decodable for Wallet {
    type Error = WalletError;

    fn decode(r: &mut impl Reader) -> Result<Self, WalletError> {
        Ok(Wallet::new(StoredKeyPair::decode(r)?.into_unlocked()?))
    }
}
