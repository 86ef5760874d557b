use core::fmt;
use log::{debug, warn};
use primitives::{Address, Hash, HashAlgorithm};
use readerwriter::{Decodable, Encodable, ExactSizeEncodable, Reader, WriteError, Writer};
use serde::{Deserialize, Serialize};

use super::config::MAX_SAFE_VALUE;
use super::contract;
use super::registry::{to_plain_object, AccountBehavior, PlainObject};
use super::signature_proof::PlainSignatureProof;
use super::{Account, AccountError, AccountType, SignatureProof, Transaction};

/// Hashed time-locked contract.
///
/// The recipient withdraws by revealing a preimage of the hash root; revealing
/// a preimage `hash_depth` steps down a chain of `hash_count` hashes unlocks
/// `hash_depth / hash_count` of the total. Sender and recipient may resolve
/// the contract jointly at any time, and the sender alone after the timeout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashedTimeLockedContract {
    balance: u64,
    sender: Address,
    recipient: Address,
    hash_root: Hash,
    hash_count: u8,
    timeout: u32,
    total_amount: u64,
}

/// Plain projection of a [HashedTimeLockedContract].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainHashedTimeLockedContract {
    pub balance: u64,
    pub sender: Address,
    pub recipient: Address,
    pub hash_algorithm: HashAlgorithm,
    pub hash_root: String,
    pub hash_count: u8,
    pub timeout: u32,
    pub total_amount: u64,
}

/// Parameters carried in the data of an HTLC's creating transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HtlcCreationData {
    pub sender: Address,
    pub recipient: Address,
    pub hash_root: Hash,
    pub hash_count: u8,
    pub timeout: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlainHtlcCreationData {
    sender: Address,
    recipient: Address,
    hash_algorithm: HashAlgorithm,
    hash_root: String,
    hash_count: u8,
    timeout: u32,
}

/// Discriminant of an HTLC outgoing proof.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HtlcProofType {
    /// Recipient reveals a preimage.
    RegularTransfer = 1,
    /// Recipient and sender sign together.
    EarlyResolve = 2,
    /// Sender reclaims after the timeout.
    TimeoutResolve = 3,
}

impl HtlcProofType {
    /// Decodes the 1-byte discriminant.
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(HtlcProofType::RegularTransfer),
            2 => Some(HtlcProofType::EarlyResolve),
            3 => Some(HtlcProofType::TimeoutResolve),
            _ => None,
        }
    }
}

impl fmt::Display for HtlcProofType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HtlcProofType::RegularTransfer => "regular-transfer",
            HtlcProofType::EarlyResolve => "early-resolve",
            HtlcProofType::TimeoutResolve => "timeout-resolve",
        })
    }
}

/// Proof authorizing a transfer out of an HTLC.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HtlcProof {
    /// Preimage that hashes `hash_depth` times to `hash_root`, signed by the recipient.
    RegularTransfer {
        hash_depth: u8,
        hash_root: Hash,
        pre_image: Hash,
        signature_proof: SignatureProof,
    },
    /// Signatures of the recipient and of the sender (creator), in this order.
    EarlyResolve {
        recipient_proof: SignatureProof,
        sender_proof: SignatureProof,
    },
    /// Signature of the sender (creator).
    TimeoutResolve { sender_proof: SignatureProof },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlainHtlcProof {
    #[serde(rename = "type")]
    proof_type: HtlcProofType,
    #[serde(skip_serializing_if = "Option::is_none")]
    hash_algorithm: Option<HashAlgorithm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hash_depth: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hash_root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pre_image: Option<String>,
    #[serde(flatten)]
    signer: Option<PlainSignatureProof>,
    #[serde(skip_serializing_if = "Option::is_none")]
    creator: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    creator_signature: Option<primitives::Signature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    creator_public_key: Option<primitives::PublicKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    creator_path_length: Option<usize>,
}

impl HtlcProof {
    /// Proof type discriminant.
    pub fn proof_type(&self) -> HtlcProofType {
        match self {
            HtlcProof::RegularTransfer { .. } => HtlcProofType::RegularTransfer,
            HtlcProof::EarlyResolve { .. } => HtlcProofType::EarlyResolve,
            HtlcProof::TimeoutResolve { .. } => HtlcProofType::TimeoutResolve,
        }
    }

    /// Checks the hash chain and signatures against the signed content.
    /// Which parties signed is checked against the contract state when the
    /// transaction is applied.
    pub fn verify(&self, message: &[u8]) -> bool {
        match self {
            HtlcProof::RegularTransfer {
                hash_depth,
                hash_root,
                pre_image,
                signature_proof,
            } => {
                let mut hash = *pre_image;
                for _ in 0..*hash_depth {
                    hash = match Hash::compute(hash.as_bytes(), hash.algorithm()) {
                        Ok(h) => h,
                        Err(e) => {
                            warn!("Invalid HTLC preimage: {}", e);
                            return false;
                        }
                    };
                }
                if hash != *hash_root {
                    warn!("HTLC preimage does not hash to the root");
                    return false;
                }
                signature_proof.verify(None, message)
            }
            HtlcProof::EarlyResolve {
                recipient_proof,
                sender_proof,
            } => recipient_proof.verify(None, message) && sender_proof.verify(None, message),
            HtlcProof::TimeoutResolve { sender_proof } => sender_proof.verify(None, message),
        }
    }

    fn to_plain(&self) -> PlainHtlcProof {
        let mut plain = PlainHtlcProof {
            proof_type: self.proof_type(),
            hash_algorithm: None,
            hash_depth: None,
            hash_root: None,
            pre_image: None,
            signer: None,
            creator: None,
            creator_signature: None,
            creator_public_key: None,
            creator_path_length: None,
        };
        let creator = |plain: &mut PlainHtlcProof, proof: &SignatureProof| {
            plain.creator = Some(proof.public_key().to_address());
            plain.creator_signature = proof.signature().copied();
            plain.creator_public_key = Some(*proof.public_key());
            plain.creator_path_length = Some(proof.merkle_path().len());
        };
        match self {
            HtlcProof::RegularTransfer {
                hash_depth,
                hash_root,
                pre_image,
                signature_proof,
            } => {
                plain.hash_algorithm = Some(hash_root.algorithm());
                plain.hash_depth = Some(*hash_depth);
                plain.hash_root = Some(hash_root.to_hex());
                plain.pre_image = Some(pre_image.to_hex());
                plain.signer = Some(signature_proof.to_plain());
            }
            HtlcProof::EarlyResolve {
                recipient_proof,
                sender_proof,
            } => {
                plain.signer = Some(recipient_proof.to_plain());
                creator(&mut plain, sender_proof);
            }
            HtlcProof::TimeoutResolve { sender_proof } => creator(&mut plain, sender_proof),
        }
        plain
    }
}

impl Encodable for HtlcProof {
    fn encode(&self, w: &mut impl Writer) -> Result<(), WriteError> {
        w.write_u8(b"proof_type", self.proof_type() as u8)?;
        match self {
            HtlcProof::RegularTransfer {
                hash_depth,
                hash_root,
                pre_image,
                signature_proof,
            } => {
                hash_root.algorithm().encode(w)?;
                w.write_u8(b"hash_depth", *hash_depth)?;
                hash_root.encode(w)?;
                pre_image.encode(w)?;
                signature_proof.encode(w)
            }
            HtlcProof::EarlyResolve {
                recipient_proof,
                sender_proof,
            } => {
                recipient_proof.encode(w)?;
                sender_proof.encode(w)
            }
            HtlcProof::TimeoutResolve { sender_proof } => sender_proof.encode(w),
        }
    }
}

impl ExactSizeEncodable for HtlcProof {
    fn encoded_length(&self) -> usize {
        1 + match self {
            HtlcProof::RegularTransfer {
                hash_root,
                pre_image,
                signature_proof,
                ..
            } => {
                1 + 1 + hash_root.encoded_length()
                    + pre_image.encoded_length()
                    + signature_proof.encoded_length()
            }
            HtlcProof::EarlyResolve {
                recipient_proof,
                sender_proof,
            } => recipient_proof.encoded_length() + sender_proof.encoded_length(),
            HtlcProof::TimeoutResolve { sender_proof } => sender_proof.encoded_length(),
        }
    }
}

impl Decodable for HtlcProof {
    type Error = AccountError;

    fn decode(r: &mut impl Reader) -> Result<Self, AccountError> {
        let tag = r.read_u8()?;
        match HtlcProofType::from_u8(tag) {
            Some(HtlcProofType::RegularTransfer) => {
                let algorithm = HashAlgorithm::decode(r)?;
                let hash_depth = r.read_u8()?;
                let hash_root = Hash::decode_with(r, algorithm)?;
                let pre_image = Hash::decode_with(r, algorithm)?;
                let signature_proof = SignatureProof::decode(r)?;
                Ok(HtlcProof::RegularTransfer {
                    hash_depth,
                    hash_root,
                    pre_image,
                    signature_proof,
                })
            }
            Some(HtlcProofType::EarlyResolve) => Ok(HtlcProof::EarlyResolve {
                recipient_proof: SignatureProof::decode(r)?,
                sender_proof: SignatureProof::decode(r)?,
            }),
            Some(HtlcProofType::TimeoutResolve) => Ok(HtlcProof::TimeoutResolve {
                sender_proof: SignatureProof::decode(r)?,
            }),
            None => Err(AccountError::InvalidData("unknown HTLC proof type")),
        }
    }
}

impl HtlcCreationData {
    fn plain(&self) -> PlainHtlcCreationData {
        PlainHtlcCreationData {
            sender: self.sender,
            recipient: self.recipient,
            hash_algorithm: self.hash_root.algorithm(),
            hash_root: self.hash_root.to_hex(),
            hash_count: self.hash_count,
            timeout: self.timeout,
        }
    }
}

impl Encodable for HtlcCreationData {
    fn encode(&self, w: &mut impl Writer) -> Result<(), WriteError> {
        self.sender.encode(w)?;
        self.recipient.encode(w)?;
        self.hash_root.algorithm().encode(w)?;
        self.hash_root.encode(w)?;
        w.write_u8(b"hash_count", self.hash_count)?;
        w.write_u32(b"timeout", self.timeout)
    }
}

impl ExactSizeEncodable for HtlcCreationData {
    fn encoded_length(&self) -> usize {
        Address::SIZE * 2 + 1 + self.hash_root.encoded_length() + 1 + 4
    }
}

impl Decodable for HtlcCreationData {
    type Error = AccountError;

    fn decode(r: &mut impl Reader) -> Result<Self, AccountError> {
        let sender = Address::decode(r)?;
        let recipient = Address::decode(r)?;
        let algorithm = HashAlgorithm::decode(r)?;
        let hash_root = Hash::decode_with(r, algorithm)?;
        let hash_count = r.read_u8()?;
        let timeout = r.read_u32()?;
        Ok(HtlcCreationData {
            sender,
            recipient,
            hash_root,
            hash_count,
            timeout,
        })
    }
}

impl HashedTimeLockedContract {
    /// Creates an HTLC. `hash_count` must be non-zero.
    pub fn new(
        balance: u64,
        sender: Address,
        recipient: Address,
        hash_root: Hash,
        hash_count: u8,
        timeout: u32,
        total_amount: u64,
    ) -> Result<Self, AccountError> {
        if balance > MAX_SAFE_VALUE {
            return Err(AccountError::InvalidBalance(balance));
        }
        if hash_count == 0 {
            return Err(AccountError::InvalidData("hash count must be non-zero"));
        }
        Ok(HashedTimeLockedContract {
            balance,
            sender,
            recipient,
            hash_root,
            hash_count,
            timeout,
            total_amount,
        })
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn sender(&self) -> &Address {
        &self.sender
    }

    pub fn recipient(&self) -> &Address {
        &self.recipient
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_root.algorithm()
    }

    pub fn hash_root(&self) -> &Hash {
        &self.hash_root
    }

    pub fn hash_count(&self) -> u8 {
        self.hash_count
    }

    pub fn timeout(&self) -> u32 {
        self.timeout
    }

    pub fn total_amount(&self) -> u64 {
        self.total_amount
    }

    pub(crate) fn with_balance(&self, balance: u64) -> Self {
        HashedTimeLockedContract {
            balance,
            ..self.clone()
        }
    }

    /// Checks the proof against the contract state and returns the amount that must stay locked.
    pub(crate) fn check_outgoing_transaction(
        &self,
        transaction: &Transaction,
        block_height: u32,
    ) -> Result<u64, AccountError> {
        match HtlcProof::decode_exact(transaction.proof())? {
            HtlcProof::RegularTransfer {
                hash_depth,
                hash_root,
                signature_proof,
                ..
            } => {
                if self.timeout < block_height {
                    return Err(AccountError::ProofError("contract expired"));
                }
                if hash_root != self.hash_root {
                    return Err(AccountError::ProofError("hash root mismatch"));
                }
                if !signature_proof.is_signed_by(&self.recipient) {
                    return Err(AccountError::ProofError("not signed by the recipient"));
                }
                // floor((1 - depth / count) * total), in integers.
                let remaining = (self.hash_count as u128).saturating_sub(hash_depth as u128);
                let min_cap = remaining * self.total_amount as u128 / self.hash_count as u128;
                Ok(min_cap as u64)
            }
            HtlcProof::EarlyResolve {
                recipient_proof,
                sender_proof,
            } => {
                if !recipient_proof.is_signed_by(&self.recipient) {
                    return Err(AccountError::ProofError("not signed by the recipient"));
                }
                if !sender_proof.is_signed_by(&self.sender) {
                    return Err(AccountError::ProofError("not signed by the sender"));
                }
                Ok(0)
            }
            HtlcProof::TimeoutResolve { sender_proof } => {
                if self.timeout >= block_height {
                    return Err(AccountError::ProofError("contract not yet expired"));
                }
                if !sender_proof.is_signed_by(&self.sender) {
                    return Err(AccountError::ProofError("not signed by the sender"));
                }
                Ok(0)
            }
        }
    }

    /// Plain projection.
    pub fn to_plain(&self) -> PlainHashedTimeLockedContract {
        PlainHashedTimeLockedContract {
            balance: self.balance,
            sender: self.sender,
            recipient: self.recipient,
            hash_algorithm: self.hash_root.algorithm(),
            hash_root: self.hash_root.to_hex(),
            hash_count: self.hash_count,
            timeout: self.timeout,
            total_amount: self.total_amount,
        }
    }

    /// Rebuilds the contract from its plain projection.
    pub fn from_plain(plain: &PlainHashedTimeLockedContract) -> Result<Self, AccountError> {
        HashedTimeLockedContract::new(
            plain.balance,
            plain.sender,
            plain.recipient,
            Hash::from_hex(&plain.hash_root, plain.hash_algorithm)?,
            plain.hash_count,
            plain.timeout,
            plain.total_amount,
        )
    }

    pub(crate) fn encode_fields(&self, w: &mut impl Writer) -> Result<(), WriteError> {
        self.sender.encode(w)?;
        self.recipient.encode(w)?;
        self.hash_root.algorithm().encode(w)?;
        self.hash_root.encode(w)?;
        w.write_u8(b"hash_count", self.hash_count)?;
        w.write_u32(b"timeout", self.timeout)?;
        w.write_u64(b"total_amount", self.total_amount)
    }

    pub(crate) fn fields_length(&self) -> usize {
        Address::SIZE * 2 + 1 + self.hash_root.encoded_length() + 1 + 4 + 8
    }

    pub(crate) fn decode_fields(r: &mut impl Reader, balance: u64) -> Result<Self, AccountError> {
        let sender = Address::decode(r)?;
        let recipient = Address::decode(r)?;
        let algorithm = HashAlgorithm::decode(r)?;
        let hash_root = Hash::decode_with(r, algorithm)?;
        let hash_count = r.read_u8()?;
        let timeout = r.read_u32()?;
        let total_amount = r.read_u64()?;
        HashedTimeLockedContract::new(
            balance,
            sender,
            recipient,
            hash_root,
            hash_count,
            timeout,
            total_amount,
        )
    }
}

/// Verification rules of hashed time-locked contracts.
#[derive(Clone, Debug, Default)]
pub struct HtlcBehavior;

impl AccountBehavior for HtlcBehavior {
    fn account_type(&self) -> AccountType {
        AccountType::HTLC
    }

    fn create(
        &self,
        balance: u64,
        _block_height: u32,
        transaction: &Transaction,
    ) -> Result<Account, AccountError> {
        let data = HtlcCreationData::decode_exact(transaction.data())?;
        if data.hash_root.algorithm() == HashAlgorithm::Argon2d {
            return Err(AccountError::InvalidData("argon2d is not allowed"));
        }
        Ok(Account::Htlc(HashedTimeLockedContract::new(
            balance,
            data.sender,
            data.recipient,
            data.hash_root,
            data.hash_count,
            data.timeout,
            balance,
        )?))
    }

    fn verify_outgoing_transaction(&self, transaction: &Transaction) -> bool {
        match HtlcProof::decode_exact(transaction.proof()) {
            Ok(proof) => proof.verify(&transaction.serialize_content()),
            Err(e) => {
                warn!("Invalid HTLC proof: {}", e);
                false
            }
        }
    }

    fn verify_incoming_transaction(&self, transaction: &Transaction) -> bool {
        let data = match HtlcCreationData::decode_exact(transaction.data()) {
            Ok(data) => data,
            Err(e) => {
                debug!("Invalid HTLC data: {}", e);
                return false;
            }
        };
        if data.hash_count == 0 {
            debug!("HTLC hash count must be non-zero");
            return false;
        }
        // Blacklisted: hashing a long Argon2d chain is a cost attack.
        if data.hash_root.algorithm() == HashAlgorithm::Argon2d {
            debug!("HTLC must not use argon2d");
            return false;
        }
        contract::verify_incoming_transaction(transaction)
    }

    fn data_to_plain(&self, data: &[u8]) -> PlainObject {
        match HtlcCreationData::decode_exact(data) {
            Ok(d) => to_plain_object(&d.plain()),
            Err(_) => PlainObject::new(),
        }
    }

    fn proof_to_plain(&self, proof: &[u8]) -> PlainObject {
        match HtlcProof::decode_exact(proof) {
            Ok(p) => to_plain_object(&p.to_plain()),
            Err(_) => PlainObject::new(),
        }
    }
}
