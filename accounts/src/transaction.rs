use core::cmp::Ordering;
use core::fmt;
use std::sync::OnceLock;

use bitflags::bitflags;
use log::{debug, warn};
use primitives::{Address, Hash, PublicKey, Signature};
use readerwriter::{Decodable, Encodable, ExactSizeEncodable, Reader, WriteError, Writer};
use serde::{Deserialize, Serialize};

use super::config::{NetworkId, MAX_SAFE_VALUE};
use super::registry::{to_plain_object, PlainObject};
use super::{AccountRegistry, AccountType, SignatureProof, TransactionError};

bitflags! {
    /// Transaction flags. Unknown bits are rejected.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct TransactionFlags: u8 {
        /// The transaction creates the contract at its recipient address.
        const CONTRACT_CREATION = 0b1;
    }
}

/// Wire format of a transaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionFormat {
    /// Basic account to basic account, single signature, no data.
    Basic = 0,
    /// Any account types, data and proof.
    Extended = 1,
}

/// A transfer of value between two accounts.
///
/// The signed content excludes the format and the proof, so that the
/// hash identifies a transfer independently of how it was authorized.
/// Equality follows the same rule.
#[derive(Clone)]
pub struct Transaction {
    format: TransactionFormat,
    sender: Address,
    sender_type: AccountType,
    recipient: Address,
    recipient_type: AccountType,
    value: u64,
    fee: u64,
    validity_start_height: u32,
    network_id: NetworkId,
    flags: TransactionFlags,
    data: Vec<u8>,
    proof: Vec<u8>,
    // Basic format only: the decoded form of `proof`.
    basic_proof: Option<SignatureProof>,
    hash: OnceLock<Hash>,
    valid: OnceLock<(NetworkId, bool)>,
}

/// Plain projection of a [Transaction].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainTransaction {
    pub transaction_hash: String,
    pub format: TransactionFormat,
    pub sender: Address,
    pub sender_type: AccountType,
    pub recipient: Address,
    pub recipient_type: AccountType,
    pub value: u64,
    pub fee: u64,
    pub fee_per_byte: f64,
    pub validity_start_height: u32,
    pub network: NetworkId,
    pub flags: u8,
    /// Type-specific fields of the recipient plus the `raw` hex data.
    pub data: PlainObject,
    /// Type-specific fields of the sender plus the `raw` hex proof.
    pub proof: PlainObject,
    pub size: usize,
    pub valid: bool,
}

/// Signed content, optionally with the recipient replaced.
struct Content<'a> {
    tx: &'a Transaction,
    recipient: &'a Address,
}

impl Encodable for Content<'_> {
    fn encode(&self, w: &mut impl Writer) -> Result<(), WriteError> {
        let tx = self.tx;
        w.write_u16_prefixed(b"data", &tx.data)?;
        tx.sender.encode(w)?;
        w.write_u8(b"sender_type", tx.sender_type.0)?;
        self.recipient.encode(w)?;
        w.write_u8(b"recipient_type", tx.recipient_type.0)?;
        w.write_u64(b"value", tx.value)?;
        w.write_u64(b"fee", tx.fee)?;
        w.write_u32(b"validity_start_height", tx.validity_start_height)?;
        w.write_u8(b"network_id", tx.network_id.0)?;
        w.write_u8(b"flags", tx.flags.bits())
    }
}

impl ExactSizeEncodable for Content<'_> {
    fn encoded_length(&self) -> usize {
        2 + self.tx.data.len() + Address::SIZE + 1 + Address::SIZE + 1 + 8 + 8 + 4 + 1 + 1
    }
}

impl Transaction {
    /// Creates a basic transaction from a basic account owned by `sender_public_key`.
    /// The signature may be set later with [Transaction::set_proof].
    pub fn new_basic(
        sender_public_key: PublicKey,
        recipient: Address,
        value: u64,
        fee: u64,
        validity_start_height: u32,
        signature: Option<Signature>,
        network_id: NetworkId,
    ) -> Result<Self, TransactionError> {
        let proof = SignatureProof::single_sig(sender_public_key, signature);
        let mut tx = Transaction::new(
            TransactionFormat::Basic,
            sender_public_key.to_address(),
            AccountType::BASIC,
            recipient,
            AccountType::BASIC,
            value,
            fee,
            validity_start_height,
            TransactionFlags::empty(),
            Vec::new(),
            proof.encode_to_vec(),
            network_id,
        )?;
        tx.basic_proof = Some(proof);
        tx.check_parties()
    }

    /// Creates an extended transaction.
    #[allow(clippy::too_many_arguments)]
    pub fn new_extended(
        sender: Address,
        sender_type: AccountType,
        recipient: Address,
        recipient_type: AccountType,
        value: u64,
        fee: u64,
        validity_start_height: u32,
        flags: TransactionFlags,
        data: Vec<u8>,
        proof: Vec<u8>,
        network_id: NetworkId,
    ) -> Result<Self, TransactionError> {
        Transaction::new(
            TransactionFormat::Extended,
            sender,
            sender_type,
            recipient,
            recipient_type,
            value,
            fee,
            validity_start_height,
            flags,
            data,
            proof,
            network_id,
        )?
        .check_parties()
    }

    /// Creates the extended transaction that creates a contract of
    /// `recipient_type`; the recipient is the contract creation address.
    #[allow(clippy::too_many_arguments)]
    pub fn new_contract_creation(
        sender: Address,
        sender_type: AccountType,
        recipient_type: AccountType,
        value: u64,
        fee: u64,
        validity_start_height: u32,
        data: Vec<u8>,
        proof: Vec<u8>,
        network_id: NetworkId,
    ) -> Result<Self, TransactionError> {
        let mut tx = Transaction::new(
            TransactionFormat::Extended,
            sender,
            sender_type,
            Address::NULL,
            recipient_type,
            value,
            fee,
            validity_start_height,
            TransactionFlags::CONTRACT_CREATION,
            data,
            proof,
            network_id,
        )?;
        tx.recipient = tx.contract_creation_address();
        tx.check_parties()
    }

    /// A transaction never sends to its own sender.
    fn check_parties(self) -> Result<Self, TransactionError> {
        if self.sender == self.recipient {
            debug!("sender {} is also the recipient", self.sender);
            return Err(TransactionError::SenderIsRecipient);
        }
        Ok(self)
    }

    #[allow(clippy::too_many_arguments)]
    fn new(
        format: TransactionFormat,
        sender: Address,
        sender_type: AccountType,
        recipient: Address,
        recipient_type: AccountType,
        value: u64,
        fee: u64,
        validity_start_height: u32,
        flags: TransactionFlags,
        data: Vec<u8>,
        proof: Vec<u8>,
        network_id: NetworkId,
    ) -> Result<Self, TransactionError> {
        if value == 0 || value > MAX_SAFE_VALUE {
            return Err(TransactionError::InvalidValue(value));
        }
        if fee > MAX_SAFE_VALUE {
            return Err(TransactionError::InvalidFee(fee));
        }
        if data.len() > u16::MAX as usize {
            return Err(TransactionError::DataTooLong(data.len()));
        }
        if proof.len() > u16::MAX as usize {
            return Err(TransactionError::ProofTooLong(proof.len()));
        }
        Ok(Transaction {
            format,
            sender,
            sender_type,
            recipient,
            recipient_type,
            value,
            fee,
            validity_start_height,
            network_id,
            flags,
            data,
            proof,
            basic_proof: None,
            hash: OnceLock::new(),
            valid: OnceLock::new(),
        })
    }

    pub fn format(&self) -> TransactionFormat {
        self.format
    }

    pub fn sender(&self) -> &Address {
        &self.sender
    }

    pub fn sender_type(&self) -> AccountType {
        self.sender_type
    }

    pub fn recipient(&self) -> &Address {
        &self.recipient
    }

    pub fn recipient_type(&self) -> AccountType {
        self.recipient_type
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn fee(&self) -> u64 {
        self.fee
    }

    pub fn validity_start_height(&self) -> u32 {
        self.validity_start_height
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }

    pub fn flags(&self) -> TransactionFlags {
        self.flags
    }

    /// True if all bits of `flag` are set.
    pub fn has_flag(&self, flag: TransactionFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Serialized proof of the sender's authorization.
    pub fn proof(&self) -> &[u8] {
        &self.proof
    }

    /// Sender key of a basic transaction.
    pub fn sender_public_key(&self) -> Option<&PublicKey> {
        self.basic_proof.as_ref().map(|p| p.public_key())
    }

    /// Replaces the proof. A basic transaction only accepts a signed
    /// single-key proof of its sender key.
    pub fn set_proof(&mut self, proof: Vec<u8>) -> Result<(), TransactionError> {
        if proof.len() > u16::MAX as usize {
            return Err(TransactionError::ProofTooLong(proof.len()));
        }
        if let Some(current) = &self.basic_proof {
            let signature_proof = SignatureProof::decode_exact(&proof)?;
            if !signature_proof.merkle_path().is_empty()
                || signature_proof.public_key() != current.public_key()
            {
                return Err(TransactionError::InvalidBasicProof);
            }
            self.basic_proof = Some(signature_proof);
        }
        self.proof = proof;
        self.valid = OnceLock::new();
        Ok(())
    }

    /// Encodes and sets a signature proof.
    pub fn set_signature_proof(&mut self, proof: &SignatureProof) -> Result<(), TransactionError> {
        self.set_proof(proof.encode_to_vec())
    }

    /// The signed content.
    pub fn serialize_content(&self) -> Vec<u8> {
        self.content().encode_to_vec()
    }

    /// Size of the signed content in bytes.
    pub fn serialized_content_size(&self) -> usize {
        self.content().encoded_length()
    }

    /// Size of the full wire encoding in bytes.
    pub fn serialized_size(&self) -> usize {
        self.encoded_length()
    }

    /// Fee per byte of the wire encoding.
    pub fn fee_per_byte(&self) -> f64 {
        self.fee as f64 / self.serialized_size() as f64
    }

    /// Light hash of the signed content.
    pub fn hash(&self) -> Hash {
        *self
            .hash
            .get_or_init(|| Hash::blake2b(&self.serialize_content()))
    }

    /// Address of the contract created by this transaction: the hash of the
    /// content with the recipient set to the null address.
    pub fn contract_creation_address(&self) -> Address {
        let content = Content {
            tx: self,
            recipient: &Address::NULL,
        };
        Address::from_hash(&Hash::blake2b(&content.encode_to_vec()))
    }

    /// Checks the network, the distinct endpoints and both accounts' rules.
    /// The result is remembered for the first network it was computed for.
    pub fn verify(&self, network_id: NetworkId, registry: &AccountRegistry) -> bool {
        if let Some((memo_network_id, valid)) = self.valid.get() {
            if *memo_network_id == network_id {
                return *valid;
            }
        }
        let valid = self.verify_uncached(network_id, registry);
        // A different network was memoized first; keep that one.
        let _ = self.valid.set((network_id, valid));
        valid
    }

    fn verify_uncached(&self, network_id: NetworkId, registry: &AccountRegistry) -> bool {
        if self.network_id != network_id {
            warn!("Transaction is not valid in this network: {}", self);
            return false;
        }
        if self.recipient == self.sender {
            warn!("Sender and recipient must not match: {}", self);
            return false;
        }
        let (sender, recipient) = match (
            registry.get(self.sender_type),
            registry.get(self.recipient_type),
        ) {
            (Some(s), Some(r)) => (s, r),
            _ => {
                warn!("Invalid account type: {}", self);
                return false;
            }
        };
        if !sender.verify_outgoing_transaction(self) {
            warn!("Invalid for sender: {}", self);
            return false;
        }
        if !recipient.verify_incoming_transaction(self) {
            warn!("Invalid for recipient: {}", self);
            return false;
        }
        true
    }

    /// Mempool order: higher fee per byte first, then larger, then higher
    /// fee and value, then [Transaction::compare_block_order].
    ///
    /// Equal results imply equal block order. The converse fails for the same
    /// transfer in basic and extended format, whose sizes differ.
    pub fn compare(&self, other: &Transaction) -> Ordering {
        let (size, other_size) = (self.serialized_size(), other.serialized_size());
        // fee / size, cross-multiplied to stay exact
        let lhs = self.fee as u128 * other_size as u128;
        let rhs = other.fee as u128 * size as u128;
        rhs.cmp(&lhs)
            .then_with(|| other_size.cmp(&size))
            .then_with(|| other.fee.cmp(&self.fee))
            .then_with(|| other.value.cmp(&self.value))
            .then_with(|| self.compare_block_order(other))
    }

    /// Order of transactions within a block. Equal exactly when the
    /// transactions are equal.
    pub fn compare_block_order(&self, other: &Transaction) -> Ordering {
        self.recipient
            .cmp(&other.recipient)
            .then_with(|| self.validity_start_height.cmp(&other.validity_start_height))
            .then_with(|| other.fee.cmp(&self.fee))
            .then_with(|| other.value.cmp(&self.value))
            .then_with(|| self.sender.cmp(&other.sender))
            .then_with(|| self.recipient_type.cmp(&other.recipient_type))
            .then_with(|| self.sender_type.cmp(&other.sender_type))
            .then_with(|| self.flags.bits().cmp(&other.flags.bits()))
            .then_with(|| self.data.cmp(&other.data))
    }

    /// Plain projection; data and proof are described by the registered account types.
    pub fn to_plain(&self, registry: &AccountRegistry) -> PlainTransaction {
        let mut data = registry
            .get(self.recipient_type)
            .map(|b| b.data_to_plain(&self.data))
            .unwrap_or_default();
        data.insert("raw".to_string(), hex::encode(&self.data).into());

        let mut proof = match &self.basic_proof {
            Some(p) => to_plain_object(&p.to_plain()),
            None => registry
                .get(self.sender_type)
                .map(|b| b.proof_to_plain(&self.proof))
                .unwrap_or_default(),
        };
        proof.insert("raw".to_string(), hex::encode(&self.proof).into());

        PlainTransaction {
            transaction_hash: self.hash().to_hex(),
            format: self.format,
            sender: self.sender,
            sender_type: self.sender_type,
            recipient: self.recipient,
            recipient_type: self.recipient_type,
            value: self.value,
            fee: self.fee,
            fee_per_byte: self.fee_per_byte(),
            validity_start_height: self.validity_start_height,
            network: self.network_id,
            flags: self.flags.bits(),
            data,
            proof,
            size: self.serialized_size(),
            valid: self.verify(self.network_id, registry),
        }
    }

    /// Rebuilds a transaction from its plain projection, using the `raw` fields.
    pub fn from_plain(plain: &PlainTransaction) -> Result<Self, TransactionError> {
        let raw_proof = raw_bytes(&plain.proof)?;
        match plain.format {
            TransactionFormat::Basic => {
                let mut tx = Transaction::new_basic(
                    basic_public_key(&plain.proof, &raw_proof)?,
                    plain.recipient,
                    plain.value,
                    plain.fee,
                    plain.validity_start_height,
                    None,
                    plain.network,
                )?;
                if raw_proof.len() > PublicKey::SIZE + 1 {
                    tx.set_proof(raw_proof)?;
                }
                Ok(tx)
            }
            TransactionFormat::Extended => Transaction::new_extended(
                plain.sender,
                plain.sender_type,
                plain.recipient,
                plain.recipient_type,
                plain.value,
                plain.fee,
                plain.validity_start_height,
                TransactionFlags::from_bits(plain.flags)
                    .ok_or(TransactionError::InvalidFlags(plain.flags))?,
                raw_bytes(&plain.data)?,
                raw_proof,
                plain.network,
            ),
        }
    }

    fn content(&self) -> Content<'_> {
        Content {
            tx: self,
            recipient: &self.recipient,
        }
    }
}

fn raw_bytes(object: &PlainObject) -> Result<Vec<u8>, TransactionError> {
    let raw = object
        .get("raw")
        .and_then(|v| v.as_str())
        .ok_or_else(|| TransactionError::Plain("missing raw field".to_string()))?;
    hex::decode(raw).map_err(|_| TransactionError::Plain("raw field is not hex".to_string()))
}

fn basic_public_key(proof: &PlainObject, raw_proof: &[u8]) -> Result<PublicKey, TransactionError> {
    match proof.get("publicKey").and_then(|v| v.as_str()) {
        Some(hex) => Ok(PublicKey::from_hex(hex)?),
        None if raw_proof.len() >= PublicKey::SIZE => {
            Ok(PublicKey::from_bytes(&raw_proof[..PublicKey::SIZE])?)
        }
        None => Err(TransactionError::Plain("missing public key".to_string())),
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.sender == other.sender
            && self.sender_type == other.sender_type
            && self.recipient == other.recipient
            && self.recipient_type == other.recipient_type
            && self.value == other.value
            && self.fee == other.fee
            && self.validity_start_height == other.validity_start_height
            && self.network_id == other.network_id
            && self.flags == other.flags
            && self.data == other.data
    }
}

impl Eq for Transaction {}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transaction{{sender={}, recipient={}, value={}, fee={}, validityStartHeight={}, networkId={}}}",
            self.sender, self.recipient, self.value, self.fee, self.validity_start_height, self.network_id
        )
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("format", &self.format)
            .field("sender", &self.sender)
            .field("sender_type", &self.sender_type)
            .field("recipient", &self.recipient)
            .field("recipient_type", &self.recipient_type)
            .field("value", &self.value)
            .field("fee", &self.fee)
            .field("validity_start_height", &self.validity_start_height)
            .field("network_id", &self.network_id)
            .field("flags", &self.flags)
            .field("data", &hex::encode(&self.data))
            .field("proof", &hex::encode(&self.proof))
            .finish()
    }
}

impl Encodable for Transaction {
    fn encode(&self, w: &mut impl Writer) -> Result<(), WriteError> {
        w.write_u8(b"format", self.format as u8)?;
        match &self.basic_proof {
            Some(proof) => {
                proof.public_key().encode(w)?;
                self.recipient.encode(w)?;
                w.write_u64(b"value", self.value)?;
                w.write_u64(b"fee", self.fee)?;
                w.write_u32(b"validity_start_height", self.validity_start_height)?;
                w.write_u8(b"network_id", self.network_id.0)?;
                match proof.signature() {
                    Some(signature) => signature.encode(w),
                    None => Ok(()),
                }
            }
            None => {
                self.content().encode(w)?;
                w.write_u16_prefixed(b"proof", &self.proof)
            }
        }
    }
}

impl ExactSizeEncodable for Transaction {
    fn encoded_length(&self) -> usize {
        1 + match &self.basic_proof {
            Some(proof) => {
                PublicKey::SIZE
                    + Address::SIZE
                    + 8
                    + 8
                    + 4
                    + 1
                    + proof.signature().map(|_| Signature::SIZE).unwrap_or(0)
            }
            None => self.content().encoded_length() + 2 + self.proof.len(),
        }
    }
}

/// Dispatches on the format byte. Basic transactions must be signed.
impl Decodable for Transaction {
    type Error = TransactionError;

    fn decode(r: &mut impl Reader) -> Result<Self, TransactionError> {
        match r.read_u8()? {
            0 => {
                let sender_public_key = PublicKey::decode(r)?;
                let recipient = Address::decode(r)?;
                let value = r.read_u64()?;
                let fee = r.read_u64()?;
                let validity_start_height = r.read_u32()?;
                let network_id = NetworkId(r.read_u8()?);
                let signature = Signature::decode(r)?;
                Transaction::new_basic(
                    sender_public_key,
                    recipient,
                    value,
                    fee,
                    validity_start_height,
                    Some(signature),
                    network_id,
                )
            }
            1 => {
                let data = r.read_u16_prefixed()?;
                let sender = Address::decode(r)?;
                let sender_type = AccountType(r.read_u8()?);
                let recipient = Address::decode(r)?;
                let recipient_type = AccountType(r.read_u8()?);
                let value = r.read_u64()?;
                let fee = r.read_u64()?;
                let validity_start_height = r.read_u32()?;
                let network_id = NetworkId(r.read_u8()?);
                let flags = r.read_u8()?;
                let flags =
                    TransactionFlags::from_bits(flags).ok_or(TransactionError::InvalidFlags(flags))?;
                let proof = r.read_u16_prefixed()?;
                Transaction::new_extended(
                    sender,
                    sender_type,
                    recipient,
                    recipient_type,
                    value,
                    fee,
                    validity_start_height,
                    flags,
                    data,
                    proof,
                    network_id,
                )
            }
            format => {
                debug!("unknown transaction format {}", format);
                Err(TransactionError::InvalidFormat(format))
            }
        }
    }
}
