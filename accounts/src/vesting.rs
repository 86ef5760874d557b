use log::{debug, warn};
use primitives::Address;
use readerwriter::{Decodable, Encodable, ExactSizeEncodable, Reader, WriteError, Writer};
use serde::{Deserialize, Serialize};

use super::config::MAX_SAFE_VALUE;
use super::contract;
use super::registry::{to_plain_object, AccountBehavior, PlainObject};
use super::{Account, AccountError, AccountType, SignatureProof, Transaction};

/// Contract releasing `vesting_step_amount` lunas to its owner every
/// `vesting_step_blocks` blocks after `vesting_start`, until
/// `vesting_total_amount` is vested.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VestingContract {
    balance: u64,
    owner: Address,
    vesting_start: u32,
    vesting_step_blocks: u32,
    vesting_step_amount: u64,
    vesting_total_amount: u64,
}

/// Plain projection of a [VestingContract].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainVestingContract {
    pub balance: u64,
    pub owner: Address,
    pub vesting_start: u32,
    pub vesting_step_blocks: u32,
    pub vesting_step_amount: u64,
    pub vesting_total_amount: u64,
}

/// Parameters carried in the data of a vesting contract's creating transaction.
/// The shortest form vests everything at once after `vesting_step_blocks`;
/// omitted amounts default to the transaction value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VestingCreationData {
    pub owner: Address,
    pub vesting_start: u32,
    pub vesting_step_blocks: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vesting_step_amount: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vesting_total_amount: Option<u64>,
}

impl VestingCreationData {
    /// Owner and step blocks.
    pub const SHORT_SIZE: usize = Address::SIZE + 4;
    /// Owner, start, step blocks and step amount.
    pub const MEDIUM_SIZE: usize = Address::SIZE + 16;
    /// All parameters.
    pub const FULL_SIZE: usize = Address::SIZE + 24;

    /// Parses one of the three accepted encodings.
    pub fn parse(data: &[u8]) -> Result<Self, AccountError> {
        let mut r = data;
        let owner = Address::decode(&mut r)?;
        let parsed = match data.len() {
            Self::SHORT_SIZE => VestingCreationData {
                owner,
                vesting_start: 0,
                vesting_step_blocks: r.read_u32()?,
                vesting_step_amount: None,
                vesting_total_amount: None,
            },
            Self::MEDIUM_SIZE => VestingCreationData {
                owner,
                vesting_start: r.read_u32()?,
                vesting_step_blocks: r.read_u32()?,
                vesting_step_amount: Some(r.read_u64()?),
                vesting_total_amount: None,
            },
            Self::FULL_SIZE => VestingCreationData {
                owner,
                vesting_start: r.read_u32()?,
                vesting_step_blocks: r.read_u32()?,
                vesting_step_amount: Some(r.read_u64()?),
                vesting_total_amount: Some(r.read_u64()?),
            },
            _ => return Err(AccountError::InvalidData("vesting data length")),
        };
        Ok(parsed)
    }

    /// Encodes the parameters in the shortest form that carries them.
    /// A start or total amount without a step amount is not representable.
    pub fn to_bytes(&self) -> Result<Vec<u8>, AccountError> {
        if self.vesting_step_amount.is_none()
            && (self.vesting_start != 0 || self.vesting_total_amount.is_some())
        {
            return Err(AccountError::InvalidData("vesting parameters"));
        }
        Ok(self.encode_to_vec())
    }
}

impl Encodable for VestingCreationData {
    fn encode(&self, w: &mut impl Writer) -> Result<(), WriteError> {
        self.owner.encode(w)?;
        match self.vesting_step_amount {
            None => w.write_u32(b"vesting_step_blocks", self.vesting_step_blocks),
            Some(step_amount) => {
                w.write_u32(b"vesting_start", self.vesting_start)?;
                w.write_u32(b"vesting_step_blocks", self.vesting_step_blocks)?;
                w.write_u64(b"vesting_step_amount", step_amount)?;
                match self.vesting_total_amount {
                    Some(total_amount) => w.write_u64(b"vesting_total_amount", total_amount),
                    None => Ok(()),
                }
            }
        }
    }
}

impl ExactSizeEncodable for VestingCreationData {
    fn encoded_length(&self) -> usize {
        match (self.vesting_step_amount, self.vesting_total_amount) {
            (None, _) => Self::SHORT_SIZE,
            (Some(_), None) => Self::MEDIUM_SIZE,
            (Some(_), Some(_)) => Self::FULL_SIZE,
        }
    }
}

impl VestingContract {
    /// Creates a vesting contract.
    pub fn new(
        balance: u64,
        owner: Address,
        vesting_start: u32,
        vesting_step_blocks: u32,
        vesting_step_amount: u64,
        vesting_total_amount: u64,
    ) -> Result<Self, AccountError> {
        if balance > MAX_SAFE_VALUE {
            return Err(AccountError::InvalidBalance(balance));
        }
        Ok(VestingContract {
            balance,
            owner,
            vesting_start,
            vesting_step_blocks,
            vesting_step_amount,
            vesting_total_amount,
        })
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn vesting_start(&self) -> u32 {
        self.vesting_start
    }

    pub fn vesting_step_blocks(&self) -> u32 {
        self.vesting_step_blocks
    }

    pub fn vesting_step_amount(&self) -> u64 {
        self.vesting_step_amount
    }

    pub fn vesting_total_amount(&self) -> u64 {
        self.vesting_total_amount
    }

    pub(crate) fn with_balance(&self, balance: u64) -> Self {
        VestingContract {
            balance,
            ..self.clone()
        }
    }

    /// Amount still locked at `block_height`. Before `vesting_start` everything is locked.
    pub fn min_cap(&self, block_height: u32) -> u64 {
        if self.vesting_step_blocks == 0 || self.vesting_step_amount == 0 {
            return 0;
        }
        let steps = block_height.saturating_sub(self.vesting_start) / self.vesting_step_blocks;
        let vested = (steps as u64).saturating_mul(self.vesting_step_amount);
        self.vesting_total_amount.saturating_sub(vested)
    }

    /// Checks the owner's authorization and returns the amount that must stay locked.
    pub(crate) fn check_outgoing_transaction(
        &self,
        transaction: &Transaction,
        block_height: u32,
    ) -> Result<u64, AccountError> {
        let proof = SignatureProof::decode_exact(transaction.proof())?;
        if !proof.is_signed_by(&self.owner) {
            return Err(AccountError::ProofError("not signed by the vesting owner"));
        }
        Ok(self.min_cap(block_height))
    }

    /// Plain projection.
    pub fn to_plain(&self) -> PlainVestingContract {
        PlainVestingContract {
            balance: self.balance,
            owner: self.owner,
            vesting_start: self.vesting_start,
            vesting_step_blocks: self.vesting_step_blocks,
            vesting_step_amount: self.vesting_step_amount,
            vesting_total_amount: self.vesting_total_amount,
        }
    }

    /// Rebuilds the contract from its plain projection.
    pub fn from_plain(plain: &PlainVestingContract) -> Result<Self, AccountError> {
        VestingContract::new(
            plain.balance,
            plain.owner,
            plain.vesting_start,
            plain.vesting_step_blocks,
            plain.vesting_step_amount,
            plain.vesting_total_amount,
        )
    }

    pub(crate) fn encode_fields(&self, w: &mut impl Writer) -> Result<(), WriteError> {
        self.owner.encode(w)?;
        w.write_u32(b"vesting_start", self.vesting_start)?;
        w.write_u32(b"vesting_step_blocks", self.vesting_step_blocks)?;
        w.write_u64(b"vesting_step_amount", self.vesting_step_amount)?;
        w.write_u64(b"vesting_total_amount", self.vesting_total_amount)
    }

    pub(crate) fn fields_length(&self) -> usize {
        Address::SIZE + 4 + 4 + 8 + 8
    }

    pub(crate) fn decode_fields(r: &mut impl Reader, balance: u64) -> Result<Self, AccountError> {
        let owner = Address::decode(r)?;
        let vesting_start = r.read_u32()?;
        let vesting_step_blocks = r.read_u32()?;
        let vesting_step_amount = r.read_u64()?;
        let vesting_total_amount = r.read_u64()?;
        VestingContract::new(
            balance,
            owner,
            vesting_start,
            vesting_step_blocks,
            vesting_step_amount,
            vesting_total_amount,
        )
    }
}

/// Verification rules of vesting contracts.
#[derive(Clone, Debug, Default)]
pub struct VestingContractBehavior;

impl AccountBehavior for VestingContractBehavior {
    fn account_type(&self) -> AccountType {
        AccountType::VESTING
    }

    fn create(
        &self,
        balance: u64,
        _block_height: u32,
        transaction: &Transaction,
    ) -> Result<Account, AccountError> {
        let data = VestingCreationData::parse(transaction.data())?;
        let total_amount = data.vesting_total_amount.unwrap_or(transaction.value());
        let step_amount = data.vesting_step_amount.unwrap_or(total_amount);
        Ok(Account::Vesting(VestingContract::new(
            balance,
            data.owner,
            data.vesting_start,
            data.vesting_step_blocks,
            step_amount,
            total_amount,
        )?))
    }

    fn verify_outgoing_transaction(&self, transaction: &Transaction) -> bool {
        match SignatureProof::decode_exact(transaction.proof()) {
            Ok(proof) => proof.verify(None, &transaction.serialize_content()),
            Err(e) => {
                warn!("Invalid vesting proof: {}", e);
                false
            }
        }
    }

    fn verify_incoming_transaction(&self, transaction: &Transaction) -> bool {
        match transaction.data().len() {
            VestingCreationData::SHORT_SIZE
            | VestingCreationData::MEDIUM_SIZE
            | VestingCreationData::FULL_SIZE => contract::verify_incoming_transaction(transaction),
            len => {
                debug!("invalid vesting data length {}", len);
                false
            }
        }
    }

    fn data_to_plain(&self, data: &[u8]) -> PlainObject {
        match VestingCreationData::parse(data) {
            Ok(d) => to_plain_object(&d),
            Err(_) => PlainObject::new(),
        }
    }

    fn proof_to_plain(&self, proof: &[u8]) -> PlainObject {
        match SignatureProof::decode_exact(proof) {
            Ok(p) => to_plain_object(&p.to_plain()),
            Err(_) => PlainObject::new(),
        }
    }
}
