use log::debug;
use readerwriter::Decodable;
use serde::{Deserialize, Serialize};

use super::config::MAX_SAFE_VALUE;
use super::registry::{to_plain_object, AccountBehavior, PlainObject};
use super::{Account, AccountError, AccountType, SignatureProof, Transaction};

/// Account owned by a single key or a multi-key combination.
/// It can send all its funds and receive any transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BasicAccount {
    balance: u64,
}

/// Plain projection of a [BasicAccount].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlainBasicAccount {
    /// Balance in lunas.
    pub balance: u64,
}

impl BasicAccount {
    /// Creates an account with the given balance.
    pub fn new(balance: u64) -> Result<Self, AccountError> {
        if balance > MAX_SAFE_VALUE {
            return Err(AccountError::InvalidBalance(balance));
        }
        Ok(BasicAccount { balance })
    }

    /// Balance in lunas.
    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// An empty basic account is indistinguishable from an untouched address.
    pub fn is_initial(&self) -> bool {
        self.balance == 0
    }

    /// Plain projection.
    pub fn to_plain(&self) -> PlainBasicAccount {
        PlainBasicAccount {
            balance: self.balance,
        }
    }

    /// Rebuilds the account from its plain projection.
    pub fn from_plain(plain: &PlainBasicAccount) -> Result<Self, AccountError> {
        BasicAccount::new(plain.balance)
    }
}

/// Verification rules of basic accounts.
#[derive(Clone, Debug)]
pub struct BasicAccountBehavior {
    max_data_size: usize,
}

impl BasicAccountBehavior {
    /// Accepts incoming transactions with at most `max_data_size` bytes of data.
    pub fn new(max_data_size: usize) -> Self {
        BasicAccountBehavior { max_data_size }
    }
}

impl AccountBehavior for BasicAccountBehavior {
    fn account_type(&self) -> AccountType {
        AccountType::BASIC
    }

    fn create(
        &self,
        balance: u64,
        _block_height: u32,
        _transaction: &Transaction,
    ) -> Result<Account, AccountError> {
        Ok(Account::Basic(BasicAccount::new(balance)?))
    }

    fn verify_outgoing_transaction(&self, transaction: &Transaction) -> bool {
        SignatureProof::verify_transaction(transaction)
    }

    fn verify_incoming_transaction(&self, transaction: &Transaction) -> bool {
        if transaction.data().len() > self.max_data_size {
            debug!(
                "data of {} bytes exceeds {} bytes for a basic account",
                transaction.data().len(),
                self.max_data_size
            );
            return false;
        }
        true
    }

    fn proof_to_plain(&self, proof: &[u8]) -> PlainObject {
        match SignatureProof::decode_exact(proof) {
            Ok(p) => to_plain_object(&p.to_plain()),
            Err(_) => PlainObject::new(),
        }
    }
}
