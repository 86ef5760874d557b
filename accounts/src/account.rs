use core::fmt;
use core::str::FromStr;
use log::debug;
use readerwriter::{Decodable, Encodable, ExactSizeEncodable, Reader, WriteError, Writer};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::config::{Policy, MAX_SAFE_VALUE};
use super::{
    contract, AccountError, AccountRegistry, BasicAccount, HashedTimeLockedContract,
    PlainBasicAccount, PlainHashedTimeLockedContract, PlainVestingContract, Transaction,
    TransactionFlags, VestingContract,
};

/// Numeric account type tag. Zero is the basic account; non-zero values are contracts.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AccountType(pub u8);

impl AccountType {
    /// Basic account.
    pub const BASIC: AccountType = AccountType(0);
    /// Vesting contract.
    pub const VESTING: AccountType = AccountType(1);
    /// Hashed time-locked contract.
    pub const HTLC: AccountType = AccountType(2);

    /// Name of a built-in type.
    pub fn name(self) -> Option<&'static str> {
        match self {
            AccountType::BASIC => Some("basic"),
            AccountType::VESTING => Some("vesting"),
            AccountType::HTLC => Some("htlc"),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

impl fmt::Debug for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountType({})", self)
    }
}

/// Parses a built-in type name or a numeric tag.
impl FromStr for AccountType {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, AccountError> {
        match s {
            "basic" => Ok(AccountType::BASIC),
            "vesting" => Ok(AccountType::VESTING),
            "htlc" => Ok(AccountType::HTLC),
            _ => s
                .parse::<u8>()
                .map(AccountType)
                .map_err(|_| AccountError::Plain(format!("invalid account type {:?}", s))),
        }
    }
}

impl Serialize for AccountType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AccountType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Account state. Every transition returns a new value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Account {
    /// Plain key-owned account.
    Basic(BasicAccount),
    /// Funds unlocked step by step over blocks.
    Vesting(VestingContract),
    /// Funds released by a hash preimage or on timeout.
    Htlc(HashedTimeLockedContract),
}

/// Plain projection of an [Account], tagged by its type name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlainAccount {
    /// Basic account.
    Basic(PlainBasicAccount),
    /// Vesting contract.
    Vesting(PlainVestingContract),
    /// Hashed time-locked contract.
    Htlc(PlainHashedTimeLockedContract),
}

impl Account {
    /// The state of every address that has never been touched.
    pub fn initial() -> Self {
        Account::Basic(BasicAccount::default())
    }

    /// Type tag.
    pub fn account_type(&self) -> AccountType {
        match self {
            Account::Basic(_) => AccountType::BASIC,
            Account::Vesting(_) => AccountType::VESTING,
            Account::Htlc(_) => AccountType::HTLC,
        }
    }

    /// Balance in lunas.
    pub fn balance(&self) -> u64 {
        match self {
            Account::Basic(a) => a.balance(),
            Account::Vesting(c) => c.balance(),
            Account::Htlc(c) => c.balance(),
        }
    }

    /// Same account with another balance.
    pub fn with_balance(&self, balance: u64) -> Result<Account, AccountError> {
        if balance > MAX_SAFE_VALUE {
            return Err(AccountError::InvalidBalance(balance));
        }
        Ok(match self {
            Account::Basic(_) => Account::Basic(BasicAccount::new(balance)?),
            Account::Vesting(c) => Account::Vesting(c.with_balance(balance)),
            Account::Htlc(c) => Account::Htlc(c.with_balance(balance)),
        })
    }

    /// Applies (or reverts) a transaction received by this account.
    pub fn with_incoming_transaction(
        &self,
        transaction: &Transaction,
        _block_height: u32,
        revert: bool,
    ) -> Result<Account, AccountError> {
        match self {
            Account::Basic(_) => {
                if !revert {
                    let is_contract_creation =
                        transaction.has_flag(TransactionFlags::CONTRACT_CREATION);
                    let is_type_change = transaction.recipient_type() != AccountType::BASIC;
                    if is_contract_creation != is_type_change {
                        debug!("contract creation flag does not match recipient type");
                        return Err(AccountError::InvalidData(
                            "contract creation flag does not match recipient type",
                        ));
                    }
                }
                self.add_incoming_value(transaction, revert)
            }
            Account::Vesting(_) | Account::Htlc(_) => Err(AccountError::IllegalIncomingTransaction),
        }
    }

    fn add_incoming_value(
        &self,
        transaction: &Transaction,
        revert: bool,
    ) -> Result<Account, AccountError> {
        let balance = if !revert {
            self.balance().checked_add(transaction.value())
        } else {
            self.balance().checked_sub(transaction.value())
        };
        self.with_balance(balance.ok_or(AccountError::BalanceError)?)
    }

    /// Applies (or reverts) a transaction sent from this account at `block_height`.
    /// The caller verifies the transaction beforehand; this checks the state-dependent rules.
    pub fn with_outgoing_transaction(
        &self,
        transaction: &Transaction,
        block_height: u32,
        revert: bool,
        policy: &Policy,
    ) -> Result<Account, AccountError> {
        if !policy.is_within_validity_window(transaction.validity_start_height(), block_height) {
            debug!(
                "block height {} outside the validity window of {}",
                block_height,
                transaction.hash().to_hex()
            );
            return Err(AccountError::ValidityError);
        }

        let cost = transaction
            .value()
            .checked_add(transaction.fee())
            .ok_or(AccountError::BalanceError)?;

        if revert {
            let balance = self
                .balance()
                .checked_add(cost)
                .ok_or(AccountError::BalanceError)?;
            return self.with_balance(balance);
        }

        let min_cap = match self {
            Account::Basic(_) => 0,
            Account::Vesting(c) => c.check_outgoing_transaction(transaction, block_height)?,
            Account::Htlc(c) => c.check_outgoing_transaction(transaction, block_height)?,
        };

        let balance = self
            .balance()
            .checked_sub(cost)
            .ok_or(AccountError::BalanceError)?;
        if balance < min_cap {
            debug!("balance {} would fall below the locked {}", balance, min_cap);
            return Err(AccountError::BalanceError);
        }
        self.with_balance(balance)
    }

    /// Creates a contract from its creation transaction, or reverts one to a basic account.
    pub fn with_contract_command(
        &self,
        transaction: &Transaction,
        block_height: u32,
        revert: bool,
        registry: &AccountRegistry,
    ) -> Result<Account, AccountError> {
        let is_contract_creation = transaction.has_flag(TransactionFlags::CONTRACT_CREATION);
        match self {
            Account::Basic(a) => {
                let recipient_type = transaction.recipient_type();
                if !revert && is_contract_creation && recipient_type != AccountType::BASIC {
                    let behavior = registry
                        .get(recipient_type)
                        .ok_or(AccountError::UnknownAccountType(recipient_type.0))?;
                    return behavior.create(a.balance(), block_height, transaction);
                }
                Ok(self.clone())
            }
            Account::Vesting(_) | Account::Htlc(_) => {
                contract::with_contract_command(self, is_contract_creation, revert)
            }
        }
    }

    /// True for a basic account with no funds.
    pub fn is_initial(&self) -> bool {
        match self {
            Account::Basic(a) => a.is_initial(),
            _ => false,
        }
    }

    /// True for an emptied contract.
    pub fn is_to_be_pruned(&self) -> bool {
        self.balance() == 0 && !self.is_initial()
    }

    /// Plain projection.
    pub fn to_plain(&self) -> PlainAccount {
        match self {
            Account::Basic(a) => PlainAccount::Basic(a.to_plain()),
            Account::Vesting(c) => PlainAccount::Vesting(c.to_plain()),
            Account::Htlc(c) => PlainAccount::Htlc(c.to_plain()),
        }
    }

    /// Rebuilds an account from its plain projection.
    pub fn from_plain(plain: &PlainAccount) -> Result<Account, AccountError> {
        Ok(match plain {
            PlainAccount::Basic(p) => Account::Basic(BasicAccount::from_plain(p)?),
            PlainAccount::Vesting(p) => Account::Vesting(VestingContract::from_plain(p)?),
            PlainAccount::Htlc(p) => Account::Htlc(HashedTimeLockedContract::from_plain(p)?),
        })
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Account{{type={}, balance={}}}", self.account_type(), self.balance())
    }
}

impl Encodable for Account {
    fn encode(&self, w: &mut impl Writer) -> Result<(), WriteError> {
        w.write_u8(b"type", self.account_type().0)?;
        w.write_u64(b"balance", self.balance())?;
        match self {
            Account::Basic(_) => Ok(()),
            Account::Vesting(c) => c.encode_fields(w),
            Account::Htlc(c) => c.encode_fields(w),
        }
    }
}

impl ExactSizeEncodable for Account {
    fn encoded_length(&self) -> usize {
        1 + 8
            + match self {
                Account::Basic(_) => 0,
                Account::Vesting(c) => c.fields_length(),
                Account::Htlc(c) => c.fields_length(),
            }
    }
}

/// Dispatches on the type tag.
impl Decodable for Account {
    type Error = AccountError;

    fn decode(r: &mut impl Reader) -> Result<Self, AccountError> {
        let account_type = AccountType(r.read_u8()?);
        let balance = r.read_u64()?;
        if balance > MAX_SAFE_VALUE {
            return Err(AccountError::InvalidBalance(balance));
        }
        match account_type {
            AccountType::BASIC => Ok(Account::Basic(BasicAccount::new(balance)?)),
            AccountType::VESTING => Ok(Account::Vesting(VestingContract::decode_fields(
                r, balance,
            )?)),
            AccountType::HTLC => Ok(Account::Htlc(HashedTimeLockedContract::decode_fields(
                r, balance,
            )?)),
            other => Err(AccountError::UnknownAccountType(other.0)),
        }
    }
}
