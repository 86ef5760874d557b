//! Account authorization: who may move funds out of an address, and under
//! which conditions an address accepts funds.
//!
//! Three account types are built in. A [BasicAccount] is owned by a single
//! key or by a k-of-n multi-key combination and authorizes transfers with a
//! [SignatureProof]. A [VestingContract] releases funds to its owner in
//! steps over block height. A [HashedTimeLockedContract] releases funds to
//! its recipient against a hash pre-image, or back to its sender after a
//! timeout.
//!
//! Types are looked up in an [AccountRegistry], so new contract types can be
//! added without touching [Transaction] verification.

mod account;
mod basic;
pub mod config;
mod contract;
mod errors;
mod htlc;
mod registry;
mod signature_proof;
mod transaction;
mod vesting;


pub use self::account::{Account, AccountType, PlainAccount};
pub use self::basic::{BasicAccount, BasicAccountBehavior, PlainBasicAccount};
pub use self::config::{Config, NetworkId, Policy};
pub use self::errors::{AccountError, TransactionError};
pub use self::htlc::{
    HashedTimeLockedContract, HtlcBehavior, HtlcCreationData, HtlcProof, HtlcProofType,
    PlainHashedTimeLockedContract,
};
pub use self::registry::{
    to_plain_object, AccountBehavior, AccountRegistry, AccountRegistryBuilder, PlainObject,
};
pub use self::signature_proof::{PlainSignatureProof, SignatureProof};
pub use self::transaction::{PlainTransaction, Transaction, TransactionFlags, TransactionFormat};
pub use self::vesting::{
    PlainVestingContract, VestingContract, VestingContractBehavior, VestingCreationData,
};
