use merkle::MerkleError;
use primitives::PrimitiveError;
use readerwriter::ReadError;
use thiserror::Error;

/// Errors from account construction and state transitions.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum AccountError {
    /// The transition would make the balance negative or break a lock.
    #[error("Balance error")]
    BalanceError,

    /// Balances are limited to 2^53-1 lunas.
    #[error("Balance {0} exceeds the maximum")]
    InvalidBalance(u64),

    /// The block height is outside the transaction's validity window.
    #[error("Transaction is not valid at this block height")]
    ValidityError,

    /// A signature, hash-chain or timeout requirement was not met.
    #[error("Proof error: {0}")]
    ProofError(&'static str),

    /// Contracts accept no funds after creation.
    #[error("Illegal incoming transaction")]
    IllegalIncomingTransaction,

    /// No behavior is registered for the account type.
    #[error("Unknown account type {0}")]
    UnknownAccountType(u8),

    /// The account type does not support this operation.
    #[error("Operation not supported by account type {0}")]
    UnsupportedOperation(u8),

    /// Malformed contract parameters.
    #[error("Invalid contract data: {0}")]
    InvalidData(&'static str),

    /// Malformed primitive value.
    #[error("Primitive error: {0}")]
    Primitive(#[from] PrimitiveError),

    /// Malformed signer path.
    #[error("Merkle path error: {0}")]
    Merkle(#[from] MerkleError),

    /// Truncated or overlong encoding.
    #[error("Encoding error: {0}")]
    Read(#[from] ReadError),

    /// Malformed plain (JSON) representation.
    #[error("Invalid plain representation: {0}")]
    Plain(String),
}

/// Errors from transaction construction and decoding.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum TransactionError {
    /// Value must be non-zero and at most 2^53-1.
    #[error("Malformed value {0}")]
    InvalidValue(u64),

    /// Fee must be at most 2^53-1.
    #[error("Malformed fee {0}")]
    InvalidFee(u64),

    /// Data must fit a 16-bit length prefix.
    #[error("Data too long: {0} bytes")]
    DataTooLong(usize),

    /// Proof must fit a 16-bit length prefix.
    #[error("Proof too long: {0} bytes")]
    ProofTooLong(usize),

    /// Sender and recipient must differ.
    #[error("Sender is the recipient")]
    SenderIsRecipient,

    /// Only the contract-creation flag is defined.
    #[error("Malformed flags {0:#010b}")]
    InvalidFlags(u8),

    /// Unknown format byte.
    #[error("Invalid transaction format {0}")]
    InvalidFormat(u8),

    /// Basic transactions carry only a single-signature proof of the sender key.
    #[error("Proof does not fit a basic transaction")]
    InvalidBasicProof,

    /// Unknown network name in a plain representation or config.
    #[error("Unknown network {0}")]
    UnknownNetwork(String),

    /// Malformed primitive value.
    #[error("Primitive error: {0}")]
    Primitive(#[from] PrimitiveError),

    /// Malformed proof structure.
    #[error("Merkle path error: {0}")]
    Merkle(#[from] MerkleError),

    /// Truncated or overlong encoding.
    #[error("Encoding error: {0}")]
    Read(#[from] ReadError),

    /// Account-level failure while building a projection.
    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    /// Malformed plain (JSON) representation.
    #[error("Invalid plain representation: {0}")]
    Plain(String),
}
