use accounts::{AccountError, TransactionError};
use musig::MusigError;
use primitives::PrimitiveError;
use readerwriter::ReadError;
use thiserror::Error;

/// Errors from wallet construction, key locking and signing.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum WalletError {
    /// A multi-signature wallet needs at least one key.
    #[error("Public keys may not be empty")]
    NoPublicKeys,

    /// The threshold must be between 1 and the number of keys.
    #[error("Invalid threshold {min_signatures} for {keys} keys")]
    InvalidThreshold {
        /// Requested number of signatures
        min_signatures: usize,
        /// Number of participant keys
        keys: usize,
    },

    /// The wallet's own key is not among the participants.
    #[error("Own public key must be part of the public keys")]
    NotAParticipant,

    /// Combining requires exactly the threshold number of partial signatures.
    #[error("Expected {expected} partial signatures, got {actual}")]
    WrongNumberOfPartialSignatures {
        /// The wallet's threshold
        expected: usize,
        /// Number of partial signatures provided
        actual: usize,
    },

    /// Export format limits the number of candidate keys to 255.
    #[error("{0} signer combinations exceed the limit of 255")]
    TooManyCombinations(usize),

    /// The combined signature does not verify against the aggregate key.
    #[error("Combined signature is invalid")]
    InvalidSignature,

    /// The unlock key does not reproduce the stored public key.
    #[error("Invalid unlock key")]
    InvalidKey,

    /// The stored key pair is locked and must be unlocked first.
    #[error("Key pair is locked")]
    Locked,

    /// Empty or malformed exported wallet.
    #[error("Invalid wallet seed")]
    InvalidSeed,

    /// Malformed primitive value.
    #[error("Primitive error: {0}")]
    Primitive(#[from] PrimitiveError),

    /// Multi-party signing failed.
    #[error("Musig error: {0}")]
    Musig(#[from] MusigError),

    /// Proof construction failed.
    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    /// Transaction construction failed.
    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),

    /// Truncated exported wallet.
    #[error("Encoding error: {0}")]
    Read(#[from] ReadError),
}
