use primitives::PrimitiveError;
use readerwriter::ReadError;
use thiserror::Error;

/// Represents an error in key aggregation, signing, or verification.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum MusigError {
    /// This error occurs when a point is not a valid compressed Ristretto point
    #[error("Point decoding failed")]
    InvalidPoint,

    /// This error occurs when a scalar is not canonically encoded
    #[error("Scalar is not canonically encoded")]
    InvalidScalar,

    /// This error occurs when a signature share fails to verify
    #[error("Share #{pubkey:?} failed to verify correctly")]
    ShareError {
        /// The pubkey corresponding to the share that failed fo verify correctly
        pubkey: [u8; 32],
    },

    /// This error occurs when a signer's key is not part of the signer set
    #[error("Public key is not part of the signer set")]
    SignerNotInSet,

    /// This error occurs when the number of partial signatures does not match the threshold
    #[error("Expected {expected} partial signatures, got {actual}")]
    WrongNumberOfPartialSignatures {
        /// Required number of partial signatures
        expected: usize,
        /// Number of partial signatures provided
        actual: usize,
    },

    /// This error occurs when an encoded value is truncated or has trailing bytes
    #[error("Encoding error: {0}")]
    Read(#[from] ReadError),

    /// This error occurs when a function is called with bad arguments.
    #[error("Bad arguments")]
    BadArguments,
}

impl From<PrimitiveError> for MusigError {
    fn from(e: PrimitiveError) -> Self {
        match e {
            PrimitiveError::InvalidScalar => MusigError::InvalidScalar,
            PrimitiveError::InvalidPoint => MusigError::InvalidPoint,
            PrimitiveError::Read(e) => MusigError::Read(e),
            _ => MusigError::BadArguments,
        }
    }
}
