use readerwriter::ReadError;
use thiserror::Error;

use super::HashAlgorithm;

/// Represents an error in constructing, decoding or computing a primitive.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum PrimitiveError {
    /// This error occurs when a byte string has the wrong size for its type
    #[error("Invalid length for {kind}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Name of the primitive being constructed
        kind: &'static str,
        /// Required number of bytes
        expected: usize,
        /// Number of bytes provided
        actual: usize,
    },

    /// This error occurs when a string is not valid hex
    #[error("Invalid hex encoding")]
    InvalidHex,

    /// This error occurs when a user-friendly address fails to parse
    #[error("Invalid address: {0}")]
    InvalidAddress(&'static str),

    /// This error occurs when an algorithm tag is not known
    #[error("Unknown hash algorithm {0}")]
    UnknownHashAlgorithm(u8),

    /// This error occurs when an algorithm name is not known
    #[error("Unknown hash algorithm name {0:?}")]
    UnknownHashAlgorithmName(String),

    /// This error occurs when the algorithm cannot be computed synchronously
    #[error("Hash algorithm {0} is not supported here")]
    UnsupportedHashAlgorithm(HashAlgorithm),

    /// This error occurs when a point is not a valid compressed Ristretto point
    #[error("Point decoding failed")]
    InvalidPoint,

    /// This error occurs when a signature does not verify
    #[error("Signature verification failed")]
    InvalidSignature,

    /// This error occurs when a scalar is not canonically encoded
    #[error("Scalar is not canonically encoded")]
    InvalidScalar,

    /// This error occurs when the input ends early or has trailing bytes
    #[error("Decoding failed: {0}")]
    Read(#[from] ReadError),
}
