use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha512};

use super::PrimitiveError;

type Blake2b256 = Blake2b<U32>;

const MAX_HASH_SIZE: usize = 64;

/// Hash function identified by a one-byte tag on the wire.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum HashAlgorithm {
    /// BLAKE2b with a 32-byte digest, also known as the "light" hash.
    Blake2b = 1,
    /// Argon2d with a 32-byte digest. Never computed by this crate.
    Argon2d = 2,
    /// SHA-256.
    Sha256 = 3,
    /// SHA-512.
    Sha512 = 4,
}

impl HashAlgorithm {
    /// Size of the digest in bytes.
    pub fn size(self) -> usize {
        match self {
            HashAlgorithm::Blake2b | HashAlgorithm::Argon2d | HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Parses the wire tag.
    pub fn from_u8(tag: u8) -> Result<Self, PrimitiveError> {
        match tag {
            1 => Ok(HashAlgorithm::Blake2b),
            2 => Ok(HashAlgorithm::Argon2d),
            3 => Ok(HashAlgorithm::Sha256),
            4 => Ok(HashAlgorithm::Sha512),
            other => Err(PrimitiveError::UnknownHashAlgorithm(other)),
        }
    }

    /// Returns the wire tag.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Lowercase name used in plain projections.
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Blake2b => "blake2b",
            HashAlgorithm::Argon2d => "argon2d",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blake2b" => Ok(HashAlgorithm::Blake2b),
            "argon2d" => Ok(HashAlgorithm::Argon2d),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha512" => Ok(HashAlgorithm::Sha512),
            other => Err(PrimitiveError::UnknownHashAlgorithmName(other.to_string())),
        }
    }
}

/// A digest tagged with the algorithm that produced it.
/// Two hashes are equal only if both the algorithm and the bytes match.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Hash {
    algorithm: HashAlgorithm,
    bytes: [u8; MAX_HASH_SIZE],
}

impl Hash {
    /// Wraps a digest, checking its length against the algorithm.
    pub fn from_bytes(bytes: &[u8], algorithm: HashAlgorithm) -> Result<Self, PrimitiveError> {
        let size = algorithm.size();
        if bytes.len() != size {
            return Err(PrimitiveError::InvalidLength {
                kind: "Hash",
                expected: size,
                actual: bytes.len(),
            });
        }
        let mut buf = [0u8; MAX_HASH_SIZE];
        buf[..size].copy_from_slice(bytes);
        Ok(Hash {
            algorithm,
            bytes: buf,
        })
    }

    /// The all-zero digest of the given algorithm.
    pub fn null(algorithm: HashAlgorithm) -> Self {
        Hash {
            algorithm,
            bytes: [0u8; MAX_HASH_SIZE],
        }
    }

    /// BLAKE2b-256, the hash used for addresses, Merkle nodes and transaction ids.
    pub fn blake2b(data: &[u8]) -> Self {
        Self::wrap(&Blake2b256::digest(data), HashAlgorithm::Blake2b)
    }

    /// SHA-256.
    pub fn sha256(data: &[u8]) -> Self {
        Self::wrap(&Sha256::digest(data), HashAlgorithm::Sha256)
    }

    /// SHA-512.
    pub fn sha512(data: &[u8]) -> Self {
        Self::wrap(&Sha512::digest(data), HashAlgorithm::Sha512)
    }

    /// Computes a hash-chain step with one of the algorithms allowed in contracts.
    /// Argon2d is rejected.
    pub fn compute(data: &[u8], algorithm: HashAlgorithm) -> Result<Self, PrimitiveError> {
        match algorithm {
            HashAlgorithm::Blake2b => Ok(Self::blake2b(data)),
            HashAlgorithm::Sha256 => Ok(Self::sha256(data)),
            HashAlgorithm::Sha512 => Ok(Self::sha512(data)),
            other => Err(PrimitiveError::UnsupportedHashAlgorithm(other)),
        }
    }

    /// Parses a hex-encoded digest of the given algorithm.
    pub fn from_hex(hex_str: &str, algorithm: HashAlgorithm) -> Result<Self, PrimitiveError> {
        let bytes = hex::decode(hex_str).map_err(|_| PrimitiveError::InvalidHex)?;
        Self::from_bytes(&bytes, algorithm)
    }

    /// Algorithm that produced this digest.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Digest bytes, 32 or 64 long.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.algorithm.size()]
    }

    /// Hex encoding of the digest bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    fn wrap(digest: &[u8], algorithm: HashAlgorithm) -> Self {
        let mut buf = [0u8; MAX_HASH_SIZE];
        buf[..digest.len()].copy_from_slice(digest);
        Hash {
            algorithm,
            bytes: buf,
        }
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({}:{})", self.algorithm, self.to_hex())
    }
}
