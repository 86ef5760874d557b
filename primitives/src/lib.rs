#![deny(missing_docs)]
#![allow(non_snake_case)]
//! Fixed-size primitives for account authorization: addresses, hashes,
//! Ristretto255 keys and Schnorr signatures.

mod address;
mod commitment;
mod errors;
mod hash;
mod keys;
mod serialization;
mod signature;
mod transcript;

#[cfg(test)]
mod tests;

pub use self::address::Address;
pub use self::commitment::{Commitment, PartialSignature, RandomSecret};
pub use self::errors::PrimitiveError;
pub use self::hash::{Hash, HashAlgorithm};
pub use self::keys::{PrivateKey, PublicKey};
pub use self::signature::Signature;
pub use self::transcript::TranscriptProtocol;
