#![deny(missing_docs)]
#![allow(non_snake_case)]
//! MuSig-style multi-party Schnorr signatures over Ristretto255.
//!
//! Keys are delinearized by `a_i = H(L, X_i)`, where `L` is the SHA-512 hash
//! of all participants' keys in byte order, so no participant can pick a key
//! that cancels the others out. A ceremony runs in two rounds: nonce
//! commitments are exchanged and summed, then every signer contributes a
//! partial signature over the aggregate commitment. The sum of the partial
//! signatures forms an ordinary [primitives::Signature] that verifies
//! against the aggregate public key.

mod aggregation;
mod commitment;
mod context;
mod counterparty;
mod errors;
mod signer;

#[cfg(test)]
mod tests;

pub use self::aggregation::{
    aggregate_commitments, aggregate_public_keys, combine_partial_signatures,
    create_partial_signature,
};
pub use self::commitment::CommitmentPair;
pub use self::context::Multikey;
pub use self::errors::MusigError;
pub use self::signer::{Party, PartyAwaitingCommitments, PartyAwaitingShares};
