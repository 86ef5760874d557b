#![deny(missing_docs)]
//! Wallets: key pairs, single-key wallets and k-of-n multi-signature wallets
//! that build and sign [accounts::Transaction]s.
//!
//! A [KeyPair] is either usable or locked. Locking consumes the pair and
//! yields a [LockedKeyPair] that holds the private key masked with a pad from
//! a [KeyDerivation]; unlocking returns a fresh [KeyPair] only if the unmasked
//! key reproduces the public key.

mod errors;
mod keys;
mod multisig;
mod wallet;

#[cfg(test)]
mod tests;

pub use self::errors::WalletError;
pub use self::keys::{KeyDerivation, KeyPair, LockedKeyPair, StoredKeyPair, TranscriptKdf};
pub use self::multisig::MultiSigWallet;
pub use self::wallet::Wallet;
