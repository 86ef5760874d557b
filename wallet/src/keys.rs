use core::fmt;
use log::warn;
use merlin::Transcript;
use primitives::{Address, PrivateKey, PublicKey};
use rand_core::{CryptoRng, RngCore};
use readerwriter::{Decodable, Encodable, ExactSizeEncodable, Reader, WriteError, Writer};
use zeroize::Zeroize;

use super::WalletError;

/// Derives the one-time pad that masks a locked private key.
///
/// Password hashing belongs to the caller; implementations must be
/// deterministic in `key` and `salt`.
pub trait KeyDerivation {
    /// Fills `out` with key material derived from `key` and `salt`.
    fn derive(&self, key: &[u8], salt: &[u8], out: &mut [u8]);
}

/// Iterated Merlin transcript as a key derivation function.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TranscriptKdf {
    rounds: u32,
}

impl TranscriptKdf {
    /// Rounds used for locking key pairs.
    pub const DEFAULT_ROUNDS: u32 = 256;

    /// Creates a KDF with the given number of rounds.
    pub fn new(rounds: u32) -> Self {
        TranscriptKdf { rounds }
    }
}

impl Default for TranscriptKdf {
    fn default() -> Self {
        TranscriptKdf::new(Self::DEFAULT_ROUNDS)
    }
}

impl KeyDerivation for TranscriptKdf {
    fn derive(&self, key: &[u8], salt: &[u8], out: &mut [u8]) {
        let mut t = Transcript::new(b"Wallet.lock");
        t.append_message(b"salt", salt);
        t.append_message(b"key", key);
        t.append_u64(b"rounds", self.rounds as u64);

        let mut state = [0u8; 64];
        for _ in 0..self.rounds {
            t.challenge_bytes(b"round", &mut state);
            t.append_message(b"state", &state);
        }
        state.zeroize();

        t.challenge_bytes(b"pad", out);
    }
}

/// Unlocked private key with its public key.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
}

/// Key pair whose private key is masked with a pad derived from an unlock key.
/// It can only be used after [LockedKeyPair::unlock].
#[derive(Clone, PartialEq, Eq)]
pub struct LockedKeyPair {
    masked_private_key: [u8; 32],
    public_key: PublicKey,
    salt: [u8; 32],
}

/// A key pair as found in an exported wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoredKeyPair {
    /// Usable right away.
    Unlocked(KeyPair),
    /// Needs the unlock key.
    Locked(LockedKeyPair),
}

impl KeyPair {
    /// Size of the lock salt.
    pub const SALT_SIZE: usize = 32;

    /// Generates a fresh key pair.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        KeyPair::derive(PrivateKey::generate(rng))
    }

    /// Completes a private key with its public key.
    pub fn derive(private_key: PrivateKey) -> Self {
        let public_key = PublicKey::from_private(&private_key);
        KeyPair {
            private_key,
            public_key,
        }
    }

    /// The private key.
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// The public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Address owned by this key alone.
    pub fn address(&self) -> Address {
        self.public_key.to_address()
    }

    /// Masks the private key under `key` with a fresh random salt.
    pub fn lock<K, R>(self, kdf: &K, key: &[u8], rng: &mut R) -> LockedKeyPair
    where
        K: KeyDerivation + ?Sized,
        R: RngCore + CryptoRng,
    {
        let mut salt = [0u8; Self::SALT_SIZE];
        rng.fill_bytes(&mut salt);
        self.lock_with_salt(kdf, key, salt)
    }

    /// Masks the private key under `key` with the given salt.
    pub fn lock_with_salt<K>(self, kdf: &K, key: &[u8], salt: [u8; 32]) -> LockedKeyPair
    where
        K: KeyDerivation + ?Sized,
    {
        LockedKeyPair {
            masked_private_key: xor_pad(kdf, key, &salt, self.private_key.as_bytes()),
            public_key: self.public_key,
            salt,
        }
    }
}

impl LockedKeyPair {
    /// The public key, stored in the clear.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Salt of the pad.
    pub fn salt(&self) -> &[u8; 32] {
        &self.salt
    }

    /// Recovers the key pair. Fails unless the unmasked key matches the public key.
    pub fn unlock<K>(&self, kdf: &K, key: &[u8]) -> Result<KeyPair, WalletError>
    where
        K: KeyDerivation + ?Sized,
    {
        let mut bytes = xor_pad(kdf, key, &self.salt, &self.masked_private_key);
        let private_key = PrivateKey::from_bytes(&bytes);
        bytes.zeroize();
        let key_pair = KeyPair::derive(private_key?);
        if key_pair.public_key != self.public_key {
            warn!("unlock key does not match {:?}", self.public_key);
            return Err(WalletError::InvalidKey);
        }
        Ok(key_pair)
    }
}

impl StoredKeyPair {
    /// Public key, available in both states.
    pub fn public_key(&self) -> &PublicKey {
        match self {
            StoredKeyPair::Unlocked(kp) => kp.public_key(),
            StoredKeyPair::Locked(kp) => kp.public_key(),
        }
    }

    /// The key pair, if it is not locked.
    pub fn into_unlocked(self) -> Result<KeyPair, WalletError> {
        match self {
            StoredKeyPair::Unlocked(kp) => Ok(kp),
            StoredKeyPair::Locked(_) => Err(WalletError::Locked),
        }
    }
}

fn xor_pad<K>(kdf: &K, key: &[u8], salt: &[u8], input: &[u8; 32]) -> [u8; 32]
where
    K: KeyDerivation + ?Sized,
{
    let mut pad = [0u8; 32];
    kdf.derive(key, salt, &mut pad);
    let mut out = [0u8; 32];
    for ((o, i), p) in out.iter_mut().zip(input.iter()).zip(pad.iter()) {
        *o = i ^ p;
    }
    pad.zeroize();
    out
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair({:?})", self.public_key)
    }
}

impl fmt::Debug for LockedKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LockedKeyPair({:?})", self.public_key)
    }
}

impl Encodable for KeyPair {
    fn encode(&self, w: &mut impl Writer) -> Result<(), WriteError> {
        self.private_key.encode(w)?;
        self.public_key.encode(w)?;
        w.write_u8(b"locked", 0)
    }
}

impl ExactSizeEncodable for KeyPair {
    fn encoded_length(&self) -> usize {
        PrivateKey::SIZE + PublicKey::SIZE + 1
    }
}

impl Encodable for LockedKeyPair {
    fn encode(&self, w: &mut impl Writer) -> Result<(), WriteError> {
        w.write(b"locked_privkey", &self.masked_private_key)?;
        self.public_key.encode(w)?;
        w.write_u8(b"locked", 1)?;
        w.write(b"salt", &self.salt)
    }
}

impl ExactSizeEncodable for LockedKeyPair {
    fn encoded_length(&self) -> usize {
        PrivateKey::SIZE + PublicKey::SIZE + 1 + KeyPair::SALT_SIZE
    }
}

impl Encodable for StoredKeyPair {
    fn encode(&self, w: &mut impl Writer) -> Result<(), WriteError> {
        match self {
            StoredKeyPair::Unlocked(kp) => kp.encode(w),
            StoredKeyPair::Locked(kp) => kp.encode(w),
        }
    }
}

impl ExactSizeEncodable for StoredKeyPair {
    fn encoded_length(&self) -> usize {
        match self {
            StoredKeyPair::Unlocked(kp) => kp.encoded_length(),
            StoredKeyPair::Locked(kp) => kp.encoded_length(),
        }
    }
}

/// The lock flag may be omitted at the very end of the input.
impl Decodable for StoredKeyPair {
    type Error = WalletError;

    fn decode(r: &mut impl Reader) -> Result<Self, WalletError> {
        let mut private_key = r.read_u8x32()?;
        let public_key = PublicKey::decode(r)?;
        let locked = if r.remaining_bytes() == 0 {
            0
        } else {
            r.read_u8()?
        };
        let stored = match locked {
            0 => unlocked_pair(&private_key, public_key),
            1 => r.read_u8x32().map_err(WalletError::from).map(|salt| {
                StoredKeyPair::Locked(LockedKeyPair {
                    masked_private_key: private_key,
                    public_key,
                    salt,
                })
            }),
            _ => Err(WalletError::InvalidSeed),
        };
        private_key.zeroize();
        stored
    }
}

fn unlocked_pair(private_key: &[u8; 32], public_key: PublicKey) -> Result<StoredKeyPair, WalletError> {
    let key_pair = KeyPair::derive(PrivateKey::from_bytes(private_key)?);
    if key_pair.public_key != public_key {
        warn!("stored public key does not match the private key");
        return Err(WalletError::InvalidKey);
    }
    Ok(StoredKeyPair::Unlocked(key_pair))
}
