use rand::SeedableRng;
use rand_chacha::ChaChaRng;

use accounts::{AccountRegistry, NetworkId};
use primitives::{PrivateKey, PublicKey};
use readerwriter::{Decodable, ExactSizeEncodable};

use crate::*;

fn kdf() -> TranscriptKdf {
    TranscriptKdf::new(4)
}

fn key_pair(seed: u8) -> KeyPair {
    KeyPair::generate(&mut ChaChaRng::from_seed([seed; 32]))
}

#[test]
fn key_pair_derivation() {
    let kp = key_pair(1);
    let derived = KeyPair::derive(kp.private_key().clone());
    assert_eq!(derived, kp);
    assert_eq!(kp.address(), kp.public_key().to_address());
    assert_ne!(key_pair(2), kp);
}

#[test]
fn lock_and_unlock() {
    let mut rng = ChaChaRng::from_seed([9u8; 32]);
    let kp = key_pair(1);
    let locked = kp.clone().lock(&kdf(), b"password", &mut rng);
    assert_eq!(locked.public_key(), kp.public_key());

    assert_eq!(locked.unlock(&kdf(), b"password").unwrap(), kp);
    assert_eq!(
        locked.unlock(&kdf(), b"passw0rd").unwrap_err(),
        WalletError::InvalidKey
    );
    // The pad depends on the rounds too.
    assert!(locked.unlock(&TranscriptKdf::new(5), b"password").is_err());
}

#[test]
fn lock_is_salted() {
    let a = key_pair(1).lock_with_salt(&kdf(), b"pw", [1u8; 32]);
    let b = key_pair(1).lock_with_salt(&kdf(), b"pw", [2u8; 32]);
    assert_ne!(a, b);
    assert_eq!(a.unlock(&kdf(), b"pw").unwrap(), b.unlock(&kdf(), b"pw").unwrap());
}

#[test]
fn stored_key_pair_encoding() {
    let kp = key_pair(1);
    let plain = kp.encode_to_vec();
    assert_eq!(plain.len(), 65);
    assert_eq!(plain[64], 0);
    assert_eq!(
        StoredKeyPair::decode_exact(&plain).unwrap(),
        StoredKeyPair::Unlocked(kp.clone())
    );

    // Legacy exports end without the lock flag.
    assert_eq!(
        StoredKeyPair::decode_exact(&plain[..64]).unwrap(),
        StoredKeyPair::Unlocked(kp.clone())
    );

    let locked = kp.clone().lock_with_salt(&kdf(), b"pw", [7u8; 32]);
    let bytes = locked.encode_to_vec();
    assert_eq!(bytes.len(), 97);
    assert_eq!(bytes[64], 1);
    let stored = StoredKeyPair::decode_exact(&bytes).unwrap();
    assert_eq!(stored.public_key(), kp.public_key());
    assert_eq!(stored.clone().into_unlocked().unwrap_err(), WalletError::Locked);
    match stored {
        StoredKeyPair::Locked(l) => assert_eq!(l.unlock(&kdf(), b"pw").unwrap(), kp),
        other => panic!("unexpected {:?}", other),
    }

    let mut bad_flag = plain.clone();
    bad_flag[64] = 2;
    assert_eq!(
        StoredKeyPair::decode_exact(&bad_flag).unwrap_err(),
        WalletError::InvalidSeed
    );

    let mut mismatched = plain;
    mismatched[32..64].copy_from_slice(key_pair(2).public_key().as_bytes());
    assert_eq!(
        StoredKeyPair::decode_exact(&mismatched).unwrap_err(),
        WalletError::InvalidKey
    );
}

#[test]
fn wallet_creates_valid_transactions() {
    let registry = AccountRegistry::default();
    let wallet = Wallet::new(key_pair(1));
    let recipient = key_pair(2).address();
    let tx = wallet
        .create_transaction(recipient, 1000, 1, 5, NetworkId::TEST)
        .unwrap();
    assert_eq!(tx.sender(), wallet.address());
    assert!(tx.verify(NetworkId::TEST, &registry));
    assert!(!tx.verify(NetworkId::MAIN, &registry));

    let proof = wallet.sign_transaction(&tx);
    assert!(proof.verify(Some(wallet.address()), &tx.serialize_content()));

    assert!(wallet
        .create_transaction(recipient, 0, 1, 5, NetworkId::TEST)
        .is_err());
}

#[test]
fn wallet_plain_export() {
    let wallet = Wallet::generate(&mut ChaChaRng::from_seed([3u8; 32]));
    let exported = wallet.export_plain();
    assert_eq!(exported.len(), wallet.encoded_length());
    assert_eq!(Wallet::load_plain(&exported).unwrap(), wallet);

    assert_eq!(Wallet::load_plain(&[]).unwrap_err(), WalletError::InvalidSeed);

    let locked = wallet
        .clone()
        .into_key_pair()
        .lock_with_salt(&kdf(), b"pw", [0u8; 32])
        .encode_to_vec();
    assert_eq!(Wallet::load_plain(&locked).unwrap_err(), WalletError::Locked);
}

fn participants() -> (Vec<KeyPair>, Vec<PublicKey>) {
    let pairs: Vec<_> = (1..=3).map(key_pair).collect();
    let keys = pairs.iter().map(|kp| *kp.public_key()).collect();
    (pairs, keys)
}

#[test]
fn multisig_wallet_setup() {
    let (pairs, keys) = participants();
    let wallet = MultiSigWallet::from_public_keys(pairs[0].clone(), 2, &keys).unwrap();
    assert_eq!(wallet.min_signatures(), 2);
    assert_eq!(wallet.public_keys().len(), 3);
    assert!(wallet.public_keys().windows(2).all(|w| w[0] < w[1]));

    // All participants derive the same address regardless of key order.
    let mut reversed = keys.clone();
    reversed.reverse();
    for kp in &pairs {
        let other = MultiSigWallet::from_public_keys(kp.clone(), 2, &reversed).unwrap();
        assert_eq!(other.address(), wallet.address());
        assert_eq!(other.public_keys(), wallet.public_keys());
    }

    let one_of_three = MultiSigWallet::from_public_keys(pairs[0].clone(), 1, &keys).unwrap();
    let three_of_three = MultiSigWallet::from_public_keys(pairs[0].clone(), 3, &keys).unwrap();
    assert_eq!(one_of_three.public_keys().len(), 3);
    assert_eq!(three_of_three.public_keys().len(), 1);
    assert_ne!(one_of_three.address(), wallet.address());
    assert_ne!(three_of_three.address(), wallet.address());
}

#[test]
fn multisig_wallet_rejects_bad_setup() {
    let (pairs, keys) = participants();
    assert_eq!(
        MultiSigWallet::from_public_keys(pairs[0].clone(), 2, &[]).unwrap_err(),
        WalletError::NoPublicKeys
    );
    assert_eq!(
        MultiSigWallet::from_public_keys(pairs[0].clone(), 0, &keys).unwrap_err(),
        WalletError::InvalidThreshold {
            min_signatures: 0,
            keys: 3
        }
    );
    assert_eq!(
        MultiSigWallet::from_public_keys(pairs[0].clone(), 4, &keys).unwrap_err(),
        WalletError::InvalidThreshold {
            min_signatures: 4,
            keys: 3
        }
    );
    assert_eq!(
        MultiSigWallet::from_public_keys(key_pair(9), 2, &keys).unwrap_err(),
        WalletError::NotAParticipant
    );

    let mut with_own: Vec<_> = (10..22).map(|s| *key_pair(s).public_key()).collect();
    with_own.push(*pairs[0].public_key());
    // C(13, 6) = 1716
    assert_eq!(
        MultiSigWallet::from_public_keys(pairs[0].clone(), 6, &with_own).unwrap_err(),
        WalletError::TooManyCombinations(1716)
    );
}

#[test]
fn multisig_plain_export() {
    let (pairs, keys) = participants();
    let wallet = MultiSigWallet::from_public_keys(pairs[1].clone(), 2, &keys).unwrap();
    let exported = wallet.export_plain();
    assert_eq!(exported.len(), 65 + 2 + 3 * 32);
    assert_eq!(MultiSigWallet::load_plain(&exported).unwrap(), wallet);

    assert!(MultiSigWallet::load_plain(&exported[..exported.len() - 1]).is_err());
    assert_eq!(
        MultiSigWallet::load_plain(&[]).unwrap_err(),
        WalletError::InvalidSeed
    );
}

#[test]
fn multisig_requires_exact_share_count() {
    let (pairs, keys) = participants();
    let wallet = MultiSigWallet::from_public_keys(pairs[0].clone(), 2, &keys).unwrap();
    let tx = wallet
        .create_transaction(key_pair(5).address(), 10, 0, 1, NetworkId::MAIN)
        .unwrap();
    assert!(tx.proof().is_empty());

    let mut rng = ChaChaRng::from_seed([4u8; 32]);
    let commitment = wallet.create_commitment(&mut rng);
    let share = wallet
        .partially_sign_transaction(
            &tx,
            &keys[..2],
            &commitment.commitment(),
            commitment.secret(),
        )
        .unwrap();
    let aggregate_key = musig::aggregate_public_keys(&keys[..2]).unwrap();
    assert_eq!(
        wallet
            .sign_transaction(&tx, &aggregate_key, &commitment.commitment(), &[share])
            .unwrap_err(),
        WalletError::WrongNumberOfPartialSignatures {
            expected: 2,
            actual: 1
        }
    );

    // Signing for a subset this wallet is not part of.
    assert!(wallet
        .partially_sign_transaction(
            &tx,
            &keys[1..],
            &commitment.commitment(),
            commitment.secret()
        )
        .is_err());
}

#[test]
fn private_key_is_not_printed() {
    let kp = KeyPair::derive(PrivateKey::from_bytes(&[1u8; 32]).unwrap());
    let printed = format!("{:?}", kp);
    assert!(!printed.contains(&hex::encode(kp.private_key().as_bytes())));
}
