use super::*;
use rand_chacha::ChaChaRng;
use rand_core::SeedableRng;
use readerwriter::{Decodable, ExactSizeEncodable};

fn keypair(seed: u8) -> (PrivateKey, PublicKey) {
    let mut rng = ChaChaRng::from_seed([seed; 32]);
    let sk = PrivateKey::generate(&mut rng);
    let pk = PublicKey::from_private(&sk);
    (sk, pk)
}

#[test]
fn sign_and_verify_single() {
    let (sk, pk) = keypair(1);
    let sig = Signature::create(&sk, &pk, b"example message");

    assert!(sig.verify(&pk, b"example message"));
    assert!(!sig.verify(&pk, b"another message"));

    let (_, other_pk) = keypair(2);
    assert!(!sig.verify(&other_pk, b"example message"));
}

#[test]
fn flipping_any_signature_byte_breaks_verification() {
    let (sk, pk) = keypair(3);
    let sig = Signature::create(&sk, &pk, b"flip me");
    for i in 0..Signature::SIZE {
        let mut bytes = *sig.as_bytes();
        bytes[i] ^= 0x01;
        let bad = Signature::from_bytes(&bytes).unwrap();
        assert!(!bad.verify(&pk, b"flip me"), "byte {} flipped", i);
    }
}

#[test]
fn garbage_key_fails_without_panicking() {
    let (sk, pk) = keypair(4);
    let sig = Signature::create(&sk, &pk, b"m");
    let garbage = PublicKey::from_bytes(&[0xff; 32]).unwrap();
    assert_eq!(garbage.decompress(), Err(PrimitiveError::InvalidPoint));
    assert!(!sig.verify(&garbage, b"m"));
}

#[test]
fn wrong_lengths_are_rejected() {
    assert_eq!(
        Address::from_bytes(&[0u8; 19]),
        Err(PrimitiveError::InvalidLength {
            kind: "Address",
            expected: 20,
            actual: 19
        })
    );
    assert!(PublicKey::from_bytes(&[0u8; 33]).is_err());
    assert!(Signature::from_bytes(&[0u8; 63]).is_err());
    assert!(Commitment::from_bytes(&[]).is_err());
    assert!(Hash::from_bytes(&[0u8; 32], HashAlgorithm::Sha512).is_err());
}

#[test]
fn hash_algorithms() {
    assert_eq!(Hash::blake2b(b"").as_bytes().len(), 32);
    assert_eq!(Hash::sha512(b"").as_bytes().len(), 64);
    assert_eq!(
        Hash::sha256(b"abc").to_hex(),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_eq!(
        Hash::compute(b"abc", HashAlgorithm::Sha256),
        Ok(Hash::sha256(b"abc"))
    );
    assert_eq!(
        Hash::compute(b"abc", HashAlgorithm::Argon2d),
        Err(PrimitiveError::UnsupportedHashAlgorithm(HashAlgorithm::Argon2d))
    );
    assert_eq!(
        Hash::compute(b"abc", HashAlgorithm::Sha512),
        Ok(Hash::sha512(b"abc"))
    );

    // same bytes, different algorithm
    let a = Hash::from_bytes(&[7u8; 32], HashAlgorithm::Blake2b).unwrap();
    let b = Hash::from_bytes(&[7u8; 32], HashAlgorithm::Sha256).unwrap();
    assert_ne!(a, b);

    assert_eq!(HashAlgorithm::from_u8(3), Ok(HashAlgorithm::Sha256));
    assert_eq!(
        HashAlgorithm::from_u8(9),
        Err(PrimitiveError::UnknownHashAlgorithm(9))
    );
    assert_eq!("argon2d".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Argon2d));
    assert_eq!(
        serde_json::to_string(&HashAlgorithm::Blake2b).unwrap(),
        "\"blake2b\""
    );
}

#[test]
fn address_is_truncated_key_hash() {
    let (_, pk) = keypair(5);
    let address = pk.to_address();
    assert_eq!(&address.as_bytes()[..], &pk.hash().as_bytes()[..20]);
}

#[test]
fn user_friendly_address() {
    assert_eq!(
        Address::NULL.to_user_friendly_address(true),
        "NQ07 0000 0000 0000 0000 0000 0000 0000 0000"
    );

    let address = Address::from_hex("0102030405060708090a0b0c0d0e0f1011121314").unwrap();
    let friendly = address.to_user_friendly_address(true);
    assert_eq!(friendly.len(), 44);
    assert!(friendly.starts_with("NQ"));
    assert_eq!(Address::from_user_friendly_address(&friendly), Ok(address));
    assert_eq!(
        friendly.replace(' ', "").to_lowercase().parse::<Address>(),
        Ok(address)
    );
    assert_eq!(address.to_hex().parse::<Address>(), Ok(address));

    // corrupt one character of the body
    let mut chars: Vec<char> = friendly.chars().collect();
    chars[10] = if chars[10] == '0' { '1' } else { '0' };
    let corrupted: String = chars.into_iter().collect();
    assert_eq!(
        Address::from_user_friendly_address(&corrupted),
        Err(PrimitiveError::InvalidAddress("checksum invalid"))
    );
    assert!(Address::from_user_friendly_address("XX00 0000").is_err());
}

#[test]
fn address_serde_uses_user_friendly_form() {
    let address = Address::from_hex("ffffffffffffffffffffffffffffffffffffffff").unwrap();
    let json = serde_json::to_string(&address).unwrap();
    assert_eq!(json, format!("\"{}\"", address));
    let back: Address = serde_json::from_str(&json).unwrap();
    assert_eq!(back, address);
}

#[test]
fn binary_encoding() {
    let (sk, pk) = keypair(6);
    let sig = Signature::create(&sk, &pk, b"encoding");

    assert_eq!(sig.encode_to_vec(), sig.as_bytes().to_vec());
    assert_eq!(Signature::decode_exact(&sig.encode_to_vec()), Ok(sig));
    assert_eq!(PublicKey::decode_exact(pk.as_bytes()), Ok(pk));

    let sha = Hash::sha512(b"x");
    let bytes = sha.encode_to_vec();
    assert_eq!(bytes.len(), 64);
    let mut r = &bytes[..];
    assert_eq!(Hash::decode_with(&mut r, HashAlgorithm::Sha512), Ok(sha));

    assert_eq!(
        PublicKey::decode_exact(&[0u8; 31]),
        Err(PrimitiveError::Read(readerwriter::ReadError::InsufficientBytes))
    );
}

#[test]
fn private_key_debug_is_redacted() {
    let (sk, _) = keypair(7);
    assert_eq!(format!("{:?}", sk), "PrivateKey(<redacted>)");
    assert_eq!(PrivateKey::from_hex(&hex::encode(sk.as_bytes())), Ok(sk));
}
