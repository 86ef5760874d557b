use core::fmt;
use readerwriter::{Decodable, Encodable, ExactSizeEncodable, Reader, WriteError, Writer};
use serde::{de::Deserializer, de::Visitor, ser::Serializer, Deserialize, Serialize};

use super::{
    Address, Commitment, Hash, HashAlgorithm, PartialSignature, PrimitiveError, PrivateKey,
    PublicKey, RandomSecret, Signature,
};

macro_rules! impl_codable {
    ($t:ty, $size:expr, $label:expr) => {
        impl Encodable for $t {
            fn encode(&self, w: &mut impl Writer) -> Result<(), WriteError> {
                w.write($label, &self.as_bytes()[..])
            }
        }

        impl ExactSizeEncodable for $t {
            fn encoded_length(&self) -> usize {
                $size
            }
        }

        impl Decodable for $t {
            type Error = PrimitiveError;

            fn decode(r: &mut impl Reader) -> Result<Self, PrimitiveError> {
                let mut buf = [0u8; $size];
                r.read(&mut buf)?;
                <$t>::from_bytes(&buf[..])
            }
        }
    };
}

impl_codable!(Address, 20, b"address");
impl_codable!(PublicKey, 32, b"pubkey");
impl_codable!(PrivateKey, 32, b"privkey");
impl_codable!(Commitment, 32, b"commitment");
impl_codable!(RandomSecret, 32, b"secret");
impl_codable!(PartialSignature, 32, b"partial_sig");
impl_codable!(Signature, 64, b"signature");

impl Hash {
    /// Reads a digest of the given algorithm. The algorithm tag itself is not
    /// part of the digest encoding.
    pub fn decode_with(r: &mut impl Reader, algorithm: HashAlgorithm) -> Result<Self, PrimitiveError> {
        let mut buf = [0u8; 64];
        let size = algorithm.size();
        r.read(&mut buf[..size])?;
        Hash::from_bytes(&buf[..size], algorithm)
    }
}

impl Encodable for Hash {
    fn encode(&self, w: &mut impl Writer) -> Result<(), WriteError> {
        w.write(b"hash", self.as_bytes())
    }
}

impl ExactSizeEncodable for Hash {
    fn encoded_length(&self) -> usize {
        self.algorithm().size()
    }
}

/// Decodes a BLAKE2b digest; use [Hash::decode_with] for other algorithms.
impl Decodable for Hash {
    type Error = PrimitiveError;

    fn decode(r: &mut impl Reader) -> Result<Self, PrimitiveError> {
        Hash::decode_with(r, HashAlgorithm::Blake2b)
    }
}

impl Encodable for HashAlgorithm {
    fn encode(&self, w: &mut impl Writer) -> Result<(), WriteError> {
        w.write_u8(b"hash_algorithm", self.to_u8())
    }
}

impl Decodable for HashAlgorithm {
    type Error = PrimitiveError;

    fn decode(r: &mut impl Reader) -> Result<Self, PrimitiveError> {
        HashAlgorithm::from_u8(r.read_u8()?)
    }
}

// Human-readable encodings for the plain projections:
// addresses in user-friendly form, everything else in hex.
macro_rules! impl_serde_hex {
    ($t:ty, $expecting:expr) => {
        impl Serialize for $t {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $t {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                struct HexVisitor;

                impl<'de> Visitor<'de> for HexVisitor {
                    type Value = $t;

                    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                        formatter.write_str($expecting)
                    }

                    fn visit_str<E>(self, v: &str) -> Result<$t, E>
                    where
                        E: serde::de::Error,
                    {
                        <$t>::from_hex(v).map_err(serde::de::Error::custom)
                    }

                    fn visit_bytes<E>(self, v: &[u8]) -> Result<$t, E>
                    where
                        E: serde::de::Error,
                    {
                        <$t>::from_bytes(v).map_err(serde::de::Error::custom)
                    }
                }

                deserializer.deserialize_str(HexVisitor)
            }
        }
    };
}

impl_serde_hex!(PublicKey, "a hex-encoded public key");
impl_serde_hex!(Signature, "a hex-encoded signature");

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_user_friendly_address(true))
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AddressVisitor;

        impl<'de> Visitor<'de> for AddressVisitor {
            type Value = Address;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a user-friendly or hex address")
            }

            fn visit_str<E>(self, v: &str) -> Result<Address, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(AddressVisitor)
    }
}
