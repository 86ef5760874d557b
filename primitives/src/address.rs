use core::fmt;
use core::str::FromStr;

use super::{Hash, PrimitiveError};

const COUNTRY_CODE: &str = "NQ";
const BASE32_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKLMNPQRSTUVXY";
const USER_FRIENDLY_LEN: usize = 36;

/// A 20-byte account identifier: the truncated hash of a public key
/// or of a Merkle root over aggregate public keys.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; 20]);

impl Address {
    /// Serialized size in bytes.
    pub const SIZE: usize = 20;

    /// The all-zero address, used as the recipient placeholder when deriving
    /// contract creation addresses.
    pub const NULL: Address = Address([0u8; 20]);

    /// Wraps 20 raw bytes.
    pub fn new(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    /// Wraps a byte slice, failing if it is not exactly 20 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitiveError> {
        if bytes.len() != Self::SIZE {
            return Err(PrimitiveError::InvalidLength {
                kind: "Address",
                expected: Self::SIZE,
                actual: bytes.len(),
            });
        }
        let mut buf = [0u8; 20];
        buf.copy_from_slice(bytes);
        Ok(Address(buf))
    }

    /// Takes the first 20 bytes of a hash.
    pub fn from_hash(hash: &Hash) -> Self {
        let mut buf = [0u8; 20];
        buf.copy_from_slice(&hash.as_bytes()[..Self::SIZE]);
        Address(buf)
    }

    /// Parses 40 hex characters.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitiveError> {
        let bytes = hex::decode(hex_str).map_err(|_| PrimitiveError::InvalidHex)?;
        Self::from_bytes(&bytes)
    }

    /// Returns the view into byte representation of the address.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Hex encoding of the address bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Formats the address as `NQ`, two IBAN check digits and 32 base32
    /// characters, optionally grouped in blocks of four.
    pub fn to_user_friendly_address(&self, with_spaces: bool) -> String {
        let base32 = base32_encode(&self.0);
        let check = 98 - iban_check(&format!("{}{}00", base32, COUNTRY_CODE));
        let plain = format!("{}{:02}{}", COUNTRY_CODE, check, base32);
        if !with_spaces {
            return plain;
        }
        plain
            .as_bytes()
            .chunks(4)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Parses the user-friendly form, with or without spaces.
    pub fn from_user_friendly_address(s: &str) -> Result<Self, PrimitiveError> {
        let s: String = s
            .chars()
            .filter(|c| *c != ' ')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if !s.starts_with(COUNTRY_CODE) {
            return Err(PrimitiveError::InvalidAddress("wrong country code"));
        }
        if s.len() != USER_FRIENDLY_LEN {
            return Err(PrimitiveError::InvalidAddress(
                "should be 36 chars (ignoring spaces)",
            ));
        }
        if !s.is_ascii() {
            return Err(PrimitiveError::InvalidAddress("invalid character"));
        }
        let rotated = format!("{}{}", &s[4..], &s[..4]);
        if iban_check(&rotated) != 1 {
            return Err(PrimitiveError::InvalidAddress("checksum invalid"));
        }
        let bytes = base32_decode(&s[4..])?;
        Self::from_bytes(&bytes)
    }
}

impl FromStr for Address {
    type Err = PrimitiveError;

    /// Accepts the user-friendly form or 40 hex characters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_user_friendly_address(s).or_else(|err| Self::from_hex(s).map_err(|_| err))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_user_friendly_address(true))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Mod-97 remainder of the IBAN digit expansion of `s`
/// (digits stay, letters map to 10..=35).
fn iban_check(s: &str) -> u32 {
    s.chars().fold(0u32, |acc, c| match c.to_digit(36) {
        Some(d) if d < 10 => (acc * 10 + d) % 97,
        Some(d) => (acc * 100 + d) % 97,
        None => acc,
    })
}

fn base32_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity((bytes.len() * 8 + 4) / 5);
    let mut buffer: u32 = 0;
    let mut bits = 0u32;
    for &byte in bytes {
        buffer = (buffer << 8) | byte as u32;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(BASE32_ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

fn base32_decode(s: &str) -> Result<Vec<u8>, PrimitiveError> {
    let mut out = Vec::with_capacity(s.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0u32;
    for c in s.bytes() {
        let value = BASE32_ALPHABET
            .iter()
            .position(|&a| a == c)
            .ok_or(PrimitiveError::InvalidAddress("invalid base32 character"))?;
        buffer = (buffer << 5) | value as u32;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
    }
    Ok(out)
}
