use crate::{ReadError, Reader, WriteError, Writer};

/// A trait for encoding structures using the [Writer] trait.
///
/// [Writer]: crate::Writer
pub trait Encodable {
    /// Encodes receiver into bytes appending them to a provided buffer.
    fn encode(&self, w: &mut impl Writer) -> Result<(), WriteError>;
}

/// An [Encodable] whose length is known before encoding.
pub trait ExactSizeEncodable: Encodable {
    /// Returns precise length in bytes for the serialized representation of the receiver.
    fn encoded_length(&self) -> usize;

    /// Encodes the receiver into a newly allocated vector of bytes.
    fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_length());
        self.encode(&mut buf)
            .expect("Writing to a Vec never fails.");
        buf
    }
}

/// A trait for decoding bytes into structure using the [Reader] trait.
///
/// [Reader]: crate::Reader
pub trait Decodable: Sized {
    type Error: From<ReadError>;

    /// Decodes bytes into self by reading bytes from reader.
    fn decode(r: &mut impl Reader) -> Result<Self, Self::Error>;

    /// Decodes a complete byte string, failing on trailing bytes.
    fn decode_exact(bytes: &[u8]) -> Result<Self, Self::Error> {
        let mut r = bytes;
        r.parse(|r| Self::decode(r))
    }
}
