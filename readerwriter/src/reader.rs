use byteorder::{BigEndian, ByteOrder};
use core::fmt;

/// Error kinds returned by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadError {
    /// Not enough bytes left in the input.
    InsufficientBytes,
    /// Parsing finished with unread bytes left.
    TrailingBytes,
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::InsufficientBytes => write!(f, "insufficient bytes"),
            ReadError::TrailingBytes => write!(f, "unexpected trailing bytes"),
        }
    }
}

impl std::error::Error for ReadError {}

/// An interface for reading binary data.
pub trait Reader {
    /// Copies bytes into a slice. If there is not enough bytes available,
    /// does not consume any byte and returns `ReadError::InsufficientBytes`.
    fn read(&mut self, dst: &mut [u8]) -> Result<(), ReadError>;

    /// Advances the internal cursor by the number of bytes.
    /// If there is not enough bytes, does nothing and returns `ReadError::InsufficientBytes`.
    fn advance(&mut self, cnt: usize) -> Result<(), ReadError>;

    /// Returns remaining number of bytes available for reading.
    fn remaining_bytes(&self) -> usize;

    /// Reads a single byte.
    #[inline]
    fn read_u8(&mut self) -> Result<u8, ReadError> {
        let mut buf = [0u8; 1];
        self.read(&mut buf)?;
        Ok(buf[0])
    }

    /// Reads a big-endian 16-bit integer.
    #[inline]
    fn read_u16(&mut self) -> Result<u16, ReadError> {
        let mut buf = [0u8; 2];
        self.read(&mut buf)?;
        Ok(BigEndian::read_u16(&buf))
    }

    /// Reads a big-endian 32-bit integer.
    #[inline]
    fn read_u32(&mut self) -> Result<u32, ReadError> {
        let mut buf = [0u8; 4];
        self.read(&mut buf)?;
        Ok(BigEndian::read_u32(&buf))
    }

    /// Reads a big-endian 64-bit integer.
    #[inline]
    fn read_u64(&mut self) -> Result<u64, ReadError> {
        let mut buf = [0u8; 8];
        self.read(&mut buf)?;
        Ok(BigEndian::read_u64(&buf))
    }

    /// Reads a 20-byte string.
    #[inline]
    fn read_u8x20(&mut self) -> Result<[u8; 20], ReadError> {
        let mut buf = [0u8; 20];
        self.read(&mut buf)?;
        Ok(buf)
    }

    /// Reads a 32-byte string.
    #[inline]
    fn read_u8x32(&mut self) -> Result<[u8; 32], ReadError> {
        let mut buf = [0u8; 32];
        self.read(&mut buf)?;
        Ok(buf)
    }

    /// Reads a 64-byte string.
    #[inline]
    fn read_u8x64(&mut self) -> Result<[u8; 64], ReadError> {
        let mut buf = [0u8; 64];
        self.read(&mut buf)?;
        Ok(buf)
    }

    /// Reads exactly `len` bytes into a new vector.
    fn read_vec(&mut self, len: usize) -> Result<Vec<u8>, ReadError> {
        if len > self.remaining_bytes() {
            return Err(ReadError::InsufficientBytes);
        }
        let mut vec = vec![0u8; len];
        self.read(&mut vec)?;
        Ok(vec)
    }

    /// Reads a byte string preceded by its 16-bit length.
    fn read_u16_prefixed(&mut self) -> Result<Vec<u8>, ReadError> {
        let len = self.read_u16()? as usize;
        self.read_vec(len)
    }

    /// Wraps the reading logic in a block that checks that all bytes have been read.
    /// If some are left unread, returns `Err(From<ReadError::TrailingBytes>)`.
    /// Use method `skip_trailing_bytes` to ignore trailing bytes.
    fn parse<F, T, E>(&mut self, parse_fn: F) -> Result<T, E>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<ReadError>,
    {
        let result = parse_fn(self)?;
        if self.remaining_bytes() != 0 {
            return Err(ReadError::TrailingBytes.into());
        }
        Ok(result)
    }

    /// Marks remaining unread bytes as read so that `parse` does not fail.
    /// After calling this method, no more bytes can be read.
    fn skip_trailing_bytes(&mut self) -> usize {
        let rem = self.remaining_bytes();
        // advancing by exactly the remaining length cannot fail
        let _ = self.advance(rem);
        rem
    }
}

impl Reader for &[u8] {
    #[inline]
    fn read(&mut self, dst: &mut [u8]) -> Result<(), ReadError> {
        let n = dst.len();
        if self.len() < n {
            return Err(ReadError::InsufficientBytes);
        }
        let (a, b) = self.split_at(n);
        dst.copy_from_slice(a);
        *self = b;
        Ok(())
    }

    #[inline]
    fn advance(&mut self, cnt: usize) -> Result<(), ReadError> {
        if self.len() < cnt {
            return Err(ReadError::InsufficientBytes);
        }
        *self = &self[cnt..];
        Ok(())
    }

    #[inline]
    fn remaining_bytes(&self) -> usize {
        self.len()
    }
}
