use byteorder::{BigEndian, ByteOrder};
use core::fmt;
use core::mem;

/// Error kinds returned by the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    /// The output buffer is full.
    InsufficientCapacity,
    /// A length-prefixed string does not fit its 16-bit prefix.
    TooLong(usize),
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::InsufficientCapacity => write!(f, "insufficient capacity"),
            WriteError::TooLong(len) => write!(f, "{} bytes do not fit a 16-bit length", len),
        }
    }
}

impl std::error::Error for WriteError {}

/// Interface for writing binary data. Integers are big-endian.
///
/// Every write carries a label naming the field. Byte buffers ignore it.
pub trait Writer {
    /// Appends bytes. If there is not enough capacity, writes nothing
    /// and returns `WriteError::InsufficientCapacity`.
    fn write(&mut self, label: &'static [u8], src: &[u8]) -> Result<(), WriteError>;

    /// Remaining number of bytes that can be written.
    fn remaining_capacity(&self) -> usize;

    /// Writes a single byte.
    #[inline]
    fn write_u8(&mut self, label: &'static [u8], x: u8) -> Result<(), WriteError> {
        self.write(label, &[x])
    }

    /// Writes a big-endian 16-bit integer.
    #[inline]
    fn write_u16(&mut self, label: &'static [u8], x: u16) -> Result<(), WriteError> {
        let mut buf = [0u8; 2];
        BigEndian::write_u16(&mut buf, x);
        self.write(label, &buf)
    }

    /// Writes a big-endian 32-bit integer.
    #[inline]
    fn write_u32(&mut self, label: &'static [u8], x: u32) -> Result<(), WriteError> {
        let mut buf = [0u8; 4];
        BigEndian::write_u32(&mut buf, x);
        self.write(label, &buf)
    }

    /// Writes a big-endian 64-bit integer.
    #[inline]
    fn write_u64(&mut self, label: &'static [u8], x: u64) -> Result<(), WriteError> {
        let mut buf = [0u8; 8];
        BigEndian::write_u64(&mut buf, x);
        self.write(label, &buf)
    }

    /// Writes a byte string after its 16-bit length.
    fn write_u16_prefixed(&mut self, label: &'static [u8], src: &[u8]) -> Result<(), WriteError> {
        if src.len() > u16::MAX as usize {
            return Err(WriteError::TooLong(src.len()));
        }
        if 2 + src.len() > self.remaining_capacity() {
            return Err(WriteError::InsufficientCapacity);
        }
        self.write_u16(label, src.len() as u16)?;
        self.write(label, src)
    }
}

impl Writer for Vec<u8> {
    #[inline]
    fn write(&mut self, _label: &'static [u8], src: &[u8]) -> Result<(), WriteError> {
        self.extend_from_slice(src);
        Ok(())
    }

    #[inline]
    fn write_u8(&mut self, _label: &'static [u8], x: u8) -> Result<(), WriteError> {
        self.push(x);
        Ok(())
    }

    #[inline]
    fn remaining_capacity(&self) -> usize {
        usize::MAX - self.len()
    }
}

impl Writer for &mut [u8] {
    fn write(&mut self, _label: &'static [u8], src: &[u8]) -> Result<(), WriteError> {
        if src.len() > self.len() {
            return Err(WriteError::InsufficientCapacity);
        }
        let (head, tail) = mem::take(self).split_at_mut(src.len());
        head.copy_from_slice(src);
        *self = tail;
        Ok(())
    }

    #[inline]
    fn remaining_capacity(&self) -> usize {
        self.len()
    }
}
