//! Big-endian binary encoding used by every wire structure in the workspace.
//!
//! Writers append labeled byte strings (the label names the field and is
//! ignored by byte buffers). Readers consume a slice front-to-back and
//! report short input or unread trailing bytes.

mod codable;
mod reader;
mod writer;

pub use codable::{Decodable, Encodable, ExactSizeEncodable};
pub use reader::{ReadError, Reader};
pub use writer::{WriteError, Writer};

#[cfg(test)]
mod tests;
