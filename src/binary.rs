//! .kdbx files and the outer binary format

pub(crate) mod errors;
mod header;
mod header_fields;
mod kdbx;
mod read;

pub use header::{HeaderField, OuterHeaderId, SecurityHeader, MAX_HEADER_SIZE};
pub use header_fields::{Cipher, CompressionType};
pub use kdbx::Kdbx;
pub use read::{from_reader, open};

/// First magic number shared by every Keepass database
pub const KEEPASS_MAGIC_NUMBER: u32 = 0x9AA2_D903;
/// Second magic number of a released KDBX database
pub const KDBX_MAGIC_NUMBER: u32 = 0xB54B_FB67;
/// Second magic number written by Keepass 2.x pre-release (alpha and beta) builds
pub const KDBX_PRERELEASE_MAGIC_NUMBER: u32 = 0xB54B_FB66;
