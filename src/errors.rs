//! Error types for kdbx-passwd

pub use crate::binary::errors::{HeaderError, OpenError, UnlockError};
use thiserror::Error;

#[derive(Error, Debug)]
/// Wrapper error type for this library
pub enum Error {
    /// Failed to open a database
    #[error("Could not open database: {0}")]
    Open(#[from] OpenError),
    /// Failed preparing or running a passphrase scan
    #[error("Could not scan database: {0}")]
    Unlock(#[from] UnlockError),
    /// Failed reading candidate passphrases
    #[error("IO error reading candidates - {0}")]
    Io(#[from] std::io::Error),
}
