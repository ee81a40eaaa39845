use super::header::OuterHeaderId;
use super::header_fields::Cipher;
use thiserror::Error;

#[derive(Error, Debug)]
/// Errors encountered loading a database prior to decryption
pub enum OpenError {
    /// The two magic numbers are not those of a Keepass 2 database
    #[error("Invalid file signature {0:#010x} {1:#010x} - not a KDBX database created using Keepass 2.x")]
    InvalidSignature(u32, u32),
    /// There was some error parsing the unencrypted database header
    #[error("Error reading database header - {0}")]
    InvalidHeader(#[from] HeaderError),
    /// Error encountered reading database
    #[error("IO error reading file - {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
/// Errors preparing a key check or a passphrase scan
pub enum UnlockError {
    /// A field needed to derive or check keys is not in the header
    #[error("Incompatible database - Missing required field of type {0:?}")]
    MissingRequiredField(OuterHeaderId),
    /// A key, seed or IV has the wrong length for the cipher
    #[error("Incompatible database - {field:?} is {actual} bytes, cipher requires {expected}")]
    CipherParameterMismatch {
        /// Header field the parameter was read from
        field: OuterHeaderId,
        /// Length the cipher requires
        expected: usize,
        /// Length found in the header
        actual: usize,
    },
    /// The database body is encrypted with a cipher this library cannot check
    #[error("Incompatible database - Unsupported cipher {0:?}")]
    UnsupportedCipher(Cipher),
    /// The worker pool for a parallel scan could not be started
    #[error("Could not start scan workers - {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Error)]
/// Errors encountered validating the database header
pub enum HeaderError {
    /// The reader failed before the header was entirely read
    #[error("Error reading database header - {0}")]
    Io(#[from] std::io::Error),
    /// The input ends before the signatures and version
    #[error("Corrupt database - Header truncated before format version")]
    TruncatedPreamble,
    /// The input ends inside a header field
    #[error("Corrupt database - Header truncated in field of type {0:?}")]
    TruncatedField(OuterHeaderId),
    /// The input ends between fields, before the end of header field
    #[error("Corrupt database - Header ends without an end of header field")]
    MissingEndOfHeader,
    /// A supported field had an unexpected format
    #[error("Incompatible database - Malformed field of type {0:?}: {1}")]
    MalformedField(OuterHeaderId, String),
    /// The field list goes on past the size any real database uses
    #[error("Corrupt database - Header exceeds {0} bytes")]
    HeaderTooLarge(usize),
}
