use super::errors::UnlockError;
use super::header::SecurityHeader;
use crate::crypto::{CompositeKey, KeyDerivation};
use crate::scan::{ScanOptions, Scanner};
use crate::stream::StartBytesVerifier;

#[derive(Debug, PartialEq, Eq)]
/// A locked KeePass 2 archive
///
/// Holds the parsed unencrypted header and the first encrypted bytes of
/// the body, enough to check whether a key decrypts the stream start bytes.
///
/// Obtain one with [`kdbx_passwd::open`][crate::open] or
/// [`kdbx_passwd::from_reader`][crate::from_reader].
pub struct Kdbx {
    pub(super) header: SecurityHeader,
    pub(super) major_version: u16,
    pub(super) minor_version: u16,
    pub(super) body_start: Vec<u8>,
}

impl Kdbx {
    /// Unencrypted key derivation parameters and custom data
    pub fn header(&self) -> &SecurityHeader {
        &self.header
    }

    /// Major archive version
    pub fn major_version(&self) -> u16 {
        self.major_version
    }

    /// Minor archive version
    pub fn minor_version(&self) -> u16 {
        self.minor_version
    }

    /// Encrypted bytes kept from the start of the body
    pub fn body_start(&self) -> &[u8] {
        &self.body_start
    }

    /// Check a single set of credentials against this archive
    pub fn check_key(&self, key: &CompositeKey) -> Result<bool, UnlockError> {
        let derivation = KeyDerivation::new(&self.header)?;
        let verifier = StartBytesVerifier::new(&self.header)?;
        let candidate = derivation.derive(key);
        Ok(verifier.matches(&self.body_start, &candidate))
    }

    /// Prepare a scan over candidate passphrases
    ///
    /// Fails before any candidate is tried if the header lacks a field
    /// needed for key derivation or verification.
    pub fn scanner(&self, options: ScanOptions) -> Result<Scanner<'_>, UnlockError> {
        Scanner::new(self, options)
    }
}
