use super::{BlockCipherReader, AES_BLOCK_SIZE};
use crate::binary::errors::UnlockError;
use crate::binary::{Cipher, OuterHeaderId, SecurityHeader};
use crate::crypto::CandidateKey;
use crate::utils;
use aes::Aes256;
use std::io::{self, Read, Seek, SeekFrom};
use zeroize::Zeroize;

/// Checks candidate keys by decrypting the start of the body
///
/// A key is correct when the first decrypted bytes equal the stream
/// start bytes recorded in the header.
#[derive(Debug, Clone)]
pub struct StartBytesVerifier {
    encryption_iv: Vec<u8>,
    start_bytes: Vec<u8>,
}

impl StartBytesVerifier {
    /// Prepare verification for the given header
    ///
    /// An empty stream start bytes field is treated as missing, it would
    /// accept every key.
    pub fn new(header: &SecurityHeader) -> Result<StartBytesVerifier, UnlockError> {
        match header.cipher {
            None | Some(Cipher::Aes256) => {}
            Some(other) => return Err(UnlockError::UnsupportedCipher(other)),
        }
        let encryption_iv = header.required_bytes(OuterHeaderId::EncryptionIv)?;
        if encryption_iv.len() != AES_BLOCK_SIZE {
            return Err(UnlockError::CipherParameterMismatch {
                field: OuterHeaderId::EncryptionIv,
                expected: AES_BLOCK_SIZE,
                actual: encryption_iv.len(),
            });
        }
        let start_bytes = header.required_bytes(OuterHeaderId::StreamStartBytes)?;
        if start_bytes.is_empty() {
            return Err(UnlockError::MissingRequiredField(
                OuterHeaderId::StreamStartBytes,
            ));
        }

        Ok(StartBytesVerifier {
            encryption_iv: encryption_iv.to_vec(),
            start_bytes: start_bytes.to_vec(),
        })
    }

    /// Number of plaintext bytes compared for each key
    pub fn start_bytes_len(&self) -> usize {
        self.start_bytes.len()
    }

    /// Decrypt the start of `body` with `key` and compare to the expected bytes
    ///
    /// `body` must be positioned at the first ciphertext byte. A body too
    /// short to hold the expected bytes never matches.
    pub fn verify<R: Read>(&self, body: R, key: &CandidateKey) -> io::Result<bool> {
        let mut reader =
            BlockCipherReader::<Aes256, _>::wrap(body, key.as_bytes(), &self.encryption_iv)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let mut decrypted = utils::buffer(self.start_bytes.len());
        let matched = match reader.read_exact(&mut decrypted) {
            Ok(()) => decrypted == self.start_bytes,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => false,
            Err(e) => return Err(e),
        };
        decrypted.zeroize();
        Ok(matched)
    }

    /// Verify against an in-memory body start, a decryption error is a mismatch
    pub(crate) fn matches(&self, body_start: &[u8], key: &CandidateKey) -> bool {
        match self.verify(body_start, key) {
            Ok(matched) => matched,
            Err(e) => {
                log::debug!("Could not decrypt body start: {}", e);
                false
            }
        }
    }

    /// Like [`verify`](Self::verify), restoring the stream position afterwards
    pub fn verify_rewind<R: Read + Seek>(
        &self,
        body: &mut R,
        key: &CandidateKey,
    ) -> io::Result<bool> {
        let start = body.stream_position()?;
        let result = self.verify(&mut *body, key);
        body.seek(SeekFrom::Start(start))?;
        result
    }
}
