use crate::binary::errors::UnlockError;
use crate::binary::{OuterHeaderId, SecurityHeader};

use aes::Aes256;
use cipher::generic_array::GenericArray;
use cipher::{Block, BlockEncrypt, KeyInit};
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::Zeroize;

const TRANSFORM_SEED_LEN: usize = 32;

/// Credentials needed to unlock the database
///
/// Each factor is a raw key source such as a password or the contents
/// of a key file. Factors are hashed in the order they were given.
pub struct CompositeKey {
    factors: Vec<Vec<u8>>,
}

impl CompositeKey {
    /// Utility method for making a key with just a password
    pub fn from_password(pw: &str) -> CompositeKey {
        CompositeKey {
            factors: vec![pw.as_bytes().to_vec()],
        }
    }

    /// Create a key from raw key factors, e.g. a password followed by key file data
    ///
    /// An empty list is accepted and composes to the SHA-256 of no data,
    /// which no Keepass database is locked with.
    pub fn from_factors<I, F>(factors: I) -> CompositeKey
    where
        I: IntoIterator<Item = F>,
        F: Into<Vec<u8>>,
    {
        CompositeKey {
            factors: factors.into_iter().map(Into::into).collect(),
        }
    }

    /// Hash each factor, then hash the concatenated digests
    pub(crate) fn composed(&self) -> ComposedKey {
        let mut buffer = Vec::with_capacity(self.factors.len() * 32);
        for factor in &self.factors {
            buffer.extend(Sha256::digest(factor));
        }
        let composed = ComposedKey(sha256(&buffer));
        buffer.zeroize();
        composed
    }
}

impl Drop for CompositeKey {
    fn drop(&mut self) {
        self.factors.zeroize();
    }
}

impl fmt::Debug for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeKey")
            .field("factors", &self.factors.len())
            .finish()
    }
}

/// Hash of all key factors, input to the key transformation
pub(crate) struct ComposedKey(pub(crate) [u8; 32]);

impl Drop for ComposedKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Key derived for one candidate, used to decrypt the database body
///
/// Wiped from memory when dropped.
#[derive(PartialEq, Eq)]
pub struct CandidateKey([u8; 32]);

impl CandidateKey {
    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for CandidateKey {
    fn from(key: [u8; 32]) -> CandidateKey {
        CandidateKey(key)
    }
}

impl Drop for CandidateKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for CandidateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CandidateKey(..)")
    }
}

/// Turns credentials into a body decryption key using the header's parameters
///
/// The AES key schedule for the transform seed is built once and shared
/// by every derivation, the transformed blocks are not.
pub struct KeyDerivation {
    transform_cipher: Aes256,
    transform_rounds: u64,
    master_seed: Vec<u8>,
}

impl KeyDerivation {
    /// Prepare key derivation for the given header
    pub fn new(header: &SecurityHeader) -> Result<KeyDerivation, UnlockError> {
        let master_seed = header.required_bytes(OuterHeaderId::MasterSeed)?.to_vec();
        let transform_seed = header.required_bytes(OuterHeaderId::TransformSeed)?;
        let transform_rounds = header
            .transform_rounds
            .ok_or(UnlockError::MissingRequiredField(
                OuterHeaderId::TransformRounds,
            ))?;
        if transform_seed.len() != TRANSFORM_SEED_LEN {
            return Err(UnlockError::CipherParameterMismatch {
                field: OuterHeaderId::TransformSeed,
                expected: TRANSFORM_SEED_LEN,
                actual: transform_seed.len(),
            });
        }
        let transform_cipher = Aes256::new_from_slice(transform_seed).map_err(|_| {
            UnlockError::CipherParameterMismatch {
                field: OuterHeaderId::TransformSeed,
                expected: TRANSFORM_SEED_LEN,
                actual: transform_seed.len(),
            }
        })?;

        Ok(KeyDerivation {
            transform_cipher,
            transform_rounds,
            master_seed,
        })
    }

    /// Number of AES rounds each derivation runs
    pub fn transform_rounds(&self) -> u64 {
        self.transform_rounds
    }

    /// Derive the body decryption key for a set of credentials
    pub fn derive(&self, key: &CompositeKey) -> CandidateKey {
        let composed = key.composed();
        let mut transformed = self.transform(&composed);

        let mut seeded = Sha256::new();
        seeded.update(&self.master_seed);
        seeded.update(transformed);
        transformed.zeroize();
        CandidateKey(seeded.finalize().into())
    }

    /// Encrypt both halves of the composed key `transform_rounds` times, then hash
    pub(crate) fn transform(&self, composed: &ComposedKey) -> [u8; 32] {
        let mut blocks: [Block<Aes256>; 2] = [
            GenericArray::clone_from_slice(&composed.0[..16]),
            GenericArray::clone_from_slice(&composed.0[16..]),
        ];
        for _ in 0..self.transform_rounds {
            self.transform_cipher.encrypt_blocks(&mut blocks);
        }

        let mut hasher = Sha256::new();
        hasher.update(blocks[0]);
        hasher.update(blocks[1]);
        for block in blocks.iter_mut() {
            block.as_mut_slice().zeroize();
        }
        hasher.finalize().into()
    }
}

/// SHA-256 of the given data
pub(crate) fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}
