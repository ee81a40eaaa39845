#![allow(dead_code)]

use aes::Aes256;
use cipher::generic_array::GenericArray;
use cipher::{BlockEncrypt, BlockEncryptMut, KeyInit, KeyIvInit};
use sha2::{Digest, Sha256};

pub const SIGNATURE_ONE: u32 = 0x9AA2_D903;
pub const SIGNATURE_TWO: u32 = 0xB54B_FB67;
pub const SIGNATURE_TWO_PRERELEASE: u32 = 0xB54B_FB66;
pub const VERSION_3_1: u32 = 0x0003_0001;

pub const MASTER_SEED: [u8; 32] = [
    0x3a, 0x1b, 0xc6, 0xe6, 0x5d, 0xb6, 0x0c, 0x04, 0x5c, 0xf4, 0x25, 0x47, 0xfd, 0x20, 0x3c, 0x1a,
    0x4a, 0x55, 0xee, 0xbb, 0x84, 0xb3, 0xfe, 0x28, 0xf3, 0x3d, 0x7f, 0xec, 0xb5, 0x6d, 0x50, 0xcb,
];
pub const MARKER: [u8; 4] = [0xde, 0xad, 0xbe, 0xef];

/// Encode one type-length-value header field
pub fn field(id: u8, data: &[u8]) -> Vec<u8> {
    let mut buf = vec![id];
    buf.extend_from_slice(&(data.len() as u16).to_le_bytes());
    buf.extend_from_slice(data);
    buf
}

/// Builds KDBX 3 files field by field, in the order fields are added
pub struct KdbxFile {
    signature_one: u32,
    signature_two: u32,
    version: u32,
    fields: Vec<u8>,
    body: Vec<u8>,
}

impl KdbxFile {
    pub fn new() -> KdbxFile {
        KdbxFile {
            signature_one: SIGNATURE_ONE,
            signature_two: SIGNATURE_TWO,
            version: VERSION_3_1,
            fields: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn signatures(mut self, one: u32, two: u32) -> KdbxFile {
        self.signature_one = one;
        self.signature_two = two;
        self
    }

    pub fn version(mut self, version: u32) -> KdbxFile {
        self.version = version;
        self
    }

    pub fn field(mut self, id: u8, data: &[u8]) -> KdbxFile {
        self.fields.extend(field(id, data));
        self
    }

    pub fn body(mut self, body: &[u8]) -> KdbxFile {
        self.body = body.to_vec();
        self
    }

    /// Preamble and fields, without end of header or body
    pub fn unterminated(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.signature_one.to_le_bytes());
        buf.extend_from_slice(&self.signature_two.to_le_bytes());
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(&self.fields);
        buf
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buf = self.unterminated();
        buf.extend(field(0, b"\r\n\r\n"));
        buf.extend_from_slice(&self.body);
        buf
    }
}

/// Straight-line key derivation used to cross check the library
pub fn reference_key(
    password: &str,
    master_seed: &[u8],
    transform_seed: &[u8; 32],
    rounds: u64,
) -> [u8; 32] {
    let composite = Sha256::digest(Sha256::digest(password.as_bytes()));
    let cipher = Aes256::new(GenericArray::from_slice(transform_seed));
    let mut left = GenericArray::clone_from_slice(&composite[..16]);
    let mut right = GenericArray::clone_from_slice(&composite[16..]);
    for _ in 0..rounds {
        cipher.encrypt_block(&mut left);
        cipher.encrypt_block(&mut right);
    }
    let mut transformed = Sha256::new();
    transformed.update(left);
    transformed.update(right);
    let transformed = transformed.finalize();

    let mut seeded = Sha256::new();
    seeded.update(master_seed);
    seeded.update(transformed);
    seeded.finalize().into()
}

/// AES-256-CBC encrypt, zero filling the last block
pub fn encrypt_cbc(key: &[u8; 32], iv: &[u8; 16], plaintext: &[u8]) -> Vec<u8> {
    let mut padded = plaintext.to_vec();
    while padded.len() % 16 != 0 {
        padded.push(0);
    }
    let mut encryptor = cbc::Encryptor::<Aes256>::new_from_slices(key, iv).unwrap();
    let mut blocks: Vec<cipher::Block<Aes256>> = padded
        .chunks(16)
        .map(GenericArray::clone_from_slice)
        .collect();
    encryptor.encrypt_blocks_mut(&mut blocks);
    blocks.iter().flat_map(|b| b.iter().cloned()).collect()
}

/// A database whose start bytes decrypt with `password`
///
/// Zero transform seed and IV, [`MARKER`] as stream start bytes.
pub fn sample_file(password: &str, rounds: u64) -> Vec<u8> {
    let transform_seed = [0u8; 32];
    let iv = [0u8; 16];
    let key = reference_key(password, &MASTER_SEED, &transform_seed, rounds);
    let mut plaintext = MARKER.to_vec();
    plaintext.extend_from_slice(b"<?xml version=\"1.0\"?>");
    let body = encrypt_cbc(&key, &iv, &plaintext);

    KdbxFile::new()
        .field(4, &MASTER_SEED)
        .field(5, &transform_seed)
        .field(6, &rounds.to_le_bytes())
        .field(7, &iv)
        .field(9, &MARKER)
        .body(&body)
        .build()
}
