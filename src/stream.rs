mod block_cipher;
mod start_bytes;

pub(crate) use block_cipher::BlockCipherReader;
pub use start_bytes::StartBytesVerifier;

/// Block size of the AES body cipher
pub(crate) const AES_BLOCK_SIZE: usize = 16;

/// Smallest multiple of the AES block size holding `len` bytes
pub(crate) fn block_aligned_len(len: usize) -> usize {
    len.div_ceil(AES_BLOCK_SIZE) * AES_BLOCK_SIZE
}
