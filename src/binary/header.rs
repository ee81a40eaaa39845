use super::errors::{HeaderError as Error, UnlockError};
use super::header_fields::{Cipher, CompressionType};
use crate::utils;
use std::fmt;
use std::io::{self, Read, Write};

type Result<T> = std::result::Result<T, Error>;

/// Largest outer header, in bytes, accepted before giving up on the file
pub const MAX_HEADER_SIZE: usize = 1024 * 1024;

const END_OF_HEADER_DATA: [u8; 4] = *b"\r\n\r\n";

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
/// Field types for unencrypted header
pub enum OuterHeaderId {
    /// Last header field
    EndOfHeader,
    /// Custom comment to describe the database
    Comment,
    /// UUID indicating the cipher for the database
    CipherId,
    /// Compression algorithm in use
    CompressionFlags,
    /// Seed to make database keys unique
    MasterSeed,
    /// Key for the AES rounds converting credentials to keys
    TransformSeed,
    /// Number of rounds of AES256 to use to generate keys
    TransformRounds,
    /// Initial value for encrypting/decrypting the stream
    EncryptionIv,
    /// Key used for decrypting inner streams
    ProtectedStreamKey,
    /// First 32 bytes of decrypted data, used to check the key
    StreamStartBytes,
    /// Cipher identifer for data encrypted in memory
    InnerRandomStreamId,
    /// Some header field not supported by this library
    Unknown(u8),
}

impl From<u8> for OuterHeaderId {
    fn from(id: u8) -> OuterHeaderId {
        match id {
            0 => OuterHeaderId::EndOfHeader,
            0x1 => OuterHeaderId::Comment,
            0x2 => OuterHeaderId::CipherId,
            0x3 => OuterHeaderId::CompressionFlags,
            0x4 => OuterHeaderId::MasterSeed,
            0x5 => OuterHeaderId::TransformSeed,
            0x6 => OuterHeaderId::TransformRounds,
            0x7 => OuterHeaderId::EncryptionIv,
            0x8 => OuterHeaderId::ProtectedStreamKey,
            0x9 => OuterHeaderId::StreamStartBytes,
            0xA => OuterHeaderId::InnerRandomStreamId,
            x => OuterHeaderId::Unknown(x),
        }
    }
}

impl From<OuterHeaderId> for u8 {
    fn from(id: OuterHeaderId) -> u8 {
        match id {
            OuterHeaderId::EndOfHeader => 0,
            OuterHeaderId::Comment => 0x1,
            OuterHeaderId::CipherId => 0x2,
            OuterHeaderId::CompressionFlags => 0x3,
            OuterHeaderId::MasterSeed => 0x4,
            OuterHeaderId::TransformSeed => 0x5,
            OuterHeaderId::TransformRounds => 0x6,
            OuterHeaderId::EncryptionIv => 0x7,
            OuterHeaderId::ProtectedStreamKey => 0x8,
            OuterHeaderId::StreamStartBytes => 0x9,
            OuterHeaderId::InnerRandomStreamId => 0xA,
            OuterHeaderId::Unknown(x) => x,
        }
    }
}

impl OuterHeaderId {
    fn is_final(&self) -> bool {
        *self == OuterHeaderId::EndOfHeader
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A single type-length-value entry of the outer header
pub struct HeaderField {
    ty: OuterHeaderId,
    data: Vec<u8>,
}

impl HeaderField {
    /// Create a field from its type and raw data
    pub fn new(ty: OuterHeaderId, data: Vec<u8>) -> HeaderField {
        HeaderField { ty, data }
    }

    /// Type of this field
    pub fn ty(&self) -> OuterHeaderId {
        self.ty
    }

    /// Raw field data
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

pub(crate) struct HeaderParser<'a, R: Read + 'a> {
    reader: &'a mut R,
    consumed: usize,
}

impl<'a, R> HeaderParser<'a, R>
where
    R: Read + 'a,
{
    pub(crate) fn new(reader: &'a mut R) -> HeaderParser<'a, R> {
        HeaderParser {
            reader,
            consumed: 0,
        }
    }

    fn read_exact_or(&mut self, buf: &mut [u8], truncated: Error) -> Result<()> {
        match self.reader.read_exact(buf) {
            Ok(()) => {
                self.consumed += buf.len();
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(truncated),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn read_one_header(&mut self) -> Result<HeaderField> {
        let mut ty_buffer = [0u8];
        self.read_exact_or(&mut ty_buffer, Error::MissingEndOfHeader)?;
        let ty = OuterHeaderId::from(ty_buffer[0]);
        let mut len_buffer = [0u8; 2];
        self.read_exact_or(&mut len_buffer, Error::TruncatedField(ty))?;
        let len = u16::from_le_bytes(len_buffer) as usize;
        if self.consumed + len > MAX_HEADER_SIZE {
            return Err(Error::HeaderTooLarge(MAX_HEADER_SIZE));
        }
        let mut header_buffer = utils::buffer(len);
        self.read_exact_or(&mut header_buffer, Error::TruncatedField(ty))?;
        log::debug!("Read header field {:?} ({} bytes)", ty, len);

        Ok(HeaderField {
            ty,
            data: header_buffer,
        })
    }

    pub(crate) fn read_all_headers(&mut self) -> Result<Vec<HeaderField>> {
        let mut headers = Vec::new();
        let mut header = self.read_one_header()?;
        while !header.ty.is_final() {
            headers.push(header);
            header = self.read_one_header()?;
        }

        Ok(headers)
    }
}

#[derive(Default)]
struct SecurityHeaderBuilder {
    master_seed: Option<Vec<u8>>,
    transform_seed: Option<Vec<u8>>,
    transform_rounds: Option<u64>,
    encryption_iv: Option<Vec<u8>>,
    stream_start_bytes: Option<Vec<u8>>,
    cipher: Option<Cipher>,
    compression_type: Option<CompressionType>,
    other_headers: Vec<HeaderField>,
}

impl SecurityHeaderBuilder {
    fn add_header(&mut self, header: HeaderField) -> Result<()> {
        match header.ty {
            // Not needed to check keys, kept raw when undecodable
            OuterHeaderId::CipherId => match uuid::Uuid::from_slice(&header.data) {
                Ok(uuid) => self.cipher = Some(Cipher::from(uuid)),
                Err(_) => {
                    log::warn!(
                        "Cipher UUID is {} bytes, keeping it undecoded",
                        header.data.len()
                    );
                    self.other_headers.push(header);
                }
            },
            OuterHeaderId::CompressionFlags => match <[u8; 4]>::try_from(header.data.as_slice()) {
                Ok(flags) => {
                    self.compression_type = Some(CompressionType::from(u32::from_le_bytes(flags)))
                }
                Err(_) => {
                    log::warn!(
                        "Compression flags are {} bytes, keeping them undecoded",
                        header.data.len()
                    );
                    self.other_headers.push(header);
                }
            },
            OuterHeaderId::TransformRounds => {
                let rounds: [u8; 8] = header.data.as_slice().try_into().map_err(|_| {
                    Error::MalformedField(
                        header.ty,
                        format!("Expected 8 bytes, found {}", header.data.len()),
                    )
                })?;
                self.transform_rounds = Some(u64::from_le_bytes(rounds));
            }
            OuterHeaderId::MasterSeed => self.master_seed = Some(header.data),
            OuterHeaderId::TransformSeed => self.transform_seed = Some(header.data),
            OuterHeaderId::EncryptionIv => self.encryption_iv = Some(header.data),
            OuterHeaderId::StreamStartBytes => self.stream_start_bytes = Some(header.data),
            _ => self.other_headers.push(header),
        }

        Ok(())
    }

    fn build(self) -> SecurityHeader {
        SecurityHeader {
            master_seed: self.master_seed,
            transform_seed: self.transform_seed,
            transform_rounds: self.transform_rounds,
            encryption_iv: self.encryption_iv,
            stream_start_bytes: self.stream_start_bytes,
            cipher: self.cipher,
            compression_type: self.compression_type,
            other_headers: self.other_headers,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Unencrypted key derivation and verification parameters
///
/// Fields missing from the file are `None`. Checking a key against
/// the database fails with [`UnlockError::MissingRequiredField`]
/// when one of the fields it depends on is absent.
pub struct SecurityHeader {
    /// Master seed used to make crypto keys DB specific
    pub master_seed: Option<Vec<u8>>,
    /// AES256 key used for the key transformation rounds
    pub transform_seed: Option<Vec<u8>>,
    /// Number of key transformation rounds
    pub transform_rounds: Option<u64>,
    /// IV used for initializing crypto
    pub encryption_iv: Option<Vec<u8>>,
    /// Plaintext the decrypted body must start with
    pub stream_start_bytes: Option<Vec<u8>>,
    /// Encryption cipher used for the database body
    pub cipher: Option<Cipher>,
    /// Compression applied prior to encryption
    pub compression_type: Option<CompressionType>,
    /// Custom and unrecognized header types, in file order
    pub other_headers: Vec<HeaderField>,
}

impl SecurityHeader {
    /// Read the header fields up to and including the end of header field.
    ///
    /// The reader must be positioned just after the signatures and version,
    /// it is left at the first byte of the encrypted body.
    pub fn read<R: Read>(reader: &mut R) -> Result<SecurityHeader> {
        let mut header_builder = SecurityHeaderBuilder::default();
        let headers = HeaderParser::new(reader).read_all_headers()?;
        for header in headers {
            header_builder.add_header(header)?;
        }

        Ok(header_builder.build())
    }

    /// Encode the header fields, followed by the end of header field
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let byte_fields = [
            (OuterHeaderId::MasterSeed, &self.master_seed),
            (OuterHeaderId::TransformSeed, &self.transform_seed),
            (OuterHeaderId::EncryptionIv, &self.encryption_iv),
            (OuterHeaderId::StreamStartBytes, &self.stream_start_bytes),
        ];
        let headers = self
            .other_headers
            .iter()
            .cloned()
            .chain(self.cipher.map(HeaderField::from))
            .chain(self.compression_type.map(HeaderField::from))
            .chain(self.transform_rounds.map(|rounds| {
                HeaderField::new(OuterHeaderId::TransformRounds, rounds.to_le_bytes().to_vec())
            }))
            .chain(byte_fields.iter().filter_map(|(ty, data)| {
                data.as_ref()
                    .map(|data| HeaderField::new(*ty, data.clone()))
            }))
            .chain(std::iter::once(HeaderField::new(
                OuterHeaderId::EndOfHeader,
                END_OF_HEADER_DATA.to_vec(),
            )));

        for header in headers {
            let len = u16::try_from(header.data.len()).map_err(|_| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Header field {:?} longer than {} bytes", header.ty, u16::MAX),
                )
            })?;
            writer.write_all(&[header.ty.into()])?;
            writer.write_all(&len.to_le_bytes())?;
            writer.write_all(&header.data)?;
        }
        Ok(())
    }

    /// Borrow a byte field needed to check keys, failing if absent
    pub(crate) fn required_bytes(
        &self,
        id: OuterHeaderId,
    ) -> std::result::Result<&[u8], UnlockError> {
        let field = match id {
            OuterHeaderId::MasterSeed => self.master_seed.as_deref(),
            OuterHeaderId::TransformSeed => self.transform_seed.as_deref(),
            OuterHeaderId::EncryptionIv => self.encryption_iv.as_deref(),
            OuterHeaderId::StreamStartBytes => self.stream_start_bytes.as_deref(),
            _ => None,
        };
        field.ok_or(UnlockError::MissingRequiredField(id))
    }
}

fn write_hex_field(f: &mut fmt::Formatter<'_>, name: &str, field: &Option<Vec<u8>>) -> fmt::Result {
    match field {
        Some(data) => writeln!(f, "{}: {}", name, utils::to_hex_string(data)),
        None => writeln!(f, "{}: None", name),
    }
}

impl fmt::Display for SecurityHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex_field(f, "Master Seed", &self.master_seed)?;
        write_hex_field(f, "Encryption IV", &self.encryption_iv)?;
        match self.transform_rounds {
            Some(rounds) => writeln!(f, "Transform Rounds: {}", rounds)?,
            None => writeln!(f, "Transform Rounds: None")?,
        }
        write_hex_field(f, "Transform Seed", &self.transform_seed)?;
        write_hex_field(f, "Expected Start-Bytes", &self.stream_start_bytes)?;
        if let Some(cipher) = self.cipher {
            writeln!(f, "Cipher: {:?}", cipher)?;
        }
        if let Some(compression) = self.compression_type {
            writeln!(f, "Compression: {:?}", compression)?;
        }
        for other in &self.other_headers {
            writeln!(
                f,
                "Other header {:?}: {}",
                other.ty,
                utils::to_hex_string(&other.data)
            )?;
        }
        Ok(())
    }
}
