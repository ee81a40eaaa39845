use super::{errors, header, Kdbx};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

fn read_preamble_word<R: Read>(input: &mut R) -> Result<u32, errors::OpenError> {
    let mut buffer = [0u8; 4];
    input.read_exact(&mut buffer).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => errors::HeaderError::TruncatedPreamble.into(),
        _ => errors::OpenError::from(e),
    })?;
    Ok(u32::from_le_bytes(buffer))
}

/// Read a database from a input stream
///
/// Consumes the signatures, version and header fields, then keeps as
/// many encrypted bytes as are needed to check the stream start bytes.
/// The rest of the input is left unread.
pub fn from_reader<R: Read>(mut input: R) -> Result<Kdbx, errors::OpenError> {
    let signature_one = read_preamble_word(&mut input)?;
    let signature_two = read_preamble_word(&mut input)?;

    let known_signature = signature_one == super::KEEPASS_MAGIC_NUMBER
        && (signature_two == super::KDBX_MAGIC_NUMBER
            || signature_two == super::KDBX_PRERELEASE_MAGIC_NUMBER);
    if !known_signature {
        return Err(errors::OpenError::InvalidSignature(
            signature_one,
            signature_two,
        ));
    }

    let version = read_preamble_word(&mut input)?;
    let minor_version = (version & 0xFFFF) as u16;
    let major_version = (version >> 16) as u16;
    if major_version >= 4 {
        log::warn!(
            "KDBX {}.{} uses a different header layout, parsing may fail",
            major_version,
            minor_version
        );
    }

    let header = header::SecurityHeader::read(&mut input)?;

    let wanted = header
        .stream_start_bytes
        .as_ref()
        .map(|start_bytes| crate::stream::block_aligned_len(start_bytes.len()))
        .unwrap_or(0);
    let mut body_start = Vec::with_capacity(wanted);
    input.take(wanted as u64).read_to_end(&mut body_start)?;
    log::debug!(
        "Read KDBX {}.{} header, kept {} body bytes",
        major_version,
        minor_version,
        body_start.len()
    );

    Ok(Kdbx {
        header,
        major_version,
        minor_version,
        body_start,
    })
}

/// Read a database from a given path
///
/// The file is closed once the header and body start have been read.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Kdbx, errors::OpenError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    from_reader(io::BufReader::new(file))
}
