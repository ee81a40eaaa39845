mod common;

use common::{field, KdbxFile, MARKER, MASTER_SEED};
use kdbx_passwd::binary::{Cipher, CompressionType, OuterHeaderId};
use kdbx_passwd::errors::{HeaderError, OpenError};
use std::io::Read;

#[test]
fn load_kdbx31_fields() {
    let file = common::sample_file("test", 6000);
    let db = kdbx_passwd::from_reader(&*file).unwrap();

    assert_eq!(db.major_version(), 3);
    assert_eq!(db.minor_version(), 1);
    assert_eq!(db.header().master_seed.as_deref(), Some(&MASTER_SEED[..]));
    assert_eq!(db.header().transform_seed, Some(vec![0u8; 32]));
    assert_eq!(db.header().transform_rounds, Some(6000));
    assert_eq!(db.header().encryption_iv, Some(vec![0u8; 16]));
    assert_eq!(db.header().stream_start_bytes, Some(MARKER.to_vec()));
    assert_eq!(db.header().cipher, None);
    assert_eq!(db.header().other_headers, Vec::new());
    assert_eq!(db.body_start().len(), 16);
}

#[test]
fn load_from_file() {
    let mut file_path = std::env::temp_dir();
    file_path.push(format!("kdbx-passwd-load-{}.kdbx", std::process::id()));
    std::fs::write(&file_path, common::sample_file("test", 10)).unwrap();

    let db = kdbx_passwd::open(&file_path);
    std::fs::remove_file(&file_path).unwrap();
    assert_eq!(db.unwrap().header().transform_rounds, Some(10));
}

#[test]
fn fields_in_any_order() {
    let file = KdbxFile::new()
        .field(9, &MARKER)
        .field(6, &2u64.to_le_bytes())
        .field(7, &[1u8; 16])
        .field(4, &[2u8; 32])
        .field(5, &[3u8; 32])
        .build();
    let db = kdbx_passwd::from_reader(&*file).unwrap();
    let header = db.header();
    assert_eq!(header.stream_start_bytes, Some(MARKER.to_vec()));
    assert_eq!(header.transform_rounds, Some(2));
    assert_eq!(header.encryption_iv, Some(vec![1u8; 16]));
    assert_eq!(header.master_seed, Some(vec![2u8; 32]));
    assert_eq!(header.transform_seed, Some(vec![3u8; 32]));
}

#[test]
fn unknown_fields_are_skipped() {
    let file = KdbxFile::new()
        .field(4, &[2u8; 32])
        .field(0x42, &[0xff; 300])
        .field(6, &7u64.to_le_bytes())
        .field(0x80, &[])
        .field(1, b"a comment")
        .field(9, &MARKER)
        .build();
    let db = kdbx_passwd::from_reader(&*file).unwrap();
    let header = db.header();
    assert_eq!(header.master_seed, Some(vec![2u8; 32]));
    assert_eq!(header.transform_rounds, Some(7));
    assert_eq!(header.stream_start_bytes, Some(MARKER.to_vec()));
    let others: Vec<_> = header.other_headers.iter().map(|f| f.ty()).collect();
    assert_eq!(
        others,
        vec![
            OuterHeaderId::Unknown(0x42),
            OuterHeaderId::Unknown(0x80),
            OuterHeaderId::Comment
        ]
    );
    assert_eq!(header.other_headers[2].data(), b"a comment");
}

#[test]
fn absent_fields_stay_absent() {
    let file = KdbxFile::new().field(4, &[]).build();
    let db = kdbx_passwd::from_reader(&*file).unwrap();
    assert_eq!(db.header().master_seed, Some(Vec::new()));
    assert_eq!(db.header().transform_seed, None);
    assert_eq!(db.header().transform_rounds, None);
    assert_eq!(db.header().encryption_iv, None);
    assert_eq!(db.header().stream_start_bytes, None);
    assert!(db.body_start().is_empty());
}

#[test]
fn cipher_and_compression_decoded() {
    let aes256 = [
        0x31, 0xc1, 0xf2, 0xe6, 0xbf, 0x71, 0x43, 0x50, 0xbe, 0x58, 0x05, 0x21, 0x6a, 0xfc, 0x5a,
        0xff,
    ];
    let file = KdbxFile::new()
        .field(2, &aes256)
        .field(3, &1u32.to_le_bytes())
        .build();
    let db = kdbx_passwd::from_reader(&*file).unwrap();
    assert_eq!(db.header().cipher, Some(Cipher::Aes256));
    assert_eq!(db.header().compression_type, Some(CompressionType::Gzip));
}

#[test]
fn odd_sized_cipher_and_compression_skipped() {
    let file = KdbxFile::new()
        .field(2, &[1, 2, 3])
        .field(3, &[])
        .field(4, &MASTER_SEED)
        .field(6, &9u64.to_le_bytes())
        .field(9, &MARKER)
        .build();
    let db = kdbx_passwd::from_reader(&*file).unwrap();
    let header = db.header();
    assert_eq!(header.cipher, None);
    assert_eq!(header.compression_type, None);
    assert_eq!(header.master_seed.as_deref(), Some(&MASTER_SEED[..]));
    assert_eq!(header.transform_rounds, Some(9));
    assert_eq!(header.stream_start_bytes, Some(MARKER.to_vec()));
    let others: Vec<_> = header.other_headers.iter().map(|f| f.ty()).collect();
    assert_eq!(
        others,
        vec![OuterHeaderId::CipherId, OuterHeaderId::CompressionFlags]
    );
}

#[test]
fn prerelease_signature_accepted() {
    let file = KdbxFile::new()
        .signatures(common::SIGNATURE_ONE, common::SIGNATURE_TWO_PRERELEASE)
        .field(4, &[1u8; 32])
        .build();
    assert!(kdbx_passwd::from_reader(&*file).is_ok());
}

#[test]
fn other_signatures_rejected() {
    let pairs = [
        (0x9AA2_D903, 0xB54B_FB65),
        (0x9AA2_D902, 0xB54B_FB67),
        (0xB54B_FB67, 0x9AA2_D903),
        (0, 0),
    ];
    for (one, two) in pairs.iter() {
        let file = KdbxFile::new()
            .signatures(*one, *two)
            .field(4, &[1u8; 32])
            .build();
        match kdbx_passwd::from_reader(&*file) {
            Err(OpenError::InvalidSignature(a, b)) => {
                assert_eq!((a, b), (*one, *two));
            }
            other => panic!("Expected invalid signature, got {:?}", other),
        }
    }
}

#[test]
fn version_is_not_validated() {
    let file = KdbxFile::new()
        .version(0x0009_0000)
        .field(4, &[1u8; 32])
        .build();
    let db = kdbx_passwd::from_reader(&*file).unwrap();
    assert_eq!(db.major_version(), 9);
    assert_eq!(db.minor_version(), 0);
}

#[test]
fn truncated_field_data() {
    let mut file = KdbxFile::new().unterminated();
    file.extend(&field(4, &[1u8; 32])[..20]);
    let result = kdbx_passwd::from_reader(&*file);
    assert!(matches!(
        result,
        Err(OpenError::InvalidHeader(HeaderError::TruncatedField(
            OuterHeaderId::MasterSeed
        )))
    ));
}

#[test]
fn truncated_field_length() {
    let mut file = KdbxFile::new().unterminated();
    file.extend_from_slice(&[6, 8]);
    let result = kdbx_passwd::from_reader(&*file);
    assert!(matches!(
        result,
        Err(OpenError::InvalidHeader(HeaderError::TruncatedField(
            OuterHeaderId::TransformRounds
        )))
    ));
}

#[test]
fn truncated_preamble() {
    let file = KdbxFile::new().unterminated();
    let result = kdbx_passwd::from_reader(&file[..10]);
    assert!(matches!(
        result,
        Err(OpenError::InvalidHeader(HeaderError::TruncatedPreamble))
    ));
}

#[test]
fn missing_end_of_header() {
    let file = KdbxFile::new().field(4, &[1u8; 32]).unterminated();
    let result = kdbx_passwd::from_reader(&*file);
    assert!(matches!(
        result,
        Err(OpenError::InvalidHeader(HeaderError::MissingEndOfHeader))
    ));
}

#[test]
fn reader_left_at_body() {
    let body: Vec<u8> = (0..40).collect();
    let file = KdbxFile::new().field(9, &MARKER).body(&body).build();
    let mut input = &*file;
    let db = kdbx_passwd::from_reader(&mut input).unwrap();

    // One block for the 4 marker bytes is kept, the rest stays unread
    assert_eq!(db.body_start(), &body[..16]);
    let mut rest = Vec::new();
    input.read_to_end(&mut rest).unwrap();
    assert_eq!(rest, &body[16..]);
}
