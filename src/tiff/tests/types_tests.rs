//! Tests for IFD parsing and page decoding

use crate::io::byte_order::ByteOrder;
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::reader::TiffReader;
use crate::tiff::strip_reader::StripReader;
use crate::tiff::types::TIFF;
use crate::compression::{AdobeDeflateHandler, CompressionHandler, ZstdHandler};
use crate::tiff::errors::TiffError;
use super::test_utils::{
    create_big_endian_tiff_buffer, create_bigtiff_description_buffer, create_compressed_tiff_buffer,
    create_two_strip_tiff_buffer,
};

#[test]
fn test_tiff_creation() {
    let tiff = TIFF::new(false, ByteOrder::LittleEndian);
    assert!(!tiff.is_big_tiff);
    assert_eq!(tiff.ifd_count(), 0);
    assert!(tiff.main_ifd().is_none());
}

#[test]
fn test_ifd_replaces_duplicate_tags() {
    let mut ifd = IFD::new(0, 8);
    ifd.add_entry(IFDEntry::new(256, 4, 1, 1024));
    ifd.add_entry(IFDEntry::new(257, 4, 1, 768));
    ifd.add_entry(IFDEntry::new(256, 4, 1, 512));

    assert_eq!(ifd.entry_count(), 2);
    assert_eq!(ifd.get_dimensions(), Some((512, 768)));
    assert_eq!(ifd.get_samples_per_pixel(), 1);
}

#[test]
fn test_read_multi_strip_page() {
    let mut cursor = create_two_strip_tiff_buffer();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    assert_eq!(tiff.ifd_count(), 1);
    let ifd = &tiff.ifds[0];
    assert_eq!(ifd.get_dimensions(), Some((4, 2)));
    assert_eq!(reader.read_tag_values(&mut cursor, ifd, 273).unwrap(), vec![8, 12]);

    let page = StripReader::new(&reader, ifd).read_page(&mut cursor).unwrap();
    assert_eq!(page.bits_per_sample, 8);
    assert_eq!(page.data, vec![1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn test_read_big_endian_page_is_normalised() {
    let mut cursor = create_big_endian_tiff_buffer();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    assert_eq!(tiff.byte_order, ByteOrder::BigEndian);
    let ifd = &tiff.ifds[0];
    assert_eq!(ifd.get_dimensions(), Some((2, 1)));

    let page = StripReader::new(&reader, ifd).read_page(&mut cursor).unwrap();
    assert_eq!(page.bits_per_sample, 16);
    assert_eq!(page.data, vec![0x02, 0x01, 0x04, 0x03]);
}

#[test]
fn test_read_compressed_pages() {
    let pixels: Vec<u8> = (0..64).map(|i| (i % 7) as u8).collect();
    let handlers: [Box<dyn CompressionHandler>; 2] = [Box::new(AdobeDeflateHandler), Box::new(ZstdHandler::new())];

    for handler in handlers.iter() {
        let mut cursor = create_compressed_tiff_buffer(handler.as_ref(), &pixels);
        let mut reader = TiffReader::new();
        let tiff = reader.read(&mut cursor).unwrap();

        let page = StripReader::new(&reader, &tiff.ifds[0]).read_page(&mut cursor).unwrap();
        assert_eq!(page.data, pixels, "{} strip", handler.name());
    }
}

#[test]
fn test_unknown_compression_rejected() {
    let mut cursor = create_two_strip_tiff_buffer();
    let mut reader = TiffReader::new();
    let mut tiff = reader.read(&mut cursor).unwrap();
    tiff.ifds[0].add_entry(IFDEntry::new(259, 3, 1, 5));

    let result = StripReader::new(&reader, &tiff.ifds[0]).read_page(&mut cursor);
    assert!(matches!(result, Err(TiffError::UnsupportedCompression(5))));
}

#[test]
fn test_tag_count_past_end_of_file_rejected() {
    let mut cursor = create_bigtiff_description_buffer(2, 1 << 40);
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    assert!(tiff.is_big_tiff);

    let result = reader.read_ascii(&mut cursor, &tiff.ifds[0], 270);
    assert!(matches!(result, Err(TiffError::GenericError(_))));
}

#[test]
fn test_tag_payload_overflow_rejected() {
    let mut cursor = create_bigtiff_description_buffer(16, u64::MAX);
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();

    let entry = tiff.ifds[0].get_entry(270).unwrap();
    assert_eq!(entry.payload_size(), None);
    assert!(!entry.is_value_inline(true));

    let result = reader.read_ascii(&mut cursor, &tiff.ifds[0], 270);
    assert!(matches!(result, Err(TiffError::GenericError(_))));
}
