//! Compression handling for TIFF strips
//!
//! Container pages may be stored compressed; each supported method is a
//! strategy behind `CompressionHandler`.

mod handler;
mod uncompressed;
mod deflate;
mod factory;
mod zstd;

pub use handler::CompressionHandler;
pub use uncompressed::UncompressedHandler;
pub use deflate::AdobeDeflateHandler;
pub use factory::CompressionFactory;
pub use zstd::ZstdHandler;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_codes() {
        assert_eq!(CompressionFactory::create_handler(1).unwrap().name(), "Uncompressed");
        assert_eq!(CompressionFactory::create_handler(8).unwrap().name(), "Adobe Deflate");
        assert_eq!(CompressionFactory::create_handler(32946).unwrap().name(), "Adobe Deflate");
        assert_eq!(CompressionFactory::create_handler(14).unwrap().name(), "ZSTD");
        assert_eq!(CompressionFactory::create_handler(50000).unwrap().name(), "ZSTD");
        assert!(CompressionFactory::create_handler(5).is_err());
        assert!(CompressionFactory::create_handler(u64::MAX).is_err());
    }

    #[test]
    fn test_strip_round_trip() {
        let strip: Vec<u8> = (0..4096u32).map(|i| (i / 16) as u8).collect();
        for code in [1u64, 8, 50000] {
            let handler = CompressionFactory::create_handler(code).unwrap();
            let packed = handler.compress(&strip).unwrap();
            assert_eq!(handler.decompress(&packed).unwrap(), strip, "{}", handler.name());
        }
    }
}
