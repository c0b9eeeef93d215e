//! Synthetic container assembly for tests, benchmarks and fixtures.

use crate::chunk::{write_chunk, write_chunk_with_crc, ChunkType};
use crate::signature::PNG_SIGNATURE;

/// Appends chunks after the PNG signature.
///
/// ```
/// use pngstrip::{builder::ContainerBuilder, chunk::ChunkType, strip};
///
/// let png = ContainerBuilder::new()
///     .chunk(ChunkType::IHDR, &ContainerBuilder::GRAY_1X1_IHDR)
///     .chunk(ChunkType::tEXt, b"Author\0someone")
///     .chunk(ChunkType::IDAT, &ContainerBuilder::GRAY_1X1_IDAT)
///     .chunk(ChunkType::IEND, &[])
///     .finish();
/// let (clean, stats) = strip(&png)?;
/// assert_eq!(stats.text, 12 + 14);
/// assert_eq!(clean.len() + 26, png.len());
/// # Ok::<(), pngstrip::StripError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ContainerBuilder {
    buf: Vec<u8>,
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerBuilder {
    /// 1x1, 8-bit greyscale, non-interlaced.
    pub const GRAY_1X1_IHDR: [u8; 13] = [0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0];
    /// zlib stream of one scanline: filter byte 0, pixel 0.
    pub const GRAY_1X1_IDAT: [u8; 10] = [0x78, 0x9c, 0x63, 0x60, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01];

    pub fn new() -> Self {
        Self { buf: PNG_SIGNATURE.to_vec() }
    }

    /// The smallest useful image: `IHDR`, `IDAT`, `IEND`.
    pub fn minimal() -> Self {
        Self::new()
            .chunk(ChunkType::IHDR, &Self::GRAY_1X1_IHDR)
            .chunk(ChunkType::IDAT, &Self::GRAY_1X1_IDAT)
            .chunk(ChunkType::IEND, &[])
    }

    /// # Panics
    /// If `payload` is longer than `u32::MAX` bytes.
    pub fn chunk(mut self, chunk_type: ChunkType, payload: &[u8]) -> Self {
        if let Err(e) = write_chunk(&mut self.buf, chunk_type, payload) {
            panic!("cannot encode {chunk_type} chunk: {e}");
        }
        self
    }

    /// Append a chunk with an explicit, possibly wrong, CRC.
    ///
    /// # Panics
    /// If `payload` is longer than `u32::MAX` bytes.
    pub fn chunk_with_crc(mut self, chunk_type: ChunkType, payload: &[u8], crc: u32) -> Self {
        if let Err(e) = write_chunk_with_crc(&mut self.buf, chunk_type, payload, crc) {
            panic!("cannot encode {chunk_type} chunk: {e}");
        }
        self
    }

    /// Bytes written so far, signature included.
    pub fn byte_len(&self) -> usize {
        self.buf.len()
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::chunk_crc;

    #[test]
    fn builder_output_matches_chunk_encoder() {
        let mut expected = PNG_SIGNATURE.to_vec();
        write_chunk(&mut expected, ChunkType::tEXt, b"k\0v").unwrap();
        write_chunk_with_crc(&mut expected, ChunkType::IEND, &[], 0).unwrap();

        let built = ContainerBuilder::new()
            .chunk(ChunkType::tEXt, b"k\0v")
            .chunk_with_crc(ChunkType::IEND, &[], 0);
        assert_eq!(built.byte_len(), expected.len());
        assert_eq!(built.finish(), expected);
    }

    #[test]
    fn byte_len_counts_signature() {
        assert_eq!(ContainerBuilder::new().byte_len(), PNG_SIGNATURE.len());
        let b = ContainerBuilder::new().chunk(ChunkType::IEND, &[]);
        assert_eq!(b.byte_len(), PNG_SIGNATURE.len() + 12);
        let bytes = b.finish();
        assert_eq!(&bytes[16..], &chunk_crc(ChunkType::IEND, &[]).to_be_bytes());
    }
}
