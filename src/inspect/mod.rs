//! Read-only diagnostics: chunk listing and pixel-data digests.
//!
//! Listing is lenient about checksums.  A bad CRC is reported on the
//! affected entry instead of aborting, so a damaged file can still be looked
//! at.  Structural damage (truncation, bad signature) is still fatal since
//! nothing past it can be located.

use serde::Serialize;

use crate::chunk::{ChunkIter, ChunkType};
use crate::error::Result;
use crate::policy::{classify, Disposition};
use crate::signature::check_signature;

/// One row of [`list_chunks`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkInfo {
    pub offset:      usize,
    pub chunk_type:  ChunkType,
    pub length:      u32,
    pub stored_crc:  u32,
    pub crc_ok:      bool,
    pub disposition: Disposition,
}

impl ChunkInfo {
    /// Full on-wire size.
    pub fn wire_len(&self) -> u64 {
        self.length as u64 + crate::chunk::CHUNK_OVERHEAD as u64
    }
}

pub fn list_chunks(input: &[u8]) -> Result<Vec<ChunkInfo>> {
    check_signature(input)?;
    ChunkIter::new(input)
        .map(|chunk| {
            let chunk = chunk?;
            Ok(ChunkInfo {
                offset:      chunk.offset,
                chunk_type:  chunk.chunk_type,
                length:      chunk.payload.len() as u32,
                stored_crc:  chunk.stored_crc,
                crc_ok:      chunk.crc_ok(),
                disposition: classify(chunk.chunk_type),
            })
        })
        .collect()
}

/// BLAKE3 over the `IDAT` payloads, concatenated in file order.
///
/// Stripping never touches `IDAT`, so the digest of a stripped file equals
/// the digest of its source.
pub fn pixel_digest(input: &[u8]) -> Result<[u8; 32]> {
    check_signature(input)?;
    let mut hasher = blake3::Hasher::new();
    for chunk in ChunkIter::new(input) {
        let chunk = chunk?;
        if chunk.chunk_type == ChunkType::IDAT {
            hasher.update(chunk.payload);
        }
    }
    Ok(hasher.finalize().into())
}

/// Bytes that [`strip`](crate::strip::strip) would remove, without building output.
pub fn removable_bytes(chunks: &[ChunkInfo]) -> u64 {
    chunks
        .iter()
        .filter(|c| !c.disposition.is_keep())
        .map(ChunkInfo::wire_len)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ContainerBuilder;
    use crate::policy::Category;

    #[test]
    fn lists_every_chunk_with_its_fate() {
        let data = ContainerBuilder::new()
            .chunk(ChunkType::IHDR, &ContainerBuilder::GRAY_1X1_IHDR)
            .chunk(ChunkType::bKGD, &[0, 0])
            .chunk_with_crc(ChunkType::tEXt, b"k\0v", 0xDEAD_BEEF)
            .chunk(ChunkType::IDAT, &ContainerBuilder::GRAY_1X1_IDAT)
            .chunk(ChunkType::IEND, &[])
            .finish();

        let rows = list_chunks(&data).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[1].disposition, Disposition::Drop(Category::Background));
        assert!(rows[1].crc_ok);
        assert_eq!(rows[2].stored_crc, 0xDEAD_BEEF);
        assert!(!rows[2].crc_ok);
        assert_eq!(rows[4].disposition, Disposition::Keep);
        assert_eq!(removable_bytes(&rows), 14 + 15);
    }

    #[test]
    fn digest_covers_only_pixel_data() {
        let plain = ContainerBuilder::minimal().finish();
        let noisy = ContainerBuilder::new()
            .chunk(ChunkType::IHDR, &ContainerBuilder::GRAY_1X1_IHDR)
            .chunk(ChunkType::tIME, &[0x07, 0xE8, 6, 1, 12, 0, 0])
            .chunk(ChunkType::IDAT, &ContainerBuilder::GRAY_1X1_IDAT)
            .chunk(ChunkType(*b"prVt"), b"vendor")
            .chunk(ChunkType::IEND, &[])
            .finish();
        assert_eq!(pixel_digest(&plain).unwrap(), pixel_digest(&noisy).unwrap());

        let other = ContainerBuilder::new()
            .chunk(ChunkType::IHDR, &ContainerBuilder::GRAY_1X1_IHDR)
            .chunk(ChunkType::IDAT, &[0x78, 0x9c, 0x63, 0xf8, 0x0f, 0x00, 0x01, 0x01, 0x01, 0x00])
            .chunk(ChunkType::IEND, &[])
            .finish();
        assert_ne!(pixel_digest(&plain).unwrap(), pixel_digest(&other).unwrap());
    }

    #[test]
    fn listing_serializes_type_as_text() {
        let rows = list_chunks(&ContainerBuilder::minimal().finish()).unwrap();
        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(json[0]["chunk_type"], "IHDR");
        assert_eq!(json[0]["disposition"]["action"], "keep");
    }
}
