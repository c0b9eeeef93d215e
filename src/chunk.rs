//! PNG chunk layout and the bounds-checked chunk walker.
//!
//! # Wire layout
//!
//! | Field   | Size       | Encoding                                   |
//! |---------|------------|--------------------------------------------|
//! | length  | 4          | u32 big-endian, payload bytes only         |
//! | type    | 4          | ASCII, case-significant                    |
//! | payload | `length`   | opaque                                     |
//! | crc     | 4          | u32 big-endian, CRC-32 over `type ++ data` |
//!
//! Every chunk therefore occupies `CHUNK_OVERHEAD + length` bytes on disk.

use byteorder::{BigEndian, ByteOrder, ReadBytesExt, WriteBytesExt};
use crc32fast::Hasher;
use serde::{Serialize, Serializer};
use std::fmt;
use std::io::{self, Read, Write};
use std::iter::FusedIterator;

use crate::error::{FormatError, Result, StripError};
use crate::signature::SIGNATURE_LEN;

/// Length field + type field.
pub const CHUNK_HEADER_SIZE: usize = 8;
/// Length field + type field + CRC field.
pub const CHUNK_OVERHEAD:    usize = 12;

// ── ChunkType ────────────────────────────────────────────────────────────────

/// A four-byte chunk tag.  Comparison is exact; the case bits carry no
/// meaning here.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ChunkType(pub [u8; 4]);

#[allow(nonstandard_style)]
impl ChunkType {
    pub const IHDR: Self = Self(*b"IHDR");
    pub const PLTE: Self = Self(*b"PLTE");
    pub const IDAT: Self = Self(*b"IDAT");
    pub const IEND: Self = Self(*b"IEND");
    pub const tRNS: Self = Self(*b"tRNS");
    pub const gAMA: Self = Self(*b"gAMA");
    pub const cHRM: Self = Self(*b"cHRM");
    pub const sRGB: Self = Self(*b"sRGB");
    pub const iCCP: Self = Self(*b"iCCP");
    pub const sBIT: Self = Self(*b"sBIT");
    pub const pHYs: Self = Self(*b"pHYs");
    pub const tEXt: Self = Self(*b"tEXt");
    pub const zTXt: Self = Self(*b"zTXt");
    pub const iTXt: Self = Self(*b"iTXt");
    pub const tIME: Self = Self(*b"tIME");
    pub const bKGD: Self = Self(*b"bKGD");
    pub const eXIf: Self = Self(*b"eXIf");
}

impl ChunkType {
    #[inline]
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Serialize for ChunkType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ── ChunkHeader ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub length:     u32,
    pub chunk_type: ChunkType,
}

impl ChunkHeader {
    pub fn read<R: Read>(mut reader: R) -> io::Result<Self> {
        let length = reader.read_u32::<BigEndian>()?;
        let mut tag = [0u8; 4];
        reader.read_exact(&mut tag)?;
        Ok(Self { length, chunk_type: ChunkType(tag) })
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u32::<BigEndian>(self.length)?;
        writer.write_all(&self.chunk_type.0)?;
        Ok(())
    }
}

/// CRC-32 (IEEE, as used by gzip) over `type ++ payload`.
pub fn chunk_crc(chunk_type: ChunkType, payload: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&chunk_type.0);
    hasher.update(payload);
    hasher.finalize()
}

/// Write one well-formed chunk with a freshly computed CRC.
pub fn write_chunk<W: Write>(writer: W, chunk_type: ChunkType, payload: &[u8]) -> io::Result<()> {
    write_chunk_with_crc(writer, chunk_type, payload, chunk_crc(chunk_type, payload))
}

/// Write one chunk with the given CRC, which need not match.
pub fn write_chunk_with_crc<W: Write>(
    mut writer: W,
    chunk_type: ChunkType,
    payload:    &[u8],
    crc:        u32,
) -> io::Result<()> {
    let length = u32::try_from(payload.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "chunk payload exceeds u32::MAX"))?;
    ChunkHeader { length, chunk_type }.write(&mut writer)?;
    writer.write_all(payload)?;
    writer.write_u32::<BigEndian>(crc)?;
    Ok(())
}

// ── RawChunk ─────────────────────────────────────────────────────────────────

/// A borrowed, structurally valid chunk.  The CRC has not been checked yet.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RawChunk<'a> {
    /// Absolute offset of the length field within the container.
    pub offset:     usize,
    pub chunk_type: ChunkType,
    pub payload:    &'a [u8],
    pub stored_crc: u32,
    /// The complete on-wire bytes: length, type, payload and CRC.
    pub wire:       &'a [u8],
}

impl RawChunk<'_> {
    #[inline]
    pub fn wire_len(&self) -> usize {
        self.wire.len()
    }

    #[inline]
    pub fn computed_crc(&self) -> u32 {
        chunk_crc(self.chunk_type, self.payload)
    }

    pub fn crc_ok(&self) -> bool {
        self.computed_crc() == self.stored_crc
    }

    pub fn verify(&self) -> Result<()> {
        let computed = self.computed_crc();
        if computed != self.stored_crc {
            return Err(StripError::Integrity {
                chunk_type: self.chunk_type,
                offset:     self.offset,
                stored:     self.stored_crc,
                computed,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for RawChunk<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawChunk")
            .field("offset", &self.offset)
            .field("chunk_type", &self.chunk_type)
            .field("payload", &(&self.payload[..self.payload.len().min(12)], self.payload.len()))
            .field("stored_crc", &format_args!("{:08x}", self.stored_crc))
            .finish()
    }
}

// ── ChunkIter ────────────────────────────────────────────────────────────────

/// Walks the chunks that follow the signature.
///
/// The signature itself is not checked; callers run
/// [`check_signature`](crate::signature::check_signature) first.  Bounds are
/// validated before any slicing.  After the first error the iterator is
/// exhausted.
#[derive(Debug, Clone)]
pub struct ChunkIter<'a> {
    data:   &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> ChunkIter<'a> {
    /// Pass the full container bytes, the signature is skipped automatically.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: SIGNATURE_LEN.min(data.len()), failed: false }
    }

    /// Offset of the next chunk to be read.
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn read_chunk(&self) -> Result<RawChunk<'a>> {
        let offset = self.offset;
        let rest   = &self.data[offset..];
        if rest.len() < CHUNK_HEADER_SIZE {
            return Err(FormatError::IncompleteHeader { offset }.into());
        }
        let header = ChunkHeader::read(&rest[..CHUNK_HEADER_SIZE])
            .map_err(|_| FormatError::IncompleteHeader { offset })?;

        let out_of_bounds = FormatError::OutOfBounds { offset, declared: header.length };
        let payload_len = usize::try_from(header.length).map_err(|_| out_of_bounds.clone())?;
        let total = payload_len
            .checked_add(CHUNK_OVERHEAD)
            .filter(|&t| t <= rest.len())
            .ok_or(out_of_bounds)?;

        let wire       = &rest[..total];
        let payload    = &wire[CHUNK_HEADER_SIZE..CHUNK_HEADER_SIZE + payload_len];
        let stored_crc = BigEndian::read_u32(&wire[CHUNK_HEADER_SIZE + payload_len..]);

        Ok(RawChunk { offset, chunk_type: header.chunk_type, payload, stored_crc, wire })
    }
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = Result<RawChunk<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.data.len() {
            return None;
        }
        match self.read_chunk() {
            Ok(chunk) => {
                self.offset += chunk.wire_len();
                Some(Ok(chunk))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for ChunkIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::PNG_SIGNATURE;

    fn container(chunks: &[(ChunkType, &[u8])]) -> Vec<u8> {
        let mut out = PNG_SIGNATURE.to_vec();
        for (t, p) in chunks {
            write_chunk(&mut out, *t, p).unwrap();
        }
        out
    }

    #[test]
    fn iend_crc_matches_reference() {
        // Every PNG ends with this exact IEND chunk.
        assert_eq!(chunk_crc(ChunkType::IEND, &[]), 0xAE42_6082);
        let mut buf = Vec::new();
        write_chunk(&mut buf, ChunkType::IEND, &[]).unwrap();
        assert_eq!(buf, [0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]);
    }

    #[test]
    fn walks_chunks_in_order() {
        let data = container(&[
            (ChunkType::IHDR, &[1u8; 13][..]),
            (ChunkType::tEXt, &b"a\0b"[..]),
            (ChunkType::IEND, &[][..]),
        ]);
        let chunks: Vec<_> = ChunkIter::new(&data).collect::<Result<_>>().unwrap();
        let types: Vec<_> = chunks.iter().map(|c| c.chunk_type).collect();
        assert_eq!(types, [ChunkType::IHDR, ChunkType::tEXt, ChunkType::IEND]);
        assert_eq!(chunks[0].offset, 8);
        assert_eq!(chunks[1].offset, 8 + 12 + 13);
        assert_eq!(chunks[1].payload, b"a\0b");
        assert_eq!(chunks[1].wire_len(), 15);
        assert!(chunks.iter().all(|c| c.crc_ok()));
    }

    #[test]
    fn incomplete_header_is_reported_once() {
        let mut data = container(&[(ChunkType::IEND, &[][..])]);
        data.extend_from_slice(&[0, 0, 0]);
        let mut it = ChunkIter::new(&data);
        assert!(it.next().unwrap().is_ok());
        match it.next() {
            Some(Err(StripError::Format(FormatError::IncompleteHeader { offset }))) => {
                assert_eq!(offset, 20)
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(it.next().is_none());
    }

    #[test]
    fn oversized_length_is_rejected_before_slicing() {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend_from_slice(&u32::MAX.to_be_bytes());
        data.extend_from_slice(b"IDAT");
        data.extend_from_slice(&[0; 4]);
        let err = ChunkIter::new(&data).next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            StripError::Format(FormatError::OutOfBounds { offset: 8, declared: u32::MAX })
        ));
    }

    #[test]
    fn verify_reports_type_and_offset() {
        let mut data = container(&[
            (ChunkType::IHDR, &[0u8; 13][..]),
            (ChunkType::gAMA, &[0u8, 0, 0xB1, 0x8F][..]),
        ]);
        let last = data.len() - 1;
        data[last] ^= 0x01;
        let chunk = ChunkIter::new(&data).nth(1).unwrap().unwrap();
        match chunk.verify() {
            Err(StripError::Integrity { chunk_type, offset, .. }) => {
                assert_eq!(chunk_type, ChunkType::gAMA);
                assert_eq!(offset, 33);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn display_escapes_non_printable_tags() {
        assert_eq!(ChunkType::tEXt.to_string(), "tEXt");
        assert_eq!(ChunkType([b'a', 0, b'b', 0xff]).to_string(), "a\\x00b\\xff");
    }
}
