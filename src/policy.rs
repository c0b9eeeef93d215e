//! The fixed keep/drop table.
//!
//! Classification is by exact chunk-type identity.  The PNG naming
//! convention (lowercase first letter = ancillary) is deliberately not
//! consulted: an unknown critical-looking type is still dropped.

use serde::{Deserialize, Serialize};

use crate::chunk::ChunkType;

/// Chunk types that survive stripping, byte for byte.
pub const PRESERVED: [ChunkType; 11] = [
    // Core
    ChunkType::IHDR,
    ChunkType::PLTE,
    ChunkType::IDAT,
    ChunkType::IEND,
    // Transparency
    ChunkType::tRNS,
    // Colour space
    ChunkType::gAMA,
    ChunkType::cHRM,
    ChunkType::sRGB,
    ChunkType::iCCP,
    ChunkType::sBIT,
    // Physical dimensions
    ChunkType::pHYs,
];

// ── Category ─────────────────────────────────────────────────────────────────

/// Statistics bucket for a dropped chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// `tEXt`, `zTXt`, `iTXt`
    Text,
    /// `tIME`
    Time,
    /// `bKGD`
    Background,
    /// `eXIf`
    Exif,
    /// Everything else, recognised or not.
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Text,
        Category::Time,
        Category::Background,
        Category::Exif,
        Category::Other,
    ];

    /// Human-readable name (diagnostics only).
    pub fn name(self) -> &'static str {
        match self {
            Category::Text       => "text",
            Category::Time       => "time",
            Category::Background => "background",
            Category::Exif       => "exif",
            Category::Other      => "other",
        }
    }

    fn of(chunk_type: ChunkType) -> Self {
        match chunk_type {
            ChunkType::tEXt | ChunkType::zTXt | ChunkType::iTXt => Category::Text,
            ChunkType::tIME => Category::Time,
            ChunkType::bKGD => Category::Background,
            ChunkType::eXIf => Category::Exif,
            _               => Category::Other,
        }
    }
}

// ── Disposition ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "category", rename_all = "lowercase")]
pub enum Disposition {
    Keep,
    Drop(Category),
}

impl Disposition {
    #[inline]
    pub fn is_keep(self) -> bool {
        matches!(self, Disposition::Keep)
    }
}

#[inline]
pub fn is_preserved(chunk_type: ChunkType) -> bool {
    PRESERVED.contains(&chunk_type)
}

pub fn classify(chunk_type: ChunkType) -> Disposition {
    if is_preserved(chunk_type) {
        Disposition::Keep
    } else {
        Disposition::Drop(Category::of(chunk_type))
    }
}
