use std::io;
use thiserror::Error;

use crate::chunk::ChunkType;

pub type Result<T> = std::result::Result<T, StripError>;

// ── Format errors ────────────────────────────────────────────────────────────

/// The input is not a structurally valid PNG container.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Input too short to be a PNG ({len} bytes)")]
    TooShort { len: usize },
    #[error("Invalid PNG signature")]
    BadSignature,
    #[error("Incomplete chunk header at offset {offset}")]
    IncompleteHeader { offset: usize },
    /// The declared length would read past the end of the buffer.
    #[error("Chunk at offset {offset} declares {declared} payload bytes, exceeding container bounds")]
    OutOfBounds { offset: usize, declared: u32 },
}

// ── Top-level error ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum StripError {
    #[error("Format error: {0}")]
    Format(#[from] FormatError),
    #[error("Checksum mismatch for chunk {chunk_type} at offset {offset} (stored {stored:08x}, computed {computed:08x})")]
    Integrity {
        chunk_type: ChunkType,
        offset:     usize,
        stored:     u32,
        computed:   u32,
    },
    #[error("Failed to read source: {0}")]
    SourceRead(#[source] io::Error),
    #[error("Failed to write sink: {0}")]
    SinkWrite(#[source] io::Error),
}

impl StripError {
    /// True for errors caused by the container bytes rather than by I/O.
    pub fn is_bad_data(&self) -> bool {
        matches!(self, StripError::Format(_) | StripError::Integrity { .. })
    }
}
