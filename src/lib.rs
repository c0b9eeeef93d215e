//! Strip descriptive metadata from PNG files while leaving pixel data and
//! rendering-relevant chunks bit-for-bit intact.
//!
//! ```
//! use pngstrip::builder::ContainerBuilder;
//!
//! let png = ContainerBuilder::minimal().finish();
//! let (clean, stats) = pngstrip::strip(&png)?;
//! assert_eq!(clean, png);
//! assert_eq!(stats.total, 0);
//! # Ok::<(), pngstrip::StripError>(())
//! ```

pub mod error;
pub mod signature;
pub mod chunk;
pub mod policy;
pub mod stats;
pub mod strip;
pub mod io_stream;
pub mod inspect;
pub mod batch;
pub mod builder;

pub use error::{FormatError, Result, StripError};
pub use signature::PNG_SIGNATURE;
pub use chunk::{ChunkType, RawChunk, ChunkIter};
pub use policy::{Category, Disposition, classify};
pub use stats::RemovalStats;
pub use strip::strip;
pub use io_stream::{read_source, strip_reader, strip_to_writer, strip_file, write_atomic};
