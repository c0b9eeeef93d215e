//! Reader/writer wrappers around [`strip`].
//!
//! The filter itself never performs I/O.  These helpers buffer the whole
//! source first and emit the result in a single write, so an I/O failure is
//! always reported as [`StripError::SourceRead`] or [`StripError::SinkWrite`]
//! and never mixed up with a format or integrity problem.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{Result, StripError};
use crate::stats::RemovalStats;
use crate::strip::strip;

/// Read `reader` to the end, then strip.
pub fn strip_reader<R: Read>(mut reader: R) -> Result<(Vec<u8>, RemovalStats)> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data).map_err(StripError::SourceRead)?;
    strip(&data)
}

/// Strip `input` and write the result to `writer` in one call.
///
/// Nothing is written when stripping fails.
pub fn strip_to_writer<W: Write>(input: &[u8], mut writer: W) -> Result<RemovalStats> {
    let (cleaned, stats) = strip(input)?;
    writer.write_all(&cleaned).map_err(StripError::SinkWrite)?;
    writer.flush().map_err(StripError::SinkWrite)?;
    Ok(stats)
}

/// Read the whole file at `path`.
pub fn read_source<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let file = File::open(path.as_ref()).map_err(StripError::SourceRead)?;
    let mut data = Vec::new();
    BufReader::new(file).read_to_end(&mut data).map_err(StripError::SourceRead)?;
    Ok(data)
}

/// Replace `dst` with `bytes` atomically.
///
/// The bytes go to a temporary file next to `dst`, which is synced and then
/// renamed over it.  On failure `dst` keeps its previous contents and the
/// temporary file is removed.
pub fn write_atomic<P: AsRef<Path>>(dst: P, bytes: &[u8]) -> Result<()> {
    let dst = dst.as_ref();
    let dir = match dst.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _                                    => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(StripError::SinkWrite)?;
    tmp.write_all(bytes).map_err(StripError::SinkWrite)?;
    tmp.as_file().sync_all().map_err(StripError::SinkWrite)?;
    tmp.persist(dst).map_err(|e| StripError::SinkWrite(e.error))?;
    Ok(())
}

/// Strip the file at `src` into `dst`.
///
/// `dst` is only touched once the source has been filtered successfully,
/// and then replaced atomically, so `src` and `dst` may name the same file.
pub fn strip_file<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Result<RemovalStats> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    let data = read_source(src)?;
    let (cleaned, stats) = strip(&data)?;
    write_atomic(dst, &cleaned)?;

    info!(src = %src.display(), dst = %dst.display(), removed = stats.total, "stripped file");
    Ok(stats)
}
