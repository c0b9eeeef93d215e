//! The metadata filter: one pass over the container, copying kept chunks
//! verbatim and accounting for dropped ones.
//!
//! Any anomaly is fatal.  A container with one bad chunk produces no output
//! at all, only the error describing where it went wrong.

use tracing::{debug, trace};

use crate::chunk::ChunkIter;
use crate::error::Result;
use crate::policy::{classify, Disposition};
use crate::signature::{check_signature, SIGNATURE_LEN};
use crate::stats::RemovalStats;

/// Strip non-essential chunks from a complete PNG byte stream.
///
/// Returns the filtered container and the per-category removal figures.
/// Preserved chunks are sliced out of `input` unchanged; their CRC is only
/// verified, never recomputed.
pub fn strip(input: &[u8]) -> Result<(Vec<u8>, RemovalStats)> {
    check_signature(input)?;

    let mut output = Vec::with_capacity(input.len());
    output.extend_from_slice(&input[..SIGNATURE_LEN]);
    let mut stats = RemovalStats::default();
    let mut kept  = 0usize;

    for chunk in ChunkIter::new(input) {
        let chunk = chunk?;
        chunk.verify()?;

        match classify(chunk.chunk_type) {
            Disposition::Keep => {
                trace!(chunk_type = %chunk.chunk_type, offset = chunk.offset, len = chunk.payload.len(), "keep");
                output.extend_from_slice(chunk.wire);
                kept += 1;
            }
            Disposition::Drop(category) => {
                debug!(
                    chunk_type = %chunk.chunk_type,
                    offset = chunk.offset,
                    bytes = chunk.wire_len(),
                    category = category.name(),
                    "drop"
                );
                stats.record(category, chunk.wire_len() as u64);
            }
        }
    }

    debug!(input = input.len(), output = output.len(), kept, removed = stats.total, "strip complete");
    Ok((output, stats))
}
