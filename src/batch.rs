//! Strip many independent containers at once.
//!
//! [`strip`] holds no shared state, so each input is processed on its own.
//! With the `parallel` feature the calls are spread over Rayon's global
//! pool; without it they run one after another.  Either way the results come
//! back in input order and a failure in one entry never affects another.

use serde::Serialize;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::Result;
use crate::stats::RemovalStats;
use crate::strip::strip;

pub type BatchResult = Result<(Vec<u8>, RemovalStats)>;

pub fn strip_batch(inputs: &[&[u8]]) -> Vec<BatchResult> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        inputs.par_iter().map(|input| strip(input)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        inputs.iter().map(|input| strip(input)).collect()
    }
}

// ── Output naming ────────────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OutputPathError {
    #[error("Input {} has no file name", .0.display())]
    NoFileName(PathBuf),
    /// Several inputs would be written to the same output file.
    #[error("Output name {name} is shared by {count} inputs")]
    Collision { name: String, count: usize },
}

/// Map each input to `out_dir/<file name>`.
///
/// Inputs whose file names clash are all rejected rather than letting one
/// overwrite another.
pub fn plan_outputs(inputs: &[PathBuf], out_dir: &Path) -> Vec<std::result::Result<PathBuf, OutputPathError>> {
    let mut uses: HashMap<&OsStr, usize> = HashMap::new();
    for name in inputs.iter().filter_map(|p| p.file_name()) {
        *uses.entry(name).or_insert(0) += 1;
    }

    inputs
        .iter()
        .map(|p| match p.file_name() {
            None => Err(OutputPathError::NoFileName(p.clone())),
            Some(name) if uses[name] > 1 => Err(OutputPathError::Collision {
                name:  name.to_string_lossy().into_owned(),
                count: uses[name],
            }),
            Some(name) => Ok(out_dir.join(name)),
        })
        .collect()
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Totals over a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed:    usize,
    pub bytes_in:  u64,
    pub bytes_out: u64,
    pub removed:   RemovalStats,
}

impl BatchSummary {
    pub fn add_success(&mut self, bytes_in: usize, bytes_out: usize, stats: &RemovalStats) {
        self.succeeded += 1;
        self.bytes_in  += bytes_in as u64;
        self.bytes_out += bytes_out as u64;
        self.removed.merge(stats);
    }

    pub fn add_failure(&mut self) {
        self.failed += 1;
    }

    pub fn from_results(inputs: &[&[u8]], results: &[BatchResult]) -> Self {
        let mut summary = Self::default();
        for (input, result) in inputs.iter().zip(results) {
            match result {
                Ok((out, stats)) => summary.add_success(input.len(), out.len(), stats),
                Err(_)           => summary.add_failure(),
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ContainerBuilder;
    use crate::chunk::ChunkType;

    #[test]
    fn results_follow_input_order_and_failures_stay_local() {
        let clean = ContainerBuilder::minimal().finish();
        let dirty = ContainerBuilder::new()
            .chunk(ChunkType::IHDR, &ContainerBuilder::GRAY_1X1_IHDR)
            .chunk(ChunkType::zTXt, b"Comment\0\0\x78\x9c\x03\x00\x00\x00\x00\x01")
            .chunk(ChunkType::IDAT, &ContainerBuilder::GRAY_1X1_IDAT)
            .chunk(ChunkType::IEND, &[])
            .finish();
        let broken = b"\x89PNG\r\n\x1a\n\0\0".to_vec();

        let inputs = vec![dirty.as_slice(), broken.as_slice(), clean.as_slice()];
        let results = strip_batch(&inputs);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().0, clean);
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().0, clean);

        let summary = BatchSummary::from_results(&inputs, &results);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.removed.text, (dirty.len() - clean.len()) as u64);
        assert_eq!(summary.bytes_in - summary.bytes_out, summary.removed.total);
    }

    #[test]
    fn empty_batch() {
        assert!(strip_batch(&[]).is_empty());
        assert_eq!(BatchSummary::from_results(&[], &[]), BatchSummary::default());
    }

    #[test]
    fn clashing_file_names_are_rejected_together() {
        let inputs = vec![
            PathBuf::from("a/x.png"),
            PathBuf::from("b/y.png"),
            PathBuf::from("c/x.png"),
            PathBuf::from("/"),
        ];
        let plan = plan_outputs(&inputs, Path::new("out"));
        let collision = Err(OutputPathError::Collision { name: "x.png".into(), count: 2 });
        assert_eq!(plan[0], collision);
        assert_eq!(plan[1], Ok(PathBuf::from("out/y.png")));
        assert_eq!(plan[2], collision);
        assert_eq!(plan[3], Err(OutputPathError::NoFileName(PathBuf::from("/"))));
    }
}
