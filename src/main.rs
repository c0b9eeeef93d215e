use clap::{Parser, Subcommand};
use pngstrip::batch::{plan_outputs, strip_batch, BatchSummary};
use pngstrip::inspect::{list_chunks, pixel_digest, removable_bytes};
use pngstrip::policy::Disposition;
use pngstrip::{read_source, write_atomic};
use std::path::{Path, PathBuf};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pngstrip", version, about = "Strip non-essential metadata from PNG files")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Strip one PNG file
    Strip {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Print removal statistics as JSON
        #[arg(long)]
        json: bool,
        /// Check that pixel data is unchanged after stripping
        #[arg(long)]
        verify: bool,
    },
    /// List the chunks of a PNG file and what stripping would do to them
    Chunks {
        input: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Strip several PNG files into a directory
    Batch {
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,
        #[arg(short = 'd', long)]
        out_dir: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {

        // ── Strip ────────────────────────────────────────────────────────────
        Commands::Strip { input, output, json, verify } => {
            let data = read_source(&input)?;
            let (cleaned, stats) = pngstrip::strip(&data)?;

            if verify {
                let before = pixel_digest(&data)?;
                let after  = pixel_digest(&cleaned)?;
                if before != after {
                    return Err(format!("pixel data changed ({} -> {})",
                        hex::encode(&before[..8]), hex::encode(&after[..8])).into());
                }
            }
            write_atomic(&output, &cleaned)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("{} -> {}: {}", input.display(), output.display(), stats.summary());
                if verify {
                    println!("  pixel data verified");
                }
            }
        }

        // ── Chunks ───────────────────────────────────────────────────────────
        Commands::Chunks { input, json } => {
            let data = read_source(&input)?;
            let rows = list_chunks(&data)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }

            println!("File: {} ({} bytes)", input.display(), data.len());
            println!("{:>10}  {:<6} {:>10}  {:<8}  {:<4}  Action", "Offset", "Type", "Length", "CRC", "OK");
            for r in &rows {
                let action = match r.disposition {
                    Disposition::Keep     => "keep".to_string(),
                    Disposition::Drop(c)  => format!("drop ({})", c.name()),
                };
                println!("{:>10}  {:<6} {:>10}  {}  {:<4}  {}",
                    r.offset, r.chunk_type.to_string(), r.length,
                    hex::encode(r.stored_crc.to_be_bytes()),
                    if r.crc_ok { "yes" } else { "NO" }, action);
            }
            println!("Removable: {} bytes", removable_bytes(&rows));
        }

        // ── Batch ────────────────────────────────────────────────────────────
        Commands::Batch { inputs, out_dir, json } => {
            std::fs::create_dir_all(&out_dir)?;

            let mut summary = BatchSummary::default();
            let mut loaded: Vec<(&Path, PathBuf, Vec<u8>)> = Vec::with_capacity(inputs.len());
            for (path, planned) in inputs.iter().zip(plan_outputs(&inputs, &out_dir)) {
                let dst = match planned {
                    Ok(dst) => dst,
                    Err(e)  => {
                        error!(path = %path.display(), "{e}");
                        summary.add_failure();
                        continue;
                    }
                };
                match read_source(path) {
                    Ok(data) => loaded.push((path.as_path(), dst, data)),
                    Err(e)   => {
                        error!(path = %path.display(), "{e}");
                        summary.add_failure();
                    }
                }
            }

            let slices: Vec<&[u8]> = loaded.iter().map(|(_, _, d)| d.as_slice()).collect();
            let results = strip_batch(&slices);

            for ((path, dst, data), result) in loaded.iter().zip(results) {
                let written = result.and_then(|(cleaned, stats)| {
                    write_atomic(dst, &cleaned)?;
                    Ok((cleaned.len(), stats))
                });
                match written {
                    Ok((out_len, stats)) => {
                        summary.add_success(data.len(), out_len, &stats);
                        if !json {
                            println!("  stripped  {}  {}", path.display(), stats.summary());
                        }
                    }
                    Err(e) => {
                        error!(path = %path.display(), "{e}");
                        summary.add_failure();
                    }
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{} succeeded, {} failed, {} -> {} bytes",
                    summary.succeeded, summary.failed, summary.bytes_in, summary.bytes_out);
            }
            if summary.failed > 0 {
                return Err(format!("{} file(s) failed", summary.failed).into());
            }
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pngstrip={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
