//! rvstim - directed RISC-V instruction stream generator
//!
//! Main CLI entry point: seeds a deterministic RNG, runs the requested
//! generators and writes assembly listings or JSON lines.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rvstim::ir::Instr;
use rvstim::{DirectedStream, GenConfig, InstrStream, IntNumericCornerStream, JalStream, Xlen};
use serde::Serialize;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rvstim")]
#[command(version)]
#[command(about = "Directed RISC-V instruction stream generator", long_about = None)]
struct Cli {
    /// Stream kinds to generate (default: all)
    #[arg(short, long, value_enum)]
    stream: Vec<StreamKind>,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Streams generated per kind
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,

    /// External label for the first instruction of each stream
    #[arg(short, long)]
    label: Option<String>,

    /// Configuration file (default: search upward for rvstim.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured register width (32 or 64)
    #[arg(long)]
    xlen: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Listing)]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StreamKind {
    Jal,
    Corner,
}

impl StreamKind {
    const ALL: [StreamKind; 2] = [StreamKind::Jal, StreamKind::Corner];

    fn prefix(self) -> &'static str {
        match self {
            StreamKind::Jal => "riscv_jal_instr",
            StreamKind::Corner => "riscv_int_numeric_corner_stream",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Assembly listing
    Listing,
    /// One JSON object per stream
    Jsonl,
}

/// One JSON line of output.
#[derive(Serialize)]
struct StreamRecord<'a> {
    name: &'a str,
    label: &'a str,
    instructions: &'a [Instr],
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    if cli.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let kinds = if cli.stream.is_empty() {
        StreamKind::ALL.to_vec()
    } else {
        cli.stream.clone()
    };

    let mut rng = ChaCha8Rng::seed_from_u64(cli.seed);
    info!(seed = cli.seed, xlen = %config.xlen, ?kinds, count = cli.count, "generating");

    let mut streams = Vec::with_capacity(kinds.len() * cli.count);
    for kind in &kinds {
        for index in 0..cli.count {
            let name = format!("{}_{}", kind.prefix(), index);
            let label = stream_label(cli.label.as_deref(), cli.count, index);
            let generator: Box<dyn DirectedStream> = match kind {
                StreamKind::Jal => Box::new(JalStream::new(name, &config).with_label(label)),
                StreamKind::Corner => {
                    Box::new(IntNumericCornerStream::new(name, &config).with_label(label))
                }
            };
            let stream = generator
                .generate(&mut rng)
                .with_context(|| format!("Failed to generate {}", generator.name()))?;
            debug!(
                stream = %stream.name,
                label = generator.label(),
                instrs = stream.len(),
                "generated"
            );
            streams.push(stream);
        }
    }

    let sink: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(
            fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut out = BufWriter::new(sink);
    write_streams(&mut out, &streams, cli.format)?;
    out.flush()?;

    if let Some(path) = &cli.output {
        info!(path = %path.display(), streams = streams.len(), "wrote output");
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<GenConfig> {
    let mut config = match &cli.config {
        Some(path) => GenConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            GenConfig::find_and_load(&cwd)?
        }
    };
    if let Some(bits) = cli.xlen {
        config.xlen = Xlen::try_from(bits).map_err(anyhow::Error::msg)?;
    }
    config.validate()?;
    Ok(config)
}

/// With several streams per kind the label gets an index suffix so every
/// label stays unique.
fn stream_label(label: Option<&str>, count: usize, index: usize) -> String {
    match label {
        None => String::new(),
        Some(l) if count == 1 => l.to_string(),
        Some(l) => format!("{}_{}", l, index),
    }
}

fn write_streams<W: Write>(out: &mut W, streams: &[InstrStream], format: OutputFormat) -> Result<()> {
    for stream in streams {
        match format {
            OutputFormat::Listing => {
                write!(out, "{}", stream)?;
            }
            OutputFormat::Jsonl => {
                let record = StreamRecord {
                    name: &stream.name,
                    label: &stream.label,
                    instructions: &stream.instr_list,
                };
                serde_json::to_writer(&mut *out, &record)?;
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["rvstim"]);
        assert!(cli.stream.is_empty());
        assert_eq!(cli.seed, 42);
        assert_eq!(cli.count, 1);
        assert_eq!(cli.format, OutputFormat::Listing);
    }

    #[test]
    fn test_cli_streams() {
        let cli = Cli::parse_from(["rvstim", "-s", "corner", "--stream", "jal", "-n", "3"]);
        assert_eq!(cli.stream, vec![StreamKind::Corner, StreamKind::Jal]);
        assert_eq!(cli.count, 3);
    }

    #[test]
    fn test_stream_label() {
        assert_eq!(stream_label(None, 3, 1), "");
        assert_eq!(stream_label(Some("blk"), 1, 0), "blk");
        assert_eq!(stream_label(Some("blk"), 3, 2), "blk_2");
    }

    #[test]
    fn test_jsonl_output() {
        let config = GenConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let stream = JalStream::new("riscv_jal_instr_0", &config)
            .generate(&mut rng)
            .unwrap();
        let mut buf = Vec::new();
        write_streams(&mut buf, std::slice::from_ref(&stream), OutputFormat::Jsonl).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["name"], "riscv_jal_instr_0");
        assert_eq!(
            value["instructions"].as_array().unwrap().len(),
            stream.len()
        );
    }
}
