//! `utf8coerce`: normalize files (or stdin) to UTF-8 on stdout.
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use utf8_coerce::{transcode, transcode_lossy, CoercionConfig, Detection, EncodingId};

#[derive(Debug, Parser)]
#[command(name = "utf8coerce", version, about = "Coerce text of unknown encoding to UTF-8")]
struct Cli {
    /// Input files; reads stdin when none are given.
    files: Vec<PathBuf>,

    /// Encoding to try before the default chain (any WHATWG label).
    #[arg(short, long, value_name = "LABEL")]
    encoding: Option<EncodingId>,

    /// Escape undecodable bytes as 0xHH instead of failing.
    #[arg(long)]
    lossy: bool,

    /// YAML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Also escape control characters (lossy mode only).
    #[arg(long)]
    escape_control: bool,

    /// Print one JSON line per input to stderr describing the detection.
    #[arg(long)]
    report: bool,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    input: &'a str,
    encoding: EncodingId,
    detection: Detection,
    bom_len: usize,
    escaped_bytes: usize,
    output_bytes: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut cfg = match &cli.config {
        Some(path) => CoercionConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CoercionConfig::default(),
    };
    cfg.escape_control_chars |= cli.escape_control;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.files.is_empty() {
        let mut bytes = Vec::new();
        io::stdin().read_to_end(&mut bytes).context("reading stdin")?;
        process("-", &bytes, &cli, &cfg, &mut out)?;
    } else {
        for path in &cli.files {
            let bytes =
                fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            process(&path.display().to_string(), &bytes, &cli, &cfg, &mut out)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn process(
    input: &str,
    bytes: &[u8],
    cli: &Cli,
    cfg: &CoercionConfig,
    out: &mut impl Write,
) -> Result<()> {
    let start = Instant::now();
    let transcoded = if cli.lossy {
        transcode_lossy(bytes, cli.encoding, cfg)
    } else {
        transcode(bytes, cli.encoding, cfg).with_context(|| format!("coercing {input}"))?
    };

    out.write_all(transcoded.text.as_bytes())?;

    let elapsed_micros = start.elapsed().as_micros();
    info!(
        input,
        encoding = %transcoded.encoding,
        detection = ?transcoded.detection,
        escaped_bytes = transcoded.escaped_bytes,
        elapsed_micros,
        "coerced"
    );

    if cli.report {
        let report = Report {
            input,
            encoding: transcoded.encoding,
            detection: transcoded.detection,
            bom_len: transcoded.bom_len,
            escaped_bytes: transcoded.escaped_bytes,
            output_bytes: transcoded.text.len(),
        };
        eprintln!("{}", serde_json::to_string(&report)?);
    }
    Ok(())
}
