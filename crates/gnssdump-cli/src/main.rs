use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::warn;

use gnssdump_core::protocols::{rtcm, ubx};
use gnssdump_core::{DecodedRecord, FileSource, Framed, Framer, Protocol, RawPacket, Validators};

mod render;

#[derive(Parser, Debug)]
#[command(name = "gnssdump")]
#[command(version)]
#[command(
    about = "Offline decoder for mixed GNSS receiver streams (NMEA / UBX / RTCM3).",
    long_about = None,
    after_help = "Examples:\n  gnssdump dump capture.ubx\n  gnssdump dump capture.ubx --json > records.jsonl\n  gnssdump dump capture.ubx --limit 100 --quiet"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a capture file and print every packet.
    Dump {
        /// Path to a raw receiver capture
        input: PathBuf,

        /// Emit one JSON object per packet instead of text
        #[arg(long)]
        json: bool,

        /// Skip checksum validation
        #[arg(long)]
        permissive: bool,

        /// Stop after this many framed packets
        #[arg(long)]
        limit: Option<u64>,

        /// Suppress the end-of-stream summary
        #[arg(long)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Dump {
            input,
            json,
            permissive,
            limit,
            quiet,
        } => cmd_dump(input, json, permissive, limit, quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(err.to_string(), None)
    }
}

/// Per-message packet and byte tallies, printed at end of stream.
#[derive(Debug, Default)]
struct Stats {
    messages: BTreeMap<String, (u64, u64)>,
    checksum_failures: u64,
    unrecognized_bytes: u64,
}

impl Stats {
    fn count(&mut self, label: &str, bytes: usize) {
        let entry = self.messages.entry(label.to_string()).or_default();
        entry.0 += 1;
        entry.1 += bytes as u64;
    }

    fn print(&self) {
        eprintln!("packets by type:");
        for (label, (packets, bytes)) in &self.messages {
            eprintln!("  {label:<24} {packets:>8}  {bytes:>10} bytes");
        }
        if self.checksum_failures > 0 {
            eprintln!("checksum failures: {}", self.checksum_failures);
        }
        if self.unrecognized_bytes > 0 {
            eprintln!("unrecognized bytes: {}", self.unrecognized_bytes);
        }
    }
}

fn cmd_dump(
    input: PathBuf,
    json: bool,
    permissive: bool,
    limit: Option<u64>,
    quiet: bool,
) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a raw receiver capture file".to_string()),
        ));
    }
    let source = FileSource::open(&input)
        .with_context(|| format!("Failed to open input: {}", input.display()))?;
    let mut framer = if permissive {
        Framer::with_validators(source, Validators::permissive())
    } else {
        Framer::new(source)
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut stats = Stats::default();
    let mut framed_count: u64 = 0;

    while let Some(framed) = framer
        .next_packet()
        .with_context(|| format!("framing failed in {}", input.display()))?
    {
        framed_count += 1;
        match framed {
            Framed::Packet(packet) => {
                dump_packet(&mut out, &packet, json, &mut stats).context("write failed")?;
            }
            Framed::ChecksumFailed { protocol, bytes } => {
                stats.checksum_failures += 1;
                warn!(?protocol, len = bytes.len(), "checksum failed");
            }
            Framed::Unrecognized { consumed } => {
                stats.unrecognized_bytes += consumed as u64;
            }
        }
        if limit.is_some_and(|limit| framed_count >= limit) {
            break;
        }
    }

    if !quiet {
        stats.print();
    }
    Ok(())
}

fn dump_packet(
    out: &mut impl Write,
    packet: &RawPacket,
    json: bool,
    stats: &mut Stats,
) -> Result<()> {
    match packet.protocol {
        Protocol::Nmea => {
            let sentence = packet.sentence();
            let talker = sentence.split(',').next().unwrap_or("$").to_string();
            stats.count(&talker, packet.bytes.len());
            if json {
                writeln!(out, "{}", json!({ "protocol": "NMEA", "sentence": sentence }))?;
            } else {
                writeln!(out, "{sentence}")?;
            }
        }
        Protocol::Ubx => match ubx::decode_packet(packet) {
            Ok(record) => dump_record(out, packet, &record, json, stats)?,
            Err(err) => {
                warn!(%err, "UBX decode failed");
                let label = format!(
                    "UBX-0x{:02x}-0x{:02x}",
                    packet.class.unwrap_or_default(),
                    packet.id.unwrap_or_default()
                );
                dump_undecoded(out, packet, &label, json, stats)?;
            }
        },
        Protocol::Rtcm3 => {
            let decoded = rtcm::decode_packet(packet);
            match decoded {
                Ok(Some(record)) => dump_record(out, packet, &record, json, stats)?,
                Ok(None) => {
                    let msg_num = rtcm::get_bits(packet.payload(), 0, 12, false).unwrap_or(0);
                    dump_undecoded(out, packet, &format!("RTCM-{msg_num}"), json, stats)?;
                }
                Err(err) => {
                    warn!(%err, "RTCM decode failed");
                    dump_undecoded(out, packet, "RTCM", json, stats)?;
                }
            }
        }
    }
    Ok(())
}

fn dump_record(
    out: &mut impl Write,
    packet: &RawPacket,
    record: &DecodedRecord,
    json: bool,
    stats: &mut Stats,
) -> Result<()> {
    stats.count(&record.message, packet.bytes.len());
    if json {
        writeln!(out, "{}", serde_json::to_string(record)?)?;
    } else {
        write!(out, "{}", render::render_text(record))?;
        // A minimal record (no catalogue entry) has nothing to show; keep
        // its payload visible.
        let bare =
            record.header.is_empty() && record.block.is_empty() && record.footer.is_empty();
        if bare && !record.raw_payload.is_empty() {
            write!(out, "{}", render::hex_dump(&record.raw_payload))?;
        }
    }
    Ok(())
}

/// Fallback for packets that framed but did not decode: keep them visible
/// as a hex dump (text) or a raw-hex object (JSON).
fn dump_undecoded(
    out: &mut impl Write,
    packet: &RawPacket,
    label: &str,
    json: bool,
    stats: &mut Stats,
) -> Result<()> {
    stats.count(label, packet.bytes.len());
    if json {
        writeln!(
            out,
            "{}",
            json!({ "message": label, "raw": render::hex_string(&packet.bytes) })
        )?;
    } else {
        writeln!(out, "{label}")?;
        write!(out, "{}", render::hex_dump(packet.payload()))?;
    }
    Ok(())
}
