use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use markframe_codec::{ParserStats, MARKER_BYTES};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FrameRecord {
    pub index: u64,
    pub payload_size: usize,
    pub marker_runs: usize,
    pub payload: String,
}

impl FrameRecord {
    pub fn new(index: u64, payload: &[u8]) -> Self {
        Self {
            index,
            payload_size: payload.len(),
            marker_runs: marker_runs(payload),
            payload: payload_preview(payload),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StreamSummary {
    pub delivered: u64,
    pub discarded: u64,
    pub empty: u64,
    pub last_error: Option<&'static str>,
    pub trailing_bytes: usize,
}

impl StreamSummary {
    pub fn new(
        stats: ParserStats,
        last_error: Option<&'static str>,
        trailing_bytes: usize,
    ) -> Self {
        Self {
            delivered: stats.delivered,
            discarded: stats.discarded,
            empty: stats.empty,
            last_error,
            trailing_bytes,
        }
    }
}

#[derive(Serialize)]
struct InspectOutput<'a> {
    schema_id: &'a str,
    frames: &'a [FrameRecord],
    summary: &'a StreamSummary,
}

/// Print one decoded frame as a record line. `Raw` writes the payload bytes.
pub fn print_frame(
    out: &mut dyn Write,
    record: &FrameRecord,
    payload: &[u8],
    format: OutputFormat,
) -> std::io::Result<()> {
    match format {
        OutputFormat::Json => {
            let line = serde_json::to_string(record).unwrap_or_else(|_| "{}".to_string());
            writeln!(out, "{line}")
        }
        OutputFormat::Table => {
            let mut table = frame_table();
            add_frame_row(&mut table, record);
            writeln!(out, "{table}")
        }
        OutputFormat::Pretty => writeln!(
            out,
            "frame={} size={} markers={} payload={}",
            record.index, record.payload_size, record.marker_runs, record.payload
        ),
        OutputFormat::Raw => out.write_all(payload),
    }
}

pub fn print_inspect(frames: &[FrameRecord], summary: &StreamSummary, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = InspectOutput {
                schema_id: "https://schemas.3leaps.dev/markframe/cli/v1/inspect-report.schema.json",
                frames,
                summary,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = frame_table();
            for record in frames {
                add_frame_row(&mut table, record);
            }
            println!("{table}");
            print_summary_lines(summary);
        }
        OutputFormat::Pretty => {
            for record in frames {
                println!(
                    "frame={} size={} markers={}",
                    record.index, record.payload_size, record.marker_runs
                );
            }
            print_summary_lines(summary);
        }
        OutputFormat::Raw => {
            for record in frames {
                println!("{}", record.payload_size);
            }
        }
    }
}

fn print_summary_lines(summary: &StreamSummary) {
    println!("Summary:");
    println!("  Delivered:      {}", summary.delivered);
    println!("  Discarded:      {}", summary.discarded);
    println!("  Empty:          {}", summary.empty);
    println!("  Last error:     {}", summary.last_error.unwrap_or("none"));
    println!("  Trailing bytes: {}", summary.trailing_bytes);
}

fn frame_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["FRAME", "SIZE", "MARKERS", "PAYLOAD"]);
    table
}

fn add_frame_row(table: &mut Table, record: &FrameRecord) {
    table.add_row(vec![
        record.index.to_string(),
        record.payload_size.to_string(),
        record.marker_runs.to_string(),
        record.payload.clone(),
    ]);
}

/// Copies of the marker restored into `payload`. Marker bytes are pairwise
/// distinct, so matches never overlap.
pub fn marker_runs(payload: &[u8]) -> usize {
    payload.windows(MARKER_BYTES.len()).filter(|w| *w == MARKER_BYTES).count()
}

const PREVIEW_LIMIT: usize = 64;

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) if text.len() <= PREVIEW_LIMIT => text.to_string(),
        Ok(_) => format!("<text {} bytes>", payload.len()),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}
