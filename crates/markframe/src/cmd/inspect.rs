use std::io::{ErrorKind, Read};

use markframe_codec::{FrameConfig, Parser};
use tracing::debug;

use crate::cmd::{open_input, InspectArgs};
use crate::exit::{io_error, CliResult, SUCCESS};
use crate::output::{print_inspect, FrameRecord, OutputFormat, StreamSummary};

const READ_CHUNK_SIZE: usize = 8 * 1024;

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let input = open_input(args.input.as_deref())?;
    let (frames, summary) = scan(input, &FrameConfig::new(args.max_frame_size))?;
    print_inspect(&frames, &summary, format);
    Ok(SUCCESS)
}

fn scan(
    mut input: impl Read,
    config: &FrameConfig,
) -> CliResult<(Vec<FrameRecord>, StreamSummary)> {
    let mut frames = Vec::new();
    let mut parser = Parser::with_config(config, |payload: &[u8]| {
        let record = FrameRecord::new(frames.len() as u64, payload);
        debug!(index = record.index, size = record.payload_size, "frame");
        frames.push(record);
    });

    let mut chunk = [0u8; READ_CHUNK_SIZE];
    loop {
        let read = match input.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(io_error("read input", err)),
        };
        parser.parse_chunk(&chunk[..read]);
    }

    let summary = StreamSummary::new(
        parser.stats(),
        parser.last_error().map(|status| status.as_str()),
        parser.buffered(),
    );
    drop(parser);
    Ok((frames, summary))
}

#[cfg(test)]
mod tests {
    use markframe_codec::{encode_frame_into, encoded_len, MARKER_BYTES};

    use super::*;

    fn wire(payloads: &[&[u8]]) -> Vec<u8> {
        let mut out = Vec::new();
        for payload in payloads {
            let mut frame = vec![0u8; encoded_len(payload.len())];
            encode_frame_into(payload, &mut frame).unwrap();
            out.extend_from_slice(&frame);
        }
        out
    }

    #[test]
    fn scan_reports_frames_and_markers() {
        let marked = [b"x".as_slice(), &MARKER_BYTES, b"y"].concat();
        let stream = wire(&[b"plain", b"", &marked]);

        let (frames, summary) = scan(stream.as_slice(), &FrameConfig::default()).unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].payload_size, 5);
        assert_eq!(frames[0].marker_runs, 0);
        assert_eq!(frames[1].index, 1);
        assert_eq!(frames[1].marker_runs, 1);
        assert_eq!(summary.delivered, 2);
        assert_eq!(summary.empty, 1);
        assert_eq!(summary.last_error, None);
        assert_eq!(summary.trailing_bytes, 0);
    }

    #[test]
    fn scan_counts_discards_and_trailing_bytes() {
        let mut stream = wire(&[b"bad", b"good"]);
        stream[..4].copy_from_slice(&[0x00, 0x00, 0x00, 0x80]);
        stream.extend_from_slice(b"tail");

        let (frames, summary) = scan(stream.as_slice(), &FrameConfig::new(64)).unwrap();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload, "good");
        assert_eq!(summary.discarded, 1);
        assert_eq!(summary.last_error, Some("offset_too_big"));
        assert_eq!(summary.trailing_bytes, 4);
    }
}
