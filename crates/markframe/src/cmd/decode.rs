use std::io::Write;

use markframe_codec::{FrameConfig, FrameError, FrameReader};
use tracing::{info, warn};

use crate::cmd::{open_input, open_output, DecodeArgs};
use crate::exit::{discarded_error, frame_error, io_error, CliResult, SUCCESS};
use crate::output::{print_frame, FrameRecord, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let input = open_input(args.input.as_deref())?;
    let mut output = open_output(args.output.as_deref())?;
    let mut reader = FrameReader::with_config(input, FrameConfig::new(args.max_frame_size));

    let mut index = 0u64;
    loop {
        let frame = match reader.read_frame() {
            Ok(frame) => frame,
            Err(FrameError::ConnectionClosed) => break,
            Err(err) => return Err(frame_error("decode", err)),
        };
        let record = FrameRecord::new(index, &frame);
        print_frame(output.as_mut(), &record, &frame, format)
            .map_err(|err| io_error("write output", err))?;
        index += 1;
    }
    output.flush().map_err(|err| io_error("flush output", err))?;

    let stats = reader.stats();
    if reader.buffered() > 0 {
        warn!(bytes = reader.buffered(), "input ended inside a frame");
    }
    info!(
        delivered = stats.delivered,
        discarded = stats.discarded,
        empty = stats.empty,
        "decode complete"
    );

    if args.strict && stats.discarded > 0 {
        return Err(discarded_error(stats, reader.last_error()));
    }
    Ok(SUCCESS)
}
