use std::io::Read;

use markframe_codec::{encoded_len, FrameConfig, FrameWriter, MAX_PAYLOAD_LEN};
use tracing::{debug, info};

use crate::cmd::{open_input, open_output, EncodeArgs};
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS};

pub fn run(args: EncodeArgs) -> CliResult<i32> {
    if let Some(size) = args.frame_size {
        if size == 0 || size > MAX_PAYLOAD_LEN {
            return Err(CliError::usage(format!(
                "--frame-size must be between 1 and {MAX_PAYLOAD_LEN}"
            )));
        }
    }

    let mut input = open_input(args.input.as_deref())?;
    let mut data = Vec::new();
    input
        .read_to_end(&mut data)
        .map_err(|err| io_error("read input", err))?;

    let payloads = split_payloads(&data, args.frame_size);
    let output = open_output(args.output.as_deref())?;
    let mut writer = FrameWriter::with_config(output, FrameConfig::new(MAX_PAYLOAD_LEN));
    debug!(frames = payloads.len(), "encoding");
    writer
        .send_all(payloads.iter().copied())
        .map_err(|err| frame_error("encode", err))?;

    let written: usize = payloads.iter().map(|p| encoded_len(p.len())).sum();
    info!(
        frames = payloads.len(),
        bytes_in = data.len(),
        bytes_out = written,
        "encode complete"
    );
    Ok(SUCCESS)
}

/// Empty input still yields one empty frame.
fn split_payloads(data: &[u8], frame_size: Option<usize>) -> Vec<&[u8]> {
    match frame_size {
        Some(size) if !data.is_empty() => data.chunks(size).collect(),
        _ => vec![data],
    }
}
