//! Constant-overhead marker framing for byte streams.
//!
//! markframe delimits frames with a 4-byte marker and threads any copy of the
//! marker inside a payload through 4-byte offset fields, so every frame costs
//! exactly 8 bytes regardless of content.
//!
//! # Crate Structure
//!
//! - [`codec`]: Encoder, incremental parser and blocking stream adapters
//! - `FrameCodec`: `tokio_util::codec` integration (behind `async` feature)

/// Re-export codec types.
pub mod codec {
    pub use markframe_codec::*;
}

pub use markframe_codec::{
    encode_frame, encode_frame_in_place, encode_frame_into, encoded_len, FrameConfig, FrameError,
    FrameQueue, FrameReader, FrameSink, FrameWriter, Parser, ParserStats, ParserStatus, Result,
    DEFAULT_MAX_PAYLOAD, FRAME_OVERHEAD, MARKER, MARKER_BYTES, MAX_PAYLOAD_LEN,
};

#[cfg(feature = "async")]
pub use markframe_codec::FrameCodec;
