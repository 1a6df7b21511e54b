//! Constant-overhead marker framing for byte streams.
//!
//! Every frame costs exactly 8 bytes, whatever its length:
//! - A 4-byte head offset, the first link of a chain threaded through the
//!   payload
//! - The payload, with every accidental copy of the marker replaced by a link
//! - The 4-byte marker `DA B8 FE CA`, which therefore only ever appears as a
//!   terminator
//!
//! Payloads may be up to `2^30 - 1` bytes. Decoding is incremental: feed
//! chunks of any size to a [`Parser`] and it reports whole frames. A corrupt
//! frame is dropped without disturbing the ones after it.

pub mod codec;
pub mod error;
pub mod marker;
pub mod parser;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub mod async_codec;

#[cfg(feature = "async")]
pub use async_codec::FrameCodec;
pub use codec::{
    encode_frame, encode_frame_in_place, encode_frame_into, encoded_len, FrameConfig,
    DEFAULT_MAX_PAYLOAD, FRAME_OVERHEAD, MAX_PAYLOAD_LEN,
};
pub use error::{FrameError, Result};
pub use marker::{MarkerScanner, MARKER, MARKER_BYTES};
pub use parser::{FrameQueue, FrameSink, Parser, ParserStats, ParserStatus};
pub use reader::FrameReader;
pub use writer::FrameWriter;
