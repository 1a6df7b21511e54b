//! `tokio_util::codec` integration.
//!
//! ```no_run
//! # async fn run<R: tokio::io::AsyncRead + Unpin>(stream: R) {
//! use futures_util::StreamExt;
//! use markframe_codec::FrameCodec;
//! use tokio_util::codec::FramedRead;
//!
//! let mut frames = FramedRead::new(stream, FrameCodec::new());
//! while let Some(frame) = frames.next().await {
//!     println!("{} bytes", frame.unwrap().len());
//! }
//! # }
//! ```

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Decoder, Encoder, Framed};

use crate::codec::{encode_frame, FrameConfig};
use crate::error::FrameError;
use crate::parser::{FrameQueue, Parser, ParserStats, ParserStatus};

/// Stream codec producing one [`Bytes`] per decoded frame.
///
/// Every byte handed to [`Decoder::decode`] is consumed immediately; a
/// partial frame lives in the parser's own buffer, not in the read buffer.
#[derive(Debug)]
pub struct FrameCodec {
    parser: Parser<Vec<u8>, FrameQueue>,
    config: FrameConfig,
}

impl FrameCodec {
    /// Create a codec with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a codec with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            parser: Parser::with_config(&config, FrameQueue::new()),
            config,
        }
    }

    /// Status of the most recently finished frame.
    pub fn status(&self) -> ParserStatus {
        self.parser.status()
    }

    /// The most recent decode error seen by this codec.
    pub fn last_error(&self) -> Option<ParserStatus> {
        self.parser.last_error()
    }

    /// Frame counters for this codec.
    pub fn stats(&self) -> ParserStats {
        self.parser.stats()
    }

    /// Current codec configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    fn check_len(&self, len: usize) -> Result<(), FrameError> {
        let max = self.config.payload_limit();
        if len > max {
            return Err(FrameError::PayloadTooLarge { size: len, max });
        }
        Ok(())
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = Bytes;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, FrameError> {
        if let Some(frame) = self.parser.sink_mut().pop() {
            return Ok(Some(frame));
        }
        if !src.is_empty() {
            self.parser.parse_chunk(src);
            src.clear();
        }
        Ok(self.parser.sink_mut().pop())
    }
}

impl Encoder<Bytes> for FrameCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), FrameError> {
        Encoder::<&[u8]>::encode(self, item.as_ref(), dst)
    }
}

impl<'a> Encoder<&'a [u8]> for FrameCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &'a [u8], dst: &mut BytesMut) -> Result<(), FrameError> {
        self.check_len(item.len())?;
        encode_frame(item, dst)?;
        Ok(())
    }
}

/// Wrap a duplex stream with [`FrameCodec`].
pub fn framed<T>(io: T, config: FrameConfig) -> Framed<T, FrameCodec>
where
    T: AsyncRead + AsyncWrite,
{
    Framed::new(io, FrameCodec::with_config(config))
}
