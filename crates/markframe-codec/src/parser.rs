//! Streaming decoder.
//!
//! [`Parser`] accepts the encoded stream in chunks of any size, accumulates
//! frame bytes into a fixed-capacity buffer and hands every completed frame to
//! a [`FrameSink`]. A corrupt frame is dropped and decoding resumes cleanly at
//! the next marker.

use std::collections::VecDeque;
use std::fmt;

use bytes::Bytes;
use tracing::{debug, trace, warn};

use crate::codec::{FrameConfig, FRAME_OVERHEAD};
use crate::marker::{
    decode_offset, MarkerScanner, MARKER_BYTES, MARKER_SIZE, MAX_OFFSET, OFFSET_SIZE,
};

/// Decode state of the frame currently being accumulated.
#[repr(i32)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ParserStatus {
    /// No error so far.
    #[default]
    Parsing = 0,
    /// The frame did not fit in the destination buffer.
    DstOverrun = 2,
    /// A chain offset decoded above the representable bound.
    OffsetTooBig = 3,
    /// The chain walk left the frame. Guarded by the walk itself; kept as a
    /// safety net.
    OffsetOutOfBounds = 4,
    /// A chain link points past the end of the frame.
    OffsetOdd = 5,
}

impl ParserStatus {
    /// Returns true for every state except [`ParserStatus::Parsing`].
    pub fn is_error(self) -> bool {
        self != ParserStatus::Parsing
    }

    /// Numeric code, stable across releases.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Short machine-friendly name.
    pub fn as_str(self) -> &'static str {
        match self {
            ParserStatus::Parsing => "parsing",
            ParserStatus::DstOverrun => "dst_overrun",
            ParserStatus::OffsetTooBig => "offset_too_big",
            ParserStatus::OffsetOutOfBounds => "offset_out_of_bounds",
            ParserStatus::OffsetOdd => "offset_odd",
        }
    }
}

impl fmt::Display for ParserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives decoded frames.
///
/// `frame` borrows the parser's buffer, which is reused as soon as
/// `on_frame` returns. Copy the bytes out to keep them.
pub trait FrameSink {
    fn on_frame(&mut self, frame: &[u8]);
}

impl<F> FrameSink for F
where
    F: FnMut(&[u8]),
{
    fn on_frame(&mut self, frame: &[u8]) {
        self(frame)
    }
}

/// A sink that keeps owned copies of decoded frames in arrival order.
#[derive(Debug, Default, Clone)]
pub struct FrameQueue {
    frames: VecDeque<Bytes>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the oldest frame.
    pub fn pop(&mut self) -> Option<Bytes> {
        self.frames.pop_front()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drain all queued frames, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = Bytes> + '_ {
        self.frames.drain(..)
    }
}

impl FrameSink for FrameQueue {
    fn on_frame(&mut self, frame: &[u8]) {
        self.frames.push_back(Bytes::copy_from_slice(frame));
    }
}

/// Frame counters since the parser was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserStats {
    /// Frames handed to the sink.
    pub delivered: u64,
    /// Frames dropped because of a decode error.
    pub discarded: u64,
    /// Markers that closed a frame with no payload.
    pub empty: u64,
}

/// Incremental decoder for a single stream.
///
/// `B` is the destination buffer; its length is the capacity and it never
/// grows. The payload limit is the capacity minus
/// [`FRAME_OVERHEAD`](crate::FRAME_OVERHEAD); longer frames are discarded
/// with [`ParserStatus::DstOverrun`].
///
/// Feeding the stream in one call or in any number of smaller chunks produces
/// the same frames in the same order.
pub struct Parser<B, S> {
    buf: B,
    pos: usize,
    status: ParserStatus,
    outcome: ParserStatus,
    last_error: Option<ParserStatus>,
    scanner: MarkerScanner,
    sink: S,
    stats: ParserStats,
}

impl<S: FrameSink> Parser<Vec<u8>, S> {
    /// Create a parser with an owned buffer of `capacity` bytes.
    pub fn with_capacity(capacity: usize, sink: S) -> Self {
        Self::new(vec![0u8; capacity], sink)
    }

    /// Create a parser sized for `config`'s payload limit.
    pub fn with_config(config: &FrameConfig, sink: S) -> Self {
        Self::with_capacity(config.buffer_capacity(), sink)
    }
}

impl<B, S> Parser<B, S>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
    S: FrameSink,
{
    /// Create a parser writing into `buf` and reporting frames to `sink`.
    pub fn new(buf: B, sink: S) -> Self {
        Self {
            buf,
            pos: 0,
            status: ParserStatus::Parsing,
            outcome: ParserStatus::Parsing,
            last_error: None,
            scanner: MarkerScanner::new(),
            sink,
            stats: ParserStats::default(),
        }
    }

    /// Feed the next slice of the encoded stream.
    ///
    /// The sink is called synchronously for every frame completed by this
    /// chunk, in stream order.
    pub fn parse_chunk(&mut self, chunk: &[u8]) {
        let mut rest = chunk;
        while !rest.is_empty() {
            match self.scanner.find(rest) {
                Some(end) => {
                    if end > MARKER_SIZE {
                        self.append(&rest[..end - MARKER_SIZE]);
                    } else {
                        // The marker began in an earlier chunk and its first
                        // bytes are already in the buffer.
                        self.pos = self.pos.saturating_sub(MARKER_SIZE - end);
                    }
                    self.finish_frame();
                    rest = &rest[end..];
                }
                None => {
                    self.append(rest);
                    break;
                }
            }
        }
    }

    /// Status of the frame in flight if it already failed, otherwise the
    /// outcome of the most recently finished frame.
    pub fn status(&self) -> ParserStatus {
        if self.status.is_error() {
            self.status
        } else {
            self.outcome
        }
    }

    /// The most recent decode error, kept across later good frames.
    pub fn last_error(&self) -> Option<ParserStatus> {
        self.last_error
    }

    /// Forget the stored [`last_error`](Self::last_error).
    pub fn clear_last_error(&mut self) {
        self.last_error = None;
    }

    pub fn stats(&self) -> ParserStats {
        self.stats
    }

    /// Destination buffer capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.as_ref().len()
    }

    /// Largest payload this parser delivers.
    pub fn payload_limit(&self) -> usize {
        self.capacity().saturating_sub(FRAME_OVERHEAD)
    }

    /// Bytes accumulated for the frame in flight.
    pub fn buffered(&self) -> usize {
        self.pos
    }

    /// Drop any partially accumulated frame and start over.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.status = ParserStatus::Parsing;
        self.scanner.reset();
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the parser and return its buffer and sink.
    pub fn into_parts(self) -> (B, S) {
        (self.buf, self.sink)
    }

    fn append(&mut self, bytes: &[u8]) {
        if bytes.is_empty() || self.status.is_error() {
            return;
        }
        let buf = self.buf.as_mut();
        let end = self.pos + bytes.len();
        if end > buf.len() {
            self.status = ParserStatus::DstOverrun;
            return;
        }
        buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
    }

    fn finish_frame(&mut self) {
        let pos = self.pos;
        if self.status.is_error() {
            self.discard(self.status, pos);
        } else if pos == 0 {
            trace!("empty frame boundary");
            self.stats.empty += 1;
        } else if pos.saturating_sub(OFFSET_SIZE) > self.payload_limit() {
            // The frame fit only because its marker was never copied.
            self.discard(ParserStatus::DstOverrun, pos);
        } else {
            let buf = self.buf.as_mut();
            match restore_chain(&mut buf[..pos]) {
                Ok(()) if pos == OFFSET_SIZE => {
                    trace!("zero-length frame");
                    self.stats.empty += 1;
                    self.outcome = ParserStatus::Parsing;
                }
                Ok(()) => {
                    debug!(len = pos - OFFSET_SIZE, "frame decoded");
                    self.sink.on_frame(&buf[OFFSET_SIZE..pos]);
                    self.stats.delivered += 1;
                    self.outcome = ParserStatus::Parsing;
                }
                Err(status) => self.discard(status, pos),
            }
        }

        self.pos = 0;
        self.status = ParserStatus::Parsing;
        self.scanner.reset();
    }

    fn discard(&mut self, status: ParserStatus, len: usize) {
        warn!(%status, len, "discarding frame");
        self.stats.discarded += 1;
        self.outcome = status;
        self.last_error = Some(status);
    }
}

impl<B, S> fmt::Debug for Parser<B, S>
where
    B: AsRef<[u8]>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("capacity", &self.buf.as_ref().len())
            .field("pos", &self.pos)
            .field("status", &self.status)
            .field("outcome", &self.outcome)
            .field("last_error", &self.last_error)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// Walk the offset chain of `frame` (head field included) and put the marker
/// back wherever a link field replaced it.
fn restore_chain(frame: &mut [u8]) -> Result<(), ParserStatus> {
    let len = frame.len();
    let mut n = 0usize;
    while n + OFFSET_SIZE <= len {
        let mut field = [0u8; OFFSET_SIZE];
        field.copy_from_slice(&frame[n..n + OFFSET_SIZE]);
        let off = decode_offset(field);
        if off > MAX_OFFSET {
            return Err(ParserStatus::OffsetTooBig);
        }
        if n > len {
            return Err(ParserStatus::OffsetOutOfBounds);
        }
        if n != 0 {
            frame[n..n + OFFSET_SIZE].copy_from_slice(&MARKER_BYTES);
        }
        n += off as usize + OFFSET_SIZE;
    }
    if n != len {
        return Err(ParserStatus::OffsetOdd);
    }
    Ok(())
}
