/// Errors that can occur during frame encoding and stream I/O.
///
/// Decode faults inside a frame are not errors: the parser drops the frame
/// and reports the cause through [`ParserStatus`](crate::ParserStatus).
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds the representable or configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The destination cannot hold the encoded frame.
    #[error("destination too small ({available} bytes, need {needed})")]
    BufferTooSmall { needed: usize, available: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended or stopped accepting bytes.
    #[error("connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
