use std::io::{ErrorKind, Read};

use bytes::Bytes;

use crate::codec::FrameConfig;
use crate::error::{FrameError, Result};
use crate::parser::{FrameQueue, Parser, ParserStats, ParserStatus};

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete frames from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete frames.
/// Frames that fail to decode are skipped; see [`last_error`](Self::last_error).
pub struct FrameReader<T> {
    inner: T,
    parser: Parser<Vec<u8>, FrameQueue>,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            parser: Parser::with_config(&config, FrameQueue::new()),
            config,
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached; bytes
    /// of an unterminated trailing frame are dropped.
    pub fn read_frame(&mut self) -> Result<Bytes> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            if let Some(frame) = self.parser.sink_mut().pop() {
                return Ok(frame);
            }

            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.parser.parse_chunk(&chunk[..read]);
        }
    }

    /// Status of the most recently finished frame.
    pub fn status(&self) -> ParserStatus {
        self.parser.status()
    }

    /// The most recent decode error seen on this stream.
    pub fn last_error(&self) -> Option<ParserStatus> {
        self.parser.last_error()
    }

    /// Frame counters for this stream.
    pub fn stats(&self) -> ParserStats {
        self.parser.stats()
    }

    /// Bytes of an unterminated frame held since the last marker.
    pub fn buffered(&self) -> usize {
        self.parser.buffered()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl<T: Read> Iterator for FrameReader<T> {
    type Item = Result<Bytes>;

    /// Yields frames until the stream closes; other errors are yielded once
    /// and iteration may continue.
    fn next(&mut self) -> Option<Self::Item> {
        match self.read_frame() {
            Ok(frame) => Some(Ok(frame)),
            Err(FrameError::ConnectionClosed) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::BytesMut;

    use super::*;
    use crate::codec::{encode_frame, encoded_len};
    use crate::marker::MARKER_BYTES;

    fn wire(payloads: &[&[u8]]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        for payload in payloads {
            encode_frame(payload, &mut buf).unwrap();
        }
        buf.to_vec()
    }

    #[test]
    fn read_single_frame() {
        let mut reader = FrameReader::new(Cursor::new(wire(&[b"hello"])));
        let frame = reader.read_frame().unwrap();

        assert_eq!(frame.as_ref(), b"hello");
    }

    #[test]
    fn read_multiple_frames() {
        let mut reader = FrameReader::new(Cursor::new(wire(&[b"one", b"two", b"three"])));

        assert_eq!(reader.read_frame().unwrap().as_ref(), b"one");
        assert_eq!(reader.read_frame().unwrap().as_ref(), b"two");
        assert_eq!(reader.read_frame().unwrap().as_ref(), b"three");
    }

    #[test]
    fn read_frame_with_large_payload() {
        let mut payload = vec![0xAB; 64 * 1024];
        payload[READ_CHUNK_SIZE - 2..READ_CHUNK_SIZE + 2].copy_from_slice(&MARKER_BYTES);

        let mut reader = FrameReader::new(Cursor::new(wire(&[&payload])));
        let frame = reader.read_frame().unwrap();

        assert_eq!(frame.as_ref(), payload.as_slice());
    }

    #[test]
    fn partial_read_handling() {
        let byte_reader = ByteByByteReader {
            bytes: wire(&[b"sl\xDA\xB8\xFE\xCAow"]),
            pos: 0,
        };
        let mut reader = FrameReader::new(byte_reader);

        let frame = reader.read_frame().unwrap();
        assert_eq!(frame.as_ref(), b"sl\xDA\xB8\xFE\xCAow");
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_frame() {
        let mut partial = wire(&[b"only-part"]);
        partial.truncate(partial.len() - 1);

        let mut reader = FrameReader::new(Cursor::new(partial));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
        assert_eq!(reader.buffered(), encoded_len(9) - 1);
    }

    #[test]
    fn corrupt_frame_is_skipped() {
        let mut bytes = wire(&[b"bad", b"good"]);
        bytes[..4].copy_from_slice(&[0x00, 0x00, 0x00, 0x80]);

        let mut reader = FrameReader::new(Cursor::new(bytes));
        assert_eq!(reader.read_frame().unwrap().as_ref(), b"good");
        assert_eq!(reader.last_error(), Some(ParserStatus::OffsetTooBig));
        assert_eq!(reader.stats().discarded, 1);
    }

    #[test]
    fn oversized_frame_in_stream() {
        let big = vec![1u8; 1024];
        let cfg = FrameConfig::new(16);
        let mut reader =
            FrameReader::with_config(Cursor::new(wire(&[&big, b"small"])), cfg);

        assert_eq!(reader.read_frame().unwrap().as_ref(), b"small");
        assert_eq!(reader.last_error(), Some(ParserStatus::DstOverrun));
        assert_eq!(reader.config().buffer_capacity(), encoded_len(16));
    }

    #[test]
    fn iterator_stops_at_eof() {
        let reader = FrameReader::new(Cursor::new(wire(&[b"a", b"", b"c"])));
        let frames: Vec<_> = reader.map(|f| f.unwrap().to_vec()).collect();
        assert_eq!(frames, vec![b"a".to_vec(), b"c".to_vec()]);
    }

    #[derive(Debug)]
    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            if buf.is_empty() {
                return Ok(0);
            }

            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    #[test]
    #[cfg(unix)]
    fn roundtrip_over_pipe() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut writer = crate::writer::FrameWriter::new(left);
        let mut reader = FrameReader::new(right);

        writer.send(b"ping").unwrap();
        let frame = reader.read_frame().unwrap();

        assert_eq!(frame.as_ref(), b"ping");
    }

    #[test]
    #[cfg(unix)]
    fn concurrent_reader_writer_threads() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut writer = crate::writer::FrameWriter::new(left);
        let mut reader = FrameReader::new(right);

        let reader_thread = std::thread::spawn(move || {
            for expected in 0..64u32 {
                let frame = reader.read_frame().unwrap();
                assert_eq!(frame.as_ref(), format!("msg-{expected}").as_bytes());
            }
        });

        for i in 0..64u32 {
            let payload = format!("msg-{i}");
            writer.send(payload.as_bytes()).unwrap();
        }

        reader_thread.join().unwrap();
    }

    #[test]
    fn accessors_and_into_inner() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut reader = FrameReader::new(cursor);

        let _ = reader.get_ref();
        let _ = reader.get_mut();
        assert_eq!(reader.status(), ParserStatus::Parsing);
        let _inner = reader.into_inner();
    }

    #[test]
    fn read_would_block_propagates_io_error() {
        let reader = WouldBlockThenData {
            state: 0,
            bytes: wire(&[b"ok"]),
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);
        let err = framed.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WouldBlock));

        assert_eq!(framed.read_frame().unwrap().as_ref(), b"ok");
    }

    struct WouldBlockThenData {
        state: u8,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for WouldBlockThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.state == 0 {
                self.state = 1;
                return Err(std::io::Error::from(ErrorKind::WouldBlock));
            }
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            let remaining = self.bytes.len() - self.pos;
            let n = remaining.min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn interrupted_read_retries() {
        let reader = InterruptedThenData {
            state: 0,
            bytes: wire(&[b"ok"]),
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);
        let frame = framed.read_frame().unwrap();

        assert_eq!(frame.as_ref(), b"ok");
    }

    struct InterruptedThenData {
        state: u8,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.state == 0 {
                self.state = 1;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            let remaining = self.bytes.len() - self.pos;
            let n = remaining.min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }
}
