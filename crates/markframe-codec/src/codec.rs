use bytes::BytesMut;

use crate::error::{FrameError, Result};
use crate::marker::{
    encode_offset, MarkerScanner, MARKER_BYTES, MARKER_SIZE, MAX_OFFSET, OFFSET_SIZE,
};

/// Bytes added to every frame: head offset (4) + terminating marker (4).
pub const FRAME_OVERHEAD: usize = OFFSET_SIZE + MARKER_SIZE;

/// Largest payload an offset field can span: `2^30 - 1` bytes.
pub const MAX_PAYLOAD_LEN: usize = MAX_OFFSET as usize;

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// Encoded size of a payload of `payload_len` bytes.
///
/// Saturates at `usize::MAX`; such lengths are far past
/// [`MAX_PAYLOAD_LEN`] and never encodable.
pub const fn encoded_len(payload_len: usize) -> usize {
    payload_len.saturating_add(FRAME_OVERHEAD)
}

/// Encode a payload in place.
///
/// `payload` is threaded in place: every occurrence of the marker inside it is
/// overwritten by an offset field pointing at the next occurrence (or the
/// payload end). The first offset goes to `head`, the terminating marker to
/// `foot`. When the three regions are contiguous in memory (head, payload,
/// foot) they form the encoded frame.
///
/// Returns the payload length, unchanged.
///
/// Wire format:
/// ```text
/// ┌──────────────┬──────────────────────────┬──────────────┐
/// │ Offset (4B)  │ Threaded payload         │ Marker (4B)  │
/// │ b0, b3 < 0x80│ (L bytes)                │ DA B8 FE CA  │
/// └──────────────┴──────────────────────────┴──────────────┘
/// ```
pub fn encode_frame_in_place(
    payload: &mut [u8],
    head: &mut [u8; OFFSET_SIZE],
    foot: &mut [u8; MARKER_SIZE],
) -> Result<usize> {
    let len = payload.len();
    if len > MAX_PAYLOAD_LEN {
        return Err(FrameError::PayloadTooLarge {
            size: len,
            max: MAX_PAYLOAD_LEN,
        });
    }

    let mut scanner = MarkerScanner::new();
    // Start of the previous marker run; `None` means the head field.
    let mut link: Option<usize> = None;
    // First payload byte not yet scanned.
    let mut cursor = 0usize;

    loop {
        let found = scanner.find(&payload[cursor..]);
        let distance = match found {
            Some(end) => end - MARKER_SIZE,
            None => len - cursor,
        };
        // distance <= len <= MAX_OFFSET
        let field = encode_offset(distance as u32);
        match link {
            None => *head = field,
            Some(at) => payload[at..at + OFFSET_SIZE].copy_from_slice(&field),
        }

        match found {
            Some(end) => {
                link = Some(cursor + end - MARKER_SIZE);
                cursor += end;
            }
            None => {
                *foot = MARKER_BYTES;
                return Ok(len);
            }
        }
    }
}

/// Encode a payload into `dst`, which must hold at least
/// [`encoded_len`]`(payload.len())` bytes.
///
/// Returns the number of bytes written, always `payload.len() + 8`.
pub fn encode_frame_into(payload: &[u8], dst: &mut [u8]) -> Result<usize> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD_LEN,
        });
    }
    let total = encoded_len(payload.len());
    let available = dst.len();
    let too_small = || FrameError::BufferTooSmall {
        needed: total,
        available,
    };
    let frame = dst.get_mut(..total).ok_or_else(too_small)?;
    let (head, rest) = frame
        .split_first_chunk_mut::<OFFSET_SIZE>()
        .ok_or_else(too_small)?;
    let (body, foot) = rest
        .split_last_chunk_mut::<MARKER_SIZE>()
        .ok_or_else(too_small)?;

    body.copy_from_slice(payload);
    encode_frame_in_place(body, head, foot)?;
    Ok(total)
}

/// Append one encoded frame to `dst`.
///
/// Returns the number of bytes appended.
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<usize> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD_LEN,
        });
    }
    let start = dst.len();
    dst.resize(start + encoded_len(payload.len()), 0);
    encode_frame_into(payload, &mut dst[start..])
}

/// Configuration shared by the parser and the I/O adapters.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
}

impl FrameConfig {
    /// Configuration accepting payloads up to `max_payload_size` bytes.
    pub fn new(max_payload_size: usize) -> Self {
        Self { max_payload_size }
    }

    /// Effective payload limit, never above [`MAX_PAYLOAD_LEN`].
    pub fn payload_limit(&self) -> usize {
        self.max_payload_size.min(MAX_PAYLOAD_LEN)
    }

    /// Parser buffer capacity needed for the payload limit.
    pub fn buffer_capacity(&self) -> usize {
        encoded_len(self.payload_limit())
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}
