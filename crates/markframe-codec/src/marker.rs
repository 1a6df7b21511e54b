//! Marker constant, offset field codec and the rolling marker scanner.
//!
//! The marker bytes are all distinct and all `>= 0x80`. Offset fields always
//! have their first and last byte `< 0x80`, so no 4-byte window that touches
//! an offset field can ever equal the marker.

/// Frame terminator as a little-endian word.
pub const MARKER: u32 = 0xCAFE_B8DA;

/// Frame terminator as it appears on the wire.
pub const MARKER_BYTES: [u8; 4] = MARKER.to_le_bytes();

/// Size of the terminator in bytes.
pub const MARKER_SIZE: usize = 4;

/// Size of an offset field in bytes.
pub const OFFSET_SIZE: usize = 4;

/// Largest distance an offset field can carry: `2^30 - 1`.
pub const MAX_OFFSET: u32 = u32::MAX >> 2;

/// Encode a distance into an offset field.
///
/// The low byte holds the low 7 bits of `off`; the remaining bits are shifted
/// left by one so bit 7 of byte 0 stays clear. For `off <= MAX_OFFSET` the top
/// bit of byte 3 is clear as well. Larger values are not representable and
/// callers must reject them first.
#[inline]
pub fn encode_offset(off: u32) -> [u8; OFFSET_SIZE] {
    debug_assert!(off <= MAX_OFFSET, "offset {off} exceeds {MAX_OFFSET}");
    (((off << 1) & !0xFF) | (off & 0x7F)).to_le_bytes()
}

/// Decode an offset field.
///
/// Corrupt fields may decode to values above [`MAX_OFFSET`]; the result is
/// returned as-is for the caller to check.
#[inline]
pub fn decode_offset(field: [u8; OFFSET_SIZE]) -> u32 {
    ((u32::from(field[0]) << 1)
        | (u32::from(field[1]) << 8)
        | (u32::from(field[2]) << 16)
        | (u32::from(field[3]) << 24))
        >> 1
}

/// Finds markers in a byte stream delivered in arbitrary pieces.
///
/// The last four bytes seen are kept between calls to [`find`](Self::find),
/// so a marker whose bytes are spread over several calls is still detected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerScanner {
    window: u32,
}

impl MarkerScanner {
    /// Create a scanner with an empty window.
    pub const fn new() -> Self {
        Self { window: 0 }
    }

    /// Scan `bytes` and return the index just past the first marker, if any.
    ///
    /// Bytes after the returned index are not consumed; call again with the
    /// remainder to continue.
    pub fn find(&mut self, bytes: &[u8]) -> Option<usize> {
        let mut window = self.window;
        for (i, &byte) in bytes.iter().enumerate() {
            window = (window >> 8) | (u32::from(byte) << 24);
            if window == MARKER {
                self.window = window;
                return Some(i + 1);
            }
        }
        self.window = window;
        None
    }

    /// Forget any partially seen marker.
    pub fn reset(&mut self) {
        self.window = 0;
    }

    /// The last four bytes seen, oldest in the low byte.
    pub fn window(&self) -> u32 {
        self.window
    }
}
