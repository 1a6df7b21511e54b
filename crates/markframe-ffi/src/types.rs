use std::ffi::c_void;

use markframe_codec::{FrameSink, Parser, ParserStats, ParserStatus};

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MfResult {
    Ok = 0,
    InvalidArgument = 1,
    PayloadTooLarge = 2,
    BufferTooSmall = 3,
    Internal = 99,
}

#[allow(dead_code)]
pub const MF_OK: MfResult = MfResult::Ok;
#[allow(dead_code)]
pub const MF_ERR_INVALID_ARGUMENT: MfResult = MfResult::InvalidArgument;
#[allow(dead_code)]
pub const MF_ERR_PAYLOAD_TOO_LARGE: MfResult = MfResult::PayloadTooLarge;
#[allow(dead_code)]
pub const MF_ERR_BUFFER_TOO_SMALL: MfResult = MfResult::BufferTooSmall;
#[allow(dead_code)]
pub const MF_ERR_INTERNAL: MfResult = MfResult::Internal;

/// Mirrors `ParserStatus`; values are the codes C callers compare against.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MfParserStatus {
    Parsing = 0,
    DstOverrun = 2,
    OffsetTooBig = 3,
    OffsetOutOfBounds = 4,
    OffsetOdd = 5,
}

impl From<ParserStatus> for MfParserStatus {
    fn from(status: ParserStatus) -> Self {
        match status {
            ParserStatus::Parsing => MfParserStatus::Parsing,
            ParserStatus::DstOverrun => MfParserStatus::DstOverrun,
            ParserStatus::OffsetTooBig => MfParserStatus::OffsetTooBig,
            ParserStatus::OffsetOutOfBounds => MfParserStatus::OffsetOutOfBounds,
            ParserStatus::OffsetOdd => MfParserStatus::OffsetOdd,
        }
    }
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MfParserStats {
    pub delivered: u64,
    pub discarded: u64,
    pub empty: u64,
}

impl From<ParserStats> for MfParserStats {
    fn from(stats: ParserStats) -> Self {
        Self {
            delivered: stats.delivered,
            discarded: stats.discarded,
            empty: stats.empty,
        }
    }
}

/// Called once per decoded frame. `data` is only valid during the call, and
/// the callback must not call back into the parser that invoked it.
pub type MfFrameCallback =
    Option<unsafe extern "C" fn(data: *const u8, len: usize, user: *mut c_void)>;

pub type MfParserHandle = *mut c_void;

pub(crate) struct CallbackSink {
    pub(crate) callback: unsafe extern "C" fn(*const u8, usize, *mut c_void),
    pub(crate) user: *mut c_void,
}

impl FrameSink for CallbackSink {
    fn on_frame(&mut self, frame: &[u8]) {
        // SAFETY: The callback and user pointer were supplied together to
        // `mf_parser_new`; the caller guarantees the pair stays valid for the
        // parser's lifetime.
        unsafe { (self.callback)(frame.as_ptr(), frame.len(), self.user) }
    }
}

pub(crate) struct ParserHandle {
    pub(crate) parser: Parser<Vec<u8>, CallbackSink>,
}
