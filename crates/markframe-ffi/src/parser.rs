use std::ffi::c_void;

use markframe_codec::Parser;

use crate::args::bytes_arg;
use crate::error;
use crate::types::{
    CallbackSink, MfFrameCallback, MfParserHandle, MfParserStats, MfParserStatus, MfResult,
    ParserHandle,
};

fn with_parser_mut<T>(
    handle: MfParserHandle,
    on_error: T,
    f: impl FnOnce(&mut ParserHandle) -> T,
) -> T {
    if handle.is_null() {
        let _ = error::set_invalid_argument("parser handle cannot be null");
        return on_error;
    }

    let parser_handle = {
        // SAFETY: Pointer validity is guaranteed by the caller.
        unsafe { &mut *(handle as *mut ParserHandle) }
    };

    f(parser_handle)
}

/// Create a parser with an owned buffer of `capacity` bytes.
///
/// `capacity` must cover the largest expected payload plus 8 bytes. Returns
/// null on invalid arguments; see `mf_last_error`.
///
/// # Safety
/// `callback` is invoked with `user` from inside `mf_parser_parse_chunk`; both
/// must remain valid until `mf_parser_free`. The callback must not call any
/// `mf_parser_*` function on the handle that invoked it.
#[no_mangle]
pub unsafe extern "C" fn mf_parser_new(
    capacity: usize,
    callback: MfFrameCallback,
    user: *mut c_void,
) -> MfParserHandle {
    crate::ffi_boundary(std::ptr::null_mut(), || {
        error::clear_error_state();

        let Some(callback) = callback else {
            let _ = error::set_invalid_argument("callback cannot be null");
            return std::ptr::null_mut();
        };
        if capacity == 0 {
            let _ = error::set_invalid_argument("capacity must be greater than zero");
            return std::ptr::null_mut();
        }

        let sink = CallbackSink { callback, user };
        let handle = ParserHandle {
            parser: Parser::with_capacity(capacity, sink),
        };
        Box::into_raw(Box::new(handle)) as MfParserHandle
    })
}

/// Feed `len` bytes of the encoded stream. The callback runs synchronously
/// for every frame the chunk completes.
///
/// # Safety
/// `parser` must be a live handle from `mf_parser_new`. If `len > 0`, `data`
/// must be readable for `len` bytes. The handle is mutably borrowed until
/// this returns; the frame callback must not reset or free it.
#[no_mangle]
pub unsafe extern "C" fn mf_parser_parse_chunk(
    parser: MfParserHandle,
    data: *const u8,
    len: usize,
) -> MfResult {
    crate::ffi_boundary(MfResult::Internal, || {
        error::clear_error_state();

        // SAFETY: Argument validity is guaranteed by the caller.
        let Some(chunk) = (unsafe { bytes_arg(data, len, "data") }) else {
            return MfResult::InvalidArgument;
        };

        with_parser_mut(parser, MfResult::InvalidArgument, |handle| {
            handle.parser.parse_chunk(chunk);
            MfResult::Ok
        })
    })
}

/// Write the parser's current status to `*out_status`.
///
/// # Safety
/// `parser` must be a live handle from `mf_parser_new`; `out_status` must be a
/// valid pointer.
#[no_mangle]
pub unsafe extern "C" fn mf_parser_status(
    parser: MfParserHandle,
    out_status: *mut MfParserStatus,
) -> MfResult {
    crate::ffi_boundary(MfResult::Internal, || {
        error::clear_error_state();

        if out_status.is_null() {
            return error::set_invalid_argument("out_status cannot be null");
        }

        with_parser_mut(parser, MfResult::InvalidArgument, |handle| {
            let status = MfParserStatus::from(handle.parser.status());
            // SAFETY: Pointer validity is guaranteed by the caller.
            unsafe { *out_status = status };
            MfResult::Ok
        })
    })
}

/// Write the parser's frame counters to `*out_stats`.
///
/// # Safety
/// `parser` must be a live handle from `mf_parser_new`; `out_stats` must be a
/// valid pointer.
#[no_mangle]
pub unsafe extern "C" fn mf_parser_stats(
    parser: MfParserHandle,
    out_stats: *mut MfParserStats,
) -> MfResult {
    crate::ffi_boundary(MfResult::Internal, || {
        error::clear_error_state();

        if out_stats.is_null() {
            return error::set_invalid_argument("out_stats cannot be null");
        }

        with_parser_mut(parser, MfResult::InvalidArgument, |handle| {
            let stats = MfParserStats::from(handle.parser.stats());
            // SAFETY: Pointer validity is guaranteed by the caller.
            unsafe { *out_stats = stats };
            MfResult::Ok
        })
    })
}

/// Drop any partially accumulated frame.
///
/// # Safety
/// `parser` must be a live handle from `mf_parser_new`.
#[no_mangle]
pub unsafe extern "C" fn mf_parser_reset(parser: MfParserHandle) -> MfResult {
    crate::ffi_boundary(MfResult::Internal, || {
        error::clear_error_state();

        with_parser_mut(parser, MfResult::InvalidArgument, |handle| {
            handle.parser.reset();
            MfResult::Ok
        })
    })
}

/// Free a parser handle.
///
/// # Safety
/// `parser` must be null or a handle from `mf_parser_new` not yet freed.
#[no_mangle]
pub unsafe extern "C" fn mf_parser_free(parser: MfParserHandle) {
    crate::ffi_boundary((), || {
        if parser.is_null() {
            return;
        }

        // SAFETY: Handle was allocated with `Box<ParserHandle>` in `mf_parser_new`.
        unsafe {
            drop(Box::from_raw(parser as *mut ParserHandle));
        }
    });
}
