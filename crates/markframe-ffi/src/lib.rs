//! markframe-ffi: C-ABI exports for the markframe encoder and streaming parser.

mod args;
mod encode;
mod error;
mod parser;
mod types;

use std::panic::AssertUnwindSafe;

pub use encode::{mf_encode_frame, mf_encode_frame_in_place, mf_encoded_len};
pub use parser::{
    mf_parser_free, mf_parser_new, mf_parser_parse_chunk, mf_parser_reset, mf_parser_stats,
    mf_parser_status,
};
pub use types::{
    MfFrameCallback, MfParserHandle, MfParserStats, MfParserStatus, MfResult,
    MF_ERR_BUFFER_TOO_SMALL, MF_ERR_INTERNAL, MF_ERR_INVALID_ARGUMENT, MF_ERR_PAYLOAD_TOO_LARGE,
    MF_OK,
};

fn ffi_boundary<T>(on_panic: T, f: impl FnOnce() -> T) -> T {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            error::set_panic_error();
            on_panic
        }
    }
}

/// Message for the most recent failure on this thread, or an empty string.
#[no_mangle]
pub extern "C" fn mf_last_error() -> *const std::os::raw::c_char {
    ffi_boundary(std::ptr::null(), error::last_error_ptr)
}
