use markframe_codec::{
    encode_frame_in_place, encode_frame_into, encoded_len, FrameError, MAX_PAYLOAD_LEN,
};

use crate::args::{bytes_arg, bytes_arg_mut, field_arg};
use crate::error;
use crate::types::MfResult;

/// Encoded size of a payload of `payload_len` bytes.
///
/// Returns 0 when `payload_len` is larger than any frame can carry; see
/// `mf_last_error`.
#[no_mangle]
pub extern "C" fn mf_encoded_len(payload_len: usize) -> usize {
    crate::ffi_boundary(0, || {
        error::clear_error_state();
        if payload_len > MAX_PAYLOAD_LEN {
            let _ = error::map_frame_error(&FrameError::PayloadTooLarge {
                size: payload_len,
                max: MAX_PAYLOAD_LEN,
            });
            return 0;
        }
        encoded_len(payload_len)
    })
}

/// Encode `payload` as one frame into `dst`.
///
/// On success `*out_written` receives the number of bytes written, always
/// `payload_len + 8`.
///
/// # Safety
/// `payload` must be readable for `payload_len` bytes, `dst` writable for
/// `dst_len` bytes, and the two must not overlap. `out_written` must be null
/// or a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn mf_encode_frame(
    payload: *const u8,
    payload_len: usize,
    dst: *mut u8,
    dst_len: usize,
    out_written: *mut usize,
) -> MfResult {
    crate::ffi_boundary(MfResult::Internal, || {
        error::clear_error_state();

        // SAFETY: Argument validity is guaranteed by the caller.
        let Some(payload) = (unsafe { bytes_arg(payload, payload_len, "payload") }) else {
            return MfResult::InvalidArgument;
        };
        // SAFETY: Argument validity is guaranteed by the caller.
        let Some(dst) = (unsafe { bytes_arg_mut(dst, dst_len, "dst") }) else {
            return MfResult::InvalidArgument;
        };

        match encode_frame_into(payload, dst) {
            Ok(written) => {
                if !out_written.is_null() {
                    // SAFETY: Non-null pointer validity is guaranteed by the caller.
                    unsafe { *out_written = written };
                }
                MfResult::Ok
            }
            Err(err) => error::map_frame_error(&err),
        }
    })
}

/// Encode `payload` in place. `head` receives the 4-byte offset field that
/// precedes the payload on the wire and `foot` the 4-byte terminator.
///
/// # Safety
/// `payload` must be writable for `payload_len` bytes; `head` and `foot` must
/// each be writable for 4 bytes. None of the three regions may overlap.
#[no_mangle]
pub unsafe extern "C" fn mf_encode_frame_in_place(
    payload: *mut u8,
    payload_len: usize,
    head: *mut u8,
    foot: *mut u8,
) -> MfResult {
    crate::ffi_boundary(MfResult::Internal, || {
        error::clear_error_state();

        // SAFETY: Argument validity is guaranteed by the caller.
        let Some(payload) = (unsafe { bytes_arg_mut(payload, payload_len, "payload") }) else {
            return MfResult::InvalidArgument;
        };
        // SAFETY: Argument validity is guaranteed by the caller.
        let Some(head) = (unsafe { field_arg(head, "head") }) else {
            return MfResult::InvalidArgument;
        };
        // SAFETY: Argument validity is guaranteed by the caller.
        let Some(foot) = (unsafe { field_arg(foot, "foot") }) else {
            return MfResult::InvalidArgument;
        };

        match encode_frame_in_place(payload, head, foot) {
            Ok(_) => MfResult::Ok,
            Err(err) => error::map_frame_error(&err),
        }
    })
}
