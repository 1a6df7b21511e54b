use crate::error;

/// View a `(ptr, len)` pair as a byte slice. A zero length accepts null.
///
/// # Safety
/// If `len > 0`, `data` must be non-null and readable for `len` bytes.
pub(crate) unsafe fn bytes_arg<'a>(data: *const u8, len: usize, name: &str) -> Option<&'a [u8]> {
    if len == 0 {
        return Some(&[]);
    }
    if data.is_null() {
        let _ = error::set_invalid_argument(format!("{name} cannot be null when length > 0"));
        return None;
    }

    // SAFETY: Pointer and length validity are guaranteed by the caller.
    Some(unsafe { std::slice::from_raw_parts(data, len) })
}

/// Mutable counterpart of [`bytes_arg`].
///
/// # Safety
/// If `len > 0`, `data` must be non-null and writable for `len` bytes, with
/// no other live reference to that memory.
pub(crate) unsafe fn bytes_arg_mut<'a>(
    data: *mut u8,
    len: usize,
    name: &str,
) -> Option<&'a mut [u8]> {
    if len == 0 {
        return Some(&mut []);
    }
    if data.is_null() {
        let _ = error::set_invalid_argument(format!("{name} cannot be null when length > 0"));
        return None;
    }

    // SAFETY: Pointer, length and exclusivity are guaranteed by the caller.
    Some(unsafe { std::slice::from_raw_parts_mut(data, len) })
}

/// View a pointer as one 4-byte field.
///
/// # Safety
/// `data` must be null or writable for 4 bytes.
pub(crate) unsafe fn field_arg<'a>(data: *mut u8, name: &str) -> Option<&'a mut [u8; 4]> {
    if data.is_null() {
        let _ = error::set_invalid_argument(format!("{name} cannot be null"));
        return None;
    }

    // SAFETY: The caller guarantees 4 writable bytes; `[u8; 4]` has alignment 1.
    Some(unsafe { &mut *(data as *mut [u8; 4]) })
}
