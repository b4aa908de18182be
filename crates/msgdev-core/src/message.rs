//! Write formatting
//!
//! A write stores the caller's text followed by `(<n> letters)`, where `n`
//! is the length the caller declared. The text ends at the first NUL, as
//! the input is treated as a C string.

use crate::buffer::BUFFER_LENGTH;
use crate::user::UserSlice;
use crate::{Error, Result};

/// Suffix appended to every stored message
pub fn suffix(input_len: usize) -> String {
    format!("({} letters)", input_len)
}

/// Build the message for `input` without touching the device buffer
///
/// At most `BUFFER_LENGTH - suffix_len` bytes are copied in from the
/// caller. A declared length the region cannot back is a copy fault.
pub fn compose(input: &UserSlice<'_>) -> Result<Vec<u8>> {
    input.check_region()?;
    let suffix = suffix(input.len());
    let room = BUFFER_LENGTH.saturating_sub(suffix.len());
    let bounded = input.len().min(room);

    let mut message = vec![0u8; bounded];
    input.copy_to(&mut message)?;

    match message.iter().position(|&b| b == 0) {
        Some(nul) => message.truncate(nul),
        None if input.len() > room => {
            return Err(Error::BufferOverflow {
                required: input.len().saturating_add(suffix.len()),
                capacity: BUFFER_LENGTH,
            });
        }
        None => {}
    }

    message.extend_from_slice(suffix.as_bytes());
    Ok(message)
}
