//! Message buffer storage

use crate::{Error, Result};

/// Capacity of the message slot in bytes
pub const BUFFER_LENGTH: usize = 1024;

/// Fixed-capacity slot holding the single stored message
pub struct MessageBuffer {
    data: [u8; BUFFER_LENGTH],
    /// Length of the valid prefix of `data`
    len: usize,
}

impl MessageBuffer {
    /// Create an empty buffer
    pub const fn new() -> Self {
        Self {
            data: [0u8; BUFFER_LENGTH],
            len: 0,
        }
    }

    /// Capacity in bytes
    pub const fn capacity(&self) -> usize {
        BUFFER_LENGTH
    }

    /// Length of the stored message
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Valid prefix of the buffer
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Replace the stored message with `message`
    ///
    /// Rejects messages longer than the capacity without touching the
    /// current contents.
    pub fn install(&mut self, message: &[u8]) -> Result<usize> {
        if message.len() > BUFFER_LENGTH {
            return Err(Error::BufferOverflow {
                required: message.len(),
                capacity: BUFFER_LENGTH,
            });
        }
        self.data[..message.len()].copy_from_slice(message);
        self.len = message.len();
        Ok(self.len)
    }

    /// Mark the buffer empty. Stale bytes stay behind but are never read.
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl Default for MessageBuffer {
    fn default() -> Self {
        Self::new()
    }
}
