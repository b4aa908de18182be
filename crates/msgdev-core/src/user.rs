//! Caller-owned memory regions
//!
//! Reads and writes never touch caller memory directly. They go through
//! these wrappers, which check every copy against the region the caller
//! actually handed over and report a `CopyFault` instead of reading or
//! writing past it.

use crate::{Error, Result};

/// Input region supplied by a writer
pub struct UserSlice<'a> {
    data: &'a [u8],
    /// Length declared by the caller, may exceed `data.len()`
    len: usize,
}

impl<'a> UserSlice<'a> {
    /// Region whose declared length matches its size
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            len: data.len(),
        }
    }

    /// Region with an explicit declared length
    pub fn with_len(data: &'a [u8], len: usize) -> Self {
        Self { data, len }
    }

    /// Declared length
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Fail if the declared length claims more than the region holds
    pub fn check_region(&self) -> Result<()> {
        if self.len > self.data.len() {
            return Err(Error::CopyFault {
                requested: self.len,
                available: self.data.len(),
            });
        }
        Ok(())
    }

    /// Copy the first `dst.len()` bytes of the region into `dst`
    pub fn copy_to(&self, dst: &mut [u8]) -> Result<()> {
        let src = self.data.get(..dst.len()).ok_or(Error::CopyFault {
            requested: dst.len(),
            available: self.data.len(),
        })?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

/// Output region supplied by a reader
pub struct UserSliceMut<'a> {
    data: &'a mut [u8],
}

impl<'a> UserSliceMut<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        Self { data }
    }

    /// Bytes the region can hold
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Copy `src` to the start of the region
    ///
    /// Nothing is written when `src` does not fit.
    pub fn copy_from(&mut self, src: &[u8]) -> Result<()> {
        let available = self.data.len();
        let dst = self.data.get_mut(..src.len()).ok_or(Error::CopyFault {
            requested: src.len(),
            available,
        })?;
        dst.copy_from_slice(src);
        Ok(())
    }
}
