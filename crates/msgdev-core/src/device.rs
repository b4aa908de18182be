//! Device state and call handlers

use crate::buffer::MessageBuffer;
use crate::fops::{FileContext, FileOperations};
use crate::message;
use crate::user::{UserSlice, UserSliceMut};
use crate::{Error, Result};
use log::{info, warn};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// The shared single-slot message device
///
/// Every open file sees the same buffer. The buffer and its length are
/// only touched with `buffer` locked.
pub struct MessageDevice {
    name: String,
    buffer: Mutex<MessageBuffer>,
    open_count: AtomicU64,
    /// Set once the device has been unregistered
    retired: AtomicBool,
}

impl MessageDevice {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            buffer: Mutex::new(MessageBuffer::new()),
            open_count: AtomicU64::new(0),
            retired: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of successful opens so far
    pub fn open_count(&self) -> u64 {
        self.open_count.load(Ordering::SeqCst)
    }

    /// Mark the device gone; files still open on it get `NoDevice`
    pub fn retire(&self) {
        self.retired.store(true, Ordering::SeqCst);
    }

    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::SeqCst)
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_retired() {
            return Err(Error::NoDevice(self.name.clone()));
        }
        Ok(())
    }

    /// Length of the message currently stored
    pub fn pending(&self) -> usize {
        self.buffer.lock().len()
    }

    /// Store the formatted form of `input`, replacing any previous message
    ///
    /// Returns the declared input length.
    pub fn write_message(&self, input: &UserSlice<'_>) -> Result<usize> {
        self.ensure_live()?;
        let formatted = message::compose(input).inspect_err(|e| {
            warn!("{}: rejected write of {} bytes: {}", self.name, input.len(), e);
        })?;

        self.buffer.lock().install(&formatted)?;
        info!("{}: received {} characters from the user", self.name, input.len());
        Ok(input.len())
    }

    /// Copy the stored message out and empty the buffer
    ///
    /// A failed copy leaves the message in place.
    pub fn read_message(&self, output: &mut UserSliceMut<'_>) -> Result<usize> {
        self.ensure_live()?;
        let mut buffer = self.buffer.lock();
        let len = buffer.len();
        if let Err(e) = output.copy_from(buffer.as_bytes()) {
            warn!("{}: failed to send {} characters to the user", self.name, len);
            return Err(e);
        }
        buffer.clear();
        info!("{}: sent {} characters to the user", self.name, len);
        Ok(len)
    }
}

impl FileOperations for MessageDevice {
    fn open(&self, _file: &FileContext) -> Result<()> {
        self.ensure_live()?;
        let opens = self.open_count.fetch_add(1, Ordering::SeqCst) + 1;
        info!("{}: device has been opened {} time(s)", self.name, opens);
        Ok(())
    }

    fn release(&self, _file: &FileContext) -> Result<()> {
        info!("{}: device closed", self.name);
        Ok(())
    }

    fn read(&self, _file: &FileContext, output: &mut UserSliceMut<'_>) -> Result<usize> {
        self.read_message(output)
    }

    fn write(&self, _file: &FileContext, input: &UserSlice<'_>) -> Result<usize> {
        self.write_message(input)
    }
}
