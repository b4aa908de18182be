//! Operation table the host dispatches through

use crate::access::AccessMode;
use crate::host::DeviceNumber;
use crate::user::{UserSlice, UserSliceMut};
use crate::Result;

/// Per-open state the host passes to every call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileContext {
    /// Host-assigned id of this open file
    pub id: u64,
    /// Node the file was opened through
    pub devt: DeviceNumber,
    pub mode: AccessMode,
}

/// Entry points of a character device
///
/// All calls are synchronous and bounded. The host may invoke them
/// concurrently from independent callers.
pub trait FileOperations: Send + Sync {
    fn open(&self, file: &FileContext) -> Result<()>;

    /// Called once when an open file is closed
    fn release(&self, file: &FileContext) -> Result<()>;

    /// Fill `output`, returning the number of bytes copied
    fn read(&self, file: &FileContext, output: &mut UserSliceMut<'_>) -> Result<usize>;

    /// Consume `input`, returning the number of bytes accepted
    fn write(&self, file: &FileContext, input: &UserSlice<'_>) -> Result<usize>;
}
