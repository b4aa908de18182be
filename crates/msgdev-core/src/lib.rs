//! msgdev - Single-slot message character device

pub mod access;
pub mod buffer;
pub mod config;
pub mod device;
pub mod error;
pub mod fops;
mod guard;
pub mod host;
pub mod lifecycle;
pub mod memory_host;
pub mod message;
pub mod user;

pub use access::AccessMode;
pub use buffer::{MessageBuffer, BUFFER_LENGTH};
pub use config::DeviceConfig;
pub use device::MessageDevice;
pub use error::{Error, RegistrationError, RegistrationStep, Result};
pub use fops::{FileContext, FileOperations};
pub use host::{ClassId, DeviceNumber, Host};
pub use lifecycle::{start, DeviceHandle};
pub use memory_host::{MemoryHost, OpenFile, Released};
pub use user::{UserSlice, UserSliceMut};
