//! Host environment contract
//!
//! The host owns device numbers, classes and nodes. The lifecycle code
//! only asks for them and hands them back; how they are represented is up
//! to the implementation.

use crate::fops::FileOperations;
use nix::errno::Errno;
use std::sync::Arc;

/// Device number (major, minor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceNumber {
    pub major: u32,
    pub minor: u32,
}

impl DeviceNumber {
    /// Equivalent of `MKDEV`
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl std::fmt::Display for DeviceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.major, self.minor)
    }
}

/// Opaque handle to a device class created by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(pub u64);

/// Registration services provided by the host
pub trait Host: Send + Sync {
    /// Allocate a major number and bind `fops` to it
    fn register_chrdev(&self, name: &str, fops: Arc<dyn FileOperations>) -> Result<u32, Errno>;

    fn unregister_chrdev(&self, major: u32, name: &str);

    fn class_create(&self, name: &str) -> Result<ClassId, Errno>;

    fn class_destroy(&self, class: ClassId);

    /// Create a node for `devt` under `class`, returning its path
    fn device_create(&self, class: ClassId, devt: DeviceNumber, name: &str)
        -> Result<String, Errno>;

    fn device_destroy(&self, class: ClassId, devt: DeviceNumber);
}
