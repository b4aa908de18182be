//! Error types for msgdev

use nix::errno::Errno;
use thiserror::Error;

/// Host registration step that failed during `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStep {
    /// Character device region (major number)
    Chrdev,
    /// Device class
    Class,
    /// Device node
    Node,
}

impl std::fmt::Display for RegistrationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RegistrationStep::Chrdev => "character device region",
            RegistrationStep::Class => "device class",
            RegistrationStep::Node => "device node",
        };
        f.write_str(s)
    }
}

/// A host registration step was refused
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("failed to register {step}: {errno}")]
pub struct RegistrationError {
    pub step: RegistrationStep,
    pub errno: Errno,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("copy fault: {requested} bytes requested, caller region holds {available}")]
    CopyFault { requested: usize, available: usize },

    #[error("message overflow: {required} bytes exceed capacity {capacity}")]
    BufferOverflow { required: usize, capacity: usize },

    #[error("no such device: {0}")]
    NoDevice(String),

    #[error("file not opened for {0}")]
    BadAccess(&'static str),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Errno describing the fault class
    pub fn errno(&self) -> Errno {
        match self {
            Error::Registration(e) => e.errno,
            Error::CopyFault { .. } => Errno::EFAULT,
            Error::BufferOverflow { .. } => Errno::EMSGSIZE,
            Error::NoDevice(_) => Errno::ENODEV,
            Error::BadAccess(_) => Errno::EBADF,
            Error::Config(_) => Errno::EINVAL,
            Error::Io(_) => Errno::EIO,
        }
    }

    /// Negative result code as returned across the call surface
    pub fn code(&self) -> isize {
        -(self.errno() as i32 as isize)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
