//! In-process host environment
//!
//! Keeps the registry of device regions, classes and nodes in memory and
//! dispatches open/read/write/close to the operation table bound to a
//! node's major number.

use crate::access::AccessMode;
use crate::error::RegistrationStep;
use crate::fops::{FileContext, FileOperations};
use crate::host::{ClassId, DeviceNumber, Host};
use crate::user::{UserSlice, UserSliceMut};
use crate::{Error, Result};
use log::debug;
use nix::errno::Errno;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// First major number handed out, start of the experimental range
const FIRST_MAJOR: u32 = 240;

/// Releases kept in the log; older entries are discarded
pub const RELEASE_LOG_LIMIT: usize = 64;

/// Directory device nodes are created in
pub const DEV_ROOT: &str = "/dev";

/// A release performed by the host, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Released {
    Node(DeviceNumber),
    Class(String),
    Chrdev(u32),
}

struct Chrdev {
    name: String,
    fops: Arc<dyn FileOperations>,
}

struct Node {
    class: ClassId,
    devt: DeviceNumber,
}

#[derive(Default)]
struct Registry {
    next_major: u32,
    next_class: u64,
    chrdevs: HashMap<u32, Chrdev>,
    classes: HashMap<ClassId, String>,
    nodes: HashMap<String, Node>,
    faults: Vec<(RegistrationStep, Errno)>,
    released: VecDeque<Released>,
}

impl Registry {
    fn take_fault(&mut self, step: RegistrationStep) -> std::result::Result<(), Errno> {
        match self.faults.iter().position(|(s, _)| *s == step) {
            Some(i) => Err(self.faults.remove(i).1),
            None => Ok(()),
        }
    }

    fn record(&mut self, release: Released) {
        if self.released.len() == RELEASE_LOG_LIMIT {
            self.released.pop_front();
        }
        self.released.push_back(release);
    }
}

/// Host that lives entirely in the current process
pub struct MemoryHost {
    registry: Mutex<Registry>,
    next_file: AtomicU64,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry {
                next_major: FIRST_MAJOR,
                ..Registry::default()
            }),
            next_file: AtomicU64::new(1),
        }
    }

    /// Make the next registration at `step` fail with `errno`
    pub fn fail_next(&self, step: RegistrationStep, errno: Errno) {
        self.registry.lock().faults.push((step, errno));
    }

    /// Open the node at `path`
    pub fn open(&self, path: &str, mode: AccessMode) -> Result<OpenFile> {
        let (fops, devt) = {
            let registry = self.registry.lock();
            let node = registry
                .nodes
                .get(path)
                .ok_or_else(|| Error::NoDevice(path.to_string()))?;
            let chrdev = registry
                .chrdevs
                .get(&node.devt.major)
                .ok_or_else(|| Error::NoDevice(path.to_string()))?;
            (chrdev.fops.clone(), node.devt)
        };

        let ctx = FileContext {
            id: self.next_file.fetch_add(1, Ordering::SeqCst),
            devt,
            mode,
        };
        fops.open(&ctx)?;
        debug!("opened {} as file {}", path, ctx.id);
        Ok(OpenFile {
            fops,
            ctx,
            closed: false,
        })
    }

    pub fn node_exists(&self, path: &str) -> bool {
        self.registry.lock().nodes.contains_key(path)
    }

    /// Number of registered character device regions
    pub fn chrdev_count(&self) -> usize {
        self.registry.lock().chrdevs.len()
    }

    pub fn class_count(&self) -> usize {
        self.registry.lock().classes.len()
    }

    pub fn node_count(&self) -> usize {
        self.registry.lock().nodes.len()
    }

    /// The most recent releases, oldest first, at most `RELEASE_LOG_LIMIT`
    pub fn released(&self) -> Vec<Released> {
        self.registry.lock().released.iter().cloned().collect()
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for MemoryHost {
    fn register_chrdev(
        &self,
        name: &str,
        fops: Arc<dyn FileOperations>,
    ) -> std::result::Result<u32, Errno> {
        let mut registry = self.registry.lock();
        registry.take_fault(RegistrationStep::Chrdev)?;
        if registry.chrdevs.values().any(|c| c.name == name) {
            return Err(Errno::EBUSY);
        }
        let major = registry.next_major;
        registry.next_major += 1;
        registry.chrdevs.insert(
            major,
            Chrdev {
                name: name.to_string(),
                fops,
            },
        );
        Ok(major)
    }

    fn unregister_chrdev(&self, major: u32, name: &str) {
        let mut registry = self.registry.lock();
        if registry.chrdevs.get(&major).is_some_and(|c| c.name == name) {
            registry.chrdevs.remove(&major);
            registry.record(Released::Chrdev(major));
        }
    }

    fn class_create(&self, name: &str) -> std::result::Result<ClassId, Errno> {
        let mut registry = self.registry.lock();
        registry.take_fault(RegistrationStep::Class)?;
        if registry.classes.values().any(|c| c == name) {
            return Err(Errno::EEXIST);
        }
        let id = ClassId(registry.next_class);
        registry.next_class += 1;
        registry.classes.insert(id, name.to_string());
        Ok(id)
    }

    fn class_destroy(&self, class: ClassId) {
        let mut registry = self.registry.lock();
        if let Some(name) = registry.classes.remove(&class) {
            registry.record(Released::Class(name));
        }
    }

    fn device_create(
        &self,
        class: ClassId,
        devt: DeviceNumber,
        name: &str,
    ) -> std::result::Result<String, Errno> {
        let mut registry = self.registry.lock();
        registry.take_fault(RegistrationStep::Node)?;
        if !registry.classes.contains_key(&class) {
            return Err(Errno::EINVAL);
        }
        let path = format!("{}/{}", DEV_ROOT, name);
        if registry.nodes.contains_key(&path) {
            return Err(Errno::EEXIST);
        }
        registry.nodes.insert(path.clone(), Node { class, devt });
        Ok(path)
    }

    fn device_destroy(&self, class: ClassId, devt: DeviceNumber) {
        let mut registry = self.registry.lock();
        let before = registry.nodes.len();
        registry
            .nodes
            .retain(|_, node| !(node.class == class && node.devt == devt));
        if registry.nodes.len() != before {
            registry.record(Released::Node(devt));
        }
    }
}

/// An open file on a device node
///
/// Dropping the file closes it.
pub struct OpenFile {
    fops: Arc<dyn FileOperations>,
    ctx: FileContext,
    closed: bool,
}

impl std::fmt::Debug for OpenFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenFile")
            .field("ctx", &self.ctx)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl OpenFile {
    pub fn mode(&self) -> AccessMode {
        self.ctx.mode
    }

    /// Read into `buf`, returning the number of bytes received
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        if !self.ctx.mode.can_read() {
            return Err(Error::BadAccess("reading"));
        }
        self.fops.read(&self.ctx, &mut UserSliceMut::new(buf))
    }

    pub fn write(&self, data: &[u8]) -> Result<usize> {
        self.write_with_len(data, data.len())
    }

    /// Write with an explicit length, which may claim more than `data` holds
    pub fn write_with_len(&self, data: &[u8], len: usize) -> Result<usize> {
        if !self.ctx.mode.can_write() {
            return Err(Error::BadAccess("writing"));
        }
        self.fops.write(&self.ctx, &UserSlice::with_len(data, len))
    }

    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.fops.release(&self.ctx)
    }
}

impl Drop for OpenFile {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.fops.release(&self.ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MessageDevice;

    #[test]
    fn test_open_unknown_path() {
        let host = MemoryHost::new();
        let err = host.open("/dev/missing", AccessMode::ReadWrite).unwrap_err();
        assert!(matches!(err, Error::NoDevice(ref p) if p == "/dev/missing"));
        assert_eq!(err.code(), -(Errno::ENODEV as i32 as isize));
    }

    #[test]
    fn test_duplicate_chrdev_name_is_busy() {
        let host = MemoryHost::new();
        let dev = Arc::new(MessageDevice::new("dup"));
        assert_eq!(host.register_chrdev("dup", dev.clone()).unwrap(), FIRST_MAJOR);
        assert_eq!(host.register_chrdev("dup", dev).unwrap_err(), Errno::EBUSY);
    }

    #[test]
    fn test_injected_fault_fires_once() {
        let host = MemoryHost::new();
        host.fail_next(RegistrationStep::Class, Errno::ENOMEM);
        assert_eq!(host.class_create("char").unwrap_err(), Errno::ENOMEM);
        assert!(host.class_create("char").is_ok());
    }

    #[test]
    fn test_release_log_is_bounded() {
        let host = MemoryHost::new();
        for _ in 0..RELEASE_LOG_LIMIT + 10 {
            let class = host.class_create("char").unwrap();
            host.class_destroy(class);
        }
        let released = host.released();
        assert_eq!(released.len(), RELEASE_LOG_LIMIT);
        assert!(released.iter().all(|r| *r == Released::Class("char".to_string())));
    }

    #[test]
    fn test_access_mode_enforced() {
        let host = MemoryHost::new();
        let dev = Arc::new(MessageDevice::new("modes"));
        let major = host.register_chrdev("modes", dev).unwrap();
        let class = host.class_create("char").unwrap();
        let path = host
            .device_create(class, DeviceNumber::new(major, 0), "modes")
            .unwrap();

        let reader = host.open(&path, AccessMode::ReadOnly).unwrap();
        assert!(matches!(reader.write(b"x"), Err(Error::BadAccess(_))));

        let writer = host.open(&path, AccessMode::WriteOnly).unwrap();
        let mut buf = [0u8; 16];
        assert!(matches!(writer.read(&mut buf), Err(Error::BadAccess(_))));
        assert_eq!(writer.write(b"x").unwrap(), 1);

        let n = reader.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"x(1 letters)");
    }

    #[test]
    fn test_drop_closes_file() {
        let host = MemoryHost::new();
        let dev = Arc::new(MessageDevice::new("drop"));
        let major = host.register_chrdev("drop", dev.clone()).unwrap();
        let class = host.class_create("char").unwrap();
        let path = host
            .device_create(class, DeviceNumber::new(major, 0), "drop")
            .unwrap();

        {
            let _file = host.open(&path, AccessMode::ReadWrite).unwrap();
        }
        host.open(&path, AccessMode::ReadWrite).unwrap().close().unwrap();
        assert_eq!(dev.open_count(), 2);
    }
}
