//! RAII guards for host registrations

use crate::host::{ClassId, DeviceNumber, Host};
use log::debug;
use std::sync::Arc;

/// A resource acquired from the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HostResource {
    Chrdev { major: u32, name: String },
    Class(ClassId),
    Node { class: ClassId, devt: DeviceNumber },
}

/// Releases its resource back to the host when dropped
pub(crate) struct HostGuard {
    host: Arc<dyn Host>,
    resource: HostResource,
}

impl HostGuard {
    pub(crate) fn new(host: Arc<dyn Host>, resource: HostResource) -> Self {
        Self { host, resource }
    }

    fn release(&self) {
        debug!("releasing {:?}", self.resource);
        match &self.resource {
            HostResource::Chrdev { major, name } => self.host.unregister_chrdev(*major, name),
            HostResource::Class(class) => self.host.class_destroy(*class),
            HostResource::Node { class, devt } => self.host.device_destroy(*class, *devt),
        }
    }
}

impl Drop for HostGuard {
    fn drop(&mut self) {
        self.release();
    }
}
