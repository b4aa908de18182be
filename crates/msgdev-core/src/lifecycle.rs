//! Device registration and teardown
//!
//! `start` acquires three host resources in order: the character device
//! region, the device class, and the device node. Each one is wrapped in a
//! guard as soon as it exists, so an early return releases whatever was
//! already acquired, newest first.

use crate::config::DeviceConfig;
use crate::device::MessageDevice;
use crate::error::{RegistrationError, RegistrationStep};
use crate::fops::FileOperations;
use crate::guard::{HostGuard, HostResource};
use crate::host::{DeviceNumber, Host};
use log::{error, info};
use nix::errno::Errno;
use std::sync::Arc;

/// A registered, reachable device
///
/// Dropping the handle tears the device down; `stop` does the same and
/// logs it. Files still open afterwards get `NoDevice`.
pub struct DeviceHandle {
    // Field order is release order: node, class, region.
    _node: HostGuard,
    _class: HostGuard,
    _chrdev: HostGuard,
    device: Arc<MessageDevice>,
    devt: DeviceNumber,
    node_path: String,
}

impl DeviceHandle {
    pub fn device_number(&self) -> DeviceNumber {
        self.devt
    }

    /// Path of the node created for the device
    pub fn node_path(&self) -> &str {
        &self.node_path
    }

    pub fn device(&self) -> &Arc<MessageDevice> {
        &self.device
    }

    /// Unregister the device and release all host resources
    pub fn stop(self) {
        let name = self.device.name().to_string();
        info!("{}: removing module", name);
        drop(self);
        info!("{}: goodbye", name);
    }
}

impl Drop for DeviceHandle {
    fn drop(&mut self) {
        self.device.retire();
    }
}

/// Register a new message device with `host`
///
/// A config that fails validation is refused with `EINVAL` before the host
/// is asked for anything.
pub fn start(
    host: Arc<dyn Host>,
    config: &DeviceConfig,
) -> Result<DeviceHandle, RegistrationError> {
    let name = config.device_name.as_str();
    info!("{}: installing module", name);

    if let Err(e) = config.validate() {
        error!("{}: {}", name, e);
        return Err(RegistrationError {
            step: RegistrationStep::Chrdev,
            errno: Errno::EINVAL,
        });
    }

    let device = Arc::new(MessageDevice::new(name));
    let fops: Arc<dyn FileOperations> = device.clone();

    let major = host.register_chrdev(name, fops).map_err(|errno| {
        error!("{}: could not register number: {}", name, errno);
        RegistrationError {
            step: RegistrationStep::Chrdev,
            errno,
        }
    })?;
    let chrdev = HostGuard::new(
        host.clone(),
        HostResource::Chrdev {
            major,
            name: name.to_string(),
        },
    );
    info!("{}: registered correctly with major number {}", name, major);

    let class_id = host.class_create(&config.class_name).map_err(|errno| {
        error!("{}: failed to register device class: {}", name, errno);
        RegistrationError {
            step: RegistrationStep::Class,
            errno,
        }
    })?;
    let class = HostGuard::new(host.clone(), HostResource::Class(class_id));
    info!("{}: device class registered correctly", name);

    let devt = DeviceNumber::new(major, 0);
    let node_path = host.device_create(class_id, devt, name).map_err(|errno| {
        error!("{}: failed to create the device: {}", name, errno);
        RegistrationError {
            step: RegistrationStep::Node,
            errno,
        }
    })?;
    let node = HostGuard::new(host, HostResource::Node { class: class_id, devt });
    info!("{}: device created correctly at {}", name, node_path);

    Ok(DeviceHandle {
        _node: node,
        _class: class,
        _chrdev: chrdev,
        device,
        devt,
        node_path,
    })
}
