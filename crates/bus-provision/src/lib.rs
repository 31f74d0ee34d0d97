#![no_std]
//! Provisioning core for bit-banged two-wire bus instances.
//!
//! Turns small integer configuration tuples into registered logical bus
//! devices: each tuple is validated, its two signal lines are resolved to
//! controller-relative bindings, a named binding table is installed into
//! the pin registry's active set, and a device instance is registered for
//! the bus-emulation driver to pick up. Provisioning is all-or-nothing per
//! bus, and a failing pass tears down everything it installed.
//!
//! The collaborators (line resolution, the pin registry's active set, the
//! device registry) are traits, so the core carries no I/O of its own.

mod binding;
mod config;
mod error;
mod provision;
mod registry;
mod resolver;

pub use binding::{BindingTable, BusName, Role, DEV_ID_MAX};
pub use config::{
    BusParams, DeviceParams, RawBusConfig, BUS_COUNT_MAX, BUS_PARAM_COUNT,
    BUS_PARAM_REQUIRED,
};
pub use error::{PassError, ProvisionError};
pub use provision::{ProvisionedBus, ProvisionedSet, Provisioner};
pub use registry::{BindingRegistry, DeviceInstance, DeviceRegistry};
pub use resolver::{
    ControllerLabel, FlatLines, LineMap, LineResolver, MapError, NoSuchLine,
    ResolvedLine, CONTROLLER_LABEL_MAX, CONTROLLER_MAX,
};
