//! In-memory platform registries backing the provisioning pass.

use std::collections::BTreeMap;

use bus_provision::{
    BindingRegistry, BindingTable, DeviceInstance, DeviceRegistry,
    ProvisionError, BUS_COUNT_MAX,
};

/// The pin registry's active set: installed binding tables, keyed by their
/// identity strings.
#[derive(Debug, Default)]
pub struct PinRegistry {
    tables: Vec<BindingTable>,
}

impl PinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl BindingRegistry for PinRegistry {
    fn install(&mut self, table: BindingTable) -> Result<(), ProvisionError> {
        if self.tables.len() == BUS_COUNT_MAX {
            return Err(ProvisionError::AllocationFailed);
        }
        self.tables.push(table);
        Ok(())
    }

    fn uninstall(&mut self, dev_id: &str) {
        self.tables.retain(|t| t.dev_id().as_str() != dev_id);
    }
}

/// Registry of live device instances, keyed by their numeric id.
#[derive(Debug, Default)]
pub struct PlatformRegistry {
    devices: BTreeMap<u32, DeviceInstance>,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&DeviceInstance> {
        self.devices.get(&id)
    }
}

impl DeviceRegistry for PlatformRegistry {
    type Handle = u32;

    fn register(
        &mut self,
        device: DeviceInstance,
    ) -> Result<u32, ProvisionError> {
        if self.devices.contains_key(&device.id) {
            return Err(ProvisionError::RegistrationFailed);
        }
        let id = device.id;
        self.devices.insert(id, device);
        Ok(id)
    }

    fn unregister(&mut self, handle: u32) {
        self.devices.remove(&handle);
    }
}
