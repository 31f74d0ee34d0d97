//! Collaborator seams: the pin registry's active set and the device
//! registry.

use crate::binding::BindingTable;
use crate::config::DeviceParams;
use crate::error::ProvisionError;

/// The logical device registered for one provisioned bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceInstance {
    /// Registration key.
    pub id: u32,
    /// Parameter block for the bus-emulation driver.
    pub params: DeviceParams,
}

/// The pin registry's set of installed binding tables.
///
/// `install` takes ownership: an installed table belongs to the registry
/// until `uninstall` is called with its identity. Implementations report
/// [`ProvisionError::AllocationFailed`] when the active set cannot take
/// another table; a refused table is dropped.
pub trait BindingRegistry {
    fn install(&mut self, table: BindingTable) -> Result<(), ProvisionError>;

    /// Removes the table installed under `dev_id` and releases its
    /// identity. Unknown identities are ignored.
    fn uninstall(&mut self, dev_id: &str);
}

/// Registry of live device instances.
///
/// `register` takes ownership of the instance; a rejected instance is
/// dropped by the registry. Implementations report
/// [`ProvisionError::RegistrationFailed`] when the instance or its
/// parameter block is rejected, [`ProvisionError::AllocationFailed`] when
/// backing resources run out.
pub trait DeviceRegistry {
    /// Token for later removal of a registered instance.
    type Handle;

    fn register(
        &mut self,
        device: DeviceInstance,
    ) -> Result<Self::Handle, ProvisionError>;

    fn unregister(&mut self, handle: Self::Handle);
}
