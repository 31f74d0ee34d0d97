//! Per-slot provisioning, the provisioning pass, and teardown.

use heapless::Vec;

use crate::binding::{BindingTable, BusName};
use crate::config::{RawBusConfig, BUS_COUNT_MAX};
use crate::error::{PassError, ProvisionError};
use crate::registry::{BindingRegistry, DeviceInstance, DeviceRegistry};
use crate::resolver::LineResolver;

/// One successfully provisioned bus: its registration key, the identity of
/// its installed binding table, and the device registry's handle.
#[derive(Debug)]
pub struct ProvisionedBus<H> {
    pub id: u32,
    pub dev_id: BusName,
    device: H,
}

/// Owned result of a provisioning pass.
///
/// Holds what [`Provisioner::run`] installed; teardown is a method on this
/// structure, so the caller owns the only bookkeeping and a second pass
/// cannot silently build on stale global state.
#[derive(Debug)]
pub struct ProvisionedSet<H> {
    buses: Vec<ProvisionedBus<H>, BUS_COUNT_MAX>,
}

impl<H> ProvisionedSet<H> {
    pub const fn new() -> Self {
        Self { buses: Vec::new() }
    }

    /// Number of provisioned buses.
    pub fn len(&self) -> usize {
        self.buses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProvisionedBus<H>> {
        self.buses.iter()
    }

    /// Unwinds every provisioned bus, in provision order: the device is
    /// unregistered first, then its binding table is uninstalled and the
    /// identity released.
    ///
    /// The set is drained as it unwinds, so calling this again is a no-op,
    /// and a partially filled set (a pass that failed midway) unwinds just
    /// as well as a complete one.
    pub fn teardown<B, D>(&mut self, bindings: &mut B, devices: &mut D)
    where
        B: BindingRegistry,
        D: DeviceRegistry<Handle = H>,
    {
        for bus in core::mem::take(&mut self.buses) {
            devices.unregister(bus.device);
            bindings.uninstall(&bus.dev_id);
        }
    }
}

/// Uninstalls a just-installed binding table unless released.
struct InstalledTable<'r, B: BindingRegistry> {
    bindings: &'r mut B,
    dev_id: Option<BusName>,
}

impl<'r, B: BindingRegistry> InstalledTable<'r, B> {
    fn new(bindings: &'r mut B, dev_id: BusName) -> Self {
        Self { bindings, dev_id: Some(dev_id) }
    }

    /// Keeps the table installed and returns its identity.
    fn release(mut self) -> BusName {
        match self.dev_id.take() {
            Some(dev_id) => dev_id,
            None => unreachable!(),
        }
    }
}

impl<B: BindingRegistry> Drop for InstalledTable<'_, B> {
    fn drop(&mut self) {
        if let Some(dev_id) = self.dev_id.take() {
            self.bindings.uninstall(&dev_id);
        }
    }
}

/// Orchestrates provisioning against the collaborator registries.
///
/// `driver` names the bus-emulation driver the devices are created for;
/// binding-table identities are formatted `<driver>.<id>`.
pub struct Provisioner<'a, R: ?Sized, B, D> {
    driver: &'a str,
    resolver: &'a R,
    bindings: &'a mut B,
    devices: &'a mut D,
}

impl<'a, R, B, D> Provisioner<'a, R, B, D>
where
    R: LineResolver + ?Sized,
    B: BindingRegistry,
    D: DeviceRegistry,
{
    pub fn new(
        driver: &'a str,
        resolver: &'a R,
        bindings: &'a mut B,
        devices: &'a mut D,
    ) -> Self {
        Self { driver, resolver, bindings, devices }
    }

    /// Provisions one slot. `Ok(None)` means the slot was unconfigured and
    /// nothing was touched.
    ///
    /// Acquisition order: binding table installed, then device registered.
    /// Rollback mirrors it in reverse: the registry drops a rejected
    /// instance, after which the guard uninstalls the table. Failures
    /// before installation have nothing to undo.
    pub fn provision(
        &mut self,
        raw: &RawBusConfig,
    ) -> Result<Option<ProvisionedBus<D::Handle>>, ProvisionError> {
        let params = match raw.params()? {
            Some(params) => params,
            None => return Ok(None),
        };

        let table = BindingTable::build(self.driver, &params, self.resolver)?;
        let dev_id = table.dev_id().clone();
        self.bindings.install(table)?;
        let guard = InstalledTable::new(&mut *self.bindings, dev_id);

        let device = DeviceInstance { id: params.id, params: params.device };
        let handle = self.devices.register(device)?;

        let dev_id = guard.release();
        Ok(Some(ProvisionedBus { id: params.id, dev_id, device: handle }))
    }

    /// Runs the full pass over the slots in fixed order.
    ///
    /// The first failing slot aborts the pass: everything provisioned
    /// before it is torn down and the error is returned with the slot
    /// index attached. A pass in which every slot is unconfigured is
    /// itself an error.
    pub fn run(
        &mut self,
        configs: &[RawBusConfig; BUS_COUNT_MAX],
    ) -> Result<ProvisionedSet<D::Handle>, PassError> {
        let mut set = ProvisionedSet::new();
        for (slot, raw) in configs.iter().enumerate() {
            match self.provision(raw) {
                Ok(Some(bus)) => {
                    // Capacity equals the slot count, so the push cannot
                    // overflow.
                    if let Err(bus) = set.buses.push(bus) {
                        self.devices.unregister(bus.device);
                        self.bindings.uninstall(&bus.dev_id);
                        set.teardown(self.bindings, self.devices);
                        return Err(PassError::Bus {
                            slot,
                            kind: ProvisionError::AllocationFailed,
                        });
                    }
                }
                Ok(None) => {}
                Err(kind) => {
                    set.teardown(self.bindings, self.devices);
                    return Err(PassError::Bus { slot, kind });
                }
            }
        }
        if set.is_empty() {
            return Err(PassError::NoDevicesConfigured);
        }
        Ok(set)
    }
}
