use std::cell::Cell;
use std::collections::BTreeMap;

use bus_provision::{
    BindingRegistry, BindingTable, DeviceInstance, DeviceParams,
    DeviceRegistry, LineMap, LineResolver, NoSuchLine, PassError,
    ProvisionError, Provisioner, RawBusConfig, ResolvedLine, Role,
    BUS_COUNT_MAX,
};

const DRIVER: &str = "i2c-gpio";

// ---------------------------------------------------------------------------
// Mock collaborators
// ---------------------------------------------------------------------------

/// Pin-registry stand-in recording installs and uninstalls.
#[derive(Default)]
struct MockPinRegistry {
    installed: Vec<BindingTable>,
    uninstalls: usize,
    fail_next_install: bool,
}

impl BindingRegistry for MockPinRegistry {
    fn install(&mut self, table: BindingTable) -> Result<(), ProvisionError> {
        if self.fail_next_install {
            self.fail_next_install = false;
            return Err(ProvisionError::AllocationFailed);
        }
        self.installed.push(table);
        Ok(())
    }

    fn uninstall(&mut self, dev_id: &str) {
        self.uninstalls += 1;
        self.installed.retain(|t| t.dev_id().as_str() != dev_id);
    }
}

/// Device-registry stand-in keyed by bus id.
#[derive(Default)]
struct MockDeviceRegistry {
    devices: BTreeMap<u32, DeviceInstance>,
    unregisters: usize,
    fail_next_register: bool,
}

impl DeviceRegistry for MockDeviceRegistry {
    type Handle = u32;

    fn register(
        &mut self,
        device: DeviceInstance,
    ) -> Result<u32, ProvisionError> {
        if self.fail_next_register {
            self.fail_next_register = false;
            return Err(ProvisionError::RegistrationFailed);
        }
        if self.devices.contains_key(&device.id) {
            return Err(ProvisionError::RegistrationFailed);
        }
        let id = device.id;
        self.devices.insert(id, device);
        Ok(id)
    }

    fn unregister(&mut self, handle: u32) {
        self.unregisters += 1;
        self.devices.remove(&handle);
    }
}

/// Resolver wrapper counting resolve calls.
struct CountingResolver {
    map: LineMap,
    calls: Cell<usize>,
}

impl CountingResolver {
    fn new(map: LineMap) -> Self {
        Self { map, calls: Cell::new(0) }
    }
}

impl LineResolver for CountingResolver {
    fn resolve(&self, line: u32) -> Result<ResolvedLine, NoSuchLine> {
        self.calls.set(self.calls.get() + 1);
        self.map.resolve(line)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Two controllers: gpio0 owns lines 0..32, gpio1 owns 32..64.
fn test_map() -> LineMap {
    let mut map = LineMap::new();
    map.add("gpio0", 0, 32).unwrap();
    map.add("gpio1", 32, 32).unwrap();
    map
}

fn bus(values: &[u32]) -> RawBusConfig {
    RawBusConfig::from_slice(values).unwrap()
}

fn slots(configured: &[RawBusConfig]) -> [RawBusConfig; BUS_COUNT_MAX] {
    let mut all = [RawBusConfig::empty(); BUS_COUNT_MAX];
    all[..configured.len()].copy_from_slice(configured);
    all
}

// ---------------------------------------------------------------------------
// Pass-level behavior
// ---------------------------------------------------------------------------

#[test]
fn single_bus_with_defaults() {
    let map = test_map();
    let mut pins = MockPinRegistry::default();
    let mut devices = MockDeviceRegistry::default();

    let set = Provisioner::new(DRIVER, &map, &mut pins, &mut devices)
        .run(&slots(&[bus(&[0, 5, 6])]))
        .unwrap();

    assert_eq!(set.len(), 1);
    assert_eq!(devices.devices.len(), 1);
    assert_eq!(devices.devices[&0].params, DeviceParams::default());

    assert_eq!(pins.installed.len(), 1);
    let table = &pins.installed[0];
    assert_eq!(table.dev_id().as_str(), "i2c-gpio.0");
    assert_eq!(table.binding(Role::Data).controller.as_str(), "gpio0");
    assert_eq!(table.binding(Role::Data).offset, 5);
    assert_eq!(table.binding(Role::Clock).offset, 6);
}

#[test]
fn full_tuple_maps_every_parameter() {
    let map = test_map();
    let mut pins = MockPinRegistry::default();
    let mut devices = MockDeviceRegistry::default();

    let set = Provisioner::new(DRIVER, &map, &mut pins, &mut devices)
        .run(&slots(&[bus(&[2, 5, 40, 10, 100, 1, 1, 1])]))
        .unwrap();

    assert_eq!(set.len(), 1);
    let params = devices.devices[&2].params;
    assert_eq!(params.toggle_delay, 10);
    assert_eq!(params.stretch_timeout, 100);
    assert!(params.data_open_drain);
    assert!(params.clock_open_drain);
    assert!(params.clock_output_only);

    // Line 40 lives on the second controller.
    let table = &pins.installed[0];
    assert_eq!(table.binding(Role::Clock).controller.as_str(), "gpio1");
    assert_eq!(table.binding(Role::Clock).offset, 8);
}

#[test]
fn later_failure_rolls_back_earlier_slots() {
    let map = test_map();
    let mut pins = MockPinRegistry::default();
    let mut devices = MockDeviceRegistry::default();

    // Slot 0 provisions, slot 1 names a line nobody owns.
    let err = Provisioner::new(DRIVER, &map, &mut pins, &mut devices)
        .run(&slots(&[bus(&[0, 5, 6]), bus(&[1, 100_000, 7])]))
        .unwrap_err();

    assert_eq!(
        err,
        PassError::Bus {
            slot: 1,
            kind: ProvisionError::UnresolvableLine {
                line: 100_000,
                role: Role::Data,
            },
        }
    );
    assert!(devices.devices.is_empty());
    assert!(pins.installed.is_empty());
    assert_eq!(devices.unregisters, 1);
    assert_eq!(pins.uninstalls, 1);
}

#[test]
fn all_slots_unconfigured_is_an_error() {
    let map = test_map();
    let mut pins = MockPinRegistry::default();
    let mut devices = MockDeviceRegistry::default();

    let err = Provisioner::new(DRIVER, &map, &mut pins, &mut devices)
        .run(&[RawBusConfig::empty(); BUS_COUNT_MAX])
        .unwrap_err();

    assert_eq!(err, PassError::NoDevicesConfigured);
    assert!(pins.installed.is_empty());
    assert!(devices.devices.is_empty());
}

#[test]
fn slots_may_be_sparse() {
    let map = test_map();
    let mut pins = MockPinRegistry::default();
    let mut devices = MockDeviceRegistry::default();

    let configs = [
        RawBusConfig::empty(),
        bus(&[1, 5, 6]),
        RawBusConfig::empty(),
        bus(&[2, 7, 8]),
    ];
    let set = Provisioner::new(DRIVER, &map, &mut pins, &mut devices)
        .run(&configs)
        .unwrap();

    assert_eq!(set.len(), 2);
    let ids: Vec<u32> = set.iter().map(|b| b.id).collect();
    assert_eq!(ids, [1, 2]);
}

#[test]
fn distinct_ids_get_distinct_identities() {
    let map = test_map();
    let mut pins = MockPinRegistry::default();
    let mut devices = MockDeviceRegistry::default();

    let set = Provisioner::new(DRIVER, &map, &mut pins, &mut devices)
        .run(&slots(&[bus(&[0, 5, 6]), bus(&[1, 7, 8])]))
        .unwrap();

    let names: Vec<&str> =
        set.iter().map(|b| b.dev_id.as_str()).collect();
    assert_eq!(names, ["i2c-gpio.0", "i2c-gpio.1"]);
}

#[test]
fn duplicate_ids_fail_registration() {
    let map = test_map();
    let mut pins = MockPinRegistry::default();
    let mut devices = MockDeviceRegistry::default();

    let err = Provisioner::new(DRIVER, &map, &mut pins, &mut devices)
        .run(&slots(&[bus(&[0, 5, 6]), bus(&[0, 7, 8])]))
        .unwrap_err();

    assert_eq!(
        err,
        PassError::Bus {
            slot: 1,
            kind: ProvisionError::RegistrationFailed,
        }
    );
    assert!(devices.devices.is_empty());
    assert!(pins.installed.is_empty());
}

// ---------------------------------------------------------------------------
// Per-slot behavior
// ---------------------------------------------------------------------------

#[test]
fn unconfigured_slot_touches_nothing() {
    let map = test_map();
    let mut pins = MockPinRegistry::default();
    let mut devices = MockDeviceRegistry::default();

    let mut provisioner =
        Provisioner::new(DRIVER, &map, &mut pins, &mut devices);
    let result = provisioner.provision(&RawBusConfig::empty()).unwrap();
    assert!(result.is_none());

    assert!(pins.installed.is_empty());
    assert!(devices.devices.is_empty());
}

#[test]
fn short_tuple_fails_before_any_resolution() {
    let resolver = CountingResolver::new(test_map());
    let mut pins = MockPinRegistry::default();
    let mut devices = MockDeviceRegistry::default();

    let mut provisioner =
        Provisioner::new(DRIVER, &resolver, &mut pins, &mut devices);
    let err = provisioner.provision(&bus(&[2, 3])).unwrap_err();

    assert_eq!(err, ProvisionError::InsufficientFields { supplied: 2 });
    assert_eq!(resolver.calls.get(), 0);
    assert!(pins.installed.is_empty());
    assert!(devices.devices.is_empty());
}

#[test]
fn data_line_is_resolved_before_clock() {
    let map = test_map();
    let mut pins = MockPinRegistry::default();
    let mut devices = MockDeviceRegistry::default();

    // Both lines are bad; the data line is reported.
    let mut provisioner =
        Provisioner::new(DRIVER, &map, &mut pins, &mut devices);
    let err = provisioner.provision(&bus(&[0, 88_888, 99_999])).unwrap_err();
    assert_eq!(
        err,
        ProvisionError::UnresolvableLine { line: 88_888, role: Role::Data }
    );

    let err = provisioner.provision(&bus(&[0, 5, 99_999])).unwrap_err();
    assert_eq!(
        err,
        ProvisionError::UnresolvableLine { line: 99_999, role: Role::Clock }
    );
}

#[test]
fn registration_failure_uninstalls_the_table() {
    let map = test_map();
    let mut pins = MockPinRegistry::default();
    let mut devices = MockDeviceRegistry {
        fail_next_register: true,
        ..Default::default()
    };

    let mut provisioner =
        Provisioner::new(DRIVER, &map, &mut pins, &mut devices);
    let err = provisioner.provision(&bus(&[0, 5, 6])).unwrap_err();

    assert_eq!(err, ProvisionError::RegistrationFailed);
    assert!(pins.installed.is_empty());
    assert_eq!(pins.uninstalls, 1);
    assert!(devices.devices.is_empty());
}

#[test]
fn install_failure_registers_nothing() {
    let map = test_map();
    let mut pins = MockPinRegistry {
        fail_next_install: true,
        ..Default::default()
    };
    let mut devices = MockDeviceRegistry::default();

    let mut provisioner =
        Provisioner::new(DRIVER, &map, &mut pins, &mut devices);
    let err = provisioner.provision(&bus(&[0, 5, 6])).unwrap_err();

    assert_eq!(err, ProvisionError::AllocationFailed);
    assert!(pins.installed.is_empty());
    assert_eq!(pins.uninstalls, 0);
    assert!(devices.devices.is_empty());
}

#[test]
fn oversized_driver_name_is_rejected() {
    let map = test_map();
    let mut pins = MockPinRegistry::default();
    let mut devices = MockDeviceRegistry::default();

    let driver = "a-driver-name-well-past-the-identity-bound";
    let mut provisioner =
        Provisioner::new(driver, &map, &mut pins, &mut devices);
    let err = provisioner.provision(&bus(&[3, 5, 6])).unwrap_err();

    assert_eq!(err, ProvisionError::IdentityTooLarge { id: 3 });
    assert!(pins.installed.is_empty());
}

// ---------------------------------------------------------------------------
// Teardown
// ---------------------------------------------------------------------------

#[test]
fn teardown_unwinds_in_provision_order() {
    let map = test_map();
    let mut pins = MockPinRegistry::default();
    let mut devices = MockDeviceRegistry::default();

    let mut set = Provisioner::new(DRIVER, &map, &mut pins, &mut devices)
        .run(&slots(&[bus(&[0, 5, 6]), bus(&[1, 7, 8])]))
        .unwrap();

    set.teardown(&mut pins, &mut devices);
    assert!(set.is_empty());
    assert!(pins.installed.is_empty());
    assert!(devices.devices.is_empty());
    assert_eq!(pins.uninstalls, 2);
    assert_eq!(devices.unregisters, 2);
}

#[test]
fn teardown_twice_is_a_no_op() {
    let map = test_map();
    let mut pins = MockPinRegistry::default();
    let mut devices = MockDeviceRegistry::default();

    let mut set = Provisioner::new(DRIVER, &map, &mut pins, &mut devices)
        .run(&slots(&[bus(&[0, 5, 6])]))
        .unwrap();

    set.teardown(&mut pins, &mut devices);
    set.teardown(&mut pins, &mut devices);

    assert_eq!(pins.uninstalls, 1);
    assert_eq!(devices.unregisters, 1);
}
