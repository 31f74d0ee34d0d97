//! Host-side utilities for provisioning bit-banged I2C buses: the
//! command-line tuple loader and in-memory stand-ins for the platform's
//! pin and device registries.

pub mod params;
pub mod platform;

/// Name of the bus-emulation driver devices are created for; binding
/// tables install under `<DRIVER_NAME>.<id>`.
pub const DRIVER_NAME: &str = "i2c-gpio";
/// Name the loader announces itself under.
pub const LOADER_NAME: &str = "i2c-gpio-custom";
/// Loader version, announced at startup.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
