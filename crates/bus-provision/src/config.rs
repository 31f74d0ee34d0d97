//! Raw configuration tuples and their validation.

use crate::error::ProvisionError;

/// Number of bus slots a provisioning pass covers.
pub const BUS_COUNT_MAX: usize = 4;
/// Number of fields in a full configuration tuple.
pub const BUS_PARAM_COUNT: usize = 8;
/// Fields that must be present for a slot to be configured: the bus id and
/// the two line numbers.
pub const BUS_PARAM_REQUIRED: usize = 3;

const PARAM_ID: usize = 0;
const PARAM_DATA: usize = 1;
const PARAM_CLOCK: usize = 2;
const PARAM_DELAY: usize = 3;
const PARAM_TIMEOUT: usize = 4;
const PARAM_DATA_OD: usize = 5;
const PARAM_CLOCK_OD: usize = 6;
const PARAM_CLOCK_OO: usize = 7;

/// One bus slot's raw tuple: up to [`BUS_PARAM_COUNT`] unsigned integers
/// plus the count the loader actually supplied.
///
/// Unsupplied trailing fields read as zero, but the supplied count keeps
/// them distinct from explicit zeros for the required-field check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawBusConfig {
    values: [u32; BUS_PARAM_COUNT],
    supplied: usize,
}

impl RawBusConfig {
    /// The empty tuple: this slot is unconfigured.
    pub const fn empty() -> Self {
        Self { values: [0; BUS_PARAM_COUNT], supplied: 0 }
    }

    /// Builds a tuple from the loader's value list. Returns `None` when
    /// more than [`BUS_PARAM_COUNT`] values are supplied.
    pub fn from_slice(values: &[u32]) -> Option<Self> {
        if values.len() > BUS_PARAM_COUNT {
            return None;
        }
        let mut raw = Self::empty();
        raw.values[..values.len()].copy_from_slice(values);
        raw.supplied = values.len();
        Some(raw)
    }

    /// Number of fields the loader supplied for this slot.
    pub fn supplied(&self) -> usize {
        self.supplied
    }

    /// Validates the tuple. `Ok(None)` means the slot is unconfigured and
    /// contributes nothing to the pass; a tuple with some but fewer than
    /// [`BUS_PARAM_REQUIRED`] fields is an error. Pure check, no side
    /// effects.
    pub fn params(&self) -> Result<Option<BusParams>, ProvisionError> {
        match self.supplied {
            0 => Ok(None),
            n if n < BUS_PARAM_REQUIRED => {
                Err(ProvisionError::InsufficientFields { supplied: n })
            }
            _ => Ok(Some(BusParams {
                id: self.values[PARAM_ID],
                data_line: self.values[PARAM_DATA],
                clock_line: self.values[PARAM_CLOCK],
                device: DeviceParams {
                    toggle_delay: self.values[PARAM_DELAY],
                    stretch_timeout: self.values[PARAM_TIMEOUT],
                    data_open_drain: self.values[PARAM_DATA_OD] != 0,
                    clock_open_drain: self.values[PARAM_CLOCK_OD] != 0,
                    clock_output_only: self.values[PARAM_CLOCK_OO] != 0,
                },
            })),
        }
    }
}

/// A validated configuration tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusParams {
    /// Logical bus id, used as the device registration key.
    pub id: u32,
    /// Global line number of the data signal.
    pub data_line: u32,
    /// Global line number of the clock signal.
    pub clock_line: u32,
    /// Parameter block handed to the device instance.
    pub device: DeviceParams,
}

/// Parameter block carried by a registered device instance, consumed by the
/// bus-emulation driver when it starts. Unset fields default to zero/false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceParams {
    /// Signal settling time between line toggles.
    pub toggle_delay: u32,
    /// Upper bound on waiting out a stretched clock.
    pub stretch_timeout: u32,
    /// The data line is driven open drain.
    pub data_open_drain: bool,
    /// The clock line is driven open drain.
    pub clock_open_drain: bool,
    /// The clock line's output driver cannot be turned off.
    pub clock_output_only: bool,
}
