//! Errors surfaced by the provisioning core.

use crate::binding::Role;
use crate::config::BUS_PARAM_REQUIRED;

/// Why one bus slot failed to provision.
///
/// Every kind is terminal for its slot; nothing is retried. On `Err`,
/// nothing for the failing slot remains installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProvisionError {
    /// The tuple supplied some fields, but fewer than the required three.
    InsufficientFields { supplied: usize },
    /// No controller owns the given global line number.
    UnresolvableLine { line: u32, role: Role },
    /// The formatted identity string would exceed its fixed bound.
    IdentityTooLarge { id: u32 },
    /// A collaborator could not obtain a needed resource.
    AllocationFailed,
    /// The device registry rejected the instance or its parameter block.
    RegistrationFailed,
}

impl core::fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProvisionError::InsufficientFields { supplied } => {
                write!(
                    f,
                    "only {} of {} required fields supplied",
                    supplied, BUS_PARAM_REQUIRED
                )
            }
            ProvisionError::UnresolvableLine { line, role } => {
                write!(f, "no controller owns {} line {}", role, line)
            }
            ProvisionError::IdentityTooLarge { id } => {
                write!(f, "identity string for bus id {} is too large", id)
            }
            ProvisionError::AllocationFailed => {
                write!(f, "resource allocation failed")
            }
            ProvisionError::RegistrationFailed => {
                write!(f, "device registry rejected the instance")
            }
        }
    }
}

/// Why a provisioning pass failed. A pass either fully succeeds or leaves
/// nothing installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PassError {
    /// The slot at `slot` failed with `kind`; everything provisioned
    /// before it has been torn down.
    Bus { slot: usize, kind: ProvisionError },
    /// Every slot was unconfigured; at least one bus is mandatory.
    NoDevicesConfigured,
}

impl core::fmt::Display for PassError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PassError::Bus { slot, kind } => {
                write!(f, "bus{}: {}", slot, kind)
            }
            PassError::NoDevicesConfigured => {
                write!(f, "no bus configured")
            }
        }
    }
}
