//! Binding tables: named role-to-line mappings handed to the pin registry.

use core::fmt::Write;

use heapless::String;

use crate::config::BusParams;
use crate::error::ProvisionError;
use crate::resolver::{LineResolver, ResolvedLine};

/// Byte bound on a binding table's identity string.
pub const DEV_ID_MAX: usize = 32;

/// Identity string of a binding table, formatted `<driver>.<id>`.
pub type BusName = String<DEV_ID_MAX>;

/// Logical role of a signal line within a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    Data,
    Clock,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Data => "data",
            Role::Clock => "clock",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapping from the two bus roles to resolved physical lines, keyed by a
/// per-bus identity string.
///
/// Building a table touches nothing outside the table itself; installing
/// it into the pin registry's active set is the provisioner's job, so a
/// builder failure never needs rollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingTable {
    dev_id: BusName,
    data: ResolvedLine,
    clock: ResolvedLine,
}

impl BindingTable {
    /// Resolves both lines and allocates the identity string.
    ///
    /// The data line is resolved before the clock line, and the first
    /// unresolvable line aborts with no partial table. An identity that
    /// would not fit [`DEV_ID_MAX`] bytes is an error, never a truncation.
    pub fn build<R: LineResolver + ?Sized>(
        driver: &str,
        params: &BusParams,
        resolver: &R,
    ) -> Result<Self, ProvisionError> {
        let data = resolver.resolve(params.data_line).map_err(|e| {
            ProvisionError::UnresolvableLine { line: e.0, role: Role::Data }
        })?;
        let clock = resolver.resolve(params.clock_line).map_err(|e| {
            ProvisionError::UnresolvableLine { line: e.0, role: Role::Clock }
        })?;

        let mut dev_id = BusName::new();
        write!(dev_id, "{}.{}", driver, params.id)
            .map_err(|_| ProvisionError::IdentityTooLarge { id: params.id })?;

        Ok(Self { dev_id, data, clock })
    }

    /// Identity the table installs under.
    pub fn dev_id(&self) -> &BusName {
        &self.dev_id
    }

    /// The resolved line bound to `role`.
    pub fn binding(&self, role: Role) -> &ResolvedLine {
        match role {
            Role::Data => &self.data,
            Role::Clock => &self.clock,
        }
    }
}
