//! Resolution of global line numbers to controller-relative bindings.
//!
//! Two deployment models of the line-addressing scheme exist: either global
//! numbers address lines directly, or each line belongs to a controller and
//! must be addressed by its offset within that controller. Both are
//! expressed through the single [`LineResolver`] seam so the rest of the
//! core does not care which model is in effect.

use heapless::{String, Vec};

/// Longest accepted controller label, in bytes.
pub const CONTROLLER_LABEL_MAX: usize = 16;
/// Maximum number of controllers a [`LineMap`] can hold.
pub const CONTROLLER_MAX: usize = 8;

/// Owned controller label.
pub type ControllerLabel = String<CONTROLLER_LABEL_MAX>;

/// A line's owning controller and its offset within that controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLine {
    pub controller: ControllerLabel,
    pub offset: u32,
}

/// No controller owns the given global line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NoSuchLine(pub u32);

/// Maps a global line number to the controller that owns it.
pub trait LineResolver {
    fn resolve(&self, line: u32) -> Result<ResolvedLine, NoSuchLine>;
}

/// Passthrough strategy: every line belongs to one implicit controller and
/// keeps its global number as the offset.
#[derive(Debug, Clone)]
pub struct FlatLines {
    label: ControllerLabel,
}

impl FlatLines {
    /// `label` names the implicit controller. Returns `None` when the label
    /// exceeds [`CONTROLLER_LABEL_MAX`] bytes.
    pub fn new(label: &str) -> Option<Self> {
        Some(Self { label: ControllerLabel::try_from(label).ok()? })
    }
}

impl LineResolver for FlatLines {
    fn resolve(&self, line: u32) -> Result<ResolvedLine, NoSuchLine> {
        Ok(ResolvedLine { controller: self.label.clone(), offset: line })
    }
}

/// Why a controller could not be added to a [`LineMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MapError {
    /// The map already holds [`CONTROLLER_MAX`] controllers.
    Full,
    /// Label longer than [`CONTROLLER_LABEL_MAX`] bytes.
    LabelTooLong,
    /// The range overlaps an already registered controller.
    Overlap,
}

impl core::fmt::Display for MapError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MapError::Full => {
                write!(f, "no room for another controller")
            }
            MapError::LabelTooLong => {
                write!(f, "label exceeds {} bytes", CONTROLLER_LABEL_MAX)
            }
            MapError::Overlap => {
                write!(f, "range overlaps a registered controller")
            }
        }
    }
}

/// One registered line controller: a contiguous range of global numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LineController {
    label: ControllerLabel,
    base: u32,
    count: u32,
}

/// Controller-relative strategy: global numbers are resolved against the
/// registered controller ranges, and the offset is the line's position
/// within the owning range.
#[derive(Debug, Default)]
pub struct LineMap {
    controllers: Vec<LineController, CONTROLLER_MAX>,
}

impl LineMap {
    pub const fn new() -> Self {
        Self { controllers: Vec::new() }
    }

    /// Registers a controller owning `count` lines starting at `base`.
    pub fn add(
        &mut self,
        label: &str,
        base: u32,
        count: u32,
    ) -> Result<(), MapError> {
        let label = ControllerLabel::try_from(label)
            .map_err(|_| MapError::LabelTooLong)?;
        let overlaps = |c: &LineController| {
            base < c.base.saturating_add(c.count)
                && c.base < base.saturating_add(count)
        };
        if self.controllers.iter().any(overlaps) {
            return Err(MapError::Overlap);
        }
        self.controllers
            .push(LineController { label, base, count })
            .map_err(|_| MapError::Full)?;
        Ok(())
    }
}

impl LineResolver for LineMap {
    fn resolve(&self, line: u32) -> Result<ResolvedLine, NoSuchLine> {
        self.controllers
            .iter()
            .find(|c| line >= c.base && line - c.base < c.count)
            .map(|c| ResolvedLine {
                controller: c.label.clone(),
                offset: line - c.base,
            })
            .ok_or(NoSuchLine(line))
    }
}
