//! Parsing of the `bus0..bus3` tuple syntax and controller declarations.

use std::num::ParseIntError;

use bus_provision::{RawBusConfig, BUS_PARAM_COUNT};
use derive_more::From;

/// Why a command-line value failed to parse.
#[derive(Debug, From)]
pub enum ParamError {
    /// A field was not an unsigned integer.
    #[from]
    Field(ParseIntError),
    /// More than [`BUS_PARAM_COUNT`] fields in one bus tuple.
    TooManyFields(usize),
    /// Controller declaration not of the form `label:base:count`.
    Controller,
}

impl std::fmt::Display for ParamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamError::Field(err) => {
                write!(f, "bad field: {}", err)
            }
            ParamError::TooManyFields(count) => {
                write!(
                    f,
                    "{} fields in a tuple of at most {}",
                    count, BUS_PARAM_COUNT
                )
            }
            ParamError::Controller => {
                write!(f, "controller declaration must be label:base:count")
            }
        }
    }
}

impl std::error::Error for ParamError {}

/// Parses one `id,data,clock[,udelay,timeout,data_od,clock_od,clock_oo]`
/// tuple. The empty string is the unconfigured tuple.
pub fn parse_bus(arg: &str) -> Result<RawBusConfig, ParamError> {
    if arg.is_empty() {
        return Ok(RawBusConfig::empty());
    }
    let mut values = [0u32; BUS_PARAM_COUNT];
    let mut count = 0usize;
    for field in arg.split(',') {
        if count == BUS_PARAM_COUNT {
            return Err(ParamError::TooManyFields(arg.split(',').count()));
        }
        values[count] = field.trim().parse()?;
        count += 1;
    }
    match RawBusConfig::from_slice(&values[..count]) {
        Some(raw) => Ok(raw),
        None => Err(ParamError::TooManyFields(count)),
    }
}

/// Parses a `label:base:count` controller declaration.
pub fn parse_controller(arg: &str) -> Result<(String, u32, u32), ParamError> {
    let mut parts = arg.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(label), Some(base), Some(count)) if !label.is_empty() => Ok((
            label.to_owned(),
            base.trim().parse()?,
            count.trim().parse()?,
        )),
        _ => Err(ParamError::Controller),
    }
}
