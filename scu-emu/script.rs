//! Scripted bus accesses for the `run` subcommand
//!
//! | Syntax          | Meaning                              |
//! |-----------------|--------------------------------------|
//! | `r:OFF[/W]`     | read `W` bytes (default 4) at `OFF`  |
//! | `w:OFF=VAL[/W]` | write `VAL` with width `W`           |
//! | `reset`         | reset the device                     |
//! | `apb`           | query the APB frequency              |
//!
//! Numbers accept `0x` hex, `0b` binary or decimal.

use std::fmt;
use std::str::FromStr;

use crate::config::parse_u32;
use crate::device::Scu;
use crate::error::{Result, ScuError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOp {
    Read { offset: u64, size: u32 },
    Write { offset: u64, size: u32, value: u32 },
    Reset,
    Apb,
}

impl ScriptOp {
    /// Run the operation; returns a line of output for reads and queries
    pub fn apply(&self, scu: &Scu) -> Result<Option<String>> {
        match *self {
            ScriptOp::Read { offset, size } => {
                let value = scu.checked_read(offset, size)?;
                Ok(Some(format!("0x{offset:03X} = 0x{value:08X}")))
            }
            ScriptOp::Write {
                offset,
                size,
                value,
            } => {
                scu.checked_write(offset, size, u64::from(value))?;
                Ok(None)
            }
            ScriptOp::Reset => {
                scu.reset();
                Ok(None)
            }
            ScriptOp::Apb => Ok(Some(format!("apb = {} Hz", scu.apb_frequency()))),
        }
    }
}

fn split_width(s: &str) -> Result<(&str, u32)> {
    match s.split_once('/') {
        Some((rest, width)) => Ok((rest, parse_u32(width)?)),
        None => Ok((s, 4)),
    }
}

impl FromStr for ScriptOp {
    type Err = ScuError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s {
            "reset" => return Ok(ScriptOp::Reset),
            "apb" => return Ok(ScriptOp::Apb),
            _ => {}
        }

        let bad = || ScuError::ParseError(format!("bad access '{s}'"));

        if let Some(rest) = s.strip_prefix("r:") {
            let (offset, size) = split_width(rest)?;
            return Ok(ScriptOp::Read {
                offset: u64::from(parse_u32(offset)?),
                size,
            });
        }

        if let Some(rest) = s.strip_prefix("w:") {
            let (assign, size) = split_width(rest)?;
            let (offset, value) = assign.split_once('=').ok_or_else(bad)?;
            return Ok(ScriptOp::Write {
                offset: u64::from(parse_u32(offset)?),
                size,
                value: parse_u32(value)?,
            });
        }

        Err(bad())
    }
}

impl fmt::Display for ScriptOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptOp::Read { offset, size } => write!(f, "r:0x{offset:X}/{size}"),
            ScriptOp::Write {
                offset,
                size,
                value,
            } => write!(f, "w:0x{offset:X}=0x{value:X}/{size}"),
            ScriptOp::Reset => f.write_str("reset"),
            ScriptOp::Apb => f.write_str("apb"),
        }
    }
}

/// Run `ops` in order, stopping at the first rejected access
pub fn run(scu: &Scu, ops: &[ScriptOp]) -> Result<Vec<String>> {
    let mut output = Vec::new();
    for op in ops {
        tracing::debug!("Applying {}", op);
        if let Some(line) = op.apply(scu)? {
            output.push(line);
        }
    }
    Ok(output)
}
