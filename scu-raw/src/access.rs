//! MMIO access constraints
//!
//! Each SCU generation accepts a different set of bus access widths. The
//! check lives here, at the bus boundary, so the register engine can assume
//! every access it sees is already legal.

use crate::arch::common::SCU_IO_REGION_SIZE;

pub type Result<T> = std::result::Result<T, AccessError>;

/// Errors raised when a bus access does not fit the SCU window
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("Access width {size} not in {min}..={max} bytes")]
    Width { size: u32, min: u32, max: u32 },

    #[error("Unaligned {size}-byte access at offset 0x{offset:X}")]
    Unaligned { offset: u64, size: u32 },

    #[error("Access at offset 0x{offset:X} runs past the 0x{window:X}-byte window")]
    OutOfWindow { offset: u64, window: u32 },
}

/// Bus access widths accepted by one SCU generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessWidth {
    pub min: u32,
    pub max: u32,
    /// Whether accesses may start at an offset that is not a multiple of `size`
    pub unaligned: bool,
}

impl AccessWidth {
    /// 1 to 4 byte accesses, naturally aligned (AST2400)
    pub const ANY: Self = Self {
        min: 1,
        max: 4,
        unaligned: false,
    };

    /// Aligned 32-bit accesses only (AST2500, AST2600)
    pub const WORD: Self = Self {
        min: 4,
        max: 4,
        unaligned: false,
    };

    pub fn validate(&self, offset: u64, size: u32) -> Result<()> {
        if size < self.min || size > self.max {
            return Err(AccessError::Width {
                size,
                min: self.min,
                max: self.max,
            });
        }
        if !self.unaligned && offset % u64::from(size) != 0 {
            return Err(AccessError::Unaligned { offset, size });
        }
        let end = offset.checked_add(u64::from(size));
        if end.map_or(true, |end| end > u64::from(SCU_IO_REGION_SIZE)) {
            return Err(AccessError::OutOfWindow {
                offset,
                window: SCU_IO_REGION_SIZE,
            });
        }
        Ok(())
    }

    /// Mask selecting the bytes a `size`-byte access carries
    pub const fn mask(size: u32) -> u32 {
        if size >= 4 {
            u32::MAX
        } else {
            (1u32 << (size * 8)) - 1
        }
    }
}
