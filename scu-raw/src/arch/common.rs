//! Definitions shared by every SCU generation
//!
//! ## References
//!
//! - ASPEED AST2400/AST2500/AST2600 datasheets, SCU chapter
//! - Linux `drivers/clk/clk-aspeed.c` and `clk-ast2600.c`

use crate::register::RegisterLayout;

/// Size of the SCU MMIO window in bytes (all generations)
pub const SCU_IO_REGION_SIZE: u32 = 0x1000;

/// Magic value that unlocks the SCU when written to the protection key register
pub const SCU_PROT_KEY: u32 = 0x1688_A8A8;

/// Silicon revision identifiers reported by the SILICON_REV register
pub mod revision {
    pub const AST2400_A0: u32 = 0x0200_0303;
    pub const AST2400_A1: u32 = 0x0201_0303;
    pub const AST2500_A0: u32 = 0x0400_0303;
    pub const AST2500_A1: u32 = 0x0401_0303;
    pub const AST2600_A0: u32 = 0x0500_0303;
    pub const AST2600_A1: u32 = 0x0501_0303;

    /// Every revision the SCU model accepts at construction
    pub const SUPPORTED: [u32; 6] = [
        AST2400_A0, AST2400_A1, AST2500_A0, AST2500_A1, AST2600_A0, AST2600_A1,
    ];

    /// Check a revision against the allow-list
    pub fn is_supported(silicon_rev: u32) -> bool {
        SUPPORTED.contains(&silicon_rev)
    }

    /// SoC family byte (bits 31:24): 0x02 AST2400, 0x04 AST2500, 0x05 AST2600
    pub const fn family(silicon_rev: u32) -> u8 {
        (silicon_rev >> 24) as u8
    }

    /// Stepping byte (bits 23:16): 0 for A0, 1 for A1
    pub const fn stepping(silicon_rev: u32) -> u8 {
        ((silicon_rev >> 16) & 0xFF) as u8
    }
}

/// Reference clock frequencies selected by the hardware strap
pub mod clkin {
    pub const CLKIN_24M: u32 = 24_000_000;
    pub const CLKIN_25M: u32 = 25_000_000;
    pub const CLKIN_48M: u32 = 48_000_000;
}

/// SCU08 Clock Selection Register layout (only the fields the model decodes)
///
/// ## Register Format
///
/// | Bits   | Field        | Description                         |
/// |--------|--------------|-------------------------------------|
/// | 25-23  | pclk_divider | APB clock divider, (n + 1) * 2 / 4  |
/// | others | (opaque)     | Preserved in `raw`                  |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockSelect {
    /// PCLK divider select (3 bits)
    pub pclk_divider: u8,
    /// Remaining bits, preserved verbatim
    pub raw: u32,
}

impl ClockSelect {
    const PCLK_SHIFT: u32 = 23;
    const PCLK_MASK: u32 = 0x7;

    /// Divisor applied to the H-PLL output before the variant's APB divider
    pub fn pclk_divisor(&self) -> u32 {
        self.pclk_divider as u32 + 1
    }
}

impl RegisterLayout for ClockSelect {
    fn to_reg_value(&self) -> u32 {
        (self.raw & !(Self::PCLK_MASK << Self::PCLK_SHIFT))
            | ((self.pclk_divider as u32 & Self::PCLK_MASK) << Self::PCLK_SHIFT)
    }

    fn from_reg_value(value: u32) -> Self {
        Self {
            pclk_divider: ((value >> Self::PCLK_SHIFT) & Self::PCLK_MASK) as u8,
            raw: value,
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.pclk_divider > 7 {
            return Err("PCLK divider must be <= 7 (3 bits)");
        }
        Ok(())
    }
}

/// SCU70 Hardware Strapping Register layout (clock-related fields)
///
/// ## Register Format
///
/// | Bits   | Field            | Description                              |
/// |--------|------------------|------------------------------------------|
/// | 23     | clk_25m_in       | 25MHz reference clock input              |
/// | 18     | clk_48m_in       | 48MHz reference clock input              |
/// | 9-8    | hpll_freq_select | AST2400 strapped H-PLL frequency         |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HwStrap1 {
    pub clk_25m_in: bool,
    pub clk_48m_in: bool,
    /// Index into the AST2400 strapped H-PLL table (2 bits)
    pub hpll_freq_select: u8,
    /// Remaining strap bits, preserved verbatim
    pub raw: u32,
}

impl HwStrap1 {
    pub const CLK_25M_IN: u32 = 1 << 23;
    pub const CLK_48M_IN: u32 = 1 << 18;
    const HPLL_SHIFT: u32 = 8;
    const HPLL_MASK: u32 = 0x3;

    /// Reference clock selected by these straps
    ///
    /// 25MHz wins over 48MHz; 24MHz when neither is strapped.
    pub fn clkin(&self) -> u32 {
        if self.clk_25m_in {
            clkin::CLKIN_25M
        } else if self.clk_48m_in {
            clkin::CLKIN_48M
        } else {
            clkin::CLKIN_24M
        }
    }
}

impl RegisterLayout for HwStrap1 {
    fn to_reg_value(&self) -> u32 {
        let mut value =
            self.raw & !(Self::CLK_25M_IN | Self::CLK_48M_IN | (Self::HPLL_MASK << Self::HPLL_SHIFT));
        if self.clk_25m_in {
            value |= Self::CLK_25M_IN;
        }
        if self.clk_48m_in {
            value |= Self::CLK_48M_IN;
        }
        value | ((self.hpll_freq_select as u32 & Self::HPLL_MASK) << Self::HPLL_SHIFT)
    }

    fn from_reg_value(value: u32) -> Self {
        Self {
            clk_25m_in: (value & Self::CLK_25M_IN) != 0,
            clk_48m_in: (value & Self::CLK_48M_IN) != 0,
            hpll_freq_select: ((value >> Self::HPLL_SHIFT) & Self::HPLL_MASK) as u8,
            raw: value,
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.hpll_freq_select > 3 {
            return Err("H-PLL frequency select must be <= 3 (2 bits)");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_revisions() {
        for rev in revision::SUPPORTED {
            assert!(revision::is_supported(rev));
        }
        assert!(!revision::is_supported(0));
        assert!(!revision::is_supported(0x0402_0303));
    }

    #[test]
    fn test_revision_fields() {
        assert_eq!(revision::family(revision::AST2500_A1), 0x04);
        assert_eq!(revision::stepping(revision::AST2500_A1), 1);
        assert_eq!(revision::stepping(revision::AST2600_A0), 0);
    }

    #[test]
    fn test_clock_select_pclk() {
        // AST2400/AST2500 reset value
        let sel = ClockSelect::from_reg_value(0xF3F4_0000);
        assert_eq!(sel.pclk_divider, 7);
        assert_eq!(sel.pclk_divisor(), 8);
        assert_eq!(sel.to_reg_value(), 0xF3F4_0000);
    }

    #[test]
    fn test_strap_clkin_priority() {
        let both = HwStrap1::from_reg_value(HwStrap1::CLK_25M_IN | HwStrap1::CLK_48M_IN);
        assert_eq!(both.clkin(), clkin::CLKIN_25M);

        let only_48 = HwStrap1::from_reg_value(HwStrap1::CLK_48M_IN);
        assert_eq!(only_48.clkin(), clkin::CLKIN_48M);

        assert_eq!(HwStrap1::default().clkin(), clkin::CLKIN_24M);
    }

    #[test]
    fn test_strap_preserves_unrelated_bits() {
        let value = 0xF100_C2E6;
        assert_eq!(HwStrap1::from_reg_value(value).to_reg_value(), value);
    }
}
