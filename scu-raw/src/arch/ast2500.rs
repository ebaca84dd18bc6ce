//! AST2500 SCU register definitions
//!
//! The AST2500 keeps the AST2400 register map but changes the H-PLL parameter
//! layout, the APB divider, and turns HW_STRAP1/SILICON_REV into a
//! write-1-to-set / write-1-to-clear pair.
//!
//! ## References
//!
//! - ASPEED AST2500 datasheet, section 6 (SCU)

use crate::register::{to_reg, RegisterLayout};

pub use super::ast2400::{regs, NR_REGS};

/// APB clock divider applied after the PCLK divider
pub const APB_DIVIDER: u32 = 4;

/// Reset image of AST2500 A1
pub const RESETS: [u32; NR_REGS] = {
    let mut r = [0u32; NR_REGS];
    r[to_reg(regs::SYS_RST_CTRL)] = 0xFFCF_FEDC;
    r[to_reg(regs::CLK_SEL)] = 0xF3F4_0000;
    r[to_reg(regs::CLK_STOP_CTRL)] = 0x19FC_3E8B;
    r[to_reg(regs::D2PLL_PARAM)] = 0x0002_6108;
    r[to_reg(regs::MPLL_PARAM)] = 0x0003_0291;
    r[to_reg(regs::HPLL_PARAM)] = 0x9300_0400;
    r[to_reg(regs::MISC_CTRL1)] = 0x0000_0010;
    r[to_reg(regs::PCI_CTRL1)] = 0x2000_1A03;
    r[to_reg(regs::PCI_CTRL2)] = 0x2000_1A03;
    r[to_reg(regs::PCI_CTRL3)] = 0x0400_0030;
    r[to_reg(regs::SYS_RST_STATUS)] = 0x0000_0001;
    // SoC completed DRAM init
    r[to_reg(regs::SOC_SCRATCH1)] = 0x0000_00C0;
    r[to_reg(regs::MISC_CTRL2)] = 0x0000_0023;
    r[to_reg(regs::RNG_CTRL)] = 0x0000_000E;
    r[to_reg(regs::PINMUX_CTRL2)] = 0x0000_F000;
    r[to_reg(regs::PINMUX_CTRL3)] = 0x0300_0000;
    r[to_reg(regs::PINMUX_CTRL4)] = 0x0000_0000;
    r[to_reg(regs::PINMUX_CTRL5)] = 0x0000_A000;
    r[to_reg(regs::WDT_RST_CTRL)] = 0x023F_FFF3;
    r[to_reg(regs::PINMUX_CTRL8)] = 0xFFFF_0000;
    r[to_reg(regs::PINMUX_CTRL9)] = 0x000F_FFFF;
    r[to_reg(regs::FREE_CNTR4)] = 0x0000_00FF;
    r[to_reg(regs::FREE_CNTR4_EXT)] = 0x0000_00FF;
    r[to_reg(regs::CPU2_BASE_SEG1)] = 0x8000_0000;
    r[to_reg(regs::CPU2_BASE_SEG4)] = 0x1E60_0000;
    r[to_reg(regs::CPU2_BASE_SEG5)] = 0xC000_0000;
    r[to_reg(regs::CHIP_ID0)] = 0x1234_ABCD;
    r[to_reg(regs::CHIP_ID1)] = 0x8888_4444;
    r[to_reg(regs::UART_HPLL_CLK)] = 0x0000_1903;
    r[to_reg(regs::PCIE_CTRL)] = 0x0000_007B;
    r[to_reg(regs::BMC_DEV_ID)] = 0x0000_2402;
    r
};

/// SCU24 H-PLL Parameter Register layout (AST2500, also used for AST2600)
///
/// ## Register Format
///
/// | Bits   | Field       | Description          |
/// |--------|-------------|----------------------|
/// | 20     | bypass      | H-PLL bypass mode    |
/// | 19     | off         | Turn off H-PLL       |
/// | 18-13  | post_div    | Post divider P       |
/// | 12-5   | numerator   | Numerator M          |
/// | 4-0    | denominator | Denominator N        |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ast2500HpllParam {
    pub bypass: bool,
    pub off: bool,
    /// Post divider P (6 bits)
    pub post_div: u8,
    /// Numerator M (8 bits)
    pub numerator: u8,
    /// Denominator N (5 bits)
    pub denominator: u8,
}

impl Ast2500HpllParam {
    pub const BYPASS_EN: u32 = 1 << 20;
    pub const OFF: u32 = 1 << 19;

    /// Integer multiplier applied to the reference clock
    ///
    /// Both divisions truncate, so small M with large N or P yields 0.
    pub fn multiplier(&self) -> u32 {
        if self.bypass {
            return 1;
        }
        let p = self.post_div as u32;
        let m = self.numerator as u32;
        let n = self.denominator as u32;
        ((m + 1) / (n + 1)) / (p + 1)
    }
}

impl RegisterLayout for Ast2500HpllParam {
    fn to_reg_value(&self) -> u32 {
        (if self.bypass { Self::BYPASS_EN } else { 0 })
            | (if self.off { Self::OFF } else { 0 })
            | ((self.post_div as u32 & 0x3F) << 13)
            | ((self.numerator as u32 & 0xFF) << 5)
            | (self.denominator as u32 & 0x1F)
    }

    fn from_reg_value(value: u32) -> Self {
        Self {
            bypass: (value & Self::BYPASS_EN) != 0,
            off: (value & Self::OFF) != 0,
            post_div: ((value >> 13) & 0x3F) as u8,
            numerator: ((value >> 5) & 0xFF) as u8,
            denominator: (value & 0x1F) as u8,
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.post_div > 0x3F {
            return Err("Post divider must be <= 63 (6 bits)");
        }
        if self.denominator > 0x1F {
            return Err("Denominator must be <= 31 (5 bits)");
        }
        Ok(())
    }
}
