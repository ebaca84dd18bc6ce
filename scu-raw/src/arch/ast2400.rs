//! AST2400 SCU register definitions
//!
//! The AST2400 SCU exposes 106 32-bit registers at 0x1E6E2000. The AST2500
//! reuses this register map (see [`super::ast2500`]).
//!
//! ## References
//!
//! - ASPEED AST2400 datasheet, section 6 (SCU)

use crate::register::{to_reg, RegisterLayout};

/// Number of registers in the AST2400/AST2500 register file (0x1A8 >> 2)
pub const NR_REGS: usize = 0x1A8 >> 2;

/// APB clock divider applied after the PCLK divider
pub const APB_DIVIDER: u32 = 2;

/// Byte offsets of the legacy (AST2400/AST2500) SCU registers
pub mod regs {
    pub const PROT_KEY: u32 = 0x00;
    pub const SYS_RST_CTRL: u32 = 0x04;
    pub const CLK_SEL: u32 = 0x08;
    pub const CLK_STOP_CTRL: u32 = 0x0C;
    pub const FREQ_CNTR_CTRL: u32 = 0x10;
    pub const FREQ_CNTR_EVAL: u32 = 0x14;
    pub const IRQ_CTRL: u32 = 0x18;
    pub const D2PLL_PARAM: u32 = 0x1C;
    pub const MPLL_PARAM: u32 = 0x20;
    pub const HPLL_PARAM: u32 = 0x24;
    pub const FREQ_CNTR_RANGE: u32 = 0x28;
    pub const MISC_CTRL1: u32 = 0x2C;
    pub const PCI_CTRL1: u32 = 0x30;
    pub const PCI_CTRL2: u32 = 0x34;
    pub const PCI_CTRL3: u32 = 0x38;
    pub const SYS_RST_STATUS: u32 = 0x3C;
    pub const SOC_SCRATCH1: u32 = 0x40;
    pub const SOC_SCRATCH2: u32 = 0x44;
    pub const MAC_CLK_DELAY: u32 = 0x48;
    pub const MISC_CTRL2: u32 = 0x4C;
    pub const VGA_SCRATCH1: u32 = 0x50;
    pub const VGA_SCRATCH2: u32 = 0x54;
    pub const VGA_SCRATCH3: u32 = 0x58;
    pub const VGA_SCRATCH4: u32 = 0x5C;
    pub const VGA_SCRATCH5: u32 = 0x60;
    pub const VGA_SCRATCH6: u32 = 0x64;
    pub const VGA_SCRATCH7: u32 = 0x68;
    pub const VGA_SCRATCH8: u32 = 0x6C;
    pub const HW_STRAP1: u32 = 0x70;
    pub const RNG_CTRL: u32 = 0x74;
    pub const RNG_DATA: u32 = 0x78;
    pub const SILICON_REV: u32 = 0x7C;
    pub const PINMUX_CTRL1: u32 = 0x80;
    pub const PINMUX_CTRL2: u32 = 0x84;
    pub const PINMUX_CTRL3: u32 = 0x88;
    pub const PINMUX_CTRL4: u32 = 0x8C;
    pub const PINMUX_CTRL5: u32 = 0x90;
    pub const PINMUX_CTRL6: u32 = 0x94;
    pub const WDT_RST_CTRL: u32 = 0x9C;
    pub const PINMUX_CTRL7: u32 = 0xA0;
    pub const PINMUX_CTRL8: u32 = 0xA4;
    pub const PINMUX_CTRL9: u32 = 0xA8;
    pub const WAKEUP_EN: u32 = 0xC0;
    pub const WAKEUP_CTRL: u32 = 0xC4;
    pub const HW_STRAP2: u32 = 0xD0;
    pub const FREE_CNTR4: u32 = 0xE0;
    pub const FREE_CNTR4_EXT: u32 = 0xE4;
    pub const CPU2_CTRL: u32 = 0x100;
    pub const CPU2_BASE_SEG1: u32 = 0x104;
    pub const CPU2_BASE_SEG2: u32 = 0x108;
    pub const CPU2_BASE_SEG3: u32 = 0x10C;
    pub const CPU2_BASE_SEG4: u32 = 0x110;
    pub const CPU2_BASE_SEG5: u32 = 0x114;
    pub const CPU2_CACHE_CTRL: u32 = 0x118;
    pub const CHIP_ID0: u32 = 0x150;
    pub const CHIP_ID1: u32 = 0x154;
    pub const UART_HPLL_CLK: u32 = 0x160;
    pub const PCIE_CTRL: u32 = 0x180;
    pub const BMC_MMIO_CTRL: u32 = 0x184;
    pub const RELOC_DECODE_BASE1: u32 = 0x188;
    pub const RELOC_DECODE_BASE2: u32 = 0x18C;
    pub const MAILBOX_DECODE_BASE: u32 = 0x190;
    pub const SRAM_DECODE_BASE1: u32 = 0x194;
    pub const SRAM_DECODE_BASE2: u32 = 0x198;
    pub const BMC_REV: u32 = 0x19C;
    pub const BMC_DEV_ID: u32 = 0x1A4;

    /// VGA scratch registers, read-only from the BMC side
    pub const VGA_SCRATCH: [u32; 8] = [
        VGA_SCRATCH1,
        VGA_SCRATCH2,
        VGA_SCRATCH3,
        VGA_SCRATCH4,
        VGA_SCRATCH5,
        VGA_SCRATCH6,
        VGA_SCRATCH7,
        VGA_SCRATCH8,
    ];
}

/// Strapped H-PLL frequencies in MHz, indexed by `[clk_25m_in][freq_select]`
///
/// Row 0 applies to both the 24MHz and 48MHz reference clocks.
pub const HPLL_STRAP_FREQS_MHZ: [[u32; 4]; 2] = [
    [384, 360, 336, 408], // 24MHz or 48MHz
    [400, 375, 350, 425], // 25MHz
];

/// Reset image of AST2400 A0
pub const RESETS: [u32; NR_REGS] = {
    let mut r = [0u32; NR_REGS];
    r[to_reg(regs::SYS_RST_CTRL)] = 0xFFCF_FEDC;
    r[to_reg(regs::CLK_SEL)] = 0xF3F4_0000;
    r[to_reg(regs::CLK_STOP_CTRL)] = 0x19FC_3E8B;
    r[to_reg(regs::D2PLL_PARAM)] = 0x0002_6108;
    r[to_reg(regs::MPLL_PARAM)] = 0x0003_0291;
    r[to_reg(regs::HPLL_PARAM)] = 0x0000_0291;
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
    r[to_reg(regs::PINMUX_CTRL3)] = 0x0100_0000;
    r[to_reg(regs::PINMUX_CTRL4)] = 0x0000_00FF;
    r[to_reg(regs::PINMUX_CTRL5)] = 0x0000_A000;
    r[to_reg(regs::WDT_RST_CTRL)] = 0x003F_FFF3;
    r[to_reg(regs::PINMUX_CTRL8)] = 0xFFFF_0000;
    r[to_reg(regs::PINMUX_CTRL9)] = 0x000F_FFFF;
    r[to_reg(regs::FREE_CNTR4)] = 0x0000_00FF;
    r[to_reg(regs::FREE_CNTR4_EXT)] = 0x0000_00FF;
    r[to_reg(regs::CPU2_BASE_SEG1)] = 0x8000_0000;
    r[to_reg(regs::CPU2_BASE_SEG4)] = 0x1E60_0000;
    r[to_reg(regs::CPU2_BASE_SEG5)] = 0xC000_0000;
    r[to_reg(regs::UART_HPLL_CLK)] = 0x0000_1903;
    r[to_reg(regs::PCIE_CTRL)] = 0x0000_007B;
    r[to_reg(regs::BMC_DEV_ID)] = 0x0000_2402;
    r
};

/// SCU24 H-PLL Parameter Register layout (AST2400)
///
/// ## Register Format
///
/// | Bits   | Field        | Description                                   |
/// |--------|--------------|-----------------------------------------------|
/// | 18     | programmed   | 1: use SCU24[17:0], 0: use strap frequency    |
/// | 17     | bypass       | H-PLL bypass mode                             |
/// | 16     | off          | Turn off H-PLL                                |
/// | 10-5   | numerator    | N                                             |
/// | 4      | output_div   | OD                                            |
/// | 3-0    | denominator  | D                                             |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ast2400HpllParam {
    pub programmed: bool,
    pub bypass: bool,
    pub off: bool,
    /// Numerator N (6 bits)
    pub numerator: u8,
    /// Output divider OD (1 bit)
    pub output_div: u8,
    /// Denominator D (4 bits)
    pub denominator: u8,
}

impl Ast2400HpllParam {
    pub const PROGRAMMED: u32 = 1 << 18;
    pub const BYPASS_EN: u32 = 1 << 17;
    pub const OFF: u32 = 1 << 16;

    /// Integer multiplier applied to the reference clock
    ///
    /// Only meaningful when `programmed` is set. Division truncates, as on
    /// hardware.
    pub fn multiplier(&self) -> u32 {
        if self.bypass {
            return 1;
        }
        let n = self.numerator as u32;
        let od = self.output_div as u32;
        let d = self.denominator as u32;
        (2 - od) * ((n + 2) / (d + 1))
    }
}

impl RegisterLayout for Ast2400HpllParam {
    fn to_reg_value(&self) -> u32 {
        (if self.programmed { Self::PROGRAMMED } else { 0 })
            | (if self.bypass { Self::BYPASS_EN } else { 0 })
            | (if self.off { Self::OFF } else { 0 })
            | ((self.numerator as u32 & 0x3F) << 5)
            | ((self.output_div as u32 & 0x1) << 4)
            | (self.denominator as u32 & 0xF)
    }

    fn from_reg_value(value: u32) -> Self {
        Self {
            programmed: (value & Self::PROGRAMMED) != 0,
            bypass: (value & Self::BYPASS_EN) != 0,
            off: (value & Self::OFF) != 0,
            numerator: ((value >> 5) & 0x3F) as u8,
            output_div: ((value >> 4) & 0x1) as u8,
            denominator: (value & 0xF) as u8,
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.numerator > 0x3F {
            return Err("Numerator must be <= 63 (6 bits)");
        }
        if self.output_div > 1 {
            return Err("Output divider must be 0 or 1 (1 bit)");
        }
        if self.denominator > 0xF {
            return Err("Denominator must be <= 15 (4 bits)");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_count() {
        assert_eq!(NR_REGS, 106);
        assert_eq!(to_reg(regs::BMC_DEV_ID), NR_REGS - 1);
    }

    #[test]
    fn test_reset_image_spot_values() {
        assert_eq!(RESETS[to_reg(regs::HPLL_PARAM)], 0x0000_0291);
        assert_eq!(RESETS[to_reg(regs::SOC_SCRATCH1)], 0x0000_00C0);
        assert_eq!(RESETS[to_reg(regs::PROT_KEY)], 0);
        assert_eq!(RESETS[to_reg(regs::CHIP_ID0)], 0);
    }

    #[test]
    fn test_hpll_reset_value_is_strapped() {
        let param = Ast2400HpllParam::from_reg_value(RESETS[to_reg(regs::HPLL_PARAM)]);
        assert!(!param.programmed);
        assert!(!param.off);
        assert_eq!(param.numerator, 0x14);
        assert_eq!(param.output_div, 1);
        assert_eq!(param.denominator, 1);
    }

    #[test]
    fn test_hpll_multiplier() {
        // N = 0x14, OD = 1, D = 1: (2 - 1) * (22 / 2) = 11
        let param = Ast2400HpllParam::from_reg_value(Ast2400HpllParam::PROGRAMMED | 0x291);
        assert_eq!(param.multiplier(), 11);

        let bypass = Ast2400HpllParam {
            bypass: true,
            ..param
        };
        assert_eq!(bypass.multiplier(), 1);
    }

    #[test]
    fn test_hpll_multiplier_truncates() {
        // N = 1, OD = 0, D = 1: 2 * (3 / 2) = 2
        let param = Ast2400HpllParam {
            programmed: true,
            numerator: 1,
            output_div: 0,
            denominator: 1,
            ..Default::default()
        };
        assert_eq!(param.multiplier(), 2);
    }
}
