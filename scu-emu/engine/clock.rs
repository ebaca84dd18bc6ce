//! Clock derivation
//!
//! Pure functions from register and strap words to frequencies in Hz. All
//! arithmetic is unsigned 32-bit and truncating, matching what firmware
//! computes from the same registers.

use scu_raw::arch::ast2400::{Ast2400HpllParam, HPLL_STRAP_FREQS_MHZ};
use scu_raw::arch::ast2500::Ast2500HpllParam;
use scu_raw::arch::common::{ClockSelect, HwStrap1};
use scu_raw::{Register, RegisterLayout};

use crate::variant::VariantDescriptor;

/// Decodes an H-PLL parameter word given the configured strap word
pub type HpllDecoder = fn(hpll_reg: u32, hw_strap1: u32) -> u32;

/// Reference clock selected by the strap word
pub fn clkin(hw_strap1: u32) -> u32 {
    HwStrap1::from_reg_value(hw_strap1).clkin()
}

/// AST2400 H-PLL output
///
/// Unless the parameter register is marked programmed, the frequency comes
/// from the strap-selected table rather than from N/OD/D.
pub fn ast2400_hpll(hpll_reg: u32, hw_strap1: u32) -> u32 {
    let param = Ast2400HpllParam::from_reg_value(hpll_reg);
    let strap = HwStrap1::from_reg_value(hw_strap1);

    if param.off {
        return 0;
    }

    if param.programmed {
        return strap.clkin().wrapping_mul(param.multiplier());
    }

    let row = usize::from(strap.clk_25m_in);
    let col = usize::from(strap.hpll_freq_select);
    HPLL_STRAP_FREQS_MHZ[row][col] * 1_000_000
}

/// AST2500/AST2600 H-PLL output
pub fn ast2500_hpll(hpll_reg: u32, hw_strap1: u32) -> u32 {
    let param = Ast2500HpllParam::from_reg_value(hpll_reg);

    if param.off {
        return 0;
    }

    clkin(hw_strap1).wrapping_mul(param.multiplier())
}

/// H-PLL output for the current register file
pub fn hpll_frequency(desc: &VariantDescriptor, regs: &[u32], hw_strap1: u32) -> u32 {
    (desc.calc_hpll)(regs[desc.hpll_param], hw_strap1)
}

/// APB (peripheral bus) frequency for the current register file
///
/// `hpll / (pclk_divider + 1) / apb_divider`
pub fn apb_frequency(desc: &VariantDescriptor, regs: &[u32], hw_strap1: u32) -> u32 {
    let hpll = hpll_frequency(desc, regs, hw_strap1);
    let clk_sel: Register<ClockSelect> =
        Register::decode(desc.clk_sel as u32 * 4, regs[desc.clk_sel]);

    tracing::debug!(
        "{}: hpll {} Hz, pclk divider {}, apb divider {}",
        desc.variant.name(),
        hpll,
        clk_sel.layout.pclk_divisor(),
        desc.apb_divider
    );

    hpll / clk_sel.layout.pclk_divisor() / desc.apb_divider
}

#[cfg(test)]
mod tests {
    use super::*;
    use scu_raw::arch::common::clkin::{CLKIN_24M, CLKIN_25M, CLKIN_48M};

    #[test]
    fn test_clkin_selection() {
        assert_eq!(clkin(0), CLKIN_24M);
        assert_eq!(clkin(HwStrap1::CLK_48M_IN), CLKIN_48M);
        assert_eq!(clkin(HwStrap1::CLK_25M_IN), CLKIN_25M);
        assert_eq!(clkin(HwStrap1::CLK_25M_IN | HwStrap1::CLK_48M_IN), CLKIN_25M);
    }

    #[test]
    fn test_ast2400_strap_table() {
        let expected = [
            (false, [384, 360, 336, 408]),
            (true, [400, 375, 350, 425]),
        ];
        for (clk25, freqs) in expected {
            for (select, mhz) in freqs.into_iter().enumerate() {
                let strap = (if clk25 { HwStrap1::CLK_25M_IN } else { 0 }) | ((select as u32) << 8);
                assert_eq!(
                    ast2400_hpll(0, strap),
                    mhz * 1_000_000,
                    "clk25 {clk25} select {select}"
                );
            }
        }
    }

    #[test]
    fn test_ast2400_48m_uses_24m_row() {
        assert_eq!(ast2400_hpll(0, HwStrap1::CLK_48M_IN | (3 << 8)), 408_000_000);
    }

    #[test]
    fn test_ast2400_programmed() {
        // N = 0x14, OD = 1, D = 1: (2 - 1) * (22 / 2) = 11
        let reg = Ast2400HpllParam::PROGRAMMED | 0x291;
        assert_eq!(ast2400_hpll(reg, 0), 24_000_000 * 11);
        assert_eq!(ast2400_hpll(reg, HwStrap1::CLK_25M_IN), 25_000_000 * 11);
    }

    #[test]
    fn test_ast2400_bypass() {
        let reg = Ast2400HpllParam::PROGRAMMED | Ast2400HpllParam::BYPASS_EN | 0x291;
        assert_eq!(ast2400_hpll(reg, HwStrap1::CLK_48M_IN), CLKIN_48M);
    }

    #[test]
    fn test_ast2400_off() {
        assert_eq!(ast2400_hpll(Ast2400HpllParam::OFF, 0), 0);
        let reg = Ast2400HpllParam::OFF | Ast2400HpllParam::PROGRAMMED | 0x291;
        assert_eq!(ast2400_hpll(reg, 0), 0);
    }

    #[test]
    fn test_ast2500_reset_value() {
        // M = 0x20, N = 0, P = 0
        assert_eq!(ast2500_hpll(0x9300_0400, 0), 792_000_000);
    }

    #[test]
    fn test_ast2500_bypass_and_off() {
        assert_eq!(ast2500_hpll(Ast2500HpllParam::BYPASS_EN | 0x400, 0), CLKIN_24M);
        assert_eq!(ast2500_hpll(Ast2500HpllParam::OFF | 0x400, 0), 0);
        assert_eq!(
            ast2500_hpll(Ast2500HpllParam::OFF | Ast2500HpllParam::BYPASS_EN, 0),
            0
        );
    }

    #[test]
    fn test_ast2500_truncating_divisions() {
        // M = 9, N = 2, P = 1: (10 / 3) / 2 = 1
        let reg = (1 << 13) | (9 << 5) | 2;
        assert_eq!(ast2500_hpll(reg, 0), CLKIN_24M);
        // Zero register: (1 / 1) / 1 = 1
        assert_eq!(ast2500_hpll(0, 0), CLKIN_24M);
    }

    #[test]
    fn test_ast2500_large_multiplier_wraps() {
        // M = 255, N = 0, P = 0 at 48MHz overflows 32 bits
        let reg = 0xFF << 5;
        assert_eq!(
            ast2500_hpll(reg, HwStrap1::CLK_48M_IN),
            48_000_000u32.wrapping_mul(256)
        );
    }
}
