//! AST2600 SCU register definitions
//!
//! The AST2600 SCU grows to 904 registers and moves most control words to
//! new offsets. Reset, clock-stop and strap registers come in pairs: the data
//! register is write-1-to-set and the register one word above it is
//! write-1-to-clear. Strap registers additionally have a protect register two
//! words above the data register.
//!
//! ## References
//!
//! - ASPEED AST2600 datasheet, section 7 (SCU)
//! - Linux `drivers/clk/clk-ast2600.c`

use crate::register::to_reg;

/// Number of registers in the AST2600 register file (0xE20 >> 2)
pub const NR_REGS: usize = 0xE20 >> 2;

/// APB clock divider applied after the PCLK divider
pub const APB_DIVIDER: u32 = 4;

/// Lock indicator OR-ed into every PLL extension register on read
pub const PLL_LOCKED: u32 = 1 << 31;

/// Byte offsets of the AST2600 SCU registers
pub mod regs {
    pub const PROT_KEY: u32 = 0x00;
    pub const SILICON_REV: u32 = 0x04;
    pub const SILICON_REV2: u32 = 0x14;
    pub const SYS_RST_CTRL: u32 = 0x40;
    pub const SYS_RST_CTRL_CLR: u32 = 0x44;
    pub const SYS_RST_CTRL2: u32 = 0x50;
    pub const SYS_RST_CTRL2_CLR: u32 = 0x54;
    pub const CLK_STOP_CTRL: u32 = 0x80;
    pub const CLK_STOP_CTRL_CLR: u32 = 0x84;
    pub const CLK_STOP_CTRL2: u32 = 0x90;
    pub const CLK_STOP_CTRL2_CLR: u32 = 0x94;
    pub const SDRAM_HANDSHAKE: u32 = 0x100;
    pub const HPLL_PARAM: u32 = 0x200;
    pub const HPLL_EXT: u32 = 0x204;
    pub const MPLL_EXT: u32 = 0x224;
    pub const EPLL_EXT: u32 = 0x244;
    pub const CLK_SEL: u32 = 0x300;
    pub const CLK_SEL2: u32 = 0x304;
    pub const CLK_SEL3: u32 = 0x310;
    pub const HW_STRAP1: u32 = 0x500;
    pub const HW_STRAP1_CLR: u32 = 0x504;
    pub const HW_STRAP1_PROT: u32 = 0x508;
    pub const HW_STRAP2: u32 = 0x510;
    pub const HW_STRAP2_CLR: u32 = 0x514;
    pub const HW_STRAP2_PROT: u32 = 0x518;
    pub const RNG_CTRL: u32 = 0x524;
    pub const RNG_DATA: u32 = 0x540;
    pub const CHIP_ID0: u32 = 0x5B0;
    pub const CHIP_ID1: u32 = 0x5B4;
}

/// Write-1-to-clear register → the register whose bits it clears
pub const CLEAR_PAIRS: [(u32, u32); 6] = [
    (regs::SYS_RST_CTRL_CLR, regs::SYS_RST_CTRL),
    (regs::SYS_RST_CTRL2_CLR, regs::SYS_RST_CTRL2),
    (regs::CLK_STOP_CTRL_CLR, regs::CLK_STOP_CTRL),
    (regs::CLK_STOP_CTRL2_CLR, regs::CLK_STOP_CTRL2),
    (regs::HW_STRAP1_CLR, regs::HW_STRAP1),
    (regs::HW_STRAP2_CLR, regs::HW_STRAP2),
];

/// Strap register → protect register that freezes it once non-zero
pub const STRAP_PROTECT: [(u32, u32); 2] = [
    (regs::HW_STRAP1, regs::HW_STRAP1_PROT),
    (regs::HW_STRAP2, regs::HW_STRAP2_PROT),
];

/// PLL extension registers that always report lock
pub const PLL_EXT: [u32; 3] = [regs::HPLL_EXT, regs::MPLL_EXT, regs::EPLL_EXT];

/// Reset image of AST2600 A1
pub const RESETS: [u32; NR_REGS] = {
    let mut r = [0u32; NR_REGS];
    r[to_reg(regs::SYS_RST_CTRL)] = 0xF7C3_FED8;
    r[to_reg(regs::SYS_RST_CTRL2)] = 0xFFFF_FFFC;
    r[to_reg(regs::CLK_STOP_CTRL)] = 0xFFFF_7F8A;
    r[to_reg(regs::CLK_STOP_CTRL2)] = 0xFFF0_FFF0;
    r[to_reg(regs::SDRAM_HANDSHAKE)] = 0x0000_0000;
    r[to_reg(regs::HPLL_PARAM)] = 0x1000_405F;
    r[to_reg(regs::CHIP_ID0)] = 0x1234_ABCD;
    r[to_reg(regs::CHIP_ID1)] = 0x8888_4444;
    r
};
