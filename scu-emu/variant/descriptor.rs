// Per-generation descriptor tables

use once_cell::sync::Lazy;

use scu_raw::arch::{ast2400, ast2500, ast2600};
use scu_raw::{revision, to_reg, AccessWidth};

use super::policy::{PolicyTable, PolicyTableBuilder, ReadPolicy, WritePolicy};
use super::Variant;
use crate::config::{DeviceConfig, LockEnforcement};
use crate::engine::clock::{self, HpllDecoder};
use crate::engine::lock::LockGate;

/// Writes the construction-time configuration over a freshly reset image
pub type ResetFixup = fn(cells: &mut [u32], config: &DeviceConfig);

/// Everything that differs between SCU generations
///
/// One static instance per generation, built on first use and shared by all
/// devices of that generation.
#[derive(Debug)]
pub struct VariantDescriptor {
    pub variant: Variant,
    pub nr_regs: usize,
    pub resets: &'static [u32],
    pub access: AccessWidth,
    pub calc_hpll: HpllDecoder,
    /// Index of the H-PLL parameter word used by the frequency query
    pub hpll_param: usize,
    /// Index of the clock-select word used by the frequency query
    pub clk_sel: usize,
    pub apb_divider: u32,
    pub lock: LockGate,
    pub policies: PolicyTable,
    pub apply_config: ResetFixup,
}

fn legacy_policies(nr_regs: usize) -> PolicyTableBuilder {
    use ast2400::regs;

    PolicyTable::builder(nr_regs)
        .write(regs::PROT_KEY, WritePolicy::ProtectionKey)
        .read_only(&[
            regs::SILICON_REV,
            regs::FREQ_CNTR_EVAL,
            regs::RNG_DATA,
            regs::FREE_CNTR4,
            regs::FREE_CNTR4_EXT,
        ])
        .read_only(&regs::VGA_SCRATCH)
        .read(regs::RNG_DATA, ReadPolicy::Random)
        .read(regs::WAKEUP_EN, ReadPolicy::WriteOnly)
}

fn legacy_lock(enforcement: LockEnforcement) -> LockGate {
    use ast2400::regs;

    LockGate {
        key: to_reg(regs::PROT_KEY),
        guarded: to_reg(regs::PROT_KEY) + 1..to_reg(regs::CPU2_BASE_SEG1),
        enforcement,
    }
}

fn legacy_fixup(cells: &mut [u32], config: &DeviceConfig) {
    use ast2400::regs;

    cells[to_reg(regs::SILICON_REV)] = config.silicon_rev;
    cells[to_reg(regs::HW_STRAP1)] = config.hw_strap1;
    cells[to_reg(regs::HW_STRAP2)] = config.hw_strap2;
    cells[to_reg(regs::PROT_KEY)] = config.hw_prot_key;
}

fn ast2600_fixup(cells: &mut [u32], config: &DeviceConfig) {
    use ast2600::regs;

    // SILICON_REV always reads as A1; the configured revision goes to REV2
    cells[to_reg(regs::SILICON_REV)] = revision::AST2600_A1;
    cells[to_reg(regs::SILICON_REV2)] = config.silicon_rev;
    cells[to_reg(regs::HW_STRAP1)] = config.hw_strap1;
    cells[to_reg(regs::HW_STRAP2)] = config.hw_strap2;
    cells[to_reg(regs::PROT_KEY)] = config.hw_prot_key;
}

pub(super) static AST2400: Lazy<VariantDescriptor> = Lazy::new(|| VariantDescriptor {
    variant: Variant::Ast2400,
    nr_regs: ast2400::NR_REGS,
    resets: &ast2400::RESETS,
    access: AccessWidth::ANY,
    calc_hpll: clock::ast2400_hpll,
    hpll_param: to_reg(ast2400::regs::HPLL_PARAM),
    clk_sel: to_reg(ast2400::regs::CLK_SEL),
    apb_divider: ast2400::APB_DIVIDER,
    lock: legacy_lock(LockEnforcement::Advisory),
    policies: legacy_policies(ast2400::NR_REGS).build(),
    apply_config: legacy_fixup,
});

pub(super) static AST2500: Lazy<VariantDescriptor> = Lazy::new(|| {
    use ast2500::regs;

    VariantDescriptor {
        variant: Variant::Ast2500,
        nr_regs: ast2500::NR_REGS,
        resets: &ast2500::RESETS,
        access: AccessWidth::WORD,
        calc_hpll: clock::ast2500_hpll,
        hpll_param: to_reg(regs::HPLL_PARAM),
        clk_sel: to_reg(regs::CLK_SEL),
        apb_divider: ast2500::APB_DIVIDER,
        // Reported, never blocked. Whether the silicon drops these writes is
        // unresolved for this generation.
        lock: legacy_lock(LockEnforcement::Advisory),
        policies: legacy_policies(ast2500::NR_REGS)
            .write(regs::HW_STRAP1, WritePolicy::SetBits)
            // The SILICON_REV address doubles as the strap clear register
            .clear_pairs(&[(regs::SILICON_REV, regs::HW_STRAP1)])
            .read_only(&[regs::CHIP_ID0, regs::CHIP_ID1])
            .build(),
        apply_config: legacy_fixup,
    }
});

pub(super) static AST2600: Lazy<VariantDescriptor> = Lazy::new(|| {
    use ast2600::regs;

    VariantDescriptor {
        variant: Variant::Ast2600,
        nr_regs: ast2600::NR_REGS,
        resets: &ast2600::RESETS,
        access: AccessWidth::WORD,
        calc_hpll: clock::ast2500_hpll,
        // The frequency query reads the legacy SCU24/SCU08 slots on this
        // generation too, not HPLL_PARAM/CLK_SEL at 0x200/0x300.
        hpll_param: to_reg(ast2400::regs::HPLL_PARAM),
        clk_sel: to_reg(ast2400::regs::CLK_SEL),
        apb_divider: ast2600::APB_DIVIDER,
        lock: LockGate {
            key: to_reg(regs::PROT_KEY),
            guarded: to_reg(regs::PROT_KEY) + 1..ast2600::NR_REGS,
            enforcement: LockEnforcement::Advisory,
        },
        policies: PolicyTable::builder(ast2600::NR_REGS)
            .write(regs::PROT_KEY, WritePolicy::ProtectionKey)
            .set_bits(&[
                regs::SYS_RST_CTRL,
                regs::SYS_RST_CTRL2,
                regs::CLK_STOP_CTRL,
                regs::CLK_STOP_CTRL2,
            ])
            .protected_straps(&ast2600::STRAP_PROTECT)
            .clear_pairs(&ast2600::CLEAR_PAIRS)
            .read_only(&[
                regs::RNG_DATA,
                regs::SILICON_REV,
                regs::SILICON_REV2,
                regs::CHIP_ID0,
                regs::CHIP_ID1,
            ])
            .read(regs::RNG_DATA, ReadPolicy::Random)
            .read(regs::HPLL_EXT, ReadPolicy::PllLocked)
            .read(regs::MPLL_EXT, ReadPolicy::PllLocked)
            .read(regs::EPLL_EXT, ReadPolicy::PllLocked)
            .build(),
        apply_config: ast2600_fixup,
    }
});
