//! Register bank and access-policy engine
//!
//! The bank owns the register file of one device. Reads and writes resolve
//! `offset >> 2` to a register index and apply the generation's policy for
//! that index. Width and alignment are checked before an access gets here;
//! the bank only narrows values to the access width.

use rand::RngCore;
use tracing::{debug, info, trace, warn};

use scu_raw::{AccessWidth, SCU_PROT_KEY};

use super::clock;
use super::lock::LockState;
use crate::config::{DeviceConfig, LockEnforcement, ScuOptions};
use crate::metrics::{AccessEvent, AccessObserver};
use crate::variant::{ReadPolicy, VariantDescriptor, WritePolicy};

/// `tracing` target for guest programming errors
pub const GUEST_ERROR: &str = "scu::guest_error";

/// `tracing` target for the per-write trace point
pub const WRITE_TRACE: &str = "scu::write";

#[derive(Debug, Clone)]
pub struct RegisterBank {
    desc: &'static VariantDescriptor,
    config: DeviceConfig,
    lock_override: Option<LockEnforcement>,
    regs: Vec<u32>,
}

impl RegisterBank {
    /// Create a bank already in its reset state
    pub fn new(desc: &'static VariantDescriptor, config: DeviceConfig, options: ScuOptions) -> Self {
        let mut bank = Self {
            desc,
            config,
            lock_override: options.lock_enforcement,
            regs: vec![0; desc.nr_regs],
        };
        bank.reset();
        bank
    }

    pub fn descriptor(&self) -> &'static VariantDescriptor {
        self.desc
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn set_options(&mut self, options: ScuOptions) {
        self.lock_override = options.lock_enforcement;
    }

    pub fn regs(&self) -> &[u32] {
        &self.regs
    }

    /// Replace the whole register file; `regs` must be exactly `nr_regs` long
    pub(crate) fn load(&mut self, regs: &[u32]) {
        self.regs.copy_from_slice(regs);
    }

    /// Reload the generation defaults, then re-apply the configuration
    pub fn reset(&mut self) {
        self.regs.copy_from_slice(self.desc.resets);
        (self.desc.apply_config)(&mut self.regs, &self.config);
        info!(
            "{} SCU reset (silicon rev 0x{:08X})",
            self.desc.variant.name(),
            self.config.silicon_rev
        );
    }

    pub fn is_unlocked(&self) -> bool {
        self.desc.lock.is_unlocked(&self.regs)
    }

    pub fn hpll_frequency(&self) -> u32 {
        clock::hpll_frequency(self.desc, &self.regs, self.config.hw_strap1)
    }

    pub fn apb_frequency(&self) -> u32 {
        clock::apb_frequency(self.desc, &self.regs, self.config.hw_strap1)
    }

    fn index(&self, offset: u64) -> Option<usize> {
        usize::try_from(offset >> 2)
            .ok()
            .filter(|&reg| reg < self.regs.len())
    }

    pub fn read(
        &mut self,
        offset: u64,
        size: u32,
        rng: &mut dyn RngCore,
        observer: &dyn AccessObserver,
    ) -> u32 {
        let Some(reg) = self.index(offset) else {
            warn!(target: GUEST_ERROR, "Out-of-bounds read at offset 0x{:x}", offset);
            observer.on_access(AccessEvent::OutOfBounds, offset, 0);
            return 0;
        };

        let value = match self.desc.policies.read_policy(reg) {
            ReadPolicy::Plain => self.regs[reg],
            // Refilled regardless of the enable bit in RNG_CTRL
            ReadPolicy::Random => {
                self.regs[reg] = rng.next_u32();
                observer.on_access(AccessEvent::RandomRead, offset, self.regs[reg]);
                self.regs[reg]
            }
            ReadPolicy::WriteOnly => {
                warn!(target: GUEST_ERROR, "Read of write-only offset 0x{:x}", offset);
                observer.on_access(AccessEvent::WriteOnlyRead, offset, self.regs[reg]);
                self.regs[reg]
            }
            ReadPolicy::PllLocked => self.regs[reg] | scu_raw::arch::ast2600::PLL_LOCKED,
        };

        let value = value & AccessWidth::mask(size);
        observer.on_access(AccessEvent::Read, offset, value);
        value
    }

    pub fn write(&mut self, offset: u64, size: u32, value: u64, observer: &dyn AccessObserver) {
        let Some(reg) = self.index(offset) else {
            warn!(target: GUEST_ERROR, "Out-of-bounds write at offset 0x{:x}", offset);
            observer.on_access(AccessEvent::OutOfBounds, offset, value as u32);
            return;
        };

        let data = value as u32 & AccessWidth::mask(size);

        if self.desc.lock.check(&self.regs, reg) == LockState::Locked {
            warn!(target: GUEST_ERROR, "SCU is locked!");
            observer.on_access(AccessEvent::LockViolation, offset, data);
            if self.desc.lock.blocks(self.lock_override) {
                return;
            }
        }

        trace!(target: WRITE_TRACE, offset, size, data, "scu write");

        match self.desc.policies.write_policy(reg) {
            WritePolicy::Plain => self.regs[reg] = data,
            WritePolicy::ReadOnly => {
                warn!(
                    target: GUEST_ERROR,
                    "Write to read-only offset 0x{:x}", offset
                );
                observer.on_access(AccessEvent::ReadOnlyWrite, offset, data);
                return;
            }
            WritePolicy::ProtectionKey => {
                self.regs[reg] = u32::from(data == SCU_PROT_KEY);
                debug!(
                    "{} SCU {}",
                    self.desc.variant.name(),
                    if self.regs[reg] != 0 { "unlocked" } else { "locked" }
                );
            }
            WritePolicy::SetBits => self.regs[reg] |= data,
            WritePolicy::ClearBits { target } => self.regs[target] &= !data,
            WritePolicy::ProtectedSetBits { protect } => {
                if self.regs[protect] != 0 {
                    debug!("Strap write at offset 0x{:x} dropped, strap protected", offset);
                    observer.on_access(AccessEvent::ProtectedStrapWrite, offset, data);
                    return;
                }
                self.regs[reg] |= data;
            }
        }

        observer.on_access(AccessEvent::Write, offset, data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use scu_raw::arch::{ast2400, ast2500, ast2600};
    use scu_raw::{revision, to_reg};

    use crate::metrics::NullObserver;
    use crate::variant::Variant;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<AccessEvent>>);

    impl AccessObserver for Recorder {
        fn on_access(&self, event: AccessEvent, _offset: u64, _value: u32) {
            self.0.lock().push(event);
        }
    }

    impl Recorder {
        fn events(&self) -> Vec<AccessEvent> {
            self.0.lock().clone()
        }
    }

    fn config_for(variant: Variant) -> DeviceConfig {
        let rev = match variant {
            Variant::Ast2400 => revision::AST2400_A1,
            Variant::Ast2500 => revision::AST2500_A1,
            Variant::Ast2600 => revision::AST2600_A1,
        };
        DeviceConfig::new(rev)
            .with_hw_strap1(0xF100_C2E6)
            .with_hw_strap2(0x0000_0001)
    }

    fn new_bank(variant: Variant) -> RegisterBank {
        RegisterBank::new(
            variant.descriptor(),
            config_for(variant),
            ScuOptions::default(),
        )
    }

    fn seeded_rng() -> StdRng {
        StdRng::seed_from_u64(0x5C0)
    }

    fn unlock(bank: &mut RegisterBank) {
        bank.write(0, 4, SCU_PROT_KEY as u64, &NullObserver);
        assert!(bank.is_unlocked());
    }

    #[test]
    fn test_reset_applies_config_over_defaults() {
        for variant in Variant::all() {
            let bank = new_bank(variant);
            let desc = variant.descriptor();
            let config = config_for(variant);
            let (config_cells, rev) = match variant {
                Variant::Ast2600 => (
                    vec![
                        to_reg(ast2600::regs::SILICON_REV),
                        to_reg(ast2600::regs::SILICON_REV2),
                        to_reg(ast2600::regs::HW_STRAP1),
                        to_reg(ast2600::regs::HW_STRAP2),
                        0,
                    ],
                    to_reg(ast2600::regs::SILICON_REV2),
                ),
                _ => (
                    vec![
                        to_reg(ast2400::regs::SILICON_REV),
                        to_reg(ast2400::regs::HW_STRAP1),
                        to_reg(ast2400::regs::HW_STRAP2),
                        0,
                    ],
                    to_reg(ast2400::regs::SILICON_REV),
                ),
            };

            assert_eq!(bank.regs()[rev], config.silicon_rev, "{variant}");
            for (reg, (&cell, &default)) in bank.regs().iter().zip(desc.resets).enumerate() {
                if !config_cells.contains(&reg) {
                    assert_eq!(cell, default, "{variant} reg {reg}");
                }
            }
        }
    }

    #[test]
    fn test_reset_discards_guest_writes() {
        let mut bank = new_bank(Variant::Ast2500);
        unlock(&mut bank);
        bank.write(ast2500::regs::MISC_CTRL1 as u64, 4, 0xAAAA_5555, &NullObserver);
        bank.write(ast2500::regs::HW_STRAP1 as u64, 4, 0x0000_0001, &NullObserver);
        bank.reset();
        assert_eq!(bank.regs()[to_reg(ast2500::regs::MISC_CTRL1)], 0x10);
        assert_eq!(bank.regs()[to_reg(ast2500::regs::HW_STRAP1)], 0xF100_C2E6);
        assert!(!bank.is_unlocked());
    }

    #[test]
    fn test_protection_key() {
        for variant in Variant::all() {
            let mut bank = new_bank(variant);
            bank.write(0, 4, SCU_PROT_KEY as u64, &NullObserver);
            assert_eq!(bank.regs()[0], 1, "{variant}");
            bank.write(0, 4, SCU_PROT_KEY as u64, &NullObserver);
            assert_eq!(bank.regs()[0], 1, "{variant}");
            bank.write(0, 4, 0x1234, &NullObserver);
            assert_eq!(bank.regs()[0], 0, "{variant}");
            bank.write(0, 4, 0x1234, &NullObserver);
            assert_eq!(bank.regs()[0], 0, "{variant}");
        }
    }

    #[test]
    fn test_configured_key_seeds_lock_state() {
        let bank = RegisterBank::new(
            Variant::Ast2400.descriptor(),
            DeviceConfig::new(revision::AST2400_A0).with_hw_prot_key(0xFF),
            ScuOptions::default(),
        );
        assert_eq!(bank.regs()[0], 0xFF);
        assert!(bank.is_unlocked());
    }

    #[test]
    fn test_ast2600_set_and_clear_pairs() {
        let mut bank = new_bank(Variant::Ast2600);
        let mut rng = seeded_rng();
        unlock(&mut bank);

        for (clear, target) in ast2600::CLEAR_PAIRS {
            let prev = bank.read(target as u64, 4, &mut rng, &NullObserver);
            bank.write(target as u64, 4, 0x0000_0103, &NullObserver);
            let set = bank.read(target as u64, 4, &mut rng, &NullObserver);
            assert_eq!(set, prev | 0x0000_0103, "target 0x{target:X}");

            bank.write(clear as u64, 4, 0x8000_0001, &NullObserver);
            let cleared = bank.read(target as u64, 4, &mut rng, &NullObserver);
            assert_eq!(cleared, set & !0x8000_0001, "clear 0x{clear:X}");
        }
    }

    #[test]
    fn test_ast2600_clear_register_keeps_own_cell() {
        let mut bank = new_bank(Variant::Ast2600);
        unlock(&mut bank);
        bank.write(ast2600::regs::SYS_RST_CTRL_CLR as u64, 4, 0xFFFF_FFFF, &NullObserver);
        assert_eq!(bank.regs()[to_reg(ast2600::regs::SYS_RST_CTRL)], 0);
        assert_eq!(bank.regs()[to_reg(ast2600::regs::SYS_RST_CTRL_CLR)], 0);
    }

    #[test]
    fn test_random_reads_follow_injected_source() {
        for (variant, offset) in [
            (Variant::Ast2400, ast2400::regs::RNG_DATA),
            (Variant::Ast2500, ast2500::regs::RNG_DATA),
            (Variant::Ast2600, ast2600::regs::RNG_DATA),
        ] {
            let mut bank = new_bank(variant);
            let mut rng = seeded_rng();
            let mut expected = seeded_rng();
            let recorder = Recorder::default();

            let first = bank.read(offset as u64, 4, &mut rng, &recorder);
            let second = bank.read(offset as u64, 4, &mut rng, &recorder);
            assert_eq!(first, expected.next_u32(), "{variant}");
            assert_eq!(second, expected.next_u32(), "{variant}");
            assert_ne!(first, second, "{variant}");
            assert_eq!(bank.regs()[to_reg(offset)], second);
            assert_eq!(
                recorder.events(),
                vec![
                    AccessEvent::RandomRead,
                    AccessEvent::Read,
                    AccessEvent::RandomRead,
                    AccessEvent::Read
                ]
            );
        }
    }

    #[test]
    fn test_random_reads_ignore_rng_enable() {
        let mut bank = new_bank(Variant::Ast2500);
        let mut rng = seeded_rng();
        unlock(&mut bank);
        bank.write(ast2500::regs::RNG_CTRL as u64, 4, 0, &NullObserver);
        let first = bank.read(ast2500::regs::RNG_DATA as u64, 4, &mut rng, &NullObserver);
        let second = bank.read(ast2500::regs::RNG_DATA as u64, 4, &mut rng, &NullObserver);
        assert_ne!(first, second);
    }

    #[test]
    fn test_out_of_bounds() {
        for variant in Variant::all() {
            let mut bank = new_bank(variant);
            let mut rng = seeded_rng();
            let recorder = Recorder::default();
            let offset = (variant.descriptor().nr_regs * 4) as u64;
            let before = bank.regs().to_vec();

            assert_eq!(bank.read(offset, 4, &mut rng, &recorder), 0);
            bank.write(offset, 4, 0xFFFF_FFFF, &recorder);
            bank.write(u64::MAX, 4, 0xFFFF_FFFF, &recorder);

            assert_eq!(bank.regs(), &before[..], "{variant}");
            assert_eq!(
                recorder.events(),
                vec![AccessEvent::OutOfBounds; 3],
                "{variant}"
            );
        }
    }

    #[test]
    fn test_read_only_cells_are_unchanged() {
        let cases = [
            (Variant::Ast2400, ast2400::regs::SILICON_REV),
            (Variant::Ast2400, ast2400::regs::VGA_SCRATCH3),
            (Variant::Ast2500, ast2500::regs::CHIP_ID1),
            (Variant::Ast2600, ast2600::regs::SILICON_REV2),
            (Variant::Ast2600, ast2600::regs::CHIP_ID0),
        ];
        for (variant, offset) in cases {
            let mut bank = new_bank(variant);
            unlock(&mut bank);
            let before = bank.regs()[to_reg(offset)];
            let recorder = Recorder::default();
            bank.write(offset as u64, 4, u64::from(!before), &recorder);
            assert_eq!(bank.regs()[to_reg(offset)], before, "{variant} 0x{offset:X}");
            assert_eq!(recorder.events(), vec![AccessEvent::ReadOnlyWrite]);
        }
    }

    #[test]
    fn test_locked_writes_land_on_every_generation() {
        let cases = [
            (Variant::Ast2400, ast2400::regs::MISC_CTRL1),
            (Variant::Ast2500, ast2500::regs::MISC_CTRL1),
            (Variant::Ast2600, ast2600::regs::CLK_SEL),
        ];
        for (variant, offset) in cases {
            let mut bank = new_bank(variant);
            let recorder = Recorder::default();
            assert!(!bank.is_unlocked());
            bank.write(offset as u64, 4, 0x1234_5678, &recorder);
            assert_eq!(bank.regs()[to_reg(offset)], 0x1234_5678, "{variant}");
            assert_eq!(
                recorder.events(),
                vec![AccessEvent::LockViolation, AccessEvent::Write],
                "{variant}"
            );
        }
    }

    #[test]
    fn test_lock_range_differs_between_generations() {
        // CPU2_BASE_SEG1 sits just past the legacy guarded range
        let recorder = Recorder::default();
        let mut legacy = new_bank(Variant::Ast2500);
        legacy.write(ast2500::regs::CPU2_BASE_SEG1 as u64, 4, 1, &recorder);
        legacy.write(ast2500::regs::CPU2_CTRL as u64, 4, 1, &recorder);
        assert_eq!(
            recorder.events(),
            vec![
                AccessEvent::Write,
                AccessEvent::LockViolation,
                AccessEvent::Write
            ]
        );

        let recorder = Recorder::default();
        let mut newest = new_bank(Variant::Ast2600);
        newest.write(ast2600::regs::CHIP_ID1 as u64 + 4, 4, 1, &recorder);
        assert_eq!(
            recorder.events(),
            vec![AccessEvent::LockViolation, AccessEvent::Write]
        );
    }

    #[test]
    fn test_block_enforcement_drops_locked_writes() {
        let mut bank = RegisterBank::new(
            Variant::Ast2400.descriptor(),
            config_for(Variant::Ast2400),
            ScuOptions {
                lock_enforcement: Some(LockEnforcement::Block),
            },
        );
        let offset = ast2400::regs::MISC_CTRL1;
        bank.write(offset as u64, 4, 0xFFFF_FFFF, &NullObserver);
        assert_eq!(bank.regs()[to_reg(offset)], 0x10);

        // The key cell itself is never guarded
        unlock(&mut bank);
        bank.write(offset as u64, 4, 0xFFFF_FFFF, &NullObserver);
        assert_eq!(bank.regs()[to_reg(offset)], 0xFFFF_FFFF);
    }

    #[test]
    fn test_ast2500_strap_set_and_clear() {
        let mut bank = new_bank(Variant::Ast2500);
        unlock(&mut bank);
        let strap = to_reg(ast2500::regs::HW_STRAP1);
        let rev = to_reg(ast2500::regs::SILICON_REV);

        bank.write(ast2500::regs::HW_STRAP1 as u64, 4, 0x0000_0001, &NullObserver);
        assert_eq!(bank.regs()[strap], 0xF100_C2E7);

        bank.write(ast2500::regs::SILICON_REV as u64, 4, 0xF000_0001, &NullObserver);
        assert_eq!(bank.regs()[strap], 0x0100_C2E6);
        assert_eq!(bank.regs()[rev], revision::AST2500_A1);
    }

    #[test]
    fn test_ast2400_strap_is_plain() {
        let mut bank = new_bank(Variant::Ast2400);
        unlock(&mut bank);
        bank.write(ast2400::regs::HW_STRAP1 as u64, 4, 0x0000_0001, &NullObserver);
        assert_eq!(bank.regs()[to_reg(ast2400::regs::HW_STRAP1)], 1);
    }

    #[test]
    fn test_ast2600_strap_protect() {
        let mut bank = new_bank(Variant::Ast2600);
        unlock(&mut bank);
        let strap = to_reg(ast2600::regs::HW_STRAP1);

        bank.write(ast2600::regs::HW_STRAP1 as u64, 4, 0x0000_0100, &NullObserver);
        assert_eq!(bank.regs()[strap], 0xF100_C2E6 | 0x100);

        let recorder = Recorder::default();
        bank.write(ast2600::regs::HW_STRAP1_PROT as u64, 4, 1, &NullObserver);
        bank.write(ast2600::regs::HW_STRAP1 as u64, 4, 0x0000_0001, &recorder);
        assert_eq!(bank.regs()[strap], 0xF100_C2E6 | 0x100);
        assert_eq!(recorder.events(), vec![AccessEvent::ProtectedStrapWrite]);

        // Clearing still works while protected
        bank.write(ast2600::regs::HW_STRAP1_CLR as u64, 4, 0x100, &NullObserver);
        assert_eq!(bank.regs()[strap], 0xF100_C2E6);

        // STRAP2 has its own protect register
        bank.write(ast2600::regs::HW_STRAP2 as u64, 4, 0x2, &NullObserver);
        assert_eq!(bank.regs()[to_reg(ast2600::regs::HW_STRAP2)], 0x3);
    }

    #[test]
    fn test_ast2600_pll_ext_reads_locked() {
        let mut bank = new_bank(Variant::Ast2600);
        let mut rng = seeded_rng();
        unlock(&mut bank);
        for offset in ast2600::PLL_EXT {
            bank.write(offset as u64, 4, 0x0000_0042, &NullObserver);
            assert_eq!(
                bank.read(offset as u64, 4, &mut rng, &NullObserver),
                0x8000_0042
            );
            assert_eq!(bank.regs()[to_reg(offset)], 0x42);
        }
        // Past the end of the legacy map
        let mut legacy = new_bank(Variant::Ast2500);
        assert_eq!(legacy.read(0x204, 4, &mut rng, &NullObserver), 0);
    }

    #[test]
    fn test_write_only_read_returns_shadow() {
        for variant in [Variant::Ast2400, Variant::Ast2500] {
            let mut bank = new_bank(variant);
            let mut rng = seeded_rng();
            unlock(&mut bank);
            bank.write(ast2400::regs::WAKEUP_EN as u64, 4, 0xCAFE, &NullObserver);
            let recorder = Recorder::default();
            let value = bank.read(ast2400::regs::WAKEUP_EN as u64, 4, &mut rng, &recorder);
            assert_eq!(value, 0xCAFE, "{variant}");
            assert_eq!(
                recorder.events(),
                vec![AccessEvent::WriteOnlyRead, AccessEvent::Read]
            );
        }
    }

    #[test]
    fn test_ast2400_narrow_accesses() {
        let mut bank = new_bank(Variant::Ast2400);
        let mut rng = seeded_rng();
        let offset = ast2400::regs::MISC_CTRL2 as u64;
        unlock(&mut bank);

        bank.write(offset, 4, 0x1234_5678, &NullObserver);
        assert_eq!(bank.read(offset, 1, &mut rng, &NullObserver), 0x78);
        assert_eq!(bank.read(offset, 2, &mut rng, &NullObserver), 0x5678);
        assert_eq!(bank.read(offset + 1, 1, &mut rng, &NullObserver), 0x78);

        // A narrow write replaces the whole cell
        bank.write(offset + 2, 1, 0xABCD, &NullObserver);
        assert_eq!(bank.regs()[to_reg(offset as u32)], 0xCD);
    }

    #[test]
    fn test_frequencies_from_reset_state() {
        let strap = |variant| {
            RegisterBank::new(
                Variant::descriptor(&variant),
                config_for(variant).with_hw_strap1(0),
                ScuOptions::default(),
            )
        };
        assert_eq!(strap(Variant::Ast2400).apb_frequency(), 24_000_000);
        assert_eq!(strap(Variant::Ast2500).apb_frequency(), 24_750_000);
        assert_eq!(strap(Variant::Ast2600).apb_frequency(), 6_000_000);
        assert_eq!(strap(Variant::Ast2500).hpll_frequency(), 792_000_000);
    }
}
