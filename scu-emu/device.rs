//! Thread-safe SCU device
//!
//! [`Scu`] wraps one register bank behind a mutex so a single instance can be
//! shared between emulated CPUs. Every public operation takes the lock for
//! exactly one access, reset, snapshot or frequency query.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::Arc;

use crate::config::{DeviceConfig, ScuOptions};
use crate::engine::RegisterBank;
use crate::error::Result;
use crate::metrics::{AccessObserver, NullObserver};
use crate::snapshot::ScuSnapshot;
use crate::variant::{Variant, VariantDescriptor};

struct Inner {
    bank: RegisterBank,
    rng: Box<dyn RngCore + Send>,
}

pub struct Scu {
    desc: &'static VariantDescriptor,
    inner: Mutex<Inner>,
    observer: Arc<dyn AccessObserver>,
}

impl Scu {
    /// Create a device seeded from OS entropy
    pub fn new(variant: Variant, config: DeviceConfig) -> Result<Self> {
        Self::with_rng(variant, config, Box::new(StdRng::from_entropy()))
    }

    /// Create a device drawing RNG_DATA values from `rng`
    ///
    /// Fails without producing a device if the silicon revision is not on the
    /// allow-list. Any supported revision is accepted for any variant.
    pub fn with_rng(
        variant: Variant,
        config: DeviceConfig,
        rng: Box<dyn RngCore + Send>,
    ) -> Result<Self> {
        if let Err(e) = config.validate() {
            tracing::error!("Refusing to create {} SCU: {}", variant.name(), e);
            return Err(e);
        }

        let desc = variant.descriptor();
        let bank = RegisterBank::new(desc, config, ScuOptions::default());

        tracing::info!(
            "Created {} SCU ({} registers, silicon rev 0x{:08X})",
            variant.name(),
            desc.nr_regs,
            config.silicon_rev
        );

        Ok(Self {
            desc,
            inner: Mutex::new(Inner { bank, rng }),
            observer: Arc::new(NullObserver),
        })
    }

    pub fn with_options(self, options: ScuOptions) -> Self {
        self.inner.lock().bank.set_options(options);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn AccessObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn variant(&self) -> Variant {
        self.desc.variant
    }

    pub fn descriptor(&self) -> &'static VariantDescriptor {
        self.desc
    }

    pub fn config(&self) -> DeviceConfig {
        *self.inner.lock().bank.config()
    }

    /// Bus read; width and alignment must already be valid for the variant
    pub fn read(&self, offset: u64, size: u32) -> u32 {
        let mut inner = self.inner.lock();
        let Inner { bank, rng } = &mut *inner;
        bank.read(offset, size, rng.as_mut(), self.observer.as_ref())
    }

    /// Bus write; width and alignment must already be valid for the variant
    pub fn write(&self, offset: u64, size: u32, value: u64) {
        self.inner
            .lock()
            .bank
            .write(offset, size, value, self.observer.as_ref());
    }

    /// Bus read with width and alignment checked first
    pub fn checked_read(&self, offset: u64, size: u32) -> Result<u32> {
        self.desc.access.validate(offset, size)?;
        Ok(self.read(offset, size))
    }

    /// Bus write with width and alignment checked first
    pub fn checked_write(&self, offset: u64, size: u32, value: u64) -> Result<()> {
        self.desc.access.validate(offset, size)?;
        self.write(offset, size, value);
        Ok(())
    }

    /// Register value without read side effects, `None` past the file
    pub fn peek(&self, offset: u64) -> Option<u32> {
        let inner = self.inner.lock();
        let reg = usize::try_from(offset >> 2).ok()?;
        inner.bank.regs().get(reg).copied()
    }

    pub fn is_unlocked(&self) -> bool {
        self.inner.lock().bank.is_unlocked()
    }

    pub fn hpll_frequency(&self) -> u32 {
        self.inner.lock().bank.hpll_frequency()
    }

    /// APB clock in Hz, derived from the current register file
    pub fn apb_frequency(&self) -> u32 {
        self.inner.lock().bank.apb_frequency()
    }

    pub fn reset(&self) {
        self.inner.lock().bank.reset();
    }

    pub fn snapshot(&self) -> ScuSnapshot {
        let inner = self.inner.lock();
        ScuSnapshot::new(self.desc.variant, inner.bank.regs().to_vec())
    }

    /// Load a snapshot; on error the device is left untouched
    pub fn restore(&self, snapshot: &ScuSnapshot) -> Result<()> {
        snapshot.check(self.desc)?;
        self.inner.lock().bank.load(&snapshot.regs);
        tracing::info!("Restored {} SCU from snapshot", self.desc.variant.name());
        Ok(())
    }
}
