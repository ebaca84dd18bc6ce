use prometheus::{IntCounter, IntGauge, Opts, Registry};
use std::collections::HashMap;
use std::sync::Arc;

use crate::device::Scu;
use crate::error::Result;
use crate::metrics::{AccessEvent, AccessObserver};
use crate::variant::Variant;

const NAMESPACE: &str = "scu";

pub struct ScuMetricExporter {
    variant: Variant,
    registry: Arc<Registry>,
    counters: HashMap<AccessEvent, IntCounter>,
    apb_frequency: IntGauge,
    unlocked: IntGauge,
}

impl ScuMetricExporter {
    pub fn new(variant: Variant) -> Result<Self> {
        let registry = Arc::new(Registry::new());

        let apb_frequency = IntGauge::with_opts(
            Self::opts("apb_frequency_hz", "Derived APB clock frequency", variant),
        )?;
        let unlocked = IntGauge::with_opts(Self::opts(
            "unlocked",
            "1 while the protection key is unlocked",
            variant,
        ))?;

        let mut exporter = Self {
            variant,
            registry,
            counters: HashMap::new(),
            apb_frequency,
            unlocked,
        };

        exporter.register_metrics()?;

        Ok(exporter)
    }

    fn opts(name: &str, help: &str, variant: Variant) -> Opts {
        Opts::new(name, help)
            .namespace(NAMESPACE)
            .const_label("variant", variant.name())
    }

    fn register_metrics(&mut self) -> Result<()> {
        for event in AccessEvent::all() {
            let counter = IntCounter::with_opts(Self::opts(
                event.name(),
                &format!("SCU {event:?} accesses"),
                self.variant,
            ))?;
            self.registry.register(Box::new(counter.clone()))?;
            self.counters.insert(event, counter);
        }

        self.registry
            .register(Box::new(self.apb_frequency.clone()))?;
        self.registry.register(Box::new(self.unlocked.clone()))?;

        Ok(())
    }

    /// Refresh the gauges from the device state
    pub fn collect(&self, scu: &Scu) {
        self.apb_frequency.set(i64::from(scu.apb_frequency()));
        self.unlocked.set(i64::from(scu.is_unlocked()));
    }

    /// Current value of one event counter
    pub fn count(&self, event: AccessEvent) -> u64 {
        self.counters.get(&event).map_or(0, IntCounter::get)
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }
}

impl AccessObserver for ScuMetricExporter {
    fn on_access(&self, event: AccessEvent, _offset: u64, _value: u32) {
        if let Some(counter) = self.counters.get(&event) {
            counter.inc();
        }
    }
}
