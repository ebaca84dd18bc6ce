// Macros (must be first for visibility)
#[macro_use]
pub mod macros;

pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod prom;
pub mod script;
pub mod snapshot;
pub mod variant;

pub use config::{DeviceConfig, FileConfig, LockEnforcement, ScuOptions};
pub use device::Scu;
pub use error::{Result, ScuError};
pub use metrics::{AccessEvent, AccessObserver};
pub use prom::ScuMetricExporter;
pub use snapshot::ScuSnapshot;
pub use variant::{Variant, VariantDescriptor};
