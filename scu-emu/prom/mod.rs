pub mod scu;

pub use scu::ScuMetricExporter;
