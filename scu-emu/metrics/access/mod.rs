mod types;

pub use types::AccessEvent;

/// Receives every access event a device produces
///
/// Called with the device lock held; implementations must not call back
/// into the device.
pub trait AccessObserver: Send + Sync {
    fn on_access(&self, event: AccessEvent, offset: u64, value: u32);
}

/// Observer that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl AccessObserver for NullObserver {
    fn on_access(&self, _event: AccessEvent, _offset: u64, _value: u32) {}
}
