pub mod bank;
pub mod clock;
pub mod lock;

pub use bank::{RegisterBank, GUEST_ERROR, WRITE_TRACE};
pub use lock::{LockGate, LockState};
