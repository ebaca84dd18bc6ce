pub mod access;

pub use access::{AccessEvent, AccessObserver, NullObserver};
