use std::io;
use thiserror::Error;

use crate::variant::Variant;

#[derive(Error, Debug)]
pub enum ScuError {
    #[error("Unsupported silicon revision: 0x{0:08X}")]
    UnsupportedSiliconRevision(u32),

    #[error("Invalid access: {0}")]
    InvalidAccess(#[from] scu_raw::AccessError),

    #[error("Snapshot of {found} ({found_len} registers) does not fit {expected} ({expected_len} registers)")]
    SnapshotMismatch {
        expected: Variant,
        expected_len: usize,
        found: Variant,
        found_len: usize,
    },

    #[error("Unsupported snapshot version {0}")]
    SnapshotVersion(u32),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Prometheus error: {0}")]
    PrometheusError(#[from] prometheus::Error),
}

pub type Result<T> = std::result::Result<T, ScuError>;
