use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, ScuError};
use crate::variant::{Variant, VariantDescriptor};

/// Register file layout version written into every snapshot
pub const SNAPSHOT_VERSION: u32 = 2;

/// Persisted SCU state: the register file in index order
///
/// Configuration is not part of the snapshot; the restoring device keeps
/// its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScuSnapshot {
    pub version: u32,
    pub variant: Variant,
    pub regs: Vec<u32>,
}

impl ScuSnapshot {
    pub fn new(variant: Variant, regs: Vec<u32>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            variant,
            regs,
        }
    }

    /// Check that this snapshot can be loaded into a device of `desc`
    pub fn check(&self, desc: &VariantDescriptor) -> Result<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(ScuError::SnapshotVersion(self.version));
        }
        if self.variant != desc.variant || self.regs.len() != desc.nr_regs {
            return Err(ScuError::SnapshotMismatch {
                expected: desc.variant,
                expected_len: desc.nr_regs,
                found: self.variant,
                found_len: self.regs.len(),
            });
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        tracing::info!(
            "Saved {} snapshot to {}",
            self.variant,
            path.as_ref().display()
        );
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_accepts_matching_snapshot() {
        let desc = Variant::Ast2500.descriptor();
        let snap = ScuSnapshot::new(Variant::Ast2500, desc.resets.to_vec());
        assert!(snap.check(desc).is_ok());
    }

    #[test]
    fn test_check_rejects_other_variant() {
        // AST2400 and AST2500 share a register count
        let snap = ScuSnapshot::new(Variant::Ast2400, vec![0; 106]);
        assert!(matches!(
            snap.check(Variant::Ast2500.descriptor()),
            Err(ScuError::SnapshotMismatch {
                found: Variant::Ast2400,
                ..
            })
        ));
    }

    #[test]
    fn test_check_rejects_wrong_length() {
        let snap = ScuSnapshot::new(Variant::Ast2600, vec![0; 106]);
        assert!(matches!(
            snap.check(Variant::Ast2600.descriptor()),
            Err(ScuError::SnapshotMismatch {
                expected_len: 904,
                found_len: 106,
                ..
            })
        ));
    }

    #[test]
    fn test_check_rejects_other_version() {
        let mut snap = ScuSnapshot::new(Variant::Ast2400, vec![0; 106]);
        snap.version = 1;
        assert!(matches!(
            snap.check(Variant::Ast2400.descriptor()),
            Err(ScuError::SnapshotVersion(1))
        ));
    }

    #[test]
    fn test_json_layout() {
        let snap = ScuSnapshot::new(Variant::Ast2600, vec![1, 2]);
        let value: serde_json::Value = serde_json::from_str(&snap.to_json().unwrap()).unwrap();
        assert_eq!(value["version"], 2);
        assert_eq!(value["variant"], "ast2600");
        assert_eq!(value["regs"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!("scu-snapshot-{}.json", std::process::id()));
        let snap = ScuSnapshot::new(Variant::Ast2400, vec![7; 106]);
        snap.save(&path).unwrap();
        let loaded = ScuSnapshot::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, snap);
    }
}
