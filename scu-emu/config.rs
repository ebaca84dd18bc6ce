use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use crate::error::{Result, ScuError};
use crate::variant::Variant;

/// Construction-time configuration of one SCU instance
///
/// These words are what the board wires into the SoC. They never change
/// after construction and are re-applied on every reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    #[serde(deserialize_with = "de_u32")]
    pub silicon_rev: u32,
    #[serde(deserialize_with = "de_u32")]
    pub hw_strap1: u32,
    #[serde(deserialize_with = "de_u32")]
    pub hw_strap2: u32,
    #[serde(deserialize_with = "de_u32")]
    pub hw_prot_key: u32,
}

impl DeviceConfig {
    pub fn new(silicon_rev: u32) -> Self {
        Self {
            silicon_rev,
            ..Default::default()
        }
    }

    pub fn with_hw_strap1(mut self, value: u32) -> Self {
        self.hw_strap1 = value;
        self
    }

    pub fn with_hw_strap2(mut self, value: u32) -> Self {
        self.hw_strap2 = value;
        self
    }

    pub fn with_hw_prot_key(mut self, value: u32) -> Self {
        self.hw_prot_key = value;
        self
    }

    /// Reject revisions outside the allow-list
    pub fn validate(&self) -> Result<()> {
        if !scu_raw::revision::is_supported(self.silicon_rev) {
            return Err(ScuError::UnsupportedSiliconRevision(self.silicon_rev));
        }
        Ok(())
    }
}

/// What happens to a write into the guarded range while the SCU is locked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockEnforcement {
    /// Report the violation and let the write land, as the silicon does
    #[default]
    Advisory,
    /// Report the violation and drop the write
    Block,
}

/// Model behaviour knobs that do not exist on hardware
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScuOptions {
    /// Overrides the generation's lock policy when set
    pub lock_enforcement: Option<LockEnforcement>,
}

/// Contents of a `--config` JSON file
///
/// ```json
/// { "variant": "ast2500", "silicon_rev": "0x04010303", "hw_strap1": "0xF100C2E6" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub variant: Option<Variant>,
    #[serde(flatten)]
    pub device: DeviceConfig,
    pub options: ScuOptions,
}

impl FileConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: FileConfig = serde_json::from_str(&text)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Variant given in the file, or the natural one for its silicon revision
    pub fn resolve_variant(&self) -> Result<Variant> {
        match self.variant {
            Some(variant) => Ok(variant),
            None => Variant::from_silicon_rev(self.device.silicon_rev)
                .ok_or(ScuError::UnsupportedSiliconRevision(self.device.silicon_rev)),
        }
    }
}

/// Parse a register-sized number written as `0x` hex, `0b` binary or decimal
///
/// Underscores are accepted as digit separators, as in Rust literals.
pub fn parse_u32(s: &str) -> Result<u32> {
    let cleaned: String = s.trim().chars().filter(|&c| c != '_').collect();
    let parsed = if let Some(hex) = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16)
    } else if let Some(bin) = cleaned.strip_prefix("0b") {
        u32::from_str_radix(bin, 2)
    } else {
        cleaned.parse::<u32>()
    };
    parsed.map_err(|e| ScuError::ParseError(format!("'{s}': {e}")))
}

fn de_u32<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Word {
        Number(u32),
        Text(String),
    }

    match Word::deserialize(deserializer)? {
        Word::Number(n) => Ok(n),
        Word::Text(s) => parse_u32(&s).map_err(serde::de::Error::custom),
    }
}
