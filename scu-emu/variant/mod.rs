// SCU generation detection and dispatch

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use scu_raw::revision;

use crate::enum_with_data;
use crate::error::ScuError;

mod descriptor;
pub mod policy;

pub use descriptor::{ResetFixup, VariantDescriptor};
pub use policy::{PolicyTable, ReadPolicy, WritePolicy};

enum_with_data! {
    /// SoC generation whose SCU is being modelled
    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Variant: u8 {
        Ast2400 => ("AST2400", 0x02),
        Ast2500 => ("AST2500", 0x04),
        Ast2600 => ("AST2600", 0x05),
    }
    impl family -> u8
}

impl Variant {
    /// Natural generation of a silicon revision
    ///
    /// Returns `None` for revisions outside the allow-list. Construction
    /// accepts any supported revision for any variant, so this is only a
    /// default for callers that do not name the variant themselves.
    pub fn from_silicon_rev(silicon_rev: u32) -> Option<Self> {
        if !revision::is_supported(silicon_rev) {
            tracing::debug!("Silicon revision 0x{:08X} not supported", silicon_rev);
            return None;
        }

        let family = revision::family(silicon_rev);
        let variant = Self::all().into_iter().find(|v| v.family() == family)?;

        tracing::debug!(
            "Silicon revision 0x{:08X}: {} stepping A{}",
            silicon_rev,
            variant.name(),
            revision::stepping(silicon_rev)
        );

        Some(variant)
    }

    /// Immutable tables shared by every instance of this generation
    pub fn descriptor(&self) -> &'static VariantDescriptor {
        match self {
            Variant::Ast2400 => &descriptor::AST2400,
            Variant::Ast2500 => &descriptor::AST2500,
            Variant::Ast2600 => &descriptor::AST2600,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = ScuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ScuError::ParseError(format!("unknown SCU variant '{s}'")))
    }
}
