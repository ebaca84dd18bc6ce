//! # scu-raw
//!
//! Register definitions for the ASPEED System Control Unit (SCU).
//!
//! This crate provides register offsets, reset images, silicon revision
//! identifiers and typed bit-field layouts for the SCU of three ASPEED BMC
//! SoC generations: AST2400, AST2500 and AST2600. It performs no I/O; the
//! emulation engine lives in `scu-emu`.
//!
//! ## Usage
//!
//! ```ignore
//! use scu_raw::arch::ast2500::{regs, Ast2500HpllParam, RESETS};
//! use scu_raw::{to_reg, RegisterLayout};
//!
//! let hpll = Ast2500HpllParam::from_reg_value(RESETS[to_reg(regs::HPLL_PARAM)]);
//! assert_eq!(hpll.multiplier(), 33);
//! ```

pub mod access;
pub mod arch;
pub mod register;

// Re-export for convenience
pub use access::{AccessError, AccessWidth};
pub use arch::common::{revision, SCU_IO_REGION_SIZE, SCU_PROT_KEY};
pub use register::{to_reg, Register, RegisterLayout};
