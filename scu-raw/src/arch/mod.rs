//! Generation-specific register definitions
//!
//! Each ASPEED SoC generation has a different SCU register count, different
//! reset images and, for the AST2600, a completely different register map.
//! This module provides the definitions organized by SoC family.
//!
//! ## Supported Generations
//!
//! - **AST2400** (`ast2400`) - 106 registers, byte-accessible
//! - **AST2500** (`ast2500`) - AST2400 register map, word-only access, new H-PLL layout
//! - **AST2600** (`ast2600`) - 904 registers, W1S/W1C register pairs
//!
//! Definitions shared by all three live in [`common`].

pub mod ast2400;
pub mod ast2500;
pub mod ast2600;
pub mod common;
