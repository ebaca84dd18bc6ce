//! Generic register abstractions for typed SCU register decoding

/// Convert a byte offset inside the SCU window into a register index
pub const fn to_reg(offset: u32) -> usize {
    (offset >> 2) as usize
}

/// Trait for register layouts that can be converted to/from raw SCU words
///
/// This trait provides type-safe conversion between structured register
/// layouts and the raw 32-bit values stored in the SCU register file.
///
/// # Example
///
/// ```ignore
/// use scu_raw::register::RegisterLayout;
///
/// #[derive(Debug, Default)]
/// struct MyControl {
///     enable: bool,
///     divider: u8,
/// }
///
/// impl RegisterLayout for MyControl {
///     fn to_reg_value(&self) -> u32 {
///         (if self.enable { 1 } else { 0 }) | ((self.divider as u32 & 0x7) << 23)
///     }
///
///     fn from_reg_value(value: u32) -> Self {
///         Self {
///             enable: (value & 1) != 0,
///             divider: ((value >> 23) & 0x7) as u8,
///         }
///     }
/// }
/// ```
pub trait RegisterLayout: Sized {
    /// Convert this register layout to a raw register value
    fn to_reg_value(&self) -> u32;

    /// Parse a raw register value into this register layout
    fn from_reg_value(value: u32) -> Self;

    /// Validate that the field values fit their bit widths
    ///
    /// Returns `Ok(())` if valid, or an error message if invalid.
    fn validate(&self) -> Result<(), &'static str> {
        Ok(())
    }
}

/// A SCU register with byte offset and typed layout
///
/// # Example
///
/// ```ignore
/// use scu_raw::register::Register;
/// use scu_raw::arch::common::ClockSelect;
///
/// let reg = Register::new(0x08, ClockSelect { pclk_divider: 7, ..Default::default() });
/// assert_eq!(reg.index(), 2);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Register<T: RegisterLayout> {
    /// Byte offset inside the SCU window
    pub offset: u32,
    /// Typed register layout
    pub layout: T,
}

impl<T: RegisterLayout> Register<T> {
    /// Create a new register with the given offset and layout
    pub fn new(offset: u32, layout: T) -> Self {
        Self { offset, layout }
    }

    /// Create a register from a raw value read at `offset`
    pub fn decode(offset: u32, value: u32) -> Self {
        Self {
            offset,
            layout: T::from_reg_value(value),
        }
    }

    /// Register file index of this register
    pub fn index(&self) -> usize {
        to_reg(self.offset)
    }

    /// Validate the register layout
    pub fn validate(&self) -> Result<(), &'static str> {
        self.layout.validate()
    }

    /// Get the raw value for this register
    pub fn to_reg_value(&self) -> u32 {
        self.layout.to_reg_value()
    }
}
