//! Uniform error taxonomy
//!
//! Every peripheral defines its own error enum, but all of them fall into
//! one of a handful of kinds. Drivers validate in a fixed order (identifier,
//! then mode, then value) and return before any register is touched.

/// Category of a HAL error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Logical identifier is not present in the resource table
    Identifier,
    /// Operation conflicts with the current direction/mode configuration
    Mode,
    /// Argument outside its enumerated or numeric domain
    Value,
    /// Timer period out of bounds
    Period,
    /// Timer callback missing
    Callback,
}

/// Common interface over the per-peripheral error enums
pub trait HalError: core::fmt::Debug + Copy {
    /// Get the category of this error
    fn kind(&self) -> ErrorKind;
}
