//! GPIO value types and port register access
//!
//! A GPIO port on the AVR family is three 8-bit registers: the input state
//! register (`PINx`), the data direction register (`DDRx`) and the data
//! register (`PORTx`). The data register doubles as the pull-up enable
//! while a pin is configured as input.
//!
//! [`PortRegisters`] implements the register-level operations on one bit
//! of such a port. Chip crates resolve a logical pin to a port and bit
//! index through a [`ResourceTable`](crate::ResourceTable) and then call
//! these operations.

use crate::error::{ErrorKind, HalError};
use crate::register::Register;
use crate::table::NotFound;

/// Errors from GPIO operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioError {
    /// Pin is not present in the pin table
    Pin,
    /// Pin direction does not allow this operation
    Mode,
    /// Invalid level value
    Level,
    /// Invalid pull-up value
    PullUp,
}

impl HalError for GpioError {
    fn kind(&self) -> ErrorKind {
        match self {
            GpioError::Pin => ErrorKind::Identifier,
            GpioError::Mode => ErrorKind::Mode,
            GpioError::Level | GpioError::PullUp => ErrorKind::Value,
        }
    }
}

impl embedded_hal::digital::Error for GpioError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

impl From<NotFound> for GpioError {
    fn from(_: NotFound) -> Self {
        GpioError::Pin
    }
}

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Pin reads external signals
    Input,
    /// Pin drives its output level
    Output,
}

impl TryFrom<u8> for Mode {
    type Error = GpioError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Mode::Input),
            1 => Ok(Mode::Output),
            _ => Err(GpioError::Mode),
        }
    }
}

/// Logic level read from a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic 0
    Low,
    /// Logic 1
    High,
}

impl Level {
    /// Check if this is the high level
    pub fn is_high(self) -> bool {
        self == Level::High
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Level driven onto an output pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Drive {
    /// Drive logic 0
    Low,
    /// Drive logic 1
    High,
    /// Invert the current output level
    Toggle,
}

impl From<Level> for Drive {
    fn from(level: Level) -> Self {
        match level {
            Level::Low => Drive::Low,
            Level::High => Drive::High,
        }
    }
}

impl TryFrom<u8> for Drive {
    type Error = GpioError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Drive::Low),
            1 => Ok(Drive::High),
            2 => Ok(Drive::Toggle),
            _ => Err(GpioError::Level),
        }
    }
}

/// Input pull-up configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    /// Floating input
    #[default]
    Disabled,
    /// Internal pull-up resistor enabled
    Enabled,
}

impl TryFrom<u8> for Pull {
    type Error = GpioError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Pull::Disabled),
            1 => Ok(Pull::Enabled),
            _ => Err(GpioError::PullUp),
        }
    }
}

/// Register group of one GPIO port
#[derive(Debug)]
pub struct PortRegisters<R> {
    /// Input state register (`PINx`)
    pub pin: R,
    /// Data direction register (`DDRx`)
    pub ddr: R,
    /// Data / pull-up register (`PORTx`)
    pub port: R,
}

impl<R: Register> PortRegisters<R> {
    /// Get the configured direction of a bit
    pub fn mode(&self, bit: u8) -> Mode {
        if self.ddr.test_bit(bit) {
            Mode::Output
        } else {
            Mode::Input
        }
    }

    /// Set the direction of a bit
    ///
    /// Always leaves the data bit cleared, so a new output starts low and a
    /// new input starts without pull-up.
    pub fn set_direction(&self, bit: u8, mode: Mode) {
        match mode {
            Mode::Input => self.ddr.clear_bit(bit),
            Mode::Output => self.ddr.set_bit(bit),
        }
        self.port.clear_bit(bit);
    }

    /// Read the input state of a bit
    pub fn read_level(&self, bit: u8) -> Level {
        Level::from(self.pin.test_bit(bit))
    }

    /// Read back the driven output level of a bit
    pub fn output_level(&self, bit: u8) -> Level {
        Level::from(self.port.test_bit(bit))
    }

    /// Drive the output level of a bit
    ///
    /// Fails with [`GpioError::Mode`] if the bit is configured as input.
    pub fn write_level(&self, bit: u8, drive: Drive) -> Result<(), GpioError> {
        if self.mode(bit) == Mode::Input {
            return Err(GpioError::Mode);
        }

        match drive {
            Drive::Low => self.port.clear_bit(bit),
            Drive::High => self.port.set_bit(bit),
            Drive::Toggle => self.port.toggle_bit(bit),
        }
        Ok(())
    }

    /// Enable or disable the pull-up of a bit
    ///
    /// Fails with [`GpioError::Mode`] if the bit is configured as output.
    pub fn configure_pull_up(&self, bit: u8, pull: Pull) -> Result<(), GpioError> {
        if self.mode(bit) == Mode::Output {
            return Err(GpioError::Mode);
        }

        match pull {
            Pull::Disabled => self.port.clear_bit(bit),
            Pull::Enabled => self.port.set_bit(bit),
        }
        Ok(())
    }
}
