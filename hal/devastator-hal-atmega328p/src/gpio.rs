//! Digital I/O
//!
//! Logical [`Pin`]s are resolved through [`PIN_TABLE`] to a port and bit
//! index, then driven through the port's [`PortRegisters`]. Every
//! operation resolves first and returns [`GpioError::Pin`] without touching
//! a register when the pin is not in the table.
//!
//! For drivers written against `embedded-hal`, [`Gpio::output`] and
//! [`Gpio::input`] hand out typed pin handles.

use core::str::FromStr;

use devastator_hal::{
    Drive, GpioError, Level, Mode, PortRegisters, Pull, Register, ResourceTable,
};

use crate::regs::Ports;

/// Number of digital I/O pins
pub const PIN_COUNT: usize = 23;

/// GPIO port identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortId {
    B,
    C,
    D,
}

/// Physical binding of a logical pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinDescriptor {
    /// Port register group
    pub port: PortId,
    /// Bit index within the port (0-7)
    pub bit: u8,
}

impl PinDescriptor {
    const fn new(port: PortId, bit: u8) -> Self {
        Self { port, bit }
    }
}

/// Logical digital I/O pin
///
/// PC6 doubles as RESET and PB6/PB7 as the crystal pins on most boards;
/// they are listed because the silicon exposes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Pin {
    PB0,
    PB1,
    PB2,
    PB3,
    PB4,
    PB5,
    PB6,
    PB7,
    PC0,
    PC1,
    PC2,
    PC3,
    PC4,
    PC5,
    PC6,
    PD0,
    PD1,
    PD2,
    PD3,
    PD4,
    PD5,
    PD6,
    PD7,
}

impl Pin {
    /// All pins in identifier order
    pub const ALL: [Pin; PIN_COUNT] = [
        Pin::PB0,
        Pin::PB1,
        Pin::PB2,
        Pin::PB3,
        Pin::PB4,
        Pin::PB5,
        Pin::PB6,
        Pin::PB7,
        Pin::PC0,
        Pin::PC1,
        Pin::PC2,
        Pin::PC3,
        Pin::PC4,
        Pin::PC5,
        Pin::PC6,
        Pin::PD0,
        Pin::PD1,
        Pin::PD2,
        Pin::PD3,
        Pin::PD4,
        Pin::PD5,
        Pin::PD6,
        Pin::PD7,
    ];
}

impl TryFrom<u8> for Pin {
    type Error = GpioError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Pin::ALL.get(raw as usize).copied().ok_or(GpioError::Pin)
    }
}

impl FromStr for Pin {
    type Err = GpioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_pin_string(s).ok_or(GpioError::Pin)
    }
}

/// Parse a pin name
///
/// Accepts the datasheet form "PC3" (case-insensitive, surrounding
/// whitespace ignored). Pins that do not exist on the chip return `None`.
pub fn parse_pin_string(s: &str) -> Option<Pin> {
    let s = s.trim().as_bytes();

    let [p, port, bit] = s else {
        return None;
    };
    if !p.eq_ignore_ascii_case(&b'p') || !bit.is_ascii_digit() {
        return None;
    }

    let port = match port.to_ascii_uppercase() {
        b'B' => PortId::B,
        b'C' => PortId::C,
        b'D' => PortId::D,
        _ => return None,
    };
    let descriptor = PinDescriptor::new(port, bit - b'0');

    PIN_TABLE
        .iter()
        .find(|(_, d)| *d == descriptor)
        .map(|(pin, _)| *pin)
}

/// Pin table of the ATmega328P
pub static PIN_TABLE: ResourceTable<Pin, PinDescriptor> = ResourceTable::new(&[
    (Pin::PB0, PinDescriptor::new(PortId::B, 0)),
    (Pin::PB1, PinDescriptor::new(PortId::B, 1)),
    (Pin::PB2, PinDescriptor::new(PortId::B, 2)),
    (Pin::PB3, PinDescriptor::new(PortId::B, 3)),
    (Pin::PB4, PinDescriptor::new(PortId::B, 4)),
    (Pin::PB5, PinDescriptor::new(PortId::B, 5)),
    (Pin::PB6, PinDescriptor::new(PortId::B, 6)),
    (Pin::PB7, PinDescriptor::new(PortId::B, 7)),
    (Pin::PC0, PinDescriptor::new(PortId::C, 0)),
    (Pin::PC1, PinDescriptor::new(PortId::C, 1)),
    (Pin::PC2, PinDescriptor::new(PortId::C, 2)),
    (Pin::PC3, PinDescriptor::new(PortId::C, 3)),
    (Pin::PC4, PinDescriptor::new(PortId::C, 4)),
    (Pin::PC5, PinDescriptor::new(PortId::C, 5)),
    (Pin::PC6, PinDescriptor::new(PortId::C, 6)),
    (Pin::PD0, PinDescriptor::new(PortId::D, 0)),
    (Pin::PD1, PinDescriptor::new(PortId::D, 1)),
    (Pin::PD2, PinDescriptor::new(PortId::D, 2)),
    (Pin::PD3, PinDescriptor::new(PortId::D, 3)),
    (Pin::PD4, PinDescriptor::new(PortId::D, 4)),
    (Pin::PD5, PinDescriptor::new(PortId::D, 5)),
    (Pin::PD6, PinDescriptor::new(PortId::D, 6)),
    (Pin::PD7, PinDescriptor::new(PortId::D, 7)),
]);

impl<R> Ports<R> {
    /// Get the register group of a port
    pub fn port(&self, id: PortId) -> &PortRegisters<R> {
        match id {
            PortId::B => &self.b,
            PortId::C => &self.c,
            PortId::D => &self.d,
        }
    }
}

/// Digital I/O driver
pub struct Gpio<'a, R> {
    ports: &'a Ports<R>,
    table: &'a ResourceTable<Pin, PinDescriptor>,
}

impl<R> Clone for Gpio<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Gpio<'_, R> {}

impl<'a, R: Register> Gpio<'a, R> {
    /// Create a driver over the full pin table
    pub fn new(ports: &'a Ports<R>) -> Self {
        Self::with_table(ports, &PIN_TABLE)
    }

    /// Create a driver over a board-specific pin table
    pub fn with_table(ports: &'a Ports<R>, table: &'a ResourceTable<Pin, PinDescriptor>) -> Self {
        Self { ports, table }
    }

    fn resolve(&self, pin: Pin) -> Result<(&'a PortRegisters<R>, u8), GpioError> {
        let descriptor = self.table.resolve(pin).inspect_err(|_| {
            warn!("gpio: {:?} not in pin table", pin);
        })?;
        Ok((self.ports.port(descriptor.port), descriptor.bit))
    }

    /// Configure a pin as input or output
    ///
    /// The output level (or pull-up) is reset to low as a side effect.
    pub fn init(&self, pin: Pin, mode: Mode) -> Result<(), GpioError> {
        let (port, bit) = self.resolve(pin)?;
        trace!("gpio: {:?} -> {:?}", pin, mode);
        port.set_direction(bit, mode);
        Ok(())
    }

    /// Read the logic level present on a pin
    pub fn get(&self, pin: Pin) -> Result<Level, GpioError> {
        let (port, bit) = self.resolve(pin)?;
        Ok(port.read_level(bit))
    }

    /// Drive an output pin
    ///
    /// Fails with [`GpioError::Mode`] if the pin is configured as input.
    pub fn set(&self, pin: Pin, drive: Drive) -> Result<(), GpioError> {
        let (port, bit) = self.resolve(pin)?;
        port.write_level(bit, drive)
    }

    /// Configure the pull-up of an input pin
    ///
    /// Fails with [`GpioError::Mode`] if the pin is configured as output.
    pub fn config_input(&self, pin: Pin, pull: Pull) -> Result<(), GpioError> {
        let (port, bit) = self.resolve(pin)?;
        port.configure_pull_up(bit, pull)
    }

    /// Get the configured direction of a pin
    pub fn mode(&self, pin: Pin) -> Result<Mode, GpioError> {
        let (port, bit) = self.resolve(pin)?;
        Ok(port.mode(bit))
    }

    /// Data direction register of a pin's port
    pub fn reg_ddr(&self, pin: Pin) -> Result<&'a R, GpioError> {
        self.resolve(pin).map(|(port, _)| &port.ddr)
    }

    /// Data register of a pin's port
    pub fn reg_port(&self, pin: Pin) -> Result<&'a R, GpioError> {
        self.resolve(pin).map(|(port, _)| &port.port)
    }

    /// Input state register of a pin's port
    pub fn reg_pin(&self, pin: Pin) -> Result<&'a R, GpioError> {
        self.resolve(pin).map(|(port, _)| &port.pin)
    }

    /// Configure a pin as output (driven low) and take a handle to it
    pub fn output(&self, pin: Pin) -> Result<OutputPin<'a, R>, GpioError> {
        let (port, bit) = self.resolve(pin)?;
        port.set_direction(bit, Mode::Output);
        Ok(OutputPin { port, bit, pin })
    }

    /// Configure a pin as input and take a handle to it
    pub fn input(&self, pin: Pin, pull: Pull) -> Result<InputPin<'a, R>, GpioError> {
        let (port, bit) = self.resolve(pin)?;
        port.set_direction(bit, Mode::Input);
        port.configure_pull_up(bit, pull)?;
        Ok(InputPin { port, bit, pin })
    }
}

/// Output pin handle
///
/// The pin was resolved when the handle was created. Writes still check
/// the direction bit, so a pin switched back to input through [`Gpio::init`]
/// reports [`GpioError::Mode`].
pub struct OutputPin<'a, R> {
    port: &'a PortRegisters<R>,
    bit: u8,
    pin: Pin,
}

impl<R: Register> OutputPin<'_, R> {
    /// Logical pin behind this handle
    pub fn pin(&self) -> Pin {
        self.pin
    }

    /// Drive the pin
    pub fn drive(&mut self, drive: Drive) -> Result<(), GpioError> {
        self.port.write_level(self.bit, drive)
    }

    /// Driven output level
    pub fn level(&self) -> Level {
        self.port.output_level(self.bit)
    }
}

impl<R: Register> embedded_hal::digital::ErrorType for OutputPin<'_, R> {
    type Error = GpioError;
}

impl<R: Register> embedded_hal::digital::OutputPin for OutputPin<'_, R> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(Drive::Low)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(Drive::High)
    }
}

impl<R: Register> embedded_hal::digital::StatefulOutputPin for OutputPin<'_, R> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level().is_high())
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.level().is_high())
    }

    fn toggle(&mut self) -> Result<(), Self::Error> {
        self.drive(Drive::Toggle)
    }
}

/// Input pin handle
pub struct InputPin<'a, R> {
    port: &'a PortRegisters<R>,
    bit: u8,
    pin: Pin,
}

impl<R: Register> InputPin<'_, R> {
    /// Logical pin behind this handle
    pub fn pin(&self) -> Pin {
        self.pin
    }

    /// Read the pin level
    pub fn level(&self) -> Level {
        self.port.read_level(self.bit)
    }

    /// Change the pull-up configuration
    pub fn set_pull(&mut self, pull: Pull) -> Result<(), GpioError> {
        self.port.configure_pull_up(self.bit, pull)
    }
}

impl<R: Register> embedded_hal::digital::ErrorType for InputPin<'_, R> {
    type Error = GpioError;
}

impl<R: Register> embedded_hal::digital::InputPin for InputPin<'_, R> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level().is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.level().is_high())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devastator_hal::sim::SimRegister;
    use devastator_hal::{ErrorKind, HalError};
    use embedded_hal::digital::{InputPin as _, OutputPin as _, StatefulOutputPin as _};

    fn port() -> PortRegisters<SimRegister> {
        PortRegisters {
            pin: SimRegister::new(0),
            ddr: SimRegister::new(0),
            port: SimRegister::new(0),
        }
    }

    fn ports() -> Ports<SimRegister> {
        Ports {
            b: port(),
            c: port(),
            d: port(),
        }
    }

    fn total_writes(ports: &Ports<SimRegister>) -> u32 {
        [&ports.b, &ports.c, &ports.d]
            .iter()
            .map(|p| p.pin.writes() + p.ddr.writes() + p.port.writes())
            .sum()
    }

    /// Board that only wires up port C
    static PORT_C_ONLY: ResourceTable<Pin, PinDescriptor> = ResourceTable::new(&[
        (Pin::PC2, PinDescriptor::new(PortId::C, 2)),
        (Pin::PC3, PinDescriptor::new(PortId::C, 3)),
    ]);

    #[test]
    fn test_pin_table_complete() {
        assert_eq!(PIN_TABLE.len(), PIN_COUNT);
        assert_eq!(PIN_TABLE.find_duplicate(), None);
        for pin in Pin::ALL {
            assert!(PIN_TABLE.contains(pin), "{:?} missing", pin);
        }
    }

    #[test]
    fn test_pin_table_no_aliasing() {
        for (i, (pin_a, a)) in PIN_TABLE.iter().enumerate() {
            assert!(a.bit < 8);
            for (pin_b, b) in PIN_TABLE.iter().skip(i + 1) {
                assert_ne!(a, b, "{:?} and {:?} share a bit", pin_a, pin_b);
            }
        }
    }

    #[test]
    fn test_init_output() {
        let regs = ports();
        let gpio = Gpio::new(&regs);
        regs.c.port.poke(0xFF);

        gpio.init(Pin::PC3, Mode::Output).unwrap();
        assert_eq!(regs.c.ddr.value(), 0x08);
        assert_eq!(regs.c.port.value(), 0xF7);
        assert_eq!(gpio.mode(Pin::PC3), Ok(Mode::Output));
    }

    #[test]
    fn test_init_idempotent() {
        let regs = ports();
        let gpio = Gpio::new(&regs);

        gpio.init(Pin::PB5, Mode::Output).unwrap();
        gpio.set(Pin::PB5, Drive::High).unwrap();
        gpio.init(Pin::PB5, Mode::Output).unwrap();
        let (ddr, data) = (regs.b.ddr.value(), regs.b.port.value());

        gpio.init(Pin::PB5, Mode::Output).unwrap();
        assert_eq!(regs.b.ddr.value(), ddr);
        assert_eq!(regs.b.port.value(), data);
        assert_eq!(data & 0x20, 0);
    }

    #[test]
    fn test_get() {
        let regs = ports();
        let gpio = Gpio::new(&regs);
        regs.d.pin.poke(0b1000_0000);

        assert_eq!(gpio.get(Pin::PD7), Ok(Level::High));
        assert_eq!(gpio.get(Pin::PD6), Ok(Level::Low));
        // Port B is untouched by port D input
        assert_eq!(gpio.get(Pin::PB7), Ok(Level::Low));
    }

    #[test]
    fn test_set_on_input_is_mode_error() {
        let regs = ports();
        let gpio = Gpio::new(&regs);
        gpio.init(Pin::PD2, Mode::Input).unwrap();
        regs.d.port.reset_log();

        assert_eq!(gpio.set(Pin::PD2, Drive::High), Err(GpioError::Mode));
        assert_eq!(gpio.set(Pin::PD2, Drive::Toggle), Err(GpioError::Mode));
        assert_eq!(regs.d.port.writes(), 0);
        assert_eq!(regs.d.port.value() & 0x04, 0);
    }

    #[test]
    fn test_config_input() {
        let regs = ports();
        let gpio = Gpio::new(&regs);

        gpio.init(Pin::PB0, Mode::Input).unwrap();
        gpio.config_input(Pin::PB0, Pull::Enabled).unwrap();
        assert_eq!(regs.b.port.value(), 0x01);

        gpio.init(Pin::PB1, Mode::Output).unwrap();
        assert_eq!(gpio.config_input(Pin::PB1, Pull::Enabled), Err(GpioError::Mode));
    }

    #[test]
    fn test_missing_pin_touches_nothing() {
        let regs = ports();
        let gpio = Gpio::with_table(&regs, &PORT_C_ONLY);

        let err = gpio.init(Pin::PB0, Mode::Output).unwrap_err();
        assert_eq!(err, GpioError::Pin);
        assert_eq!(err.kind(), ErrorKind::Identifier);

        assert_eq!(gpio.get(Pin::PD4), Err(GpioError::Pin));
        assert_eq!(gpio.set(Pin::PD4, Drive::High), Err(GpioError::Pin));
        assert_eq!(gpio.config_input(Pin::PD4, Pull::Enabled), Err(GpioError::Pin));
        assert_eq!(gpio.mode(Pin::PD4), Err(GpioError::Pin));
        assert!(gpio.reg_ddr(Pin::PB1).is_err());
        assert!(gpio.reg_port(Pin::PB1).is_err());
        assert!(gpio.reg_pin(Pin::PB1).is_err());
        assert!(gpio.output(Pin::PB1).is_err());
        assert!(gpio.input(Pin::PB1, Pull::Enabled).is_err());

        assert_eq!(total_writes(&regs), 0);

        // Wired pins still work
        gpio.init(Pin::PC2, Mode::Output).unwrap();
        assert_eq!(regs.c.ddr.value(), 0x04);
    }

    #[test]
    fn test_identifier_checked_before_mode() {
        let regs = ports();
        let gpio = Gpio::with_table(&regs, &PORT_C_ONLY);

        // PB0 reads as input (DDR clear) but the missing pin wins
        assert_eq!(gpio.set(Pin::PB0, Drive::High), Err(GpioError::Pin));
    }

    #[test]
    fn test_register_lookup() {
        let regs = ports();
        let gpio = Gpio::new(&regs);

        assert!(core::ptr::eq(gpio.reg_ddr(Pin::PC0).unwrap(), &regs.c.ddr));
        assert!(core::ptr::eq(gpio.reg_port(Pin::PD1).unwrap(), &regs.d.port));
        assert!(core::ptr::eq(gpio.reg_pin(Pin::PB2).unwrap(), &regs.b.pin));
    }

    #[test]
    fn test_output_handle() {
        let regs = ports();
        let gpio = Gpio::new(&regs);
        let mut led = gpio.output(Pin::PB5).unwrap();
        assert_eq!(led.pin(), Pin::PB5);

        led.set_high().unwrap();
        assert!(led.is_set_high().unwrap());
        assert_eq!(regs.b.port.value(), 0x20);

        led.toggle().unwrap();
        assert!(led.is_set_low().unwrap());

        // Switching the pin to input underneath the handle
        gpio.init(Pin::PB5, Mode::Input).unwrap();
        assert_eq!(led.set_high(), Err(GpioError::Mode));
    }

    #[test]
    fn test_input_handle() {
        let regs = ports();
        let gpio = Gpio::new(&regs);
        let mut button = gpio.input(Pin::PD2, Pull::Enabled).unwrap();

        assert_eq!(regs.d.ddr.value() & 0x04, 0);
        assert_eq!(regs.d.port.value() & 0x04, 0x04);

        assert!(button.is_low().unwrap());
        regs.d.pin.poke(0x04);
        assert!(button.is_high().unwrap());

        button.set_pull(Pull::Disabled).unwrap();
        assert_eq!(regs.d.port.value() & 0x04, 0);
    }

    #[test]
    fn test_parse_pin_string() {
        assert_eq!(parse_pin_string("PC3"), Some(Pin::PC3));
        assert_eq!(parse_pin_string("pb0"), Some(Pin::PB0));
        assert_eq!(parse_pin_string(" PD7 "), Some(Pin::PD7));
        assert_eq!("PC6".parse::<Pin>(), Ok(Pin::PC6));

        // Invalid
        assert_eq!(parse_pin_string("PC7"), None);
        assert_eq!(parse_pin_string("PA0"), None);
        assert_eq!(parse_pin_string("PB8"), None);
        assert_eq!(parse_pin_string("PB10"), None);
        assert_eq!(parse_pin_string(""), None);
        assert_eq!("gpio3".parse::<Pin>(), Err(GpioError::Pin));
    }

    #[test]
    fn test_pin_from_raw() {
        assert_eq!(Pin::try_from(0), Ok(Pin::PB0));
        assert_eq!(Pin::try_from(11), Ok(Pin::PC3));
        assert_eq!(Pin::try_from(22), Ok(Pin::PD7));
        assert_eq!(Pin::try_from(23), Err(GpioError::Pin));

        for pin in Pin::ALL {
            assert_eq!(Pin::try_from(pin as u8), Ok(pin));
        }
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn set_only_touches_resolved_bit(raw in 0u8..23, drive in 0u8..3) {
                let regs = ports();
                let gpio = Gpio::new(&regs);
                let pin = Pin::try_from(raw).unwrap();
                let descriptor = *PIN_TABLE.resolve(pin).unwrap();

                gpio.init(pin, Mode::Output).unwrap();
                gpio.set(pin, Drive::try_from(drive).unwrap()).unwrap();

                for id in [PortId::B, PortId::C, PortId::D] {
                    let data = regs.port(id).port.value();
                    let ddr = regs.port(id).ddr.value();
                    if id == descriptor.port {
                        prop_assert_eq!(ddr, 1 << descriptor.bit);
                        prop_assert_eq!(data & !(1 << descriptor.bit), 0);
                    } else {
                        prop_assert_eq!(ddr, 0);
                        prop_assert_eq!(data, 0);
                    }
                }
            }
        }
    }
}
