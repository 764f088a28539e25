//! L298 dual full-bridge DC motor driver
//!
//! Each bridge drives one brushed DC motor. Two inputs select the rotation
//! direction and the bridge enable, fed from a PWM output, sets the speed:
//!
//! | Speed | IN1  | IN2  | Motor              |
//! |-------|------|------|--------------------|
//! | > 0   | high | low  | forward            |
//! | < 0   | low  | high | reverse            |
//! | 0     | low  | low  | fast stop (braked) |
//!
//! Speeds run from `-SPEED_MAX` to `SPEED_MAX`. The magnitude indexes
//! [`SPEED_DUTY`], which starts at 10% duty so the lowest step still
//! overcomes static friction of the tank tracks.
//!
//! # Usage
//!
//! ```ignore
//! let bridge_a = Bridge::new(gpio.output(Pin::PC2)?, gpio.output(Pin::PC3)?, pwm.channel(PwmChannel::Ch0));
//! let bridge_b = Bridge::new(gpio.output(Pin::PC4)?, gpio.output(Pin::PC5)?, pwm.channel(PwmChannel::Ch1));
//! let mut tank = L298::new(bridge_a, bridge_b);
//!
//! tank.set(Motor::A, 5)?;  // half speed forward
//! tank.set(Motor::B, -5)?; // half speed reverse: turn on the spot
//! ```

use devastator_hal::{ErrorKind, HalError};
use embedded_hal::digital::{self, Error as _, OutputPin, PinState};
use embedded_hal::pwm::{self, Error as _, SetDutyCycle};

/// Largest speed magnitude
pub const SPEED_MAX: u8 = 10;

/// Enable duty cycle (0-255) per speed magnitude
///
/// Entry 0 holds the enable fully on; with both inputs low that brakes
/// the motor instead of letting it coast.
pub const SPEED_DUTY: [u8; SPEED_MAX as usize + 1] =
    [255, 25, 50, 75, 100, 125, 150, 175, 200, 225, 255];

/// Errors from motor operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// Not a motor output of this driver
    Motor,
    /// Speed magnitude above [`SPEED_MAX`]
    Speed,
    /// Direction input could not be driven
    Pin(digital::ErrorKind),
    /// Enable duty cycle could not be set
    Duty(pwm::ErrorKind),
}

impl HalError for MotorError {
    fn kind(&self) -> ErrorKind {
        match self {
            MotorError::Motor => ErrorKind::Identifier,
            MotorError::Speed => ErrorKind::Value,
            MotorError::Pin(_) => ErrorKind::Mode,
            MotorError::Duty(_) => ErrorKind::Value,
        }
    }
}

/// Motor output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Motor {
    /// Bridge A (IN1/IN2, ENA)
    A,
    /// Bridge B (IN3/IN4, ENB)
    B,
}

impl TryFrom<u8> for Motor {
    type Error = MotorError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Motor::A),
            1 => Ok(Motor::B),
            _ => Err(MotorError::Motor),
        }
    }
}

/// Input levels (IN1, IN2) for a signed speed
pub fn direction(speed: i8) -> (PinState, PinState) {
    match speed {
        s if s > 0 => (PinState::High, PinState::Low),
        s if s < 0 => (PinState::Low, PinState::High),
        _ => (PinState::Low, PinState::Low),
    }
}

/// Enable duty cycle for a signed speed, `None` if out of range
pub fn duty(speed: i8) -> Option<u8> {
    SPEED_DUTY.get(speed.unsigned_abs() as usize).copied()
}

/// One full bridge: two direction inputs and the enable
pub struct Bridge<P, E> {
    /// IN1 (IN3 on bridge B)
    pub in1: P,
    /// IN2 (IN4 on bridge B)
    pub in2: P,
    /// ENA (ENB on bridge B)
    pub enable: E,
}

impl<P: OutputPin, E: SetDutyCycle> Bridge<P, E> {
    /// Create a bridge from its inputs and enable
    ///
    /// The pins must already be configured as outputs.
    pub fn new(in1: P, in2: P, enable: E) -> Self {
        Self { in1, in2, enable }
    }

    /// Drive the inputs, then the enable
    fn drive(&mut self, speed: i8, duty: u8) -> Result<(), MotorError> {
        let (in1, in2) = direction(speed);

        self.in1
            .set_state(in1)
            .map_err(|e| MotorError::Pin(e.kind()))?;
        self.in2
            .set_state(in2)
            .map_err(|e| MotorError::Pin(e.kind()))?;
        self.enable
            .set_duty_cycle_fraction(duty as u16, u8::MAX as u16)
            .map_err(|e| MotorError::Duty(e.kind()))
    }
}

/// L298 driver for two motors
pub struct L298<P, E> {
    a: Bridge<P, E>,
    b: Bridge<P, E>,
    /// Last speed applied per motor
    speed: [i8; 2],
}

impl<P: OutputPin, E: SetDutyCycle> L298<P, E> {
    /// Create a driver from the two bridges
    pub fn new(a: Bridge<P, E>, b: Bridge<P, E>) -> Self {
        Self {
            a,
            b,
            speed: [0; 2],
        }
    }

    /// Set the speed of one motor
    ///
    /// The sign selects the direction, the magnitude (at most
    /// [`SPEED_MAX`]) the enable duty cycle. An out-of-range speed is
    /// rejected before any output changes.
    pub fn set(&mut self, motor: Motor, speed: i8) -> Result<(), MotorError> {
        let duty = duty(speed).ok_or(MotorError::Speed)?;

        self.bridge_mut(motor).drive(speed, duty)?;
        self.speed[motor as usize] = speed;
        Ok(())
    }

    /// Brake both motors
    pub fn stop(&mut self) -> Result<(), MotorError> {
        self.set(Motor::A, 0)?;
        self.set(Motor::B, 0)
    }

    /// Last speed applied to a motor
    pub fn speed(&self, motor: Motor) -> i8 {
        self.speed[motor as usize]
    }

    /// Bridge of a motor
    pub fn bridge(&self, motor: Motor) -> &Bridge<P, E> {
        match motor {
            Motor::A => &self.a,
            Motor::B => &self.b,
        }
    }

    fn bridge_mut(&mut self, motor: Motor) -> &mut Bridge<P, E> {
        match motor {
            Motor::A => &mut self.a,
            Motor::B => &mut self.b,
        }
    }

    /// Release the bridges
    pub fn release(self) -> (Bridge<P, E>, Bridge<P, E>) {
        (self.a, self.b)
    }
}
