//! ATmega328P-specific HAL for the Devastator tank firmware
//!
//! This crate instantiates the `devastator-hal` primitives for the
//! ATmega328P:
//! - Register map and memory-mapped register access
//! - Pin table and digital I/O driver
//! - ADC channel table and one-shot conversions
//! - Timer0 phase-correct PWM on two channels
//! - Timer1 periodic compare-match interrupt with a registered callback
//! - Take-once peripheral singleton
//!
//! Every driver is generic over the register type, so the same code runs
//! against memory-mapped registers on the target and against
//! `devastator_hal::sim` registers in host tests.

#![no_std]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

// This must go first so the logging macros are visible to every module
#[macro_use]
mod fmt;

pub mod adc;
pub mod config;
pub mod gpio;
pub mod interrupt;
pub mod peripherals;
pub mod pwm;
pub mod regs;
pub mod timer;

pub use adc::{Adc, AdcChannel, AdcError};
pub use gpio::{Gpio, InputPin, OutputPin, Pin};
pub use peripherals::Peripherals;
pub use pwm::{Pwm, PwmChannel, PwmError, PwmOutput};
pub use timer::{
    Callback, PeriodicTimer, Prescaler, TimerBinding, TimerError, TimerProfile, TimerState,
};
