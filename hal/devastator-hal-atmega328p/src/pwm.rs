//! Timer0 PWM outputs
//!
//! Two independent 8-bit duty-cycle outputs generated by Timer/Counter0 in
//! phase-correct mode:
//!
//! | Channel | Compare register | Pin |
//! |---------|------------------|-----|
//! | `Ch0`   | `OCR0B`          | PD5 |
//! | `Ch1`   | `OCR0A`          | PD6 |
//!
//! Duty 0 keeps the output low, 255 keeps it high, and values in between
//! map linearly onto the on-time of the carrier
//! ([`PWM_CARRIER_HZ`](crate::config::PWM_CARRIER_HZ)).

use core::convert::Infallible;

use devastator_hal::{bv, ErrorKind, HalError, Register};

use crate::regs::{
    Ports, Timer0Registers, COM0A1, COM0B1, CS00, CS01, DDD5, DDD6, OCIE0A, OCIE0B, TOIE0, WGM00,
};

/// Errors from PWM operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmError {
    /// Not a PWM output channel
    Output,
}

impl HalError for PwmError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Identifier
    }
}

/// PWM output channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmChannel {
    /// OC0B on PD5
    Ch0,
    /// OC0A on PD6
    Ch1,
}

impl TryFrom<u8> for PwmChannel {
    type Error = PwmError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(PwmChannel::Ch0),
            1 => Ok(PwmChannel::Ch1),
            _ => Err(PwmError::Output),
        }
    }
}

/// Timer0 PWM driver
pub struct Pwm<'a, R> {
    regs: &'a Timer0Registers<R>,
}

impl<R> Clone for Pwm<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Pwm<'_, R> {}

impl<'a, R: Register> Pwm<'a, R> {
    /// Configure Timer0 for PWM and drive both outputs at zero duty
    ///
    /// Sets non-inverting compare output on both channels in phase-correct
    /// mode, disables all Timer0 interrupts, makes PD5/PD6 outputs and
    /// starts the timer at clk/64.
    pub fn new(regs: &'a Timer0Registers<R>, ports: &Ports<R>) -> Self {
        regs.tccr0a
            .set_bits(bv(COM0A1) | bv(COM0B1) | bv(WGM00));
        regs.timsk0
            .clear_bits(bv(OCIE0B) | bv(OCIE0A) | bv(TOIE0));
        regs.tcnt0.write(0);
        regs.ocr0a.write(0);
        regs.ocr0b.write(0);
        ports.d.ddr.set_bits(bv(DDD6) | bv(DDD5));
        regs.tccr0b.set_bits(bv(CS01) | bv(CS00));

        debug!("pwm: timer0 running");
        Self { regs }
    }

    fn compare(&self, channel: PwmChannel) -> &'a R {
        match channel {
            PwmChannel::Ch0 => &self.regs.ocr0b,
            PwmChannel::Ch1 => &self.regs.ocr0a,
        }
    }

    /// Set the duty cycle of a channel (0 = off, 255 = fully on)
    pub fn set(&self, channel: PwmChannel, duty: u8) {
        trace!("pwm: {:?} duty {}", channel, duty);
        self.compare(channel).write(duty);
    }

    /// Get the programmed duty cycle of a channel
    pub fn duty(&self, channel: PwmChannel) -> u8 {
        self.compare(channel).read()
    }

    /// Take a handle to one channel
    pub fn channel(&self, channel: PwmChannel) -> PwmOutput<'a, R> {
        PwmOutput { pwm: *self, channel }
    }
}

/// Handle to a single PWM channel
pub struct PwmOutput<'a, R> {
    pwm: Pwm<'a, R>,
    channel: PwmChannel,
}

impl<R: Register> PwmOutput<'_, R> {
    /// Channel behind this handle
    pub fn channel(&self) -> PwmChannel {
        self.channel
    }

    /// Programmed duty cycle
    pub fn duty(&self) -> u8 {
        self.pwm.duty(self.channel)
    }
}

impl<R: Register> embedded_hal::pwm::ErrorType for PwmOutput<'_, R> {
    type Error = Infallible;
}

impl<R: Register> embedded_hal::pwm::SetDutyCycle for PwmOutput<'_, R> {
    fn max_duty_cycle(&self) -> u16 {
        u8::MAX as u16
    }

    /// Duty values above 255 are clamped to fully on
    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let duty = duty.min(u8::MAX as u16) as u8;
        self.pwm.set(self.channel, duty);
        Ok(())
    }
}
