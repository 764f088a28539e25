//! Peripheral singleton
//!
//! Hands out the memory-mapped register blocks exactly once, so only one
//! driver instance can own each block.

use portable_atomic::{AtomicBool, Ordering};

use crate::interrupt;
use crate::regs::{self, AdcRegisters, Mmio16, Mmio8, Ports, Timer0Registers, Timer1Registers};
use crate::timer::{PeriodicTimer, TimerProfile};

static TAKEN: AtomicBool = AtomicBool::new(false);

/// Register blocks of the on-chip peripherals
pub struct Peripherals {
    /// GPIO ports B, C and D
    pub ports: &'static Ports<Mmio8>,
    /// ADC
    pub adc: &'static AdcRegisters<Mmio8>,
    /// Timer/Counter0 (PWM)
    pub timer0: &'static Timer0Registers<Mmio8>,
    /// Timer/Counter1 (periodic interrupt), until taken by
    /// [`periodic_timer`](Self::periodic_timer)
    pub timer1: Option<&'static Timer1Registers<Mmio8, Mmio16>>,
}

impl Peripherals {
    /// Take the peripherals
    ///
    /// Returns `None` on every call after the first.
    pub fn take() -> Option<Self> {
        if TAKEN.swap(true, Ordering::AcqRel) {
            return None;
        }

        Some(Self {
            ports: &regs::PORTS,
            adc: &regs::ADC,
            timer0: &regs::TIMER0,
            timer1: Some(&regs::TIMER1),
        })
    }

    /// Periodic timer on Timer1, wired to the compare-match vector
    ///
    /// Takes the Timer1 block, so only the first call returns a timer.
    pub fn periodic_timer(
        &mut self,
        profile: TimerProfile,
    ) -> Option<PeriodicTimer<'static, Mmio8, Mmio16>> {
        let timer1 = self.timer1.take()?;
        Some(PeriodicTimer::new(timer1, &interrupt::TIMER1, profile))
    }
}
