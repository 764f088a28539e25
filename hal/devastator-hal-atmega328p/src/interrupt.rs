//! Interrupt vectors
//!
//! Only the Timer1 compare-match A vector is used. It hands off to the
//! callback bound in [`TIMER1`] and touches no register itself; the
//! hardware clears `OCF1A` on vector entry.

use crate::timer::TimerBinding;

/// Callback slot of the Timer1 compare-match A vector
///
/// Pass this to [`PeriodicTimer::new`](crate::PeriodicTimer::new) together
/// with the Timer1 registers.
pub static TIMER1: TimerBinding = TimerBinding::new();

#[cfg(target_arch = "avr")]
#[avr_device::interrupt(atmega328p)]
fn TIMER1_COMPA() {
    TIMER1.fire();
}
