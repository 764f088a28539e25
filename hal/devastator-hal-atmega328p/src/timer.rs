//! Periodic timer interrupt
//!
//! Timer/Counter1 runs in CTC mode: the counter counts up to `OCR1A`,
//! raises the compare-match A interrupt and restarts from zero. The
//! interrupt vector invokes the callback registered through
//! [`PeriodicTimer::init`].
//!
//! # States
//!
//! ```text
//! Uninitialized ──init──▶ Configured ──start/restart──▶ Armed
//!                            ▲                            │
//!                            └───────────stop─────────────┘
//! ```
//!
//! # Interrupt context
//!
//! The callback is reached through a [`TimerBinding`], a `static` slot that
//! `init` writes and the interrupt vector reads. The binding also records
//! whether Timer1 is armed, and `init` is rejected while it is, through any
//! handle on the same binding. The slot therefore never changes while the
//! interrupt can fire. The handler touches no timer register; it only
//! invokes the callback.
//!
//! The callback runs in interrupt context with interrupts disabled. It must
//! not block and must not call back into timer configuration.
//!
//! # Overruns
//!
//! If the callback runs longer than the period, the next compare match
//! sets the `OCF1A` flag while the handler is still running. The flag is
//! latched once, so that match is *delayed*: the handler runs again as soon
//! as the current invocation returns. Any further matches during the same
//! window set an already-set flag and are *missed*.

use core::cell::Cell;

use devastator_hal::{bv, ErrorKind, HalError, Register, Register16};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::config::{CPU_CLOCK_HZ, PERIOD_MAX_MS, PERIOD_MIN_MS};
use crate::regs::{Timer1Registers, CS10, CS11, CS12, OCF1A, OCIE1A, WGM12};

/// Procedure invoked on every compare match
pub type Callback = fn();

/// Errors from timer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerError {
    /// Period outside the supported range
    Period,
    /// No callback supplied
    Callback,
    /// Timer is armed; stop it before reconfiguring
    Armed,
}

impl HalError for TimerError {
    fn kind(&self) -> ErrorKind {
        match self {
            TimerError::Period => ErrorKind::Period,
            TimerError::Callback => ErrorKind::Callback,
            TimerError::Armed => ErrorKind::Mode,
        }
    }
}

/// Timer1 clock prescaler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Prescaler {
    Div1,
    Div8,
    Div64,
    Div256,
    Div1024,
}

impl Prescaler {
    /// Clock divisor
    pub const fn divisor(self) -> u32 {
        match self {
            Prescaler::Div1 => 1,
            Prescaler::Div8 => 8,
            Prescaler::Div64 => 64,
            Prescaler::Div256 => 256,
            Prescaler::Div1024 => 1024,
        }
    }

    /// Clock select bits (`CS12:CS10`) of `TCCR1B`
    pub const fn clock_select(self) -> u8 {
        match self {
            Prescaler::Div1 => bv(CS10),
            Prescaler::Div8 => bv(CS11),
            Prescaler::Div64 => bv(CS11) | bv(CS10),
            Prescaler::Div256 => bv(CS12),
            Prescaler::Div1024 => bv(CS12) | bv(CS10),
        }
    }
}

/// Clock rate and prescaler the compare value is derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerProfile {
    /// CPU clock in Hz
    pub clock_hz: u32,
    /// Timer1 prescaler
    pub prescaler: Prescaler,
}

impl TimerProfile {
    /// Devastator controller: 16 MHz crystal, /256 prescaler
    pub const ATMEGA328P_16MHZ: Self = Self {
        clock_hz: CPU_CLOCK_HZ,
        prescaler: Prescaler::Div256,
    };

    /// Compare register value for a period in milliseconds
    ///
    /// `clock / prescaler * period / 1000 - 1`, multiplying by the period
    /// before dividing by 1000 so short periods keep their precision.
    /// Returns `None` when the result does not fit the 16-bit register.
    pub const fn compare_value(&self, period_ms: u16) -> Option<u16> {
        let ticks_per_s = (self.clock_hz / self.prescaler.divisor()) as u64;
        let ticks = ticks_per_s * period_ms as u64 / 1000;

        if ticks == 0 || ticks - 1 > u16::MAX as u64 {
            None
        } else {
            Some((ticks - 1) as u16)
        }
    }

    /// `TCCR1B` value that runs the timer: CTC mode plus clock select
    pub const fn control(&self) -> u8 {
        bv(WGM12) | self.prescaler.clock_select()
    }
}

impl Default for TimerProfile {
    fn default() -> Self {
        Self::ATMEGA328P_16MHZ
    }
}

struct Slot {
    callback: Cell<Option<Callback>>,
    armed: Cell<bool>,
}

/// Slot through which the interrupt vector reaches the callback
///
/// Shared by every [`PeriodicTimer`] handle on the same timer, so it also
/// carries the armed state.
pub struct TimerBinding {
    slot: Mutex<CriticalSectionRawMutex, Slot>,
}

impl Default for TimerBinding {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerBinding {
    /// Create an empty binding
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                callback: Cell::new(None),
                armed: Cell::new(false),
            }),
        }
    }

    /// Replace the callback unless the timer is armed
    fn bind(&self, callback: Callback) -> Result<(), TimerError> {
        self.slot.lock(|slot| {
            if slot.armed.get() {
                return Err(TimerError::Armed);
            }
            slot.callback.set(Some(callback));
            Ok(())
        })
    }

    fn set_armed(&self, armed: bool) {
        self.slot.lock(|slot| slot.armed.set(armed));
    }

    /// Check if a callback has been bound
    pub fn is_bound(&self) -> bool {
        self.slot.lock(|slot| slot.callback.get().is_some())
    }

    /// Check if the timer behind this binding is counting
    pub fn is_armed(&self) -> bool {
        self.slot.lock(|slot| slot.armed.get())
    }

    /// Invoke the bound callback
    ///
    /// Called from the compare-match interrupt vector. Does nothing while no
    /// callback is bound.
    #[inline]
    pub fn fire(&self) {
        if let Some(callback) = self.slot.lock(|slot| slot.callback.get()) {
            callback();
        }
    }
}

/// Timer lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerState {
    /// No period or callback configured
    Uninitialized,
    /// Configured, counter stopped
    Configured,
    /// Counting, interrupt enabled
    Armed,
}

#[derive(Debug, Clone, Copy)]
struct TimerConfig {
    /// `TCCR1B` template written by start
    control: u8,
    compare: u16,
}

/// Periodic compare-match timer
pub struct PeriodicTimer<'a, R, W> {
    regs: &'a Timer1Registers<R, W>,
    binding: &'a TimerBinding,
    profile: TimerProfile,
    config: Option<TimerConfig>,
}

impl<'a, R: Register, W: Register16> PeriodicTimer<'a, R, W> {
    /// Create an unconfigured timer
    pub fn new(
        regs: &'a Timer1Registers<R, W>,
        binding: &'a TimerBinding,
        profile: TimerProfile,
    ) -> Self {
        Self {
            regs,
            binding,
            profile,
            config: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> TimerState {
        match (self.config, self.is_armed()) {
            (None, _) => TimerState::Uninitialized,
            (Some(_), false) => TimerState::Configured,
            (Some(_), true) => TimerState::Armed,
        }
    }

    /// Check if the timer is counting
    pub fn is_armed(&self) -> bool {
        self.binding.is_armed()
    }

    /// Programmed compare value, once configured
    pub fn compare(&self) -> Option<u16> {
        self.config.map(|config| config.compare)
    }

    /// Clock profile this timer computes periods with
    pub fn profile(&self) -> TimerProfile {
        self.profile
    }

    /// Configure the period and callback
    ///
    /// Does not start counting. Fails with [`TimerError::Armed`] while the
    /// timer runs, [`TimerError::Period`] for periods outside
    /// `PERIOD_MIN_MS..=PERIOD_MAX_MS` (or too long for the profile), and
    /// [`TimerError::Callback`] without a callback. Nothing is written on
    /// failure.
    pub fn init(&mut self, period_ms: u16, callback: Option<Callback>) -> Result<(), TimerError> {
        if self.is_armed() {
            warn!("timer: init while armed");
            return Err(TimerError::Armed);
        }

        if !(PERIOD_MIN_MS..=PERIOD_MAX_MS).contains(&period_ms) {
            return Err(TimerError::Period);
        }

        let callback = callback.ok_or(TimerError::Callback)?;

        let compare = self
            .profile
            .compare_value(period_ms)
            .ok_or(TimerError::Period)?;

        critical_section::with(|_| {
            self.binding
                .bind(callback)
                .map(|()| self.regs.ocr1a.write(compare))
        })?;
        self.config = Some(TimerConfig {
            control: self.profile.control(),
            compare,
        });

        debug!("timer: {} ms period, compare {}", period_ms, compare);
        Ok(())
    }

    /// Enable the compare interrupt and start counting
    ///
    /// Calling it while armed rewrites the same configuration. Does nothing
    /// before a successful [`init`](Self::init).
    pub fn start(&mut self) {
        let Some(config) = self.config else {
            warn!("timer: start before init");
            return;
        };

        critical_section::with(|_| self.arm(config));
    }

    /// Stop counting and reset the counter
    ///
    /// A compare match still pending is discarded, so the next start
    /// begins a full period. A callback already running is not interrupted.
    pub fn stop(&mut self) {
        critical_section::with(|_| self.halt());
    }

    /// Stop, reset the counter and start again as one operation
    pub fn restart(&mut self) {
        let config = self.config;

        critical_section::with(|_| {
            self.halt();
            if let Some(config) = config {
                self.arm(config);
            }
        });

        if config.is_none() {
            warn!("timer: restart before init");
        }
    }

    fn arm(&self, config: TimerConfig) {
        self.regs.timsk1.set_bit(OCIE1A);
        self.regs.tccr1b.write(config.control);
        self.binding.set_armed(true);
    }

    fn halt(&self) {
        self.regs.tccr1b.write(0);
        self.regs.tcnt1.write(0);
        self.regs.tifr1.write(bv(OCF1A));
        self.binding.set_armed(false);
    }
}
