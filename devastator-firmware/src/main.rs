//! Devastator - Tank Controller Firmware
//!
//! Firmware for the ATmega328P controller of a DFRobot Devastator tank
//! chassis. Brings up the L298 motor bridges with both tracks braked and
//! blinks the status LED from the periodic timer interrupt.

#![no_std]
#![no_main]

use core::convert::Infallible;

use embedded_hal::digital::StatefulOutputPin;
use panic_halt as _;
use portable_atomic::{AtomicBool, Ordering};

use devastator_drivers::motor::{Bridge, MotorError, L298};
use devastator_hal::GpioError;
use devastator_hal_atmega328p::{
    Gpio, Peripherals, Pin, Pwm, PwmChannel, TimerError, TimerProfile,
};

/// Status LED (Arduino D13)
const LED: Pin = Pin::PB5;

/// Status LED blink half-period
const HEARTBEAT_MS: u16 = 500;

/// Set by the timer interrupt, consumed by the main loop
static TICK: AtomicBool = AtomicBool::new(false);

fn on_tick() {
    TICK.store(true, Ordering::Release);
}

/// Bring-up failures
///
/// Payloads are only read from a debugger after the halt.
#[derive(Debug)]
#[allow(dead_code)]
enum Fault {
    Gpio(GpioError),
    Motor(MotorError),
    Timer(TimerError),
}

impl From<GpioError> for Fault {
    fn from(e: GpioError) -> Self {
        Fault::Gpio(e)
    }
}

impl From<MotorError> for Fault {
    fn from(e: MotorError) -> Self {
        Fault::Motor(e)
    }
}

impl From<TimerError> for Fault {
    fn from(e: TimerError) -> Self {
        Fault::Timer(e)
    }
}

#[avr_device::entry]
fn main() -> ! {
    match run() {
        Ok(never) => match never {},
        Err(_fault) => halt(),
    }
}

fn run() -> Result<Infallible, Fault> {
    let Some(mut p) = Peripherals::take() else {
        halt();
    };

    let gpio = Gpio::new(p.ports);
    let pwm = Pwm::new(p.timer0, p.ports);

    // IN1/IN2 on PC2/PC3 with ENA on OC0B, IN3/IN4 on PC4/PC5 with ENB on OC0A
    let mut tank = L298::new(
        Bridge::new(
            gpio.output(Pin::PC2)?,
            gpio.output(Pin::PC3)?,
            pwm.channel(PwmChannel::Ch0),
        ),
        Bridge::new(
            gpio.output(Pin::PC4)?,
            gpio.output(Pin::PC5)?,
            pwm.channel(PwmChannel::Ch1),
        ),
    );
    tank.stop()?;

    let mut led = gpio.output(LED)?;

    let Some(mut timer) = p.periodic_timer(TimerProfile::ATMEGA328P_16MHZ) else {
        halt();
    };
    timer.init(HEARTBEAT_MS, Some(on_tick))?;
    timer.start();

    // SAFETY: every peripheral the interrupt handler reaches is set up
    unsafe { avr_device::interrupt::enable() };

    loop {
        if TICK.swap(false, Ordering::Acquire) {
            led.toggle()?;
        }
    }
}

fn halt() -> ! {
    avr_device::interrupt::disable();
    loop {
        core::hint::spin_loop();
    }
}
