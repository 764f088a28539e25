//! Compile-time configuration
//!
//! There is no runtime configuration: the clock and timer constants are
//! baked into the timer and PWM arithmetic. Boards with a different
//! crystal pass their own [`TimerProfile`](crate::TimerProfile).

/// CPU clock of the Devastator controller board (16 MHz crystal)
pub const CPU_CLOCK_HZ: u32 = 16_000_000;

/// Shortest periodic timer period in milliseconds
pub const PERIOD_MIN_MS: u16 = 1;

/// Longest periodic timer period in milliseconds
pub const PERIOD_MAX_MS: u16 = 1000;

/// Timer0 clock divider used for PWM
pub const PWM_PRESCALER: u32 = 64;

/// PWM carrier frequency in Hz
///
/// Phase-correct 8-bit PWM counts up and down (510 steps per cycle), so
/// the carrier is `F_CPU / (64 * 510) = F_CPU / 32640`.
pub const PWM_CARRIER_HZ: u32 = CPU_CLOCK_HZ / (PWM_PRESCALER * 510);
