//! Motor driver implementations
//!
//! - L298: two brushed DC motors, direction on two GPIO inputs per bridge
//!   and speed on the bridge enable via PWM

pub mod l298;

pub use l298::{Bridge, Motor, MotorError, L298, SPEED_DUTY, SPEED_MAX};
