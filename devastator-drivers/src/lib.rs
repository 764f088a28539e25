//! Hardware driver implementations
//!
//! Drivers for external components wired to the controller, written
//! against the `embedded-hal` traits so they run on any HAL:
//!
//! - Motor drivers (L298 dual full-bridge)

#![no_std]
#![deny(unsafe_code)]

pub mod motor;
