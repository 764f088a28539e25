//! Devastator Hardware Abstraction Layer
//!
//! This crate holds the chip-agnostic half of the HAL: the narrow register
//! interface every peripheral driver is written against, the compile-time
//! resource tables that map logical identifiers onto physical registers,
//! and the value types and error taxonomy shared by all drivers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (devastator-firmware)      │
//! └─────────────────────────────────────────┘
//!          │                      │
//!          ▼                      ▼
//! ┌──────────────────┐   ┌──────────────────┐
//! │ devastator-      │   │ devastator-hal-  │
//! │ drivers (L298)   │──▶│ atmega328p       │
//! └──────────────────┘   └──────────────────┘
//!                                 │
//!                                 ▼
//! ┌─────────────────────────────────────────┐
//! │  devastator-hal (this crate)            │
//! │  Register / ResourceTable / errors      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`register`] - [`Register`] / [`Register16`] read-modify-write access
//! - [`table`] - [`ResourceTable`] identifier resolution
//! - [`gpio`] - digital I/O value types and port register access
//! - [`error`] - uniform [`ErrorKind`] taxonomy
//! - `sim` - host-simulated registers (feature `sim`)

#![no_std]
#![deny(unsafe_code)]

pub mod error;
pub mod gpio;
pub mod register;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
pub mod table;

// Re-export key types at crate root for convenience
pub use error::{ErrorKind, HalError};
pub use gpio::{Drive, GpioError, Level, Mode, PortRegisters, Pull};
pub use register::{bv, Register, Register16};
pub use table::{NotFound, ResourceTable};
