//! Host-simulated registers
//!
//! Stand-ins for memory-mapped registers so drivers can be exercised on
//! the host. Each register counts the writes it receives and keeps the
//! first [`HISTORY_LEN`] written values, which lets tests assert both
//! "nothing was touched" and the exact write order.
//!
//! Hardware-owned flag bits (conversion complete, input pin state) are
//! modelled with [`SimRegister::hold`]: held bits always read as set no
//! matter what the driver writes. [`SimRegister::raise_after`] sets a flag
//! only once the driver has polled for it a given number of times.

use core::cell::{Cell, RefCell};

use heapless::Vec;

use crate::register::{Register, Register16};

/// Number of written values recorded per register
pub const HISTORY_LEN: usize = 32;

/// Simulated 8-bit register
#[derive(Debug, Default)]
pub struct SimRegister {
    value: Cell<u8>,
    held: Cell<u8>,
    /// Bits cleared by writing one
    clear_on_write: Cell<u8>,
    /// Flag bits to set and the reads left before they appear
    pending: Cell<Option<(u8, u32)>>,
    reads: Cell<u32>,
    writes: Cell<u32>,
    history: RefCell<Vec<u8, HISTORY_LEN>>,
}

impl SimRegister {
    /// Create a register with an initial value
    pub fn new(value: u8) -> Self {
        Self {
            value: Cell::new(value),
            ..Self::default()
        }
    }

    /// Set the stored value without counting a write
    ///
    /// Models the hardware changing the register on its own.
    pub fn poke(&self, value: u8) {
        self.value.set(value);
    }

    /// Force the bits in `mask` to read as set
    pub fn hold(&self, mask: u8) {
        self.held.set(self.held.get() | mask);
    }

    /// Stop forcing the bits in `mask`
    pub fn release(&self, mask: u8) {
        self.held.set(self.held.get() & !mask);
    }

    /// Set the bits in `mask` once `reads` more reads have seen them clear
    pub fn raise_after(&self, mask: u8, reads: u32) {
        self.pending.set(Some((mask, reads)));
    }

    /// Treat the bits in `mask` as flags that writing one clears
    pub fn clear_on_write(&self, mask: u8) {
        self.clear_on_write.set(self.clear_on_write.get() | mask);
    }

    /// Number of reads received
    pub fn reads(&self) -> u32 {
        self.reads.get()
    }

    /// Stored value, ignoring held bits
    pub fn value(&self) -> u8 {
        self.value.get()
    }

    /// Number of writes received
    pub fn writes(&self) -> u32 {
        self.writes.get()
    }

    /// Written values, oldest first
    pub fn history(&self) -> Vec<u8, HISTORY_LEN> {
        self.history.borrow().clone()
    }

    /// Forget the read and write counts and history, keeping the value
    pub fn reset_log(&self) {
        self.reads.set(0);
        self.writes.set(0);
        self.history.borrow_mut().clear();
    }
}

impl Register for SimRegister {
    fn read(&self) -> u8 {
        self.reads.set(self.reads.get() + 1);
        match self.pending.get() {
            Some((mask, 0)) => {
                self.value.set(self.value.get() | mask);
                self.pending.set(None);
            }
            Some((mask, left)) => self.pending.set(Some((mask, left - 1))),
            None => {}
        }
        self.value.get() | self.held.get()
    }

    fn write(&self, value: u8) {
        let flags = self.clear_on_write.get();
        let kept = self.value.get() & flags & !value;
        self.value.set((value & !flags) | kept);
        self.writes.set(self.writes.get() + 1);
        // Only the first HISTORY_LEN writes are kept
        let _ = self.history.borrow_mut().push(value);
    }
}

/// Simulated 16-bit register
#[derive(Debug, Default)]
pub struct SimRegister16 {
    value: Cell<u16>,
    writes: Cell<u32>,
}

impl SimRegister16 {
    /// Create a register with an initial value
    pub fn new(value: u16) -> Self {
        Self {
            value: Cell::new(value),
            writes: Cell::new(0),
        }
    }

    /// Set the stored value without counting a write
    ///
    /// Models a free-running counter advancing.
    pub fn poke(&self, value: u16) {
        self.value.set(value);
    }

    /// Number of writes received
    pub fn writes(&self) -> u32 {
        self.writes.get()
    }

    /// Forget the write count, keeping the value
    pub fn reset_log(&self) {
        self.writes.set(0);
    }
}

impl Register16 for SimRegister16 {
    fn read(&self) -> u16 {
        self.value.get()
    }

    fn write(&self, value: u16) {
        self.value.set(value);
        self.writes.set(self.writes.get() + 1);
    }
}
