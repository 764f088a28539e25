//! Register access abstractions
//!
//! All hardware coupling goes through these two traits. Chip crates
//! implement them for memory-mapped registers; the `sim` module implements
//! them for host tests.
//!
//! Methods take `&self` because a hardware register is shared, mutable
//! state by nature. Read-modify-write helpers are not atomic with respect
//! to interrupts; callers that share a register with an interrupt handler
//! must wrap the access in a critical section.

/// Bit value: `1 << bit`
#[inline(always)]
pub const fn bv(bit: u8) -> u8 {
    1 << bit
}

/// 8-bit hardware register
pub trait Register {
    /// Read the current register value
    fn read(&self) -> u8;

    /// Write a new register value
    fn write(&self, value: u8);

    /// Read, transform, and write back the register value
    #[inline]
    fn modify<F>(&self, f: F)
    where
        F: FnOnce(u8) -> u8,
    {
        self.write(f(self.read()));
    }

    /// Set every bit in `mask`
    #[inline]
    fn set_bits(&self, mask: u8) {
        self.modify(|v| v | mask);
    }

    /// Clear every bit in `mask`
    #[inline]
    fn clear_bits(&self, mask: u8) {
        self.modify(|v| v & !mask);
    }

    /// Toggle every bit in `mask`
    #[inline]
    fn toggle_bits(&self, mask: u8) {
        self.modify(|v| v ^ mask);
    }

    /// Set a single bit
    #[inline]
    fn set_bit(&self, bit: u8) {
        self.set_bits(bv(bit));
    }

    /// Clear a single bit
    #[inline]
    fn clear_bit(&self, bit: u8) {
        self.clear_bits(bv(bit));
    }

    /// Toggle a single bit
    #[inline]
    fn toggle_bit(&self, bit: u8) {
        self.toggle_bits(bv(bit));
    }

    /// Check whether a single bit is set
    #[inline]
    fn test_bit(&self, bit: u8) -> bool {
        self.read() & bv(bit) != 0
    }
}

/// 16-bit hardware register (timer counter and compare registers)
pub trait Register16 {
    /// Read the current register value
    fn read(&self) -> u16;

    /// Write a new register value
    fn write(&self, value: u16);
}

impl<R: Register + ?Sized> Register for &R {
    fn read(&self) -> u8 {
        (**self).read()
    }

    fn write(&self, value: u8) {
        (**self).write(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimRegister;

    #[test]
    fn test_bv() {
        assert_eq!(bv(0), 0x01);
        assert_eq!(bv(3), 0x08);
        assert_eq!(bv(7), 0x80);
    }

    #[test]
    fn test_bit_operations() {
        let reg = SimRegister::new(0b1010_0000);

        reg.set_bit(0);
        assert_eq!(reg.read(), 0b1010_0001);

        reg.clear_bit(7);
        assert_eq!(reg.read(), 0b0010_0001);

        reg.toggle_bit(5);
        assert_eq!(reg.read(), 0b0000_0001);
        reg.toggle_bit(5);
        assert_eq!(reg.read(), 0b0010_0001);

        assert!(reg.test_bit(0));
        assert!(!reg.test_bit(1));
    }

    #[test]
    fn test_mask_operations() {
        let reg = SimRegister::new(0x0F);

        reg.clear_bits(0x03);
        assert_eq!(reg.read(), 0x0C);

        reg.set_bits(0xC0);
        assert_eq!(reg.read(), 0xCC);

        reg.toggle_bits(0xFF);
        assert_eq!(reg.read(), 0x33);
    }

    #[test]
    fn test_every_modify_is_one_write() {
        let reg = SimRegister::new(0);

        reg.set_bit(1);
        reg.clear_bit(1);
        reg.toggle_bit(2);
        assert_eq!(reg.writes(), 3);

        // Tests never write
        let _ = reg.test_bit(2);
        assert_eq!(reg.writes(), 3);
    }
}
