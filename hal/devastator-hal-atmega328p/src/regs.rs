//! ATmega328P register map
//!
//! Data-space addresses and bit positions from the ATmega328P datasheet,
//! grouped into the register blocks each driver operates on. The
//! memory-mapped blocks are `static` and handed out once through
//! [`Peripherals::take`](crate::Peripherals::take).

use core::ptr::{read_volatile, write_volatile};

use devastator_hal::{PortRegisters, Register, Register16};

/// Memory-mapped 8-bit register
#[derive(Debug)]
pub struct Mmio8 {
    addr: usize,
}

impl Mmio8 {
    /// Create a register handle for a data-space address
    ///
    /// # Safety
    /// `addr` must be the data-space address of an 8-bit I/O register.
    pub const unsafe fn new(addr: usize) -> Self {
        Self { addr }
    }

    /// Data-space address of this register
    pub const fn addr(&self) -> usize {
        self.addr
    }
}

impl Register for Mmio8 {
    #[inline(always)]
    fn read(&self) -> u8 {
        // SAFETY: address validated at construction
        unsafe { read_volatile(self.addr as *const u8) }
    }

    #[inline(always)]
    fn write(&self, value: u8) {
        // SAFETY: address validated at construction
        unsafe { write_volatile(self.addr as *mut u8, value) }
    }
}

/// Memory-mapped 16-bit timer register
///
/// 16-bit timer registers share one TEMP latch: the high byte must be
/// written first and the low byte read first. Callers that may race with an
/// interrupt handler touching any 16-bit timer register must hold a
/// critical section.
#[derive(Debug)]
pub struct Mmio16 {
    addr: usize,
}

impl Mmio16 {
    /// Create a register handle for the low-byte data-space address
    ///
    /// # Safety
    /// `addr` must be the low-byte address of a 16-bit timer register.
    pub const unsafe fn new(addr: usize) -> Self {
        Self { addr }
    }

    /// Data-space address of the low byte
    pub const fn addr(&self) -> usize {
        self.addr
    }
}

impl Register16 for Mmio16 {
    #[inline(always)]
    fn read(&self) -> u16 {
        // SAFETY: address validated at construction
        unsafe {
            let lo = read_volatile(self.addr as *const u8);
            let hi = read_volatile((self.addr + 1) as *const u8);
            u16::from_le_bytes([lo, hi])
        }
    }

    #[inline(always)]
    fn write(&self, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        // SAFETY: address validated at construction
        unsafe {
            write_volatile((self.addr + 1) as *mut u8, hi);
            write_volatile(self.addr as *mut u8, lo);
        }
    }
}

// Register blocks

/// GPIO ports B, C and D
#[derive(Debug)]
pub struct Ports<R> {
    pub b: PortRegisters<R>,
    pub c: PortRegisters<R>,
    pub d: PortRegisters<R>,
}

/// ADC registers
#[derive(Debug)]
pub struct AdcRegisters<R> {
    /// Multiplexer selection (`ADMUX`)
    pub admux: R,
    /// Control and status A (`ADCSRA`)
    pub adcsra: R,
    /// Result high byte (`ADCH`)
    pub adch: R,
}

/// Timer/Counter0 registers (PWM)
#[derive(Debug)]
pub struct Timer0Registers<R> {
    pub tccr0a: R,
    pub tccr0b: R,
    pub timsk0: R,
    pub tcnt0: R,
    pub ocr0a: R,
    pub ocr0b: R,
}

/// Timer/Counter1 registers (periodic interrupt)
#[derive(Debug)]
pub struct Timer1Registers<R, W> {
    pub tccr1b: R,
    pub timsk1: R,
    /// Interrupt flags (`TIFR1`), write one to clear
    pub tifr1: R,
    pub tcnt1: W,
    pub ocr1a: W,
}

// Addresses

pub const PINB: usize = 0x23;
pub const DDRB: usize = 0x24;
pub const PORTB: usize = 0x25;
pub const PINC: usize = 0x26;
pub const DDRC: usize = 0x27;
pub const PORTC: usize = 0x28;
pub const PIND: usize = 0x29;
pub const DDRD: usize = 0x2A;
pub const PORTD: usize = 0x2B;

pub const TIFR1: usize = 0x36;

pub const TCCR0A: usize = 0x44;
pub const TCCR0B: usize = 0x45;
pub const TCNT0: usize = 0x46;
pub const OCR0A: usize = 0x47;
pub const OCR0B: usize = 0x48;

pub const TIMSK0: usize = 0x6E;
pub const TIMSK1: usize = 0x6F;

pub const ADCH: usize = 0x79;
pub const ADCSRA: usize = 0x7A;
pub const ADMUX: usize = 0x7C;

pub const TCCR1B: usize = 0x81;
pub const TCNT1: usize = 0x84;
pub const OCR1A: usize = 0x88;

// Bit positions

// ADMUX
pub const REFS0: u8 = 6;
pub const ADLAR: u8 = 5;
pub const MUX_MASK: u8 = 0x0F;

// ADCSRA
pub const ADEN: u8 = 7;
pub const ADSC: u8 = 6;
pub const ADIF: u8 = 4;
pub const ADPS2: u8 = 2;
pub const ADPS1: u8 = 1;
pub const ADPS0: u8 = 0;

// TCCR0A
pub const COM0A1: u8 = 7;
pub const COM0B1: u8 = 5;
pub const WGM00: u8 = 0;

// TCCR0B
pub const CS01: u8 = 1;
pub const CS00: u8 = 0;

// TIMSK0
pub const OCIE0B: u8 = 2;
pub const OCIE0A: u8 = 1;
pub const TOIE0: u8 = 0;

// TCCR1B
pub const WGM12: u8 = 3;
pub const CS12: u8 = 2;
pub const CS11: u8 = 1;
pub const CS10: u8 = 0;

// TIMSK1
pub const OCIE1A: u8 = 1;

// TIFR1
pub const OCF1A: u8 = 1;

// DDRD
pub const DDD6: u8 = 6;
pub const DDD5: u8 = 5;

// Memory-mapped instances

// SAFETY (all blocks below): addresses taken from the ATmega328P datasheet
// register summary.

pub(crate) static PORTS: Ports<Mmio8> = unsafe {
    Ports {
        b: PortRegisters {
            pin: Mmio8::new(PINB),
            ddr: Mmio8::new(DDRB),
            port: Mmio8::new(PORTB),
        },
        c: PortRegisters {
            pin: Mmio8::new(PINC),
            ddr: Mmio8::new(DDRC),
            port: Mmio8::new(PORTC),
        },
        d: PortRegisters {
            pin: Mmio8::new(PIND),
            ddr: Mmio8::new(DDRD),
            port: Mmio8::new(PORTD),
        },
    }
};

pub(crate) static ADC: AdcRegisters<Mmio8> = unsafe {
    AdcRegisters {
        admux: Mmio8::new(ADMUX),
        adcsra: Mmio8::new(ADCSRA),
        adch: Mmio8::new(ADCH),
    }
};

pub(crate) static TIMER0: Timer0Registers<Mmio8> = unsafe {
    Timer0Registers {
        tccr0a: Mmio8::new(TCCR0A),
        tccr0b: Mmio8::new(TCCR0B),
        timsk0: Mmio8::new(TIMSK0),
        tcnt0: Mmio8::new(TCNT0),
        ocr0a: Mmio8::new(OCR0A),
        ocr0b: Mmio8::new(OCR0B),
    }
};

pub(crate) static TIMER1: Timer1Registers<Mmio8, Mmio16> = unsafe {
    Timer1Registers {
        tccr1b: Mmio8::new(TCCR1B),
        timsk1: Mmio8::new(TIMSK1),
        tifr1: Mmio8::new(TIFR1),
        tcnt1: Mmio16::new(TCNT1),
        ocr1a: Mmio16::new(OCR1A),
    }
};
