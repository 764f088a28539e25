//! ADC channel management
//!
//! The ATmega328P has a single 10-bit ADC multiplexed over 8 single-ended
//! inputs (ADC6/ADC7 exist on the TQFP/QFN packages only). Results are
//! left-adjusted and only the high byte is read, giving 8-bit samples.
//!
//! Conversions block: [`Adc::read`] busy-polls the completion flag. At the
//! /128 clock prescaler a conversion takes 13 ADC cycles, about 104 µs at
//! 16 MHz, so no timeout is applied.

use devastator_hal::{bv, ErrorKind, HalError, NotFound, Register, ResourceTable};

use crate::regs::{
    AdcRegisters, ADEN, ADIF, ADLAR, ADPS0, ADPS1, ADPS2, ADSC, MUX_MASK, REFS0,
};

/// Errors from ADC operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    /// Channel is not present in the channel table
    Input,
}

impl HalError for AdcError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Identifier
    }
}

impl From<NotFound> for AdcError {
    fn from(_: NotFound) -> Self {
        AdcError::Input
    }
}

/// ADC input channel identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcChannel {
    /// ADC0 on PC0
    Ch0,
    /// ADC1 on PC1
    Ch1,
    /// ADC2 on PC2
    Ch2,
    /// ADC3 on PC3
    Ch3,
    /// ADC4 on PC4
    Ch4,
    /// ADC5 on PC5
    Ch5,
    /// ADC6 (dedicated analog pin)
    Ch6,
    /// ADC7 (dedicated analog pin)
    Ch7,
}

impl TryFrom<u8> for AdcChannel {
    type Error = AdcError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(AdcChannel::Ch0),
            1 => Ok(AdcChannel::Ch1),
            2 => Ok(AdcChannel::Ch2),
            3 => Ok(AdcChannel::Ch3),
            4 => Ok(AdcChannel::Ch4),
            5 => Ok(AdcChannel::Ch5),
            6 => Ok(AdcChannel::Ch6),
            7 => Ok(AdcChannel::Ch7),
            _ => Err(AdcError::Input),
        }
    }
}

/// Channel table: multiplexer selection per channel
pub static ADC_TABLE: ResourceTable<AdcChannel, u8> = ResourceTable::new(&[
    (AdcChannel::Ch0, 0x00),
    (AdcChannel::Ch1, 0x01),
    (AdcChannel::Ch2, 0x02),
    (AdcChannel::Ch3, 0x03),
    (AdcChannel::Ch4, 0x04),
    (AdcChannel::Ch5, 0x05),
    (AdcChannel::Ch6, 0x06),
    (AdcChannel::Ch7, 0x07),
]);

/// One-shot ADC driver
pub struct Adc<'a, R> {
    regs: &'a AdcRegisters<R>,
    table: &'a ResourceTable<AdcChannel, u8>,
}

impl<'a, R: Register> Adc<'a, R> {
    /// Enable the ADC over the full channel table
    pub fn new(regs: &'a AdcRegisters<R>) -> Self {
        Self::with_table(regs, &ADC_TABLE)
    }

    /// Enable the ADC over a board-specific channel table
    ///
    /// Selects the AVcc reference, left-adjusts results, enables the ADC at
    /// clk/128 and runs one throwaway conversion: the first conversion
    /// after enabling also initializes the analog circuitry and its result
    /// is not trusted.
    pub fn with_table(regs: &'a AdcRegisters<R>, table: &'a ResourceTable<AdcChannel, u8>) -> Self {
        regs.admux.set_bits(bv(REFS0) | bv(ADLAR));
        regs.adcsra
            .set_bits(bv(ADEN) | bv(ADPS2) | bv(ADPS1) | bv(ADPS0));

        let adc = Self { regs, table };
        let _ = adc.convert();
        debug!("adc: enabled");
        adc
    }

    /// Convert the voltage on a channel to an 8-bit value
    pub fn read(&mut self, channel: AdcChannel) -> Result<u8, AdcError> {
        let mux = *self.table.resolve(channel)?;

        self.regs.admux.modify(|v| (v & !MUX_MASK) | mux);
        let value = self.convert();
        trace!("adc: {:?} = {}", channel, value);
        Ok(value)
    }

    /// Start a conversion and wait for it to complete
    ///
    /// Writing ADIF as one clears a completion flag left over from the
    /// previous conversion.
    fn convert(&self) -> u8 {
        self.regs.adcsra.set_bits(bv(ADSC) | bv(ADIF));
        while !self.regs.adcsra.test_bit(ADIF) {
            core::hint::spin_loop();
        }
        self.regs.adch.read()
    }
}
