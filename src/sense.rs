//! Analog sense channels (battery current/voltage ADC reads).
//!
//! Several AXP variants expose the instantaneous battery current only through
//! the PMIC's ADC block, not through a register the battery driver owns. The
//! host supplies those reads through [`SenseChannel`].

/// Opaque analog read failure.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug)]
pub struct SenseError;

/// A processed analog channel, reporting micro-units (µA or µV).
pub trait SenseChannel {
    fn read_processed(&mut self) -> Result<i32, SenseError>;
}

/// Placeholder channel for instances without ADC access.
pub struct NoAdc;

impl SenseChannel for NoAdc {
    fn read_processed(&mut self) -> Result<i32, SenseError> {
        Err(SenseError)
    }
}
