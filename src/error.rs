//! Error definitions for the AXP battery driver.

use crate::sense::SenseError;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug)]
pub enum Error<I2cError> {
    /// Underlying I2C transaction failed.
    I2c(I2cError),
    /// An analog sense channel read failed.
    Sense,
    /// The chip has the requested data but it is not trustworthy yet
    /// (fuel-gauge validity bit unset, reserved voltage encoding).
    NotAvailable,
    /// Requested value is outside the representable range for this variant.
    OutOfRange,
    /// The attached variant does not implement this property.
    NotSupported,
}

impl<E> From<SenseError> for Error<E> {
    fn from(_: SenseError) -> Self {
        Error::Sense
    }
}

impl<I2cError: core::fmt::Debug> core::fmt::Display for Error<I2cError> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::I2c(e) => write!(f, "I2C error: {:?}", e),
            Error::Sense => write!(f, "analog sense channel read failed"),
            Error::NotAvailable => write!(f, "reading not yet valid"),
            Error::OutOfRange => write!(f, "value out of range for this variant"),
            Error::NotSupported => write!(f, "property not supported by this variant"),
        }
    }
}
