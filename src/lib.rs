//! Battery power-supply driver for X-Powers AXP20x-family PMICs.
//!
//! The AXP209, AXP221/AXP228, AXP813 and AXP717 all expose the same battery
//! concepts (presence, charge state, fuel gauge, charge current/voltage
//! limits, power-off threshold) through mutually incompatible register
//! layouts. This crate keeps the per-family differences in a static
//! [`variants::VariantProfile`] and translates a uniform set of battery
//! properties into the masked register transactions each chip expects.
//!
//! ***Warning!*** These PMICs usually power the processor the code runs on.
//! Raising the constant charge current or the charge voltage beyond what the
//! attached cell is rated for can damage the battery.
//!
//! Every property operation takes `&mut self`, so concurrent masked updates
//! to the same register cannot interleave; instances for different chips are
//! independent.

#![no_std]

pub(crate) mod fmt;

pub mod data_types;
pub mod driver;
pub mod error;
pub mod registers;
pub mod sense;
pub mod variants;

pub use data_types::{BatteryInfo, ChargeCurrentUpdate, ChargingState, PmuFaults, Property, PropertyValue};
pub use driver::{Axp20xBattery, DEFAULT_I2C_ADDRESS};
pub use error::Error;
pub use sense::{NoAdc, SenseChannel, SenseError};
pub use variants::{ChipVariant, VariantProfile, profile_for};
