//! This file ensures that defmt is optional, providing stubs if it's not available

#![macro_use]

#[cfg(feature = "defmt")]
pub use defmt::{info, warn};

#[cfg(not(feature = "defmt"))]
macro_rules! info {
    ($($item:expr),*) => {};
}

#[cfg(not(feature = "defmt"))]
macro_rules! warn {
    ($($item:expr),*) => {};
}
