//! Data types exchanged between the host framework and the property engine.

/// Battery charge state, decoded per variant.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChargingState {
    Charging,
    Discharging,
    /// Battery attached but idle (AXP717 standby encoding).
    NotCharging,
    Unknown,
}

/// PMU fault flags decoded from the AXP717 fault register. Faults are a
/// reported value, not a driver error.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PmuFaults {
    pub under_voltage_lockout: bool,
    pub over_temperature: bool,
    pub under_temperature: bool,
}

/// Battery parameters supplied by the host at attach time. Every field is
/// optional; absent fields fall back to documented defaults.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default)]
pub struct BatteryInfo {
    pub energy_full_design_uwh: Option<i32>,
    pub charge_full_design_uah: Option<i32>,
    pub voltage_min_design_uv: Option<i32>,
    pub voltage_max_design_uv: Option<i32>,
    pub constant_charge_current_ua: Option<i32>,
}

/// Abstract battery properties served by the translation engine.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Property {
    Present,
    Status,
    Capacity,
    VoltageNow,
    CurrentNow,
    EnergyNow,
    EnergyFull,
    EnergyFullDesign,
    PowerNow,
    Calibrate,
    ChargeCurrentMax,
    ChargeVoltageMax,
    MinVoltage,
    TerminationCurrent,
    FaultStatus,
}

/// Value returned by a property read. Scalars are micro-units
/// (µV, µA, µW, µWh) except `Capacity`, which is a percentage.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PropertyValue {
    Flag(bool),
    Scalar(i32),
    Status(ChargingState),
    Faults(PmuFaults),
}

/// Outcome of a charge-current-limit update. `raised_above_previous` is the
/// battery-damage advisory: the write went through, but the new limit is
/// higher than what was configured before.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChargeCurrentUpdate {
    /// Limit actually written, floored to the variant's representable grid.
    pub applied_ua: i32,
    pub raised_above_previous: bool,
}
