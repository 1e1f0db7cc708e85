//! Register map and scaling constants for the supported AXP families.
//! Addresses and bit layouts follow the X-Powers datasheets.

/// Registers shared by the AXP209/AXP221/AXP228/AXP813 generation.
pub mod axp20x {
    /// Power input status. Bit 2 reports an active charge.
    pub const PWR_INPUT_STATUS: u8 = 0x00;
    /// Power operating mode. Bit 5 reports battery presence.
    pub const PWR_OP_MODE: u8 = 0x01;
    /// VBUS to IPSOUT path management.
    pub const VBUS_IPSOUT_MGMT: u8 = 0x30;
    /// Power-off voltage threshold, bits 2:0.
    pub const V_OFF: u8 = 0x31;
    /// Shutdown, battery detection and CHGLED control.
    pub const OFF_CTRL: u8 = 0x32;
    /// Charge control 1: enable (bit 7), target voltage (bits 6:5),
    /// target current (bits 3:0).
    pub const CHRG_CTRL1: u8 = 0x33;
    /// Charge control 2: precharge/constant-current timeouts.
    pub const CHRG_CTRL2: u8 = 0x34;
    /// Power-enable key (PEK) timing parameters.
    pub const PEK_KEY: u8 = 0x36;
    /// GPIO0 function control.
    pub const GPIO0_CTRL: u8 = 0x90;
    /// Coulomb counter control. The AXP228 keeps its fuel-gauge
    /// calibration bits here as well.
    pub const CC_CTRL: u8 = 0xB8;
    /// Fuel-gauge result: percentage in bits 6:0, validity in bit 7.
    pub const FG_RES: u8 = 0xB9;
    /// Design capacity, high byte. Bit 7 marks the pair as valid.
    pub const FG_DES_CAP1: u8 = 0xE0;
    /// Design capacity, low byte.
    pub const FG_DES_CAP0: u8 = 0xE1;
}

/// AXP717 register map (reworked layout, linear current fields).
pub mod axp717 {
    /// Power-on indication. Bits 6:5 hold the battery charge state.
    pub const ON_INDICATE: u8 = 0x00;
    /// PMU status 2. Bit 3 reports battery presence.
    pub const PMU_STATUS_2: u8 = 0x01;
    /// PMU fault flags, bits 2:0.
    pub const PMU_FAULT: u8 = 0x08;
    /// Module enable control 2. Bit 1 enables the charger.
    pub const MODULE_EN_CONTROL_2: u8 = 0x19;
    /// VSYS power-off threshold, bits 6:4.
    pub const VSYS_V_POWEROFF: u8 = 0x24;
    /// Constant charge current limit, bits 5:0.
    pub const ICC_CHG_SET: u8 = 0x62;
    /// Charge termination current, bits 3:0.
    pub const ITERM_CHG_SET: u8 = 0x63;
    /// Constant charge voltage selection, bits 2:0.
    pub const CV_CHG_SET: u8 = 0x64;
    /// Battery percentage data.
    pub const BATT_PERCENT_DATA: u8 = 0xA4;
}

/// PWR_INPUT_STATUS: battery is being charged.
pub const PWR_STATUS_BAT_CHARGING: u8 = 1 << 2;
/// PWR_OP_MODE: battery present.
pub const PWR_OP_BATT_PRESENT: u8 = 1 << 5;
/// AXP717 PMU_STATUS_2: battery present.
pub const AXP717_BATT_PRESENT: u8 = 1 << 3;
/// AXP20x CHRG_CTRL1: charger enable.
pub const CHRG_CTRL1_ENABLE: u8 = 1 << 7;
/// AXP717 MODULE_EN_CONTROL_2: charger enable.
pub const AXP717_CHRG_ENABLE: u8 = 1 << 1;

/// Fuel-gauge percentage field (7 bits).
pub const FG_PERCENT_MASK: u8 = 0x7F;
/// Fuel-gauge validity bit, where the family provides one.
pub const FG_VALID: u8 = 1 << 7;

/// Minimum power-off voltage range, shared by every family.
pub const V_MIN_MIN_UV: i32 = 2_600_000;
pub const V_MIN_MAX_UV: i32 = 3_300_000;
pub const V_MIN_STEP_UV: i32 = 100_000;

/// AXP717 termination current step.
pub const ITERM_STEP_UA: i32 = 64_000;

/// Design-capacity register pair LSB: one step is 1.456 mAh.
pub const DESIGN_CAPACITY_LSB_UAH: i32 = 1456;
/// Valid marker carried in the design-capacity high byte.
pub const DESIGN_CAPACITY_VALID: u8 = 1 << 7;

bitflags::bitflags! {
    /// AXP717 PMU fault flags (PMU_FAULT bits 2:0).
    pub struct FaultBits: u8 {
        const UVLO = 1 << 2;
        const OVER_TEMP = 1 << 1;
        const UNDER_TEMP = 1 << 0;
    }

    /// AXP228 fuel-gauge calibration control (CC_CTRL bits 5:4).
    pub struct CalibrateBits: u8 {
        const ENABLE = 1 << 5;
        const TRIGGER = 1 << 4;
    }
}

/// Clamp a masked fuel-gauge reading to a sane percentage.
pub fn clamp_percent(raw: u8) -> u8 {
    raw.min(100)
}

/// Scale a capacity percentage against the design energy, in µWh.
/// The intermediate is widened so large design values cannot overflow.
pub fn energy_from_percent(percent: u8, full_design_uwh: i32) -> i32 {
    (percent as i64 * full_design_uwh as i64 / 100) as i32
}

/// Instantaneous power in µW from cached µV and µA sense values.
/// Two-stage division keeps the product inside 32 bits.
pub fn power_from_sense(voltage_uv: i32, current_ua: i32) -> i32 {
    (voltage_uv / 10_000) * current_ua / 100
}
