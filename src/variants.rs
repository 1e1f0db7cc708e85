//! Per-family profiles: scaling constants, register fields and strategy
//! selection for every supported AXP variant. Profiles are static data and
//! are never mutated; the driver dispatches on them instead of on code.

use crate::registers::{axp20x, axp717};
use crate::registers::{
    AXP717_BATT_PRESENT, AXP717_CHRG_ENABLE, CHRG_CTRL1_ENABLE, PWR_OP_BATT_PRESENT,
    PWR_STATUS_BAT_CHARGING,
};

/// Supported chip families.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChipVariant {
    Axp209,
    Axp221,
    /// AXP221 derivative used by the uConsole; adds fuel-gauge calibration,
    /// the design-capacity register pair and the provisioning lockout writes.
    Axp228,
    Axp813,
    Axp717,
}

impl ChipVariant {
    pub fn profile(self) -> &'static VariantProfile {
        profile_for(self)
    }
}

/// A bitfield within one register.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug)]
pub struct Field {
    pub reg: u8,
    pub mask: u8,
}

impl Field {
    pub const fn new(reg: u8, mask: u8) -> Self {
        Self { reg, mask }
    }

    pub fn shift(self) -> u32 {
        self.mask.trailing_zeros()
    }
}

/// One best-effort masked register write.
#[derive(Clone, Copy, Debug)]
pub struct MaskedWrite {
    pub reg: u8,
    pub mask: u8,
    pub value: u8,
}

/// How a family encodes a target voltage.
#[derive(Clone, Copy, Debug)]
pub enum VoltageStrategy {
    /// A small table of discrete voltages indexed by the raw field value.
    /// A zero entry marks a reserved encoding.
    CoarseTier {
        field: Field,
        table: &'static [i32],
    },
    /// `min_uv + step_uv * raw`, valid up to `max_uv`.
    LinearMicroVolt {
        field: Field,
        min_uv: i32,
        max_uv: i32,
        step_uv: i32,
    },
}

/// How a family reports the charge state.
#[derive(Clone, Copy, Debug)]
pub enum StatusLayout {
    /// Single "charging" bit; clear means discharging.
    ChargingBit { reg: u8, bit: u8 },
    /// 2-bit field: 0 standby, 1 charging, 2 discharging.
    TriState { field: Field },
}

/// Immutable per-family descriptor.
pub struct VariantProfile {
    /// Constant-charge-current limit field and its linear scaling.
    pub ccc: Field,
    /// µA per register step.
    pub ccc_scale: i32,
    /// µA at a raw value of zero.
    pub ccc_offset: i32,
    /// Largest configurable limit in µA.
    pub ccc_max_ua: i32,
    /// Fuel-gauge percentage register.
    pub fg_reg: u8,
    /// Whether bit 7 of the fuel-gauge register gates validity.
    pub has_fg_valid: bool,
    pub status: StatusLayout,
    pub present_reg: u8,
    pub present_bit: u8,
    /// Charger enable bit, used by the Status set path.
    pub charge_enable: Field,
    pub charge_voltage: VoltageStrategy,
    pub min_voltage: VoltageStrategy,
    /// Fuel-gauge calibration control, where the family has one.
    pub calibrate: Option<Field>,
    pub termination_current: Option<Field>,
    pub fault_reg: Option<u8>,
    /// Design-capacity register pair as (high, low).
    pub design_capacity_regs: Option<(u8, u8)>,
    /// Known-good power-management defaults applied after provisioning.
    pub lockout_writes: &'static [MaskedWrite],
    /// Fallback design energy in µWh when the host supplies none.
    pub default_energy_uwh: i32,
}

impl VariantProfile {
    /// Expand a raw charge-current field into µA.
    pub fn ccc_from_raw(&self, raw: u8) -> i32 {
        raw as i32 * self.ccc_scale + self.ccc_offset
    }

    /// Reduce a requested µA limit to the nearest representable raw value
    /// not exceeding it. `None` when the request is below the offset.
    pub fn ccc_to_raw(&self, ua: i32) -> Option<u8> {
        if ua < self.ccc_offset {
            return None;
        }
        let ua = ua.min(self.ccc_max_ua);
        Some(((ua - self.ccc_offset) / self.ccc_scale) as u8)
    }
}

const AXP209_CV_TABLE: &[i32] = &[4_100_000, 4_150_000, 4_200_000, 4_360_000];
const AXP22X_CV_TABLE: &[i32] = &[4_100_000, 4_220_000, 4_200_000, 4_240_000];
const AXP813_CV_TABLE: &[i32] = &[4_100_000, 4_150_000, 4_200_000, 4_350_000];
const AXP717_CV_TABLE: &[i32] = &[
    4_000_000, 4_100_000, 4_200_000, 4_350_000, 4_400_000, 0, 0, 5_000_000,
];

const AXP20X_STATUS: StatusLayout = StatusLayout::ChargingBit {
    reg: axp20x::PWR_INPUT_STATUS,
    bit: PWR_STATUS_BAT_CHARGING,
};

const AXP20X_MIN_VOLTAGE: VoltageStrategy = VoltageStrategy::LinearMicroVolt {
    field: Field::new(axp20x::V_OFF, 0x07),
    min_uv: crate::registers::V_MIN_MIN_UV,
    max_uv: crate::registers::V_MIN_MAX_UV,
    step_uv: crate::registers::V_MIN_STEP_UV,
};

const AXP20X_CHARGE_ENABLE: Field = Field::new(axp20x::CHRG_CTRL1, CHRG_CTRL1_ENABLE);

/// Defaults the uConsole firmware relies on for stable operation: VBUS input
/// management, shutdown battery detection, charge-control timing, PEK key
/// timing and GPIO0 function. Applied best-effort, order-independent.
const AXP228_LOCKOUT: &[MaskedWrite] = &[
    MaskedWrite { reg: axp20x::VBUS_IPSOUT_MGMT, mask: 0x03, value: 0x03 },
    MaskedWrite { reg: axp20x::OFF_CTRL, mask: 0x08, value: 0x08 },
    MaskedWrite { reg: axp20x::CHRG_CTRL2, mask: 0x30, value: 0x20 },
    MaskedWrite { reg: axp20x::PEK_KEY, mask: 0x0F, value: 0x0B },
    MaskedWrite { reg: axp20x::GPIO0_CTRL, mask: 0x07, value: 0x00 },
];

static AXP209: VariantProfile = VariantProfile {
    ccc: Field::new(axp20x::CHRG_CTRL1, 0x0F),
    ccc_scale: 100_000,
    ccc_offset: 300_000,
    ccc_max_ua: 1_800_000,
    fg_reg: axp20x::FG_RES,
    has_fg_valid: false,
    status: AXP20X_STATUS,
    present_reg: axp20x::PWR_OP_MODE,
    present_bit: PWR_OP_BATT_PRESENT,
    charge_enable: AXP20X_CHARGE_ENABLE,
    charge_voltage: VoltageStrategy::CoarseTier {
        field: Field::new(axp20x::CHRG_CTRL1, 0x60),
        table: AXP209_CV_TABLE,
    },
    min_voltage: AXP20X_MIN_VOLTAGE,
    calibrate: None,
    termination_current: None,
    fault_reg: None,
    design_capacity_regs: None,
    lockout_writes: &[],
    default_energy_uwh: 8_000_000,
};

static AXP221: VariantProfile = AXP221_BASE;

static AXP228: VariantProfile = VariantProfile {
    calibrate: Some(Field::new(axp20x::CC_CTRL, 0x30)),
    design_capacity_regs: Some((axp20x::FG_DES_CAP1, axp20x::FG_DES_CAP0)),
    lockout_writes: AXP228_LOCKOUT,
    ..AXP221_BASE
};

// Shared between the AXP221 and its AXP228 derivative.
const AXP221_BASE: VariantProfile = VariantProfile {
    ccc: Field::new(axp20x::CHRG_CTRL1, 0x0F),
    ccc_scale: 300_000,
    ccc_offset: 300_000,
    ccc_max_ua: 4_800_000,
    fg_reg: axp20x::FG_RES,
    has_fg_valid: true,
    status: AXP20X_STATUS,
    present_reg: axp20x::PWR_OP_MODE,
    present_bit: PWR_OP_BATT_PRESENT,
    charge_enable: AXP20X_CHARGE_ENABLE,
    charge_voltage: VoltageStrategy::CoarseTier {
        field: Field::new(axp20x::CHRG_CTRL1, 0x60),
        table: AXP22X_CV_TABLE,
    },
    min_voltage: AXP20X_MIN_VOLTAGE,
    calibrate: None,
    termination_current: None,
    fault_reg: None,
    design_capacity_regs: None,
    lockout_writes: &[],
    default_energy_uwh: 8_000_000,
};

static AXP813: VariantProfile = VariantProfile {
    ccc: Field::new(axp20x::CHRG_CTRL1, 0x0F),
    ccc_scale: 200_000,
    ccc_offset: 200_000,
    // 4-bit field: 200 mA + 15 * 200 mA
    ccc_max_ua: 3_200_000,
    fg_reg: axp20x::FG_RES,
    has_fg_valid: true,
    status: AXP20X_STATUS,
    present_reg: axp20x::PWR_OP_MODE,
    present_bit: PWR_OP_BATT_PRESENT,
    charge_enable: AXP20X_CHARGE_ENABLE,
    charge_voltage: VoltageStrategy::CoarseTier {
        field: Field::new(axp20x::CHRG_CTRL1, 0x60),
        table: AXP813_CV_TABLE,
    },
    min_voltage: AXP20X_MIN_VOLTAGE,
    calibrate: None,
    termination_current: None,
    fault_reg: None,
    design_capacity_regs: None,
    lockout_writes: &[],
    default_energy_uwh: 8_000_000,
};

static AXP717: VariantProfile = VariantProfile {
    ccc: Field::new(axp717::ICC_CHG_SET, 0x3F),
    ccc_scale: 64_000,
    ccc_offset: 0,
    ccc_max_ua: 3_008_000,
    fg_reg: axp717::BATT_PERCENT_DATA,
    has_fg_valid: false,
    status: StatusLayout::TriState {
        field: Field::new(axp717::ON_INDICATE, 0x60),
    },
    present_reg: axp717::PMU_STATUS_2,
    present_bit: AXP717_BATT_PRESENT,
    charge_enable: Field::new(axp717::MODULE_EN_CONTROL_2, AXP717_CHRG_ENABLE),
    charge_voltage: VoltageStrategy::CoarseTier {
        field: Field::new(axp717::CV_CHG_SET, 0x07),
        table: AXP717_CV_TABLE,
    },
    min_voltage: VoltageStrategy::LinearMicroVolt {
        field: Field::new(axp717::VSYS_V_POWEROFF, 0x70),
        min_uv: crate::registers::V_MIN_MIN_UV,
        max_uv: crate::registers::V_MIN_MAX_UV,
        step_uv: crate::registers::V_MIN_STEP_UV,
    },
    calibrate: None,
    termination_current: Some(Field::new(axp717::ITERM_CHG_SET, 0x0F)),
    fault_reg: Some(axp717::PMU_FAULT),
    design_capacity_regs: None,
    lockout_writes: &[],
    default_energy_uwh: 8_000_000,
};

/// Look up the immutable profile for a chip family.
pub fn profile_for(variant: ChipVariant) -> &'static VariantProfile {
    match variant {
        ChipVariant::Axp209 => &AXP209,
        ChipVariant::Axp221 => &AXP221,
        ChipVariant::Axp228 => &AXP228,
        ChipVariant::Axp813 => &AXP813,
        ChipVariant::Axp717 => &AXP717,
    }
}
