//! Blocking driver for the battery power-supply block of AXP-family PMICs.
//!
//! All property reads and writes go through the variant profile, so the same
//! calls work unchanged on every supported family. Register writes that touch
//! shared registers always use masked read-modify-write.

use embedded_hal::i2c::I2c;

use crate::data_types::{
    BatteryInfo, ChargeCurrentUpdate, ChargingState, PmuFaults, Property, PropertyValue,
};
use crate::error::Error;
use crate::fmt::*;
use crate::registers::{
    CalibrateBits, DESIGN_CAPACITY_LSB_UAH, DESIGN_CAPACITY_VALID, FG_PERCENT_MASK, FG_VALID,
    FaultBits, ITERM_STEP_UA, clamp_percent, energy_from_percent, power_from_sense,
};
use crate::sense::{NoAdc, SenseChannel};
use crate::variants::{ChipVariant, Field, StatusLayout, VariantProfile, VoltageStrategy};

/// AXP PMICs answer on a fixed address.
pub const DEFAULT_I2C_ADDRESS: u8 = 0x34;

/// One attached battery, bound to its chip family profile.
pub struct Axp20xBattery<I2C, A> {
    i2c: I2C,
    address: u8,
    profile: &'static VariantProfile,
    charge_sense: Option<A>,
    discharge_sense: Option<A>,
    voltage_sense: Option<A>,
    energy_full_design: i32,
    current_now: i32,
    voltage_now: i32,
}

impl<I2C> Axp20xBattery<I2C, NoAdc> {
    /// Create an instance without analog sense channels.
    pub fn new(i2c: I2C, variant: ChipVariant) -> Self {
        Self::with_sense(i2c, variant, None, None, None)
    }
}

impl<I2C, A> Axp20xBattery<I2C, A> {
    /// Create an instance with optional charge/discharge current and
    /// battery voltage sense channels.
    pub fn with_sense(
        i2c: I2C,
        variant: ChipVariant,
        charge_sense: Option<A>,
        discharge_sense: Option<A>,
        voltage_sense: Option<A>,
    ) -> Self {
        Self {
            i2c,
            address: DEFAULT_I2C_ADDRESS,
            profile: variant.profile(),
            charge_sense,
            discharge_sense,
            voltage_sense,
            energy_full_design: 0,
            current_now: 0,
            voltage_now: 0,
        }
    }

    /// Override the bus address (test setups, unusual wiring).
    pub fn set_address(&mut self, address: u8) {
        self.address = address;
    }

    pub fn profile(&self) -> &'static VariantProfile {
        self.profile
    }

    /// Release the bus handle.
    pub fn free(self) -> I2C {
        self.i2c
    }
}

impl<I2C, A> Axp20xBattery<I2C, A>
where
    I2C: I2c,
{
    /// Read a single register.
    pub fn read_reg(&mut self, reg: u8) -> Result<u8, Error<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(Error::I2c)?;
        Ok(buf[0])
    }

    /// Write a single register.
    pub fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(Error::I2c)
    }

    /// Update masked bits in a register (read-modify-write). Bits outside
    /// `mask` keep the value observed by the read.
    pub fn update_reg(&mut self, reg: u8, mask: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        let cur = self.read_reg(reg)?;
        let new = (cur & !mask) | (value & mask);
        self.write_reg(reg, new)
    }

    fn read_field(&mut self, field: Field) -> Result<u8, Error<I2C::Error>> {
        let raw = self.read_reg(field.reg)?;
        Ok((raw & field.mask) >> field.shift())
    }

    fn write_field(&mut self, field: Field, raw: u8) -> Result<(), Error<I2C::Error>> {
        self.update_reg(field.reg, field.mask, raw << field.shift())
    }

    /// Whether a battery is attached.
    pub fn present(&mut self) -> Result<bool, Error<I2C::Error>> {
        let p = self.profile;
        let reg = self.read_reg(p.present_reg)?;
        Ok(reg & p.present_bit != 0)
    }

    /// Decode the charge state per the variant's status layout.
    pub fn status(&mut self) -> Result<ChargingState, Error<I2C::Error>> {
        match self.profile.status {
            StatusLayout::ChargingBit { reg, bit } => {
                let raw = self.read_reg(reg)?;
                Ok(if raw & bit != 0 {
                    ChargingState::Charging
                } else {
                    ChargingState::Discharging
                })
            }
            StatusLayout::TriState { field } => Ok(match self.read_field(field)? {
                0 => ChargingState::NotCharging,
                1 => ChargingState::Charging,
                2 => ChargingState::Discharging,
                _ => ChargingState::Unknown,
            }),
        }
    }

    /// Enable or disable the chip's charger state machine.
    pub fn set_charging(&mut self, enable: bool) -> Result<(), Error<I2C::Error>> {
        let field = self.profile.charge_enable;
        self.update_reg(field.reg, field.mask, if enable { field.mask } else { 0 })
    }

    /// Fuel-gauge state of charge in percent, clamped to 0..=100.
    pub fn capacity(&mut self) -> Result<u8, Error<I2C::Error>> {
        let p = self.profile;
        let raw = self.read_reg(p.fg_reg)?;
        if p.has_fg_valid && raw & FG_VALID == 0 {
            return Err(Error::NotAvailable);
        }
        Ok(clamp_percent(raw & FG_PERCENT_MASK))
    }

    /// Remaining energy in µWh. An absent battery reports zero, not a fault.
    pub fn energy_now(&mut self) -> Result<i32, Error<I2C::Error>> {
        if !self.present()? {
            return Ok(0);
        }
        let percent = self.capacity()?;
        Ok(energy_from_percent(percent, self.energy_full_design))
    }

    /// Full energy in µWh. The chip does not track degraded full capacity,
    /// so this reports the design value while a battery is attached.
    pub fn energy_full(&mut self) -> Result<i32, Error<I2C::Error>> {
        if !self.present()? {
            return Ok(0);
        }
        Ok(self.energy_full_design)
    }

    /// Design energy in µWh, independent of presence.
    pub fn energy_full_design(&self) -> i32 {
        self.energy_full_design
    }

    /// Instantaneous power in µW, derived from the cached sense values.
    /// No bus traffic.
    pub fn power_now(&self) -> i32 {
        power_from_sense(self.voltage_now, self.current_now)
    }

    /// Whether fuel-gauge calibration is currently enabled/running.
    pub fn calibrating(&mut self) -> Result<bool, Error<I2C::Error>> {
        let field = self.profile.calibrate.ok_or(Error::NotSupported)?;
        let raw = self.read_reg(field.reg)?;
        Ok(!CalibrateBits::from_bits_truncate(raw & field.mask).is_empty())
    }

    /// Start (or stop) a fuel-gauge calibration cycle. Enable and trigger
    /// bits move together in one masked update; unrelated control bits in
    /// the shared register are preserved.
    pub fn set_calibrate(&mut self, enable: bool) -> Result<(), Error<I2C::Error>> {
        let field = self.profile.calibrate.ok_or(Error::NotSupported)?;
        let value = if enable {
            (CalibrateBits::ENABLE | CalibrateBits::TRIGGER).bits()
        } else {
            0
        };
        self.update_reg(field.reg, field.mask, value)
    }

    /// Configured constant-charge-current limit in µA.
    pub fn constant_charge_current_max(&mut self) -> Result<i32, Error<I2C::Error>> {
        let p = self.profile;
        let raw = self.read_field(p.ccc)?;
        Ok(p.ccc_from_raw(raw))
    }

    /// Set the constant-charge-current limit. The request is floored to the
    /// variant's `offset + n * scale` grid and clamped to the hardware
    /// maximum; it is never rounded up. Raising the limit above the value
    /// previously configured is allowed but reported back as an advisory.
    pub fn set_constant_charge_current_max(
        &mut self,
        ua: i32,
    ) -> Result<ChargeCurrentUpdate, Error<I2C::Error>> {
        let p = self.profile;
        let raw = p.ccc_to_raw(ua).ok_or(Error::OutOfRange)?;
        let applied_ua = p.ccc_from_raw(raw);
        let previous_ua = self.constant_charge_current_max()?;
        self.write_field(p.ccc, raw)?;
        let raised_above_previous = applied_ua > previous_ua;
        if raised_above_previous {
            warn!("charge current limit raised; a higher limit may damage the battery");
        }
        Ok(ChargeCurrentUpdate {
            applied_ua,
            raised_above_previous,
        })
    }

    fn voltage_get(&mut self, strategy: VoltageStrategy) -> Result<i32, Error<I2C::Error>> {
        match strategy {
            VoltageStrategy::CoarseTier { field, table } => {
                let raw = self.read_field(field)?;
                match table.get(raw as usize).copied() {
                    Some(uv) if uv != 0 => Ok(uv),
                    _ => Err(Error::NotAvailable),
                }
            }
            VoltageStrategy::LinearMicroVolt {
                field,
                min_uv,
                step_uv,
                ..
            } => {
                let raw = self.read_field(field)?;
                Ok(min_uv + step_uv * raw as i32)
            }
        }
    }

    fn voltage_set(&mut self, strategy: VoltageStrategy, uv: i32) -> Result<(), Error<I2C::Error>> {
        match strategy {
            VoltageStrategy::CoarseTier { field, table } => {
                let raw = table
                    .iter()
                    .position(|&entry| entry != 0 && entry == uv)
                    .ok_or(Error::OutOfRange)?;
                self.write_field(field, raw as u8)
            }
            VoltageStrategy::LinearMicroVolt {
                field,
                min_uv,
                max_uv,
                step_uv,
            } => {
                if uv < min_uv || uv > max_uv {
                    return Err(Error::OutOfRange);
                }
                let raw = (uv - min_uv) / step_uv;
                self.write_field(field, raw as u8)
            }
        }
    }

    /// Target charge voltage in µV.
    pub fn charge_voltage_max(&mut self) -> Result<i32, Error<I2C::Error>> {
        let strategy = self.profile.charge_voltage;
        self.voltage_get(strategy)
    }

    /// Set the target charge voltage. Coarse-tier variants only accept the
    /// exact voltages of their table.
    pub fn set_charge_voltage_max(&mut self, uv: i32) -> Result<(), Error<I2C::Error>> {
        let strategy = self.profile.charge_voltage;
        self.voltage_set(strategy, uv)
    }

    /// Minimum (power-off) voltage in µV.
    pub fn min_voltage(&mut self) -> Result<i32, Error<I2C::Error>> {
        let strategy = self.profile.min_voltage;
        self.voltage_get(strategy)
    }

    /// Set the minimum (power-off) voltage, valid from 2.6 V to 3.3 V in
    /// 100 mV steps.
    pub fn set_min_voltage(&mut self, uv: i32) -> Result<(), Error<I2C::Error>> {
        let strategy = self.profile.min_voltage;
        self.voltage_set(strategy, uv)
    }

    /// Charge termination current in µA.
    pub fn termination_current(&mut self) -> Result<i32, Error<I2C::Error>> {
        let field = self
            .profile
            .termination_current
            .ok_or(Error::NotSupported)?;
        let raw = self.read_field(field)?;
        Ok(raw as i32 * ITERM_STEP_UA)
    }

    /// Decode the PMU fault register.
    pub fn pmu_faults(&mut self) -> Result<PmuFaults, Error<I2C::Error>> {
        let reg = self.profile.fault_reg.ok_or(Error::NotSupported)?;
        let raw = self.read_reg(reg)?;
        let bits = FaultBits::from_bits_truncate(raw);
        Ok(PmuFaults {
            under_voltage_lockout: bits.contains(FaultBits::UVLO),
            over_temperature: bits.contains(FaultBits::OVER_TEMP),
            under_temperature: bits.contains(FaultBits::UNDER_TEMP),
        })
    }

    /// One-time initialization from externally supplied battery parameters.
    /// Everything here is best-effort: failures are logged and the remaining
    /// steps still run, matching attach-time semantics where a partially
    /// configured battery is better than none.
    pub fn provision(&mut self, info: &BatteryInfo) {
        let p = self.profile;

        if let Some(uwh) = info.energy_full_design_uwh {
            self.energy_full_design = uwh;
        } else {
            self.energy_full_design = p.default_energy_uwh;
            warn!(
                "energy full design not supplied, defaulting to {} uWh",
                p.default_energy_uwh
            );
        }

        if let Some(uah) = info.charge_full_design_uah {
            if let Some((cap_high, cap_low)) = p.design_capacity_regs {
                let steps = uah / DESIGN_CAPACITY_LSB_UAH;
                let low = (steps & 0xFF) as u8;
                let high = DESIGN_CAPACITY_VALID | ((steps >> 8) & 0xFF) as u8;
                if self.update_reg(cap_low, 0xFF, low).is_err()
                    || self.update_reg(cap_high, 0xFF, high).is_err()
                {
                    warn!("couldn't write design capacity");
                }
            }
        } else {
            info!("charge full design not supplied");
        }

        if let Some(uv) = info.voltage_min_design_uv
            && self.set_min_voltage(uv).is_err()
        {
            warn!("couldn't set voltage_min_design");
        }

        if let Some(uv) = info.voltage_max_design_uv
            && self.set_charge_voltage_max(uv).is_err()
        {
            warn!("couldn't set voltage_max_design");
        }

        if let Some(ua) = info.constant_charge_current_ua
            && self.set_constant_charge_current_max(ua).is_err()
        {
            warn!("couldn't set constant charge current");
        }

        for w in p.lockout_writes {
            if self.update_reg(w.reg, w.mask, w.value).is_err() {
                warn!(
                    "couldn't apply power-management default for register {}",
                    w.reg
                );
            }
        }
    }
}

impl<I2C, A> Axp20xBattery<I2C, A>
where
    I2C: I2c,
    A: SenseChannel,
{
    /// Battery voltage in µV from the analog sense channel. The value is
    /// cached for [`Self::power_now`].
    pub fn voltage_now(&mut self) -> Result<i32, Error<I2C::Error>> {
        let uv = self
            .voltage_sense
            .as_mut()
            .ok_or(Error::NotSupported)?
            .read_processed()?;
        self.voltage_now = uv;
        Ok(uv)
    }

    /// Battery current in µA: positive while charging, negative while
    /// discharging. The value is cached for [`Self::power_now`].
    pub fn current_now(&mut self) -> Result<i32, Error<I2C::Error>> {
        let charging = self.status()? == ChargingState::Charging;
        let ua = if charging {
            self.charge_sense
                .as_mut()
                .ok_or(Error::NotSupported)?
                .read_processed()?
        } else {
            -self
                .discharge_sense
                .as_mut()
                .ok_or(Error::NotSupported)?
                .read_processed()?
        };
        self.current_now = ua;
        Ok(ua)
    }

    /// Read one abstract property.
    pub fn get(&mut self, property: Property) -> Result<PropertyValue, Error<I2C::Error>> {
        match property {
            Property::Present => Ok(PropertyValue::Flag(self.present()?)),
            Property::Status => Ok(PropertyValue::Status(self.status()?)),
            Property::Capacity => Ok(PropertyValue::Scalar(self.capacity()? as i32)),
            Property::VoltageNow => Ok(PropertyValue::Scalar(self.voltage_now()?)),
            Property::CurrentNow => Ok(PropertyValue::Scalar(self.current_now()?)),
            Property::EnergyNow => Ok(PropertyValue::Scalar(self.energy_now()?)),
            Property::EnergyFull => Ok(PropertyValue::Scalar(self.energy_full()?)),
            Property::EnergyFullDesign => Ok(PropertyValue::Scalar(self.energy_full_design())),
            Property::PowerNow => Ok(PropertyValue::Scalar(self.power_now())),
            Property::Calibrate => Ok(PropertyValue::Flag(self.calibrating()?)),
            Property::ChargeCurrentMax => {
                Ok(PropertyValue::Scalar(self.constant_charge_current_max()?))
            }
            Property::ChargeVoltageMax => Ok(PropertyValue::Scalar(self.charge_voltage_max()?)),
            Property::MinVoltage => Ok(PropertyValue::Scalar(self.min_voltage()?)),
            Property::TerminationCurrent => Ok(PropertyValue::Scalar(self.termination_current()?)),
            Property::FaultStatus => Ok(PropertyValue::Faults(self.pmu_faults()?)),
        }
    }

    /// Write one abstract property. `Status` interprets a non-zero value as
    /// "enable charging", `Calibrate` as "start calibration".
    pub fn set(&mut self, property: Property, value: i32) -> Result<(), Error<I2C::Error>> {
        match property {
            Property::Status => self.set_charging(value != 0),
            Property::Calibrate => self.set_calibrate(value != 0),
            Property::ChargeCurrentMax => {
                self.set_constant_charge_current_max(value).map(|_| ())
            }
            Property::ChargeVoltageMax => self.set_charge_voltage_max(value),
            Property::MinVoltage => self.set_min_voltage(value),
            _ => Err(Error::NotSupported),
        }
    }
}

/// Whether [`Axp20xBattery::set`] accepts the property at all. Variant
/// capability (e.g. calibration) is still checked at call time.
pub fn property_is_writable(property: Property) -> bool {
    matches!(
        property,
        Property::Status
            | Property::Calibrate
            | Property::ChargeCurrentMax
            | Property::ChargeVoltageMax
            | Property::MinVoltage
    )
}
