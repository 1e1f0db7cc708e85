use axp20x_battery::driver::{Axp20xBattery, property_is_writable};
use axp20x_battery::{
    BatteryInfo, ChargingState, ChipVariant, Error, PmuFaults, Property, PropertyValue,
    SenseChannel, SenseError,
};
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

struct FixedSense(i32);

impl SenseChannel for FixedSense {
    fn read_processed(&mut self) -> Result<i32, SenseError> {
        Ok(self.0)
    }
}

#[test]
fn presence_reads_op_mode_bit() {
    let expectations = [
        I2cTrans::write_read(0x34, vec![0x01], vec![0b0010_0000]),
        I2cTrans::write_read(0x34, vec![0x01], vec![0b0000_1000]),
    ];
    let mut batt = Axp20xBattery::new(I2cMock::new(&expectations), ChipVariant::Axp209);
    assert!(batt.present().unwrap());
    assert!(!batt.present().unwrap());
    batt.free().done();
}

#[test]
fn capacity_clamps_raw_gauge() {
    // Raw gauge can report up to 127; anything above 100 is clamped.
    let expectations = [I2cTrans::write_read(0x34, vec![0xB9], vec![0x7F])];
    let mut batt = Axp20xBattery::new(I2cMock::new(&expectations), ChipVariant::Axp209);
    assert_eq!(batt.capacity().unwrap(), 100);
    batt.free().done();
}

#[test]
fn capacity_requires_validity_bit() {
    let expectations = [
        I2cTrans::write_read(0x34, vec![0xB9], vec![0x50]),
        I2cTrans::write_read(0x34, vec![0xB9], vec![0x80 | 42]),
    ];
    let mut batt = Axp20xBattery::new(I2cMock::new(&expectations), ChipVariant::Axp221);
    assert!(matches!(batt.capacity(), Err(Error::NotAvailable)));
    assert_eq!(batt.capacity().unwrap(), 42);
    batt.free().done();
}

#[test]
fn absent_battery_reports_zero_energy() {
    let expectations = [
        I2cTrans::write_read(0x34, vec![0x01], vec![0x00]),
        I2cTrans::write_read(0x34, vec![0x01], vec![0x00]),
    ];
    let mut batt = Axp20xBattery::new(I2cMock::new(&expectations), ChipVariant::Axp209);
    assert_eq!(batt.energy_now().unwrap(), 0);
    assert_eq!(batt.energy_full().unwrap(), 0);
    batt.free().done();
}

#[test]
fn energy_now_scales_capacity_against_design() {
    let expectations = [
        I2cTrans::write_read(0x34, vec![0x01], vec![0b0010_0000]),
        I2cTrans::write_read(0x34, vec![0xB9], vec![50]),
    ];
    let mut batt = Axp20xBattery::new(I2cMock::new(&expectations), ChipVariant::Axp209);
    batt.provision(&BatteryInfo {
        energy_full_design_uwh: Some(10_000_000),
        ..Default::default()
    });
    assert_eq!(batt.energy_now().unwrap(), 5_000_000);
    batt.free().done();
}

#[test]
fn calibrate_preserves_unrelated_bits() {
    // CC_CTRL bit 0 and bit 6 belong to the coulomb counter and must survive.
    let expectations = [
        I2cTrans::write_read(0x34, vec![0xB8], vec![0b0100_0001]),
        I2cTrans::write(0x34, vec![0xB8, 0b0111_0001]),
        I2cTrans::write_read(0x34, vec![0xB8], vec![0b0111_0001]),
        I2cTrans::write(0x34, vec![0xB8, 0b0100_0001]),
    ];
    let mut batt = Axp20xBattery::new(I2cMock::new(&expectations), ChipVariant::Axp228);
    batt.set_calibrate(true).unwrap();
    batt.set_calibrate(false).unwrap();
    batt.free().done();
}

#[test]
fn calibrate_unsupported_on_plain_variants() {
    let mut batt = Axp20xBattery::new(I2cMock::new(&[]), ChipVariant::Axp209);
    assert!(matches!(batt.set_calibrate(true), Err(Error::NotSupported)));
    assert!(matches!(batt.calibrating(), Err(Error::NotSupported)));
    batt.free().done();
}

#[test]
fn min_voltage_roundtrip() {
    let expectations = [
        I2cTrans::write_read(0x34, vec![0x31], vec![0b1010_1010]),
        I2cTrans::write(0x34, vec![0x31, 0b1010_1100]),
        I2cTrans::write_read(0x34, vec![0x31], vec![0b1010_1100]),
    ];
    let mut batt = Axp20xBattery::new(I2cMock::new(&expectations), ChipVariant::Axp209);
    batt.set_min_voltage(3_000_000).unwrap();
    assert_eq!(batt.min_voltage().unwrap(), 3_000_000);
    batt.free().done();
}

#[test]
fn min_voltage_rejects_out_of_range() {
    let mut batt = Axp20xBattery::new(I2cMock::new(&[]), ChipVariant::Axp209);
    assert!(matches!(batt.set_min_voltage(2_599_999), Err(Error::OutOfRange)));
    assert!(matches!(batt.set_min_voltage(3_400_000), Err(Error::OutOfRange)));
    batt.free().done();
}

#[test]
fn min_voltage_axp717_field_is_shifted() {
    // VSYS_V_POWEROFF keeps the threshold in bits 6:4.
    let expectations = [
        I2cTrans::write_read(0x34, vec![0x24], vec![0x0F]),
        I2cTrans::write(0x34, vec![0x24, 0x7F]),
    ];
    let mut batt = Axp20xBattery::new(I2cMock::new(&expectations), ChipVariant::Axp717);
    batt.set_min_voltage(3_300_000).unwrap();
    batt.free().done();
}

#[test]
fn charge_current_set_floors_and_advises_on_raise() {
    let expectations = [
        // previous limit: field 3 -> 600 mA
        I2cTrans::write_read(0x34, vec![0x33], vec![0x43]),
        I2cTrans::write_read(0x34, vec![0x33], vec![0x43]),
        I2cTrans::write(0x34, vec![0x33, 0x47]),
        // previous limit: field 7 -> 1 A
        I2cTrans::write_read(0x34, vec![0x33], vec![0x47]),
        I2cTrans::write_read(0x34, vec![0x33], vec![0x47]),
        I2cTrans::write(0x34, vec![0x33, 0x42]),
    ];
    let mut batt = Axp20xBattery::new(I2cMock::new(&expectations), ChipVariant::Axp209);

    let update = batt.set_constant_charge_current_max(1_000_000).unwrap();
    assert_eq!(update.applied_ua, 1_000_000);
    assert!(update.raised_above_previous);

    let update = batt.set_constant_charge_current_max(500_000).unwrap();
    assert_eq!(update.applied_ua, 500_000);
    assert!(!update.raised_above_previous);

    batt.free().done();
}

#[test]
fn charge_current_clamps_to_field_width() {
    // AXP813: 4-bit field, 200 mA steps from a 200 mA offset. A request
    // above 3.2 A must program the top of the field, not wrap past it.
    let expectations = [
        I2cTrans::write_read(0x34, vec![0x33], vec![0x00]),
        I2cTrans::write_read(0x34, vec![0x33], vec![0x00]),
        I2cTrans::write(0x34, vec![0x33, 0x0F]),
        I2cTrans::write_read(0x34, vec![0x33], vec![0x0F]),
    ];
    let mut batt = Axp20xBattery::new(I2cMock::new(&expectations), ChipVariant::Axp813);
    let update = batt.set_constant_charge_current_max(3_400_000).unwrap();
    assert_eq!(update.applied_ua, 3_200_000);
    assert_eq!(batt.constant_charge_current_max().unwrap(), 3_200_000);
    batt.free().done();
}

#[test]
fn charge_current_below_offset_rejected() {
    let mut batt = Axp20xBattery::new(I2cMock::new(&[]), ChipVariant::Axp209);
    assert!(matches!(
        batt.set_constant_charge_current_max(100_000),
        Err(Error::OutOfRange)
    ));
    batt.free().done();
}

#[test]
fn charge_voltage_coarse_tiers() {
    let expectations = [
        I2cTrans::write_read(0x34, vec![0x33], vec![0xFF]),
        I2cTrans::write(0x34, vec![0x33, 0xDF]),
        I2cTrans::write_read(0x34, vec![0x33], vec![0x40]),
    ];
    let mut batt = Axp20xBattery::new(I2cMock::new(&expectations), ChipVariant::Axp209);
    batt.set_charge_voltage_max(4_200_000).unwrap();
    assert_eq!(batt.charge_voltage_max().unwrap(), 4_200_000);
    // Not one of the four AXP209 tiers.
    assert!(matches!(
        batt.set_charge_voltage_max(4_250_000),
        Err(Error::OutOfRange)
    ));
    batt.free().done();
}

#[test]
fn charge_voltage_axp717_table() {
    let expectations = [
        I2cTrans::write_read(0x34, vec![0x64], vec![0x00]),
        I2cTrans::write(0x34, vec![0x64, 0x07]),
        I2cTrans::write_read(0x34, vec![0x64], vec![0x05]),
    ];
    let mut batt = Axp20xBattery::new(I2cMock::new(&expectations), ChipVariant::Axp717);
    batt.set_charge_voltage_max(5_000_000).unwrap();
    assert!(matches!(
        batt.set_charge_voltage_max(4_500_000),
        Err(Error::OutOfRange)
    ));
    // Encodings 5 and 6 are reserved.
    assert!(matches!(batt.charge_voltage_max(), Err(Error::NotAvailable)));
    batt.free().done();
}

#[test]
fn status_single_charging_bit() {
    let expectations = [
        I2cTrans::write_read(0x34, vec![0x00], vec![0b0000_0100]),
        I2cTrans::write_read(0x34, vec![0x00], vec![0b0000_0000]),
    ];
    let mut batt = Axp20xBattery::new(I2cMock::new(&expectations), ChipVariant::Axp209);
    assert_eq!(batt.status().unwrap(), ChargingState::Charging);
    assert_eq!(batt.status().unwrap(), ChargingState::Discharging);
    batt.free().done();
}

#[test]
fn status_tri_state_field() {
    let expectations = [
        I2cTrans::write_read(0x34, vec![0x00], vec![0b0010_0000]),
        I2cTrans::write_read(0x34, vec![0x00], vec![0b0100_0000]),
        I2cTrans::write_read(0x34, vec![0x00], vec![0b0000_0000]),
        I2cTrans::write_read(0x34, vec![0x00], vec![0b0110_0000]),
    ];
    let mut batt = Axp20xBattery::new(I2cMock::new(&expectations), ChipVariant::Axp717);
    assert_eq!(batt.status().unwrap(), ChargingState::Charging);
    assert_eq!(batt.status().unwrap(), ChargingState::Discharging);
    assert_eq!(batt.status().unwrap(), ChargingState::NotCharging);
    assert_eq!(batt.status().unwrap(), ChargingState::Unknown);
    batt.free().done();
}

#[test]
fn set_charging_toggles_enable_bit() {
    let expectations = [
        I2cTrans::write_read(0x34, vec![0x33], vec![0x00]),
        I2cTrans::write(0x34, vec![0x33, 0x80]),
        I2cTrans::write_read(0x34, vec![0x33], vec![0x80]),
        I2cTrans::write(0x34, vec![0x33, 0x00]),
    ];
    let mut batt = Axp20xBattery::new(I2cMock::new(&expectations), ChipVariant::Axp209);
    batt.set_charging(true).unwrap();
    batt.set_charging(false).unwrap();
    batt.free().done();
}

#[test]
fn termination_current_scales_by_step() {
    let expectations = [I2cTrans::write_read(0x34, vec![0x63], vec![0x05])];
    let mut batt = Axp20xBattery::new(I2cMock::new(&expectations), ChipVariant::Axp717);
    assert_eq!(batt.termination_current().unwrap(), 320_000);
    batt.free().done();

    let mut batt = Axp20xBattery::new(I2cMock::new(&[]), ChipVariant::Axp209);
    assert!(matches!(batt.termination_current(), Err(Error::NotSupported)));
    batt.free().done();
}

#[test]
fn pmu_fault_decode() {
    let expectations = [I2cTrans::write_read(0x34, vec![0x08], vec![0b0000_0101])];
    let mut batt = Axp20xBattery::new(I2cMock::new(&expectations), ChipVariant::Axp717);
    assert_eq!(
        batt.pmu_faults().unwrap(),
        PmuFaults {
            under_voltage_lockout: true,
            over_temperature: false,
            under_temperature: true,
        }
    );
    batt.free().done();

    let mut batt = Axp20xBattery::new(I2cMock::new(&[]), ChipVariant::Axp209);
    assert!(matches!(batt.pmu_faults(), Err(Error::NotSupported)));
    batt.free().done();
}

#[test]
fn sense_reads_cache_and_derive_power() {
    let expectations = [
        // charging: current from the charge channel
        I2cTrans::write_read(0x34, vec![0x00], vec![0b0000_0100]),
        // discharging: current from the discharge channel, negated
        I2cTrans::write_read(0x34, vec![0x00], vec![0b0000_0000]),
    ];
    let mut batt = Axp20xBattery::with_sense(
        I2cMock::new(&expectations),
        ChipVariant::Axp209,
        Some(FixedSense(1_500_000)),
        Some(FixedSense(2_000_000)),
        Some(FixedSense(4_000_000)),
    );

    assert_eq!(batt.voltage_now().unwrap(), 4_000_000);
    assert_eq!(batt.current_now().unwrap(), 1_500_000);
    assert_eq!(batt.power_now(), 6_000_000);

    assert_eq!(batt.current_now().unwrap(), -2_000_000);
    assert_eq!(batt.power_now(), -8_000_000);

    batt.free().done();
}

#[test]
fn current_now_without_channel_not_supported() {
    let expectations = [I2cTrans::write_read(0x34, vec![0x00], vec![0b0000_0100])];
    let mut batt = Axp20xBattery::new(I2cMock::new(&expectations), ChipVariant::Axp209);
    assert!(matches!(batt.current_now(), Err(Error::NotSupported)));
    assert!(matches!(batt.voltage_now(), Err(Error::NotSupported)));
    batt.free().done();
}

#[test]
fn engine_dispatch_maps_properties() {
    let expectations = [
        I2cTrans::write_read(0x34, vec![0xB9], vec![42]),
        I2cTrans::write_read(0x34, vec![0x31], vec![0x07]),
        I2cTrans::write(0x34, vec![0x31, 0x00]),
    ];
    let mut batt = Axp20xBattery::new(I2cMock::new(&expectations), ChipVariant::Axp209);
    assert_eq!(batt.get(Property::Capacity).unwrap(), PropertyValue::Scalar(42));
    batt.set(Property::MinVoltage, 2_600_000).unwrap();
    assert!(matches!(
        batt.set(Property::Capacity, 50),
        Err(Error::NotSupported)
    ));
    assert!(matches!(
        batt.get(Property::FaultStatus),
        Err(Error::NotSupported)
    ));
    batt.free().done();
}

#[test]
fn writable_properties() {
    for prop in [
        Property::Status,
        Property::Calibrate,
        Property::ChargeCurrentMax,
        Property::ChargeVoltageMax,
        Property::MinVoltage,
    ] {
        assert!(property_is_writable(prop));
    }
    for prop in [
        Property::Present,
        Property::Capacity,
        Property::EnergyNow,
        Property::EnergyFullDesign,
        Property::PowerNow,
        Property::TerminationCurrent,
        Property::FaultStatus,
    ] {
        assert!(!property_is_writable(prop));
    }
}
