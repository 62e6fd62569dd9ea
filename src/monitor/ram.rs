//! RAM monitor construction.
//!
//! Memory devices expose a stable sensor layout, so selection is by
//! fixed index: load at 0, used data at 0, free data at 1. Voltage may
//! live on the motherboard; a temperature only exists on boards with
//! DIMM thermal sensors.

use super::{Monitor, MonitorKind};
use crate::config::DeviceConfig;
use crate::hal::{find_sensor, sensor_at_index, DeviceId, DeviceInfo, HardwareSource, SensorInfo, SensorType};
use crate::metric::{Metric, MetricKey, MetricSource};
use crate::units::Unit;

pub(crate) fn build(
    source: &dyn HardwareSource,
    device: &DeviceInfo,
    board: Option<&DeviceId>,
    cfg: &DeviceConfig,
) -> Monitor {
    let sensors = source.sensors(&device.id);
    let board_sensors: Vec<SensorInfo> = board
        .map(|b| source.sensors(b))
        .unwrap_or_default();
    let mut monitor = Monitor::new(device, cfg, MonitorKind::Ram);
    let mut metrics = Vec::new();

    if let Some(sensor) = find_sensor(&sensors, SensorType::Clock, |_| true) {
        metrics.push(Metric::new(
            MetricKey::RamClock,
            Unit::Megahertz,
            MetricSource::Sensor(sensor.id.clone()),
        ));
    }

    let voltage = find_sensor(&board_sensors, SensorType::Voltage, |s| s.name.contains("RAM"))
        .or_else(|| find_sensor(&sensors, SensorType::Voltage, |_| true));
    if let Some(sensor) = voltage {
        metrics.push(Metric::new(
            MetricKey::RamVoltage,
            Unit::Volts,
            MetricSource::Sensor(sensor.id.clone()),
        ));
    }

    if let Some(sensor) = sensor_at_index(&sensors, SensorType::Load, 0) {
        metrics.push(Metric::new(
            MetricKey::RamLoad,
            Unit::Percent,
            MetricSource::Sensor(sensor.id.clone()),
        ));
    }
    if let Some(sensor) = sensor_at_index(&sensors, SensorType::Data, 0) {
        metrics.push(Metric::new(
            MetricKey::RamUsed,
            Unit::Gigabyte,
            MetricSource::Sensor(sensor.id.clone()),
        ));
    }
    if let Some(sensor) = sensor_at_index(&sensors, SensorType::Data, 1) {
        metrics.push(Metric::new(
            MetricKey::RamFree,
            Unit::Gigabyte,
            MetricSource::Sensor(sensor.id.clone()),
        ));
    }

    let temp = find_sensor(&sensors, SensorType::Temperature, |s| s.name.contains("DIMM"))
        .or_else(|| find_sensor(&board_sensors, SensorType::Temperature, |s| s.name.contains("DIMM")));
    if let Some(sensor) = temp {
        metrics.push(Metric::new(
            MetricKey::RamTemp,
            Unit::Celsius,
            MetricSource::Sensor(sensor.id.clone()),
        ));
    }

    monitor.metrics = metrics;
    monitor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::DeviceClass;
    use crate::testutil::FakeSource;

    #[test]
    fn test_fixed_index_selection() {
        let mut source = FakeSource::new();
        let ram = source.add_device("ram0", DeviceClass::Memory, "Memory");
        source.add_sensor(&ram, SensorType::Load, 0, "Memory", Some(41.0));
        let used = source.add_sensor(&ram, SensorType::Data, 0, "Memory Used", Some(13.2));
        let free = source.add_sensor(&ram, SensorType::Data, 1, "Memory Available", Some(18.8));
        let info = source.device(&ram).unwrap();
        let monitor = build(&source, &info, None, &DeviceConfig::default());
        assert_eq!(
            monitor.metric(MetricKey::RamUsed).unwrap().source,
            MetricSource::Sensor(used)
        );
        assert_eq!(
            monitor.metric(MetricKey::RamFree).unwrap().source,
            MetricSource::Sensor(free)
        );
        assert!(monitor.metric(MetricKey::RamLoad).is_some());
        assert!(monitor.metric(MetricKey::RamTemp).is_none());
    }

    #[test]
    fn test_temp_requires_dimm_sensor() {
        let mut source = FakeSource::new();
        let board = source.add_device("board", DeviceClass::Motherboard, "Board");
        let ram = source.add_device("ram0", DeviceClass::Memory, "Memory");
        source.add_sensor(&board, SensorType::Temperature, 0, "System", Some(35.0));
        let info = source.device(&ram).unwrap();
        let monitor = build(&source, &info, Some(&board), &DeviceConfig::default());
        assert!(monitor.metric(MetricKey::RamTemp).is_none());

        let dimm = source.add_sensor(&board, SensorType::Temperature, 1, "DIMM A1", Some(38.0));
        let monitor = build(&source, &info, Some(&board), &DeviceConfig::default());
        assert_eq!(
            monitor.metric(MetricKey::RamTemp).unwrap().source,
            MetricSource::Sensor(dimm)
        );
    }

    #[test]
    fn test_board_ram_voltage_preferred() {
        let mut source = FakeSource::new();
        let board = source.add_device("board", DeviceClass::Motherboard, "Board");
        let ram = source.add_device("ram0", DeviceClass::Memory, "Memory");
        let want = source.add_sensor(&board, SensorType::Voltage, 2, "DRAM Voltage", None);
        let info = source.device(&ram).unwrap();
        // "DRAM Voltage" contains "RAM".
        let monitor = build(&source, &info, Some(&board), &DeviceConfig::default());
        assert_eq!(
            monitor.metric(MetricKey::RamVoltage).unwrap().source,
            MetricSource::Sensor(want)
        );
    }
}
