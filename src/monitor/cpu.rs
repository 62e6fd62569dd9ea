//! CPU monitor construction.
//!
//! CPU sensor layouts vary wildly between vendors and generations, so
//! every reading is found through an ordered fallback chain rather than
//! a fixed index. Voltage, temperature and fan readings may come from
//! the motherboard instead of the CPU device itself.

use super::{Monitor, MonitorKind};
use crate::config::DeviceConfig;
use crate::hal::{find_sensor, sensor_at_index, DeviceId, DeviceInfo, HardwareSource, SensorInfo, SensorType};
use crate::metric::{Metric, MetricKey, MetricSource};
use crate::units::Unit;

/// Parse a core index out of names like `CPU Core #3` or `Core #1 VID`-
/// style variants: the name must mention CPU or Core before its last `#`
/// and end in the index digits.
pub(crate) fn parse_core_index(name: &str) -> Option<u32> {
    let (head, tail) = name.rsplit_once('#')?;
    if !head.contains("CPU") && !head.contains("Core") {
        return None;
    }
    tail.parse().ok()
}

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
    let mut monitor = Monitor::new(device, cfg, MonitorKind::Cpu);
    let mut metrics = Vec::new();

    // Core clocks, ascending by parsed index. With several cores each
    // metric is labeled by its index; a lone clock keeps the plain label.
    let mut clocks: Vec<(u32, &SensorInfo)> = sensors
        .iter()
        .filter(|s| s.sensor_type == SensorType::Clock)
        .filter_map(|s| parse_core_index(&s.name).map(|i| (i, s)))
        .collect();
    clocks.sort_by_key(|(i, _)| *i);
    let labeled = clocks.len() > 1;
    for (i, sensor) in &clocks {
        let mut metric = Metric::new(
            MetricKey::CpuClock,
            Unit::Megahertz,
            MetricSource::Sensor(sensor.id.clone()),
        );
        if labeled {
            metric = metric.with_label(format!("Core #{i}"));
        }
        metrics.push(metric);
    }

    // Voltage: board sensor mentioning CPU, else the CPU's own first.
    let voltage = find_sensor(&board_sensors, SensorType::Voltage, |s| s.name.contains("CPU"))
        .or_else(|| find_sensor(&sensors, SensorType::Voltage, |_| true));
    if let Some(sensor) = voltage {
        metrics.push(Metric::new(
            MetricKey::CpuVoltage,
            Unit::Volts,
            MetricSource::Sensor(sensor.id.clone()),
        ));
    }

    // Temperature: multi-die max, then board CPU sensor, then the
    // package/Tdie readings, then whatever temperature exists.
    let temp = find_sensor(&sensors, SensorType::Temperature, |s| {
        s.name.contains("CCDs Max (Tdie)")
    })
    .or_else(|| find_sensor(&board_sensors, SensorType::Temperature, |s| s.name.contains("CPU")))
    .or_else(|| {
        find_sensor(&sensors, SensorType::Temperature, |s| {
            s.name == "CPU Package" || s.name.contains("Tdie")
        })
    })
    .or_else(|| find_sensor(&sensors, SensorType::Temperature, |_| true));
    if let Some(sensor) = temp {
        metrics.push(Metric::new(
            MetricKey::CpuTemp,
            Unit::Celsius,
            MetricSource::Sensor(sensor.id.clone()),
        ));
    }

    // Fan: board fan mentioning CPU; else a fan controller sub-device of
    // the board carrying one (adopted as an aux refresh target); else the
    // CPU's own first fan.
    let mut fan = find_sensor(&board_sensors, SensorType::Fan, |s| s.name.contains("CPU"))
        .map(|s| s.id.clone());
    if fan.is_none() {
        if let Some(board) = board {
            'search: for sub in source.sub_devices(board) {
                for sensor in source.sensors(&sub.id) {
                    if sensor.sensor_type == SensorType::Fan
                        && sensor.name.to_lowercase().contains("cpu")
                    {
                        fan = Some(sensor.id.clone());
                        monitor.aux_devices.push(sub.id.clone());
                        break 'search;
                    }
                }
            }
        }
    }
    if fan.is_none() {
        fan = find_sensor(&sensors, SensorType::Fan, |_| true).map(|s| s.id.clone());
    }
    if let Some(id) = fan {
        metrics.push(Metric::new(MetricKey::CpuFan, Unit::Rpm, MetricSource::Sensor(id)));
    }

    // Load: index 0 is the total, higher indices are per-core loads.
    if let Some(sensor) = sensor_at_index(&sensors, SensorType::Load, 0) {
        metrics.push(Metric::new(
            MetricKey::CpuLoad,
            Unit::Percent,
            MetricSource::Sensor(sensor.id.clone()),
        ));
    }
    let mut core_loads: Vec<&SensorInfo> = sensors
        .iter()
        .filter(|s| s.sensor_type == SensorType::Load && s.index >= 1)
        .collect();
    core_loads.sort_by_key(|s| s.index);
    for sensor in core_loads {
        metrics.push(
            Metric::new(
                MetricKey::CpuCoreLoad,
                Unit::Percent,
                MetricSource::Sensor(sensor.id.clone()),
            )
            .with_label(format!("Core {}", sensor.index)),
        );
    }

    monitor.metrics = metrics;
    monitor
}
