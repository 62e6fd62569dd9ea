//! GPU monitor construction.
//!
//! Vendors disagree on what a VRAM load is: some boards expose a load
//! sensor directly, others only used/total byte counters. When the
//! distinct "GPU Memory Used"/"GPU Memory Total" pair exists the VRAM
//! load becomes a ratio-derived metric recomputed every update. GPU
//! fans report duty cycle through a control-type sensor, not RPM.

use super::{Monitor, MonitorKind};
use crate::config::DeviceConfig;
use crate::hal::{find_sensor, sensor_at_index, DeviceInfo, HardwareSource, SensorType};
use crate::metric::{Metric, MetricKey, MetricSource};
use crate::units::Unit;

pub(crate) fn build(source: &dyn HardwareSource, device: &DeviceInfo, cfg: &DeviceConfig) -> Monitor {
    let sensors = source.sensors(&device.id);
    let mut monitor = Monitor::new(device, cfg, MonitorKind::Gpu);
    let mut metrics = Vec::new();

    if let Some(sensor) = find_sensor(&sensors, SensorType::Clock, |s| s.name.contains("Core")) {
        metrics.push(Metric::new(
            MetricKey::GpuCoreClock,
            Unit::Megahertz,
            MetricSource::Sensor(sensor.id.clone()),
        ));
    }
    if let Some(sensor) = find_sensor(&sensors, SensorType::Clock, |s| s.name.contains("Memory")) {
        metrics.push(Metric::new(
            MetricKey::GpuVramClock,
            Unit::Megahertz,
            MetricSource::Sensor(sensor.id.clone()),
        ));
    }

    let core_load = find_sensor(&sensors, SensorType::Load, |s| s.name.contains("Core"))
        .or_else(|| sensor_at_index(&sensors, SensorType::Load, 0));
    if let Some(sensor) = core_load {
        metrics.push(Metric::new(
            MetricKey::GpuCoreLoad,
            Unit::Percent,
            MetricSource::Sensor(sensor.id.clone()),
        ));
    }

    // VRAM load: ratio of the used/total counters when both exist,
    // otherwise whatever load sensor looks like memory.
    let used = find_sensor(&sensors, SensorType::Data, |s| s.name == "GPU Memory Used")
        .or_else(|| find_sensor(&sensors, SensorType::SmallData, |s| s.name == "GPU Memory Used"));
    let total = find_sensor(&sensors, SensorType::Data, |s| s.name == "GPU Memory Total")
        .or_else(|| find_sensor(&sensors, SensorType::SmallData, |s| s.name == "GPU Memory Total"));
    match (used, total) {
        (Some(used), Some(total)) if used.id != total.id => {
            metrics.push(Metric::new(
                MetricKey::GpuVramLoad,
                Unit::Percent,
                MetricSource::VramRatio {
                    used: used.id.clone(),
                    total: total.id.clone(),
                },
            ));
        }
        _ => {
            let fallback = find_sensor(&sensors, SensorType::Load, |s| s.name.contains("Memory"))
                .or_else(|| sensor_at_index(&sensors, SensorType::Load, 1));
            if let Some(sensor) = fallback {
                metrics.push(Metric::new(
                    MetricKey::GpuVramLoad,
                    Unit::Percent,
                    MetricSource::Sensor(sensor.id.clone()),
                ));
            }
        }
    }

    if let Some(sensor) = sensor_at_index(&sensors, SensorType::Voltage, 0) {
        metrics.push(Metric::new(
            MetricKey::GpuVoltage,
            Unit::Volts,
            MetricSource::Sensor(sensor.id.clone()),
        ));
    }
    if let Some(sensor) = sensor_at_index(&sensors, SensorType::Temperature, 0) {
        metrics.push(Metric::new(
            MetricKey::GpuTemp,
            Unit::Celsius,
            MetricSource::Sensor(sensor.id.clone()),
        ));
    }

    let fan = sensors
        .iter()
        .filter(|s| s.sensor_type == SensorType::Control)
        .min_by_key(|s| s.index);
    if let Some(sensor) = fan {
        metrics.push(Metric::new(
            MetricKey::GpuFan,
            Unit::Percent,
            MetricSource::Sensor(sensor.id.clone()),
        ));
    }

    monitor.metrics = metrics;
    monitor
}
