//! Fan bank monitor construction.
//!
//! One monitor per fan controller, one metric per fan header that
//! reports a value at all. Headers with nothing connected read null and
//! are skipped here; a fan that reads zero is built but hidden by the
//! per-update inactive filter unless ShowInactiveFans is set.

use super::{Monitor, MonitorKind};
use crate::config::DeviceConfig;
use crate::hal::{DeviceInfo, HardwareSource, SensorType};
use crate::metric::{Metric, MetricKey, MetricSource};
use crate::units::Unit;

pub(crate) fn build(source: &dyn HardwareSource, device: &DeviceInfo, cfg: &DeviceConfig) -> Monitor {
    let sensors = source.sensors(&device.id);
    let mut monitor = Monitor::new(device, cfg, MonitorKind::Fans { show_inactive: false });

    monitor.metrics = sensors
        .iter()
        .filter(|s| s.sensor_type == SensorType::Fan && s.value.is_some())
        .map(|s| {
            Metric::new(MetricKey::FanSpeed, Unit::Rpm, MetricSource::Sensor(s.id.clone()))
                .with_label(s.name.clone())
        })
        .collect();
    monitor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CategoryKind, OptionKey, OptionValue, Settings};
    use crate::hal::DeviceClass;
    use crate::testutil::FakeSource;

    fn controller(source: &mut FakeSource) -> DeviceInfo {
        let board = source.add_device("board", DeviceClass::Motherboard, "Board");
        let id = source.add_sub_device("sio", DeviceClass::SuperIo, "NCT6797D", &board);
        source.device(&id).unwrap()
    }

    #[test]
    fn test_one_metric_per_connected_header() {
        let mut source = FakeSource::new();
        let info = controller(&mut source);
        source.add_sensor(&info.id, SensorType::Fan, 0, "CPU Fan", Some(850.0));
        source.add_sensor(&info.id, SensorType::Fan, 1, "Chassis Fan #1", Some(0.0));
        source.add_sensor(&info.id, SensorType::Fan, 2, "Chassis Fan #2", None);
        source.add_sensor(&info.id, SensorType::Temperature, 0, "System", Some(35.0));
        let monitor = build(&source, &info, &DeviceConfig::default());
        let labels: Vec<&str> = monitor.metrics.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["CPU Fan", "Chassis Fan #1"]);
    }

    #[test]
    fn test_inactive_fans_hidden_per_update() {
        let mut source = FakeSource::new();
        let info = controller(&mut source);
        source.add_sensor(&info.id, SensorType::Fan, 0, "CPU Fan", Some(850.0));
        let chassis = source.add_sensor(&info.id, SensorType::Fan, 1, "Chassis Fan", Some(600.0));
        let mut settings = Settings::default();
        settings.normalize();

        let mut monitor = build(&source, &info, &DeviceConfig::default());
        monitor.apply_settings(&settings);
        monitor.update(&mut source);
        assert_eq!(monitor.visible_metrics().count(), 2);

        // Fan stops: it disappears from the visible set on the next tick
        // but stays in the metric list.
        source.set_sensor_value(&chassis, Some(0.0));
        monitor.update(&mut source);
        assert_eq!(monitor.visible_metrics().count(), 1);
        assert_eq!(monitor.metrics.len(), 2);

        let cat = settings.category_mut(CategoryKind::Fan).unwrap();
        cat.options
            .iter_mut()
            .find(|o| o.key == OptionKey::ShowInactiveFans)
            .unwrap()
            .value = OptionValue::Bool(true);
        monitor.apply_settings(&settings);
        assert_eq!(monitor.visible_metrics().count(), 2);
    }
}
