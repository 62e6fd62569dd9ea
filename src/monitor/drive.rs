//! Drive monitor construction.
//!
//! Capacity readings come from the source's storage summary rather than
//! discrete sensors, so used/free/load are computed metrics refreshed
//! from the summary (re-read every tick, or at the ThrottleInterval
//! cadence when set), and the display name follows the drive's current
//! letters. Transfer rates sit at the source's fixed load indices 51
//! (read) and 52 (write).

use super::{Monitor, MonitorKind, SummaryCache};
use crate::config::DeviceConfig;
use crate::hal::{find_sensor, sensor_at_index, DeviceInfo, HardwareSource, SensorType};
use crate::metric::{Metric, MetricKey, MetricSource};
use crate::units::{Unit, UnitConverter};

const READ_RATE_INDEX: u32 = 51;
const WRITE_RATE_INDEX: u32 = 52;

pub(crate) fn build(source: &dyn HardwareSource, device: &DeviceInfo, cfg: &DeviceConfig) -> Monitor {
    let sensors = source.sensors(&device.id);
    let mut monitor = Monitor::new(
        device,
        cfg,
        MonitorKind::Drive {
            show_load_bar: true,
            summary: SummaryCache::new(),
        },
    );
    let mut metrics = vec![
        Metric::new(MetricKey::DriveLoadBar, Unit::Percent, MetricSource::Computed),
        Metric::new(MetricKey::DriveLoad, Unit::Percent, MetricSource::Computed),
        Metric::new(MetricKey::DriveUsed, Unit::Gigabyte, MetricSource::Computed)
            .with_converter(UnitConverter::BytesToGigabytes),
        Metric::new(MetricKey::DriveFree, Unit::Gigabyte, MetricSource::Computed)
            .with_converter(UnitConverter::BytesToGigabytes),
    ];

    if let Some(sensor) = sensor_at_index(&sensors, SensorType::Load, READ_RATE_INDEX) {
        metrics.push(
            Metric::new(
                MetricKey::DriveRead,
                Unit::MegabytesPerSecond,
                MetricSource::Sensor(sensor.id.clone()),
            )
            .with_converter(UnitConverter::BytesToMegabytes),
        );
    }
    if let Some(sensor) = sensor_at_index(&sensors, SensorType::Load, WRITE_RATE_INDEX) {
        metrics.push(
            Metric::new(
                MetricKey::DriveWrite,
                Unit::MegabytesPerSecond,
                MetricSource::Sensor(sensor.id.clone()),
            )
            .with_converter(UnitConverter::BytesToMegabytes),
        );
    }
    if let Some(sensor) = find_sensor(&sensors, SensorType::Temperature, |_| true) {
        metrics.push(Metric::new(
            MetricKey::DriveTemp,
            Unit::Celsius,
            MetricSource::Sensor(sensor.id.clone()),
        ));
    }

    // Adopt the drive letters as the display name straight away when the
    // summary is available; update() keeps it current afterwards.
    if let Some(summary) = source.storage_summary(&device.id) {
        if !summary.drive_letters.is_empty() {
            monitor.name = summary.drive_letters.join(", ");
        }
    }

    monitor.metrics = metrics;
    monitor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{DeviceClass, StorageSummary};
    use crate::metric::NO_DATA;
    use crate::testutil::FakeSource;

    fn summary(total: u64, free: u64, letters: &[&str]) -> StorageSummary {
        StorageSummary {
            total_bytes: total,
            free_bytes: free,
            drive_letters: letters.iter().map(|s| s.to_string()).collect(),
        }
    }

    const GB: u64 = 1024 * 1024 * 1024;

    #[test]
    fn test_capacity_metrics_follow_summary() {
        let mut source = FakeSource::new();
        let id = source.add_device("nvme0", DeviceClass::Storage, "Samsung 980");
        source.set_summary(&id, summary(1000 * GB, 250 * GB, &["C:"]));
        let info = source.device(&id).unwrap();
        let mut monitor = build(&source, &info, &DeviceConfig::default());
        monitor.update(&mut source);
        assert_eq!(monitor.metric(MetricKey::DriveUsed).unwrap().text, "750 GB");
        assert_eq!(monitor.metric(MetricKey::DriveFree).unwrap().text, "250 GB");
        assert_eq!(monitor.metric(MetricKey::DriveLoad).unwrap().text, "75%");
        assert_eq!(monitor.metric(MetricKey::DriveLoadBar).unwrap().value, 75.0);
    }

    #[test]
    fn test_name_follows_drive_letters() {
        let mut source = FakeSource::new();
        let id = source.add_device("nvme0", DeviceClass::Storage, "Samsung 980");
        source.set_summary(&id, summary(100 * GB, 50 * GB, &["D:", "E:"]));
        let info = source.device(&id).unwrap();
        let mut monitor = build(&source, &info, &DeviceConfig::default());
        assert_eq!(monitor.name, "D:, E:");
        assert_eq!(monitor.actual_name, "Samsung 980");

        source.set_summary(&id, summary(100 * GB, 50 * GB, &["D:"]));
        monitor.update(&mut source);
        assert_eq!(monitor.name, "D:");
    }

    #[test]
    fn test_name_falls_back_to_hardware_name() {
        let mut source = FakeSource::new();
        let id = source.add_device("nvme0", DeviceClass::Storage, "Samsung 980");
        source.set_summary(&id, summary(100 * GB, 50 * GB, &[]));
        let info = source.device(&id).unwrap();
        let monitor = build(&source, &info, &DeviceConfig::default());
        assert_eq!(monitor.name, "Samsung 980");
    }

    #[test]
    fn test_rate_sensors_at_fixed_indices() {
        let mut source = FakeSource::new();
        let id = source.add_device("nvme0", DeviceClass::Storage, "Samsung 980");
        source.add_sensor(&id, SensorType::Load, 0, "Used Space", Some(42.0));
        let read = source.add_sensor(&id, SensorType::Load, 51, "Read Activity", Some(2.0e6));
        let write = source.add_sensor(&id, SensorType::Load, 52, "Write Activity", Some(1.0e6));
        let info = source.device(&id).unwrap();
        let monitor = build(&source, &info, &DeviceConfig::default());
        assert_eq!(
            monitor.metric(MetricKey::DriveRead).unwrap().source,
            MetricSource::Sensor(read)
        );
        assert_eq!(
            monitor.metric(MetricKey::DriveWrite).unwrap().source,
            MetricSource::Sensor(write)
        );
    }

    #[test]
    fn test_throttle_interval_caches_summary_between_reads() {
        use crate::config::{CategoryKind, OptionKey, OptionValue, Settings};

        let mut source = FakeSource::new();
        let id = source.add_device("nvme0", DeviceClass::Storage, "Samsung 980");
        source.set_summary(&id, summary(1000 * GB, 500 * GB, &["C:"]));
        let info = source.device(&id).unwrap();
        let mut monitor = build(&source, &info, &DeviceConfig::default());

        let mut settings = Settings::default();
        settings.normalize();
        settings
            .category_mut(CategoryKind::Storage)
            .unwrap()
            .options
            .iter_mut()
            .find(|o| o.key == OptionKey::ThrottleInterval)
            .unwrap()
            .value = OptionValue::Int64(60_000);
        monitor.apply_settings(&settings);

        monitor.update(&mut source);
        assert_eq!(monitor.metric(MetricKey::DriveUsed).unwrap().text, "500 GB");

        // Capacity changes on disk, but the cached summary still feeds
        // the metrics until the interval elapses.
        source.set_summary(&id, summary(1000 * GB, 200 * GB, &["C:"]));
        monitor.update(&mut source);
        assert_eq!(monitor.metric(MetricKey::DriveUsed).unwrap().text, "500 GB");

        // Dropping the interval back to zero re-reads on the next tick.
        settings
            .category_mut(CategoryKind::Storage)
            .unwrap()
            .options
            .iter_mut()
            .find(|o| o.key == OptionKey::ThrottleInterval)
            .unwrap()
            .value = OptionValue::Int64(0);
        monitor.apply_settings(&settings);
        monitor.update(&mut source);
        assert_eq!(monitor.metric(MetricKey::DriveUsed).unwrap().text, "800 GB");
    }

    #[test]
    fn test_used_space_alert_applies_to_load_only() {
        use crate::config::{CategoryKind, OptionKey, OptionValue, Settings};

        let mut source = FakeSource::new();
        let id = source.add_device("nvme0", DeviceClass::Storage, "Samsung 980");
        source.set_summary(&id, summary(1000 * GB, 100 * GB, &["C:"]));
        let info = source.device(&id).unwrap();
        let mut monitor = build(&source, &info, &DeviceConfig::default());

        let mut settings = Settings::default();
        settings.normalize();
        settings
            .category_mut(CategoryKind::Storage)
            .unwrap()
            .options
            .iter_mut()
            .find(|o| o.key == OptionKey::UsedSpaceAlert)
            .unwrap()
            .value = OptionValue::Int16(85);
        monitor.apply_settings(&settings);
        monitor.update(&mut source);

        let load = monitor.metric(MetricKey::DriveLoad).unwrap();
        assert_eq!(load.alert_threshold, 85);
        assert!(load.alert_active);
        let bar = monitor.metric(MetricKey::DriveLoadBar).unwrap();
        assert_eq!(bar.alert_threshold, 0);
        assert!(!bar.alert_active);
    }

    #[test]
    fn test_missing_summary_shows_no_data() {
        let mut source = FakeSource::new();
        let id = source.add_device("nvme0", DeviceClass::Storage, "Samsung 980");
        let info = source.device(&id).unwrap();
        let mut monitor = build(&source, &info, &DeviceConfig::default());
        monitor.update(&mut source);
        assert_eq!(monitor.metric(MetricKey::DriveUsed).unwrap().text, NO_DATA);
        assert_eq!(monitor.metric(MetricKey::DriveLoad).unwrap().text, NO_DATA);
    }
}
