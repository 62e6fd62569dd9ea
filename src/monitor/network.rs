//! Network monitor construction.
//!
//! Throughput sensors are matched by name, and the IP metric is resolved
//! once at build time by joining the adapter's display name against the
//! OS interface list. Adapter names differ between the sensor library
//! and the OS ("Ethernet 2" vs "Realtek PCIe GbE"), so both sides are
//! compared with everything non-alphanumeric stripped.

use super::{Monitor, MonitorKind};
use crate::config::DeviceConfig;
use crate::hal::{find_sensor, DeviceInfo, HardwareSource, SensorType};
use crate::metric::{Metric, MetricKey, MetricSource};
use crate::units::{Unit, UnitConverter};

/// Strip everything non-alphanumeric and lowercase the rest.
pub(crate) fn clean_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

pub(crate) fn build(source: &dyn HardwareSource, device: &DeviceInfo, cfg: &DeviceConfig) -> Monitor {
    let sensors = source.sensors(&device.id);
    let mut monitor = Monitor::new(device, cfg, MonitorKind::Network);
    let mut metrics = Vec::new();

    // IP first so it renders above the rates.
    let wanted = clean_name(&device.name);
    let ip = source.interfaces().into_iter().find_map(|iface| {
        let matches = clean_name(&iface.name) == wanted || clean_name(&iface.description) == wanted;
        if matches {
            iface.ipv4.first().copied()
        } else {
            None
        }
    });
    if let Some(ip) = ip {
        metrics.push(Metric::new(
            MetricKey::NetworkIp,
            Unit::Ip,
            MetricSource::Static(ip.to_string()),
        ));
    }

    let down = find_sensor(&sensors, SensorType::Throughput, |s| {
        s.name.to_lowercase().contains("download")
    });
    if let Some(sensor) = down {
        metrics.push(
            Metric::new(
                MetricKey::NetworkIn,
                Unit::MegabytesPerSecond,
                MetricSource::Sensor(sensor.id.clone()),
            )
            .with_converter(UnitConverter::BytesToMegabytes),
        );
    }
    let up = find_sensor(&sensors, SensorType::Throughput, |s| {
        s.name.to_lowercase().contains("upload")
    });
    if let Some(sensor) = up {
        metrics.push(
            Metric::new(
                MetricKey::NetworkOut,
                Unit::MegabytesPerSecond,
                MetricSource::Sensor(sensor.id.clone()),
            )
            .with_converter(UnitConverter::BytesToMegabytes),
        );
    }

    monitor.metrics = metrics;
    monitor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{DeviceClass, NetInterface};
    use crate::testutil::FakeSource;
    use std::net::Ipv4Addr;

    fn iface(name: &str, description: &str, ipv4: &[Ipv4Addr]) -> NetInterface {
        NetInterface {
            name: name.to_string(),
            description: description.to_string(),
            ipv4: ipv4.to_vec(),
        }
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("Realtek PCIe GbE #2"), "realtekpciegbe2");
        assert_eq!(clean_name("eth0"), "eth0");
    }

    #[test]
    fn test_throughput_matched_case_insensitively() {
        let mut source = FakeSource::new();
        let id = source.add_device("net0", DeviceClass::Network, "Ethernet");
        let down = source.add_sensor(&id, SensorType::Throughput, 7, "Download Speed", Some(1.5e6));
        let up = source.add_sensor(&id, SensorType::Throughput, 8, "UPLOAD speed", Some(2.0e5));
        let info = source.device(&id).unwrap();
        let mut monitor = build(&source, &info, &DeviceConfig::default());
        assert_eq!(
            monitor.metric(MetricKey::NetworkIn).unwrap().source,
            MetricSource::Sensor(down)
        );
        assert_eq!(
            monitor.metric(MetricKey::NetworkOut).unwrap().source,
            MetricSource::Sensor(up)
        );

        monitor.update(&mut source);
        let m = monitor.metric(MetricKey::NetworkIn).unwrap();
        assert_eq!(m.text, "1.43 MB/s");
    }

    #[test]
    fn test_ip_resolved_by_cleaned_description() {
        let mut source = FakeSource::new();
        let id = source.add_device("net0", DeviceClass::Network, "Realtek PCIe GbE");
        source.set_interfaces(vec![
            iface("lo", "Loopback", &[Ipv4Addr::new(127, 0, 0, 1)]),
            iface(
                "Ethernet 2",
                "Realtek PCIe GbE!",
                &[Ipv4Addr::new(192, 168, 1, 20)],
            ),
        ]);
        let info = source.device(&id).unwrap();
        let monitor = build(&source, &info, &DeviceConfig::default());
        let ip = monitor.metric(MetricKey::NetworkIp).unwrap();
        assert_eq!(ip.text, "192.168.1.20");
    }

    #[test]
    fn test_no_interface_match_omits_ip_metric() {
        let mut source = FakeSource::new();
        let id = source.add_device("net0", DeviceClass::Network, "Wi-Fi");
        source.set_interfaces(vec![iface("eth0", "Ethernet", &[Ipv4Addr::new(10, 0, 0, 2)])]);
        let info = source.device(&id).unwrap();
        let monitor = build(&source, &info, &DeviceConfig::default());
        assert!(monitor.metric(MetricKey::NetworkIp).is_none());
    }
}
