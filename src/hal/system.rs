//! `sysinfo`-backed hardware source.
//!
//! Maps the cross-platform `sysinfo` crate onto [`HardwareSource`]. The
//! mapping is necessarily partial: `sysinfo` exposes no voltages, no fan
//! tachometers and no per-drive transfer rates, so the corresponding
//! sensors are simply absent and their metrics show the no-data
//! placeholder. Embedders wanting full coverage plug in their own source.
//!
//! # Platform Support
//!
//! | Platform | CPU | Memory | Storage | Network | Temperatures |
//! |----------|-----|--------|---------|---------|--------------|
//! | Linux    | ✅  | ✅     | ✅      | ✅      | ✅           |
//! | macOS    | ✅  | ✅     | ✅      | ✅      | ✅           |
//! | Windows  | ✅  | ✅     | ✅      | ✅      | ⚠️ partial    |

use super::{
    DeviceClass, DeviceId, DeviceInfo, HardwareSource, HotplugEvent, NetInterface, SensorId,
    SensorInfo, SensorType, StorageSummary,
};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::net::IpAddr;
use std::time::Instant;
use sysinfo::{Components, CpuRefreshKind, Disks, MemoryRefreshKind, Networks, RefreshKind, System};

const CPU_DEVICE: &str = "cpu";
const RAM_DEVICE: &str = "ram";

/// Hardware source built on the `sysinfo` crate.
pub struct SystemSource {
    sys: System,
    disks: Disks,
    networks: Networks,
    components: Components,
    enabled: HashSet<DeviceClass>,
    /// Byte rates per interface, derived from deltas between refreshes.
    net_rates: HashMap<String, (f64, f64)>,
    last_net_refresh: Instant,
    known_disks: BTreeSet<String>,
    pending: Vec<HotplugEvent>,
}

impl SystemSource {
    pub fn new() -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::everything())
                .with_memory(MemoryRefreshKind::everything()),
        );
        let disks = Disks::new_with_refreshed_list();
        let known_disks = disks
            .iter()
            .map(|d| d.mount_point().to_string_lossy().to_string())
            .collect();
        Self {
            sys,
            disks,
            networks: Networks::new_with_refreshed_list(),
            components: Components::new_with_refreshed_list(),
            enabled: [
                DeviceClass::Cpu,
                DeviceClass::Memory,
                DeviceClass::Storage,
                DeviceClass::Network,
            ]
            .into_iter()
            .collect(),
            net_rates: HashMap::new(),
            last_net_refresh: Instant::now(),
            known_disks,
            pending: Vec::new(),
        }
    }

    fn disk_device_id(mount: &str) -> DeviceId {
        DeviceId::new(format!("disk:{mount}"))
    }

    fn net_device_id(name: &str) -> DeviceId {
        DeviceId::new(format!("net:{name}"))
    }

    fn sensor_id(device: &DeviceId, kind: &str, index: u32) -> SensorId {
        SensorId::new(format!("{}#{kind}/{index}", device.as_str()))
    }

    /// First component whose label matches `pred`, when it has a reading.
    fn component_temp<F>(&self, pred: F) -> Option<f64>
    where
        F: Fn(&str) -> bool,
    {
        self.components
            .iter()
            .find(|c| pred(&c.label().to_lowercase()))
            .map(|c| c.temperature() as f64)
            .filter(|t| t.is_finite())
    }

    fn cpu_sensors(&self) -> Vec<SensorInfo> {
        let device = DeviceId::new(CPU_DEVICE);
        let mut out = Vec::new();
        out.push(SensorInfo {
            id: Self::sensor_id(&device, "load", 0),
            sensor_type: SensorType::Load,
            index: 0,
            name: "CPU Total".to_string(),
            value: Some(self.sys.global_cpu_usage() as f64),
        });
        for (i, cpu) in self.sys.cpus().iter().enumerate() {
            let n = i as u32;
            out.push(SensorInfo {
                id: Self::sensor_id(&device, "coreload", n),
                sensor_type: SensorType::Load,
                index: n + 1,
                name: format!("CPU Core #{}", n + 1),
                value: Some(cpu.cpu_usage() as f64),
            });
            out.push(SensorInfo {
                id: Self::sensor_id(&device, "clock", n),
                sensor_type: SensorType::Clock,
                index: n,
                name: format!("Core #{}", n + 1),
                value: Some(cpu.frequency() as f64),
            });
        }
        let temp = self.component_temp(|l| {
            l.contains("cpu") || l.contains("tctl") || l.contains("package") || l.contains("core")
        });
        out.push(SensorInfo {
            id: Self::sensor_id(&device, "temp", 0),
            sensor_type: SensorType::Temperature,
            index: 0,
            name: "CPU Package".to_string(),
            value: temp,
        });
        out
    }

    fn ram_sensors(&self) -> Vec<SensorInfo> {
        let device = DeviceId::new(RAM_DEVICE);
        let total = self.sys.total_memory() as f64;
        let used = self.sys.used_memory() as f64;
        let load = if total > 0.0 { 100.0 * used / total } else { 0.0 };
        const GB: f64 = 1024.0 * 1024.0 * 1024.0;
        let mut out = vec![
            SensorInfo {
                id: Self::sensor_id(&device, "load", 0),
                sensor_type: SensorType::Load,
                index: 0,
                name: "Memory".to_string(),
                value: Some(load),
            },
            SensorInfo {
                id: Self::sensor_id(&device, "data", 0),
                sensor_type: SensorType::Data,
                index: 0,
                name: "Memory Used".to_string(),
                value: Some(used / GB),
            },
            SensorInfo {
                id: Self::sensor_id(&device, "data", 1),
                sensor_type: SensorType::Data,
                index: 1,
                name: "Memory Available".to_string(),
                value: Some((total - used).max(0.0) / GB),
            },
        ];
        if let Some(temp) = self.component_temp(|l| l.contains("dimm")) {
            out.push(SensorInfo {
                id: Self::sensor_id(&device, "temp", 0),
                sensor_type: SensorType::Temperature,
                index: 0,
                name: "DIMM".to_string(),
                value: Some(temp),
            });
        }
        out
    }

    fn disk_sensors(&self, mount: &str) -> Vec<SensorInfo> {
        let device = Self::disk_device_id(mount);
        let temp = self.component_temp(|l| {
            l.contains("nvme") || l.contains("disk") || l.contains("composite")
        });
        vec![SensorInfo {
            id: Self::sensor_id(&device, "temp", 0),
            sensor_type: SensorType::Temperature,
            index: 0,
            name: "Temperature".to_string(),
            value: temp,
        }]
    }

    fn net_sensors(&self, name: &str) -> Vec<SensorInfo> {
        let device = Self::net_device_id(name);
        let (rx, tx) = self.net_rates.get(name).copied().unwrap_or((0.0, 0.0));
        vec![
            SensorInfo {
                id: Self::sensor_id(&device, "down", 0),
                sensor_type: SensorType::Throughput,
                index: 0,
                name: "Download Speed".to_string(),
                value: Some(rx),
            },
            SensorInfo {
                id: Self::sensor_id(&device, "up", 1),
                sensor_type: SensorType::Throughput,
                index: 1,
                name: "Upload Speed".to_string(),
                value: Some(tx),
            },
        ]
    }

    /// Rebuild the disk list and queue hot-plug events for mounts that
    /// appeared or disappeared since the last scan.
    fn rescan_disks(&mut self) {
        self.disks = Disks::new_with_refreshed_list();
        let current: BTreeSet<String> = self
            .disks
            .iter()
            .map(|d| d.mount_point().to_string_lossy().to_string())
            .collect();
        for added in current.difference(&self.known_disks) {
            log::info!("storage device appeared at {added}");
            self.pending.push(HotplugEvent::Added(DeviceClass::Storage));
        }
        for removed in self.known_disks.difference(&current) {
            log::info!("storage device removed from {removed}");
            self.pending.push(HotplugEvent::Removed(DeviceClass::Storage));
        }
        self.known_disks = current;
    }

    fn refresh_networks(&mut self) {
        self.networks.refresh();
        let elapsed = self.last_net_refresh.elapsed().as_secs_f64().max(0.001);
        self.last_net_refresh = Instant::now();
        self.net_rates = self
            .networks
            .iter()
            .map(|(name, data)| {
                (
                    name.clone(),
                    (
                        data.received() as f64 / elapsed,
                        data.transmitted() as f64 / elapsed,
                    ),
                )
            })
            .collect();
    }
}

impl Default for SystemSource {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareSource for SystemSource {
    fn devices(&self) -> Vec<DeviceInfo> {
        let mut out = Vec::new();
        if self.enabled.contains(&DeviceClass::Cpu) {
            let name = self
                .sys
                .cpus()
                .first()
                .map(|c| c.brand().trim().to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "CPU".to_string());
            out.push(DeviceInfo {
                id: DeviceId::new(CPU_DEVICE),
                class: DeviceClass::Cpu,
                name,
                parent: None,
            });
        }
        if self.enabled.contains(&DeviceClass::Memory) {
            out.push(DeviceInfo {
                id: DeviceId::new(RAM_DEVICE),
                class: DeviceClass::Memory,
                name: "Memory".to_string(),
                parent: None,
            });
        }
        if self.enabled.contains(&DeviceClass::Storage) {
            for disk in self.disks.iter() {
                let mount = disk.mount_point().to_string_lossy().to_string();
                let name = disk.name().to_string_lossy().to_string();
                out.push(DeviceInfo {
                    id: Self::disk_device_id(&mount),
                    class: DeviceClass::Storage,
                    name: if name.is_empty() { mount } else { name },
                    parent: None,
                });
            }
        }
        if self.enabled.contains(&DeviceClass::Network) {
            for (name, _) in self.networks.iter() {
                out.push(DeviceInfo {
                    id: Self::net_device_id(name),
                    class: DeviceClass::Network,
                    name: name.clone(),
                    parent: None,
                });
            }
        }
        out
    }

    fn sub_devices(&self, _parent: &DeviceId) -> Vec<DeviceInfo> {
        // sysinfo exposes no fan controllers or other sub-devices.
        Vec::new()
    }

    fn device(&self, id: &DeviceId) -> Option<DeviceInfo> {
        self.devices().into_iter().find(|d| &d.id == id)
    }

    fn sensors(&self, device: &DeviceId) -> Vec<SensorInfo> {
        match device.as_str() {
            CPU_DEVICE => self.cpu_sensors(),
            RAM_DEVICE => self.ram_sensors(),
            other => {
                if let Some(mount) = other.strip_prefix("disk:") {
                    self.disk_sensors(mount)
                } else if let Some(name) = other.strip_prefix("net:") {
                    self.net_sensors(name)
                } else {
                    Vec::new()
                }
            }
        }
    }

    fn sensor_value(&self, id: &SensorId) -> Option<f64> {
        let (device, _) = id.as_str().split_once('#')?;
        self.sensors(&DeviceId::new(device))
            .into_iter()
            .find(|s| &s.id == id)
            .and_then(|s| s.value)
    }

    fn refresh_device(&mut self, id: &DeviceId) -> bool {
        match id.as_str() {
            CPU_DEVICE => {
                self.sys
                    .refresh_cpu_specifics(CpuRefreshKind::everything());
                self.components.refresh();
                true
            }
            RAM_DEVICE => {
                self.sys.refresh_memory();
                true
            }
            other => {
                if let Some(mount) = other.strip_prefix("disk:") {
                    self.rescan_disks();
                    self.known_disks.contains(mount)
                } else if other.strip_prefix("net:").is_some() {
                    self.refresh_networks();
                    self.device(id).is_some()
                } else {
                    false
                }
            }
        }
    }

    fn set_class_enabled(&mut self, class: DeviceClass, enabled: bool) {
        if enabled {
            self.enabled.insert(class);
        } else {
            self.enabled.remove(&class);
        }
    }

    fn class_enabled(&self, class: DeviceClass) -> bool {
        self.enabled.contains(&class)
    }

    fn storage_summary(&self, id: &DeviceId) -> Option<StorageSummary> {
        let mount = id.as_str().strip_prefix("disk:")?;
        let disk = self
            .disks
            .iter()
            .find(|d| d.mount_point().to_string_lossy() == mount)?;
        Some(StorageSummary {
            total_bytes: disk.total_space(),
            free_bytes: disk.available_space(),
            drive_letters: vec![mount.to_string()],
        })
    }

    fn interfaces(&self) -> Vec<NetInterface> {
        self.networks
            .iter()
            .map(|(name, data)| NetInterface {
                name: name.clone(),
                description: name.clone(),
                ipv4: data
                    .ip_networks()
                    .iter()
                    .filter_map(|ip| match ip.addr {
                        IpAddr::V4(v4) => Some(v4),
                        IpAddr::V6(_) => None,
                    })
                    .collect(),
            })
            .collect()
    }

    fn drain_hotplug(&mut self) -> Vec<HotplugEvent> {
        std::mem::take(&mut self.pending)
    }
}
