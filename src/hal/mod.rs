//! Hardware collaborator surface.
//!
//! panelmon does not read registers, WMI or ACPI itself. It consumes a
//! [`HardwareSource`]: a tree of devices, each exposing typed sensors with
//! nullable values. The bundled `system` feature maps the `sysinfo` crate
//! onto this surface; embedders with a richer sensor library implement the
//! trait themselves.
//!
//! Devices and sensors are addressed by stable string identifiers rather
//! than object references, so monitors can survive a device vanishing
//! mid-cycle and configurations can join against live hardware across
//! sessions.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

#[cfg(feature = "system")]
pub mod system;

/// Stable identifier of a hardware device, unique within a source and
/// stable across sessions (e.g. `/nvme/0`, `/amdcpu/0`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identifier of a sensor within a source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SensorId(String);

impl SensorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SensorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Class of a hardware device as reported by the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceClass {
    Cpu,
    Memory,
    GpuNvidia,
    GpuAmd,
    Storage,
    Network,
    Motherboard,
    /// Super-I/O controller (motherboard sub-device carrying fan banks).
    SuperIo,
}

/// Type of a sensor reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorType {
    /// Clock frequency in MHz.
    Clock,
    /// Voltage in volts.
    Voltage,
    /// Temperature in °C.
    Temperature,
    /// Load in percent.
    Load,
    /// Fan speed in RPM.
    Fan,
    /// Control/duty-cycle in percent (GPU fans report this, not RPM).
    Control,
    /// Data size in GB.
    Data,
    /// Data size in MB.
    SmallData,
    /// Throughput in bytes per second.
    Throughput,
}

/// One sensor exposed by a device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorInfo {
    /// Stable identifier.
    pub id: SensorId,
    /// Sensor type.
    pub sensor_type: SensorType,
    /// Index within the device for this sensor type.
    pub index: u32,
    /// Vendor-reported sensor name (e.g. "CPU Core #1", "GPU Memory Used").
    pub name: String,
    /// Current reading; `None` when the sensor has no value this cycle.
    pub value: Option<f64>,
}

/// One device exposed by the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Stable identifier.
    pub id: DeviceId,
    /// Device class.
    pub class: DeviceClass,
    /// Hardware-reported display name.
    pub name: String,
    /// Parent device for sub-devices (fan controllers under the board).
    pub parent: Option<DeviceId>,
}

/// Capacity summary of a storage device, exposed through a public API
/// rather than scraped from library internals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSummary {
    /// Total capacity in bytes.
    pub total_bytes: u64,
    /// Free space in bytes.
    pub free_bytes: u64,
    /// Assigned drive letters / mount points, in display order.
    pub drive_letters: Vec<String>,
}

impl StorageSummary {
    /// Used space in bytes.
    pub fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.free_bytes)
    }

    /// Used space in percent; 100 when the total is zero.
    pub fn used_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            100.0
        } else {
            100.0 - 100.0 * self.free_bytes as f64 / self.total_bytes as f64
        }
    }
}

/// One OS network interface, used for IP-address resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetInterface {
    /// Interface name (e.g. "eth0", "Ethernet 2").
    pub name: String,
    /// Adapter description where the OS distinguishes it from the name.
    pub description: String,
    /// Unicast IPv4 addresses.
    pub ipv4: Vec<Ipv4Addr>,
}

/// A device appearing or disappearing at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HotplugEvent {
    Added(DeviceClass),
    Removed(DeviceClass),
}

impl HotplugEvent {
    pub fn class(&self) -> DeviceClass {
        match self {
            HotplugEvent::Added(c) | HotplugEvent::Removed(c) => *c,
        }
    }
}

/// Abstraction over the underlying hardware-sensor library.
///
/// All lookups are by stable id. "Not found" is `None`/empty, never an
/// error: sensors and devices are expected to come and go.
pub trait HardwareSource {
    /// All top-level devices currently visible (enabled classes only).
    fn devices(&self) -> Vec<DeviceInfo>;

    /// Sub-devices of the given device.
    fn sub_devices(&self, parent: &DeviceId) -> Vec<DeviceInfo>;

    /// Look up a single device.
    fn device(&self, id: &DeviceId) -> Option<DeviceInfo>;

    /// Sensors of a device, in the source's enumeration order.
    fn sensors(&self, device: &DeviceId) -> Vec<SensorInfo>;

    /// Current value of a sensor, if it exists and reports one.
    fn sensor_value(&self, id: &SensorId) -> Option<f64>;

    /// Re-read the device's sensors. Returns `false` when the device has
    /// vanished (hot-plug race); callers skip their update in that case.
    fn refresh_device(&mut self, id: &DeviceId) -> bool;

    /// Enable or disable monitoring of a device class.
    fn set_class_enabled(&mut self, class: DeviceClass, enabled: bool);

    /// Whether a device class is currently enabled.
    fn class_enabled(&self, class: DeviceClass) -> bool;

    /// Capacity summary for a storage device. `None` when the source
    /// cannot provide it; drive monitors then fall back to sensors only.
    fn storage_summary(&self, id: &DeviceId) -> Option<StorageSummary>;

    /// OS network interfaces for IP resolution.
    fn interfaces(&self) -> Vec<NetInterface> {
        Vec::new()
    }

    /// Hot-plug events queued since the last call.
    fn drain_hotplug(&mut self) -> Vec<HotplugEvent> {
        Vec::new()
    }
}

/// Find the first sensor of `sensor_type` matching `pred`, in enumeration
/// order. Shared helper for the category selection heuristics.
pub(crate) fn find_sensor<'a, F>(
    sensors: &'a [SensorInfo],
    sensor_type: SensorType,
    pred: F,
) -> Option<&'a SensorInfo>
where
    F: Fn(&SensorInfo) -> bool,
{
    sensors
        .iter()
        .find(|s| s.sensor_type == sensor_type && pred(s))
}

/// Find the sensor of `sensor_type` at the given index.
pub(crate) fn sensor_at_index(
    sensors: &[SensorInfo],
    sensor_type: SensorType,
    index: u32,
) -> Option<&SensorInfo> {
    find_sensor(sensors, sensor_type, |s| s.index == index)
}
