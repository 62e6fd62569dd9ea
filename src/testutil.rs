//! In-memory fake hardware source for unit tests.

use crate::hal::{
    DeviceClass, DeviceId, DeviceInfo, HardwareSource, HotplugEvent, NetInterface, SensorId,
    SensorInfo, SensorType, StorageSummary,
};
use std::collections::{HashMap, HashSet};

/// Scripted [`HardwareSource`]: devices, sensors and summaries are set up
/// by the test; refreshes record which devices were touched.
#[derive(Default)]
pub struct FakeSource {
    devices: Vec<DeviceInfo>,
    sensors: HashMap<DeviceId, Vec<SensorInfo>>,
    summaries: HashMap<DeviceId, StorageSummary>,
    interfaces: Vec<NetInterface>,
    disabled: HashSet<DeviceClass>,
    vanished: HashSet<DeviceId>,
    pending: Vec<HotplugEvent>,
    pub refreshed: Vec<DeviceId>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_device(&mut self, id: &str, class: DeviceClass, name: &str) -> DeviceId {
        let id = DeviceId::new(id);
        self.devices.push(DeviceInfo {
            id: id.clone(),
            class,
            name: name.to_string(),
            parent: None,
        });
        id
    }

    pub fn add_sub_device(
        &mut self,
        id: &str,
        class: DeviceClass,
        name: &str,
        parent: &DeviceId,
    ) -> DeviceId {
        let id = DeviceId::new(id);
        self.devices.push(DeviceInfo {
            id: id.clone(),
            class,
            name: name.to_string(),
            parent: Some(parent.clone()),
        });
        id
    }

    pub fn add_sensor(
        &mut self,
        device: &DeviceId,
        sensor_type: SensorType,
        index: u32,
        name: &str,
        value: Option<f64>,
    ) -> SensorId {
        let id = SensorId::new(format!("{}#{}", device.as_str(), name));
        self.sensors.entry(device.clone()).or_default().push(SensorInfo {
            id: id.clone(),
            sensor_type,
            index,
            name: name.to_string(),
            value,
        });
        id
    }

    pub fn set_sensor_value(&mut self, id: &SensorId, value: Option<f64>) {
        for sensors in self.sensors.values_mut() {
            for s in sensors.iter_mut() {
                if &s.id == id {
                    s.value = value;
                }
            }
        }
    }

    pub fn set_summary(&mut self, device: &DeviceId, summary: StorageSummary) {
        self.summaries.insert(device.clone(), summary);
    }

    pub fn set_interfaces(&mut self, interfaces: Vec<NetInterface>) {
        self.interfaces = interfaces;
    }

    /// Make a device report as vanished on its next refresh.
    pub fn remove_device(&mut self, id: &DeviceId) {
        self.vanished.insert(id.clone());
        self.devices.retain(|d| &d.id != id);
    }

    pub fn push_hotplug(&mut self, event: HotplugEvent) {
        self.pending.push(event);
    }
}

impl HardwareSource for FakeSource {
    fn devices(&self) -> Vec<DeviceInfo> {
        self.devices
            .iter()
            .filter(|d| d.parent.is_none() && !self.disabled.contains(&d.class))
            .cloned()
            .collect()
    }

    fn sub_devices(&self, parent: &DeviceId) -> Vec<DeviceInfo> {
        self.devices
            .iter()
            .filter(|d| d.parent.as_ref() == Some(parent))
            .cloned()
            .collect()
    }

    fn device(&self, id: &DeviceId) -> Option<DeviceInfo> {
        self.devices.iter().find(|d| &d.id == id).cloned()
    }

    fn sensors(&self, device: &DeviceId) -> Vec<SensorInfo> {
        self.sensors.get(device).cloned().unwrap_or_default()
    }

    fn sensor_value(&self, id: &SensorId) -> Option<f64> {
        self.sensors
            .values()
            .flatten()
            .find(|s| &s.id == id)
            .and_then(|s| s.value)
    }

    fn refresh_device(&mut self, id: &DeviceId) -> bool {
        self.refreshed.push(id.clone());
        !self.vanished.contains(id)
    }

    fn set_class_enabled(&mut self, class: DeviceClass, enabled: bool) {
        if enabled {
            self.disabled.remove(&class);
        } else {
            self.disabled.insert(class);
        }
    }

    fn class_enabled(&self, class: DeviceClass) -> bool {
        !self.disabled.contains(&class)
    }

    fn storage_summary(&self, id: &DeviceId) -> Option<StorageSummary> {
        self.summaries.get(id).cloned()
    }

    fn interfaces(&self) -> Vec<NetInterface> {
        self.interfaces.clone()
    }

    fn drain_hotplug(&mut self) -> Vec<HotplugEvent> {
        std::mem::take(&mut self.pending)
    }
}
