//! Runtime monitor model.
//!
//! A [`Monitor`] is the live counterpart of one hardware device in one
//! category: it discovers the device's relevant sensors at construction
//! (category-specific selection lives in the submodules), owns the
//! resulting [`Metric`] list, and refreshes it every polling tick. A
//! [`Panel`] groups the monitors of one enabled category.
//!
//! Category-specific behavior is carried by the [`MonitorKind`] payload
//! on a single concrete type; there is no monitor trait hierarchy.

use crate::config::{CategoryKind, DeviceConfig, OptionKey, Settings};
use crate::hal::{DeviceId, DeviceInfo, HardwareSource, StorageSummary};
use crate::metric::{Metric, MetricKey, MetricSource};
use crate::units::{Unit, UnitConverter};
use std::time::{Duration, Instant};

pub mod cpu;
pub mod drive;
pub mod fan;
pub mod gpu;
pub mod network;
pub mod ram;

/// Category payload of a monitor.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorKind {
    Cpu,
    Ram,
    Gpu,
    Drive {
        /// Render the used-space bar layout instead of the plain rows.
        show_load_bar: bool,
        /// Throttled storage-summary reads.
        summary: SummaryCache,
    },
    Network,
    Fans {
        /// Keep fans with a zero reading visible.
        show_inactive: bool,
    },
}

/// Cached storage summary with a configurable re-read interval, set from
/// the ThrottleInterval option. A zero interval re-reads every tick;
/// between reads the cached summary keeps feeding the computed metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryCache {
    interval: Duration,
    read_at: Option<Instant>,
    summary: Option<StorageSummary>,
}

impl SummaryCache {
    pub(crate) fn new() -> Self {
        Self {
            interval: Duration::ZERO,
            read_at: None,
            summary: None,
        }
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    fn refresh(&mut self, source: &dyn HardwareSource, id: &DeviceId) -> Option<StorageSummary> {
        let due = match self.read_at {
            None => true,
            Some(at) => self.interval.is_zero() || at.elapsed() >= self.interval,
        };
        if due {
            self.summary = source.storage_summary(id);
            self.read_at = Some(Instant::now());
        }
        self.summary.clone()
    }
}

impl MonitorKind {
    pub fn category(&self) -> CategoryKind {
        match self {
            MonitorKind::Cpu => CategoryKind::Cpu,
            MonitorKind::Ram => CategoryKind::Ram,
            MonitorKind::Gpu => CategoryKind::Gpu,
            MonitorKind::Drive { .. } => CategoryKind::Storage,
            MonitorKind::Network => CategoryKind::Network,
            MonitorKind::Fans { .. } => CategoryKind::Fan,
        }
    }
}

/// Live view of one hardware device within a category.
#[derive(Debug, Clone)]
pub struct Monitor {
    /// Backing device.
    pub id: DeviceId,
    /// Display name; drives re-derive theirs from drive letters.
    pub name: String,
    /// Hardware-reported name, kept for rename resets.
    pub actual_name: String,
    pub order: i32,
    pub enabled: bool,
    /// Show the device name above the metric rows.
    pub show_name: bool,
    /// Extra devices refreshed alongside the main one (a fan controller
    /// adopted for the CPU fan reading).
    pub aux_devices: Vec<DeviceId>,
    pub metrics: Vec<Metric>,
    pub kind: MonitorKind,
}

impl Monitor {
    pub(crate) fn new(device: &DeviceInfo, cfg: &DeviceConfig, kind: MonitorKind) -> Self {
        let name = if cfg.name.is_empty() {
            device.name.clone()
        } else {
            cfg.name.clone()
        };
        Self {
            id: device.id.clone(),
            name,
            actual_name: device.name.clone(),
            order: cfg.order,
            enabled: cfg.enabled,
            show_name: true,
            aux_devices: Vec::new(),
            metrics: Vec::new(),
            kind,
        }
    }

    pub fn metric(&self, key: MetricKey) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.key == key)
    }

    /// Metrics a rendering layer should draw this cycle: enabled, and for
    /// fan banks with inactive fans hidden, currently spinning.
    pub fn visible_metrics(&self) -> impl Iterator<Item = &Metric> {
        let hide_inactive = matches!(self.kind, MonitorKind::Fans { show_inactive: false });
        self.metrics
            .iter()
            .filter(move |m| m.enabled && !(hide_inactive && m.value <= 0.0))
    }

    /// Refresh the backing device and every metric. A device that has
    /// vanished mid-cycle (hot-plug race) skips the whole update.
    pub fn update(&mut self, source: &mut dyn HardwareSource) {
        if !source.refresh_device(&self.id) {
            log::debug!("device {} vanished, skipping update", self.id);
            return;
        }
        for aux in &self.aux_devices {
            source.refresh_device(aux);
        }

        let summary = match &mut self.kind {
            MonitorKind::Drive { summary, .. } => summary.refresh(&*source, &self.id),
            _ => None,
        };
        if let Some(sum) = &summary {
            if !sum.drive_letters.is_empty() {
                self.name = sum.drive_letters.join(", ");
            }
        }

        for metric in &mut self.metrics {
            let raw = match &metric.source {
                MetricSource::Sensor(id) => source.sensor_value(id),
                MetricSource::VramRatio { used, total } => {
                    match (source.sensor_value(used), source.sensor_value(total)) {
                        (Some(u), Some(t)) if t > 0.0 => Some(100.0 * u / t),
                        _ => None,
                    }
                }
                MetricSource::Static(_) => continue,
                MetricSource::Computed => match (&summary, metric.key) {
                    (Some(sum), MetricKey::DriveUsed) => Some(sum.used_bytes() as f64),
                    (Some(sum), MetricKey::DriveFree) => Some(sum.free_bytes as f64),
                    (Some(sum), MetricKey::DriveLoad | MetricKey::DriveLoadBar) => {
                        Some(sum.used_percent())
                    }
                    _ => None,
                },
            };
            metric.update(raw);
        }
    }

    /// Re-derive everything settings-driven: per-metric enables, rounding,
    /// temperature unit and alerts, and the category-specific options.
    pub fn apply_settings(&mut self, settings: &Settings) {
        let kind = self.kind.category();
        let Some(category) = settings.category(kind) else {
            return;
        };
        // Ordering is owned by the manager's reconciliation, so only the
        // per-device scalars are picked up here.
        if let Some(dc) = category.device(self.id.as_str()) {
            self.enabled = dc.enabled;
            if !dc.name.is_empty() {
                self.name = dc.name.clone();
            }
        }
        self.show_name = settings.option_bool(kind, OptionKey::HardwareNames);

        let round = settings.option_bool(kind, OptionKey::RoundAll);
        let fahrenheit = settings.option_bool(kind, OptionKey::UseFahrenheit);
        let temp_alert = i64::from(settings.option_i16(kind, OptionKey::TempAlert));
        for metric in &mut self.metrics {
            metric.enabled = settings.is_metric_enabled(kind, metric.key);
            metric.round = round;
            if metric.unit.is_temperature() {
                if fahrenheit {
                    metric.unit = Unit::Fahrenheit;
                    metric.converter = Some(UnitConverter::CelsiusToFahrenheit);
                } else {
                    metric.unit = Unit::Celsius;
                    metric.converter = None;
                }
                metric.alert_threshold = temp_alert;
            }
        }

        match &mut self.kind {
            MonitorKind::Cpu => {
                let core_loads = settings.option_bool(kind, OptionKey::CoreLoads);
                let all_core_clocks = settings.option_bool(kind, OptionKey::AllCoreClocks);
                let mut first_clock = true;
                for metric in &mut self.metrics {
                    match metric.key {
                        MetricKey::CpuCoreLoad if core_loads => metric.enabled = true,
                        MetricKey::CpuClock => {
                            if !all_core_clocks && !first_clock {
                                metric.enabled = false;
                            }
                            first_clock = false;
                        }
                        _ => {}
                    }
                }
            }
            MonitorKind::Drive { show_load_bar, summary } => {
                *show_load_bar = settings.is_metric_enabled(kind, MetricKey::DriveLoadBar);
                let throttle = settings.option_i64(kind, OptionKey::ThrottleInterval).max(0);
                summary.set_interval(Duration::from_millis(throttle as u64));
                let used_alert = i64::from(settings.option_i16(kind, OptionKey::UsedSpaceAlert));
                for metric in &mut self.metrics {
                    if metric.key == MetricKey::DriveLoad {
                        metric.alert_threshold = used_alert;
                    }
                }
            }
            MonitorKind::Network => {
                let in_alert = settings.option_i64(kind, OptionKey::BandwidthInAlert);
                let out_alert = settings.option_i64(kind, OptionKey::BandwidthOutAlert);
                for metric in &mut self.metrics {
                    match metric.key {
                        MetricKey::NetworkIn => metric.alert_threshold = in_alert,
                        MetricKey::NetworkOut => metric.alert_threshold = out_alert,
                        _ => {}
                    }
                }
            }
            MonitorKind::Fans { show_inactive } => {
                *show_inactive = settings.option_bool(kind, OptionKey::ShowInactiveFans);
            }
            MonitorKind::Ram | MonitorKind::Gpu => {}
        }
    }
}

/// Runtime collection of monitors for one enabled category.
#[derive(Debug, Clone)]
pub struct Panel {
    pub kind: CategoryKind,
    pub title: String,
    pub monitors: Vec<Monitor>,
}

impl Panel {
    pub fn new(kind: CategoryKind) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            monitors: Vec::new(),
        }
    }

    pub fn update(&mut self, source: &mut dyn HardwareSource) {
        for monitor in &mut self.monitors {
            monitor.update(source);
        }
    }
}

/// Build the monitor for one device of one category.
pub(crate) fn build_monitor(
    source: &dyn HardwareSource,
    kind: CategoryKind,
    device: &DeviceInfo,
    board: Option<&DeviceId>,
    cfg: &DeviceConfig,
) -> Monitor {
    match kind {
        CategoryKind::Cpu => cpu::build(source, device, board, cfg),
        CategoryKind::Ram => ram::build(source, device, board, cfg),
        CategoryKind::Gpu => gpu::build(source, device, cfg),
        CategoryKind::Storage => drive::build(source, device, cfg),
        CategoryKind::Network => network::build(source, device, cfg),
        CategoryKind::Fan => fan::build(source, device, cfg),
    }
}
