//! Metric model.
//!
//! A [`Metric`] is one displayable reading: a stable key, a unit, a raw
//! value feed and the derived display state (formatted text, alert flag).
//! Monitors own their metrics and feed them a raw `Option<f64>` each
//! cycle; everything downstream of the raw value lives here.

use crate::hal::SensorId;
use crate::units::{Unit, UnitConverter};
use serde::{Deserialize, Serialize};

/// Placeholder text shown while a metric has no reading.
pub const NO_DATA: &str = "-";

/// Stable identity of a metric within its category. Keys survive config
/// round-trips; cosmetic labels do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKey {
    CpuClock,
    CpuTemp,
    CpuVoltage,
    CpuFan,
    CpuLoad,
    CpuCoreLoad,
    RamClock,
    RamVoltage,
    RamLoad,
    RamUsed,
    RamFree,
    RamTemp,
    GpuCoreClock,
    GpuVramClock,
    GpuCoreLoad,
    GpuVramLoad,
    GpuVoltage,
    GpuTemp,
    GpuFan,
    NetworkIp,
    NetworkIn,
    NetworkOut,
    /// Graphical used-space bar; carries the same value as [`DriveLoad`].
    ///
    /// [`DriveLoad`]: MetricKey::DriveLoad
    DriveLoadBar,
    DriveLoad,
    DriveUsed,
    DriveFree,
    DriveRead,
    DriveWrite,
    DriveTemp,
    FanSpeed,
}

impl MetricKey {
    /// Default display label for the key. Monitors override this where a
    /// device yields several instances (per-core loads, named fans).
    pub fn label(&self) -> &'static str {
        match self {
            MetricKey::CpuClock | MetricKey::RamClock => "Clock",
            MetricKey::CpuVoltage | MetricKey::RamVoltage | MetricKey::GpuVoltage => "Voltage",
            MetricKey::CpuTemp | MetricKey::RamTemp | MetricKey::GpuTemp
            | MetricKey::DriveTemp => "Temp",
            MetricKey::CpuLoad | MetricKey::RamLoad | MetricKey::DriveLoadBar
            | MetricKey::DriveLoad => "Load",
            MetricKey::CpuCoreLoad => "Core",
            MetricKey::CpuFan | MetricKey::GpuFan | MetricKey::FanSpeed => "Fan",
            MetricKey::RamUsed | MetricKey::DriveUsed => "Used",
            MetricKey::RamFree | MetricKey::DriveFree => "Free",
            MetricKey::GpuCoreClock => "Core Clock",
            MetricKey::GpuVramClock => "VRAM Clock",
            MetricKey::GpuCoreLoad => "Core Load",
            MetricKey::GpuVramLoad => "VRAM Load",
            MetricKey::DriveRead => "Read",
            MetricKey::DriveWrite => "Write",
            MetricKey::NetworkIn => "Down",
            MetricKey::NetworkOut => "Up",
            MetricKey::NetworkIp => "IP",
        }
    }
}

impl std::fmt::Display for MetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Where a metric's raw value comes from each cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricSource {
    /// Read one sensor.
    Sensor(SensorId),
    /// Percentage derived from a used/total sensor pair (VRAM load when
    /// the device exposes no load sensor directly).
    VramRatio { used: SensorId, total: SensorId },
    /// Fixed text resolved when the monitor is built (IP address).
    Static(String),
    /// The owning monitor computes the raw value itself (drive used
    /// space from the storage summary).
    Computed,
}

/// One displayable reading.
#[derive(Debug, Clone)]
pub struct Metric {
    /// Stable key.
    pub key: MetricKey,
    /// Display label.
    pub label: String,
    /// Display unit; its suffix is appended to the formatted text.
    pub unit: Unit,
    /// Whether the metric is shown.
    pub enabled: bool,
    /// Round to a whole number instead of two decimals.
    pub round: bool,
    /// Alert threshold in display units; 0 disables alerting.
    pub alert_threshold: i64,
    /// Applied to the raw value before storing.
    pub converter: Option<UnitConverter>,
    /// Raw value feed.
    pub source: MetricSource,
    /// Last converted value.
    pub value: f64,
    /// Whether the last value met the alert threshold.
    pub alert_active: bool,
    /// Formatted value plus unit suffix, or [`NO_DATA`].
    pub text: String,
}

impl Metric {
    pub fn new(key: MetricKey, unit: Unit, source: MetricSource) -> Self {
        let text = match &source {
            MetricSource::Static(s) => s.clone(),
            _ => NO_DATA.to_string(),
        };
        Self {
            key,
            label: key.label().to_string(),
            unit,
            enabled: true,
            round: false,
            alert_threshold: 0,
            converter: None,
            source,
            value: 0.0,
            alert_active: false,
            text,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_converter(mut self, converter: UnitConverter) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Fold a raw reading into display state. `None` resets to the
    /// no-data placeholder and clears any active alert.
    pub fn update(&mut self, raw: Option<f64>) {
        match raw {
            Some(raw) => {
                let value = match &self.converter {
                    Some(c) => c.convert(raw),
                    None => raw,
                };
                self.value = value;
                self.alert_active =
                    self.alert_threshold != 0 && value >= self.alert_threshold as f64;
                self.text = format!("{}{}", format_value(value, self.round), self.unit.suffix());
            }
            None => {
                self.value = 0.0;
                self.alert_active = false;
                self.text = NO_DATA.to_string();
            }
        }
    }
}

/// Format a value with two decimals, trimming trailing zeros, or as a
/// whole number when rounding is on.
fn format_value(value: f64, round: bool) -> String {
    if round {
        return format!("{:.0}", value.round());
    }
    let mut s = format!("{:.2}", value);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    s
}
