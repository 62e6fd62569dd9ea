//! Measurement units and value conversion.
//!
//! Every metric carries a [`Unit`] that determines the suffix appended to
//! its display text, and optionally a [`UnitConverter`] applied to the raw
//! sensor reading before storage (e.g. bytes → gigabytes, °C → °F).

use serde::{Deserialize, Serialize};

/// Unit of a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// No fixed unit (pre-formatted values such as IP addresses).
    Dynamic,
    /// Megahertz (clocks).
    Megahertz,
    /// Gigahertz.
    Gigahertz,
    /// Volts.
    Volts,
    /// Percent (loads, GPU fan duty).
    Percent,
    /// Revolutions per minute (fans).
    Rpm,
    /// Degrees Celsius.
    Celsius,
    /// Degrees Fahrenheit.
    Fahrenheit,
    /// Gigabytes (memory/storage sizes).
    Gigabyte,
    /// Megabytes.
    Megabyte,
    /// Kilobytes per second (drive activity).
    KilobytesPerSecond,
    /// Megabytes per second (network throughput).
    MegabytesPerSecond,
    /// IP address, displayed verbatim.
    Ip,
}

impl Unit {
    /// Fixed display suffix for this unit.
    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::Dynamic | Unit::Ip => "",
            Unit::Megahertz => " MHz",
            Unit::Gigahertz => " GHz",
            Unit::Volts => " V",
            Unit::Percent => "%",
            Unit::Rpm => " RPM",
            Unit::Celsius => " °C",
            Unit::Fahrenheit => " °F",
            Unit::Gigabyte => " GB",
            Unit::Megabyte => " MB",
            Unit::KilobytesPerSecond => " kB/s",
            Unit::MegabytesPerSecond => " MB/s",
        }
    }

    /// Whether this unit is a temperature (subject to the °C/°F toggle).
    pub fn is_temperature(&self) -> bool {
        matches!(self, Unit::Celsius | Unit::Fahrenheit)
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.suffix().trim_start())
    }
}

/// Convert degrees Celsius to Fahrenheit.
pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

/// Convert degrees Fahrenheit to Celsius.
pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

/// Convert bytes to gigabytes.
pub fn bytes_to_gigabytes(bytes: f64) -> f64 {
    bytes / (1024.0 * 1024.0 * 1024.0)
}

/// Convert bytes to megabytes.
pub fn bytes_to_megabytes(bytes: f64) -> f64 {
    bytes / (1024.0 * 1024.0)
}

/// Pure value converter attached to a metric.
///
/// A closed set instead of boxed closures so the configuration layer can
/// compare, clone and serialize monitors freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitConverter {
    /// °C → °F, attached when the UseFahrenheit option is set.
    CelsiusToFahrenheit,
    /// Raw bytes → gigabytes.
    BytesToGigabytes,
    /// Raw bytes → megabytes (network throughput).
    BytesToMegabytes,
}

impl UnitConverter {
    /// Apply the conversion.
    pub fn convert(&self, value: f64) -> f64 {
        match self {
            UnitConverter::CelsiusToFahrenheit => celsius_to_fahrenheit(value),
            UnitConverter::BytesToGigabytes => bytes_to_gigabytes(value),
            UnitConverter::BytesToMegabytes => bytes_to_megabytes(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_celsius_fahrenheit_round_trip() {
        for c in [-40.0, 0.0, 36.6, 100.0] {
            let back = fahrenheit_to_celsius(celsius_to_fahrenheit(c));
            assert!((back - c).abs() < 1e-9, "round trip failed for {}", c);
        }
    }

    #[test]
    fn test_celsius_to_fahrenheit_known_points() {
        assert!((celsius_to_fahrenheit(0.0) - 32.0).abs() < f64::EPSILON);
        assert!((celsius_to_fahrenheit(100.0) - 212.0).abs() < f64::EPSILON);
        assert!((celsius_to_fahrenheit(-40.0) - -40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bytes_to_gigabytes() {
        assert!((bytes_to_gigabytes(1_073_741_824.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_converter_apply() {
        let conv = UnitConverter::BytesToMegabytes;
        assert!((conv.convert(2_097_152.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_unit_suffixes() {
        assert_eq!(Unit::Celsius.suffix(), " °C");
        assert_eq!(Unit::Percent.suffix(), "%");
        assert_eq!(Unit::Ip.suffix(), "");
        assert!(Unit::Fahrenheit.is_temperature());
        assert!(!Unit::Rpm.is_temperature());
    }

    #[test]
    fn test_unit_serde_round_trip() {
        let json = serde_json::to_string(&Unit::Megahertz).unwrap();
        let back: Unit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Unit::Megahertz);
    }
}
