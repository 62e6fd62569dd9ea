//! Compiled-in default configuration tree.

use super::{CategoryConfig, CategoryKind, MetricConfig, OptionConfig, OptionKey, OptionValue};
use crate::metric::MetricKey;

/// Default category tree: every category with its default metric enable
/// flags and option set. Network starts disabled; everything else on.
pub fn default_categories() -> Vec<CategoryConfig> {
    vec![
        category(CategoryKind::Cpu, true, 0, cpu_metrics(), cpu_options()),
        category(CategoryKind::Ram, true, 1, ram_metrics(), temp_options()),
        category(CategoryKind::Gpu, true, 2, gpu_metrics(), temp_options()),
        category(
            CategoryKind::Storage,
            true,
            3,
            storage_metrics(),
            storage_options(),
        ),
        category(
            CategoryKind::Network,
            false,
            4,
            network_metrics(),
            network_options(),
        ),
        category(CategoryKind::Fan, true, 5, fan_metrics(), fan_options()),
    ]
}

fn category(
    kind: CategoryKind,
    enabled: bool,
    order: i32,
    metrics: Vec<MetricConfig>,
    options: Vec<OptionConfig>,
) -> CategoryConfig {
    CategoryConfig {
        kind,
        enabled,
        order,
        devices: Vec::new(),
        metrics,
        options,
        live_devices: Vec::new(),
    }
}

fn metrics(entries: &[(MetricKey, bool)]) -> Vec<MetricConfig> {
    entries
        .iter()
        .map(|&(key, enabled)| MetricConfig::new(key, enabled))
        .collect()
}

fn cpu_metrics() -> Vec<MetricConfig> {
    metrics(&[
        (MetricKey::CpuClock, true),
        (MetricKey::CpuTemp, true),
        (MetricKey::CpuVoltage, true),
        (MetricKey::CpuFan, true),
        (MetricKey::CpuLoad, true),
        (MetricKey::CpuCoreLoad, false),
    ])
}

fn ram_metrics() -> Vec<MetricConfig> {
    metrics(&[
        (MetricKey::RamClock, true),
        (MetricKey::RamVoltage, true),
        (MetricKey::RamLoad, true),
        (MetricKey::RamUsed, true),
        (MetricKey::RamFree, true),
        (MetricKey::RamTemp, true),
    ])
}

fn gpu_metrics() -> Vec<MetricConfig> {
    metrics(&[
        (MetricKey::GpuCoreClock, false),
        (MetricKey::GpuVramClock, false),
        (MetricKey::GpuCoreLoad, true),
        (MetricKey::GpuVramLoad, true),
        (MetricKey::GpuVoltage, true),
        (MetricKey::GpuTemp, true),
        (MetricKey::GpuFan, true),
    ])
}

fn storage_metrics() -> Vec<MetricConfig> {
    metrics(&[
        (MetricKey::DriveLoadBar, true),
        (MetricKey::DriveLoad, true),
        (MetricKey::DriveUsed, true),
        (MetricKey::DriveFree, true),
        (MetricKey::DriveRead, false),
        (MetricKey::DriveWrite, false),
        (MetricKey::DriveTemp, true),
    ])
}

fn network_metrics() -> Vec<MetricConfig> {
    metrics(&[
        (MetricKey::NetworkIp, true),
        (MetricKey::NetworkIn, true),
        (MetricKey::NetworkOut, true),
    ])
}

fn fan_metrics() -> Vec<MetricConfig> {
    metrics(&[(MetricKey::FanSpeed, true)])
}

fn base_options() -> Vec<OptionConfig> {
    vec![
        OptionConfig::new(OptionKey::HardwareNames, OptionValue::Bool(true)),
        OptionConfig::new(OptionKey::RoundAll, OptionValue::Bool(false)),
    ]
}

/// Options shared by every temperature-bearing category.
fn temp_options() -> Vec<OptionConfig> {
    let mut out = base_options();
    out.push(OptionConfig::new(
        OptionKey::UseFahrenheit,
        OptionValue::Bool(false),
    ));
    out.push(OptionConfig::new(OptionKey::TempAlert, OptionValue::Int16(0)));
    out
}

fn cpu_options() -> Vec<OptionConfig> {
    let mut out = temp_options();
    out.push(OptionConfig::new(
        OptionKey::AllCoreClocks,
        OptionValue::Bool(false),
    ));
    out.push(OptionConfig::new(OptionKey::CoreLoads, OptionValue::Bool(false)));
    out
}

fn storage_options() -> Vec<OptionConfig> {
    let mut out = temp_options();
    out.push(OptionConfig::new(
        OptionKey::UsedSpaceAlert,
        OptionValue::Int16(0),
    ));
    out.push(OptionConfig::new(
        OptionKey::ThrottleInterval,
        OptionValue::Int64(0),
    ));
    out
}

fn network_options() -> Vec<OptionConfig> {
    let mut out = base_options();
    out.push(OptionConfig::new(
        OptionKey::BandwidthInAlert,
        OptionValue::Int64(0),
    ));
    out.push(OptionConfig::new(
        OptionKey::BandwidthOutAlert,
        OptionValue::Int64(0),
    ));
    out
}

fn fan_options() -> Vec<OptionConfig> {
    let mut out = base_options();
    out.push(OptionConfig::new(
        OptionKey::ShowInactiveFans,
        OptionValue::Bool(false),
    ));
    out
}
