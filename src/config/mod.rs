//! Persisted configuration model.
//!
//! The settings tree mirrors what ships in `settings.json`: general
//! options at the root plus one [`CategoryConfig`] per hardware category,
//! each holding device, metric and option lists. Edits are merged with
//! [`Settings::copy_from`], which reconciles every keyed list in place so
//! entries keep their identity across edits.
//!
//! Freshly loaded files pass through [`Settings::normalize`], which
//! back-fills anything an older file is missing from the compiled-in
//! defaults. [`Settings::before_save`] folds runtime device edits back
//! into the persisted lists and renumbers display orders sequentially.

use crate::hal::DeviceClass;
use crate::metric::MetricKey;
use serde::{Deserialize, Serialize};

pub mod defaults;
pub mod reconcile;
pub mod store;

use reconcile::{sync_keyed, Keyed};

/// Hardware category. Each enabled category owns one panel of monitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryKind {
    Cpu,
    Ram,
    Gpu,
    Storage,
    Network,
    Fan,
}

impl CategoryKind {
    pub const ALL: [CategoryKind; 6] = [
        CategoryKind::Cpu,
        CategoryKind::Ram,
        CategoryKind::Gpu,
        CategoryKind::Storage,
        CategoryKind::Network,
        CategoryKind::Fan,
    ];

    /// Panel title.
    pub fn title(&self) -> &'static str {
        match self {
            CategoryKind::Cpu => "CPU",
            CategoryKind::Ram => "RAM",
            CategoryKind::Gpu => "GPU",
            CategoryKind::Storage => "Drives",
            CategoryKind::Network => "Network",
            CategoryKind::Fan => "Fans",
        }
    }

    /// Device classes this category reads.
    ///
    /// The Fan category discovers its devices as motherboard sub-devices
    /// and never drives class enablement; see [`toggle_classes`].
    ///
    /// [`toggle_classes`]: CategoryKind::toggle_classes
    pub fn device_classes(&self) -> &'static [DeviceClass] {
        match self {
            CategoryKind::Cpu => &[DeviceClass::Cpu],
            CategoryKind::Ram => &[DeviceClass::Memory],
            CategoryKind::Gpu => &[DeviceClass::GpuNvidia, DeviceClass::GpuAmd],
            CategoryKind::Storage => &[DeviceClass::Storage],
            CategoryKind::Network => &[DeviceClass::Network],
            CategoryKind::Fan => &[DeviceClass::Motherboard, DeviceClass::SuperIo],
        }
    }

    /// Device classes toggled on the source when the category is enabled
    /// or disabled. Empty for Fan: the motherboard stays under the
    /// manager's control because other features read board sensors too.
    pub fn toggle_classes(&self) -> &'static [DeviceClass] {
        match self {
            CategoryKind::Fan => &[],
            other => other.device_classes(),
        }
    }
}

impl std::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Per-category tunable option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionKey {
    HardwareNames,
    UseFahrenheit,
    RoundAll,
    TempAlert,
    AllCoreClocks,
    CoreLoads,
    ThrottleInterval,
    UsedSpaceAlert,
    BandwidthInAlert,
    BandwidthOutAlert,
    ShowInactiveFans,
}

/// Value kind an [`OptionKey`] is allowed to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Bool,
    Int16,
    Int64,
}

impl OptionKey {
    /// Fixed key → value-kind table. A stored value of any other kind is
    /// coerced to this kind's zero during [`Settings::normalize`].
    pub fn value_kind(&self) -> OptionKind {
        match self {
            OptionKey::HardwareNames
            | OptionKey::UseFahrenheit
            | OptionKey::RoundAll
            | OptionKey::AllCoreClocks
            | OptionKey::CoreLoads
            | OptionKey::ShowInactiveFans => OptionKind::Bool,
            OptionKey::TempAlert | OptionKey::UsedSpaceAlert => OptionKind::Int16,
            OptionKey::ThrottleInterval
            | OptionKey::BandwidthInAlert
            | OptionKey::BandwidthOutAlert => OptionKind::Int64,
        }
    }
}

/// Typed option value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OptionValue {
    Bool(bool),
    Int16(i16),
    Int64(i64),
}

impl OptionValue {
    pub fn kind(&self) -> OptionKind {
        match self {
            OptionValue::Bool(_) => OptionKind::Bool,
            OptionValue::Int16(_) => OptionKind::Int16,
            OptionValue::Int64(_) => OptionKind::Int64,
        }
    }

    /// The zero value of a kind, used when coercing mismatched input.
    pub fn zero(kind: OptionKind) -> Self {
        match kind {
            OptionKind::Bool => OptionValue::Bool(false),
            OptionKind::Int16 => OptionValue::Int16(0),
            OptionKind::Int64 => OptionValue::Int64(0),
        }
    }

    pub fn as_bool(&self) -> bool {
        matches!(self, OptionValue::Bool(true))
    }

    pub fn as_i16(&self) -> i16 {
        match self {
            OptionValue::Int16(v) => *v,
            _ => 0,
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            OptionValue::Int64(v) => *v,
            OptionValue::Int16(v) => i64::from(*v),
            OptionValue::Bool(_) => 0,
        }
    }
}

/// One option entry in a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionConfig {
    pub key: OptionKey,
    pub value: OptionValue,
}

impl OptionConfig {
    pub fn new(key: OptionKey, value: OptionValue) -> Self {
        Self { key, value }
    }
}

impl Keyed for OptionConfig {
    type Key = OptionKey;

    fn key(&self) -> OptionKey {
        self.key
    }
}

/// Per-metric enable flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    pub key: MetricKey,
    pub enabled: bool,
}

impl MetricConfig {
    pub fn new(key: MetricKey, enabled: bool) -> Self {
        Self { key, enabled }
    }
}

impl Keyed for MetricConfig {
    type Key = MetricKey;

    fn key(&self) -> MetricKey {
        self.key
    }
}

/// Persisted state of one hardware device within a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Stable hardware identifier.
    pub id: String,
    /// User-facing label, editable.
    pub name: String,
    /// Name the hardware reported when last seen; lets the UI offer a
    /// reset after a rename.
    pub actual_name: String,
    pub enabled: bool,
    pub order: i32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            actual_name: String::new(),
            enabled: true,
            order: 0,
        }
    }
}

impl Keyed for DeviceConfig {
    type Key = String;

    fn key(&self) -> String {
        self.id.clone()
    }
}

/// Persisted state of one hardware category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    pub kind: CategoryKind,
    pub enabled: bool,
    pub order: i32,
    pub devices: Vec<DeviceConfig>,
    pub metrics: Vec<MetricConfig>,
    pub options: Vec<OptionConfig>,
    /// Runtime view of the persisted devices, edited by a settings UI and
    /// folded back into `devices` on save.
    #[serde(skip)]
    pub live_devices: Vec<DeviceConfig>,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            kind: CategoryKind::Cpu,
            enabled: true,
            order: 0,
            devices: Vec::new(),
            metrics: Vec::new(),
            options: Vec::new(),
            live_devices: Vec::new(),
        }
    }
}

impl CategoryConfig {
    pub fn metric(&self, key: MetricKey) -> Option<&MetricConfig> {
        self.metrics.iter().find(|m| m.key == key)
    }

    pub fn option(&self, key: OptionKey) -> Option<&OptionConfig> {
        self.options.iter().find(|o| o.key == key)
    }

    pub fn device(&self, id: &str) -> Option<&DeviceConfig> {
        self.devices.iter().find(|d| d.id == id)
    }

    fn copy_from(&mut self, other: &CategoryConfig) {
        self.enabled = other.enabled;
        self.order = other.order;
        sync_keyed(&mut self.devices, &other.devices, |t, s| {
            t.name = s.name.clone();
            t.actual_name = s.actual_name.clone();
            t.enabled = s.enabled;
            t.order = s.order;
        });
        sync_keyed(&mut self.metrics, &other.metrics, |t, s| {
            t.enabled = s.enabled;
        });
        sync_keyed(&mut self.options, &other.options, |t, s| {
            t.value = s.value;
        });
    }
}

impl Keyed for CategoryConfig {
    type Key = CategoryKind;

    fn key(&self) -> CategoryKind {
        self.kind
    }
}

/// Sidebar docking edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DockEdge {
    Left,
    Right,
}

/// Metric text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Right,
}

/// Root of the persisted settings tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// True until the first successful save; a fresh install writes the
    /// default file on startup.
    pub initial_start: bool,
    pub dock_edge: DockEdge,
    pub screen_index: u32,
    pub language: String,
    pub text_align: TextAlign,
    /// Reserve desktop space instead of floating over other windows.
    pub use_app_bar: bool,
    pub always_on_top: bool,
    pub start_with_system: bool,
    pub auto_update: bool,
    pub sidebar_width: u32,
    pub font_size: u32,
    pub offset_top: i32,
    pub offset_bottom: i32,
    /// Polling interval in milliseconds.
    pub update_interval_ms: u64,
    pub show_tray_icon: bool,
    pub show_alt_tab: bool,
    pub click_through: bool,
    pub background_color: String,
    /// Background opacity in percent.
    pub background_opacity: u8,
    pub categories: Vec<CategoryConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            initial_start: true,
            dock_edge: DockEdge::Right,
            screen_index: 0,
            language: "en".to_string(),
            text_align: TextAlign::Left,
            use_app_bar: true,
            always_on_top: true,
            start_with_system: false,
            auto_update: false,
            sidebar_width: 180,
            font_size: 14,
            offset_top: 0,
            offset_bottom: 0,
            update_interval_ms: 1000,
            show_tray_icon: true,
            show_alt_tab: false,
            click_through: false,
            background_color: "#000000".to_string(),
            background_opacity: 85,
            categories: Vec::new(),
        }
    }
}

impl Settings {
    pub fn category(&self, kind: CategoryKind) -> Option<&CategoryConfig> {
        self.categories.iter().find(|c| c.kind == kind)
    }

    pub fn category_mut(&mut self, kind: CategoryKind) -> Option<&mut CategoryConfig> {
        self.categories.iter_mut().find(|c| c.kind == kind)
    }

    pub fn is_category_enabled(&self, kind: CategoryKind) -> bool {
        self.category(kind).map(|c| c.enabled).unwrap_or(false)
    }

    pub fn is_metric_enabled(&self, kind: CategoryKind, key: MetricKey) -> bool {
        self.category(kind)
            .and_then(|c| c.metric(key))
            .map(|m| m.enabled)
            .unwrap_or(false)
    }

    pub fn option_bool(&self, kind: CategoryKind, key: OptionKey) -> bool {
        self.option_value(kind, key).map(|v| v.as_bool()).unwrap_or(false)
    }

    pub fn option_i16(&self, kind: CategoryKind, key: OptionKey) -> i16 {
        self.option_value(kind, key).map(|v| v.as_i16()).unwrap_or(0)
    }

    pub fn option_i64(&self, kind: CategoryKind, key: OptionKey) -> i64 {
        self.option_value(kind, key).map(|v| v.as_i64()).unwrap_or(0)
    }

    fn option_value(&self, kind: CategoryKind, key: OptionKey) -> Option<OptionValue> {
        self.category(kind).and_then(|c| c.option(key)).map(|o| o.value)
    }

    /// Merge `other` into `self`, keeping every surviving list entry's
    /// identity. Used when applying an edited snapshot.
    pub fn copy_from(&mut self, other: &Settings) {
        let Settings {
            initial_start,
            dock_edge,
            screen_index,
            language,
            text_align,
            use_app_bar,
            always_on_top,
            start_with_system,
            auto_update,
            sidebar_width,
            font_size,
            offset_top,
            offset_bottom,
            update_interval_ms,
            show_tray_icon,
            show_alt_tab,
            click_through,
            background_color,
            background_opacity,
            categories: _,
        } = other;
        self.initial_start = *initial_start;
        self.dock_edge = *dock_edge;
        self.screen_index = *screen_index;
        self.language = language.clone();
        self.text_align = *text_align;
        self.use_app_bar = *use_app_bar;
        self.always_on_top = *always_on_top;
        self.start_with_system = *start_with_system;
        self.auto_update = *auto_update;
        self.sidebar_width = *sidebar_width;
        self.font_size = *font_size;
        self.offset_top = *offset_top;
        self.offset_bottom = *offset_bottom;
        self.update_interval_ms = *update_interval_ms;
        self.show_tray_icon = *show_tray_icon;
        self.show_alt_tab = *show_alt_tab;
        self.click_through = *click_through;
        self.background_color = background_color.clone();
        self.background_opacity = *background_opacity;
        sync_keyed(&mut self.categories, &other.categories, |t, s| {
            t.copy_from(s);
        });
    }

    /// Back-fill everything an older or hand-edited file is missing from
    /// the compiled-in defaults and coerce mistyped option values.
    pub fn normalize(&mut self) {
        if self.update_interval_ms == 0 {
            self.update_interval_ms = Settings::default().update_interval_ms;
        }
        let default_categories = defaults::default_categories();
        for default in &default_categories {
            if self.category(default.kind).is_none() {
                self.categories.push(default.clone());
            }
        }
        for category in &mut self.categories {
            if let Some(default) = default_categories.iter().find(|d| d.kind == category.kind) {
                for metric in &default.metrics {
                    if !category.metrics.iter().any(|m| m.key == metric.key) {
                        category.metrics.push(metric.clone());
                    }
                }
                for option in &default.options {
                    if !category.options.iter().any(|o| o.key == option.key) {
                        category.options.push(option.clone());
                    }
                }
            }
            for option in &mut category.options {
                let expected = option.key.value_kind();
                if option.value.kind() != expected {
                    log::warn!(
                        "option {:?} in {} carries a mistyped value, resetting",
                        option.key,
                        category.kind
                    );
                    option.value = OptionValue::zero(expected);
                }
            }
        }
    }

    /// Fold runtime device edits back into the persisted lists and
    /// renumber all display orders sequentially.
    pub fn before_save(&mut self) {
        for category in &mut self.categories {
            let live = std::mem::take(&mut category.live_devices);
            if !live.is_empty() {
                sync_keyed(&mut category.devices, &live, |t, s| {
                    t.name = s.name.clone();
                    t.actual_name = s.actual_name.clone();
                    t.enabled = s.enabled;
                    t.order = s.order;
                });
            }
            category.devices.sort_by_key(|d| d.order);
            for (i, device) in category.devices.iter_mut().enumerate() {
                device.order = i as i32;
            }
        }
        self.categories.sort_by_key(|c| c.order);
        for (i, category) in self.categories.iter_mut().enumerate() {
            category.order = i as i32;
        }
        self.initial_start = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized() -> Settings {
        let mut s = Settings::default();
        s.normalize();
        s
    }

    #[test]
    fn test_normalize_fills_all_categories() {
        let s = normalized();
        for kind in CategoryKind::ALL {
            assert!(s.category(kind).is_some(), "missing {kind}");
        }
    }

    #[test]
    fn test_normalize_back_fills_missing_metric() {
        let mut s = normalized();
        let cpu = s.category_mut(CategoryKind::Cpu).unwrap();
        cpu.metrics.retain(|m| m.key != MetricKey::CpuTemp);
        let kept = cpu.metrics.len();
        s.normalize();
        let cpu = s.category(CategoryKind::Cpu).unwrap();
        assert_eq!(cpu.metrics.len(), kept + 1);
        assert!(cpu.metric(MetricKey::CpuTemp).is_some());
    }

    #[test]
    fn test_normalize_preserves_user_values() {
        let mut s = normalized();
        let cpu = s.category_mut(CategoryKind::Cpu).unwrap();
        cpu.metrics.iter_mut().for_each(|m| m.enabled = false);
        s.normalize();
        let cpu = s.category(CategoryKind::Cpu).unwrap();
        assert!(cpu.metrics.iter().all(|m| !m.enabled));
    }

    #[test]
    fn test_normalize_coerces_mistyped_option() {
        let mut s = normalized();
        let cpu = s.category_mut(CategoryKind::Cpu).unwrap();
        let opt = cpu
            .options
            .iter_mut()
            .find(|o| o.key == OptionKey::TempAlert)
            .unwrap();
        opt.value = OptionValue::Bool(true);
        s.normalize();
        assert_eq!(s.option_i16(CategoryKind::Cpu, OptionKey::TempAlert), 0);
    }

    #[test]
    fn test_copy_from_adopts_source_order() {
        let mut current = normalized();
        let mut edited = current.clone();
        edited.categories.reverse();
        current.copy_from(&edited);
        let kinds: Vec<CategoryKind> = current.categories.iter().map(|c| c.kind).collect();
        let expected: Vec<CategoryKind> = edited.categories.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, expected);
    }

    #[test]
    fn test_copy_from_is_idempotent() {
        let mut current = normalized();
        let mut edited = current.clone();
        edited.categories.reverse();
        edited.update_interval_ms = 250;
        edited.category_mut(CategoryKind::Network).unwrap().enabled = true;
        current.copy_from(&edited);
        let once = current.clone();
        current.copy_from(&edited);
        assert_eq!(current, once);
    }

    #[test]
    fn test_copy_from_merges_scalars_and_lists() {
        let mut current = normalized();
        let mut edited = current.clone();
        edited.update_interval_ms = 250;
        edited
            .category_mut(CategoryKind::Network)
            .unwrap()
            .enabled = true;
        current.copy_from(&edited);
        assert_eq!(current.update_interval_ms, 250);
        assert!(current.is_category_enabled(CategoryKind::Network));
    }

    #[test]
    fn test_option_accessors_default_to_zero() {
        let s = Settings::default();
        assert!(!s.option_bool(CategoryKind::Cpu, OptionKey::UseFahrenheit));
        assert_eq!(s.option_i16(CategoryKind::Cpu, OptionKey::TempAlert), 0);
        assert_eq!(s.option_i64(CategoryKind::Network, OptionKey::BandwidthInAlert), 0);
    }

    #[test]
    fn test_before_save_renumbers_orders() {
        let mut s = normalized();
        for (i, c) in s.categories.iter_mut().enumerate() {
            c.order = (10 - i as i32) * 7;
        }
        s.before_save();
        let orders: Vec<i32> = s.categories.iter().map(|c| c.order).collect();
        assert_eq!(orders, (0..s.categories.len() as i32).collect::<Vec<_>>());
        assert!(!s.initial_start);
    }

    #[test]
    fn test_before_save_folds_live_devices() {
        let mut s = normalized();
        let storage = s.category_mut(CategoryKind::Storage).unwrap();
        storage.devices.push(DeviceConfig {
            id: "disk:0".into(),
            name: "Old".into(),
            actual_name: "Samsung 980".into(),
            enabled: true,
            order: 0,
        });
        storage.live_devices.push(DeviceConfig {
            id: "disk:0".into(),
            name: "Games".into(),
            actual_name: "Samsung 980".into(),
            enabled: false,
            order: 0,
        });
        s.before_save();
        let d = s.category(CategoryKind::Storage).unwrap().device("disk:0").unwrap();
        assert_eq!(d.name, "Games");
        assert!(!d.enabled);
    }

    #[test]
    fn test_settings_round_trips_through_json() {
        let mut s = normalized();
        s.update_interval_ms = 500;
        let json = serde_json::to_string_pretty(&s).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let s: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(s.update_interval_ms, 1000);
        assert!(s.initial_start);
        assert!(s.categories.is_empty());
    }

    #[test]
    fn test_option_key_kinds() {
        assert_eq!(OptionKey::UseFahrenheit.value_kind(), OptionKind::Bool);
        assert_eq!(OptionKey::TempAlert.value_kind(), OptionKind::Int16);
        assert_eq!(OptionKey::BandwidthOutAlert.value_kind(), OptionKind::Int64);
    }
}
