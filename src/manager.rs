//! Hardware manager.
//!
//! Orchestrates the runtime tree: owns the hardware source, the
//! motherboard handle and the panel collection, and reconciles them
//! against settings changes. Exactly two actors call in here, the
//! polling loop's [`update`] tick and the settings-change handler's
//! [`apply_change`], and both serialize on the single internal mutex,
//! so a tick never observes a half-rebuilt panel list.
//!
//! [`update`]: HardwareManager::update
//! [`apply_change`]: HardwareManager::apply_change

use crate::config::{CategoryConfig, CategoryKind, DeviceConfig, Settings};
use crate::error::Result;
use crate::hal::{DeviceClass, DeviceId, DeviceInfo, HardwareSource, SensorType};
use crate::monitor::{build_monitor, Panel};
use std::sync::Mutex;

/// Orchestrator for one hardware source.
pub struct HardwareManager<S: HardwareSource> {
    inner: Mutex<Inner<S>>,
}

struct Inner<S> {
    source: S,
    board: Option<DeviceId>,
    panels: Vec<Panel>,
}

impl<S: HardwareSource> HardwareManager<S> {
    pub fn new(source: S) -> Self {
        Self {
            inner: Mutex::new(Inner {
                source,
                board: None,
                panels: Vec::new(),
            }),
        }
    }

    /// Cold start: push category enables into the source, locate the
    /// motherboard, and build one panel per enabled category in config
    /// order. Callable again to rebuild from scratch.
    pub fn start(&self, settings: &Settings) -> Result<()> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        for kind in CategoryKind::ALL {
            let enabled = settings.is_category_enabled(kind);
            for class in kind.toggle_classes() {
                inner.source.set_class_enabled(*class, enabled);
            }
        }

        inner.board = inner
            .source
            .devices()
            .into_iter()
            .find(|d| d.class == DeviceClass::Motherboard)
            .map(|d| d.id);
        if let Some(board) = inner.board.clone() {
            inner.source.refresh_device(&board);
            for sub in inner.source.sub_devices(&board) {
                inner.source.refresh_device(&sub.id);
            }
        }

        let mut categories: Vec<&CategoryConfig> =
            settings.categories.iter().filter(|c| c.enabled).collect();
        categories.sort_by_key(|c| c.order);
        let mut panels = Vec::with_capacity(categories.len());
        for category in categories {
            panels.push(build_panel(&inner.source, inner.board.as_ref(), category, settings));
        }
        inner.panels = panels;
        log::info!("started with {} panels", inner.panels.len());
        Ok(())
    }

    /// Warm update after a settings change: toggle categories on or off,
    /// reorder panels, and propagate per-device edits into the monitors.
    pub fn apply_change(&self, settings: &Settings) -> Result<()> {
        let mut guard = self.lock();
        let inner = &mut *guard;

        for category in &settings.categories {
            let kind = category.kind;
            let present = inner.panel_index(kind).is_some();
            let source_enabled = kind
                .toggle_classes()
                .first()
                .map(|c| inner.source.class_enabled(*c))
                .unwrap_or(present);
            if category.enabled == present && category.enabled == source_enabled {
                continue;
            }
            for class in kind.toggle_classes() {
                inner.source.set_class_enabled(*class, category.enabled);
            }
            if category.enabled && !present {
                let panel = build_panel(&inner.source, inner.board.as_ref(), category, settings);
                let at = (category.order.max(0) as usize).min(inner.panels.len());
                inner.panels.insert(at, panel);
                log::debug!("panel {kind} enabled at {at}");
            } else if !category.enabled && present {
                inner.panels.retain(|p| p.kind != kind);
                log::debug!("panel {kind} disabled");
            }
        }

        // Reorder surviving panels to config order: walk positions
        // ascending and pull the panel back from wherever it currently
        // sits. A panel already at or before its slot, or a slot beyond
        // the list, is left alone.
        for category in &settings.categories {
            let want = category.order.max(0) as usize;
            if let Some(current) = inner.panel_index(category.kind) {
                if current > want && want < inner.panels.len() {
                    let panel = inner.panels.remove(current);
                    inner.panels.insert(want, panel);
                }
            }
        }

        for category in &settings.categories {
            let Some(index) = inner.panel_index(category.kind) else {
                continue;
            };
            let panel = &mut inner.panels[index];

            let mut ordered: Vec<&DeviceConfig> = category.devices.iter().collect();
            ordered.sort_by_key(|d| d.order);
            if !ordered.is_empty() && ordered.len() == panel.monitors.len() {
                for (i, dc) in ordered.iter().enumerate() {
                    if let Some(j) = panel.monitors.iter().position(|m| m.id.as_str() == dc.id) {
                        if j != i {
                            let monitor = panel.monitors.remove(j);
                            panel.monitors.insert(i, monitor);
                        }
                    }
                }
            } else {
                // Count mismatch (mid-hot-plug): only refresh names.
                for monitor in &mut panel.monitors {
                    if let Some(dc) = category.device(monitor.id.as_str()) {
                        if !dc.name.is_empty() {
                            monitor.name = dc.name.clone();
                        }
                    }
                }
            }
            for (i, monitor) in panel.monitors.iter_mut().enumerate() {
                monitor.order = i as i32;
            }
            for monitor in &mut panel.monitors {
                if let Some(dc) = category.device(monitor.id.as_str()) {
                    monitor.enabled = dc.enabled;
                }
                monitor.apply_settings(settings);
            }
        }
        Ok(())
    }

    /// One polling tick: service hot-plug events, refresh the board and
    /// its sub-devices, then refresh every monitor of every panel.
    pub fn update(&self, settings: &Settings) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        self.service_hotplug(inner, settings);

        if let Some(board) = inner.board.clone() {
            inner.source.refresh_device(&board);
            for sub in inner.source.sub_devices(&board) {
                inner.source.refresh_device(&sub.id);
            }
        }

        let Inner { source, panels, .. } = inner;
        for panel in panels.iter_mut() {
            panel.update(source);
        }
    }

    /// Deep copy of the current panels for a rendering layer.
    pub fn panels_snapshot(&self) -> Vec<Panel> {
        self.lock().panels.clone()
    }

    fn service_hotplug(&self, inner: &mut Inner<S>, settings: &Settings) {
        for event in inner.source.drain_hotplug() {
            match event.class() {
                // Drive sets change size, not just order, so the whole
                // storage panel is rebuilt.
                DeviceClass::Storage => {
                    let Some(category) = settings.category(CategoryKind::Storage) else {
                        continue;
                    };
                    if !category.enabled {
                        continue;
                    }
                    log::info!("storage hot-plug, rebuilding drive panel");
                    let panel =
                        build_panel(&inner.source, inner.board.as_ref(), category, settings);
                    match inner.panel_index(CategoryKind::Storage) {
                        Some(i) => inner.panels[i] = panel,
                        None => {
                            let at = (category.order.max(0) as usize).min(inner.panels.len());
                            inner.panels.insert(at, panel);
                        }
                    }
                }
                other => {
                    log::warn!("unhandled hot-plug event for {other:?}");
                }
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<S>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<S> Inner<S> {
    fn panel_index(&self, kind: CategoryKind) -> Option<usize> {
        self.panels.iter().position(|p| p.kind == kind)
    }
}

/// Devices a category monitors: fan banks come from the motherboard and
/// its sub-devices, everything else from the top-level device list.
fn category_devices<S: HardwareSource>(
    source: &S,
    board: Option<&DeviceId>,
    kind: CategoryKind,
) -> Vec<DeviceInfo> {
    if kind == CategoryKind::Fan {
        let Some(board) = board else {
            return Vec::new();
        };
        let has_fans = |source: &S, id: &DeviceId| {
            source
                .sensors(id)
                .iter()
                .any(|s| s.sensor_type == SensorType::Fan)
        };
        let mut out = Vec::new();
        if let Some(info) = source.device(board) {
            if has_fans(source, board) {
                out.push(info);
            }
        }
        for sub in source.sub_devices(board) {
            if has_fans(source, &sub.id) {
                out.push(sub);
            }
        }
        out
    } else {
        source
            .devices()
            .into_iter()
            .filter(|d| kind.device_classes().contains(&d.class))
            .collect()
    }
}

/// Build one panel: join live devices against the stored device configs,
/// synthesizing entries for devices seen for the first time.
fn build_panel<S: HardwareSource>(
    source: &S,
    board: Option<&DeviceId>,
    category: &CategoryConfig,
    settings: &Settings,
) -> Panel {
    let mut panel = Panel::new(category.kind);
    for (i, device) in category_devices(source, board, category.kind).iter().enumerate() {
        let cfg = match category.device(device.id.as_str()) {
            Some(stored) => {
                let mut cfg = stored.clone();
                // Hardware was renamed (firmware update, driver change):
                // adopt the new name and remember it.
                if cfg.actual_name != device.name {
                    cfg.name = device.name.clone();
                    cfg.actual_name = device.name.clone();
                }
                cfg
            }
            None => DeviceConfig {
                id: device.id.as_str().to_string(),
                name: device.name.clone(),
                actual_name: device.name.clone(),
                enabled: true,
                order: i as i32,
            },
        };
        let mut monitor = build_monitor(source, category.kind, device, board, &cfg);
        monitor.apply_settings(settings);
        panel.monitors.push(monitor);
    }
    panel.monitors.sort_by_key(|m| m.order);
    for (i, monitor) in panel.monitors.iter_mut().enumerate() {
        monitor.order = i as i32;
    }
    panel
}
