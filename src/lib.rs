//! Core engine for a desktop sidebar hardware monitor.
//!
//! panelmon turns a stream of raw sensor readings into a stable,
//! configurable tree of panels, monitors and metrics that a rendering
//! layer can draw every polling tick. It owns settings persistence and
//! reconciliation, sensor selection, alert thresholds, unit conversion
//! and the polling loop itself; it deliberately owns no pixels and no
//! sensor acquisition.
//!
//! # Architecture
//!
//! - [`hal`]: the hardware collaborator surface: devices, typed
//!   sensors, storage summaries. A `sysinfo`-backed implementation ships
//!   behind the `system` feature; richer sensor libraries plug in via
//!   the [`hal::HardwareSource`] trait.
//! - [`config`]: the persisted settings tree and its three-phase keyed
//!   reconciliation.
//! - [`context`]: shared application state and settings-change
//!   broadcasts.
//! - [`monitor`]: per-category runtime monitors with their sensor
//!   selection heuristics.
//! - [`manager`]: the orchestrator joining live hardware against
//!   configuration.
//! - [`poller`]: the self-pacing background polling loop.
//!
//! # Example
//!
//! ```no_run
//! use panelmon::context::AppContext;
//! use panelmon::hal::system::SystemSource;
//! use panelmon::manager::HardwareManager;
//! use panelmon::poller::Poller;
//! use std::sync::Arc;
//!
//! # fn main() -> panelmon::Result<()> {
//! let ctx = Arc::new(AppContext::new()?);
//! let manager = Arc::new(HardwareManager::new(SystemSource::new()));
//! manager.start(&ctx.snapshot())?;
//!
//! let rx = ctx.subscribe();
//! let mut poller = Poller::new();
//! poller.start(Arc::clone(&ctx), Arc::clone(&manager))?;
//!
//! // Rendering layer: draw manager.panels_snapshot() each frame and
//! // forward settings changes from `rx` into manager.apply_change().
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod hal;
pub mod manager;
pub mod metric;
pub mod monitor;
pub mod poller;
pub mod units;

#[cfg(test)]
mod testutil;

pub use error::{Error, Result};
