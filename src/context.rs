//! Application context.
//!
//! One [`AppContext`] instance owns the live settings and their file
//! path, and fans out change notifications to subscribers. Components
//! receive it explicitly instead of reaching for process-global state,
//! which keeps tests able to run several isolated contexts in parallel.
//!
//! Edits follow a clone-edit-apply flow: take [`edit_snapshot`], mutate
//! it freely, hand it back to [`apply`]. Apply merges the snapshot into
//! the live tree, persists it, and only then notifies subscribers.
//!
//! [`edit_snapshot`]: AppContext::edit_snapshot
//! [`apply`]: AppContext::apply

use crate::config::{store, Settings};
use crate::error::Result;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

/// A settings change that survived persistence.
#[derive(Debug, Clone)]
pub struct SettingsChange {
    /// Tree before the change; `None` only for synthetic first events.
    pub previous: Option<Settings>,
    /// Tree after the change.
    pub current: Settings,
    pub changed_at: DateTime<Utc>,
}

/// Shared application state: live settings, their path, subscribers.
pub struct AppContext {
    settings: RwLock<Settings>,
    path: PathBuf,
    subscribers: Mutex<Vec<Sender<SettingsChange>>>,
}

impl AppContext {
    /// Load from the default settings path.
    pub fn new() -> Result<Self> {
        Self::with_path(store::default_path()?)
    }

    /// Load from an explicit path. A fresh install (no file yet) writes
    /// the normalized defaults immediately so the file always exists
    /// after startup.
    pub fn with_path(path: PathBuf) -> Result<Self> {
        let mut settings = store::load(&path)?;
        if settings.initial_start {
            log::info!("first start, writing default settings");
            settings.before_save();
            store::save(&path, &settings)?;
        }
        Ok(Self {
            settings: RwLock::new(settings),
            path,
            subscribers: Mutex::new(Vec::new()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deep copy of the live settings.
    pub fn snapshot(&self) -> Settings {
        // A poisoned lock still holds a valid tree.
        self.settings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Deep copy for an editor; identical to [`snapshot`] but named for
    /// the clone-edit-apply flow.
    ///
    /// [`snapshot`]: AppContext::snapshot
    pub fn edit_snapshot(&self) -> Settings {
        self.snapshot()
    }

    /// Current polling interval.
    pub fn update_interval(&self) -> Duration {
        let ms = self
            .settings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .update_interval_ms;
        Duration::from_millis(ms)
    }

    /// Register for change notifications. Receivers that are dropped are
    /// pruned on the next broadcast.
    pub fn subscribe(&self) -> Receiver<SettingsChange> {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(tx);
        rx
    }

    /// Merge an edited snapshot into the live tree, persist, notify.
    ///
    /// The merge happens before persistence, so on a save failure the
    /// in-memory tree already carries the edit (it stays the source of
    /// truth); the error is returned and no notification goes out.
    pub fn apply(&self, edited: &Settings) -> Result<()> {
        let (previous, current) = {
            let mut live = self.settings.write().unwrap_or_else(|e| e.into_inner());
            let previous = live.clone();
            live.copy_from(edited);
            live.before_save();
            store::save(&self.path, &live)?;
            (previous, live.clone())
        };
        self.broadcast(SettingsChange {
            previous: Some(previous),
            current,
            changed_at: Utc::now(),
        });
        Ok(())
    }

    fn broadcast(&self, change: SettingsChange) {
        let mut subs = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        subs.retain(|tx| tx.send(change.clone()).is_ok());
    }
}
