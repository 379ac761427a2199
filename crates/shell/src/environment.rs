//! Sandbox/production switch for the billing environment.

use core::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use sieeg_auth::SessionView;
use sieeg_auth::access::can_toggle_environment;
use sieeg_core::DomainError;
use sieeg_events::{EventBus, Subscription};

use crate::error::ShellError;
use crate::events::{ShellBus, ShellEvent};
use crate::storage::KeyValueStore;

/// Storage key holding the persisted mode.
pub const MODE_STORAGE_KEY: &str = "factura_mode";

/// Build flag value that selects production; anything else is sandbox.
pub const PRODUCTION_FLAG: &str = "produccion";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentMode {
    Sandbox,
    Production,
}

impl EnvironmentMode {
    pub fn from_build_flag(flag: Option<&str>) -> Self {
        if flag == Some(PRODUCTION_FLAG) {
            EnvironmentMode::Production
        } else {
            EnvironmentMode::Sandbox
        }
    }

    /// Canonical persisted form.
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentMode::Sandbox => "sandbox",
            EnvironmentMode::Production => "production",
        }
    }

    /// Text on the toggle control.
    pub fn label(&self) -> &'static str {
        match self {
            EnvironmentMode::Sandbox => "Sandbox",
            EnvironmentMode::Production => "Producción",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            EnvironmentMode::Sandbox => EnvironmentMode::Production,
            EnvironmentMode::Production => EnvironmentMode::Sandbox,
        }
    }
}

impl core::fmt::Display for EnvironmentMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvironmentMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sandbox" => Ok(EnvironmentMode::Sandbox),
            "production" => Ok(EnvironmentMode::Production),
            other => Err(DomainError::unknown_value(format!("environment mode '{other}'"))),
        }
    }
}

/// Hook invoked after every mode change.
///
/// Hosts that can only pick up a new mode by restarting plug a restart in
/// here; in-process consumers should subscribe to [`ShellEvent::ModeChanged`]
/// instead.
pub trait Reloader: Send + Sync {
    fn reload(&self);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReloader;

impl Reloader for NoopReloader {
    fn reload(&self) {}
}

/// Owns the current environment mode and its persisted copy.
pub struct EnvironmentModeStore {
    mode: Mutex<EnvironmentMode>,
    storage: Arc<dyn KeyValueStore>,
    bus: Arc<ShellBus>,
    reloader: Arc<dyn Reloader>,
}

impl EnvironmentModeStore {
    /// Start in `initial` regardless of what storage holds.
    pub fn new(
        initial: EnvironmentMode,
        storage: Arc<dyn KeyValueStore>,
        bus: Arc<ShellBus>,
        reloader: Arc<dyn Reloader>,
    ) -> Self {
        Self {
            mode: Mutex::new(initial),
            storage,
            bus,
            reloader,
        }
    }

    pub fn read(&self) -> EnvironmentMode {
        *self.mode.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mode last written to storage, if any readable value is there.
    pub fn persisted(&self) -> Option<EnvironmentMode> {
        match self.storage.get(MODE_STORAGE_KEY) {
            Ok(raw) => raw.and_then(|v| v.parse().ok()),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read persisted environment mode");
                None
            }
        }
    }

    pub fn subscribe(&self) -> Subscription<ShellEvent> {
        self.bus.subscribe()
    }

    /// Flip the mode, persist it, notify subscribers, then reload.
    ///
    /// A failed storage write is logged and otherwise ignored. Vendedor
    /// sessions never see this control and get `Forbidden`.
    pub fn toggle(&self, session: &SessionView) -> Result<EnvironmentMode, ShellError> {
        if !can_toggle_environment(session.role()) {
            return Err(ShellError::forbidden("environment mode is not available to this role"));
        }

        let next = {
            let mut mode = self.mode.lock().unwrap_or_else(PoisonError::into_inner);
            *mode = mode.toggled();
            let next = *mode;

            if let Err(err) = self.storage.set(MODE_STORAGE_KEY, next.as_str()) {
                tracing::warn!(error = %err, mode = %next, "environment mode not persisted");
            }
            if let Err(err) = self.bus.publish(ShellEvent::ModeChanged { mode: next }) {
                tracing::warn!(error = ?err, "failed to announce environment mode change");
            }
            next
        };

        tracing::info!(mode = %next, "environment mode toggled");
        self.reloader.reload();

        Ok(next)
    }
}

impl core::fmt::Debug for EnvironmentModeStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EnvironmentModeStore").field("mode", &self.read()).finish_non_exhaustive()
    }
}
