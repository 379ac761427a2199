//! Events the shell announces on the application bus.
//!
//! This is the whole cross-component contract: consumers outside the shell
//! (e.g. the billing client choosing its endpoint) subscribe here instead of
//! reading shared global state.

use serde::Serialize;

use sieeg_auth::Role;
use sieeg_events::InMemoryEventBus;

use crate::environment::EnvironmentMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShellEvent {
    /// The environment mode changed; all consumers must switch together.
    ModeChanged { mode: EnvironmentMode },
    /// A vendedor was moved off a route it may not see.
    Redirected { from: String, to: String },
    UserProvisioned { email: String, role: Role },
    ProvisioningFailed { email: String },
    LoggedOut { identity: String },
}

pub type ShellBus = InMemoryEventBus<ShellEvent>;
