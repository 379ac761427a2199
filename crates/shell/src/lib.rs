//! `sieeg-shell`
//!
//! **Responsibility:** access and session orchestration around the invoicing
//! screens.
//!
//! This crate provides:
//! - Route-driven layout composition (header, footer, redirects)
//! - The persisted sandbox/production switch
//! - The admin-only user provisioning workflow
//!
//! Invoice screens themselves live behind the content slot and are not part
//! of this crate.

pub mod config;
pub mod environment;
pub mod error;
pub mod events;
pub mod layout;
pub mod navigation;
pub mod provisioning;
pub mod storage;

pub use config::ShellConfig;
pub use environment::{EnvironmentMode, EnvironmentModeStore, NoopReloader, Reloader};
pub use error::ShellError;
pub use events::{ShellBus, ShellEvent};
pub use layout::{LayoutComposer, LayoutOutcome, ShellView};
pub use navigation::{HistoryNavigator, NavigateOptions, Navigator};
pub use provisioning::{Feedback, SubmitOutcome, UserDraft, UserProvisioningWorkflow};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, StorageError};
