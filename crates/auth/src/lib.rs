//! `sieeg-auth` — session roles and route-level access control.
//!
//! This crate is intentionally decoupled from rendering and storage.

pub mod access;
pub mod provider;
pub mod roles;
pub mod session;

pub use access::{Chrome, NavLink, Navigation, NavigationEntry, RouteDecision, decide};
pub use provider::{IdentityError, IdentityProvider, InMemoryIdentityProvider, Registration};
pub use roles::{Role, SessionRole};
pub use session::{SessionUser, SessionView};
