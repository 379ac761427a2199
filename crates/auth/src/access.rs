//! Route-level access control for the application shell.
//!
//! Everything here is a pure function of `(SessionRole, current path)`:
//! - No IO
//! - No navigation side effects (the caller performs any redirect)
//! - No panics

use serde::Serialize;

use crate::SessionRole;

/// Well-known application routes.
pub mod routes {
    pub const LOGIN: &str = "/login";
    pub const REGISTER: &str = "/register";
    pub const CUSTOMERS: &str = "/customers";
    pub const FACTURA_NORMAL: &str = "/factura-normal";
    pub const FACTURA_CLIENTES: &str = "/factura-clientes";
    pub const CFDI_LIST: &str = "/cfdi-list";
    pub const USERS_MANAGER: &str = "/users-manager";
}

/// One entry of the static navigation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavigationEntry {
    pub path: &'static str,
    pub label: &'static str,
    pub admin_only: bool,
}

/// Navigation table, in render order.
pub const NAVIGATION: [NavigationEntry; 5] = [
    NavigationEntry {
        path: routes::CUSTOMERS,
        label: "Clientes",
        admin_only: false,
    },
    NavigationEntry {
        path: routes::FACTURA_NORMAL,
        label: "Facturacion Electrónica",
        admin_only: false,
    },
    NavigationEntry {
        path: routes::FACTURA_CLIENTES,
        label: "Factura Clientes",
        admin_only: false,
    },
    NavigationEntry {
        path: routes::CFDI_LIST,
        label: "Listar CFDI",
        admin_only: false,
    },
    NavigationEntry {
        path: routes::USERS_MANAGER,
        label: "Gestionar Usuarios",
        admin_only: true,
    },
];

/// The only text a vendedor sees in the navigation area.
pub const VENDEDOR_LABEL: &str = "Factura Normal";

/// Routes a vendedor session may stay on.
pub const VENDEDOR_ROUTES: [&str; 2] = [routes::FACTURA_NORMAL, routes::FACTURA_CLIENTES];

/// A navigation entry resolved against the current path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub path: &'static str,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Navigation {
    Links { links: Vec<NavLink> },
    StaticLabel { label: &'static str },
    Empty,
}

impl Navigation {
    pub fn links(&self) -> &[NavLink] {
        match self {
            Navigation::Links { links } => links.as_slice(),
            _ => &[],
        }
    }
}

/// How much of the page chrome surrounds the content slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Chrome {
    /// Header and footer.
    Full,
    /// Footer only.
    Bare,
    /// Neither header nor footer; content is centered on its own.
    Hidden,
}

impl Chrome {
    pub fn shows_header(&self) -> bool {
        matches!(self, Chrome::Full)
    }

    pub fn shows_footer(&self) -> bool {
        !matches!(self, Chrome::Hidden)
    }
}

/// Outcome of evaluating a route for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RouteDecision {
    Render { navigation: Navigation, chrome: Chrome },
    /// Replace the current history entry with `to` and render nothing this cycle.
    Redirect { to: &'static str },
}

/// Decide what to render for `role` at `current_path`.
///
/// The vendedor redirect is checked first and wins over every other rule.
pub fn decide(role: SessionRole, current_path: &str) -> RouteDecision {
    if let Some(to) = redirect_for(role, current_path) {
        return RouteDecision::Redirect { to };
    }

    RouteDecision::Render {
        navigation: navigation_for(role, current_path),
        chrome: chrome_for(role, current_path),
    }
}

/// Redirect target for a vendedor outside its two allowed routes.
pub fn redirect_for(role: SessionRole, current_path: &str) -> Option<&'static str> {
    if role == SessionRole::Vendedor && !VENDEDOR_ROUTES.contains(&current_path) {
        Some(routes::FACTURA_NORMAL)
    } else {
        None
    }
}

/// Entries of [`NAVIGATION`] visible to `role`, in table order.
///
/// A vendedor sees none of them.
pub fn visible_entries(role: SessionRole) -> impl Iterator<Item = &'static NavigationEntry> {
    NAVIGATION.iter().filter(move |entry| match role {
        SessionRole::Vendedor => false,
        SessionRole::Admin => true,
        SessionRole::Anonymous => !entry.admin_only,
    })
}

pub fn navigation_for(role: SessionRole, current_path: &str) -> Navigation {
    if role == SessionRole::Vendedor {
        return if current_path == routes::FACTURA_NORMAL {
            Navigation::StaticLabel { label: VENDEDOR_LABEL }
        } else {
            Navigation::Empty
        };
    }

    let links = visible_entries(role)
        .map(|entry| NavLink {
            path: entry.path,
            label: entry.label,
            active: entry.path == current_path,
        })
        .collect();

    Navigation::Links { links }
}

pub fn chrome_for(role: SessionRole, current_path: &str) -> Chrome {
    match current_path {
        routes::LOGIN | routes::REGISTER => Chrome::Hidden,
        routes::FACTURA_CLIENTES if matches!(role, SessionRole::Anonymous | SessionRole::Vendedor) => Chrome::Bare,
        routes::FACTURA_NORMAL if role == SessionRole::Vendedor => Chrome::Bare,
        _ => Chrome::Full,
    }
}

/// Whether the sandbox/production control exists for `role`.
pub fn can_toggle_environment(role: SessionRole) -> bool {
    role != SessionRole::Vendedor
}

/// Whether the "add user" control exists for `role`.
pub fn can_provision_users(role: SessionRole) -> bool {
    role == SessionRole::Admin
}
