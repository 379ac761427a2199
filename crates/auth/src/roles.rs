use core::str::FromStr;

use serde::{Deserialize, Serialize};

use sieeg_core::DomainError;

/// Role carried by an authenticated account.
///
/// These are the only roles the identity provider issues and the only roles
/// an administrator can assign when provisioning a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    /// Restricted sales role, confined to the two invoicing routes.
    Vendedor,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Admin, Role::Vendedor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Vendedor => "vendedor",
        }
    }

    /// Human-facing option text in the provisioning form.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrador",
            Role::Vendedor => "Vendedor",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "vendedor" => Ok(Role::Vendedor),
            other => Err(DomainError::unknown_value(format!("role '{other}'"))),
        }
    }
}

/// Role of the current session, including the absence of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionRole {
    Admin,
    Vendedor,
    Anonymous,
}

impl SessionRole {
    pub const ALL: [SessionRole; 3] = [SessionRole::Admin, SessionRole::Vendedor, SessionRole::Anonymous];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionRole::Admin => "admin",
            SessionRole::Vendedor => "vendedor",
            SessionRole::Anonymous => "anonymous",
        }
    }
}

impl From<Role> for SessionRole {
    fn from(value: Role) -> Self {
        match value {
            Role::Admin => SessionRole::Admin,
            Role::Vendedor => SessionRole::Vendedor,
        }
    }
}

impl From<Option<Role>> for SessionRole {
    fn from(value: Option<Role>) -> Self {
        value.map_or(SessionRole::Anonymous, SessionRole::from)
    }
}

impl core::fmt::Display for SessionRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
