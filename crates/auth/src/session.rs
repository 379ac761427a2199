//! Read-only projection of the identity provider's current user.

use serde::{Deserialize, Serialize};

use crate::{Role, SessionRole};

/// The logged-in account as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Login identity (the account email).
    pub identity: String,
    pub role: Role,
}

impl SessionUser {
    pub fn new(identity: impl Into<String>, role: Role) -> Self {
        Self {
            identity: identity.into(),
            role,
        }
    }
}

/// Snapshot of the session, taken once per render cycle.
///
/// A new view is built whenever the provider's state changes; the view itself
/// never mutates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionView {
    user: Option<SessionUser>,
}

impl SessionView {
    pub fn new(user: Option<SessionUser>) -> Self {
        Self { user }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn identity(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.identity.as_str())
    }

    pub fn role(&self) -> SessionRole {
        SessionRole::from(self.user.as_ref().map(|u| u.role))
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.role() == SessionRole::Admin
    }

    pub fn is_vendedor(&self) -> bool {
        self.role() == SessionRole::Vendedor
    }

    /// Header badge text, `"{identity} ({role})"`.
    ///
    /// Only logged-in non-vendedor sessions get a badge.
    pub fn badge(&self) -> Option<String> {
        match &self.user {
            Some(user) if user.role != Role::Vendedor => Some(format!("{} ({})", user.identity, user.role)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_view_has_no_identity() {
        let view = SessionView::anonymous();
        assert_eq!(view.role(), SessionRole::Anonymous);
        assert!(!view.is_authenticated());
        assert_eq!(view.identity(), None);
        assert_eq!(view.badge(), None);
    }

    #[test]
    fn admin_badge_shows_identity_and_role() {
        let view = SessionView::new(Some(SessionUser::new("ana@sieeg.mx", Role::Admin)));
        assert!(view.is_admin());
        assert_eq!(view.badge().as_deref(), Some("ana@sieeg.mx (admin)"));
    }

    #[test]
    fn vendedor_has_no_badge() {
        let view = SessionView::new(Some(SessionUser::new("luis@sieeg.mx", Role::Vendedor)));
        assert!(view.is_vendedor());
        assert!(view.is_authenticated());
        assert_eq!(view.badge(), None);
    }
}
