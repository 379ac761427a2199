//! Top-level composition of the application shell.
//!
//! `compose()` is one render cycle: read the session and the current path,
//! ask the access rules what to show, and either perform the redirect or
//! return a [`ShellView`] describing header, footer and modal. User actions
//! (toggle, logout, "add user", form events) are methods on the composer.

use std::sync::Arc;

use serde::Serialize;

use sieeg_auth::access::{can_provision_users, can_toggle_environment};
use sieeg_auth::{Chrome, IdentityProvider, Navigation, Role, RouteDecision, SessionView, decide};
use sieeg_events::EventBus;

use crate::environment::{EnvironmentMode, EnvironmentModeStore};
use crate::error::ShellError;
use crate::events::{ShellBus, ShellEvent};
use crate::navigation::{NavigateOptions, Navigator};
use crate::provisioning::{SubmitOutcome, UserDraft, UserProvisioningWorkflow, WorkflowPhase};

pub const FOOTER_TEXT: &str = "© 2025 Facturación SIEEG";
pub const ADD_USER_LABEL: &str = "Agregar usuario";
pub const LOGOUT_LABEL: &str = "Salir";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeToggleView {
    pub mode: EnvironmentMode,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderView {
    pub navigation: Navigation,
    /// `"{identity} ({role})"` for logged-in non-vendedor sessions.
    pub badge: Option<String>,
    pub add_user: bool,
    pub mode_toggle: Option<ModeToggleView>,
    pub logout: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleOption {
    pub value: Role,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModalView {
    pub phase: WorkflowPhase,
    pub draft: UserDraft,
    pub feedback: Option<&'static str>,
    pub role_options: Vec<RoleOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShellView {
    pub chrome: Chrome,
    pub header: Option<HeaderView>,
    pub footer: Option<&'static str>,
    pub modal: Option<ModalView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LayoutOutcome {
    /// Navigation was replaced; nothing renders this cycle.
    Redirected { to: &'static str },
    Rendered { view: ShellView },
}

pub struct LayoutComposer {
    identity: Arc<dyn IdentityProvider>,
    navigator: Arc<dyn Navigator>,
    environment: Arc<EnvironmentModeStore>,
    provisioning: UserProvisioningWorkflow,
    bus: Arc<ShellBus>,
}

impl LayoutComposer {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        navigator: Arc<dyn Navigator>,
        environment: Arc<EnvironmentModeStore>,
        bus: Arc<ShellBus>,
    ) -> Self {
        let provisioning = UserProvisioningWorkflow::new(identity.clone(), bus.clone());
        Self {
            identity,
            navigator,
            environment,
            provisioning,
            bus,
        }
    }

    pub fn session(&self) -> SessionView {
        SessionView::new(self.identity.current_user())
    }

    pub fn environment(&self) -> &EnvironmentModeStore {
        &self.environment
    }

    pub fn provisioning(&self) -> &UserProvisioningWorkflow {
        &self.provisioning
    }

    /// Run one render cycle.
    ///
    /// Navigation is only rendered inside the header. On `Bare` routes (a
    /// vendedor on `/factura-normal`, for instance) the header is omitted, so
    /// the vendedor label from [`decide`] does not appear in the view.
    pub fn compose(&self) -> LayoutOutcome {
        let session = self.session();
        let path = self.navigator.current_path();
        let role = session.role();

        let (navigation, chrome) = match decide(role, &path) {
            RouteDecision::Redirect { to } => {
                tracing::info!(from = %path, to, role = %role, "redirecting restricted session");
                self.navigator.navigate(to, NavigateOptions::replace());
                self.announce(ShellEvent::Redirected {
                    from: path,
                    to: to.to_string(),
                });
                return LayoutOutcome::Redirected { to };
            }
            RouteDecision::Render { navigation, chrome } => (navigation, chrome),
        };

        let header = chrome.shows_header().then(|| HeaderView {
            navigation,
            badge: session.badge(),
            add_user: can_provision_users(role),
            mode_toggle: can_toggle_environment(role).then(|| {
                let mode = self.environment.read();
                ModeToggleView {
                    mode,
                    label: mode.label(),
                }
            }),
            logout: session.is_authenticated(),
        });

        let modal = (chrome != Chrome::Hidden && can_provision_users(role) && self.provisioning.is_open())
            .then(|| self.modal_view());

        LayoutOutcome::Rendered {
            view: ShellView {
                chrome,
                header,
                footer: chrome.shows_footer().then_some(FOOTER_TEXT),
                modal,
            },
        }
    }

    /// Follow a navigation link.
    pub fn follow_link(&self, path: &str) {
        self.navigator.navigate(path, NavigateOptions::push());
    }

    pub fn toggle_mode(&self) -> Result<EnvironmentMode, ShellError> {
        self.environment.toggle(&self.session())
    }

    /// End the session. The provisioning form is closed with it.
    pub fn logout(&self) {
        let identity = self.session().identity().map(str::to_string);
        self.identity.logout();
        self.provisioning.dismiss();

        if let Some(identity) = identity {
            tracing::info!(identity = %identity, "logged out");
            self.announce(ShellEvent::LoggedOut { identity });
        }
    }

    pub fn open_add_user(&self) -> Result<(), ShellError> {
        self.provisioning.open(&self.session())
    }

    pub fn dismiss_add_user(&self) {
        self.provisioning.dismiss();
    }

    pub fn add_user_input(&self, name: &str, value: &str) -> Result<(), ShellError> {
        self.provisioning.input(name, value)
    }

    pub async fn submit_add_user(&self) -> SubmitOutcome {
        self.provisioning.submit().await
    }

    fn modal_view(&self) -> ModalView {
        ModalView {
            phase: self.provisioning.phase(),
            draft: self.provisioning.draft(),
            feedback: self.provisioning.feedback().map(|f| f.message()),
            role_options: Role::ALL
                .iter()
                .map(|role| RoleOption {
                    value: *role,
                    label: role.label(),
                })
                .collect(),
        }
    }

    fn announce(&self, event: ShellEvent) {
        if let Err(err) = self.bus.publish(event) {
            tracing::warn!(error = ?err, "failed to publish shell event");
        }
    }
}

impl core::fmt::Debug for LayoutComposer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayoutComposer")
            .field("environment", &self.environment)
            .field("provisioning", &self.provisioning)
            .finish_non_exhaustive()
    }
}
