//! Admin-only "add user" workflow.
//!
//! Phases: `Closed -> Open -> Submitting -> Open`, with the outcome of the last
//! submission kept as [`Feedback`] until the next attempt or a dismissal.
//!
//! State sits behind a mutex that is released before the registration call is
//! awaited, so input, dismissal and unrelated shell actions keep working while
//! a registration is outstanding. At most one registration is in flight per
//! workflow; a second submit is turned away with
//! [`SubmitOutcome::AlreadySubmitting`].

use core::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use sieeg_auth::access::can_provision_users;
use sieeg_auth::{IdentityProvider, Registration, Role, SessionView};
use sieeg_core::{DomainError, RequiredField, missing_required};
use sieeg_events::EventBus;

use crate::error::ShellError;
use crate::events::{ShellBus, ShellEvent};

pub const SUCCESS_MESSAGE: &str = "Usuario creado correctamente";
pub const FAILURE_MESSAGE: &str = "Error al crear usuario";

/// Form contents for the account being created.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
}

impl UserDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        missing_required(&[
            RequiredField::new("name", &self.name),
            RequiredField::new("email", &self.email),
            RequiredField::new("password", &self.password),
        ])
    }

    fn to_registration(&self) -> Registration {
        Registration {
            email: self.email.clone(),
            password: self.password.clone(),
            role: self.role,
            name: self.name.clone(),
        }
    }
}

impl core::fmt::Debug for UserDraft {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UserDraft")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// A single input of the draft form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Name,
    Email,
    Password,
    Role,
}

impl FromStr for DraftField {
    type Err = DomainError;

    /// Accepts the form input names; `type` is the role select.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(DraftField::Name),
            "email" => Ok(DraftField::Email),
            "password" => Ok(DraftField::Password),
            "type" | "role" => Ok(DraftField::Role),
            other => Err(DomainError::unknown_value(format!("form field '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    Success,
    Failure,
}

impl Feedback {
    pub fn message(&self) -> &'static str {
        match self {
            Feedback::Success => SUCCESS_MESSAGE,
            Feedback::Failure => FAILURE_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    Closed,
    Open,
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The provider created the account.
    Created,
    /// The provider declined or failed; the draft is kept for a retry.
    Declined,
    /// Required fields are empty; the provider was not called.
    Blocked { missing: Vec<&'static str> },
    /// Another registration from this workflow is still outstanding.
    AlreadySubmitting,
    /// The form is not open.
    NotOpen,
}

#[derive(Debug, Default)]
struct WorkflowState {
    open: bool,
    draft: UserDraft,
    feedback: Option<Feedback>,
    in_flight: bool,
    // Bumped on every open/dismiss so a late outcome can tell whether the
    // form it belongs to is still on screen.
    generation: u64,
}

/// Clears `in_flight` if a submission is dropped before it completes.
struct InFlightGuard<'a> {
    state: &'a Mutex<WorkflowState>,
    armed: bool,
}

impl InFlightGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.in_flight = false;
            tracing::debug!("registration abandoned before completion");
        }
    }
}

/// Handle to the provisioning workflow; clones share state.
#[derive(Clone)]
pub struct UserProvisioningWorkflow {
    state: Arc<Mutex<WorkflowState>>,
    provider: Arc<dyn IdentityProvider>,
    bus: Arc<ShellBus>,
}

impl UserProvisioningWorkflow {
    pub fn new(provider: Arc<dyn IdentityProvider>, bus: Arc<ShellBus>) -> Self {
        Self {
            state: Arc::new(Mutex::new(WorkflowState::default())),
            provider,
            bus,
        }
    }

    /// Open the form. Only admin sessions have the control that does this.
    pub fn open(&self, session: &SessionView) -> Result<(), ShellError> {
        if !can_provision_users(session.role()) {
            return Err(ShellError::forbidden("only administrators can add users"));
        }

        let mut state = self.lock();
        if !state.open {
            state.open = true;
            state.generation += 1;
        }
        Ok(())
    }

    /// Close the form from any phase, dropping feedback.
    ///
    /// An outstanding registration keeps running; its outcome no longer
    /// produces feedback.
    pub fn dismiss(&self) {
        let mut state = self.lock();
        state.open = false;
        state.feedback = None;
        state.generation += 1;
    }

    /// Update exactly one draft field.
    pub fn set_field(&self, field: DraftField, value: &str) -> Result<(), ShellError> {
        let mut state = self.lock();
        match field {
            DraftField::Name => state.draft.name = value.to_string(),
            DraftField::Email => state.draft.email = value.to_string(),
            DraftField::Password => state.draft.password = value.to_string(),
            DraftField::Role => state.draft.role = value.parse::<Role>()?,
        }
        Ok(())
    }

    /// Form-event entry point: `name` is the input's name attribute.
    pub fn input(&self, name: &str, value: &str) -> Result<(), ShellError> {
        self.set_field(name.parse()?, value)
    }

    pub fn draft(&self) -> UserDraft {
        self.lock().draft.clone()
    }

    pub fn feedback(&self) -> Option<Feedback> {
        self.lock().feedback
    }

    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    pub fn phase(&self) -> WorkflowPhase {
        let state = self.lock();
        match (state.open, state.in_flight) {
            (false, _) => WorkflowPhase::Closed,
            (true, true) => WorkflowPhase::Submitting,
            (true, false) => WorkflowPhase::Open,
        }
    }

    /// Submit the draft to the identity provider.
    ///
    /// This is the only suspension point of the shell. On success the draft is
    /// reset and the form stays open; on failure the draft is kept. Dropping
    /// the returned future releases the in-flight slot.
    pub async fn submit(&self) -> SubmitOutcome {
        let (registration, generation) = {
            let mut state = self.lock();
            if !state.open {
                return SubmitOutcome::NotOpen;
            }
            if state.in_flight {
                tracing::debug!("ignoring submit while a registration is outstanding");
                return SubmitOutcome::AlreadySubmitting;
            }

            let missing = state.draft.missing_fields();
            if !missing.is_empty() {
                tracing::debug!(?missing, "submission blocked by required fields");
                return SubmitOutcome::Blocked { missing };
            }

            state.feedback = None;
            state.in_flight = true;
            (state.draft.to_registration(), state.generation)
        };
        let mut in_flight = InFlightGuard {
            state: &*self.state,
            armed: true,
        };

        let email = registration.email.clone();
        let role = registration.role;
        tracing::info!(email = %email, role = %role, "provisioning user");

        let created = match self.provider.register(registration).await {
            Ok(created) => created,
            Err(err) => {
                tracing::warn!(email = %email, error = %err, "identity provider failed during registration");
                false
            }
        };

        let event = {
            let mut state = self.lock();
            state.in_flight = false;
            in_flight.disarm();
            let same_form = state.generation == generation;
            let on_screen = state.open && same_form;

            if created {
                // A reopened form holds new input; leave it alone.
                if same_form || !state.open {
                    state.draft = UserDraft::default();
                }
                if on_screen {
                    state.feedback = Some(Feedback::Success);
                }
                ShellEvent::UserProvisioned { email, role }
            } else {
                if on_screen {
                    state.feedback = Some(Feedback::Failure);
                }
                ShellEvent::ProvisioningFailed { email }
            }
        };

        match &event {
            ShellEvent::UserProvisioned { email, .. } => tracing::info!(email = %email, "user provisioned"),
            _ => tracing::warn!("user provisioning failed"),
        }
        if let Err(err) = self.bus.publish(event) {
            tracing::warn!(error = ?err, "failed to announce provisioning outcome");
        }

        if created { SubmitOutcome::Created } else { SubmitOutcome::Declined }
    }

    fn lock(&self) -> MutexGuard<'_, WorkflowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl core::fmt::Debug for UserProvisioningWorkflow {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UserProvisioningWorkflow")
            .field("phase", &self.phase())
            .field("feedback", &self.feedback())
            .finish_non_exhaustive()
    }
}
