//! End-to-end shell flows with in-memory collaborators.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;

use sieeg_auth::access::routes;
use sieeg_auth::{IdentityError, IdentityProvider, InMemoryIdentityProvider, Registration, Role, SessionUser};
use sieeg_events::EventBus;
use sieeg_shell::environment::MODE_STORAGE_KEY;
use sieeg_shell::provisioning::SUCCESS_MESSAGE;
use sieeg_shell::{
    EnvironmentMode, EnvironmentModeStore, HistoryNavigator, JsonFileStore, KeyValueStore, LayoutComposer,
    LayoutOutcome, Navigator, NoopReloader, ShellBus, ShellEvent, ShellView, SubmitOutcome,
};

/// Delegates to the in-memory provider, but holds `register` until released.
struct HeldProvider {
    inner: InMemoryIdentityProvider,
    release: Notify,
    entered: AtomicBool,
}

#[async_trait]
impl IdentityProvider for HeldProvider {
    fn current_user(&self) -> Option<SessionUser> {
        self.inner.current_user()
    }

    fn logout(&self) {
        self.inner.logout();
    }

    async fn register(&self, registration: Registration) -> Result<bool, IdentityError> {
        self.entered.store(true, Ordering::SeqCst);
        self.release.notified().await;
        self.inner.register(registration).await
    }
}

fn rendered(outcome: LayoutOutcome) -> ShellView {
    match outcome {
        LayoutOutcome::Rendered { view } => view,
        LayoutOutcome::Redirected { to } => panic!("unexpected redirect to {to}"),
    }
}

#[tokio::test]
async fn admin_provisions_vendedor_who_is_then_confined() {
    let dir = tempfile::tempdir().unwrap();
    let identity = Arc::new(InMemoryIdentityProvider::new().with_account("ana@sieeg.mx", "pw", Role::Admin, "Ana"));
    identity.login("ana@sieeg.mx", "pw").unwrap();

    let bus = Arc::new(ShellBus::new());
    let events = bus.subscribe();
    let navigator = Arc::new(HistoryNavigator::new(routes::CUSTOMERS));
    let environment = Arc::new(EnvironmentModeStore::new(
        EnvironmentMode::Sandbox,
        Arc::new(JsonFileStore::new(dir.path().join("state.json"))),
        bus.clone(),
        Arc::new(NoopReloader),
    ));
    let composer = LayoutComposer::new(identity.clone(), navigator.clone(), environment, bus);

    composer.open_add_user().unwrap();
    for (field, value) in [
        ("name", "Luis"),
        ("email", "luis@sieeg.mx"),
        ("password", "venta123"),
        ("type", "vendedor"),
    ] {
        composer.add_user_input(field, value).unwrap();
    }
    assert_eq!(composer.submit_add_user().await, SubmitOutcome::Created);

    let modal = rendered(composer.compose()).modal.expect("modal stays open");
    assert_eq!(modal.feedback, Some(SUCCESS_MESSAGE));
    assert_eq!(modal.draft.email, "");
    assert_eq!(identity.account("luis@sieeg.mx"), Some(("Luis".to_string(), Role::Vendedor)));

    composer.logout();
    identity.login("luis@sieeg.mx", "venta123").unwrap();
    composer.follow_link(routes::USERS_MANAGER);

    assert_eq!(
        composer.compose(),
        LayoutOutcome::Redirected {
            to: routes::FACTURA_NORMAL
        }
    );
    assert_eq!(navigator.current_path(), routes::FACTURA_NORMAL);

    let view = rendered(composer.compose());
    assert_eq!(view.header, None);
    assert_eq!(view.modal, None);

    let seen = events.drain();
    assert!(seen.contains(&ShellEvent::UserProvisioned {
        email: "luis@sieeg.mx".to_string(),
        role: Role::Vendedor,
    }));
    assert!(seen.contains(&ShellEvent::LoggedOut {
        identity: "ana@sieeg.mx".to_string(),
    }));
    assert!(seen.contains(&ShellEvent::Redirected {
        from: routes::USERS_MANAGER.to_string(),
        to: routes::FACTURA_NORMAL.to_string(),
    }));
}

#[tokio::test]
async fn mode_can_change_while_registration_is_outstanding() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");
    let inner = InMemoryIdentityProvider::new().with_account("ana@sieeg.mx", "pw", Role::Admin, "Ana");
    inner.login("ana@sieeg.mx", "pw").unwrap();
    let identity = Arc::new(HeldProvider {
        inner,
        release: Notify::new(),
        entered: AtomicBool::new(false),
    });

    let bus = Arc::new(ShellBus::new());
    let environment = Arc::new(EnvironmentModeStore::new(
        EnvironmentMode::from_build_flag(Some("produccion")),
        Arc::new(JsonFileStore::new(&state_path)),
        bus.clone(),
        Arc::new(NoopReloader),
    ));
    let composer = Arc::new(LayoutComposer::new(
        identity.clone(),
        Arc::new(HistoryNavigator::new(routes::CFDI_LIST)),
        environment,
        bus,
    ));

    composer.open_add_user().unwrap();
    composer.add_user_input("name", "Marta").unwrap();
    composer.add_user_input("email", "marta@sieeg.mx").unwrap();
    composer.add_user_input("password", "pw2").unwrap();

    let pending = tokio::spawn({
        let composer = composer.clone();
        async move { composer.submit_add_user().await }
    });
    while !identity.entered.load(Ordering::SeqCst) {
        tokio::task::yield_now().await;
    }

    assert_eq!(composer.toggle_mode().unwrap(), EnvironmentMode::Sandbox);
    assert_eq!(
        JsonFileStore::new(&state_path).get(MODE_STORAGE_KEY).unwrap().as_deref(),
        Some("sandbox")
    );

    identity.release.notify_one();
    assert_eq!(pending.await.unwrap(), SubmitOutcome::Created);
    assert_eq!(composer.environment().read(), EnvironmentMode::Sandbox);
}
