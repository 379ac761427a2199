//! Command-line front end for inspecting shell decisions.
//!
//! ```text
//! sieeg-shell render <path> [admin|vendedor|anonymous]
//! sieeg-shell toggle [admin|anonymous]
//! sieeg-shell mode
//! ```

use std::sync::Arc;

use anyhow::{Context, bail};

use sieeg_auth::{InMemoryIdentityProvider, Role};
use sieeg_shell::{
    EnvironmentMode, EnvironmentModeStore, HistoryNavigator, JsonFileStore, LayoutComposer, NoopReloader, ShellBus,
    ShellConfig,
};

const DEMO_PASSWORD: &str = "demo";

fn identity_for(role: Option<&str>) -> anyhow::Result<InMemoryIdentityProvider> {
    let provider = InMemoryIdentityProvider::new();
    let role = match role {
        None | Some("anonymous") => return Ok(provider),
        Some(raw) => raw.parse::<Role>().with_context(|| format!("unsupported role '{raw}'"))?,
    };

    let email = format!("{role}@sieeg.local");
    let provider = provider.with_account(&email, DEMO_PASSWORD, role, "Demo");
    provider.login(&email, DEMO_PASSWORD)?;
    Ok(provider)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sieeg_observability::init();

    let config = ShellConfig::from_env();
    let bus = Arc::new(ShellBus::new());
    let storage = Arc::new(JsonFileStore::new(&config.state_path));
    let environment = Arc::new(EnvironmentModeStore::new(
        EnvironmentMode::from_build_flag(config.api_env.as_deref()),
        storage,
        bus.clone(),
        Arc::new(NoopReloader),
    ));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["render", path, rest @ ..] => {
            let identity = Arc::new(identity_for(rest.first().copied())?);
            let navigator = Arc::new(HistoryNavigator::new(*path));
            let composer = LayoutComposer::new(identity, navigator, environment, bus);

            let outcome = composer.compose();
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        ["toggle", rest @ ..] => {
            let identity = Arc::new(identity_for(rest.first().copied())?);
            let navigator = Arc::new(HistoryNavigator::new("/"));
            let composer = LayoutComposer::new(identity, navigator, environment.clone(), bus);

            let mode = composer.toggle_mode()?;
            println!("{}", serde_json::json!({ "mode": mode, "persisted": environment.persisted() }));
        }
        ["mode"] => {
            println!(
                "{}",
                serde_json::json!({ "mode": environment.read(), "persisted": environment.persisted() })
            );
        }
        _ => bail!("usage: sieeg-shell render <path> [role] | toggle [role] | mode"),
    }

    Ok(())
}
