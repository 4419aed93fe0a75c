use std::sync::Arc;

use anyhow::Context;

use bazaar_api::app::services::AppServices;
use bazaar_api::config::{ApiConfig, BootstrapAdmin};
use bazaar_auth::{hash_password, Account, InMemoryAccountStore, Principal, Role};
use bazaar_core::PrincipalId;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real deployments set the environment directly.
    let _ = dotenvy::dotenv();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    bazaar_observability::init(config.log_format);

    let accounts = Arc::new(InMemoryAccountStore::new());
    if let Some(admin) = &config.bootstrap_admin {
        seed_admin(&accounts, admin)?;
    }

    let services = Arc::new(AppServices::new(accounts));
    let app = bazaar_api::app::build_app(&config.auth, config.cookies, services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr().context("listener has no local address")?,
        secure_cookies = config.cookies.secure,
        "listening"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

fn seed_admin(accounts: &InMemoryAccountStore, admin: &BootstrapAdmin) -> anyhow::Result<()> {
    let password_hash = hash_password(&admin.password).context("failed to hash bootstrap admin password")?;
    let principal = Principal::user(PrincipalId::generate(), Some(Role::ADMIN));
    let id = principal.id.clone();

    accounts
        .insert(Account {
            principal,
            email: admin.email.clone(),
            password_hash,
        })
        .context("failed to seed bootstrap admin")?;

    tracing::info!(principal_id = %id, email = %admin.email, "bootstrap admin created");
    Ok(())
}
