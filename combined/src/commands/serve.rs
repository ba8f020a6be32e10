//! Serve command - wires every service into one process and starts the API.

use std::net::SocketAddr;
use std::sync::Arc;

use academic_service_lib::{AcademicServices, PersonClient};
use common::{AppConfig, AppError, AppResult, Database, MigrateAction};
use gateway_lib::{AppState, Cache};
use identity_service_lib::{AuthSettings, IdentityServices};
use person_service_lib::PersonServices;

use super::migrate;
use crate::cli::ServeArgs;

pub async fn execute(args: ServeArgs, mut config: AppConfig) -> AppResult<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!("Starting server...");
    let db = Database::connect(&config.database).await?;
    migrate::run(&db, MigrateAction::Up).await?;

    let identity = IdentityServices::build(
        db.get_connection(),
        AuthSettings::from_config(&config.jwt, &config.lockout),
    );
    let persons = PersonServices::build(db.get_connection());
    let people = Arc::new(PersonClient::new(
        persons.students.clone(),
        persons.staff.clone(),
    ));
    let academic = AcademicServices::build(db.get_connection(), people);

    identity.roles.seed_defaults().await?;
    tracing::info!("Default roles and permissions ensured");

    if let (Some(email), Some(password)) = (
        config.bootstrap.admin_email.as_deref(),
        config.bootstrap.admin_password.as_deref(),
    ) {
        let admin = identity.auth.bootstrap_admin(email, password).await?;
        tracing::info!(user_id = %admin.id, "Administrator account ready");
    }

    let mut state = AppState::new(identity, persons, academic, db, config.rate_limit.clone());
    match config.cache.url.as_deref() {
        Some(url) => {
            let cache = Cache::connect(url, config.cache.default_ttl_seconds).await?;
            tracing::info!("Redis cache connected");
            state = state.with_cache(Arc::new(cache));
        }
        None => tracing::warn!("REDIS_URL not set; caching and rate limiting disabled"),
    }

    let addr: SocketAddr = config.bind_address().parse().map_err(|e| {
        AppError::validation(format!("Invalid bind address {}: {}", config.bind_address(), e))
    })?;
    gateway_lib::serve(state, addr)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))
}
