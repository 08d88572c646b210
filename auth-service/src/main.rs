//! # Gatehouse - Authorization Service
//!
//! OAuth 2.0 authorization server issuing JWT access tokens through the
//! authorization-code grant.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        HTTP Layer (api/)                        │
//! │        routes            handlers            DTOs               │
//! └───────────────────────────────┬─────────────────────────────────┘
//!                                 │
//!                                 ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Service Layer (service/)                    │
//! │  OAuthService · StateStore · ScopeAuthority · AccessTokens      │
//! │  RegistrationManager · TokenVerifier · ClientRegistry           │
//! └───────────────────────────────┬─────────────────────────────────┘
//!                                 │
//!                                 ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Repository Layer (repository/)                 │
//! │  TokenStore (Redis/memory) · users · clients · registration     │
//! └───────────────────────────────┬─────────────────────────────────┘
//!                                 │
//!                                 ▼
//!                    PostgreSQL            Redis
//! ```
//!
//! ## API Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|-------------------------|-----------------------|------------------------------|
//! | GET | `/{auth}/health` | none | Service health status |
//! | GET | `/{auth}/authorize` | none | Render login form |
//! | POST | `/{auth}/authorize` | form credentials | Start the code flow |
//! | POST | `/{auth}/token` | client id + secret | Exchange code for tokens |
//! | GET | `/{auth}/bcrypt` | none (dev only) | bcrypt a string |
//! | GET | `/{account}/code` | bearer + scope `admin`| Mint a registration code |
//! | POST | `/{account}/register` | none | Register with a code |
//!
//! ## Authorization Flow
//!
//! ```text
//! Browser                Auth Service            Postgres         Redis
//!   │ GET /authorize          │                      │              │
//!   │────────────────────────▶│ register state       │              │
//!   │ login form              │                      │              │
//!   │◀────────────────────────│                      │              │
//!   │ POST /authorize         │                      │              │
//!   │ {email, password}       │ verify bcrypt        │              │
//!   │────────────────────────▶│─────────────────────▶│              │
//!   │                         │ store code bundle    │              │
//!   │                         │─────────────────────────────────────▶
//!   │ 302 cb?code=..&state=.. │                      │              │
//!   │◀────────────────────────│                      │              │
//!   │ POST /token             │ authorize scope      │              │
//!   │────────────────────────▶│─────────────────────▶│              │
//!   │                         │ store access/refresh │              │
//!   │                         │ bundle (capped)      │              │
//!   │                         │─────────────────────────────────────▶
//!   │ {access_token, ...}     │                      │              │
//!   │◀────────────────────────│                      │              │
//! ```
//!
//! ## Configuration
//!
//! Environment variables are loaded via [`shared::config::AppConfig`]; see
//! that module for the full surface (`JWT_SECRET`, `CODE_TTL`,
//! `RESTRICT_NUM_KEYS`, `IS_LOCAL_DEV`, ...).

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use shared::{
    auth::{JwtSigner, PasswordHasher},
    config::AppConfig,
    database,
    errors::ApiError,
    redis_client::RedisClient,
    tracing_config,
};
use std::sync::Arc;
use tracing::{debug, info};

mod api;
mod bootstrap;
mod domain;
mod repository;
mod service;

use api::login_page::LoginPage;
use api::{routes, AppState};
use repository::{
    ClientRepository, MemoryTokenStore, RedisTokenStore, RegistrationRepository, TokenStore,
    UserRepository,
};
use service::{
    AccessTokenGenerator, ClientRegistry, OAuthService, RegistrationManager, ScopeAuthority,
    StateStore, TokenLifetimes, TokenVerifier,
};

/// Interval between sweeps of abandoned authorization states.
const STATE_SWEEP_INTERVAL_SECS: u64 = 60;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // ─────────────────────────────────────────────────────────────────────
    // Step 1: Configuration and logging
    // ─────────────────────────────────────────────────────────────────────
    let config = AppConfig::from_env().expect("Failed to load configuration");
    tracing_config::init_tracing(&config.service_name, config.is_production());

    info!(
        service = %config.service_name,
        host = %config.server.host,
        port = %config.server.port,
        "Starting authorization service"
    );

    // ─────────────────────────────────────────────────────────────────────
    // Step 2: PostgreSQL pool and migrations
    // ─────────────────────────────────────────────────────────────────────
    let db_pool = database::create_pool(&config.database)
        .await
        .expect("Failed to create database pool");

    info!("Running database migrations");
    sqlx::migrate!()
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");

    // ─────────────────────────────────────────────────────────────────────
    // Step 3: Bootstrap seeding (before the server binds)
    // ─────────────────────────────────────────────────────────────────────
    if config.bootstrap.seed_defaults {
        bootstrap::seed_defaults(&db_pool)
            .await
            .expect("Failed to seed default data");
    }

    // ─────────────────────────────────────────────────────────────────────
    // Step 4: Token store (Redis-backed unless configured in-memory)
    // ─────────────────────────────────────────────────────────────────────
    let token_store: Arc<dyn TokenStore> = if config.token_store.in_memory {
        info!("Using in-memory token store");
        Arc::new(MemoryTokenStore::new())
    } else {
        let redis_client = RedisClient::new(&config.redis)
            .await
            .expect("Failed to connect to Redis");
        info!(
            max_num_keys = config.token_store.effective_max_keys(),
            "Using Redis token store"
        );
        Arc::new(RedisTokenStore::new(
            redis_client,
            config.token_store.effective_max_keys(),
        ))
    };

    // ─────────────────────────────────────────────────────────────────────
    // Step 5: Services
    // ─────────────────────────────────────────────────────────────────────
    let client_registry = Arc::new(
        ClientRegistry::initialize(&ClientRepository::new(db_pool.clone()))
            .await
            .expect("Failed to load API clients"),
    );

    let signer = Arc::new(JwtSigner::new(&config.jwt));
    let scope_authority = ScopeAuthority::new(
        ClientRepository::new(db_pool.clone()),
        UserRepository::new(db_pool.clone()),
    );

    let oauth = OAuthService::new(
        UserRepository::new(db_pool.clone()),
        client_registry,
        token_store.clone(),
        AccessTokenGenerator::new(signer.clone(), scope_authority),
        TokenLifetimes {
            code_ttl: config.oauth.code_ttl_seconds,
            access_ttl: config.oauth.access_ttl_seconds,
            refresh_ttl: config.oauth.refresh_ttl_seconds,
        },
    );

    let registration = RegistrationManager::new(
        RegistrationRepository::new(db_pool.clone()),
        PasswordHasher::new(),
        config.registration.max_retry,
        config.registration.user_role_id,
    );

    let verifier = TokenVerifier::new(signer, token_store.clone());
    let state_store = Arc::new(StateStore::new());

    // Sweep abandoned flows so the state registry stays bounded. Entries
    // are kept for twice the code TTL: past that no flow can complete.
    {
        let state_store = state_store.clone();
        let max_age = chrono::Duration::seconds(config.oauth.code_ttl_seconds * 2);
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(STATE_SWEEP_INTERVAL_SECS));
            loop {
                interval.tick().await;
                let removed = state_store.sweep_older_than(max_age);
                if removed > 0 {
                    debug!(removed, "Swept abandoned authorization states");
                }
            }
        });
    }

    let app_state = web::Data::new(AppState {
        oauth,
        state_store,
        registration,
        verifier,
        hasher: PasswordHasher::new(),
        login_page: LoginPage::new().expect("Failed to compile login template"),
        default_scope: config.oauth.default_scope.clone(),
        auth_base_path: format!("/{}", config.routes.auth_prefix),
    });

    // ─────────────────────────────────────────────────────────────────────
    // Step 6: HTTP server
    // ─────────────────────────────────────────────────────────────────────
    let server_host = config.server.host.clone();
    let server_port = config.server.port;
    let workers = config.server.workers;
    let cors_config = config.cors.clone();
    let auth_prefix = config.routes.auth_prefix.clone();
    let account_prefix = config.routes.account_prefix.clone();

    info!("Server listening on {}:{}", server_host, server_port);

    let mut server = HttpServer::new(move || {
        let methods = cors_config.method_list();
        let headers = cors_config.header_list();

        let mut cors = Cors::default()
            .allowed_methods(methods.iter().map(String::as_str).collect::<Vec<_>>())
            .allowed_headers(headers.iter().map(String::as_str).collect::<Vec<_>>())
            .expose_headers(["Content-Length"])
            .supports_credentials()
            .max_age(3600);
        for origin in cors_config.origin_list() {
            cors = cors.allowed_origin(&origin);
        }

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .app_data(app_state.clone())
            // undecodable JSON bodies get the invalid-body response code
            .app_data(web::JsonConfig::default().error_handler(|_err, _req| {
                ApiError::InvalidRequestBody.into()
            }))
            .configure(|cfg| routes::configure(cfg, &auth_prefix, &account_prefix))
    })
    .bind((server_host, server_port))?;

    if workers > 0 {
        server = server.workers(workers);
    }

    server.run().await
}
