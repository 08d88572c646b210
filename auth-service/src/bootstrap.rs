//! # Bootstrap Seeding
//!
//! Explicit seeding step for development and first-boot environments,
//! executed in `main` before the server binds. Runtime code never branches
//! on the environment: by the time a request is served, the defaults either
//! exist or seeding was skipped entirely.
//!
//! Seeds, idempotently (`ON CONFLICT DO NOTHING` throughout):
//!
//! | Data | Content |
//! |------|---------|
//! | API clients | a general client (`profile search`) and an admin client (`admin`) |
//! | Roles | `1` admin (`admin`), `2` regular users (`profile`, `search`) |
//! | Users | up to two accounts from `DEFAULT_USER_{1,2}_EMAIL`/`_PASSWORD`, bound to both roles |
//!
//! Client credentials and domain come from `DEFAULT_CLIENT_*` /
//! `DEFAULT_ADMIN_CLIENT_*` with development fallbacks. User passwords are
//! bcrypt-hashed before insert; users are only seeded when both email and
//! password are present.

use shared::auth::PasswordHasher;
use shared::errors::ApiError;
use sqlx::PgPool;
use tracing::info;

const ADMIN_ROLE_ID: i32 = 1;
const REGULAR_ROLE_ID: i32 = 2;

/// Fixed ids so reseeding is idempotent across restarts.
const DEFAULT_USER_IDS: [&str; 2] = [
    "4c9f1de2a07b4b6bbd3ff0d51e82c7aa",
    "9a31e6c05f8e4d20a46bb19c2d74e08b",
];

struct DefaultClient {
    id: String,
    secret: String,
    domain: String,
    description: &'static str,
    scopes: &'static str,
}

fn env_or(key: &str, fallback: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| fallback.to_string())
}

fn default_clients() -> Vec<DefaultClient> {
    vec![
        DefaultClient {
            id: env_or("DEFAULT_CLIENT_ID", "3f82d51c6a9e4b0f8a27c41d95e6b370"),
            secret: env_or("DEFAULT_CLIENT_SECRET", "dev_secret"),
            domain: env_or("DEFAULT_CLIENT_DOMAIN", "http://localhost:3000"),
            description: "Default development client",
            scopes: "profile search",
        },
        DefaultClient {
            id: env_or("DEFAULT_ADMIN_CLIENT_ID", "b7e049a3c2d84f619538ce0d1a72f64b"),
            secret: env_or("DEFAULT_ADMIN_CLIENT_SECRET", "dev_admin_secret"),
            domain: env_or("DEFAULT_CLIENT_DOMAIN", "http://localhost:3000"),
            description: "Default admin client",
            scopes: "admin",
        },
    ]
}

/// Seeds the default clients, roles and users.
pub async fn seed_defaults(pool: &PgPool) -> Result<(), ApiError> {
    info!("Seeding default clients, roles and users");

    seed_clients(pool).await?;
    seed_roles(pool).await?;
    seed_users(pool).await?;

    info!("Bootstrap seeding complete");
    Ok(())
}

async fn seed_clients(pool: &PgPool) -> Result<(), ApiError> {
    for client in default_clients() {
        sqlx::query(
            r#"
            INSERT INTO api_clients (id, secret, domain, is_public, description)
            VALUES ($1, $2, $3, TRUE, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&client.id)
        .bind(&client.secret)
        .bind(&client.domain)
        .bind(client.description)
        .execute(pool)
        .await?;

        for scope in client.scopes.split(' ') {
            sqlx::query(
                r#"
                INSERT INTO api_client_scopes (api_client_id, scope)
                VALUES ($1, $2)
                ON CONFLICT (api_client_id, scope) DO NOTHING
                "#,
            )
            .bind(&client.id)
            .bind(scope)
            .execute(pool)
            .await?;
        }
    }

    Ok(())
}

async fn seed_roles(pool: &PgPool) -> Result<(), ApiError> {
    let roles: [(i32, &str, &[&str]); 2] = [
        (ADMIN_ROLE_ID, "admin", &["admin"]),
        (REGULAR_ROLE_ID, "regular users", &["profile", "search"]),
    ];

    for (id, description, scopes) in roles {
        sqlx::query(
            r#"
            INSERT INTO roles (id, description)
            VALUES ($1, $2)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(description)
        .execute(pool)
        .await?;

        for scope in scopes {
            sqlx::query(
                r#"
                INSERT INTO role_scopes (role_id, scope)
                VALUES ($1, $2)
                ON CONFLICT (role_id, scope) DO NOTHING
                "#,
            )
            .bind(id)
            .bind(scope)
            .execute(pool)
            .await?;
        }
    }

    Ok(())
}

async fn seed_users(pool: &PgPool) -> Result<(), ApiError> {
    let hasher = PasswordHasher::new();

    for (i, user_id) in DEFAULT_USER_IDS.iter().enumerate() {
        let email = std::env::var(format!("DEFAULT_USER_{}_EMAIL", i + 1)).ok();
        let password = std::env::var(format!("DEFAULT_USER_{}_PASSWORD", i + 1)).ok();

        let (Some(email), Some(password)) = (email, password) else {
            continue;
        };

        let digest = hasher.hash(&password)?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password, is_active)
            VALUES ($1, $2, $3, TRUE)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(&email)
        .bind(&digest)
        .execute(pool)
        .await?;

        for role_id in [ADMIN_ROLE_ID, REGULAR_ROLE_ID] {
            sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id, role_id) DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(role_id)
            .execute(pool)
            .await?;
        }

        info!(email = %email, "Seeded default user");
    }

    Ok(())
}
