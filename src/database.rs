//! PostgreSQL connection pool.
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::config::Postgres;

pub const DEFAULT_CREDENTIALS: &str = "postgres";
pub const DEFAULT_DATABASE_NAME: &str = "clinica";
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Custom db structure to pass to the service.
#[derive(Clone)]
pub struct Database {
    pub postgres: PgPool,
}

impl Database {
    /// Init database connections.
    pub async fn new(
        options: PgConnectOptions,
        pool: u32,
    ) -> Result<Self, sqlx::Error> {
        let hostname = options.get_host().to_owned();
        let db = options.get_database().unwrap_or_default().to_owned();
        let postgres = PgPoolOptions::new()
            .max_connections(pool)
            .connect_with(options)
            .await?;

        tracing::info!(%hostname, %db, "postgres connected");

        Ok(Self { postgres })
    }

    /// Init database connections from the `postgres` configuration entry.
    pub async fn from_config(config: &Postgres) -> Result<Self, sqlx::Error> {
        let database = Self::new(
            connect_options(config),
            config.pool_size.unwrap_or(DEFAULT_POOL_SIZE),
        )
        .await?;

        if config.migrate {
            sqlx::migrate!().run(&database.postgres).await?;
            tracing::info!("migrations applied");
        }

        Ok(database)
    }
}

/// Build connection options from the configuration.
///
/// Credentials are passed as-is and never spliced into a URL.
fn connect_options(config: &Postgres) -> PgConnectOptions {
    let (host, port) = split_address(&config.address);

    let options = PgConnectOptions::new()
        .host(host)
        .username(config.username.as_deref().unwrap_or(DEFAULT_CREDENTIALS))
        .password(config.password.as_deref().unwrap_or(DEFAULT_CREDENTIALS))
        .database(config.database.as_deref().unwrap_or(DEFAULT_DATABASE_NAME));

    match port {
        Some(port) => options.port(port),
        None => options,
    }
}

/// Split `host[:port]`. Bracketed IPv6 literals are accepted.
fn split_address(address: &str) -> (&str, Option<u16>) {
    if let Some(rest) = address.strip_prefix('[') {
        return match rest.split_once(']') {
            Some((host, tail)) => {
                (host, tail.strip_prefix(':').and_then(|port| port.parse().ok()))
            },
            None => (address, None),
        };
    }

    match address.split_once(':') {
        Some((host, port)) => match port.parse() {
            Ok(port) => (host, Some(port)),
            Err(_) => (address, None),
        },
        None => (address, None),
    }
}
