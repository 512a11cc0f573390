use crate::core::config::DatabaseConfig;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    Connection, Executor, PgConnection, PgPool,
};
use std::time::Duration;
use tracing::{info, warn};

/// SQLSTATE `invalid_catalog_name`: the target database does not exist
const MISSING_DATABASE: &str = "3D000";
/// SQLSTATE `duplicate_database`: someone else created it first
const DUPLICATE_DATABASE: &str = "42P04";

pub fn connect_options(config: &DatabaseConfig, database: &str) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(database)
}

pub async fn create_pool(config: &DatabaseConfig, database: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect_with(connect_options(config, database))
        .await
}

/// Connect to the configured database, creating it first if the server reports it missing.
///
/// Sequence:
/// 1. Connect to `config.name`.
/// 2. On `3D000` connect to the maintenance database and issue `CREATE DATABASE`.
///    A `42P04` from a concurrent creator counts as success.
/// 3. Reconnect to `config.name`.
///
/// Any other error is returned as-is; nothing is retried.
pub async fn connect_with_database_creation(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    match create_pool(config, &config.name).await {
        Ok(pool) => {
            info!("Connection to database '{}' established", config.name);
            Ok(pool)
        }
        Err(e) if is_missing_database(error_code(&e).as_deref()) => {
            warn!("Database '{}' does not exist, creating it", config.name);
            create_database(config).await?;

            let pool = create_pool(config, &config.name).await?;
            info!("Reconnected to new database '{}'", config.name);
            Ok(pool)
        }
        Err(e) => Err(e),
    }
}

async fn create_database(config: &DatabaseConfig) -> Result<(), sqlx::Error> {
    let mut conn =
        PgConnection::connect_with(&connect_options(config, &config.maintenance_name)).await?;

    let statement = format!("CREATE DATABASE {}", quote_identifier(&config.name));
    let result = conn.execute(statement.as_str()).await;
    let _ = conn.close().await;

    match result {
        Ok(_) => {
            info!("Database '{}' created", config.name);
            Ok(())
        }
        Err(e) if is_duplicate_database(error_code(&e).as_deref()) => {
            info!("Database '{}' was created concurrently", config.name);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Liveness probe for the pool
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|_| ())
}

/// SQLSTATE code of a server-side error, if any
fn error_code(e: &sqlx::Error) -> Option<String> {
    match e {
        sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
        _ => None,
    }
}

/// Connecting failed because the target database has not been created yet
fn is_missing_database(code: Option<&str>) -> bool {
    code == Some(MISSING_DATABASE)
}

/// `CREATE DATABASE` lost a race with another instance
fn is_duplicate_database(code: Option<&str>) -> bool {
    code == Some(DUPLICATE_DATABASE)
}

/// Quote a Postgres identifier, doubling embedded quotes
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
