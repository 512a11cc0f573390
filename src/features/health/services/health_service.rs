use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::core::database;
use crate::core::error::{AppError, Result};
use crate::core::metrics::{MetricUnit, Metrics};
use crate::features::health::models::HealthCheck;

/// Database access needed by the health probe
#[async_trait]
pub trait HealthRepository: Send + Sync {
    async fn ping(&self) -> Result<()>;

    async fn record_check(&self) -> Result<HealthCheck>;
}

pub struct PgHealthRepository {
    pool: PgPool,
}

impl PgHealthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthRepository for PgHealthRepository {
    async fn ping(&self) -> Result<()> {
        database::ping(&self.pool).await?;
        Ok(())
    }

    async fn record_check(&self) -> Result<HealthCheck> {
        let check = sqlx::query_as::<_, HealthCheck>(
            r#"
            INSERT INTO health_checks DEFAULT VALUES
            RETURNING check_id, datetime
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(check)
    }
}

pub struct HealthService {
    repository: Arc<dyn HealthRepository>,
    metrics: Arc<Metrics>,
}

impl HealthService {
    pub fn new(repository: Arc<dyn HealthRepository>, metrics: Arc<Metrics>) -> Self {
        Self {
            repository,
            metrics,
        }
    }

    /// Ping the database and append a health-check row
    ///
    /// Any failure is reported as `ServiceUnavailable`.
    pub async fn check(&self) -> Result<()> {
        self.ensure_reachable().await?;

        let start = Instant::now();
        let check = self.repository.record_check().await.map_err(|e| {
            warn!("Failed to record health check: {}", e);
            self.metrics
                .send("HealthCheck.Failures", 1.0, MetricUnit::Count);
            AppError::ServiceUnavailable("Database unavailable".to_string())
        })?;
        self.metrics.track_db("insert", "health_checks", start);

        debug!(
            "Health check recorded: check_id={}, datetime={}",
            check.check_id, check.datetime
        );
        Ok(())
    }

    /// Ping the database without recording anything
    pub async fn ensure_reachable(&self) -> Result<()> {
        self.repository.ping().await.map_err(|e| {
            warn!("Health check failed, database may be down: {}", e);
            self.metrics
                .send("HealthCheck.Failures", 1.0, MetricUnit::Count);
            AppError::ServiceUnavailable("Database unavailable".to_string())
        })
    }
}
