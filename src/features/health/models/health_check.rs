use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// One successful health probe, appended to `health_checks`
#[derive(Debug, Clone, FromRow)]
pub struct HealthCheck {
    pub check_id: i32,
    pub datetime: DateTime<Utc>,
}
