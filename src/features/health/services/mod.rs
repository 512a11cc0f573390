mod health_service;

pub use health_service::{HealthService, PgHealthRepository};

#[cfg(test)]
pub use health_service::HealthRepository;
