use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    /// Upper bound for multipart upload bodies
    pub max_upload_size: usize,
    /// Upper bound for bodies buffered by the request validation middleware
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    /// Database used to issue `CREATE DATABASE` when `name` does not exist yet
    pub maintenance_name: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// S3 (or S3-compatible) storage configuration for uploaded files
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket name for storing files
    pub bucket: String,
    /// AWS region
    pub region: String,
    /// Custom endpoint for S3-compatible stores (MinIO, LocalStack). Uses path-style URLs.
    pub endpoint: Option<String>,
    /// Static credentials; when absent the standard AWS credential chain is used
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// Key prefix for uploaded objects (e.g., "uploads")
    pub key_prefix: String,
}

#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub namespace: String,
    pub app_name: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub to_file: bool,
    pub dir: PathBuf,
    pub file_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            metrics: MetricsConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024; // 10MB
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 1024 * 1024; // 1MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let environment = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        let max_upload_size = env::var("MAX_UPLOAD_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_UPLOAD_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_UPLOAD_SIZE must be a valid number".to_string())?;

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            environment,
            max_upload_size,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_PORT: u16 = 5432;
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 10;
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());

        let port = env::var("DB_PORT")
            .unwrap_or_else(|_| Self::DEFAULT_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| "DB_PORT must be a valid port number".to_string())?;

        let user = env::var("DB_USER").unwrap_or_else(|_| "postgres".to_string());
        let password = env::var("DB_PASS").unwrap_or_default();

        let name = env::var("DB_NAME")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "DB_NAME environment variable is required".to_string())?;

        let maintenance_name =
            env::var("DB_MAINTENANCE_NAME").unwrap_or_else(|_| "postgres".to_string());

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            user,
            password,
            name,
            maintenance_name,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, String> {
        let bucket = env::var("S3_BUCKET_NAME")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "S3_BUCKET_NAME environment variable is required".to_string())?;

        let region = env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        // Only use endpoint and credentials if they are non-empty
        let endpoint = env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty());
        let access_key = env::var("AWS_ACCESS_KEY_ID").ok().filter(|s| !s.is_empty());
        let secret_key = env::var("AWS_SECRET_ACCESS_KEY")
            .ok()
            .filter(|s| !s.is_empty());

        let key_prefix = env::var("S3_KEY_PREFIX")
            .unwrap_or_else(|_| "uploads".to_string())
            .trim_matches('/')
            .to_string();

        Ok(Self {
            bucket,
            region,
            endpoint,
            access_key,
            secret_key,
            key_prefix,
        })
    }
}

impl MetricsConfig {
    pub fn from_env() -> Result<Self, String> {
        let enabled = parse_bool("METRICS_ENABLED", true)?;
        let namespace =
            env::var("METRICS_NAMESPACE").unwrap_or_else(|_| "FileService/Metrics".to_string());
        let app_name = env::var("METRICS_APP_NAME").unwrap_or_else(|_| "FileService".to_string());

        Ok(Self {
            enabled,
            namespace,
            app_name,
        })
    }
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self, String> {
        let to_file = parse_bool("LOG_TO_FILE", true)?;
        let dir = PathBuf::from(env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()));
        let file_name = env::var("LOG_FILE").unwrap_or_else(|_| "app.log".to_string());

        Ok(Self {
            to_file,
            dir,
            file_name,
        })
    }
}

fn parse_bool(key: &str, default: bool) -> Result<bool, String> {
    match env::var(key) {
        Ok(value) => parse_bool_value(&value).ok_or_else(|| format!("{} must be true or false", key)),
        Err(_) => Ok(default),
    }
}

fn parse_bool_value(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_value() {
        assert_eq!(parse_bool_value("true"), Some(true));
        assert_eq!(parse_bool_value(" YES "), Some(true));
        assert_eq!(parse_bool_value("0"), Some(false));
        assert_eq!(parse_bool_value("off"), Some(false));
        assert_eq!(parse_bool_value("maybe"), None);
    }

    #[test]
    fn test_server_address() {
        let app = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: "test".to_string(),
            max_upload_size: 1024,
            max_request_body_size: 1024,
        };
        assert_eq!(app.server_address(), "127.0.0.1:8080");
    }
}
