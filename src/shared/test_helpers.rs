//! In-memory stand-ins for the database and object storage, used by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;
use uuid::Uuid;

use crate::core::app::{build_router, AppServices, RequestLimits};
use crate::core::config::MetricsConfig;
use crate::core::error::{AppError, Result};
use crate::core::metrics::Metrics;
use crate::features::files::models::{File, NewFile};
use crate::features::files::services::FileRepository;
use crate::features::files::FileService;
use crate::features::health::models::HealthCheck;
use crate::features::health::services::HealthRepository;
use crate::features::health::HealthService;
use crate::modules::storage::ObjectStorage;

const MEMORY_LOCATION_PREFIX: &str = "memory://test-bucket/";

pub fn test_metrics() -> Arc<Metrics> {
    Arc::new(Metrics::new(&MetricsConfig {
        enabled: true,
        namespace: "Test/Metrics".to_string(),
        app_name: "Test".to_string(),
    }))
}

#[derive(Default)]
pub struct InMemoryFileRepository {
    files: Mutex<HashMap<Uuid, File>>,
    fail_writes: AtomicBool,
}

impl InMemoryFileRepository {
    /// Make every subsequent insert fail with a database error
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn get(&self, id: Uuid) -> Option<File> {
        self.files.lock().unwrap().get(&id).cloned()
    }

    pub fn count(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

#[async_trait]
impl FileRepository for InMemoryFileRepository {
    async fn insert(&self, file: NewFile) -> Result<File> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }

        let now = Utc::now();
        let record = File {
            id: file.id,
            file_name: file.file_name,
            s3_path: file.s3_path,
            file_type: file.file_type,
            file_size: file.file_size,
            created_at: now,
            updated_at: now,
        };
        self.files.lock().unwrap().insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<File>> {
        Ok(self.get(id))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.files.lock().unwrap().remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_requests: AtomicBool,
}

impl InMemoryStorage {
    /// Make every subsequent put/delete fail
    pub fn fail_requests(&self) {
        self.fail_requests.store(true, Ordering::SeqCst);
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStorage for InMemoryStorage {
    async fn put_object(
        &self,
        key: &str,
        data: &[u8],
        _content_type: &str,
    ) -> std::result::Result<String, AppError> {
        if self.fail_requests.load(Ordering::SeqCst) {
            return Err(AppError::Storage("storage unavailable".to_string()));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), data.to_vec());
        Ok(format!("{}{}", MEMORY_LOCATION_PREFIX, key))
    }

    async fn delete_object(&self, key: &str) -> std::result::Result<(), AppError> {
        if self.fail_requests.load(Ordering::SeqCst) {
            return Err(AppError::Storage("storage unavailable".to_string()));
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    fn key_from_location(&self, location: &str) -> Option<String> {
        location
            .strip_prefix(MEMORY_LOCATION_PREFIX)
            .map(str::to_string)
    }
}

/// Health repository whose database can be switched off
pub struct FakeHealthRepository {
    up: AtomicBool,
    next_id: AtomicI32,
}

impl Default for FakeHealthRepository {
    fn default() -> Self {
        Self {
            up: AtomicBool::new(true),
            next_id: AtomicI32::new(1),
        }
    }
}

impl FakeHealthRepository {
    pub fn set_up(&self, up: bool) {
        self.up.store(up, Ordering::SeqCst);
    }

    /// Number of health-check rows recorded so far
    pub fn recorded(&self) -> i32 {
        self.next_id.load(Ordering::SeqCst) - 1
    }

    fn check_up(&self) -> Result<()> {
        if self.up.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::Database(sqlx::Error::PoolTimedOut))
        }
    }
}

#[async_trait]
impl HealthRepository for FakeHealthRepository {
    async fn ping(&self) -> Result<()> {
        self.check_up()
    }

    async fn record_check(&self) -> Result<HealthCheck> {
        self.check_up()?;
        Ok(HealthCheck {
            check_id: self.next_id.fetch_add(1, Ordering::SeqCst),
            datetime: Utc::now(),
        })
    }
}

/// Full application router wired to in-memory collaborators
pub struct TestApp {
    pub router: Router,
    pub files: Arc<InMemoryFileRepository>,
    pub storage: Arc<InMemoryStorage>,
    pub health: Arc<FakeHealthRepository>,
    pub metrics: Arc<Metrics>,
}

/// Upload limit used by `test_app`
pub const TEST_MAX_UPLOAD_SIZE: usize = 1024 * 1024;

pub fn test_app() -> TestApp {
    let files = Arc::new(InMemoryFileRepository::default());
    let storage = Arc::new(InMemoryStorage::default());
    let health = Arc::new(FakeHealthRepository::default());
    let metrics = test_metrics();

    let router = build_router(AppServices {
        file_service: Arc::new(FileService::new(
            files.clone(),
            storage.clone(),
            metrics.clone(),
            "uploads",
            TEST_MAX_UPLOAD_SIZE,
        )),
        health_service: Arc::new(HealthService::new(health.clone(), metrics.clone())),
        metrics: metrics.clone(),
        limits: RequestLimits {
            max_upload_size: TEST_MAX_UPLOAD_SIZE,
            max_request_body_size: 64 * 1024,
        },
    });

    TestApp {
        router,
        files,
        storage,
        health,
        metrics,
    }
}
