mod file_repository;
mod file_service;

pub use file_repository::{FileRepository, PgFileRepository};
pub use file_service::FileService;
