//! Filesystem and HTTP adapters for the pvsizer ports.

pub mod config_service;
pub mod file_session_store;
pub mod http;
pub mod http_project_repository;
pub mod memory_session_store;
pub mod paths;

pub use crate::config_service::ConfigService;
pub use crate::file_session_store::FileLocalSessionStore;
pub use crate::http_project_repository::HttpProjectRepository;
pub use crate::memory_session_store::MemoryLocalSessionStore;
pub use crate::paths::SizerPaths;
