pub mod config_service;
pub mod http;
pub mod memory_credential_service;
pub mod memory_document_store;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::http::{HttpCredentialService, HttpDocumentStore, TmdbCatalog, build_client};
pub use crate::memory_credential_service::InMemoryCredentialService;
pub use crate::memory_document_store::InMemoryDocumentStore;
pub use crate::paths::ReelsyncPaths;
pub use crate::storage::{FileKeyValueStore, MemoryKeyValueStore};
