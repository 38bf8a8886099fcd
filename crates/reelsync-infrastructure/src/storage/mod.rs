//! Local durable storage.

mod atomic_toml;
mod file_key_value;
mod memory_key_value;

pub use atomic_toml::{AtomicTomlError, AtomicTomlFile};
pub use file_key_value::FileKeyValueStore;
pub use memory_key_value::MemoryKeyValueStore;
