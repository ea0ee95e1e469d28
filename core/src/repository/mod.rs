pub mod file;
pub mod memory;
pub mod persistence;
pub mod traits;

// Re-export
pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::KeyValueStore;
