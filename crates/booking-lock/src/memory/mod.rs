//! In-process lock backend.

pub mod store;

pub use store::MemoryLockBackend;
