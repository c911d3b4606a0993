//! Storage backends for the Detour mapping store.
//!
//! The store is volatile by design: records live for the lifetime of
//! the process and expiry is enforced lazily by the lookups that find
//! expired entries.

pub mod memory;

pub use memory::InMemoryRepository;
