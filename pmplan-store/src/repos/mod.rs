//! Repository modules for database operations

pub mod entries;

pub use entries::EntriesRepo;
