//! Host adapters implementing [`HostPort`](crate::infrastructure::ports::HostPort).
//!
//! - `InMemoryHost`: metadata held in memory with scriptable availability
//!   and save capabilities (tests and embedding)
//! - `JsonFileHost`: one JSON file per conversation under a data directory

mod in_memory;
mod json_file;

pub use in_memory::InMemoryHost;
pub use json_file::JsonFileHost;
