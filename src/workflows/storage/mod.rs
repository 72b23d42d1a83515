//! `JobStore` implementations: an in-process table and a write-through JSON file.

mod json_file;
mod memory;
mod table;

pub use json_file::JsonFileJobStore;
pub use memory::MemoryJobStore;
