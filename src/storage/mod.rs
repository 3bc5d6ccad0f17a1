//! Table and object storage collaborators

pub mod memory;
pub mod rest;
pub mod traits;

pub use memory::{MemoryObjectStore, MemoryTableStore};
pub use rest::{RestObjectStore, RestTableStore};
pub use traits::{ObjectStore, Record, Table, TableStore};
