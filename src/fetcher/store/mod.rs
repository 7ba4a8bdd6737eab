mod memory;
mod sqlite;

pub use memory::MemoryScriptStore;
pub use sqlite::SqliteScriptStore;
