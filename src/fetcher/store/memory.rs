use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::fetcher::{Result, traits::ScriptStore, types::ExtractionScript};

/// In-memory script store.
///
/// Backs tests and mock-backed runs; the production store is
/// `SqliteScriptStore`.
#[derive(Default)]
pub struct MemoryScriptStore {
    scripts: RwLock<HashMap<i64, ExtractionScript>>,
}

impl MemoryScriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scripts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.read().is_empty()
    }
}

#[async_trait]
impl ScriptStore for MemoryScriptStore {
    async fn put(&self, script: &ExtractionScript) -> Result<()> {
        self.scripts
            .write()
            .insert(script.work_id, script.clone());
        Ok(())
    }

    async fn get(&self, work_id: i64) -> Result<Option<ExtractionScript>> {
        Ok(self.scripts.read().get(&work_id).cloned())
    }
}
