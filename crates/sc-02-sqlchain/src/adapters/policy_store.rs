use crate::domain::{ProjectConfig, ProjectConfigType};
use crate::ports::PolicyStore;
use parking_lot::RwLock;
use shared_types::DatabaseId;
use std::collections::HashMap;

type PolicyKey = (DatabaseId, ProjectConfigType, String);

/// Policy records held in memory, written by whoever provisions projects.
#[derive(Debug, Default)]
pub struct InMemoryPolicyStore {
    records: RwLock<HashMap<PolicyKey, ProjectConfig>>,
}

impl InMemoryPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for `(database_id, record.kind, record.key)`.
    pub fn put(&self, database_id: DatabaseId, record: ProjectConfig) {
        let key = (database_id, record.kind, record.key.clone());
        self.records.write().insert(key, record);
    }

    pub fn remove(&self, database_id: &DatabaseId, kind: ProjectConfigType, key: &str) -> bool {
        self.records
            .write()
            .remove(&(database_id.clone(), kind, key.to_string()))
            .is_some()
    }
}

impl PolicyStore for InMemoryPolicyStore {
    fn get(
        &self,
        database_id: &DatabaseId,
        kind: ProjectConfigType,
        key: &str,
    ) -> Option<ProjectConfig> {
        self.records
            .read()
            .get(&(database_id.clone(), kind, key.to_string()))
            .cloned()
    }
}
