//! Embedded project store backed by redb.
//!
//! One table maps project id to the JSON-encoded record. Records are stored
//! as JSON rather than a binary codec so the on-disk payload matches the
//! `.ftc` exchange format byte for byte.

use crate::error::StoreError;
use crate::migrate::{self, SCHEMA_VERSION};
use ftc_core::Project;
use log::warn;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;

const PROJECTS: TableDefinition<&str, &[u8]> = TableDefinition::new("projects");
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");
const SCHEMA_KEY: &str = "schema_version";

/// Persistent project database.
///
/// All methods take `&self`; redb serializes writers internally, so the
/// store can be shared behind an `Arc` between the editor and the autosave
/// worker without extra locking.
pub struct ProjectStore {
    db: Database,
}

impl ProjectStore {
    /// Open or create the store at `path`, upgrading any stale records.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;
        let store = Self { db };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        let txn = self.db.begin_write()?;
        {
            let mut meta = txn.open_table(META)?;
            let version = meta.get(SCHEMA_KEY)?.map(|v| v.value()).unwrap_or(0);
            if version < SCHEMA_VERSION {
                let mut table = txn.open_table(PROJECTS)?;
                let mut upgraded = Vec::new();
                for entry in table.iter()? {
                    let (key, value) = entry?;
                    let mut record: serde_json::Value = serde_json::from_slice(value.value())?;
                    if migrate::upgrade_record(&mut record) {
                        upgraded.push((key.value().to_string(), serde_json::to_vec(&record)?));
                    }
                }
                for (key, bytes) in upgraded {
                    table.insert(key.as_str(), bytes.as_slice())?;
                }
                meta.insert(SCHEMA_KEY, SCHEMA_VERSION)?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    /// Insert or replace a project record.
    pub fn put(&self, project: &Project) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(project)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PROJECTS)?;
            table.insert(project.id.as_str(), bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Option<Project>, StoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(PROJECTS)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All projects, newest first. Undecodable records are skipped with a
    /// warning rather than failing the whole listing.
    pub fn list(&self) -> Result<Vec<Project>, StoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(PROJECTS)?;
        let mut projects = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            match serde_json::from_slice::<Project>(value.value()) {
                Ok(project) => projects.push(project),
                Err(e) => warn!("skipping undecodable project record {}: {e}", key.value()),
            }
        }
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    /// Read-modify-write a record inside a single write transaction.
    /// Returns the updated project.
    pub fn update_with<F>(&self, id: &str, f: F) -> Result<Project, StoreError>
    where
        F: FnOnce(&mut Project),
    {
        let txn = self.db.begin_write()?;
        let updated = {
            let mut table = txn.open_table(PROJECTS)?;
            let mut project: Project = {
                let guard = table
                    .get(id)?
                    .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
                serde_json::from_slice(guard.value())?
            };
            f(&mut project);
            let bytes = serde_json::to_vec(&project)?;
            table.insert(id, bytes.as_slice())?;
            project
        };
        txn.commit()?;
        Ok(updated)
    }

    /// Remove a record. Returns whether it existed.
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let txn = self.db.begin_write()?;
        let existed = {
            let mut table = txn.open_table(PROJECTS)?;
            table.remove(id)?.is_some()
        };
        txn.commit()?;
        Ok(existed)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(PROJECTS)?;
        let mut n = 0;
        for entry in table.iter()? {
            entry?;
            n += 1;
        }
        Ok(n)
    }

    #[cfg(test)]
    pub(crate) fn put_raw(&self, id: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PROJECTS)?;
            table.insert(id, bytes)?;
            let mut meta = txn.open_table(META)?;
            meta.insert(SCHEMA_KEY, 1u64)?;
        }
        txn.commit()?;
        Ok(())
    }
}
