use std::path::PathBuf;

use anyhow::Result;

use crate::infra::sqlite::queries::{delete_preference, load_preference, upsert_preference};
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::preference_store::{PreferenceStore, StoreError};

pub struct SqlitePreferenceStore {
    pub db_path: PathBuf,
}

impl SqlitePreferenceStore {
    pub fn open(db_path: PathBuf) -> Result<Self> {
        init_db(&db_path)?;
        Ok(Self { db_path })
    }
}

impl PreferenceStore for SqlitePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        load_preference(&self.db_path, key).map_err(unavailable)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        upsert_preference(&self.db_path, key, value).map_err(unavailable)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        delete_preference(&self.db_path, key).map_err(unavailable)
    }
}

fn unavailable(err: anyhow::Error) -> StoreError {
    StoreError::Unavailable(format!("{err:#}"))
}
