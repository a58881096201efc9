//! In-memory store doubles shared by service tests.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::manifest::Manifest;
use crate::ports::{ByteStorePort, ManifestStorePort, StoreError};

#[derive(Default)]
pub struct MemoryManifestStore {
    pub manifest: Mutex<Option<Manifest>>,
}

impl MemoryManifestStore {
    pub fn with(manifest: Manifest) -> Self {
        Self {
            manifest: Mutex::new(Some(manifest)),
        }
    }

    pub fn current(&self) -> Option<Manifest> {
        self.manifest.lock().unwrap().clone()
    }
}

#[async_trait]
impl ManifestStorePort for MemoryManifestStore {
    async fn load(&self) -> Result<Option<Manifest>, StoreError> {
        Ok(self.current())
    }

    async fn save(&self, manifest: &Manifest) -> Result<(), StoreError> {
        *self.manifest.lock().unwrap() = Some(manifest.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.manifest.lock().unwrap() = None;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryByteStore {
    pub files: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryByteStore {
    pub fn insert(&self, relative_path: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(relative_path.to_string(), vec![1]);
    }

    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

#[async_trait]
impl ByteStorePort for MemoryByteStore {
    fn absolute_path(&self, relative_path: &str) -> PathBuf {
        PathBuf::from("/mem").join(relative_path)
    }

    async fn write(&self, data: &[u8], relative_path: &str) -> Result<(), StoreError> {
        self.files
            .lock()
            .unwrap()
            .insert(relative_path.to_string(), data.to_vec());
        Ok(())
    }

    async fn exists(&self, relative_path: &str) -> bool {
        self.files.lock().unwrap().contains_key(relative_path)
    }

    async fn remove(&self, relative_path: &str) -> Result<(), StoreError> {
        self.files.lock().unwrap().remove(relative_path);
        Ok(())
    }

    async fn remove_all(&self) -> Result<(), StoreError> {
        self.files.lock().unwrap().clear();
        Ok(())
    }
}
