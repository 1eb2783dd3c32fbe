use crate::render::CaptureBundle;
use crate::storage::traits::{validate_key_path, ArtifactSink, SinkError, SinkResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};

/// Artifact sink that keeps captures in memory
///
/// Useful for dry runs and for checking which routes a crawl captured.
/// Keys listed with [`MemorySink::fail_on`] are refused, which makes sink
/// failures easy to reproduce.
#[derive(Debug, Default)]
pub struct MemorySink {
    folders: BTreeSet<String>,
    stored: BTreeMap<String, CaptureBundle>,
    store_calls: Vec<String>,
    failing: BTreeSet<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `store` fail for the given key path
    pub fn fail_on(mut self, key_path: impl Into<String>) -> Self {
        self.failing.insert(key_path.into());
        self
    }

    pub fn get(&self, key_path: &str) -> Option<&CaptureBundle> {
        self.stored.get(key_path)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.stored.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.stored.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stored.is_empty()
    }

    pub fn has_folder(&self, key_path: &str) -> bool {
        self.folders.contains(key_path)
    }

    /// Every key `store` was called with, in call order, failures included
    pub fn store_calls(&self) -> &[String] {
        &self.store_calls
    }
}

#[async_trait]
impl ArtifactSink for MemorySink {
    async fn ensure_path(&mut self, key_path: &str) -> SinkResult<()> {
        validate_key_path(key_path)?;
        self.folders.insert(key_path.to_string());
        Ok(())
    }

    async fn store(&mut self, key_path: &str, bundle: &CaptureBundle) -> SinkResult<()> {
        validate_key_path(key_path)?;
        self.store_calls.push(key_path.to_string());

        if self.failing.contains(key_path) {
            return Err(SinkError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("refusing to store {}", key_path),
            )));
        }

        self.stored.insert(key_path.to_string(), bundle.clone());
        Ok(())
    }
}
