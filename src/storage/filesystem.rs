use crate::render::CaptureBundle;
use crate::storage::traits::{validate_key_path, ArtifactSink, SinkResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Artifact sink that writes captures below a root directory
///
/// For a key path `example/x.test-about` the sink writes, depending on what
/// the bundle holds:
/// - `<root>/example/x.test-about.png` (screenshot)
/// - `<root>/example/x.test-about.html` (page HTML)
/// - `<root>/example/x.test-about.media.txt` (one media URL per line)
#[derive(Debug, Clone)]
pub struct FsSink {
    root: PathBuf,
}

impl FsSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key_path: &str) -> PathBuf {
        key_path
            .split('/')
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }

    fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
        let mut name = base.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }
}

#[async_trait]
impl ArtifactSink for FsSink {
    async fn ensure_path(&mut self, key_path: &str) -> SinkResult<()> {
        validate_key_path(key_path)?;
        tokio::fs::create_dir_all(self.resolve(key_path)).await?;
        Ok(())
    }

    async fn store(&mut self, key_path: &str, bundle: &CaptureBundle) -> SinkResult<()> {
        validate_key_path(key_path)?;

        let base = self.resolve(key_path);
        if let Some(parent) = base.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        if let Some(image) = &bundle.screenshot {
            tokio::fs::write(Self::with_suffix(&base, ".png"), image).await?;
        }

        if let Some(html) = &bundle.html {
            tokio::fs::write(Self::with_suffix(&base, ".html"), html).await?;
        }

        if !bundle.media.is_empty() {
            let mut listing = bundle.media.join("\n");
            listing.push('\n');
            tokio::fs::write(Self::with_suffix(&base, ".media.txt"), listing).await?;
        }

        tracing::trace!("Stored captures for {} under {}", key_path, self.root.display());
        Ok(())
    }
}
