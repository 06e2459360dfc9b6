use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use anyhow::Context as _;
use tokio::fs;

use crate::domain::repository::FileStorage;
use crate::error::RecordsServiceError;

/// Stores uploads as flat files under one directory.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create the directory if needed.
    pub async fn new(base_path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)
            .await
            .with_context(|| format!("create upload dir {}", base_path.display()))?;
        Ok(Self { base_path })
    }

    /// Keys are generated server-side; anything other than a plain file name is refused.
    fn path_for(&self, key: &str) -> Result<PathBuf, RecordsServiceError> {
        let mut components = Path::new(key).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.base_path.join(key)),
            _ => Err(anyhow::anyhow!("invalid storage key {key:?}").into()),
        }
    }
}

impl FileStorage for LocalStorage {
    async fn save(&self, key: &str, bytes: &[u8]) -> Result<(), RecordsServiceError> {
        let path = self.path_for(key)?;
        fs::write(&path, bytes)
            .await
            .with_context(|| format!("write upload {key}"))?;
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, RecordsServiceError> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(anyhow::Error::new(e).context(format!("read upload {key}")).into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), RecordsServiceError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e).context(format!("delete upload {key}")).into()),
        }
    }
}
