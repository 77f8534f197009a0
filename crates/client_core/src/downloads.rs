//! Local materialization of generated artifacts.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use tracing::info;

use crate::error::ClientError;

pub const GENERATED_ARTIFACT_NAME: &str = "generated_macro.xlsx";
pub const DOWNLOAD_ARTIFACT_NAME: &str = "macro.xlsx";

#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Stores `bytes` under `filename` and returns where it ended up.
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, ClientError>;
}

pub struct DirectoryArtifactSink {
    dir: PathBuf,
}

impl DirectoryArtifactSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ArtifactSink for DirectoryArtifactSink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, ClientError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| ClientError::Io {
                path: self.dir.clone(),
                source,
            })?;

        // Claiming the name with `create_new` keeps concurrent saves apart.
        let mut attempt = 0;
        let (path, mut file) = loop {
            let candidate = self.dir.join(numbered_filename(filename, attempt));
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
                .await
            {
                Ok(file) => break (candidate, file),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(source) => {
                    return Err(ClientError::Io {
                        path: candidate,
                        source,
                    })
                }
            }
        };

        let written = async {
            file.write_all(bytes).await?;
            file.flush().await
        }
        .await;
        if let Err(source) = written {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(ClientError::Io { path, source });
        }
        info!(path = %path.display(), bytes = bytes.len(), "artifact saved");
        Ok(path)
    }
}

/// `macro.xlsx` -> `macro (2).xlsx` for `n = 2`; `n = 0` keeps the name.
pub fn numbered_filename(filename: &str, n: usize) -> String {
    if n == 0 {
        return filename.to_string();
    }
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({n}).{ext}"),
        _ => format!("{filename} ({n})"),
    }
}
