//! Remote file download port and its HTTP implementation.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use super::MediaError;
use crate::digest::bytes_digest;

/// A downloaded file on local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub path: PathBuf,
    pub size: u64,
    /// SHA256 of the file contents.
    pub digest: String,
}

/// Downloads remote media into durable local storage.
pub trait RemoteFiles: Send + Sync {
    /// Download `url` and store it with the given extension (may be empty).
    fn download(
        &self,
        url: &str,
        extension: &str,
    ) -> impl Future<Output = Result<StoredFile, MediaError>> + Send;
}

/// Downloads over HTTP into a directory, one file per download.
pub struct HttpFileStore {
    client: reqwest::Client,
    dir: PathBuf,
}

impl HttpFileStore {
    /// Store downloads under `dir`.
    pub fn new(dir: PathBuf) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .unwrap_or_default();
        Self { client, dir }
    }
}

/// File name for a new download: a fresh UUID plus the extension.
fn file_name(extension: &str) -> String {
    let id = uuid::Uuid::new_v4();
    if extension.is_empty() {
        id.to_string()
    } else {
        format!("{id}.{extension}")
    }
}

impl RemoteFiles for HttpFileStore {
    async fn download(&self, url: &str, extension: &str) -> Result<StoredFile, MediaError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name(extension));
        let temp_path = path.with_extension("part");
        tokio::fs::write(&temp_path, &bytes).await?;
        tokio::fs::rename(&temp_path, &path).await?;

        Ok(StoredFile {
            path,
            size: bytes.len() as u64,
            digest: bytes_digest(&bytes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_keeps_extension() {
        let name = file_name("png");
        assert!(name.ends_with(".png"));
        assert_eq!(name.len(), 36 + 4);
    }

    #[test]
    fn test_file_name_without_extension() {
        assert_eq!(file_name("").len(), 36);
    }
}
