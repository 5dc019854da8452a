use std::path::{Path, PathBuf};

use uuid::Uuid;

/// URL prefix under which the uploads directory is served.
pub static STATIC_PREFIX: &str = "/api/v1/static";

/// Local media host: stores uploaded videos and pictures and hands back the
/// URL they are served from.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &crate::config::App) -> std::io::Result<Self> {
        let root = Path::new(config.uploads_dir());
        if root.is_absolute() {
            Ok(Self::new(root))
        } else {
            Ok(Self::new(std::env::current_dir()?.join(root)))
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `bytes` to `{root}/{folder}/{uuid}.{ext}` and returns its public URL.
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn save(&self, folder: MediaFolder, original_name: &str, bytes: &[u8]) -> std::io::Result<String> {
        let dir = self.root.join(folder.as_str());
        tokio::fs::create_dir_all(&dir).await?;

        let filename = match sanitize_extension(original_name) {
            Some(ext) => format!("{}.{}", Uuid::new_v4().simple(), ext),
            None => Uuid::new_v4().simple().to_string(),
        };

        tokio::fs::write(dir.join(&filename), bytes).await?;
        tracing::debug!("stored upload {}/{}", folder.as_str(), filename);

        Ok(format!("{}/{}/{}", STATIC_PREFIX, folder.as_str(), filename))
    }

    /// Removes a file previously returned by [`MediaStore::save`]. Foreign URLs are ignored.
    pub async fn remove(&self, url: &str) -> std::io::Result<()> {
        let Some(relative) = url.strip_prefix(STATIC_PREFIX).and_then(|r| r.strip_prefix('/')) else {
            return Ok(());
        };

        if relative.split('/').any(|part| part.is_empty() || part == "..") {
            return Ok(());
        }

        match tokio::fs::remove_file(self.root.join(relative)).await {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaFolder {
    Videos,
    Pictures,
}

impl MediaFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Videos => "videos",
            Self::Pictures => "pictures",
        }
    }
}

fn sanitize_extension(original_name: &str) -> Option<String> {
    let file_name = original_name.rsplit(['/', '\\']).next()?;
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext: String = ext
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(8)
        .collect::<String>()
        .to_ascii_lowercase();

    if ext.is_empty() { None } else { Some(ext) }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sanitize_extension_test() {
        assert_eq!(sanitize_extension("lecture.MP4"), Some(String::from("mp4")));
        assert_eq!(sanitize_extension("archive.tar.gz"), Some(String::from("gz")));
        assert_eq!(sanitize_extension("../../etc/passwd"), None);
        assert_eq!(sanitize_extension("evil.p/h\\p"), None);
        assert_eq!(sanitize_extension("clip.m p-4"), Some(String::from("mp4")));
        assert_eq!(sanitize_extension("noext"), None);
        assert_eq!(sanitize_extension("x.averyveryverylongextension"), Some(String::from("averyver")));
    }

    #[tokio::test]
    async fn save_and_remove_test() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path());

        let url = store
            .save(MediaFolder::Videos, "intro.mp4", b"fake video")
            .await
            .unwrap();
        assert!(url.starts_with("/api/v1/static/videos/"));
        assert!(url.ends_with(".mp4"));

        let relative = url.strip_prefix("/api/v1/static/").unwrap();
        let stored = dir.path().join(relative);
        assert_eq!(std::fs::read(&stored).unwrap(), b"fake video");

        store.remove(&url).await.unwrap();
        assert!(!stored.exists());

        // removing twice or removing foreign urls is fine
        store.remove(&url).await.unwrap();
        store.remove("https://cdn.example.com/a.mp4").await.unwrap();
        store.remove("/api/v1/static/../secret").await.unwrap();
    }
}
