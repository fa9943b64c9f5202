use std::path::{Path, PathBuf};

use anyhow::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use tokio::fs;
use tracing::info;
use uuid::Uuid;

/// On-disk store for message attachments. Each attachment lands as a single
/// flat file under a generated name; only the original extension survives so
/// a browser can still guess the content type. Attachment storage is a side
/// concern of the relay: a failure here never fails the message.
pub struct AttachmentStore {
    dir: PathBuf,
}

impl AttachmentStore {
    pub async fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Attachment storage directory: {}", dir.display());
        Ok(Self { dir })
    }

    /// Decode and persist one attachment, returning the generated file name.
    /// Accepts either a bare base64 payload or a browser data URL
    /// (`data:<mime>;base64,<payload>`).
    pub async fn save(&self, original_name: &str, data: &str) -> Result<String> {
        let payload = data.rsplit(',').next().unwrap_or(data);
        let bytes = B64.decode(payload)?;

        let name = match Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };

        fs::write(self.dir.join(&name), bytes).await?;
        Ok(name)
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}
