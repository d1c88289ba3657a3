use super::Reporter;
use crate::storage::StoredRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

/// Reporter that appends accepted records to a file, one JSON object per line.
pub struct FileReporter {
    file_path: PathBuf,
}

impl FileReporter {
    /// # Arguments
    /// * `file_path` - Path to the file records are appended to
    pub fn new(file_path: PathBuf) -> Self {
        Self { file_path }
    }
}

#[async_trait]
impl Reporter for FileReporter {
    async fn report(&self, record: &StoredRecord) -> Result<()> {
        let log_entry = serde_json::json!({
            "id": record.key,
            "response": record.content,
            "duration": record.duration,
            "created_at": record.created_at,
        });

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
            .await
            .with_context(|| format!("Failed to open log file: {}", self.file_path.display()))?;

        let log_line = format!("{}\n", log_entry);
        file.write_all(log_line.as_bytes())
            .await
            .with_context(|| "Failed to write to log file")?;

        file.flush()
            .await
            .with_context(|| "Failed to flush log file")?;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
