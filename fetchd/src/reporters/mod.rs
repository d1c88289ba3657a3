mod file;
mod stdout;

use crate::{config::Config, storage::StoredRecord};
use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;

pub use file::FileReporter;
pub use stdout::StdoutReporter;

/// Trait for sinks that mirror accepted response records.
///
/// Each reporter handles its own errors; a failing reporter never affects the others
/// or the acknowledgement already given to the executor.
#[async_trait]
pub trait Reporter: Send + Sync {
    async fn report(&self, record: &StoredRecord) -> Result<()>;

    /// Returns the name of this reporter for logging purposes.
    fn name(&self) -> &'static str;
}

pub fn create_enabled_reporters(conf: &Config) -> Vec<Box<dyn Reporter>> {
    let mut reporters: Vec<Box<dyn Reporter>> = Vec::new();

    if conf.reporter.enable_stdout {
        reporters.push(Box::new(StdoutReporter::new()));
    }

    if let Some(ref file_path) = conf.reporter.file_path {
        reporters.push(Box::new(FileReporter::new(PathBuf::from(file_path))));
    }

    reporters
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_reporters_by_default() {
        assert!(create_enabled_reporters(&Config::default()).is_empty());
    }

    #[test]
    fn test_enabled_reporters_follow_config() {
        let mut conf = Config::default();
        conf.reporter.enable_stdout = true;
        conf.reporter.file_path = Some("responses.jsonl".to_string());

        let names: Vec<_> = create_enabled_reporters(&conf)
            .iter()
            .map(|r| r.name())
            .collect();

        assert_eq!(names, vec!["stdout", "file"]);
    }
}
