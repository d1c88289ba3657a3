use super::Reporter;
use crate::storage::StoredRecord;
use anyhow::Result;
use async_trait::async_trait;

/// Reporter that prints one line per accepted record.
pub struct StdoutReporter;

impl StdoutReporter {
    pub fn new() -> Self {
        Self
    }

    fn format_line(record: &StoredRecord) -> String {
        format!(
            "[{:.5}] job {} - {:.3}s ({} chars)",
            record.created_at,
            record.key,
            record.duration,
            record.content.chars().count()
        )
    }
}

#[async_trait]
impl Reporter for StdoutReporter {
    async fn report(&self, record: &StoredRecord) -> Result<()> {
        println!("{}", Self::format_line(record));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_line() {
        let record = StoredRecord {
            key: 2,
            content: "abc".to_string(),
            duration: 0.3,
            created_at: 1700000000.25,
        };

        assert_eq!(
            StdoutReporter::format_line(&record),
            "[1700000000.25000] job 2 - 0.300s (3 chars)"
        );
    }
}
