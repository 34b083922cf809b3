use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use tracing::info;

use crate::domain::change::ChangeSet;
use crate::error::AppResult;

/// Where step outputs go: the runner's output file, or the log when absent.
/// Stdout is left to the report.
pub struct OutputSink {
    path: Option<PathBuf>,
}

impl OutputSink {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn publish(&self, changes: &ChangeSet) -> AppResult<()> {
        let lines = output_lines(changes);
        match &self.path {
            Some(path) => {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                file.write_all(lines.as_bytes())?;
            }
            None => {
                for line in lines.lines() {
                    info!("step output {line}");
                }
            }
        }
        Ok(())
    }
}

fn output_lines(changes: &ChangeSet) -> String {
    format!(
        "has-breaking-changes={}\nbreaking-count={}\ncompatible-count={}\n",
        changes.has_breaking_changes(),
        changes.breaking_count(),
        changes.compatible_count()
    )
}
