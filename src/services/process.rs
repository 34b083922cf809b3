use std::path::Path;

use async_trait::async_trait;

use crate::error::AppResult;

/// Captured result of one external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs `program` to completion. A non-zero exit is reported through
    /// [`ProcessOutput::status`]; only failing to spawn is an error.
    async fn execute(&self, program: &str, args: &[String], cwd: &Path)
    -> AppResult<ProcessOutput>;
}
