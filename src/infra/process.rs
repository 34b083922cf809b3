use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::services::{ProcessOutput, ProcessRunner};

pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn execute(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> AppResult<ProcessOutput> {
        debug!(program, ?args, cwd = %cwd.display(), "running command");

        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|err| AppError::ToolExecution(format!("failed to run {program}: {err}")))?;

        Ok(ProcessOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_status_and_streams() {
        let runner = TokioProcessRunner::new();
        let args = vec![
            "-c".to_string(),
            "echo out; echo err >&2; exit 1".to_string(),
        ];
        let output = runner
            .execute("sh", &args, &std::env::temp_dir())
            .await
            .unwrap();
        assert_eq!(output.status, Some(1));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
        assert!(!output.success());
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let runner = TokioProcessRunner::new();
        let err = runner
            .execute("definitely-not-a-real-program", &[], &std::env::temp_dir())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ToolExecution(_)));
    }
}
