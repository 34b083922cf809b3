use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::domain::revision::{InputMode, RevisionPair};
use crate::error::{AppError, AppResult};
use crate::services::{ProcessOutput, ProcessRunner};

pub const EXPORT_FILE_NAME: &str = "apidiff.export";
const INSTALL_PACKAGE: &str = "golang.org/x/exp/cmd/apidiff@latest";
/// `go install` names the binary after the package, whatever `--tool` says.
const INSTALLED_BINARY: &str = "apidiff";

/// Drives the external `apidiff` tool and hands back its raw report.
pub struct DiffRunner {
    runner: Arc<dyn ProcessRunner>,
    tool: String,
    go_bin: Option<PathBuf>,
    resolved_tool: OnceCell<String>,
}

impl DiffRunner {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        tool: impl Into<String>,
        go_bin: Option<PathBuf>,
    ) -> Self {
        Self {
            runner,
            tool: tool.into(),
            go_bin,
            resolved_tool: OnceCell::new(),
        }
    }

    pub async fn run(&self, root: &Path, revisions: &RevisionPair) -> AppResult<String> {
        info!(old = %revisions.old, new = %revisions.new, "running apidiff");
        let tool = self.ensure_installed().await?;

        let output = match revisions.mode() {
            InputMode::Revision => {
                let args = vec![revisions.old.clone(), revisions.new.clone()];
                self.runner.execute(tool, &args, root).await?
            }
            InputMode::Snapshot => {
                let old_dir = root.join(&revisions.old);
                let new_dir = root.join(&revisions.new);
                tokio::try_join!(
                    self.write_export(tool, &old_dir),
                    self.write_export(tool, &new_dir)
                )?;

                let args = vec![
                    path_arg(&old_dir.join(EXPORT_FILE_NAME)),
                    path_arg(&new_dir.join(EXPORT_FILE_NAME)),
                ];
                self.runner.execute(tool, &args, root).await?
            }
        };

        interpret(output)
    }

    async fn write_export(&self, tool: &str, dir: &Path) -> AppResult<()> {
        let args = vec!["-w".to_string(), EXPORT_FILE_NAME.to_string(), ".".to_string()];
        let output = self.runner.execute(tool, &args, dir).await?;
        if !output.success() {
            return Err(AppError::ToolExecution(format!(
                "apidiff export in {} failed with {}: {}",
                dir.display(),
                describe_status(output.status),
                output.stderr.trim()
            )));
        }
        Ok(())
    }

    /// Probes for the tool once per runner, installing it when missing.
    async fn ensure_installed(&self) -> AppResult<&str> {
        self.resolved_tool
            .get_or_try_init(|| self.locate_or_install())
            .await
            .map(String::as_str)
    }

    async fn locate_or_install(&self) -> AppResult<String> {
        let probe = self
            .runner
            .execute("which", &[self.tool.clone()], Path::new("."))
            .await;
        if matches!(&probe, Ok(output) if output.success()) {
            info!("{} is already installed", self.tool);
            return Ok(self.tool.clone());
        }

        let go_bin = self.go_bin.as_deref().ok_or_else(|| {
            AppError::Configuration(format!(
                "{} is not installed and the Go bin directory is unknown; set GOBIN, GOPATH or HOME",
                self.tool
            ))
        })?;

        info!("installing {}", self.tool);
        let args = vec!["install".to_string(), INSTALL_PACKAGE.to_string()];
        let output = self.runner.execute("go", &args, Path::new(".")).await?;
        if !output.success() {
            return Err(AppError::ToolExecution(format!(
                "failed to install apidiff ({}): {}",
                describe_status(output.status),
                output.stderr.trim()
            )));
        }

        let installed = path_arg(&go_bin.join(INSTALLED_BINARY));
        info!(path = %installed, "apidiff installed successfully");
        Ok(installed)
    }
}

/// Exit 0 means no incompatible changes and exit 1 means some were found;
/// both are successful runs.
fn interpret(output: ProcessOutput) -> AppResult<String> {
    if !output.stderr.trim().is_empty() {
        warn!("apidiff stderr: {}", output.stderr.trim());
    }

    match output.status {
        Some(0) | Some(1) => Ok(output.stdout),
        status => Err(AppError::ToolExecution(format!(
            "apidiff failed with {}: {}",
            describe_status(status),
            output.stderr.trim()
        ))),
    }
}

fn describe_status(status: Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
