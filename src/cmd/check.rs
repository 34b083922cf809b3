use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use tracing::warn;

use crate::config::{AppConfig, Grouping};
use crate::context::AppContext;
use crate::domain::change::ChangeSet;
use crate::domain::revision::RevisionPair;
use crate::domain::trigger;
use crate::error::{AppError, AppResult};
use crate::infra::event::load_event_payload;
use crate::infra::github::GitHubClient;
use crate::infra::outputs::OutputSink;
use crate::infra::process::TokioProcessRunner;
use crate::workflow::check::{RunStatus, run_check};
use crate::workflow::reconcile::DEFAULT_MARKER;
use crate::workflow::report::{self, ReportFormat};

// Workflow inputs arrive as env vars that are empty when left unset, so the
// env-backed args are plain strings and blanks fall back to the defaults in
// `into_config`.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Old revision (commit hash) or snapshot directory.
    #[arg(long, env = "INPUT_OLD")]
    pub old: Option<String>,
    /// New revision (commit hash) or snapshot directory.
    #[arg(long, env = "INPUT_NEW")]
    pub new: Option<String>,
    /// Directory the tool runs in; snapshot directories are relative to it [default: .]
    #[arg(long, env = "INPUT_WORKING-DIRECTORY")]
    pub working_directory: Option<String>,
    /// Exit non-zero when breaking changes are found [default: true]
    #[arg(long, env = "INPUT_FAIL-ON-BREAKING")]
    pub fail_on_breaking: Option<String>,
    /// Post the report on the pull request [default: true]
    #[arg(long, env = "INPUT_COMMENT-ON-PR")]
    pub comment_on_pr: Option<String>,
    /// Token for the GitHub API.
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    #[arg(long, env = "GITHUB_TOKEN", hide = true, hide_env_values = true)]
    pub github_token: Option<String>,
    /// GitHub API base URL [default: https://api.github.com]
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,
    /// Webhook payload of the triggering event.
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<String>,
    /// Repository in owner/name form.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,
    /// File receiving step outputs; logged when unset.
    #[arg(long, env = "GITHUB_OUTPUT")]
    pub output_file: Option<String>,
    /// Name of the apidiff executable.
    #[arg(long, default_value = "apidiff")]
    pub tool: String,
    /// Hidden tag that identifies the report comment.
    #[arg(long, default_value = DEFAULT_MARKER)]
    pub marker: String,
    /// Format of the report printed to stdout.
    #[arg(long, value_enum, default_value_t = ReportFormat::Markdown)]
    pub format: ReportFormat,
    /// Split changes by `## <package>` headings in the tool output.
    #[arg(long)]
    pub group_by_package: bool,
}

impl CheckArgs {
    fn resolved_token(&self) -> Option<String> {
        non_blank(self.token.as_deref())
            .or_else(|| non_blank(self.github_token.as_deref()))
            .map(str::to_string)
    }

    fn into_config(self) -> AppResult<AppConfig> {
        if self.marker.trim().is_empty() {
            return Err(AppError::Configuration(
                "--marker must not be blank".to_string(),
            ));
        }
        if self.tool.trim().is_empty() {
            return Err(AppError::Configuration("--tool must not be blank".to_string()));
        }

        let root = non_blank(self.working_directory.as_deref()).unwrap_or(".");
        let mut config = AppConfig::load(Path::new(root));
        config.fail_on_breaking =
            input_flag("fail-on-breaking", self.fail_on_breaking.as_deref(), true)?;
        config.comment_on_pr = input_flag("comment-on-pr", self.comment_on_pr.as_deref(), true)?;
        config.token = self.resolved_token();
        if let Some(api_url) = non_blank(self.api_url.as_deref()) {
            config.api_url = api_url.to_string();
        }
        config.tool = self.tool;
        config.marker = self.marker;
        config.format = self.format;
        config.grouping = if self.group_by_package {
            Grouping::PackageHeadings
        } else {
            Grouping::Single
        };
        config.output_path = non_blank(self.output_file.as_deref()).map(PathBuf::from);
        Ok(config)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Reads a boolean input the way clap's boolish parser does; blank means unset.
fn input_flag(name: &str, value: Option<&str>, default: bool) -> AppResult<bool> {
    let Some(value) = non_blank(value) else {
        return Ok(default);
    };
    match value.to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Ok(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Ok(false),
        _ => Err(AppError::Configuration(format!(
            "invalid value '{value}' for {name}: expected true or false"
        ))),
    }
}

pub async fn run(args: CheckArgs) -> AppResult<RunStatus> {
    let payload = load_event_payload(non_blank(args.event_path.as_deref()).map(Path::new))?;
    let trigger = trigger::resolve(
        args.old.as_deref(),
        args.new.as_deref(),
        &payload,
        non_blank(args.repository.as_deref()),
    )?;
    let config = args.into_config()?;

    if config.comment_on_pr && trigger.thread.is_some() && config.token.is_none() {
        warn!("GitHub token not configured; the report comment will not be posted");
    }

    let process_runner = Arc::new(TokioProcessRunner::new());
    let thread_store = Arc::new(GitHubClient::new(
        config.api_url.clone(),
        config.token.clone(),
    ));
    let context = AppContext::new(config, process_runner, thread_store);

    let outcome = run_check(&context, &trigger).await;

    if let Some(changes) = &outcome.change_set {
        emit(&mut io::stdout().lock(), &context.config, changes, &trigger.revisions)?;
    }

    Ok(outcome.status)
}

/// Publishes step outputs, then writes the report as the only thing on `out`.
fn emit(
    out: &mut impl Write,
    config: &AppConfig,
    changes: &ChangeSet,
    revisions: &RevisionPair,
) -> AppResult<()> {
    OutputSink::new(config.output_path.clone()).publish(changes)?;
    let rendered = report::render(config.format, changes, revisions)
        .map_err(|err| AppError::Configuration(format!("failed to render report: {err}")))?;
    writeln!(out, "{rendered}")?;
    out.flush()?;
    Ok(())
}
