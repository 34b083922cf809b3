use tracing::{error, info, warn};

use crate::config::Grouping;
use crate::context::AppContext;
use crate::domain::change::ChangeSet;
use crate::domain::trigger::Trigger;
use crate::workflow::diff_runner::DiffRunner;
use crate::workflow::parser::{ChangeParser, PackageHeadings, SingleGroup};
use crate::workflow::reconcile::CommentReconciler;
use crate::workflow::report::render_markdown;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Clean,
    BreakingTolerated(usize),
    BreakingFatal(usize),
    Failed(String),
}

impl RunStatus {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunStatus::Clean | RunStatus::BreakingTolerated(_) => 0,
            RunStatus::BreakingFatal(_) | RunStatus::Failed(_) => 1,
        }
    }

    pub fn message(&self) -> String {
        match self {
            RunStatus::Clean => "No breaking API changes detected".to_string(),
            RunStatus::BreakingTolerated(count) | RunStatus::BreakingFatal(count) => {
                format!("Found {count} breaking API changes")
            }
            RunStatus::Failed(message) => format!("Action failed: {message}"),
        }
    }
}

pub struct CheckOutcome {
    pub change_set: Option<ChangeSet>,
    pub status: RunStatus,
}

pub fn parser_for(grouping: Grouping) -> ChangeParser {
    match grouping {
        Grouping::Single => ChangeParser::new(Box::new(SingleGroup)),
        Grouping::PackageHeadings => ChangeParser::new(Box::new(PackageHeadings)),
    }
}

/// Runs the tool, parses and publishes its report, then applies the
/// breaking-change policy. Never returns an error: failures end up in
/// [`RunStatus::Failed`].
pub async fn run_check(ctx: &AppContext, trigger: &Trigger) -> CheckOutcome {
    let config = &ctx.config;
    let runner = DiffRunner::new(
        ctx.process_runner.clone(),
        config.tool.clone(),
        config.go_bin.clone(),
    );

    let raw = match runner.run(&config.workspace_root, &trigger.revisions).await {
        Ok(raw) => raw,
        Err(err) => {
            let status = RunStatus::Failed(err.to_string());
            error!("{}", status.message());
            return CheckOutcome {
                change_set: None,
                status,
            };
        }
    };

    let changes = parser_for(config.grouping).parse(&raw);

    match (&trigger.thread, config.comment_on_pr) {
        (Some(thread), true) => {
            let reconciler = CommentReconciler::new(ctx.thread_store.clone());
            reconciler
                .upsert(thread, &render_markdown(&changes), &config.marker)
                .await;
        }
        (None, true) => info!("Not running on a pull request, skipping comment"),
        _ => {}
    }

    let status = if !changes.has_breaking_changes() {
        RunStatus::Clean
    } else if config.fail_on_breaking {
        RunStatus::BreakingFatal(changes.breaking_count())
    } else {
        RunStatus::BreakingTolerated(changes.breaking_count())
    };

    match &status {
        RunStatus::Clean => info!("{}", status.message()),
        RunStatus::BreakingTolerated(_) => warn!("{}", status.message()),
        _ => error!("{}", status.message()),
    }

    CheckOutcome {
        change_set: Some(changes),
        status,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::*;
    use crate::config::AppConfig;
    use crate::domain::post::Post;
    use crate::domain::revision::RevisionPair;
    use crate::services::ProcessOutput;
    use crate::workflow::diff_runner::tests::{FakeRunner, exit};
    use crate::workflow::reconcile::DEFAULT_MARKER;
    use crate::workflow::reconcile::tests::{MemoryThreadStore, thread};

    fn config(fail_on_breaking: bool) -> AppConfig {
        AppConfig {
            workspace_root: PathBuf::from("/work"),
            fail_on_breaking,
            comment_on_pr: true,
            token: None,
            api_url: "https://api.github.com".to_string(),
            tool: "apidiff".to_string(),
            go_bin: Some(PathBuf::from("/home/ci/go/bin")),
            marker: DEFAULT_MARKER.to_string(),
            format: Default::default(),
            grouping: Grouping::Single,
            output_path: None,
        }
    }

    fn pr_trigger() -> Trigger {
        Trigger {
            revisions: RevisionPair::new("abc1234", "def5678"),
            thread: Some(thread()),
        }
    }

    fn context(
        config: AppConfig,
        tool_output: ProcessOutput,
        store: Arc<MemoryThreadStore>,
    ) -> AppContext {
        let runner = FakeRunner::default().on("apidiff", &["abc1234"], tool_output);
        AppContext::new(config, Arc::new(runner), store)
    }

    #[tokio::test]
    async fn fatal_breaking_changes_fail_the_run() {
        let store = Arc::new(MemoryThreadStore::default());
        let ctx = context(
            config(true),
            exit(1, "Incompatible changes:\n- Foo: removed\n"),
            store.clone(),
        );

        let outcome = run_check(&ctx, &pr_trigger()).await;

        assert_eq!(outcome.status, RunStatus::BreakingFatal(1));
        assert_eq!(outcome.status.exit_code(), 1);
        assert_eq!(outcome.status.message(), "Found 1 breaking API changes");
        let posts = store.posts();
        assert_eq!(posts.len(), 1);
        assert!(posts[0].body.starts_with(DEFAULT_MARKER));
        assert!(posts[0].body.contains("- Foo: removed"));
    }

    #[tokio::test]
    async fn tolerated_breaking_changes_succeed() {
        let store = Arc::new(MemoryThreadStore::default());
        let ctx = context(
            config(false),
            exit(1, "Incompatible changes:\n- Foo: removed\n"),
            store,
        );

        let outcome = run_check(&ctx, &pr_trigger()).await;

        assert_eq!(outcome.status, RunStatus::BreakingTolerated(1));
        assert_eq!(outcome.status.exit_code(), 0);
    }

    #[tokio::test]
    async fn compatible_changes_are_clean() {
        let store = Arc::new(MemoryThreadStore::default());
        let ctx = context(
            config(true),
            exit(0, "Compatible changes:\n- Bar: added\n- Baz: added\n"),
            store,
        );

        let outcome = run_check(&ctx, &pr_trigger()).await;

        assert_eq!(outcome.status, RunStatus::Clean);
        let changes = outcome.change_set.unwrap();
        assert_eq!(changes.compatible_count(), 2);
        assert_eq!(changes.breaking_count(), 0);
    }

    #[tokio::test]
    async fn tool_failure_publishes_nothing() {
        let store = Arc::new(MemoryThreadStore::default());
        let mut failure = exit(2, "");
        failure.stderr = "boom".to_string();
        let ctx = context(config(true), failure, store.clone());

        let outcome = run_check(&ctx, &pr_trigger()).await;

        assert_eq!(
            outcome.status,
            RunStatus::Failed("apidiff failed with exit code 2: boom".to_string())
        );
        assert_eq!(
            outcome.status.message(),
            "Action failed: apidiff failed with exit code 2: boom"
        );
        assert!(outcome.change_set.is_none());
        assert!(store.posts().is_empty());
    }

    #[tokio::test]
    async fn rerun_updates_existing_report() {
        let store = Arc::new(MemoryThreadStore::with_posts(vec![Post {
            id: 77,
            body: format!("{DEFAULT_MARKER}\nstale"),
        }]));
        let ctx = context(
            config(true),
            exit(0, "Compatible changes:\n- Bar: added\n"),
            store.clone(),
        );

        run_check(&ctx, &pr_trigger()).await;
        run_check(&ctx, &pr_trigger()).await;

        let posts = store.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, 77);
        assert!(posts[0].body.contains("- Bar: added"));
    }

    #[tokio::test]
    async fn comment_failure_does_not_change_outcome() {
        let store = Arc::new(MemoryThreadStore::failing());
        let ctx = context(config(true), exit(0, ""), store);

        let outcome = run_check(&ctx, &pr_trigger()).await;

        assert_eq!(outcome.status, RunStatus::Clean);
        assert!(outcome.change_set.unwrap().is_empty());
    }

    #[tokio::test]
    async fn skips_comment_without_thread_or_when_disabled() {
        let store = Arc::new(MemoryThreadStore::default());
        let ctx = context(
            config(true),
            exit(0, "Compatible changes:\n- Bar: added\n"),
            store.clone(),
        );
        let push = Trigger {
            revisions: RevisionPair::new("abc1234", "def5678"),
            thread: None,
        };
        run_check(&ctx, &push).await;

        let mut quiet = config(true);
        quiet.comment_on_pr = false;
        let ctx = context(quiet, exit(0, "Compatible changes:\n- Bar: added\n"), store.clone());
        run_check(&ctx, &pr_trigger()).await;

        assert!(store.posts().is_empty());
    }
}
