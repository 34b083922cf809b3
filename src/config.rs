use std::env;
use std::path::{Path, PathBuf};

use crate::workflow::report::ReportFormat;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub workspace_root: PathBuf,
    pub fail_on_breaking: bool,
    pub comment_on_pr: bool,
    pub token: Option<String>,
    pub api_url: String,
    pub tool: String,
    /// Resolved up front but only required when the tool must be installed.
    pub go_bin: Option<PathBuf>,
    pub marker: String,
    pub format: ReportFormat,
    pub grouping: Grouping,
    pub output_path: Option<PathBuf>,
}

/// How the parser buckets changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Grouping {
    #[default]
    Single,
    PackageHeadings,
}

impl AppConfig {
    /// Base config for `workspace_root`; callers override fields from the CLI.
    pub fn load(workspace_root: &Path) -> Self {
        let go_bin = go_bin_directory(
            env::var("GOBIN").ok(),
            env::var("GOPATH").ok(),
            env::var("HOME").ok(),
        );

        Self {
            workspace_root: workspace_root.to_path_buf(),
            fail_on_breaking: true,
            comment_on_pr: true,
            token: None,
            api_url: "https://api.github.com".to_string(),
            tool: "apidiff".to_string(),
            go_bin,
            marker: crate::workflow::reconcile::DEFAULT_MARKER.to_string(),
            format: ReportFormat::default(),
            grouping: Grouping::default(),
            output_path: None,
        }
    }
}

/// Where `go install` puts binaries: `GOBIN`, else `GOPATH/bin`, else `~/go/bin`.
pub fn go_bin_directory(
    gobin: Option<String>,
    gopath: Option<String>,
    home: Option<String>,
) -> Option<PathBuf> {
    let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

    if let Some(gobin) = non_empty(gobin) {
        return Some(PathBuf::from(gobin));
    }
    if let Some(gopath) = non_empty(gopath) {
        // GOPATH may be a list; go install uses the first entry.
        let first = env::split_paths(&gopath)
            .next()
            .unwrap_or_else(|| PathBuf::from(&gopath));
        return Some(first.join("bin"));
    }
    non_empty(home).map(|home| Path::new(&home).join("go").join("bin"))
}
