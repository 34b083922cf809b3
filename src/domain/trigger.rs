use std::fmt;

use serde::Deserialize;

use crate::domain::revision::RevisionPair;
use crate::error::{AppError, AppResult};

/// A pull request conversation the report is posted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadId {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub revisions: RevisionPair,
    pub thread: Option<ThreadId>,
}

/// The subset of a webhook event payload needed to pick the two revisions.
#[derive(Debug, Default, Deserialize)]
pub struct EventPayload {
    pub pull_request: Option<PullRequestEvent>,
    pub before: Option<String>,
    pub after: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestEvent {
    pub number: u64,
    pub base: CommitRef,
    pub head: CommitRef,
}

#[derive(Debug, Deserialize)]
pub struct CommitRef {
    pub sha: String,
}

impl EventPayload {
    pub fn from_json(contents: &str) -> AppResult<Self> {
        serde_json::from_str(contents)
            .map_err(|err| AppError::Resolution(format!("invalid event payload: {err}")))
    }
}

pub fn resolve(
    explicit_old: Option<&str>,
    explicit_new: Option<&str>,
    payload: &EventPayload,
    repository: Option<&str>,
) -> AppResult<Trigger> {
    let thread = match &payload.pull_request {
        Some(pr) => Some(thread_for(repository, pr.number)?),
        None => None,
    };

    let explicit = explicit_old
        .zip(explicit_new)
        .filter(|(old, new)| !old.trim().is_empty() && !new.trim().is_empty());

    let revisions = if let Some((old, new)) = explicit {
        RevisionPair::new(old.trim(), new.trim())
    } else if let Some(pr) = &payload.pull_request {
        RevisionPair::new(pr.base.sha.as_str(), pr.head.sha.as_str())
    } else if let (Some(before), Some(after)) = (&payload.before, &payload.after) {
        RevisionPair::new(before.as_str(), after.as_str())
    } else {
        return Err(AppError::Resolution(
            "Unable to determine commits to compare. This should be run on pull_request or push events."
                .to_string(),
        ));
    };

    Ok(Trigger { revisions, thread })
}

fn thread_for(repository: Option<&str>, number: u64) -> AppResult<ThreadId> {
    let repository = repository.ok_or_else(|| {
        AppError::Resolution("pull request event without a repository name".to_string())
    })?;
    let (owner, repo) = repository
        .split_once('/')
        .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty())
        .ok_or_else(|| {
            AppError::Resolution(format!(
                "repository must be in owner/name form, got '{repository}'"
            ))
        })?;
    Ok(ThreadId {
        owner: owner.to_string(),
        repo: repo.to_string(),
        number,
    })
}
