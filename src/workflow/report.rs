use std::fmt::Write as _;

use clap::ValueEnum;
use serde::Serialize;

use crate::domain::change::ChangeSet;
use crate::domain::revision::RevisionPair;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Markdown,
    Text,
    Json,
}

/// Renders the report posted on pull requests.
pub fn render_markdown(changes: &ChangeSet) -> String {
    let mut out = String::from("# API Compatibility Check Results\n\n");

    if changes.is_empty() {
        out.push_str("✅ **No API changes detected**\n");
        return out;
    }

    out.push_str("## Summary\n\n");
    out.push_str("| Type | Count |\n");
    out.push_str("|------|-------|\n");
    let _ = writeln!(out, "| Breaking changes | {} |", changes.breaking_count());
    let _ = writeln!(out, "| Compatible changes | {} |\n", changes.compatible_count());

    if changes.has_breaking_changes() {
        out.push_str("⚠️ **This PR contains breaking API changes!**\n\n");
    }

    out.push_str("## Details\n\n");
    for group in changes.groups() {
        if !group.is_default() {
            let _ = writeln!(out, "### `{}`\n", group.name);
        }
        if !group.breaking.is_empty() {
            out.push_str("#### ❌ Breaking changes\n\n");
            for change in &group.breaking {
                let _ = writeln!(out, "- {}", change.message);
            }
            out.push('\n');
        }
        if !group.compatible.is_empty() {
            out.push_str("#### ✅ Compatible changes\n\n");
            for change in &group.compatible {
                let _ = writeln!(out, "- {}", change.message);
            }
            out.push('\n');
        }
    }

    out
}

pub fn render_text(changes: &ChangeSet, revisions: &RevisionPair) -> String {
    let mut out = String::from("API Changes Report\n==================\n");
    let _ = writeln!(out, "Old: {}", revisions.old);
    let _ = writeln!(out, "New: {}\n", revisions.new);

    if changes.is_empty() {
        out.push_str("No API changes detected.\n");
        return out;
    }

    out.push_str("Summary:\n");
    let _ = writeln!(out, "  Breaking changes:   {}", changes.breaking_count());
    let _ = writeln!(out, "  Compatible changes: {}\n", changes.compatible_count());

    for group in changes.groups() {
        if !group.is_default() {
            let _ = writeln!(out, "Package: {}", group.name);
            let _ = writeln!(out, "{}", "-".repeat(group.name.len() + 9));
        }
        if !group.breaking.is_empty() {
            out.push_str("Breaking changes:\n");
            for change in &group.breaking {
                let _ = writeln!(out, "  ✗ {}", change.message);
            }
        }
        if !group.compatible.is_empty() {
            out.push_str("Compatible changes:\n");
            for change in &group.compatible {
                let _ = writeln!(out, "  ✓ {}", change.message);
            }
        }
        out.push('\n');
    }

    if changes.has_breaking_changes() {
        out.push_str("⚠️  This change contains breaking API changes!\n");
    }

    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    old_ref: &'a str,
    new_ref: &'a str,
    #[serde(flatten)]
    changes: &'a ChangeSet,
}

pub fn render_json(changes: &ChangeSet, revisions: &RevisionPair) -> serde_json::Result<String> {
    let report = JsonReport {
        old_ref: &revisions.old,
        new_ref: &revisions.new,
        changes,
    };
    serde_json::to_string_pretty(&report)
}

pub fn render(
    format: ReportFormat,
    changes: &ChangeSet,
    revisions: &RevisionPair,
) -> serde_json::Result<String> {
    match format {
        ReportFormat::Markdown => Ok(render_markdown(changes)),
        ReportFormat::Text => Ok(render_text(changes, revisions)),
        ReportFormat::Json => render_json(changes, revisions),
    }
}
