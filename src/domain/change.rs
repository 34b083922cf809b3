use serde::Serialize;

/// Name of the bucket used when the tool output carries no grouping header.
pub const DEFAULT_GROUP: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub message: String,
    pub compatible: bool,
}

/// A named bucket of changes, a "package" in the tool's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub name: String,
    pub breaking: Vec<Change>,
    pub compatible: Vec<Change>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            breaking: Vec::new(),
            compatible: Vec::new(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_GROUP
    }

    pub fn is_empty(&self) -> bool {
        self.breaking.is_empty() && self.compatible.is_empty()
    }

    pub fn push(&mut self, change: Change) {
        if change.compatible {
            self.compatible.push(change);
        } else {
            self.breaking.push(change);
        }
    }
}

/// Result of interpreting one run of the diffing tool.
///
/// Counts are derived from the groups at construction and empty groups are
/// dropped, so a `ChangeSet` can't disagree with its own contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    has_breaking_changes: bool,
    breaking_count: usize,
    compatible_count: usize,
    #[serde(rename = "packages")]
    groups: Vec<Group>,
}

impl ChangeSet {
    /// `breaking_header_seen` marks that the tool announced an incompatible
    /// section, which is the breaking signal even when no entry followed it.
    pub fn new(groups: Vec<Group>, breaking_header_seen: bool) -> Self {
        let groups: Vec<Group> = groups.into_iter().filter(|g| !g.is_empty()).collect();
        let breaking_count = groups.iter().map(|g| g.breaking.len()).sum();
        let compatible_count = groups.iter().map(|g| g.compatible.len()).sum();
        Self {
            has_breaking_changes: breaking_header_seen || breaking_count > 0,
            breaking_count,
            compatible_count,
            groups,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), false)
    }

    pub fn has_breaking_changes(&self) -> bool {
        self.has_breaking_changes
    }

    pub fn breaking_count(&self) -> usize {
        self.breaking_count
    }

    pub fn compatible_count(&self) -> usize {
        self.compatible_count
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
