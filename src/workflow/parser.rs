use tracing::info;

use crate::domain::change::{Change, ChangeSet, DEFAULT_GROUP, Group};

const COMPATIBLE_HEADER: &str = "Compatible changes:";
const INCOMPATIBLE_HEADER: &str = "Incompatible changes:";
const BULLET: &str = "- ";

/// Decides whether a line of tool output opens a new group of changes.
pub trait GroupResolver: Send + Sync {
    fn group_header(&self, line: &str) -> Option<String>;
}

/// Everything lands in the default group.
#[derive(Debug, Default, Clone, Copy)]
pub struct SingleGroup;

impl GroupResolver for SingleGroup {
    fn group_header(&self, _line: &str) -> Option<String> {
        None
    }
}

/// Groups by `## <package>` headings, as printed when diffing whole modules.
#[derive(Debug, Default, Clone, Copy)]
pub struct PackageHeadings;

impl GroupResolver for PackageHeadings {
    fn group_header(&self, line: &str) -> Option<String> {
        line.strip_prefix("## ")
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Neutral,
    Compatible,
    Incompatible,
}

pub struct ChangeParser {
    resolver: Box<dyn GroupResolver>,
}

impl Default for ChangeParser {
    fn default() -> Self {
        Self::new(Box::new(SingleGroup))
    }
}

impl ChangeParser {
    pub fn new(resolver: Box<dyn GroupResolver>) -> Self {
        Self { resolver }
    }

    pub fn parse(&self, raw: &str) -> ChangeSet {
        if raw.trim().is_empty() {
            return ChangeSet::empty();
        }

        let mut groups = vec![Group::new(DEFAULT_GROUP)];
        let mut active = 0usize;
        let mut section = Section::Neutral;
        let mut breaking_header_seen = false;

        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if line == COMPATIBLE_HEADER {
                section = Section::Compatible;
                continue;
            }
            if line == INCOMPATIBLE_HEADER {
                section = Section::Incompatible;
                breaking_header_seen = true;
                continue;
            }

            if let Some(name) = self.resolver.group_header(line) {
                active = match groups.iter().position(|g| g.name == name) {
                    Some(index) => index,
                    None => {
                        groups.push(Group::new(name));
                        groups.len() - 1
                    }
                };
                section = Section::Neutral;
                continue;
            }

            let Some(message) = line.strip_prefix(BULLET) else {
                continue;
            };
            let compatible = match section {
                Section::Compatible => true,
                Section::Incompatible => false,
                Section::Neutral => continue,
            };
            groups[active].push(Change {
                message: message.trim().to_string(),
                compatible,
            });
        }

        let changes = ChangeSet::new(groups, breaking_header_seen);
        info!(
            breaking = changes.breaking_count(),
            compatible = changes.compatible_count(),
            "parsed {} breaking changes and {} compatible changes",
            changes.breaking_count(),
            changes.compatible_count()
        );
        changes
    }
}
