#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionPair {
    pub old: String,
    pub new: String,
}

impl RevisionPair {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }

    pub fn mode(&self) -> InputMode {
        InputMode::detect(&self.old)
    }
}

/// How the diffing tool is fed: two commits, or two directory trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Revision,
    Snapshot,
}

impl InputMode {
    /// Abbreviated or full commit hashes select revision mode; anything else
    /// is taken as a directory under the working root.
    pub fn detect(reference: &str) -> Self {
        let is_hash = (7..=40).contains(&reference.len())
            && reference.chars().all(|c| c.is_ascii_hexdigit());
        if is_hash {
            InputMode::Revision
        } else {
            InputMode::Snapshot
        }
    }
}
