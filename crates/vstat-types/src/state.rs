//! Item states and kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic version-control state of a tracked item.
///
/// This is a closed set: every classification of a raw repository status
/// yields exactly one of these values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemState {
    /// Present on disk but not known to the repository.
    Untracked,
    /// Neither known to the repository nor present on disk.
    UntrackedMissing,
    /// Newly staged.
    Added,
    /// Changed in the index or the working tree.
    Modified,
    /// Deleted in the index or the working tree.
    Removed,
    /// Has unresolved merge conflicts.
    Conflicted,
    /// Known to the repository with no pending changes.
    #[default]
    UpToDate,
    /// Tracked but missing from the working tree.
    Missing,
}

impl ItemState {
    /// Every state, in declaration order.
    pub const ALL: [ItemState; 8] = [
        ItemState::Untracked,
        ItemState::UntrackedMissing,
        ItemState::Added,
        ItemState::Modified,
        ItemState::Removed,
        ItemState::Conflicted,
        ItemState::UpToDate,
        ItemState::Missing,
    ];

    /// Short lowercase label, stable across releases.
    pub fn label(&self) -> &'static str {
        match self {
            ItemState::Untracked => "untracked",
            ItemState::UntrackedMissing => "untracked-missing",
            ItemState::Added => "added",
            ItemState::Modified => "modified",
            ItemState::Removed => "removed",
            ItemState::Conflicted => "conflicted",
            ItemState::UpToDate => "up-to-date",
            ItemState::Missing => "missing",
        }
    }

    /// Returns `true` if an item in this state carries changes a commit
    /// would record.
    pub fn is_committable(&self) -> bool {
        matches!(
            self,
            ItemState::Added | ItemState::Modified | ItemState::Removed
        )
    }

    /// Returns `true` if the repository knows about the item.
    pub fn is_tracked(&self) -> bool {
        !matches!(self, ItemState::Untracked | ItemState::UntrackedMissing)
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a tracked item represents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    /// An ordinary file.
    #[default]
    File,
    /// The synthetic entry standing for a whole project definition.
    Project,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_up_to_date() {
        assert_eq!(ItemState::default(), ItemState::UpToDate);
    }

    #[test]
    fn labels_are_unique() {
        let mut labels: Vec<_> = ItemState::ALL.iter().map(|s| s.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), ItemState::ALL.len());
    }

    #[test]
    fn committable_states() {
        assert!(ItemState::Added.is_committable());
        assert!(ItemState::Modified.is_committable());
        assert!(ItemState::Removed.is_committable());
        assert!(!ItemState::Untracked.is_committable());
        assert!(!ItemState::UpToDate.is_committable());
        assert!(!ItemState::Conflicted.is_committable());
    }

    #[test]
    fn untracked_states_are_not_tracked() {
        assert!(!ItemState::Untracked.is_tracked());
        assert!(!ItemState::UntrackedMissing.is_tracked());
        assert!(ItemState::Missing.is_tracked());
    }

    #[test]
    fn serde_uses_kebab_labels() {
        let json = serde_json::to_string(&ItemState::UntrackedMissing).unwrap();
        assert_eq!(json, "\"untracked-missing\"");
        let back: ItemState = serde_json::from_str("\"up-to-date\"").unwrap();
        assert_eq!(back, ItemState::UpToDate);
    }
}
