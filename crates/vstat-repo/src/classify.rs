//! Raw status to item state classification.
//!
//! Index (staged) changes dominate worktree changes. `CONFLICTED` ranks
//! below every index bit and above every worktree bit. Anything else,
//! including an empty set, `IGNORED`, or `CURRENT`, is up to date.

use git2::Status;
use vstat_types::ItemState;

/// Bits checked in order; the first one present decides the state.
const PRECEDENCE: [(Status, ItemState); 11] = [
    (Status::INDEX_NEW, ItemState::Added),
    (Status::INDEX_MODIFIED, ItemState::Modified),
    (Status::INDEX_RENAMED, ItemState::Modified),
    (Status::INDEX_TYPECHANGE, ItemState::Modified),
    (Status::INDEX_DELETED, ItemState::Removed),
    (Status::CONFLICTED, ItemState::Conflicted),
    (Status::WT_NEW, ItemState::Untracked),
    (Status::WT_MODIFIED, ItemState::Modified),
    (Status::WT_RENAMED, ItemState::Modified),
    (Status::WT_TYPECHANGE, ItemState::Modified),
    (Status::WT_DELETED, ItemState::Removed),
];

/// Classify a raw repository status bit-set.
///
/// Total and deterministic: every input maps to exactly one state.
pub fn classify(status: Status) -> ItemState {
    PRECEDENCE
        .iter()
        .find(|(bit, _)| status.intersects(*bit))
        .map(|(_, state)| *state)
        .unwrap_or(ItemState::UpToDate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_is_up_to_date() {
        assert_eq!(classify(Status::CURRENT), ItemState::UpToDate);
        assert_eq!(classify(Status::empty()), ItemState::UpToDate);
    }

    #[test]
    fn ignored_is_up_to_date() {
        assert_eq!(classify(Status::IGNORED), ItemState::UpToDate);
    }

    #[test]
    fn single_bits() {
        assert_eq!(classify(Status::INDEX_NEW), ItemState::Added);
        assert_eq!(classify(Status::INDEX_MODIFIED), ItemState::Modified);
        assert_eq!(classify(Status::INDEX_RENAMED), ItemState::Modified);
        assert_eq!(classify(Status::INDEX_TYPECHANGE), ItemState::Modified);
        assert_eq!(classify(Status::INDEX_DELETED), ItemState::Removed);
        assert_eq!(classify(Status::CONFLICTED), ItemState::Conflicted);
        assert_eq!(classify(Status::WT_NEW), ItemState::Untracked);
        assert_eq!(classify(Status::WT_MODIFIED), ItemState::Modified);
        assert_eq!(classify(Status::WT_RENAMED), ItemState::Modified);
        assert_eq!(classify(Status::WT_TYPECHANGE), ItemState::Modified);
        assert_eq!(classify(Status::WT_DELETED), ItemState::Removed);
    }

    #[test]
    fn staged_new_beats_worktree_modified() {
        assert_eq!(
            classify(Status::INDEX_NEW | Status::WT_MODIFIED),
            ItemState::Added
        );
    }

    #[test]
    fn staged_deleted_beats_conflicted() {
        assert_eq!(
            classify(Status::INDEX_DELETED | Status::CONFLICTED),
            ItemState::Removed
        );
    }

    #[test]
    fn conflicted_beats_worktree_new() {
        assert_eq!(
            classify(Status::CONFLICTED | Status::WT_NEW),
            ItemState::Conflicted
        );
        assert_eq!(
            classify(Status::CONFLICTED | Status::WT_DELETED),
            ItemState::Conflicted
        );
    }

    #[test]
    fn worktree_new_beats_worktree_modified() {
        assert_eq!(
            classify(Status::WT_NEW | Status::WT_MODIFIED),
            ItemState::Untracked
        );
    }

    proptest! {
        #[test]
        fn classification_is_total_and_deterministic(bits in any::<u32>()) {
            let status = Status::from_bits_truncate(bits);
            let first = classify(status);
            prop_assert_eq!(first, classify(status));
            prop_assert!(ItemState::ALL.contains(&first));
        }

        #[test]
        fn any_index_bit_dominates_worktree_bits(bits in any::<u32>()) {
            let worktree = Status::from_bits_truncate(bits)
                & (Status::WT_NEW
                    | Status::WT_MODIFIED
                    | Status::WT_RENAMED
                    | Status::WT_TYPECHANGE
                    | Status::WT_DELETED
                    | Status::CONFLICTED);
            prop_assert_eq!(classify(Status::INDEX_NEW | worktree), ItemState::Added);
        }
    }
}
