//! Tracked items and relative-path derivation.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::state::{ItemKind, ItemState};

/// A filesystem entry whose version-control state is being maintained.
///
/// The path is fixed for the item's lifetime; only the state changes. It may
/// be absolute, or relative to the repository root it is matched against.
///
/// `TrackedItem` is deliberately not `Clone`: a full scan takes ownership of
/// the items it reconciles and hands them back with their new state, so
/// there is never a second copy being mutated elsewhere.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedItem {
    path: PathBuf,
    kind: ItemKind,
    state: ItemState,
}

impl TrackedItem {
    /// Create a tracked file in the default state.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: ItemKind::File,
            state: ItemState::default(),
        }
    }

    /// Create the synthetic entry for a project definition file.
    pub fn project(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: ItemKind::Project,
            state: ItemState::default(),
        }
    }

    /// Builder-style initial state.
    pub fn with_state(mut self, state: ItemState) -> Self {
        self.state = state;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn state(&self) -> ItemState {
        self.state
    }

    /// Replace the state. Returns `true` if it changed.
    pub fn set_state(&mut self, state: ItemState) -> bool {
        let changed = self.state != state;
        self.state = state;
        changed
    }

    /// Derive the item's path relative to `root`, in repository form
    /// (`/`-separated, no leading `./`).
    ///
    /// Returns `None` when the path lies outside `root`, walks upward with
    /// `..`, is not valid UTF-8, or is empty after stripping the root.
    pub fn relative_path(&self, root: &Path) -> Option<String> {
        let relative = if self.path.is_absolute() {
            self.path.strip_prefix(root).ok()?
        } else {
            self.path.as_path()
        };

        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_str()?),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("/"))
        }
    }

    /// The on-disk location of the item when matched against `root`.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        if self.path.is_absolute() {
            self.path.clone()
        } else {
            root.join(&self.path)
        }
    }
}
