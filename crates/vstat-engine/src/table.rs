//! Explicit table of open collections.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::info;
use vstat_types::{CollectionId, ItemState};

use crate::controller::JobController;
use crate::error::{EngineError, EngineResult};

/// Per-collection engine state.
#[derive(Debug)]
pub struct Collection {
    root: PathBuf,
    controller: JobController,
    project_state: Option<ItemState>,
}

impl Collection {
    pub fn new(root: PathBuf, controller: JobController) -> Self {
        Self {
            root,
            controller,
            project_state: None,
        }
    }

    /// The repository working directory the collection is matched against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn controller(&self) -> &JobController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut JobController {
        &mut self.controller
    }

    /// Last applied state of the collection's project entry, if any.
    pub fn project_state(&self) -> Option<ItemState> {
        self.project_state
    }

    pub fn set_project_state(&mut self, state: ItemState) {
        self.project_state = Some(state);
    }
}

/// Open collections keyed by identity.
#[derive(Debug, Default)]
pub struct CollectionTable {
    collections: BTreeMap<CollectionId, Collection>,
}

impl CollectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collection. Fails if `id` is already open.
    pub fn create(&mut self, id: CollectionId, collection: Collection) -> EngineResult<&mut Collection> {
        use std::collections::btree_map::Entry;
        match self.collections.entry(id) {
            Entry::Occupied(entry) => Err(EngineError::DuplicateCollection(entry.key().clone())),
            Entry::Vacant(entry) => {
                info!(collection = %entry.key(), root = %collection.root.display(), "collection opened");
                Ok(entry.insert(collection))
            }
        }
    }

    pub fn get(&self, id: &CollectionId) -> Option<&Collection> {
        self.collections.get(id)
    }

    pub fn get_mut(&mut self, id: &CollectionId) -> Option<&mut Collection> {
        self.collections.get_mut(id)
    }

    pub fn contains(&self, id: &CollectionId) -> bool {
        self.collections.contains_key(id)
    }

    /// Remove a collection, first cancelling and joining its scan.
    pub fn remove(&mut self, id: &CollectionId) -> EngineResult<Collection> {
        let mut collection = self
            .collections
            .remove(id)
            .ok_or_else(|| EngineError::UnknownCollection(id.clone()))?;
        collection.controller.cancel_and_wait();
        info!(collection = %id, "collection closed");
        Ok(collection)
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Identities of every open collection, in order.
    pub fn ids(&self) -> impl Iterator<Item = &CollectionId> {
        self.collections.keys()
    }
}
