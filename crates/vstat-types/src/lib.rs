//! Foundation types for vstat.
//!
//! This crate holds the data model shared by the repository layer and the
//! synchronization engine. It has no knowledge of any particular repository
//! library.
//!
//! # Key Types
//!
//! - [`ItemState`] -- Semantic version-control state of one tracked entry
//! - [`ItemKind`] -- Whether an entry is a plain file or a project definition
//! - [`TrackedItem`] -- A filesystem entry under observation
//! - [`CollectionId`] -- Identity of a tracked collection (usually a project file)

pub mod collection;
pub mod item;
pub mod state;

pub use collection::CollectionId;
pub use item::TrackedItem;
pub use state::{ItemKind, ItemState};
