//! Collection identity.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Identity of a tracked collection.
///
/// A collection is usually one open project, identified by the path of its
/// project file, but any stable string works.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(String);

impl CollectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identify a collection by a filesystem path (lossy for non-UTF-8).
    pub fn from_path(path: &Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CollectionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_path_and_str_agree() {
        let a = CollectionId::from_path(Path::new("/projects/app.cbp"));
        let b = CollectionId::from("/projects/app.cbp");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "/projects/app.cbp");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = CollectionId::new("demo");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"demo\"");
    }
}
