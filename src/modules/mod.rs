//! Module metadata registry
//!
//! Every module the host compiles receives a [`ScriptId`]. The registry maps
//! that id to the module's metadata (its resolved URL) so that code holding
//! only a call-stack frame can name the file it came from.
//!
//! Entries are inserted once, when the module is compiled, and are read-only
//! afterwards.
//!
//! # Example
//! ```
//! use verity::modules::{ModuleRegistry, ScriptId};
//!
//! let mut registry = ModuleRegistry::new();
//! registry.register(ScriptId(1), "/project/math.test.js").unwrap();
//! assert_eq!(registry.url_of(ScriptId(1)), Some("/project/math.test.js"));
//! ```

use rustc_hash::FxHashMap as HashMap;
use std::fmt;

/// Identifier assigned by the host to each compiled module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptId(pub u32);

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Module registry error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    /// The script id already has metadata
    AlreadyRegistered(ScriptId),
    /// Another script was already compiled from this URL
    DuplicateUrl(String),
    /// No metadata for the script id
    UnknownScript(ScriptId),
}

impl fmt::Display for ModuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRegistered(id) => write!(f, "script {} is already registered", id),
            Self::DuplicateUrl(url) => write!(f, "module already compiled: {}", url),
            Self::UnknownScript(id) => write!(f, "no module metadata for script {}", id),
        }
    }
}

impl std::error::Error for ModuleError {}

impl From<ModuleError> for crate::Error {
    fn from(err: ModuleError) -> Self {
        crate::Error::ModuleError(err.to_string())
    }
}

pub type ModuleResult<T> = Result<T, ModuleError>;

/// Metadata recorded for a compiled module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMetadata {
    /// Fully resolved module URL
    pub url: String,
}

/// Owned registry of module metadata, keyed by script id
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    entries: HashMap<ScriptId, ModuleMetadata>,
    by_url: HashMap<String, ScriptId>,
}

impl ModuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the metadata for a freshly compiled module
    pub fn register(&mut self, id: ScriptId, url: impl Into<String>) -> ModuleResult<()> {
        let url = url.into();
        if self.entries.contains_key(&id) {
            return Err(ModuleError::AlreadyRegistered(id));
        }
        if self.by_url.contains_key(&url) {
            return Err(ModuleError::DuplicateUrl(url));
        }
        tracing::trace!(script = %id, url = %url, "registered module metadata");
        self.by_url.insert(url.clone(), id);
        self.entries.insert(id, ModuleMetadata { url });
        Ok(())
    }

    /// Look up the metadata for a script
    pub fn lookup(&self, id: ScriptId) -> ModuleResult<&ModuleMetadata> {
        self.entries.get(&id).ok_or(ModuleError::UnknownScript(id))
    }

    /// The module URL for a script, if registered
    pub fn url_of(&self, id: ScriptId) -> Option<&str> {
        self.entries.get(&id).map(|meta| meta.url.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ModuleRegistry::new();
        registry.register(ScriptId(3), "/a/b.js").unwrap();
        assert_eq!(registry.lookup(ScriptId(3)).unwrap().url, "/a/b.js");
        assert_eq!(registry.url_of(ScriptId(3)), Some("/a/b.js"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_url_is_set_once() {
        let mut registry = ModuleRegistry::new();
        registry.register(ScriptId(1), "/a.js").unwrap();
        assert_eq!(
            registry.register(ScriptId(1), "/b.js"),
            Err(ModuleError::AlreadyRegistered(ScriptId(1)))
        );
        assert_eq!(registry.url_of(ScriptId(1)), Some("/a.js"));
    }

    #[test]
    fn test_duplicate_url_rejected() {
        let mut registry = ModuleRegistry::new();
        registry.register(ScriptId(1), "/a.js").unwrap();
        assert_eq!(
            registry.register(ScriptId(2), "/a.js"),
            Err(ModuleError::DuplicateUrl("/a.js".to_string()))
        );
    }

    #[test]
    fn test_unknown_script() {
        let registry = ModuleRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(
            registry.lookup(ScriptId(9)),
            Err(ModuleError::UnknownScript(ScriptId(9)))
        );
        assert!(registry.url_of(ScriptId(9)).is_none());
    }
}
