//! Registry for discovering document generators.

use std::collections::HashMap;

use crate::format::error::FormatError;
use crate::format::formats::{ArchiveFormat, JsonReportFormat};
use crate::format::traits::DocumentGenerator;

/// Registry of available document generators.
///
/// Built-in generators are registered on creation; others (a PDF layout
/// generator, for example) can be added with [`FormatRegistry::register`].
pub struct FormatRegistry {
    generators: HashMap<&'static str, Box<dyn DocumentGenerator>>,
}

impl FormatRegistry {
    /// Create a new registry with all built-in generators registered.
    pub fn new() -> Self {
        let mut registry = Self {
            generators: HashMap::new(),
        };

        registry.register(Box::new(JsonReportFormat));
        registry.register(Box::new(ArchiveFormat));

        registry
    }

    /// Register a generator, replacing any with the same id.
    pub fn register(&mut self, generator: Box<dyn DocumentGenerator>) {
        self.generators.insert(generator.id(), generator);
    }

    /// Get a generator by its id.
    pub fn get(&self, id: &str) -> Option<&dyn DocumentGenerator> {
        self.generators.get(id).map(|g| g.as_ref())
    }

    /// Get a generator by its id, or an error naming the id.
    pub fn require(&self, id: &str) -> Result<&dyn DocumentGenerator, FormatError> {
        self.get(id)
            .ok_or_else(|| FormatError::UnknownFormat(id.to_string()))
    }

    /// Find the generator producing files with this extension.
    pub fn by_extension(&self, ext: &str) -> Option<&dyn DocumentGenerator> {
        let ext = ext.trim_start_matches('.').to_lowercase();
        self.generators
            .values()
            .find(|g| g.extensions().iter().any(|e| *e == ext))
            .map(|g| g.as_ref())
    }

    /// Get all generator ids, sorted.
    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.generators.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}
