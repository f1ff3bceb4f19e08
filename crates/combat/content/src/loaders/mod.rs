//! Content loaders for reading encounter data from files.

pub mod encounter;

pub use encounter::{ActorSpec, AmbientSpec, Encounter, EncounterLoader, EncounterSpec};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

const DEFAULT_ENCOUNTER: &str = include_str!("../../data/encounter.ron");

/// The encounter bundled with the crate: one player against two skeletons.
pub fn default_encounter() -> LoadResult<Encounter> {
    EncounterLoader::from_str(DEFAULT_ENCOUNTER)
}
