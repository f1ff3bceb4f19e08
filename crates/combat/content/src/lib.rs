//! Data-driven encounter definitions.
//!
//! Encounters (who fights, their stats, who targets whom, and the flavor
//! lines they mutter) live in RON files and are turned into `combat-core`
//! types here. A stock encounter ships with the crate, see
//! [`default_encounter`].

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ActorSpec, AmbientSpec, Encounter, EncounterLoader, EncounterSpec, LoadResult,
    default_encounter,
};
