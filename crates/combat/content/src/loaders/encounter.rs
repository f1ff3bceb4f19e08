//! Encounter loader.
//!
//! Reads an [`EncounterSpec`] from RON and resolves it into core types. Stats
//! left out of an [`ActorSpec`] fall back to the stock profile for its
//! control kind.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail};
use combat_core::{AmbientLines, ActorTemplate, CombatConfig, Control, Roster, RosterEntry};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// One actor as written in an encounter file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSpec {
    pub name: String,
    pub control: Control,
    #[serde(default)]
    pub max_health: Option<u32>,
    #[serde(default)]
    pub damage: Option<u32>,
    #[serde(default)]
    pub action_time_ms: Option<u64>,
    /// Name of the actor this one starts out targeting.
    #[serde(default)]
    pub target: Option<String>,
}

impl ActorSpec {
    fn template(&self) -> ActorTemplate {
        let mut template = ActorTemplate::for_control(self.name.clone(), self.control);
        if let Some(max_health) = self.max_health {
            template = template.with_max_health(max_health);
        }
        if let Some(damage) = self.damage {
            template = template.with_damage(damage);
        }
        if let Some(ms) = self.action_time_ms {
            template = template.with_action_time(Duration::from_millis(ms));
        }
        template
    }
}

/// Flavor-line pools as written in an encounter file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbientSpec {
    #[serde(default)]
    pub general: Vec<String>,
    #[serde(default)]
    pub healthy: Vec<String>,
    #[serde(default)]
    pub wounded: Vec<String>,
    #[serde(default)]
    pub critical: Vec<String>,
}

impl From<AmbientSpec> for AmbientLines {
    fn from(spec: AmbientSpec) -> Self {
        AmbientLines {
            general: spec.general,
            healthy: spec.healthy,
            wounded: spec.wounded,
            critical: spec.critical,
        }
    }
}

fn default_decision_interval_ms() -> u64 {
    CombatConfig::DEFAULT_DECISION_INTERVAL.as_millis() as u64
}

fn default_idle_backoff_ms() -> u64 {
    CombatConfig::DEFAULT_IDLE_BACKOFF.as_millis() as u64
}

/// Top-level layout of an encounter file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterSpec {
    #[serde(default = "default_decision_interval_ms")]
    pub decision_interval_ms: u64,
    #[serde(default = "default_idle_backoff_ms")]
    pub idle_backoff_ms: u64,
    pub actors: Vec<ActorSpec>,
    /// Omitting the whole section uses the built-in lines. A present section
    /// replaces them, so pools it leaves out stay empty.
    #[serde(default)]
    pub ambient: Option<AmbientSpec>,
}

/// A resolved encounter, ready to populate an arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Encounter {
    pub combat: CombatConfig,
    pub roster: Roster,
    pub ambient: AmbientLines,
}

/// Loader for encounters from RON files.
pub struct EncounterLoader;

impl EncounterLoader {
    /// Load and validate an encounter from a RON file.
    pub fn load(path: &Path) -> LoadResult<Encounter> {
        let content = read_file(path)?;
        Self::from_str(&content)
            .map_err(|e| anyhow!("Invalid encounter {}: {}", path.display(), e))
    }

    /// Parse and validate an encounter from RON text.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> LoadResult<Encounter> {
        let spec: EncounterSpec = ron::from_str(content)
            .map_err(|e| anyhow!("Failed to parse encounter RON: {}", e))?;
        Self::resolve(spec)
    }

    /// Checks names and targets, then converts to core types.
    ///
    /// Rejects an empty actor list, empty or duplicate names, unknown target
    /// names, and zero loop delays.
    pub fn resolve(spec: EncounterSpec) -> LoadResult<Encounter> {
        if spec.actors.is_empty() {
            bail!("Encounter has no actors");
        }
        if spec.decision_interval_ms == 0 {
            bail!("decision_interval_ms must be positive");
        }
        if spec.idle_backoff_ms == 0 {
            bail!("idle_backoff_ms must be positive");
        }

        let mut names = HashSet::new();
        for actor in &spec.actors {
            if actor.name.trim().is_empty() {
                bail!("Actor names must not be empty");
            }
            if !names.insert(actor.name.as_str()) {
                bail!("Duplicate actor name '{}'", actor.name);
            }
        }
        for actor in &spec.actors {
            if let Some(target) = &actor.target {
                if !names.contains(target.as_str()) {
                    bail!("Actor '{}' targets unknown actor '{}'", actor.name, target);
                }
            }
        }

        let roster = spec.actors.iter().fold(Roster::new(), |roster, actor| {
            let entry = RosterEntry::new(actor.template());
            roster.with(match &actor.target {
                Some(target) => entry.targeting(target.clone()),
                None => entry,
            })
        });

        let combat = CombatConfig::new()
            .with_decision_interval(Duration::from_millis(spec.decision_interval_ms))
            .with_idle_backoff(Duration::from_millis(spec.idle_backoff_ms));

        tracing::debug!(actors = roster.len(), "encounter resolved");

        Ok(Encounter {
            combat,
            roster,
            ambient: spec.ambient.map(AmbientLines::from).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_stats_use_stock_profiles() {
        let encounter = EncounterLoader::from_str(
            r#"EncounterSpec(actors: [
                ActorSpec(name: "Hero", control: Player),
                ActorSpec(name: "Bones", control: Autonomous, damage: Some(9)),
            ])"#,
        )
        .unwrap();

        let hero = &encounter.roster.entries[0].template;
        assert_eq!(hero.damage, ActorTemplate::PLAYER_DAMAGE);
        assert_eq!(hero.action_time, ActorTemplate::PLAYER_ACTION_TIME);

        let bones = &encounter.roster.entries[1].template;
        assert_eq!(bones.damage, 9);
        assert_eq!(bones.action_time, ActorTemplate::CREATURE_ACTION_TIME);

        assert_eq!(encounter.combat, CombatConfig::default());
        assert_eq!(encounter.ambient, AmbientLines::default());
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = EncounterLoader::from_str(
            r#"EncounterSpec(actors: [
                ActorSpec(name: "Bones", control: Autonomous),
                ActorSpec(name: "Bones", control: Autonomous),
            ])"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate actor name 'Bones'"));
    }

    #[test]
    fn rejects_unknown_targets() {
        let err = EncounterLoader::from_str(
            r#"EncounterSpec(actors: [
                ActorSpec(name: "Hero", control: Player, target: Some("Ghost")),
            ])"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown actor 'Ghost'"));
    }

    #[test]
    fn rejects_zero_loop_delays() {
        let err = EncounterLoader::from_str(
            r#"EncounterSpec(idle_backoff_ms: 0, actors: [
                ActorSpec(name: "Bones", control: Autonomous),
            ])"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("idle_backoff_ms must be positive"));

        let err = EncounterLoader::from_str(
            r#"EncounterSpec(decision_interval_ms: 0, actors: [
                ActorSpec(name: "Bones", control: Autonomous),
            ])"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("decision_interval_ms must be positive"));
    }

    #[test]
    fn rejects_empty_encounters() {
        assert!(EncounterLoader::from_str("EncounterSpec(actors: [])").is_err());
    }
}
