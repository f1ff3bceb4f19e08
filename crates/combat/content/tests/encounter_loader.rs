use std::io::Write;
use std::time::Duration;

use combat_content::{EncounterLoader, default_encounter};
use combat_core::{
    ActorState, Arena, Control, EncounterOutcome, NullSink, SequenceRandom, VirtualClock,
};
use tempfile::NamedTempFile;

const ENCOUNTER: &str = r#"
EncounterSpec(
    decision_interval_ms: 500,
    idle_backoff_ms: 2000,
    actors: [
        ActorSpec(name: "Hero", control: Player, target: Some("Bones")),
        ActorSpec(name: "Bones", control: Autonomous, max_health: Some(40)),
    ],
    ambient: Some(AmbientSpec(general: ["creaks"])),
)
"#;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}

#[test]
fn loads_encounter_from_file() {
    let file = write_temp(ENCOUNTER);

    let encounter = EncounterLoader::load(file.path()).expect("encounter should load");

    assert_eq!(encounter.combat.decision_interval, Duration::from_millis(500));
    assert_eq!(encounter.combat.idle_backoff, Duration::from_secs(2));
    assert_eq!(encounter.roster.len(), 2);
    assert_eq!(encounter.roster.entries[0].target.as_deref(), Some("Bones"));
    assert_eq!(encounter.roster.entries[1].template.max_health, 40);
    assert_eq!(encounter.ambient.general, vec!["creaks".to_owned()]);
    assert!(encounter.ambient.wounded.is_empty());
}

#[test]
fn reports_the_failing_path() {
    let file = write_temp("EncounterSpec(actors: [ActorSpec(name: \"Hero\")])");

    let err = EncounterLoader::load(file.path()).unwrap_err();

    assert!(err.to_string().contains(&file.path().display().to_string()));
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let err = EncounterLoader::load(&dir.path().join("absent.ron")).unwrap_err();
    assert!(err.to_string().contains("Failed to read file"));
}

#[test]
fn loaded_encounter_populates_an_arena() {
    let file = write_temp(ENCOUNTER);
    let encounter = EncounterLoader::load(file.path()).unwrap();

    let mut arena = Arena::new(
        encounter.combat.clone(),
        VirtualClock::new(),
        SequenceRandom::default(),
        NullSink,
    )
    .with_ambient(encounter.ambient.clone());
    let ids = arena.populate(&encounter.roster).expect("roster resolves");

    let hero = arena.actor(ids[0]).unwrap();
    assert_eq!(hero.control(), Control::Player);
    assert_eq!(hero.target(), Some(ids[1]));

    arena.request_attack(ids[0]).expect("hero can attack");
    arena.advance(Duration::from_secs(2));
    assert_eq!(arena.actor(ids[1]).unwrap().health(), 20);
    assert_eq!(arena.actor(ids[0]).unwrap().state(), ActorState::Idle);

    arena.request_attack(ids[0]).unwrap();
    arena.advance(Duration::from_secs(2));
    assert_eq!(arena.outcome(), EncounterOutcome::HostilesDefeated);
}

#[test]
fn bundled_encounter_is_valid() {
    let encounter = default_encounter().expect("bundled encounter parses");

    let players = encounter
        .roster
        .entries
        .iter()
        .filter(|e| e.template.control == Control::Player)
        .count();
    assert_eq!(players, 1);
    assert!(encounter.roster.len() > players);
}
