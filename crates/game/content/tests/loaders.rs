use std::fs;
use std::path::PathBuf;

use armada_content::{ConfigLoader, ContentFactory, ScenarioLoader};
use armada_core::{
    AbilityAction, AttributeKey, GameConfig, ObjectRef, PlayerId, TeamId, TurnOrdering,
};

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../../data")
}

#[test]
fn bundled_duel_builds_and_plays() {
    let factory = ContentFactory::new(data_dir());
    let mut scenario = factory.build_scenario("duel").expect("bundled scenario");

    assert_eq!(scenario.ships().len(), 2);
    assert_eq!(scenario.abilities().len(), 5);
    assert_eq!(
        scenario.abilities()[0].action(),
        &AbilityAction::Move { dx: 1, dy: 0 }
    );
    assert_eq!(scenario.config().seed, 24301);

    scenario.start().expect("fresh scenario starts");
    let morale = AttributeKey::custom("morale");
    let team_morale = |s: &armada_core::Scenario| {
        s.attributes(ObjectRef::Team(TeamId(1)))
            .and_then(|watcher| watcher.get(&morale))
    };
    assert_eq!(team_morale(&scenario), Some(1));

    // The first move burns fuel through the ship's trigger.
    let ahead = scenario.abilities()[0].id();
    scenario
        .use_ability(PlayerId(0), ahead)
        .expect("ahead is usable");
    let fuel = scenario
        .attributes(ObjectRef::Ship(scenario.abilities()[0].ship()))
        .and_then(|watcher| watcher.get(&AttributeKey::custom("fuel")));
    assert_eq!(fuel, Some(5));
}

#[test]
fn config_and_scenario_files_round_out_a_data_dir() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::create_dir(dir.path().join("scenarios")).expect("scenarios dir");
    fs::write(
        dir.path().join("config.toml"),
        "turn_ordering = \"team\"\nturn_timeout_secs = 5\n",
    )
    .expect("write config");
    fs::write(
        dir.path().join("scenarios/skirmish.ron"),
        r#"(
            name: "skirmish",
            board: (width: 4, height: 4),
            teams: [
                (name: "a", players: [(name: "a1"), (name: "a2")]),
                (name: "b", players: [(name: "b1")]),
            ],
        )"#,
    )
    .expect("write scenario");

    let factory = ContentFactory::new(dir.path());
    let config = factory.load_config().expect("config parses");
    assert_eq!(config.turn_ordering, TurnOrdering::Team);
    assert_eq!(config.turn_timeout_secs, Some(5));
    assert_eq!(config.seed, GameConfig::DEFAULT_SEED);

    let scenario = factory.build_scenario("skirmish").expect("builds");
    assert_eq!(
        scenario.turns().turn_order(),
        &[PlayerId(0), PlayerId(1), PlayerId(2)]
    );
    assert_eq!(
        scenario.turns().turn_timeout(),
        Some(std::time::Duration::from_secs(5))
    );
}

#[test]
fn parse_errors_name_the_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("broken.ron");
    fs::write(&path, "(name: \"broken\", board: (width: 4))").expect("write scenario");

    let err = ScenarioLoader::load(&path).unwrap_err().to_string();
    assert!(err.contains("Failed to parse scenario RON"));
    assert!(err.contains("broken.ron"));

    let err = ConfigLoader::load(&dir.path().join("missing.toml"))
        .unwrap_err()
        .to_string();
    assert!(err.contains("Failed to read file"));
}
