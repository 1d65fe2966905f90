use armada_core::{
    ClientEvent, Dispatch, Position, Scenario, ShipId, ShipSetup, TeamId, TrackingId,
};

const RED: TeamId = TeamId(0);
const BLUE: TeamId = TeamId(1);

/// Red scout at the origin with vision 3, blue target at (6, 0).
fn skirmish() -> (Scenario, ShipId, ShipId) {
    let mut builder = Scenario::builder(10, 10).seed(11);
    let red = builder.add_team("red");
    let blue = builder.add_team("blue");
    let a = builder.add_player(red, "a").expect("team exists");
    let b = builder.add_player(blue, "b").expect("team exists");
    let scout = builder
        .add_ship(a, ShipSetup::new("scout", Position::new(0, 0)).with_vision_radius(3))
        .expect("player exists");
    let target = builder
        .add_ship(b, ShipSetup::new("target", Position::new(6, 0)).with_vision_radius(1))
        .expect("player exists");

    let mut scenario = builder.build().expect("valid scenario");
    scenario.start().expect("fresh scenario starts");
    (scenario, scout, target)
}

fn appearances(dispatches: &[Dispatch], team: TeamId) -> Vec<TrackingId> {
    dispatches
        .iter()
        .filter(|d| d.team == team)
        .filter_map(|d| match &d.event {
            ClientEvent::ShipAppeared { tracking_id, .. } => Some(*tracking_id),
            _ => None,
        })
        .collect()
}

#[test]
fn owners_see_their_own_ships_at_start() {
    let (mut scenario, scout, target) = skirmish();
    let out = scenario.drain_outbox();

    let red_seen = appearances(&out, RED);
    let blue_seen = appearances(&out, BLUE);
    assert_eq!(red_seen.len(), 1);
    assert_eq!(blue_seen.len(), 1);
    assert_eq!(
        scenario.ship(scout).and_then(|s| s.tracking_id_for(RED)),
        red_seen.first().copied()
    );
    assert_eq!(
        scenario.ship(target).and_then(|s| s.tracking_id_for(RED)),
        None
    );
}

#[test]
fn ship_appears_once_per_newly_aware_team() {
    let (mut scenario, scout, target) = skirmish();
    scenario.drain_outbox();

    scenario
        .move_ship(scout, Position::new(3, 0))
        .expect("free tile");
    let out = scenario.drain_outbox();

    let red_seen = appearances(&out, RED);
    assert_eq!(red_seen.len(), 1, "exactly one appearance: {out:?}");
    assert!(appearances(&out, BLUE).is_empty());

    let target_id = scenario
        .ship(target)
        .and_then(|s| s.tracking_id_for(RED))
        .expect("red now knows the target");
    assert_eq!(red_seen[0], target_id);
    assert_eq!(
        scenario.ship(scout).map(|s| s.spotting().to_vec()),
        Some(vec![target])
    );
    assert_eq!(
        scenario.ship(target).map(|s| s.spotted_by().to_vec()),
        Some(vec![scout])
    );

    // The scout's own owner gets a move, with the scout's tracking id.
    let scout_id = scenario.ship(scout).and_then(|s| s.tracking_id_for(RED));
    assert!(out.iter().any(|d| d.team == RED
        && matches!(d.event, ClientEvent::ShipMoved { tracking_id, x: 3, y: 0 }
            if Some(tracking_id) == scout_id)));
}

#[test]
fn continuous_sight_keeps_the_tracking_id() {
    let (mut scenario, scout, target) = skirmish();
    scenario
        .move_ship(scout, Position::new(3, 0))
        .expect("free tile");
    let first = scenario.ship(target).and_then(|s| s.tracking_id_for(RED));
    scenario.drain_outbox();

    for to in [Position::new(4, 0), Position::new(4, 1), Position::new(5, 1)] {
        scenario.move_ship(scout, to).expect("free tile");
    }
    scenario
        .move_ship(target, Position::new(6, 1))
        .expect("free tile");
    let out = scenario.drain_outbox();

    assert!(appearances(&out, RED).is_empty(), "no re-appearance: {out:?}");
    assert_eq!(scenario.ship(target).and_then(|s| s.tracking_id_for(RED)), first);
    assert!(out.iter().any(|d| d.team == RED
        && matches!(d.event, ClientEvent::ShipMoved { tracking_id, x: 6, y: 1 }
            if Some(tracking_id) == first)));
}

#[test]
fn reacquired_ship_gets_a_fresh_tracking_id() {
    let (mut scenario, scout, target) = skirmish();
    scenario
        .move_ship(scout, Position::new(3, 0))
        .expect("free tile");
    let first = scenario
        .ship(target)
        .and_then(|s| s.tracking_id_for(RED))
        .expect("spotted");
    scenario.drain_outbox();

    scenario
        .move_ship(scout, Position::new(0, 0))
        .expect("free tile");
    let out = scenario.drain_outbox();
    assert_eq!(scenario.ship(target).and_then(|s| s.tracking_id_for(RED)), None);
    // Losing sight is silent.
    assert!(!out.iter().any(|d| d.team == RED
        && matches!(d.event, ClientEvent::ShipMoved { tracking_id, .. } if tracking_id == first)));

    scenario
        .move_ship(scout, Position::new(3, 0))
        .expect("free tile");
    let out = scenario.drain_outbox();
    let again = appearances(&out, RED);
    assert_eq!(again.len(), 1);
    assert_ne!(again[0], first);
}

#[test]
fn only_the_movers_sight_is_rescanned() {
    let (mut scenario, scout, target) = skirmish();
    scenario.drain_outbox();

    // The target (vision 1) moves next to the scout's sight but its own
    // sight does not reach the scout, and the scout does not rescan.
    scenario
        .move_ship(target, Position::new(3, 0))
        .expect("free tile");
    let out = scenario.drain_outbox();

    assert!(appearances(&out, RED).is_empty());
    assert!(appearances(&out, BLUE).is_empty());
    assert!(scenario.ship(scout).is_some_and(|s| s.spotting().is_empty()));

    // One more step and the target's own sight finds the scout.
    scenario
        .move_ship(target, Position::new(1, 0))
        .expect("free tile");
    let out = scenario.drain_outbox();
    assert_eq!(appearances(&out, BLUE).len(), 1);
    assert!(appearances(&out, RED).is_empty());
    assert_eq!(
        scenario.ship(scout).map(|s| s.spotted_by().to_vec()),
        Some(vec![target])
    );
}

#[test]
fn blocked_moves_are_rejected_without_side_effects() {
    let (mut scenario, scout, _) = skirmish();
    scenario.drain_outbox();

    let err = scenario.move_ship(scout, Position::new(6, 0)).unwrap_err();
    assert!(matches!(err, armada_core::GameError::PlacementBlocked { .. }));
    assert!(scenario.move_ship(scout, Position::new(-1, 0)).is_err());
    assert_eq!(
        scenario.ship(scout).map(|s| s.position()),
        Some(Position::new(0, 0))
    );
    assert!(scenario.drain_outbox().is_empty());
}
