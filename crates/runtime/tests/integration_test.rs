//! Integration tests for the runtime orchestration.

use std::time::Duration;

use armada_core::{
    AbilityAction, AbilityId, AbilitySetup, ClientEvent, GameError, GamePhase, PlayerId, Position,
    Scenario, ShipSetup, TeamId, TurnOrdering,
};
use armada_runtime::{Event, Runtime, RuntimeConfig, RuntimeError, Topic};
use tokio::sync::broadcast;

const RED: TeamId = TeamId(0);
const BLUE: TeamId = TeamId(1);
const A: PlayerId = PlayerId(0);
const B: PlayerId = PlayerId(1);

/// Two single-player teams, one ship each with a "nudge" move ability.
fn duel(timeout: Option<Duration>) -> (Scenario, AbilityId) {
    let mut builder = Scenario::builder(12, 4)
        .turn_ordering(TurnOrdering::Team)
        .turn_timeout(timeout)
        .seed(3);
    let mut nudge = None;
    for (name, x) in [("red", 0), ("blue", 10)] {
        let team = builder.add_team(name);
        let player = builder
            .add_player(team, format!("{name}-captain"))
            .expect("team exists");
        let ship = builder
            .add_ship(
                player,
                ShipSetup::new(format!("{name}-ship"), Position::new(x, 1)).with_vision_radius(1),
            )
            .expect("player exists");
        let ability = builder
            .add_ability(ship, AbilitySetup::new("nudge", AbilityAction::Move { dx: 0, dy: 1 }))
            .expect("ship exists");
        nudge.get_or_insert(ability);
    }
    let scenario = builder.build().expect("valid scenario");
    (scenario, nudge.expect("red ability declared"))
}

fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn client_events(events: &[Event]) -> Vec<&ClientEvent> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Dispatch(dispatch) => Some(&dispatch.event),
            Event::TurnTimedOut { .. } => None,
        })
        .collect()
}

#[tokio::test]
async fn commands_round_trip_through_the_worker() {
    let (scenario, nudge) = duel(None);
    let runtime = Runtime::start(RuntimeConfig::default(), scenario)
        .await
        .expect("runtime starts");
    let handle = runtime.handle();
    let mut blue_rx = handle.subscribe(Topic::Team(BLUE)).expect("blue topic");
    let mut red_rx = handle.subscribe(Topic::Team(RED)).expect("red topic");

    assert_eq!(handle.current_turn().await.unwrap(), Some(A));
    assert_eq!(handle.phase().await.unwrap(), GamePhase::Running);

    handle.use_ability(A, nudge).await.expect("red moves");
    let red = drain(&mut red_rx);
    assert!(
        client_events(&red)
            .iter()
            .any(|event| matches!(event, ClientEvent::ShipMoved { x: 0, y: 2, .. })),
        "red sees its own move: {red:?}"
    );
    // Blue does not see red's ship.
    assert!(client_events(&drain(&mut blue_rx)).is_empty());

    assert_eq!(handle.end_turn(A).await.unwrap(), Some(B));
    let blue = drain(&mut blue_rx);
    assert!(client_events(&blue).contains(&&ClientEvent::TurnChanged { player: Some(B) }));

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn rule_violations_come_back_as_game_errors() {
    let (scenario, nudge) = duel(None);
    let runtime = Runtime::start(RuntimeConfig::default(), scenario)
        .await
        .expect("runtime starts");
    let handle = runtime.handle();

    let err = handle.use_ability(B, nudge).await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Game(GameError::NotYourTurn {
            expected: Some(A),
            provided: B
        })
    ));
    assert!(err.severity().is_recoverable());

    assert!(matches!(
        handle.subscribe(Topic::Team(TeamId(7))),
        Err(RuntimeError::UnknownTopic(_))
    ));

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn sync_gives_joining_clients_the_full_state() {
    let (scenario, _) = duel(None);
    let runtime = Runtime::start(RuntimeConfig::default(), scenario)
        .await
        .expect("runtime starts");
    let handle = runtime.handle();

    let events = handle.sync(RED).await.expect("red exists");
    let ships = events
        .iter()
        .filter(|event| matches!(event, ClientEvent::ShipAppeared { .. }))
        .count();
    assert_eq!(ships, 1);
    assert_eq!(
        events.last(),
        Some(&ClientEvent::TurnChanged { player: Some(A) })
    );

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn game_over_is_published_to_every_team() {
    let (scenario, _) = duel(None);
    let runtime = Runtime::start(RuntimeConfig::default(), scenario)
        .await
        .expect("runtime starts");
    let handle = runtime.handle();
    let mut all_rx = handle.subscribe(Topic::All).expect("all topic");

    handle.eliminate_player(B).await.expect("b is in play");
    assert_eq!(
        handle.phase().await.unwrap(),
        GamePhase::Over { winner: Some(RED) }
    );

    let events = drain(&mut all_rx);
    let game_over: Vec<TeamId> = events
        .iter()
        .filter_map(|event| match event {
            Event::Dispatch(dispatch)
                if matches!(dispatch.event, ClientEvent::GameOver { .. }) =>
            {
                Some(dispatch.team)
            }
            _ => None,
        })
        .collect();
    assert_eq!(game_over, vec![RED, BLUE]);

    assert!(matches!(
        handle.end_turn(A).await,
        Err(RuntimeError::Game(GameError::GameOver))
    ));
    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn idle_turns_time_out() {
    let (scenario, _) = duel(Some(Duration::from_secs(30)));
    let runtime = Runtime::start(RuntimeConfig::default(), scenario)
        .await
        .expect("runtime starts");
    let handle = runtime.handle();
    let mut all_rx = handle.subscribe(Topic::All).expect("all topic");

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(handle.current_turn().await.unwrap(), Some(B));
    let events = drain(&mut all_rx);
    assert!(events.contains(&Event::TurnTimedOut { player: Some(A) }));

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(handle.current_turn().await.unwrap(), Some(A));

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn acting_resets_the_turn_timer() {
    let (scenario, _) = duel(Some(Duration::from_secs(30)));
    let runtime = Runtime::start(RuntimeConfig::default(), scenario)
        .await
        .expect("runtime starts");
    let handle = runtime.handle();

    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(handle.end_turn(A).await.unwrap(), Some(B));

    // Thirty seconds from the hand-over, not from the start.
    tokio::time::sleep(Duration::from_secs(25)).await;
    assert_eq!(handle.current_turn().await.unwrap(), Some(B));
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(handle.current_turn().await.unwrap(), Some(A));

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn disabled_timer_never_fires() {
    let (scenario, _) = duel(Some(Duration::from_secs(5)));
    let config = RuntimeConfig {
        enable_turn_timer: false,
        ..RuntimeConfig::default()
    };
    let runtime = Runtime::start(config, scenario)
        .await
        .expect("runtime starts");
    let handle = runtime.handle();

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(handle.current_turn().await.unwrap(), Some(A));

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn handles_fail_after_shutdown() {
    let (scenario, _) = duel(None);
    let runtime = Runtime::start(RuntimeConfig::default(), scenario)
        .await
        .expect("runtime starts");
    let handle = runtime.handle();

    runtime.shutdown().await.expect("clean shutdown");
    assert!(matches!(
        handle.current_turn().await,
        Err(RuntimeError::CommandChannelClosed | RuntimeError::ReplyChannelClosed(_))
    ));
}

#[tokio::test]
async fn dispatches_serialize_for_transport() {
    let (scenario, _) = duel(None);
    let runtime = Runtime::start(RuntimeConfig::default(), scenario)
        .await
        .expect("runtime starts");
    let handle = runtime.handle();
    let mut red_rx = handle.subscribe(Topic::Team(RED)).expect("red topic");

    handle.end_turn(A).await.expect("a holds the turn");
    let event = red_rx.try_recv().expect("turn change dispatched");
    let json = serde_json::to_value(&event).expect("serializable");
    assert_eq!(json["Dispatch"]["event"]["type"], "turn_changed");

    runtime.shutdown().await.expect("clean shutdown");
}
