//! Event catalogs per object kind.
//!
//! Every registrar in the tree receives the events of all its ancestors,
//! because queueing an event on a registrar fans out to its whole subtree.
//! Each kind's catalog therefore wraps its parent kind's catalog:
//!
//! ```text
//! ScenarioEvent ⊂ TeamEvent ⊂ PlayerEvent ⊂ ShipEvent ⊂ AbilityEvent
//! ```
//!
//! Registrar handles are typed by kind (see [`Registrar`](super::Registrar)),
//! so registering e.g. an [`AbilityEvent::AbilityUsed`] listener on a team
//! registrar is rejected at compile time. Internally all catalogs flatten into
//! the [`EventName`] key.

/// Flat key under which listeners are stored and events are queued.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EventName {
    GameStart,
    GameOver,
    TurnStart,
    TurnEnd,
    TeamLost,
    ForeignTeamLost,
    PlayerLost,
    ForeignPlayerLost,
    ShipMoved,
    ShipRotated,
    AbilityUsed,
}

impl EventName {
    /// Depth of the shallowest registrar kind whose catalog contains this
    /// event: 0 scenario, 1 team, 2 player, 3 ship, 4 ability.
    pub const fn depth(self) -> u8 {
        match self {
            EventName::GameStart
            | EventName::GameOver
            | EventName::TurnStart
            | EventName::TurnEnd => 0,
            EventName::TeamLost | EventName::ForeignTeamLost => 1,
            EventName::PlayerLost | EventName::ForeignPlayerLost => 2,
            EventName::ShipMoved | EventName::ShipRotated => 3,
            EventName::AbilityUsed => 4,
        }
    }
}

/// Marker for the per-kind event catalogs.
pub trait EventKind: Copy + Into<EventName> + 'static {}

/// Events understood by the scenario root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScenarioEvent {
    GameStart,
    GameOver,
    TurnStart,
    TurnEnd,
}

/// Events understood by team registrars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TeamEvent {
    Scenario(ScenarioEvent),
    /// Queued on the team that just lost.
    TeamLost,
    /// Queued on every other team when a team loses.
    ForeignTeamLost,
}

/// Events understood by player registrars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerEvent {
    Team(TeamEvent),
    PlayerLost,
    ForeignPlayerLost,
}

/// Events understood by ship registrars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShipEvent {
    Player(PlayerEvent),
    ShipMoved,
    ShipRotated,
}

/// Events understood by ability registrars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AbilityEvent {
    Ship(ShipEvent),
    AbilityUsed,
}

impl EventKind for ScenarioEvent {}
impl EventKind for TeamEvent {}
impl EventKind for PlayerEvent {}
impl EventKind for ShipEvent {}
impl EventKind for AbilityEvent {}

impl From<ScenarioEvent> for EventName {
    fn from(event: ScenarioEvent) -> Self {
        match event {
            ScenarioEvent::GameStart => EventName::GameStart,
            ScenarioEvent::GameOver => EventName::GameOver,
            ScenarioEvent::TurnStart => EventName::TurnStart,
            ScenarioEvent::TurnEnd => EventName::TurnEnd,
        }
    }
}

impl From<TeamEvent> for EventName {
    fn from(event: TeamEvent) -> Self {
        match event {
            TeamEvent::Scenario(inner) => inner.into(),
            TeamEvent::TeamLost => EventName::TeamLost,
            TeamEvent::ForeignTeamLost => EventName::ForeignTeamLost,
        }
    }
}

impl From<PlayerEvent> for EventName {
    fn from(event: PlayerEvent) -> Self {
        match event {
            PlayerEvent::Team(inner) => inner.into(),
            PlayerEvent::PlayerLost => EventName::PlayerLost,
            PlayerEvent::ForeignPlayerLost => EventName::ForeignPlayerLost,
        }
    }
}

impl From<ShipEvent> for EventName {
    fn from(event: ShipEvent) -> Self {
        match event {
            ShipEvent::Player(inner) => inner.into(),
            ShipEvent::ShipMoved => EventName::ShipMoved,
            ShipEvent::ShipRotated => EventName::ShipRotated,
        }
    }
}

impl From<AbilityEvent> for EventName {
    fn from(event: AbilityEvent) -> Self {
        match event {
            AbilityEvent::Ship(inner) => inner.into(),
            AbilityEvent::AbilityUsed => EventName::AbilityUsed,
        }
    }
}

impl From<ScenarioEvent> for TeamEvent {
    fn from(event: ScenarioEvent) -> Self {
        TeamEvent::Scenario(event)
    }
}

impl From<TeamEvent> for PlayerEvent {
    fn from(event: TeamEvent) -> Self {
        PlayerEvent::Team(event)
    }
}

impl From<ScenarioEvent> for PlayerEvent {
    fn from(event: ScenarioEvent) -> Self {
        PlayerEvent::Team(event.into())
    }
}

impl From<PlayerEvent> for ShipEvent {
    fn from(event: PlayerEvent) -> Self {
        ShipEvent::Player(event)
    }
}

impl From<TeamEvent> for ShipEvent {
    fn from(event: TeamEvent) -> Self {
        ShipEvent::Player(event.into())
    }
}

impl From<ScenarioEvent> for ShipEvent {
    fn from(event: ScenarioEvent) -> Self {
        ShipEvent::Player(event.into())
    }
}

impl From<ShipEvent> for AbilityEvent {
    fn from(event: ShipEvent) -> Self {
        AbilityEvent::Ship(event)
    }
}

impl From<PlayerEvent> for AbilityEvent {
    fn from(event: PlayerEvent) -> Self {
        AbilityEvent::Ship(event.into())
    }
}

impl From<TeamEvent> for AbilityEvent {
    fn from(event: TeamEvent) -> Self {
        AbilityEvent::Ship(event.into())
    }
}

impl From<ScenarioEvent> for AbilityEvent {
    fn from(event: ScenarioEvent) -> Self {
        AbilityEvent::Ship(event.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_events_flatten_to_their_own_name() {
        let turn_start: AbilityEvent = ScenarioEvent::TurnStart.into();
        assert_eq!(EventName::from(turn_start), EventName::TurnStart);

        let lost: ShipEvent = TeamEvent::TeamLost.into();
        assert_eq!(EventName::from(lost), EventName::TeamLost);
    }

    #[test]
    fn names_round_trip_through_strings() {
        assert_eq!(EventName::ForeignPlayerLost.as_ref(), "foreign_player_lost");
        assert_eq!(
            "Ship_Moved".parse::<EventName>().ok(),
            Some(EventName::ShipMoved)
        );
    }
}
