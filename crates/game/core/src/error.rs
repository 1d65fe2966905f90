//! Error types surfaced by gameplay entry points and scenario construction.
//!
//! Event passes themselves never fail; the only abnormal outcome inside a pass
//! is the cooperative terminate flag. Everything here is raised before any
//! state is touched.

use crate::board::Position;
use crate::events::EventName;
use crate::ids::{AbilityId, ObjectRef, PlayerId, ShipId, TeamId};

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The request may succeed later (e.g. on the player's own turn).
    Recoverable,
    /// The request is malformed and should not be retried unchanged.
    Validation,
    /// The game can no longer accept the request.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Rejection of a gameplay request.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameError {
    #[error("the game is over")]
    GameOver,

    #[error("the game has not started")]
    NotStarted,

    #[error("the game has already started")]
    AlreadyStarted,

    #[error("not your turn: expected {expected:?}, got {provided}")]
    NotYourTurn {
        expected: Option<PlayerId>,
        provided: PlayerId,
    },

    #[error("{0} has already lost")]
    PlayerLost(PlayerId),

    #[error("unknown team {0}")]
    UnknownTeam(TeamId),

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("unknown ship {0}")]
    UnknownShip(ShipId),

    #[error("unknown ability {0}")]
    UnknownAbility(AbilityId),

    #[error("{ability} is not owned by {player}")]
    AbilityNotOwned { ability: AbilityId, player: PlayerId },

    #[error("{0} cannot be used right now")]
    AbilityUnavailable(AbilityId),

    #[error("{ship} cannot be placed at ({}, {})", .position.x, .position.y)]
    PlacementBlocked { ship: ShipId, position: Position },

    #[error("every player has lost")]
    NoActivePlayers,
}

impl GameError {
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::GameOver | Self::NoActivePlayers | Self::PlayerLost(_) => ErrorSeverity::Fatal,
            Self::NotYourTurn { .. }
            | Self::AbilityUnavailable(_)
            | Self::PlacementBlocked { .. }
            | Self::NotStarted => ErrorSeverity::Recoverable,
            Self::AlreadyStarted
            | Self::UnknownTeam(_)
            | Self::UnknownPlayer(_)
            | Self::UnknownShip(_)
            | Self::UnknownAbility(_)
            | Self::AbilityNotOwned { .. } => ErrorSeverity::Validation,
        }
    }
}

/// Inconsistency detected while linking a scenario.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("board must have a non-zero size, got {width}x{height}")]
    EmptyBoard { width: u32, height: u32 },

    #[error("unknown team {0}")]
    UnknownTeam(TeamId),

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("unknown ship {0}")]
    UnknownShip(ShipId),

    #[error("unknown object {0}")]
    UnknownObject(ObjectRef),

    #[error("{ship} has an empty shape")]
    EmptyShape { ship: ShipId },

    #[error("{ship} has vision radius {radius}, the limit is {max}")]
    VisionTooLarge { ship: ShipId, radius: u32, max: u32 },

    #[error("{ship} does not fit on the board at ({}, {})", .position.x, .position.y)]
    ShipOffBoard { ship: ShipId, position: Position },

    #[error("{ship} overlaps {other} at ({}, {})", .position.x, .position.y)]
    ShipsOverlap {
        ship: ShipId,
        other: ShipId,
        position: Position,
    },

    #[error("no players to build a turn order from")]
    EmptyTurnOrder,

    #[error("trigger on {owner} cannot listen for `{event}`")]
    TriggerOutOfScope { owner: ObjectRef, event: EventName },

    #[error("{owner} has no attribute `{key}`")]
    UnknownAttribute { owner: ObjectRef, key: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_errors_are_recoverable() {
        let err = GameError::NotYourTurn {
            expected: Some(PlayerId(0)),
            provided: PlayerId(1),
        };
        assert!(err.severity().is_recoverable());
        assert_eq!(
            err.to_string(),
            "not your turn: expected Some(PlayerId(0)), got player#1"
        );
        assert!(!GameError::GameOver.severity().is_recoverable());
    }
}
