use crate::board::Position;
use crate::ids::{AbilityId, ObjectRef, PlayerId, TeamId};

use super::EventName;

/// Payload carried alongside a queued event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventDetail {
    None,
    /// Turn handed over; `player` is the outgoing player for `TurnEnd` and the
    /// incoming player for `TurnStart`.
    Turn { player: Option<PlayerId> },
    Moved { from: Position, to: Position },
    Rotated { from: u8, to: u8 },
    AbilityUsed { ability: AbilityId, player: PlayerId },
    PlayerLost { player: PlayerId },
    TeamLost { team: TeamId },
    GameOver { winner: Option<TeamId> },
}

/// Context handed to every listener invocation of one queued event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub name: EventName,
    pub source: ObjectRef,
    pub detail: EventDetail,
}

impl EventContext {
    pub fn new(name: impl Into<EventName>, source: ObjectRef, detail: EventDetail) -> Self {
        Self {
            name: name.into(),
            source,
            detail,
        }
    }

    /// Context without payload.
    pub fn bare(name: impl Into<EventName>, source: ObjectRef) -> Self {
        Self::new(name, source, EventDetail::None)
    }

    /// Player named by a turn, ability or elimination payload.
    pub fn player(&self) -> Option<PlayerId> {
        match self.detail {
            EventDetail::Turn { player } => player,
            EventDetail::AbilityUsed { player, .. } | EventDetail::PlayerLost { player } => {
                Some(player)
            }
            _ => None,
        }
    }
}
