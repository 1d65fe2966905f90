//! Client-facing records produced by the engine.
//!
//! The engine never talks to a transport. It appends [`Dispatch`] records to
//! the scenario outbox and the host drains them after every request.

use crate::attributes::{AttributeDiff, AttributeInfo};
use crate::board::Position;
use crate::ids::{AbilityId, PlayerId, TeamId, TrackingId};
use crate::objects::Ship;

/// Object an attribute payload belongs to, as a client may name it.
///
/// Ships are always named by the receiving team's tracking id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OwnerRef {
    Team(TeamId),
    Player(PlayerId),
    Ship(TrackingId),
    Ability(AbilityId),
}

/// Full state of a ship as revealed to a team that just gained sight of it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShipSnapshot {
    pub name: String,
    pub team: TeamId,
    pub owner: PlayerId,
    pub position: Position,
    pub rotation: u8,
    pub cells: Vec<(i32, i32)>,
    pub attributes: Vec<AttributeInfo>,
}

impl ShipSnapshot {
    pub(crate) fn capture(ship: &Ship, attributes: Vec<AttributeInfo>) -> Self {
        Self {
            name: ship.name().to_owned(),
            team: ship.team(),
            owner: ship.owner(),
            position: ship.position(),
            rotation: ship.rotation(),
            cells: ship.shape().cells().collect(),
            attributes,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum ClientEvent {
    ShipAppeared {
        tracking_id: TrackingId,
        ship: ShipSnapshot,
    },
    ShipMoved {
        tracking_id: TrackingId,
        x: i32,
        y: i32,
    },
    ShipRotated {
        tracking_id: TrackingId,
        rotation: u8,
    },
    AttributesChanged {
        owner: OwnerRef,
        changes: AttributeDiff,
    },
    AttributeInfo {
        owner: OwnerRef,
        attributes: Vec<AttributeInfo>,
    },
    AbilityUsed {
        player: PlayerId,
        ability: AbilityId,
    },
    TurnChanged {
        player: Option<PlayerId>,
    },
    PlayerLost {
        player: PlayerId,
    },
    TeamLost {
        team: TeamId,
    },
    GameOver {
        winner: Option<TeamId>,
    },
}

/// One client event addressed to every member of a team but one.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dispatch {
    pub team: TeamId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub excluded_player: Option<PlayerId>,
    pub event: ClientEvent,
}

impl Dispatch {
    /// Returns true if `player` of `team` should receive this dispatch.
    pub fn is_for(&self, team: TeamId, player: Option<PlayerId>) -> bool {
        self.team == team && (player.is_none() || player != self.excluded_player)
    }
}
