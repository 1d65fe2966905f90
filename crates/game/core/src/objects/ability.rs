use crate::attributes::{AttributeKey, AttributeWatcher, Builtin};
use crate::events::{AbilityEvent, Registrar};
use crate::ids::{AbilityId, ShipId};

/// What an ability does when its built-in `AbilityUsed` listener runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AbilityAction {
    /// Only raises the event; triggers do the work.
    #[default]
    None,
    /// Moves the ship by a relative offset.
    Move { dx: i32, dy: i32 },
    /// Rotates the ship clockwise.
    Rotate { quarter_turns: u8 },
    /// Adjusts an attribute of the ship carrying the ability.
    Adjust { attribute: AttributeKey, delta: i64 },
    /// Ends the user's turn once the pass completes.
    EndTurn,
}

/// An action attached to a ship.
#[derive(Debug)]
pub struct Ability {
    pub(crate) id: AbilityId,
    pub(crate) name: String,
    pub(crate) ship: ShipId,
    pub(crate) registrar: Registrar<AbilityEvent>,
    pub(crate) attributes: AttributeWatcher,
    pub(crate) action: AbilityAction,
    pub(crate) uses_per_turn: Option<u32>,
}

impl Ability {
    pub fn id(&self) -> AbilityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ship(&self) -> ShipId {
        self.ship
    }

    pub fn registrar(&self) -> Registrar<AbilityEvent> {
        self.registrar
    }

    pub fn attributes(&self) -> &AttributeWatcher {
        &self.attributes
    }

    pub fn action(&self) -> &AbilityAction {
        &self.action
    }

    pub fn uses_per_turn(&self) -> Option<u32> {
        self.uses_per_turn
    }

    /// Cached usability, recomputed at turn start and after every use.
    pub fn is_usable(&self) -> bool {
        self.attributes.builtin(Builtin::Usable).unwrap_or(0) != 0
    }

    pub fn uses_this_turn(&self) -> u32 {
        self.attributes
            .builtin(Builtin::UsesThisTurn)
            .map_or(0, |uses| uses.max(0) as u32)
    }

    pub(crate) fn has_uses_left(&self) -> bool {
        self.uses_per_turn
            .is_none_or(|limit| self.uses_this_turn() < limit)
    }
}
