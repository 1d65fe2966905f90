use crate::attributes::AttributeKey;
use crate::events::{EventName, Priority};

/// Data-driven reaction attached to a team, player, ship or ability.
///
/// The effect applies to the object the trigger is attached to.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trigger {
    pub event: EventName,
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: Priority,
    pub effect: TriggerEffect,
    /// Only fire when the event names a player on the owner's side.
    #[cfg_attr(feature = "serde", serde(default))]
    pub own_turn_only: bool,
}

impl Trigger {
    pub fn new(event: impl Into<EventName>, priority: Priority, effect: TriggerEffect) -> Self {
        Self {
            event: event.into(),
            priority,
            effect,
            own_turn_only: false,
        }
    }

    pub fn own_turn_only(mut self) -> Self {
        self.own_turn_only = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TriggerEffect {
    Adjust { attribute: AttributeKey, delta: i64 },
    Set { attribute: AttributeKey, value: i64 },
    /// Eliminates the owning player(s) once the attribute drops to `threshold`.
    EliminateOwnerAtOrBelow { attribute: AttributeKey, threshold: i64 },
}

impl TriggerEffect {
    pub fn attribute(&self) -> &AttributeKey {
        match self {
            TriggerEffect::Adjust { attribute, .. }
            | TriggerEffect::Set { attribute, .. }
            | TriggerEffect::EliminateOwnerAtOrBelow { attribute, .. } => attribute,
        }
    }
}
