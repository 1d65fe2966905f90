use std::fmt;

macro_rules! object_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub(crate) const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $prefix, self.0)
            }
        }
    };
}

object_id!(
    /// Identifier of a team, allocated in declaration order.
    TeamId,
    "team"
);
object_id!(
    /// Identifier of a player slot.
    PlayerId,
    "player"
);
object_id!(
    /// Identifier of a ship. Ships are never removed from a scenario.
    ShipId,
    "ship"
);
object_id!(
    /// Identifier of an ability attached to a ship.
    AbilityId,
    "ability"
);

/// Opaque per-team name of a ship for the duration of one visibility episode.
///
/// Rival clients only ever see tracking ids, never [`ShipId`]s, so a ship that
/// drops out of sight and comes back cannot be correlated with its earlier
/// sighting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackingId(pub u64);

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Reference to any object that can originate events or own attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjectRef {
    Scenario,
    Team(TeamId),
    Player(PlayerId),
    Ship(ShipId),
    Ability(AbilityId),
}

impl ObjectRef {
    /// Depth of this object in the registrar tree (scenario root is 0).
    pub const fn depth(self) -> u8 {
        match self {
            ObjectRef::Scenario => 0,
            ObjectRef::Team(_) => 1,
            ObjectRef::Player(_) => 2,
            ObjectRef::Ship(_) => 3,
            ObjectRef::Ability(_) => 4,
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectRef::Scenario => write!(f, "scenario"),
            ObjectRef::Team(id) => write!(f, "{id}"),
            ObjectRef::Player(id) => write!(f, "{id}"),
            ObjectRef::Ship(id) => write!(f, "{id}"),
            ObjectRef::Ability(id) => write!(f, "{id}"),
        }
    }
}

impl From<TeamId> for ObjectRef {
    fn from(id: TeamId) -> Self {
        ObjectRef::Team(id)
    }
}

impl From<PlayerId> for ObjectRef {
    fn from(id: PlayerId) -> Self {
        ObjectRef::Player(id)
    }
}

impl From<ShipId> for ObjectRef {
    fn from(id: ShipId) -> Self {
        ObjectRef::Ship(id)
    }
}

impl From<AbilityId> for ObjectRef {
    fn from(id: AbilityId) -> Self {
        ObjectRef::Ability(id)
    }
}
