use crate::attributes::AttributeWatcher;
use crate::events::{PlayerEvent, Registrar};
use crate::ids::{PlayerId, ShipId, TeamId};

/// A seat in the turn order, commanding zero or more ships.
#[derive(Debug)]
pub struct Player {
    pub(crate) id: PlayerId,
    pub(crate) name: String,
    pub(crate) team: TeamId,
    pub(crate) registrar: Registrar<PlayerEvent>,
    pub(crate) attributes: AttributeWatcher,
    pub(crate) ships: Vec<ShipId>,
    pub(crate) lost: bool,
}

impl Player {
    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn team(&self) -> TeamId {
        self.team
    }

    pub fn registrar(&self) -> Registrar<PlayerEvent> {
        self.registrar
    }

    pub fn attributes(&self) -> &AttributeWatcher {
        &self.attributes
    }

    pub fn ships(&self) -> &[ShipId] {
        &self.ships
    }

    pub fn is_lost(&self) -> bool {
        self.lost
    }
}
