use crate::attributes::AttributeWatcher;
use crate::events::{Registrar, TeamEvent};
use crate::ids::{PlayerId, TeamId};

/// A side of the game. Lost exactly when every one of its players is lost.
#[derive(Debug)]
pub struct Team {
    pub(crate) id: TeamId,
    pub(crate) name: String,
    pub(crate) registrar: Registrar<TeamEvent>,
    pub(crate) attributes: AttributeWatcher,
    pub(crate) players: Vec<PlayerId>,
    pub(crate) lost: bool,
}

impl Team {
    pub fn id(&self) -> TeamId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registrar(&self) -> Registrar<TeamEvent> {
        self.registrar
    }

    pub fn attributes(&self) -> &AttributeWatcher {
        &self.attributes
    }

    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    pub fn is_lost(&self) -> bool {
        self.lost
    }
}
