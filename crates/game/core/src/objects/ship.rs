use crate::attributes::AttributeWatcher;
use crate::board::{Pattern, Position};
use crate::events::{Registrar, ShipEvent};
use crate::ids::{AbilityId, PlayerId, ShipId, TeamId, TrackingId};

/// One team's current knowledge of a ship.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KnownTo {
    pub team: TeamId,
    pub tracking_id: TrackingId,
    /// True only during the update that created this entry.
    pub newly_appeared: bool,
}

/// A ship on the board.
///
/// `shape` is `base_shape` rotated by `rotation`; `visibility` is `shape`
/// expanded by `vision_radius`. Both are recomputed on rotation.
#[derive(Debug)]
pub struct Ship {
    pub(crate) id: ShipId,
    pub(crate) name: String,
    pub(crate) owner: PlayerId,
    pub(crate) team: TeamId,
    pub(crate) registrar: Registrar<ShipEvent>,
    pub(crate) attributes: AttributeWatcher,
    pub(crate) abilities: Vec<AbilityId>,
    pub(crate) position: Position,
    pub(crate) rotation: u8,
    pub(crate) base_shape: Pattern,
    pub(crate) shape: Pattern,
    pub(crate) vision_radius: u32,
    pub(crate) visibility: Pattern,
    pub(crate) spotting: Vec<ShipId>,
    pub(crate) spotted_by: Vec<ShipId>,
    pub(crate) known_to: Vec<KnownTo>,
}

impl Ship {
    pub fn id(&self) -> ShipId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    pub fn team(&self) -> TeamId {
        self.team
    }

    pub fn registrar(&self) -> Registrar<ShipEvent> {
        self.registrar
    }

    pub fn attributes(&self) -> &AttributeWatcher {
        &self.attributes
    }

    pub fn abilities(&self) -> &[AbilityId] {
        &self.abilities
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    pub fn shape(&self) -> &Pattern {
        &self.shape
    }

    pub fn vision_radius(&self) -> u32 {
        self.vision_radius
    }

    pub fn visibility(&self) -> &Pattern {
        &self.visibility
    }

    /// Ships this ship currently sees.
    pub fn spotting(&self) -> &[ShipId] {
        &self.spotting
    }

    /// Ships that currently see this ship.
    pub fn spotted_by(&self) -> &[ShipId] {
        &self.spotted_by
    }

    pub fn known_to(&self) -> &[KnownTo] {
        &self.known_to
    }

    /// Tracking id under which `team` currently knows this ship.
    pub fn tracking_id_for(&self, team: TeamId) -> Option<TrackingId> {
        self.known_to
            .iter()
            .find(|known| known.team == team)
            .map(|known| known.tracking_id)
    }

    /// Rotation after turning clockwise by `quarter_turns`.
    pub(crate) fn rotation_after(&self, quarter_turns: u8) -> u8 {
        (self.rotation + quarter_turns % 4) % 4
    }

    /// Shape and visibility for a given rotation.
    pub(crate) fn patterns_for(&self, rotation: u8) -> (Pattern, Pattern) {
        let shape = self.base_shape.rotated(rotation);
        let visibility = shape.expanded(self.vision_radius);
        (shape, visibility)
    }
}
