//! Ship visibility bookkeeping ("fog of war").
//!
//! Only a ship's own visibility pattern is scanned when it is (re)placed: a
//! ship that moves discovers the ships inside its sight, but ships whose sight
//! it enters do not rescan. Every discovered relation is still recorded on
//! both sides (`spotting` on the viewer, `spotted_by` on the target), and
//! team awareness is derived from `spotted_by`.
//!
//! A team knows a ship under a tracking id for as long as it keeps seeing the
//! ship without interruption. After any gap the team gets a fresh id and a
//! fresh `ShipAppeared`, so rivals cannot tie two sightings together.

use tracing::{debug, trace};

use crate::board::{Board, Position};
use crate::error::GameError;
use crate::events::{EventContext, EventDetail, ShipEvent};
use crate::ids::{ObjectRef, ShipId, TeamId, TrackingId};
use crate::objects::KnownTo;
use crate::scenario::{ClientEvent, Scenario, ShipSnapshot};

impl Scenario {
    /// Records every other ship inside `ship`'s visibility pattern.
    pub(crate) fn spot(&mut self, ship: ShipId) {
        let viewer = &self.ships[ship.index()];
        let mut seen = Vec::new();
        for cell in Board::footprint(viewer.position, &viewer.visibility) {
            if let Some(other) = self.board.tile_at(cell.x, cell.y)
                && other != ship
                && !viewer.spotting.contains(&other)
                && !seen.contains(&other)
            {
                seen.push(other);
            }
        }

        for other in seen {
            self.ships[ship.index()].spotting.push(other);
            self.ships[other.index()].spotted_by.push(ship);
            trace!(target: "armada::spotting", viewer = %ship, %other, "spotted");
        }
    }

    /// Drops every relation recorded by [`spot`](Self::spot) for `ship`.
    pub(crate) fn unspot(&mut self, ship: ShipId) {
        let spotting = std::mem::take(&mut self.ships[ship.index()].spotting);
        for other in spotting {
            self.ships[other.index()]
                .spotted_by
                .retain(|&viewer| viewer != ship);
        }
    }

    /// Owning team first, then the teams of the ships that see `ship`.
    fn aware_teams(&self, ship: ShipId) -> Vec<TeamId> {
        let entry = &self.ships[ship.index()];
        let mut teams = vec![entry.team];
        for viewer in &entry.spotted_by {
            let team = self.ships[viewer.index()].team;
            if !teams.contains(&team) {
                teams.push(team);
            }
        }
        teams
    }

    /// Reconciles `known_to` with the teams currently aware of `ship`.
    ///
    /// Continuing teams keep their tracking id; new teams get a fresh id and a
    /// `ShipAppeared`; teams that lost sight are dropped silently.
    pub(crate) fn update_known(&mut self, ship: ShipId) {
        let aware = self.aware_teams(ship);
        let entry = &mut self.ships[ship.index()];

        entry.known_to.retain(|known| {
            let keep = aware.contains(&known.team);
            if !keep {
                debug!(
                    target: "armada::spotting",
                    %ship,
                    team = %known.team,
                    "lost sight"
                );
            }
            keep
        });
        for known in &mut entry.known_to {
            known.newly_appeared = false;
        }
        let missing: Vec<TeamId> = aware
            .into_iter()
            .filter(|&team| entry.tracking_id_for(team).is_none())
            .collect();

        for team in missing {
            let tracking_id = self.tracking.issue();
            let entry = &mut self.ships[ship.index()];
            entry.known_to.push(KnownTo {
                team,
                tracking_id,
                newly_appeared: true,
            });
            let snapshot = ShipSnapshot::capture(entry, entry.attributes.snapshot());

            debug!(
                target: "armada::spotting",
                %ship,
                %team,
                %tracking_id,
                "ship appeared"
            );
            self.broadcast(
                team,
                ClientEvent::ShipAppeared {
                    tracking_id,
                    ship: snapshot,
                },
                None,
            );
        }
    }

    /// Re-places a ship and recomputes sight around it.
    ///
    /// Awareness is refreshed for the ship itself and for every ship it saw
    /// before or sees now.
    fn relocate(&mut self, ship: ShipId, position: Position, rotation: u8) -> Result<(), GameError> {
        let entry = self
            .ships
            .get(ship.index())
            .ok_or(GameError::UnknownShip(ship))?;
        let (shape, visibility) = entry.patterns_for(rotation);
        if !self.board.can_place(ship, position, &shape) {
            return Err(GameError::PlacementBlocked { ship, position });
        }
        let before = entry.spotting.clone();

        self.unspot(ship);
        let entry = &mut self.ships[ship.index()];
        self.board.clear(ship, entry.position, &entry.shape);
        entry.position = position;
        entry.rotation = rotation;
        entry.shape = shape;
        entry.visibility = visibility;
        self.board.place(ship, position, &entry.shape);
        self.spot(ship);

        let mut affected = vec![ship];
        for other in before
            .into_iter()
            .chain(self.ships[ship.index()].spotting.iter().copied())
        {
            if !affected.contains(&other) {
                affected.push(other);
            }
        }
        for other in affected {
            self.update_known(other);
        }
        Ok(())
    }

    /// Teams that knew the ship before this update, with their tracking ids.
    fn continuing_observers(&self, ship: ShipId) -> Vec<(TeamId, TrackingId)> {
        self.ships[ship.index()]
            .known_to
            .iter()
            .filter(|known| !known.newly_appeared)
            .map(|known| (known.team, known.tracking_id))
            .collect()
    }

    pub fn move_ship(&mut self, ship: ShipId, to: Position) -> Result<(), GameError> {
        self.ensure_running()?;
        let entry = self
            .ships
            .get(ship.index())
            .ok_or(GameError::UnknownShip(ship))?;
        let (from, rotation, registrar) = (entry.position, entry.rotation, entry.registrar);

        self.relocate(ship, to, rotation)?;
        for (team, tracking_id) in self.continuing_observers(ship) {
            self.broadcast(
                team,
                ClientEvent::ShipMoved {
                    tracking_id,
                    x: to.x,
                    y: to.y,
                },
                None,
            );
        }

        debug!(target: "armada::spotting", %ship, ?from, ?to, "ship moved");
        self.registrars.queue_event(
            registrar,
            EventContext::new(
                ShipEvent::ShipMoved,
                ObjectRef::Ship(ship),
                EventDetail::Moved { from, to },
            ),
        );
        self.run_pass();
        Ok(())
    }

    pub fn rotate_ship(&mut self, ship: ShipId, rotation: u8) -> Result<(), GameError> {
        self.ensure_running()?;
        let entry = self
            .ships
            .get(ship.index())
            .ok_or(GameError::UnknownShip(ship))?;
        let (position, from, registrar) = (entry.position, entry.rotation, entry.registrar);
        let rotation = rotation % 4;

        self.relocate(ship, position, rotation)?;
        for (team, tracking_id) in self.continuing_observers(ship) {
            self.broadcast(
                team,
                ClientEvent::ShipRotated {
                    tracking_id,
                    rotation,
                },
                None,
            );
        }

        debug!(target: "armada::spotting", %ship, from, to = rotation, "ship rotated");
        self.registrars.queue_event(
            registrar,
            EventContext::new(
                ShipEvent::ShipRotated,
                ObjectRef::Ship(ship),
                EventDetail::Rotated { from, to: rotation },
            ),
        );
        self.run_pass();
        Ok(())
    }
}
