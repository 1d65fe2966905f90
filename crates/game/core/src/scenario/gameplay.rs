//! Gameplay entry points.
//!
//! Every public method validates first and only then mutates, so a rejected
//! request leaves the scenario untouched. Accepted requests queue events and
//! run the pass before returning; the outbox then holds everything clients
//! need to learn about the request.

use tracing::{debug, info};

use crate::attributes::Builtin;
use crate::error::GameError;
use crate::events::{
    AbilityEvent, EventContext, EventDetail, PlayerEvent, ScenarioEvent, TeamEvent,
    evaluate_events,
};
use crate::ids::{AbilityId, ObjectRef, PlayerId, ShipId, TeamId};
use crate::objects::AbilityAction;

use super::{ClientEvent, GamePhase, OwnerRef, Scenario, ShipSnapshot};

impl Scenario {
    /// Places every ship's sight lines, announces ships to the teams that see
    /// them and opens the first turn.
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.phase != GamePhase::Pending {
            return Err(GameError::AlreadyStarted);
        }
        self.phase = GamePhase::Running;

        let ships: Vec<ShipId> = self.ships.iter().map(|ship| ship.id).collect();
        for &ship in &ships {
            self.spot(ship);
        }
        for &ship in &ships {
            self.update_known(ship);
        }

        let root = self.root;
        self.registrars.queue_event(
            root,
            EventContext::bare(ScenarioEvent::GameStart, ObjectRef::Scenario),
        );
        self.run_pass();
        if !self.is_running() {
            return Ok(());
        }

        let player = self.turns.current_turn();
        self.broadcast_all(ClientEvent::TurnChanged { player });
        self.registrars.queue_event(
            root,
            EventContext::new(
                ScenarioEvent::TurnStart,
                ObjectRef::Scenario,
                EventDetail::Turn { player },
            ),
        );
        self.run_pass();

        info!(
            target: "armada::scenario",
            ?player,
            order = ?self.turns.turn_order(),
            "game started"
        );
        Ok(())
    }

    /// Ends `player`'s turn on their request.
    pub fn end_turn(&mut self, player: PlayerId) -> Result<Option<PlayerId>, GameError> {
        self.ensure_running()?;
        self.ensure_turn_holder(player)?;
        self.advance_turn()
    }

    /// Hands the turn to the next player still in the game.
    ///
    /// Shared by explicit turn ends and the turn timeout. Returns the player
    /// now holding the turn.
    pub fn advance_turn(&mut self) -> Result<Option<PlayerId>, GameError> {
        self.ensure_running()?;
        if self.players.iter().all(|player| player.lost) {
            return Err(GameError::NoActivePlayers);
        }

        let root = self.root;
        let outgoing = self.turns.current_turn();
        self.registrars.queue_event(
            root,
            EventContext::new(
                ScenarioEvent::TurnEnd,
                ObjectRef::Scenario,
                EventDetail::Turn { player: outgoing },
            ),
        );
        // Settling here could advance a second time; the turn moves below.
        evaluate_events(self, root);
        self.end_turn_requested = false;
        if self.game_over_pending {
            self.settle();
            return Ok(self.turns.current_turn());
        }

        let players = &self.players;
        self.turns
            .advance_turn(|player| players[player.index()].lost);
        let incoming = self.turns.current_turn();

        self.broadcast_all(ClientEvent::TurnChanged { player: incoming });
        self.registrars.queue_event(
            root,
            EventContext::new(
                ScenarioEvent::TurnStart,
                ObjectRef::Scenario,
                EventDetail::Turn { player: incoming },
            ),
        );
        self.run_pass();

        debug!(
            target: "armada::scenario",
            ?outgoing,
            ?incoming,
            epoch = self.turns.timer_epoch(),
            "turn handed over"
        );
        Ok(self.turns.current_turn())
    }

    pub fn use_ability(&mut self, player: PlayerId, ability: AbilityId) -> Result<(), GameError> {
        self.ensure_running()?;
        self.ensure_turn_holder(player)?;

        let entry = self
            .abilities
            .get(ability.index())
            .ok_or(GameError::UnknownAbility(ability))?;
        let ship = &self.ships[entry.ship.index()];
        if ship.owner != player {
            return Err(GameError::AbilityNotOwned { ability, player });
        }
        if !entry.is_usable() {
            return Err(GameError::AbilityUnavailable(ability));
        }
        match entry.action {
            AbilityAction::Move { dx, dy } => {
                let position = ship.position.offset(dx, dy);
                if !self.board.can_place(ship.id, position, &ship.shape) {
                    return Err(GameError::PlacementBlocked {
                        ship: ship.id,
                        position,
                    });
                }
            }
            AbilityAction::Rotate { quarter_turns } => {
                let (shape, _) = ship.patterns_for(ship.rotation_after(quarter_turns));
                if !self.board.can_place(ship.id, ship.position, &shape) {
                    return Err(GameError::PlacementBlocked {
                        ship: ship.id,
                        position: ship.position,
                    });
                }
            }
            AbilityAction::None | AbilityAction::Adjust { .. } | AbilityAction::EndTurn => {}
        }

        let registrar = entry.registrar;
        let team = ship.team;
        self.broadcast(
            team,
            ClientEvent::AbilityUsed { player, ability },
            Some(player),
        );
        self.registrars.queue_event(
            registrar,
            EventContext::new(
                AbilityEvent::AbilityUsed,
                ObjectRef::Ability(ability),
                EventDetail::AbilityUsed { ability, player },
            ),
        );
        self.run_pass();

        debug!(target: "armada::scenario", %player, %ability, "ability used");
        Ok(())
    }

    /// Removes a player from play. Their ships stay on the board.
    pub fn eliminate_player(&mut self, player: PlayerId) -> Result<(), GameError> {
        self.ensure_running()?;
        let entry = self
            .players
            .get(player.index())
            .ok_or(GameError::UnknownPlayer(player))?;
        if entry.lost {
            return Err(GameError::PlayerLost(player));
        }

        self.mark_player_lost(player);
        self.run_pass();
        Ok(())
    }

    /// Full state a team needs when a client (re)joins.
    ///
    /// Resets the diff baselines of everything reported. Meant to be called
    /// between requests, when every pending diff has already been flushed.
    pub fn sync(&mut self, team: TeamId) -> Result<Vec<ClientEvent>, GameError> {
        let entry = self
            .teams
            .get_mut(team.index())
            .ok_or(GameError::UnknownTeam(team))?;
        let mut events = vec![ClientEvent::AttributeInfo {
            owner: OwnerRef::Team(team),
            attributes: entry.attributes.export_attribute_info(),
        }];
        let roster = entry.players.clone();

        for &player in &roster {
            events.push(ClientEvent::AttributeInfo {
                owner: OwnerRef::Player(player),
                attributes: self.players[player.index()]
                    .attributes
                    .export_attribute_info(),
            });
        }

        for ship in &mut self.ships {
            let Some(tracking_id) = ship.tracking_id_for(team) else {
                continue;
            };
            let attributes = ship.attributes.export_attribute_info();
            events.push(ClientEvent::ShipAppeared {
                tracking_id,
                ship: ShipSnapshot::capture(ship, attributes),
            });
        }

        for &player in &roster {
            for &ship in &self.players[player.index()].ships {
                for &ability in &self.ships[ship.index()].abilities {
                    events.push(ClientEvent::AttributeInfo {
                        owner: OwnerRef::Ability(ability),
                        attributes: self.abilities[ability.index()]
                            .attributes
                            .export_attribute_info(),
                    });
                }
            }
        }

        events.push(ClientEvent::TurnChanged {
            player: self.turns.current_turn(),
        });
        if let GamePhase::Over { winner } = self.phase {
            events.push(ClientEvent::GameOver { winner });
        }
        Ok(events)
    }

    pub(crate) fn ensure_running(&self) -> Result<(), GameError> {
        match self.phase {
            GamePhase::Pending => Err(GameError::NotStarted),
            GamePhase::Running => Ok(()),
            GamePhase::Over { .. } => Err(GameError::GameOver),
        }
    }

    fn ensure_turn_holder(&self, player: PlayerId) -> Result<(), GameError> {
        let entry = self
            .players
            .get(player.index())
            .ok_or(GameError::UnknownPlayer(player))?;
        if entry.lost {
            return Err(GameError::PlayerLost(player));
        }
        let expected = self.turns.current_turn();
        if expected != Some(player) {
            return Err(GameError::NotYourTurn {
                expected,
                provided: player,
            });
        }
        Ok(())
    }

    /// Flags a player as lost and queues the local and foreign events.
    pub(crate) fn mark_player_lost(&mut self, player: PlayerId) {
        let entry = &mut self.players[player.index()];
        if entry.lost {
            return;
        }
        entry.lost = true;
        let (team, registrar) = (entry.team, entry.registrar);
        self.teams[team.index()]
            .attributes
            .adjust(&Builtin::PlayerCount.into(), -1);

        info!(target: "armada::scenario", %player, %team, "player lost");
        self.broadcast_all(ClientEvent::PlayerLost { player });

        let detail = EventDetail::PlayerLost { player };
        self.registrars.queue_event(
            registrar,
            EventContext::new(
                PlayerEvent::PlayerLost,
                ObjectRef::Player(player),
                detail.clone(),
            ),
        );
        let others: Vec<_> = self
            .players
            .iter()
            .filter(|other| other.id != player)
            .map(|other| other.registrar)
            .collect();
        for other in others {
            self.registrars.queue_event(
                other,
                EventContext::new(
                    PlayerEvent::ForeignPlayerLost,
                    ObjectRef::Player(player),
                    detail.clone(),
                ),
            );
        }
    }

    pub(crate) fn mark_team_lost(&mut self, team: TeamId) {
        let entry = &mut self.teams[team.index()];
        if entry.lost {
            return;
        }
        entry.lost = true;
        let registrar = entry.registrar;

        info!(target: "armada::scenario", %team, "team lost");
        self.broadcast_all(ClientEvent::TeamLost { team });

        let detail = EventDetail::TeamLost { team };
        self.registrars.queue_event(
            registrar,
            EventContext::new(TeamEvent::TeamLost, ObjectRef::Team(team), detail.clone()),
        );
        let others: Vec<_> = self
            .teams
            .iter()
            .filter(|other| other.id != team)
            .map(|other| other.registrar)
            .collect();
        for other in others {
            self.registrars.queue_event(
                other,
                EventContext::new(
                    TeamEvent::ForeignTeamLost,
                    ObjectRef::Team(team),
                    detail.clone(),
                ),
            );
        }
    }

    /// Built-in `AbilityUsed` handler.
    pub(crate) fn perform_ability(&mut self, ability: AbilityId) {
        let entry = &mut self.abilities[ability.index()];
        entry
            .attributes
            .adjust(&Builtin::UsesThisTurn.into(), 1);
        let (ship, action) = (entry.ship, entry.action.clone());
        self.refresh_usable(ability);

        let outcome = match action {
            AbilityAction::None => Ok(()),
            AbilityAction::Move { dx, dy } => {
                let to = self.ships[ship.index()].position.offset(dx, dy);
                self.move_ship(ship, to)
            }
            AbilityAction::Rotate { quarter_turns } => {
                let rotation = self.ships[ship.index()].rotation_after(quarter_turns);
                self.rotate_ship(ship, rotation)
            }
            AbilityAction::Adjust { attribute, delta } => {
                self.ships[ship.index()].attributes.adjust(&attribute, delta);
                Ok(())
            }
            AbilityAction::EndTurn => {
                self.end_turn_requested = true;
                Ok(())
            }
        };
        if let Err(err) = outcome {
            debug!(target: "armada::scenario", %ability, %err, "ability action had no effect");
        }
    }
}
