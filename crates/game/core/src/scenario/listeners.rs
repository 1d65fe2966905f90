//! Built-in listeners and trigger wiring installed at build time.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::attributes::Builtin;
use crate::error::BuildError;
use crate::events::{
    AbilityEvent, EventContext, ListenerFn, PlayerEvent, Priority, ScenarioEvent, TeamEvent,
};
use crate::ids::{AbilityId, ObjectRef, PlayerId, TeamId};
use crate::objects::{Trigger, TriggerEffect};

use super::{ClientEvent, GamePhase, OwnerRef, Scenario};

/// Cache refreshes that authored listeners must already observe.
const BOOKKEEPING: Priority = Priority::new(Priority::PRE_ACTION, i32::MAX);

/// Runs after every authored reaction to the same event.
const CLEANUP: Priority = Priority::new(Priority::POST_ACTION, i32::MIN);

pub(super) fn install_builtin(scenario: &mut Scenario) {
    let teams: Vec<_> = scenario.teams.iter().map(|t| (t.id, t.registrar)).collect();
    let players: Vec<_> = scenario
        .players
        .iter()
        .map(|p| (p.id, p.team, p.registrar))
        .collect();
    let abilities: Vec<_> = scenario
        .abilities
        .iter()
        .map(|a| (a.id, a.registrar))
        .collect();
    let tree = &mut scenario.registrars;

    for (team, registrar) in teams {
        tree.add_event_listener(
            registrar,
            TeamEvent::TeamLost,
            CLEANUP,
            |s: &mut Scenario, _: &EventContext| s.conclude_if_decided(),
        );
        tree.add_completion_callback(registrar, move |s: &mut Scenario| {
            s.flush_team_updates(team);
        });
    }

    for (player, team, registrar) in players {
        tree.add_event_listener(
            registrar,
            PlayerEvent::PlayerLost,
            Priority::action_default(0),
            move |s: &mut Scenario, _: &EventContext| s.check_team_lost(team),
        );
        tree.add_event_listener(
            registrar,
            PlayerEvent::PlayerLost,
            CLEANUP,
            move |s: &mut Scenario, _: &EventContext| s.retire_fleet(player),
        );
    }

    for (ability, registrar) in abilities {
        tree.add_event_listener(
            registrar,
            AbilityEvent::from(ScenarioEvent::TurnStart),
            BOOKKEEPING,
            move |s: &mut Scenario, _: &EventContext| s.reset_ability_turn(ability),
        );
        tree.add_event_listener(
            registrar,
            AbilityEvent::AbilityUsed,
            Priority::action_default(0),
            move |s: &mut Scenario, _: &EventContext| s.perform_ability(ability),
        );
    }
}

/// Validates a trigger against its owner and registers it.
pub(super) fn install_trigger(
    scenario: &mut Scenario,
    owner: ObjectRef,
    trigger: Trigger,
) -> Result<(), BuildError> {
    let registrar = scenario
        .registrar_of(owner)
        .ok_or(BuildError::UnknownObject(owner))?;
    if trigger.event.depth() > owner.depth() {
        return Err(BuildError::TriggerOutOfScope {
            owner,
            event: trigger.event,
        });
    }
    let key = trigger.effect.attribute();
    if !scenario
        .attributes(owner)
        .is_some_and(|watcher| watcher.contains(key))
    {
        return Err(BuildError::UnknownAttribute {
            owner,
            key: key.to_string(),
        });
    }

    let (event, priority) = (trigger.event, trigger.priority);
    let callback: Arc<ListenerFn<Scenario>> =
        Arc::new(move |s: &mut Scenario, ctx: &EventContext| s.apply_trigger(owner, &trigger, ctx));
    scenario
        .registrars
        .add_listener_by_name(registrar, event, priority, callback);
    Ok(())
}

impl Scenario {
    pub(crate) fn apply_trigger(&mut self, owner: ObjectRef, trigger: &Trigger, ctx: &EventContext) {
        if trigger.own_turn_only
            && !ctx
                .player()
                .is_some_and(|player| self.owning_players(owner).contains(&player))
        {
            return;
        }

        trace!(
            target: "armada::scenario",
            %owner,
            event = %ctx.name,
            effect = ?trigger.effect,
            "trigger fired"
        );

        let Some(watcher) = self.attributes_mut(owner) else {
            return;
        };
        match &trigger.effect {
            TriggerEffect::Adjust { attribute, delta } => {
                watcher.adjust(attribute, *delta);
            }
            TriggerEffect::Set { attribute, value } => {
                watcher.set(attribute, *value);
            }
            TriggerEffect::EliminateOwnerAtOrBelow {
                attribute,
                threshold,
            } => {
                if watcher.get(attribute).is_some_and(|value| value <= *threshold) {
                    for player in self.owning_players(owner) {
                        self.mark_player_lost(player);
                    }
                }
            }
        }
    }

    fn check_team_lost(&mut self, team: TeamId) {
        let Some(entry) = self.teams.get(team.index()) else {
            return;
        };
        if entry.lost {
            return;
        }
        let all_lost = entry
            .players
            .iter()
            .all(|player| self.players[player.index()].lost);
        if all_lost {
            self.mark_team_lost(team);
        }
    }

    /// Ends the game once at most one team is still standing.
    fn conclude_if_decided(&mut self) {
        if self.phase != GamePhase::Running {
            return;
        }
        let standing: Vec<TeamId> = self
            .teams
            .iter()
            .filter(|team| !team.lost)
            .map(|team| team.id)
            .collect();
        if standing.len() > 1 {
            return;
        }

        let winner = standing.first().copied();
        self.phase = GamePhase::Over { winner };
        self.game_over_pending = true;
        self.broadcast_all(ClientEvent::GameOver { winner });
        self.registrars.terminate(self.root);

        debug!(target: "armada::scenario", ?winner, "game over");
    }

    /// Silences the ships of an eliminated player. Ships stay on the board.
    fn retire_fleet(&mut self, player: PlayerId) {
        let ships = self.players[player.index()].ships.clone();
        for ship in ships {
            self.registrars.deactivate(self.ships[ship.index()].registrar);
            for ability in self.ships[ship.index()].abilities.clone() {
                self.abilities[ability.index()]
                    .attributes
                    .set_builtin(Builtin::Usable, 0);
            }
        }
    }

    fn reset_ability_turn(&mut self, ability: AbilityId) {
        self.abilities[ability.index()]
            .attributes
            .set_builtin(Builtin::UsesThisTurn, 0);
        self.refresh_usable(ability);
    }

    pub(crate) fn refresh_usable(&mut self, ability: AbilityId) {
        let entry = &self.abilities[ability.index()];
        let owner = self.ships[entry.ship.index()].owner;
        let usable =
            self.is_running() && !self.players[owner.index()].lost && entry.has_uses_left();
        self.abilities[ability.index()]
            .attributes
            .set_builtin(Builtin::Usable, i64::from(usable));
    }

    /// Exports the net diffs of a team and everything it owns.
    ///
    /// Ship diffs go to every team that currently knows the ship, under that
    /// team's tracking id.
    pub(crate) fn flush_team_updates(&mut self, team: TeamId) {
        let changes = self.teams[team.index()].attributes.export_updates();
        if !changes.is_empty() {
            self.broadcast(
                team,
                ClientEvent::AttributesChanged {
                    owner: OwnerRef::Team(team),
                    changes,
                },
                None,
            );
        }

        for player in self.teams[team.index()].players.clone() {
            let changes = self.players[player.index()].attributes.export_updates();
            if !changes.is_empty() {
                self.broadcast(
                    team,
                    ClientEvent::AttributesChanged {
                        owner: OwnerRef::Player(player),
                        changes,
                    },
                    None,
                );
            }

            for ship in self.players[player.index()].ships.clone() {
                let entry = &mut self.ships[ship.index()];
                let changes = entry.attributes.export_updates();
                let known_to = entry.known_to.clone();
                let abilities = entry.abilities.clone();
                if !changes.is_empty() {
                    for known in known_to {
                        self.broadcast(
                            known.team,
                            ClientEvent::AttributesChanged {
                                owner: OwnerRef::Ship(known.tracking_id),
                                changes: changes.clone(),
                            },
                            None,
                        );
                    }
                }

                for ability in abilities {
                    let changes = self.abilities[ability.index()].attributes.export_updates();
                    if !changes.is_empty() {
                        self.broadcast(
                            team,
                            ClientEvent::AttributesChanged {
                                owner: OwnerRef::Ability(ability),
                                changes,
                            },
                            None,
                        );
                    }
                }
            }
        }
    }
}
