//! Root composition object of one game.
//!
//! A [`Scenario`] owns the registrar tree, every domain object, the board, the
//! turn manager and the outbox. It is built once through [`ScenarioBuilder`]
//! and afterwards only mutated through the gameplay entry points in
//! `gameplay.rs`, each of which runs one or more event passes before
//! returning.

mod builder;
mod gameplay;
mod listeners;
mod outbox;

pub use builder::{AbilitySetup, ScenarioBuilder, ShipSetup};
pub use outbox::{ClientEvent, Dispatch, OwnerRef, ShipSnapshot};

use tracing::debug;

use crate::attributes::AttributeWatcher;
use crate::board::Board;
use crate::config::GameConfig;
use crate::events::{
    EventContext, EventDetail, EventHost, Registrar, RegistrarId, RegistrarTree, ScenarioEvent,
    evaluate_events,
};
use crate::ids::{AbilityId, ObjectRef, PlayerId, ShipId, TeamId};
use crate::objects::{Ability, Player, Ship, Team};
use crate::rng::TrackingIdIssuer;
use crate::turns::TurnManager;

/// Lifecycle of a scenario.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GamePhase {
    /// Built, waiting for [`Scenario::start`].
    #[default]
    Pending,
    Running,
    Over { winner: Option<TeamId> },
}

/// One live game.
pub struct Scenario {
    pub(crate) config: GameConfig,
    pub(crate) registrars: RegistrarTree<Scenario>,
    pub(crate) root: Registrar<ScenarioEvent>,
    pub(crate) board: Board,
    pub(crate) teams: Vec<Team>,
    pub(crate) players: Vec<Player>,
    pub(crate) ships: Vec<Ship>,
    pub(crate) abilities: Vec<Ability>,
    pub(crate) turns: TurnManager,
    pub(crate) tracking: TrackingIdIssuer,
    pub(crate) outbox: Vec<Dispatch>,
    pub(crate) phase: GamePhase,
    // Deferred until the running pass has finished.
    pub(crate) end_turn_requested: bool,
    pub(crate) game_over_pending: bool,
}

impl EventHost for Scenario {
    fn registrars(&self) -> &RegistrarTree<Self> {
        &self.registrars
    }

    fn registrars_mut(&mut self) -> &mut RegistrarTree<Self> {
        &mut self.registrars
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("phase", &self.phase)
            .field("teams", &self.teams.len())
            .field("players", &self.players.len())
            .field("ships", &self.ships.len())
            .field("abilities", &self.abilities.len())
            .field("turn", &self.turns.current_turn())
            .field("outbox", &self.outbox.len())
            .finish()
    }
}

impl Scenario {
    pub fn builder(width: u32, height: u32) -> ScenarioBuilder {
        ScenarioBuilder::new(width, height)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::Over { .. })
    }

    /// Winning team once the game is over; `None` while running or on a draw.
    pub fn winner(&self) -> Option<TeamId> {
        match self.phase {
            GamePhase::Over { winner } => winner,
            _ => None,
        }
    }

    pub fn root(&self) -> Registrar<ScenarioEvent> {
        self.root
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turns(&self) -> &TurnManager {
        &self.turns
    }

    pub fn current_turn(&self) -> Option<PlayerId> {
        self.turns.current_turn()
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn abilities(&self) -> &[Ability] {
        &self.abilities
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(id.index())
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.index())
    }

    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships.get(id.index())
    }

    pub fn ability(&self, id: AbilityId) -> Option<&Ability> {
        self.abilities.get(id.index())
    }

    /// Attribute watcher of an object; the scenario itself has none.
    pub fn attributes(&self, owner: ObjectRef) -> Option<&AttributeWatcher> {
        match owner {
            ObjectRef::Scenario => None,
            ObjectRef::Team(id) => self.team(id).map(Team::attributes),
            ObjectRef::Player(id) => self.player(id).map(Player::attributes),
            ObjectRef::Ship(id) => self.ship(id).map(Ship::attributes),
            ObjectRef::Ability(id) => self.ability(id).map(Ability::attributes),
        }
    }

    pub(crate) fn attributes_mut(&mut self, owner: ObjectRef) -> Option<&mut AttributeWatcher> {
        match owner {
            ObjectRef::Scenario => None,
            ObjectRef::Team(id) => self.teams.get_mut(id.index()).map(|o| &mut o.attributes),
            ObjectRef::Player(id) => self.players.get_mut(id.index()).map(|o| &mut o.attributes),
            ObjectRef::Ship(id) => self.ships.get_mut(id.index()).map(|o| &mut o.attributes),
            ObjectRef::Ability(id) => self
                .abilities
                .get_mut(id.index())
                .map(|o| &mut o.attributes),
        }
    }

    pub fn registrar_of(&self, owner: ObjectRef) -> Option<RegistrarId> {
        match owner {
            ObjectRef::Scenario => Some(self.root.id()),
            ObjectRef::Team(id) => self.team(id).map(|o| o.registrar.id()),
            ObjectRef::Player(id) => self.player(id).map(|o| o.registrar.id()),
            ObjectRef::Ship(id) => self.ship(id).map(|o| o.registrar.id()),
            ObjectRef::Ability(id) => self.ability(id).map(|o| o.registrar.id()),
        }
    }

    /// Players whose fate an object decides: the owner of a ship or ability,
    /// the player itself, or every player of a team.
    pub(crate) fn owning_players(&self, owner: ObjectRef) -> Vec<PlayerId> {
        match owner {
            ObjectRef::Scenario => Vec::new(),
            ObjectRef::Team(id) => self.team(id).map(|t| t.players.clone()).unwrap_or_default(),
            ObjectRef::Player(id) => vec![id],
            ObjectRef::Ship(id) => self.ship(id).map(|s| vec![s.owner]).unwrap_or_default(),
            ObjectRef::Ability(id) => self
                .ability(id)
                .and_then(|a| self.ship(a.ship))
                .map(|s| vec![s.owner])
                .unwrap_or_default(),
        }
    }

    /// Appends a client event for every member of `team` except `excluded`.
    pub fn broadcast(&mut self, team: TeamId, event: ClientEvent, excluded: Option<PlayerId>) {
        self.outbox.push(Dispatch {
            team,
            excluded_player: excluded,
            event,
        });
    }

    pub(crate) fn broadcast_all(&mut self, event: ClientEvent) {
        for index in 0..self.teams.len() {
            let team = self.teams[index].id;
            self.broadcast(team, event.clone(), None);
        }
    }

    /// Hands every queued dispatch to the caller.
    pub fn drain_outbox(&mut self) -> Vec<Dispatch> {
        std::mem::take(&mut self.outbox)
    }

    pub fn pending_dispatches(&self) -> &[Dispatch] {
        &self.outbox
    }

    /// Drains the root queue, then settles work deferred by listeners.
    ///
    /// Inside a running pass this only leaves the queued work to that pass.
    pub(crate) fn run_pass(&mut self) {
        let root = self.root;
        if evaluate_events(self, root).is_none() {
            return;
        }
        self.settle();
    }

    fn settle(&mut self) {
        if std::mem::take(&mut self.game_over_pending) {
            self.end_turn_requested = false;
            let root = self.root;
            self.registrars.queue_event(
                root,
                EventContext::new(
                    ScenarioEvent::GameOver,
                    ObjectRef::Scenario,
                    EventDetail::GameOver {
                        winner: self.winner(),
                    },
                ),
            );
            evaluate_events(self, root);
            return;
        }
        if !self.is_running() {
            self.end_turn_requested = false;
            return;
        }

        let holder_lost = self
            .turns
            .current_turn()
            .and_then(|player| self.player(player))
            .is_some_and(Player::is_lost);
        if std::mem::take(&mut self.end_turn_requested) || holder_lost {
            if let Err(err) = self.advance_turn() {
                debug!(target: "armada::scenario", %err, "deferred turn advance skipped");
            }
        }
    }
}
