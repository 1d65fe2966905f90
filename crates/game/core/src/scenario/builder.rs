//! Two-phase scenario construction.
//!
//! The `add_*` calls allocate ids and registrar handles immediately, so later
//! declarations can refer to earlier objects by id. [`ScenarioBuilder::build`]
//! then links everything: registrar tree, board occupancy, built-in
//! attributes, turn order, built-in listeners and triggers.

use std::time::Duration;

use tracing::debug;

use crate::attributes::{Attribute, AttributeWatcher, Builtin, Descriptor};
use crate::board::{Board, Pattern, Position};
use crate::config::GameConfig;
use crate::error::BuildError;
use crate::events::{
    AbilityEvent, PlayerEvent, Registrar, RegistrarTree, ScenarioEvent, ShipEvent, TeamEvent,
};
use crate::ids::{AbilityId, ObjectRef, PlayerId, ShipId, TeamId};
use crate::objects::{Ability, AbilityAction, Player, Ship, Team, Trigger};
use crate::rng::TrackingIdIssuer;
use crate::turns::{TurnManager, TurnOrdering};

use super::{GamePhase, Scenario, listeners};

/// Placement and geometry of a ship.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShipSetup {
    pub name: String,
    pub position: Position,
    pub rotation: u8,
    pub shape: Pattern,
    /// Falls back to [`GameConfig::default_vision_radius`].
    pub vision_radius: Option<u32>,
}

impl ShipSetup {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            position,
            rotation: 0,
            shape: Pattern::single(),
            vision_radius: None,
        }
    }

    pub fn with_shape(mut self, shape: Pattern) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_rotation(mut self, rotation: u8) -> Self {
        self.rotation = rotation % 4;
        self
    }

    pub fn with_vision_radius(mut self, radius: u32) -> Self {
        self.vision_radius = Some(radius);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbilitySetup {
    pub name: String,
    pub action: AbilityAction,
    pub uses_per_turn: Option<u32>,
}

impl AbilitySetup {
    pub fn new(name: impl Into<String>, action: AbilityAction) -> Self {
        Self {
            name: name.into(),
            action,
            uses_per_turn: None,
        }
    }

    pub fn with_uses_per_turn(mut self, uses: u32) -> Self {
        self.uses_per_turn = Some(uses);
        self
    }
}

struct Declared<P, K> {
    parent: P,
    name: String,
    registrar: Registrar<K>,
    attributes: Vec<(String, Attribute)>,
}

struct DeclaredShip {
    base: Declared<PlayerId, ShipEvent>,
    setup: ShipSetup,
}

struct DeclaredAbility {
    base: Declared<ShipId, AbilityEvent>,
    setup: AbilitySetup,
}

/// Builder for [`Scenario`].
pub struct ScenarioBuilder {
    config: GameConfig,
    width: u32,
    height: u32,
    registrars: RegistrarTree<Scenario>,
    root: Registrar<ScenarioEvent>,
    teams: Vec<Declared<(), TeamEvent>>,
    players: Vec<Declared<TeamId, PlayerEvent>>,
    ships: Vec<DeclaredShip>,
    abilities: Vec<DeclaredAbility>,
    triggers: Vec<(ObjectRef, Trigger)>,
}

impl ScenarioBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        let mut registrars = RegistrarTree::new();
        let root = registrars.create::<ScenarioEvent>();
        Self {
            config: GameConfig::default(),
            width,
            height,
            registrars,
            root,
            teams: Vec::new(),
            players: Vec::new(),
            ships: Vec::new(),
            abilities: Vec::new(),
            triggers: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    pub fn turn_ordering(mut self, ordering: TurnOrdering) -> Self {
        self.config.turn_ordering = ordering;
        self
    }

    pub fn turn_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.turn_timeout_secs = timeout.map(|t| t.as_secs());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn add_team(&mut self, name: impl Into<String>) -> TeamId {
        let id = TeamId(self.teams.len() as u32);
        self.teams.push(Declared {
            parent: (),
            name: name.into(),
            registrar: self.registrars.create(),
            attributes: Vec::new(),
        });
        id
    }

    pub fn add_player(
        &mut self,
        team: TeamId,
        name: impl Into<String>,
    ) -> Result<PlayerId, BuildError> {
        if team.index() >= self.teams.len() {
            return Err(BuildError::UnknownTeam(team));
        }
        let id = PlayerId(self.players.len() as u32);
        self.players.push(Declared {
            parent: team,
            name: name.into(),
            registrar: self.registrars.create(),
            attributes: Vec::new(),
        });
        Ok(id)
    }

    pub fn add_ship(&mut self, owner: PlayerId, setup: ShipSetup) -> Result<ShipId, BuildError> {
        if owner.index() >= self.players.len() {
            return Err(BuildError::UnknownPlayer(owner));
        }
        let id = ShipId(self.ships.len() as u32);
        self.ships.push(DeclaredShip {
            base: Declared {
                parent: owner,
                name: setup.name.clone(),
                registrar: self.registrars.create(),
                attributes: Vec::new(),
            },
            setup,
        });
        Ok(id)
    }

    pub fn add_ability(
        &mut self,
        ship: ShipId,
        setup: AbilitySetup,
    ) -> Result<AbilityId, BuildError> {
        if ship.index() >= self.ships.len() {
            return Err(BuildError::UnknownShip(ship));
        }
        let id = AbilityId(self.abilities.len() as u32);
        self.abilities.push(DeclaredAbility {
            base: Declared {
                parent: ship,
                name: setup.name.clone(),
                registrar: self.registrars.create(),
                attributes: Vec::new(),
            },
            setup,
        });
        Ok(id)
    }

    /// Declares an authored attribute on a team, player, ship or ability.
    pub fn insert_attribute(
        &mut self,
        owner: ObjectRef,
        name: impl Into<String>,
        attribute: Attribute,
    ) -> Result<(), BuildError> {
        let slot = match owner {
            ObjectRef::Team(id) => self.teams.get_mut(id.index()).map(|d| &mut d.attributes),
            ObjectRef::Player(id) => self.players.get_mut(id.index()).map(|d| &mut d.attributes),
            ObjectRef::Ship(id) => self.ships.get_mut(id.index()).map(|d| &mut d.base.attributes),
            ObjectRef::Ability(id) => self
                .abilities
                .get_mut(id.index())
                .map(|d| &mut d.base.attributes),
            ObjectRef::Scenario => None,
        };
        let slot = slot.ok_or(BuildError::UnknownObject(owner))?;
        slot.push((name.into(), attribute));
        Ok(())
    }

    /// Attaches a trigger; validated against the owner in [`build`](Self::build).
    pub fn add_trigger(&mut self, owner: ObjectRef, trigger: Trigger) {
        self.triggers.push((owner, trigger));
    }

    pub fn build(self) -> Result<Scenario, BuildError> {
        let Self {
            config,
            width,
            height,
            mut registrars,
            root,
            teams: declared_teams,
            players: declared_players,
            ships: declared_ships,
            abilities: declared_abilities,
            triggers,
        } = self;

        if width == 0 || height == 0 {
            return Err(BuildError::EmptyBoard { width, height });
        }

        // Child lists first: built-in counts depend on them.
        let mut team_players = vec![Vec::new(); declared_teams.len()];
        for (index, player) in declared_players.iter().enumerate() {
            team_players[player.parent.index()].push(PlayerId(index as u32));
        }
        let mut player_ships = vec![Vec::new(); declared_players.len()];
        for (index, ship) in declared_ships.iter().enumerate() {
            player_ships[ship.base.parent.index()].push(ShipId(index as u32));
        }
        let mut ship_abilities = vec![Vec::new(); declared_ships.len()];
        for (index, ability) in declared_abilities.iter().enumerate() {
            ship_abilities[ability.base.parent.index()].push(AbilityId(index as u32));
        }

        let teams: Vec<Team> = declared_teams
            .into_iter()
            .zip(team_players)
            .enumerate()
            .map(|(index, (team, players))| Team {
                id: TeamId(index as u32),
                name: team.name,
                registrar: team.registrar,
                attributes: AttributeWatcher::new(
                    team.attributes,
                    [(
                        Builtin::PlayerCount,
                        Attribute::exposed(players.len() as i64, Descriptor::new("Players")),
                    )],
                ),
                players,
                lost: false,
            })
            .collect();

        let players: Vec<Player> = declared_players
            .into_iter()
            .zip(player_ships)
            .enumerate()
            .map(|(index, (player, ships))| Player {
                id: PlayerId(index as u32),
                name: player.name,
                team: player.parent,
                registrar: player.registrar,
                attributes: AttributeWatcher::new(
                    player.attributes,
                    [(
                        Builtin::ShipCount,
                        Attribute::exposed(ships.len() as i64, Descriptor::new("Ships")),
                    )],
                ),
                ships,
                lost: false,
            })
            .collect();

        let mut board = Board::new(width, height);
        let mut ships = Vec::with_capacity(declared_ships.len());
        for (index, (declared, abilities)) in declared_ships.into_iter().zip(ship_abilities).enumerate()
        {
            let id = ShipId(index as u32);
            let DeclaredShip { base, setup } = declared;
            let owner = base.parent;
            let vision_radius = setup
                .vision_radius
                .unwrap_or(config.default_vision_radius);
            if vision_radius > Pattern::MAX_RADIUS {
                return Err(BuildError::VisionTooLarge {
                    ship: id,
                    radius: vision_radius,
                    max: Pattern::MAX_RADIUS,
                });
            }
            let shape = setup.shape.rotated(setup.rotation);
            let visibility = shape.expanded(vision_radius);

            if shape.is_empty() {
                return Err(BuildError::EmptyShape { ship: id });
            }
            for cell in Board::footprint(setup.position, &shape) {
                if !board.contains(cell) {
                    return Err(BuildError::ShipOffBoard {
                        ship: id,
                        position: setup.position,
                    });
                }
                if let Some(other) = board.tile_at(cell.x, cell.y) {
                    return Err(BuildError::ShipsOverlap {
                        ship: id,
                        other,
                        position: cell,
                    });
                }
            }
            board.place(id, setup.position, &shape);

            ships.push(Ship {
                id,
                name: base.name,
                owner,
                team: players[owner.index()].team,
                registrar: base.registrar,
                attributes: AttributeWatcher::new(
                    base.attributes,
                    [(
                        Builtin::AbilityCount,
                        Attribute::exposed(abilities.len() as i64, Descriptor::new("Abilities")),
                    )],
                ),
                abilities,
                position: setup.position,
                rotation: setup.rotation % 4,
                base_shape: setup.shape,
                shape,
                vision_radius,
                visibility,
                spotting: Vec::new(),
                spotted_by: Vec::new(),
                known_to: Vec::new(),
            });
        }

        let abilities: Vec<Ability> = declared_abilities
            .into_iter()
            .enumerate()
            .map(|(index, declared)| Ability {
                id: AbilityId(index as u32),
                name: declared.base.name,
                ship: declared.base.parent,
                registrar: declared.base.registrar,
                attributes: AttributeWatcher::new(
                    declared.base.attributes,
                    [
                        (Builtin::Usable, Attribute::hidden(0)),
                        (Builtin::UsesThisTurn, Attribute::hidden(0)),
                    ],
                ),
                action: declared.setup.action,
                uses_per_turn: declared.setup.uses_per_turn,
            })
            .collect();

        // Second phase: mirror the ownership hierarchy in the registrar tree.
        for team in &teams {
            registrars.add_sub_registrar(root, team.registrar);
        }
        for player in &players {
            registrars.add_sub_registrar(teams[player.team.index()].registrar, player.registrar);
        }
        for ship in &ships {
            registrars.add_sub_registrar(players[ship.owner.index()].registrar, ship.registrar);
        }
        for ability in &abilities {
            registrars.add_sub_registrar(ships[ability.ship.index()].registrar, ability.registrar);
        }

        let mut turns = TurnManager::new(config.turn_timeout());
        let rosters: Vec<Vec<PlayerId>> = teams.iter().map(|t| t.players.clone()).collect();
        turns.generate_turns(config.turn_ordering, &rosters);
        if turns.turn_order().is_empty() {
            return Err(BuildError::EmptyTurnOrder);
        }

        let mut scenario = Scenario {
            tracking: TrackingIdIssuer::new(config.seed),
            config,
            registrars,
            root,
            board,
            teams,
            players,
            ships,
            abilities,
            turns,
            outbox: Vec::new(),
            phase: GamePhase::Pending,
            end_turn_requested: false,
            game_over_pending: false,
        };

        listeners::install_builtin(&mut scenario);
        for (owner, trigger) in triggers {
            listeners::install_trigger(&mut scenario, owner, trigger)?;
        }

        debug!(
            target: "armada::scenario",
            teams = scenario.teams.len(),
            players = scenario.players.len(),
            ships = scenario.ships.len(),
            abilities = scenario.abilities.len(),
            registrars = scenario.registrars.len(),
            "scenario built"
        );
        Ok(scenario)
    }
}
