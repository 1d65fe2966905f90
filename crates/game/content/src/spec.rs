//! Serde model of a scenario file.
//!
//! Objects nest the way they are owned: teams hold players, players hold
//! ships, ships hold abilities. Every level can carry authored attributes and
//! triggers; a trigger's effect applies to the object it is declared on.

use anyhow::Context;
use armada_core::{
    AbilityAction, AbilitySetup, Attribute, Descriptor, GameConfig, ObjectRef, Pattern, Position,
    Scenario, ScenarioBuilder, ShipSetup, Trigger,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub name: String,
    pub board: BoardSpec,
    /// Overrides the configuration supplied by the host when present.
    #[serde(default)]
    pub config: Option<GameConfig>,
    pub teams: Vec<TeamSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSpec {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSpec {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<AttributeSpec>,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    pub players: Vec<PlayerSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<AttributeSpec>,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    #[serde(default)]
    pub ships: Vec<ShipSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipSpec {
    pub name: String,
    /// Anchor tile `(x, y)`.
    pub position: (i32, i32),
    #[serde(default)]
    pub rotation: u8,
    /// Occupied offsets relative to the anchor; a single tile when omitted.
    #[serde(default)]
    pub shape: Option<Vec<(i32, i32)>>,
    #[serde(default)]
    pub vision_radius: Option<u32>,
    #[serde(default)]
    pub attributes: Vec<AttributeSpec>,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    #[serde(default)]
    pub abilities: Vec<AbilitySpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilitySpec {
    pub name: String,
    #[serde(default)]
    pub action: AbilityAction,
    #[serde(default)]
    pub uses_per_turn: Option<u32>,
    #[serde(default)]
    pub attributes: Vec<AttributeSpec>,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
}

/// An authored attribute. Without a descriptor it is bookkeeping only and
/// never reaches clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSpec {
    pub name: String,
    pub value: i64,
    #[serde(default)]
    pub descriptor: Option<Descriptor>,
}

impl AttributeSpec {
    pub fn to_attribute(&self) -> Attribute {
        match &self.descriptor {
            Some(descriptor) => Attribute::exposed(self.value, descriptor.clone()),
            None => Attribute::hidden(self.value),
        }
    }
}

impl ShipSpec {
    fn setup(&self) -> ShipSetup {
        let (x, y) = self.position;
        let mut setup = ShipSetup::new(&self.name, Position::new(x, y)).with_rotation(self.rotation);
        if let Some(cells) = &self.shape {
            setup = setup.with_shape(Pattern::from_cells(
                cells.iter().map(|&(dx, dy)| (dx, dy, 1)),
            ));
        }
        if let Some(radius) = self.vision_radius {
            setup = setup.with_vision_radius(radius);
        }
        setup
    }
}

impl AbilitySpec {
    fn setup(&self) -> AbilitySetup {
        let setup = AbilitySetup::new(&self.name, self.action.clone());
        match self.uses_per_turn {
            Some(uses) => setup.with_uses_per_turn(uses),
            None => setup,
        }
    }
}

impl ScenarioSpec {
    /// Builds the scenario with its own config, or the core defaults.
    pub fn build(&self) -> anyhow::Result<Scenario> {
        self.build_with(&GameConfig::default())
    }

    /// Builds the scenario, using `fallback` unless the file carries its own
    /// config.
    pub fn build_with(&self, fallback: &GameConfig) -> anyhow::Result<Scenario> {
        let config = self.config.clone().unwrap_or_else(|| fallback.clone());
        let mut builder =
            Scenario::builder(self.board.width, self.board.height).with_config(config);

        for team_spec in &self.teams {
            let team = builder.add_team(&team_spec.name);
            let team_ref = ObjectRef::Team(team);
            declare(&mut builder, team_ref, &team_spec.attributes, &team_spec.triggers)
                .with_context(|| format!("team '{}'", team_spec.name))?;

            for player_spec in &team_spec.players {
                let player = builder
                    .add_player(team, &player_spec.name)
                    .with_context(|| format!("player '{}'", player_spec.name))?;
                declare(
                    &mut builder,
                    ObjectRef::Player(player),
                    &player_spec.attributes,
                    &player_spec.triggers,
                )
                .with_context(|| format!("player '{}'", player_spec.name))?;

                for ship_spec in &player_spec.ships {
                    let ship = builder
                        .add_ship(player, ship_spec.setup())
                        .with_context(|| format!("ship '{}'", ship_spec.name))?;
                    declare(
                        &mut builder,
                        ObjectRef::Ship(ship),
                        &ship_spec.attributes,
                        &ship_spec.triggers,
                    )
                    .with_context(|| format!("ship '{}'", ship_spec.name))?;

                    for ability_spec in &ship_spec.abilities {
                        let ability = builder
                            .add_ability(ship, ability_spec.setup())
                            .with_context(|| format!("ability '{}'", ability_spec.name))?;
                        declare(
                            &mut builder,
                            ObjectRef::Ability(ability),
                            &ability_spec.attributes,
                            &ability_spec.triggers,
                        )
                        .with_context(|| format!("ability '{}'", ability_spec.name))?;
                    }
                }
            }
        }

        let scenario = builder
            .build()
            .with_context(|| format!("failed to build scenario '{}'", self.name))?;
        debug!(
            target: "armada::content",
            name = %self.name,
            teams = scenario.teams().len(),
            ships = scenario.ships().len(),
            "scenario built"
        );
        Ok(scenario)
    }
}

fn declare(
    builder: &mut ScenarioBuilder,
    owner: ObjectRef,
    attributes: &[AttributeSpec],
    triggers: &[Trigger],
) -> anyhow::Result<()> {
    for attribute in attributes {
        builder.insert_attribute(owner, &attribute.name, attribute.to_attribute())?;
    }
    for trigger in triggers {
        builder.add_trigger(owner, trigger.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use armada_core::{
        AbilityEvent, AttributeKey, BuildError, Priority, TriggerEffect, TurnOrdering,
    };

    fn duel() -> ScenarioSpec {
        let ship = |name: &str, x| ShipSpec {
            name: name.to_string(),
            position: (x, 0),
            rotation: 0,
            shape: None,
            vision_radius: Some(1),
            attributes: vec![AttributeSpec {
                name: "hull".to_string(),
                value: 3,
                descriptor: Some(Descriptor::new("Hull")),
            }],
            triggers: Vec::new(),
            abilities: vec![AbilitySpec {
                name: "ram".to_string(),
                action: AbilityAction::Move { dx: 1, dy: 0 },
                uses_per_turn: Some(1),
                attributes: Vec::new(),
                triggers: Vec::new(),
            }],
        };
        let team = |name: &str, x| TeamSpec {
            name: name.to_string(),
            attributes: Vec::new(),
            triggers: Vec::new(),
            players: vec![PlayerSpec {
                name: format!("{name}-captain"),
                attributes: Vec::new(),
                triggers: Vec::new(),
                ships: vec![ship(&format!("{name}-flagship"), x)],
            }],
        };
        ScenarioSpec {
            name: "duel".to_string(),
            board: BoardSpec {
                width: 8,
                height: 4,
            },
            config: None,
            teams: vec![team("red", 0), team("blue", 6)],
        }
    }

    #[test]
    fn builds_the_declared_object_graph() {
        let scenario = duel().build().expect("valid scenario");

        assert_eq!(scenario.teams().len(), 2);
        assert_eq!(scenario.players().len(), 2);
        assert_eq!(scenario.ships().len(), 2);
        assert_eq!(scenario.abilities().len(), 2);
        let hull = AttributeKey::custom("hull");
        assert!(
            scenario
                .ships()
                .iter()
                .all(|ship| ship.attributes().get(&hull) == Some(3))
        );
        assert_eq!(scenario.abilities()[0].uses_per_turn(), Some(1));
    }

    #[test]
    fn file_config_wins_over_fallback() {
        let mut spec = duel();
        let fallback = GameConfig {
            turn_ordering: TurnOrdering::Team,
            ..GameConfig::default()
        };
        let scenario = spec.build_with(&fallback).expect("valid scenario");
        assert_eq!(scenario.config().turn_ordering, TurnOrdering::Team);

        spec.config = Some(GameConfig {
            turn_timeout_secs: None,
            ..GameConfig::default()
        });
        let scenario = spec.build_with(&fallback).expect("valid scenario");
        assert_eq!(scenario.config().turn_ordering, TurnOrdering::Player);
        assert_eq!(scenario.config().turn_timeout_secs, None);
    }

    #[test]
    fn build_errors_name_the_offending_object() {
        let mut spec = duel();
        spec.teams[1].players[0].ships[0].position = (0, 0);

        let err = spec.build().unwrap_err();
        assert!(err.to_string().contains("failed to build scenario 'duel'"));
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::ShipsOverlap { .. })
        ));
    }

    #[test]
    fn triggers_are_validated_against_their_owner() {
        let mut spec = duel();
        spec.teams[0].players[0].ships[0].triggers.push(Trigger::new(
            AbilityEvent::AbilityUsed,
            Priority::post_action(0),
            TriggerEffect::Adjust {
                attribute: AttributeKey::custom("hull"),
                delta: -1,
            },
        ));

        let err = spec.build().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::TriggerOutOfScope { .. })
        ));
    }
}
