//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use armada_core::{Dispatch, PlayerId, TeamId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::api::{Result, RuntimeError};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Dispatches addressed to one team.
    Team(TeamId),
    /// Everything, for spectators and logging.
    All,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Team(team) => write!(f, "team:{team}"),
            Topic::All => write!(f, "all"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A client event addressed to a team.
    Dispatch(Dispatch),
    /// The turn holder ran out of time; the turn was advanced for them.
    TurnTimedOut { player: Option<PlayerId> },
}

impl Event {
    /// Team topic the event belongs to besides [`Topic::All`].
    pub fn team_topic(&self) -> Option<Topic> {
        match self {
            Event::Dispatch(dispatch) => Some(Topic::Team(dispatch.team)),
            Event::TurnTimedOut { .. } => None,
        }
    }
}

/// Topic-based event bus
///
/// One channel per team plus [`Topic::All`], created up front; the team set
/// of a scenario never changes once it is built.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<HashMap<Topic, broadcast::Sender<Event>>>,
}

impl EventBus {
    pub fn new(teams: impl IntoIterator<Item = TeamId>, capacity: usize) -> Self {
        let mut channels = HashMap::new();
        channels.insert(Topic::All, broadcast::channel(capacity).0);
        for team in teams {
            channels.insert(Topic::Team(team), broadcast::channel(capacity).0);
        }

        Self {
            channels: Arc::new(channels),
        }
    }

    /// Publish an event to its team topic and to [`Topic::All`].
    pub fn publish(&self, event: Event) {
        if let Some(topic) = event.team_topic() {
            self.send(topic, event.clone());
        }
        self.send(Topic::All, event);
    }

    fn send(&self, topic: Topic, event: Event) {
        match self.channels.get(&topic) {
            Some(tx) => {
                if tx.send(event).is_err() {
                    // No subscribers for this topic - this is normal, not an error
                    tracing::trace!(target: "armada::runtime", %topic, "no subscribers");
                }
            }
            None => {
                tracing::warn!(target: "armada::runtime", %topic, "event for unknown topic dropped");
            }
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> Result<broadcast::Receiver<Event>> {
        self.channels
            .get(&topic)
            .map(broadcast::Sender::subscribe)
            .ok_or(RuntimeError::UnknownTopic(topic))
    }

    pub fn topics(&self) -> impl Iterator<Item = Topic> + '_ {
        self.channels.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armada_core::ClientEvent;

    fn turn_changed(team: u32) -> Event {
        Event::Dispatch(Dispatch {
            team: TeamId(team),
            excluded_player: None,
            event: ClientEvent::TurnChanged {
                player: Some(PlayerId(0)),
            },
        })
    }

    #[test]
    fn dispatches_reach_their_team_and_all() {
        let bus = EventBus::new([TeamId(0), TeamId(1)], 8);
        let mut red = bus.subscribe(Topic::Team(TeamId(0))).unwrap();
        let mut blue = bus.subscribe(Topic::Team(TeamId(1))).unwrap();
        let mut all = bus.subscribe(Topic::All).unwrap();

        bus.publish(turn_changed(0));
        bus.publish(Event::TurnTimedOut { player: None });

        assert_eq!(red.try_recv().unwrap(), turn_changed(0));
        assert!(red.try_recv().is_err());
        assert!(blue.try_recv().is_err());
        assert_eq!(all.try_recv().unwrap(), turn_changed(0));
        assert_eq!(
            all.try_recv().unwrap(),
            Event::TurnTimedOut { player: None }
        );
    }

    #[test]
    fn unknown_team_topics_are_rejected() {
        let bus = EventBus::new([TeamId(0)], 8);
        assert!(matches!(
            bus.subscribe(Topic::Team(TeamId(3))),
            Err(RuntimeError::UnknownTopic(Topic::Team(TeamId(3))))
        ));
        assert_eq!(bus.topics().count(), 2);
        // Publishing without subscribers is fine.
        bus.publish(turn_changed(0));
    }
}
