//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for every
//! gameplay request, plus topic subscriptions on the event bus.
use armada_core::{AbilityId, ClientEvent, GameError, GamePhase, PlayerId, TeamId};
use tokio::sync::{broadcast, mpsc, oneshot};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    async fn play<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<std::result::Result<T, GameError>>) -> Command,
    ) -> Result<T> {
        Ok(self.request(command).await??)
    }

    /// End `player`'s turn. Returns the player now holding the turn.
    pub async fn end_turn(&self, player: PlayerId) -> Result<Option<PlayerId>> {
        self.play(|reply| Command::EndTurn { player, reply }).await
    }

    pub async fn use_ability(&self, player: PlayerId, ability: AbilityId) -> Result<()> {
        self.play(|reply| Command::UseAbility {
            player,
            ability,
            reply,
        })
        .await
    }

    pub async fn eliminate_player(&self, player: PlayerId) -> Result<()> {
        self.play(|reply| Command::EliminatePlayer { player, reply })
            .await
    }

    /// Full state snapshot for a (re)joining client of `team`.
    pub async fn sync(&self, team: TeamId) -> Result<Vec<ClientEvent>> {
        self.play(|reply| Command::Sync { team, reply }).await
    }

    pub async fn current_turn(&self) -> Result<Option<PlayerId>> {
        self.request(|reply| Command::CurrentTurn { reply }).await
    }

    pub async fn phase(&self) -> Result<GamePhase> {
        self.request(|reply| Command::QueryPhase { reply }).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Team(id)` - dispatches addressed to that team
    /// - `Topic::All` - every dispatch plus turn timeouts
    ///
    /// Dispatches carry `excluded_player`; a player client should drop the
    /// ones where [`Dispatch::is_for`](armada_core::Dispatch::is_for) is false.
    pub fn subscribe(&self, topic: Topic) -> Result<broadcast::Receiver<Event>> {
        self.event_bus.subscribe(topic)
    }

    /// Stops the simulation worker. Later requests fail with
    /// [`RuntimeError::CommandChannelClosed`].
    pub async fn shutdown(&self) -> Result<()> {
        self.request(|reply| Command::Shutdown { reply }).await
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
