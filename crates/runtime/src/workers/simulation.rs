//! Simulation worker that owns the authoritative [`Scenario`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), applies
//! them one at a time and publishes the dispatches they produce to the
//! [`EventBus`]. The turn timer is the only work the worker starts on its own;
//! it is re-armed whenever the turn manager's epoch changes.

use armada_core::{
    AbilityId, ClientEvent, GameError, GamePhase, PlayerId, Scenario, TeamId,
};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::events::{Event, EventBus};

type Reply<T> = oneshot::Sender<Result<T, GameError>>;

/// Commands that can be sent to the simulation worker
pub enum Command {
    EndTurn {
        player: PlayerId,
        reply: Reply<Option<PlayerId>>,
    },
    UseAbility {
        player: PlayerId,
        ability: AbilityId,
        reply: Reply<()>,
    },
    EliminatePlayer {
        player: PlayerId,
        reply: Reply<()>,
    },
    /// Full state for a (re)joining client of `team`.
    Sync {
        team: TeamId,
        reply: Reply<Vec<ClientEvent>>,
    },
    CurrentTurn {
        reply: oneshot::Sender<Option<PlayerId>>,
    },
    QueryPhase {
        reply: oneshot::Sender<GamePhase>,
    },
    /// Stops the worker after replying.
    Shutdown { reply: oneshot::Sender<()> },
}

/// Deadline of the current turn, tied to the epoch it was armed for.
#[derive(Debug, Clone, Copy)]
struct TurnTimer {
    epoch: u64,
    deadline: Instant,
}

/// Background task that processes gameplay commands.
pub struct SimulationWorker {
    scenario: Scenario,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    enable_turn_timer: bool,
    timer: Option<TurnTimer>,
}

impl SimulationWorker {
    pub fn new(
        scenario: Scenario,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        enable_turn_timer: bool,
    ) -> Self {
        info!(
            target: "armada::runtime",
            teams = scenario.teams().len(),
            players = scenario.players().len(),
            timeout = ?scenario.turns().turn_timeout(),
            "SimulationWorker initialized"
        );

        Self {
            scenario,
            command_rx,
            event_bus,
            enable_turn_timer,
            timer: None,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        loop {
            self.rearm_timer();
            let deadline = self.timer.map(|timer| timer.deadline);

            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => {
                        if !self.handle_command(cmd) {
                            break;
                        }
                    }
                    None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.handle_timeout();
                }
            }
        }
        debug!(target: "armada::runtime", "SimulationWorker stopped");
    }

    /// Returns `false` once the worker should stop.
    fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::EndTurn { player, reply } => {
                let result = self.scenario.end_turn(player);
                self.publish_outbox();
                if reply.send(result).is_err() {
                    debug!(target: "armada::runtime", "EndTurn reply channel closed (caller dropped)");
                }
            }
            Command::UseAbility {
                player,
                ability,
                reply,
            } => {
                let result = self.scenario.use_ability(player, ability);
                self.publish_outbox();
                if reply.send(result).is_err() {
                    debug!(target: "armada::runtime", "UseAbility reply channel closed (caller dropped)");
                }
            }
            Command::EliminatePlayer { player, reply } => {
                let result = self.scenario.eliminate_player(player);
                self.publish_outbox();
                if reply.send(result).is_err() {
                    debug!(target: "armada::runtime", "EliminatePlayer reply channel closed (caller dropped)");
                }
            }
            Command::Sync { team, reply } => {
                let result = self.scenario.sync(team);
                if reply.send(result).is_err() {
                    debug!(target: "armada::runtime", "Sync reply channel closed (caller dropped)");
                }
            }
            Command::CurrentTurn { reply } => {
                let _ = reply.send(self.scenario.current_turn());
            }
            Command::QueryPhase { reply } => {
                let _ = reply.send(self.scenario.phase());
            }
            Command::Shutdown { reply } => {
                let _ = reply.send(());
                return false;
            }
        }
        true
    }

    /// Arms a fresh deadline whenever the turn changed hands since the last
    /// arming; disarms once the game is no longer running.
    fn rearm_timer(&mut self) {
        let timeout = self.scenario.turns().turn_timeout();
        let Some(timeout) = timeout.filter(|_| self.enable_turn_timer && self.scenario.is_running())
        else {
            self.timer = None;
            return;
        };

        let epoch = self.scenario.turns().timer_epoch();
        if self.timer.is_some_and(|timer| timer.epoch == epoch) {
            return;
        }
        self.timer = Some(TurnTimer {
            epoch,
            deadline: Instant::now() + timeout,
        });
        debug!(target: "armada::runtime", epoch, ?timeout, "turn timer armed");
    }

    fn handle_timeout(&mut self) {
        let player = self.scenario.current_turn();
        info!(target: "armada::runtime", ?player, "turn timed out");

        match self.scenario.advance_turn() {
            Ok(next) => {
                debug!(target: "armada::runtime", ?next, "turn advanced after timeout");
            }
            Err(err) => {
                warn!(target: "armada::runtime", %err, "turn timeout could not advance");
                self.timer = None;
            }
        }
        self.publish_outbox();
        self.event_bus.publish(Event::TurnTimedOut { player });
    }

    fn publish_outbox(&mut self) {
        for dispatch in self.scenario.drain_outbox() {
            self.event_bus.publish(Event::Dispatch(dispatch));
        }
    }
}
