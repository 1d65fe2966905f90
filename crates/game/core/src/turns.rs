use std::time::Duration;

use tracing::debug;

use crate::ids::PlayerId;

/// How [`TurnManager::generate_turns`] interleaves teams.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TurnOrdering {
    /// All players of a team act back to back, team by team.
    Team,
    /// One player per team per sweep, round-robin.
    #[default]
    Player,
}

/// "Whose turn is it" state machine over an ordered list of players.
///
/// The manager does not own a clock. Every advance bumps
/// [`timer_epoch`](Self::timer_epoch); the runtime re-arms its timeout
/// whenever the epoch changes and calls back into the same advance on expiry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnManager {
    turn_order: Vec<PlayerId>,
    turn_index: usize,
    turn_timeout: Option<Duration>,
    timer_epoch: u64,
}

impl TurnManager {
    pub fn new(turn_timeout: Option<Duration>) -> Self {
        Self {
            turn_timeout,
            ..Self::default()
        }
    }

    /// Builds the turn order from each team's players (in team order).
    pub fn generate_turns(&mut self, ordering: TurnOrdering, teams: &[Vec<PlayerId>]) {
        self.turn_order = match ordering {
            TurnOrdering::Team => teams.iter().flatten().copied().collect(),
            TurnOrdering::Player => {
                let mut order = Vec::with_capacity(teams.iter().map(Vec::len).sum());
                let mut round = 0;
                loop {
                    let before = order.len();
                    order.extend(teams.iter().filter_map(|players| players.get(round)));
                    if order.len() == before {
                        break;
                    }
                    round += 1;
                }
                order
            }
        };
        self.turn_index = 0;
        self.timer_epoch += 1;

        debug!(
            target: "armada::turns",
            ?ordering,
            order = ?self.turn_order,
            "turn order generated"
        );
    }

    pub fn turn_order(&self) -> &[PlayerId] {
        &self.turn_order
    }

    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    pub fn current_turn(&self) -> Option<PlayerId> {
        self.turn_order.get(self.turn_index).copied()
    }

    pub fn turn_timeout(&self) -> Option<Duration> {
        self.turn_timeout
    }

    pub fn set_turn_timeout(&mut self, timeout: Option<Duration>) {
        self.turn_timeout = timeout;
        self.timer_epoch += 1;
    }

    /// Incremented every time the turn timeout must restart.
    pub fn timer_epoch(&self) -> u64 {
        self.timer_epoch
    }

    /// Moves to the next player for whom `is_lost` is false.
    ///
    /// If the sweep comes back to the starting index every other player is
    /// lost; the index stays where it started. The timer restarts either way.
    pub fn advance_turn(&mut self, is_lost: impl Fn(PlayerId) -> bool) -> usize {
        self.timer_epoch += 1;

        let len = self.turn_order.len();
        if len == 0 {
            return self.turn_index;
        }

        let start = self.turn_index;
        let mut index = start;
        loop {
            index = (index + 1) % len;
            if index == start || !is_lost(self.turn_order[index]) {
                break;
            }
        }
        self.turn_index = index;

        debug!(
            target: "armada::turns",
            from = start,
            to = index,
            player = ?self.current_turn(),
            "turn advanced"
        );
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: PlayerId = PlayerId(0);
    const B: PlayerId = PlayerId(1);
    const C: PlayerId = PlayerId(2);

    fn three_players() -> TurnManager {
        let mut turns = TurnManager::new(None);
        turns.generate_turns(TurnOrdering::Team, &[vec![A, B, C]]);
        turns
    }

    #[test]
    fn team_ordering_groups_players() {
        let mut turns = TurnManager::new(None);
        let teams = [
            vec![PlayerId(0), PlayerId(1), PlayerId(2)],
            vec![PlayerId(3), PlayerId(4), PlayerId(5)],
        ];
        turns.generate_turns(TurnOrdering::Team, &teams);
        assert_eq!(
            turns.turn_order(),
            &[0, 1, 2, 3, 4, 5].map(PlayerId)
        );
    }

    #[test]
    fn player_ordering_round_robins() {
        let mut turns = TurnManager::new(None);
        let teams = [
            vec![PlayerId(0), PlayerId(1), PlayerId(2)],
            vec![PlayerId(3), PlayerId(4), PlayerId(5)],
        ];
        turns.generate_turns(TurnOrdering::Player, &teams);
        assert_eq!(
            turns.turn_order(),
            &[0, 3, 1, 4, 2, 5].map(PlayerId)
        );
    }

    #[test]
    fn player_ordering_handles_uneven_teams() {
        let mut turns = TurnManager::new(None);
        let teams = [vec![PlayerId(0)], vec![PlayerId(1), PlayerId(2), PlayerId(3)]];
        turns.generate_turns(TurnOrdering::Player, &teams);
        assert_eq!(turns.turn_order(), &[0, 1, 2, 3].map(PlayerId));
    }

    #[test]
    fn advance_skips_lost_players() {
        let mut turns = three_players();
        let lost = |p: PlayerId| p == B;

        assert_eq!(turns.current_turn(), Some(A));
        turns.advance_turn(lost);
        assert_eq!(turns.current_turn(), Some(C));
        turns.advance_turn(lost);
        assert_eq!(turns.current_turn(), Some(A));
        for _ in 0..10 {
            turns.advance_turn(lost);
            assert_ne!(turns.current_turn(), Some(B));
        }
    }

    #[test]
    fn advance_with_everyone_lost_stays_put() {
        let mut turns = three_players();
        turns.advance_turn(|_| false);
        let start = turns.turn_index();

        for _ in 0..5 {
            assert_eq!(turns.advance_turn(|_| true), start);
        }
        assert_eq!(turns.current_turn(), Some(B));
    }

    #[test]
    fn every_advance_restarts_the_timer() {
        let mut turns = three_players();
        let epoch = turns.timer_epoch();
        turns.advance_turn(|_| false);
        turns.advance_turn(|_| true);
        assert_eq!(turns.timer_epoch(), epoch + 2);
    }

    #[test]
    fn empty_order_is_a_noop() {
        let mut turns = TurnManager::new(Some(Duration::from_secs(30)));
        assert_eq!(turns.advance_turn(|_| false), 0);
        assert_eq!(turns.current_turn(), None);
    }
}
