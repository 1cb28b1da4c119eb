// Draft state: pick pointer, available pool, rosters, and the pick log.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::order::round_for_pick;
use super::pick::DraftPick;
use super::roster::TeamRoster;
use crate::valuation::rankings::Player;

/// Lifecycle of a draft session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftPhase {
    /// Teams configured, pool not yet snapshotted.
    Setup,
    /// Pick loop active.
    InProgress,
    /// Every pick made (or the pool ran dry).
    Complete,
}

/// What the engine is waiting on for the current pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Nothing on the clock (setup or complete).
    Idle,
    /// The human is on the clock; suspended until a pick or the deadline.
    AwaitingHuman { team_index: usize },
    /// An AI team is "thinking" until `ready_at`.
    AiThinking { team_index: usize, ready_at: Instant },
}

/// Errors returned by draft operations. A rejected operation leaves the
/// state untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DraftError {
    #[error("the draft is not in progress")]
    NotInProgress,

    #[error("a draft is already in progress; cancel it first")]
    AlreadyInProgress,

    #[error("it is not your turn to pick")]
    NotHumanTurn,

    #[error("player '{0}' is not available")]
    PlayerUnavailable(String),

    #[error("cannot start a draft with an empty player pool")]
    EmptyPool,

    #[error("invalid draft settings: {0}")]
    InvalidSettings(String),

    #[error("player name '{0}' appears more than once in the pool")]
    DuplicatePlayer(String),
}

/// The complete mutable state of one draft session.
#[derive(Debug, Clone)]
pub struct DraftState {
    pub phase: DraftPhase,
    /// 1-based; equals `total_picks + 1` once the draft is complete.
    pub current_pick_number: u32,
    /// Undrafted players, kept in overall-rank order.
    pub available_players: Vec<Player>,
    /// One roster per team slot, indexed by draft position.
    pub rosters: Vec<TeamRoster>,
    /// Committed picks in order.
    pub picks: Vec<DraftPick>,
    /// Deadline for the pick currently on the clock.
    pub pick_deadline: Option<Instant>,
    pub turn: TurnState,
    pub num_teams: usize,
    pub rounds: u32,
}

impl DraftState {
    /// Fresh state in `Setup` with empty rosters.
    pub fn new(rosters: Vec<TeamRoster>, rounds: u32) -> Self {
        let num_teams = rosters.len();
        DraftState {
            phase: DraftPhase::Setup,
            current_pick_number: 1,
            available_players: Vec::new(),
            rosters,
            picks: Vec::new(),
            pick_deadline: None,
            turn: TurnState::Idle,
            num_teams,
            rounds,
        }
    }

    pub fn total_picks(&self) -> u32 {
        self.rounds * self.num_teams as u32
    }

    pub fn current_round(&self) -> u32 {
        round_for_pick(self.current_pick_number, self.num_teams)
    }

    /// Whether every pick has been made.
    pub fn picks_exhausted(&self) -> bool {
        self.current_pick_number > self.total_picks()
    }

    /// Clear picks and rosters and load a new pool snapshot.
    pub fn reset(&mut self, pool: &[Player]) {
        for roster in &mut self.rosters {
            roster.players.clear();
        }
        let mut available = pool.to_vec();
        available.sort_by_key(|p| p.overall_rank);
        self.available_players = available;
        self.picks.clear();
        self.current_pick_number = 1;
        self.pick_deadline = None;
        self.turn = TurnState::Idle;
    }

    /// Discard all session data and return to `Setup`.
    pub fn clear(&mut self) {
        self.reset(&[]);
        self.phase = DraftPhase::Setup;
    }

    /// Commit the current pick for `team_index`.
    ///
    /// Removes the player from the pool, labels the pick with the team's next
    /// template slot, appends to the roster and log, and advances the pick
    /// pointer. Rejected without side effects if the player is not available.
    pub fn commit_pick(
        &mut self,
        team_index: usize,
        player_name: &str,
        auto_pick: bool,
    ) -> Result<DraftPick, DraftError> {
        if self.phase != DraftPhase::InProgress {
            return Err(DraftError::NotInProgress);
        }
        let idx = self
            .available_players
            .iter()
            .position(|p| p.player_name == player_name)
            .ok_or_else(|| DraftError::PlayerUnavailable(player_name.to_string()))?;

        let player = self.available_players.remove(idx);
        let roster = &mut self.rosters[team_index];
        let pick = DraftPick {
            pick_number: self.current_pick_number,
            round_number: round_for_pick(self.current_pick_number, self.num_teams),
            team_index,
            team_label: roster.label.clone(),
            player_name: player.player_name.clone(),
            position: player.position,
            vbd_value: player.vbd_value,
            overall_rank: player.overall_rank,
            roster_slot: roster.next_slot(),
            auto_pick,
        };
        roster.push(player);

        info!(
            "Pick {} (R{}): {} -> {} {} [{}]{}",
            pick.pick_number,
            pick.round_number,
            pick.team_label,
            pick.position,
            pick.player_name,
            pick.roster_slot,
            if auto_pick { " (auto)" } else { "" }
        );

        self.picks.push(pick.clone());
        self.current_pick_number += 1;
        Ok(pick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::pick::{Position, RosterSlot};
    use crate::valuation::projections::PlayerRow;
    use crate::valuation::rankings::calculate_rankings;

    fn pool() -> Vec<Player> {
        let rows: Vec<PlayerRow> = (0..6)
            .map(|i| PlayerRow::new(&format!("P{i}"), Position::WideReceiver, 50.0 - i as f64))
            .collect();
        calculate_rankings(&rows).players
    }

    fn state() -> DraftState {
        let rosters = vec![TeamRoster::new("A", None), TeamRoster::new("B", None)];
        let mut state = DraftState::new(rosters, 3);
        state.reset(&pool());
        state.phase = DraftPhase::InProgress;
        state
    }

    #[test]
    fn new_state_is_setup() {
        let state = DraftState::new(vec![TeamRoster::new("A", None)], 12);
        assert_eq!(state.phase, DraftPhase::Setup);
        assert_eq!(state.current_pick_number, 1);
        assert_eq!(state.total_picks(), 12);
        assert!(state.available_players.is_empty());
    }

    #[test]
    fn commit_moves_player_to_roster() {
        let mut state = state();
        let pick = state.commit_pick(0, "P2", false).unwrap();
        assert_eq!(pick.pick_number, 1);
        assert_eq!(pick.round_number, 1);
        assert_eq!(pick.team_label, "A");
        assert_eq!(pick.roster_slot, RosterSlot::Qb);
        assert_eq!(state.current_pick_number, 2);
        assert_eq!(state.available_players.len(), 5);
        assert_eq!(state.rosters[0].players[0].player_name, "P2");
        assert_eq!(state.picks.len(), 1);
    }

    #[test]
    fn commit_of_unavailable_player_is_rejected() {
        let mut state = state();
        state.commit_pick(0, "P0", false).unwrap();
        let err = state.commit_pick(1, "P0", false).unwrap_err();
        assert_eq!(err, DraftError::PlayerUnavailable("P0".into()));
        assert_eq!(state.current_pick_number, 2);
        assert_eq!(state.available_players.len(), 5);
        assert!(state.rosters[1].is_empty());
    }

    #[test]
    fn commit_outside_progress_is_rejected() {
        let mut state = state();
        state.phase = DraftPhase::Complete;
        assert_eq!(
            state.commit_pick(0, "P0", false).unwrap_err(),
            DraftError::NotInProgress
        );
    }

    #[test]
    fn reset_restores_rank_order_and_clears() {
        let mut state = state();
        state.commit_pick(0, "P0", false).unwrap();
        let mut shuffled = pool();
        shuffled.reverse();
        state.reset(&shuffled);
        let ranks: Vec<u32> = state.available_players.iter().map(|p| p.overall_rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5, 6]);
        assert!(state.picks.is_empty());
        assert!(state.rosters[0].is_empty());
        assert_eq!(state.current_pick_number, 1);
    }

    #[test]
    fn clear_returns_to_setup() {
        let mut state = state();
        state.commit_pick(0, "P0", false).unwrap();
        state.clear();
        assert_eq!(state.phase, DraftPhase::Setup);
        assert!(state.available_players.is_empty());
        assert!(state.picks.is_empty());
    }
}
