// Team rosters and positional requirements.

use serde::{Deserialize, Serialize};

use super::order::roster_slot_for_team_pick;
use super::pick::{Position, RosterSlot};
use super::strategy::Strategy;
use crate::valuation::rankings::Player;

/// Minimum count of each position a complete lineup needs.
pub const MIN_REQUIREMENTS: [(Position, usize); 6] = [
    (Position::Quarterback, 1),
    (Position::RunningBack, 2),
    (Position::WideReceiver, 2),
    (Position::TightEnd, 1),
    (Position::Kicker, 1),
    (Position::Defense, 1),
];

/// One team's drafted players, in pick order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRoster {
    /// Display label (e.g. "You", "Team 3 (Zero RB)").
    pub label: String,
    /// Drafting personality; `None` for the human team.
    pub strategy: Option<Strategy>,
    pub players: Vec<Player>,
}

impl TeamRoster {
    pub fn new(label: &str, strategy: Option<Strategy>) -> Self {
        TeamRoster {
            label: label.to_string(),
            strategy,
            players: Vec::new(),
        }
    }

    pub fn is_human(&self) -> bool {
        self.strategy.is_none()
    }

    /// Number of picks made so far.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Number of drafted players at `position`.
    pub fn count(&self, position: Position) -> usize {
        self.players.iter().filter(|p| p.position == position).count()
    }

    /// Template slot the team's next pick will be labelled with.
    pub fn next_slot(&self) -> RosterSlot {
        roster_slot_for_team_pick(self.players.len() + 1)
    }

    /// Positions still below their minimum requirement, in requirement order.
    pub fn unmet_needs(&self) -> Vec<Position> {
        MIN_REQUIREMENTS
            .iter()
            .filter(|(pos, min)| self.count(*pos) < *min)
            .map(|(pos, _)| *pos)
            .collect()
    }

    /// Total number of required players not yet drafted.
    pub fn missing_starters(&self) -> usize {
        MIN_REQUIREMENTS
            .iter()
            .map(|(pos, min)| min.saturating_sub(self.count(*pos)))
            .sum()
    }

    /// Sum of `vbd_value` across the roster.
    pub fn total_vbd(&self) -> f64 {
        self.players.iter().map(|p| p.vbd_value).sum()
    }

    pub(crate) fn push(&mut self, player: Player) {
        self.players.push(player);
    }
}
