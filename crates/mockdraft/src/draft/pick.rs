// Positions, roster slot labels, and the individual pick record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Football positions eligible for the draft pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "QB")]
    Quarterback,
    #[serde(rename = "RB")]
    RunningBack,
    #[serde(rename = "WR")]
    WideReceiver,
    #[serde(rename = "TE")]
    TightEnd,
    #[serde(rename = "K")]
    Kicker,
    #[serde(rename = "DEF")]
    Defense,
}

impl Position {
    /// Every position, in board display order.
    pub const ALL: [Position; 6] = [
        Position::Quarterback,
        Position::RunningBack,
        Position::WideReceiver,
        Position::TightEnd,
        Position::Kicker,
        Position::Defense,
    ];

    /// Parse a position string into a Position enum.
    ///
    /// Accepts the usual sheet spellings: "DST", "D/ST" and "D" all map to
    /// Defense, "PK" maps to Kicker. Case and surrounding whitespace are ignored.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(Position::Quarterback),
            "RB" => Some(Position::RunningBack),
            "WR" => Some(Position::WideReceiver),
            "TE" => Some(Position::TightEnd),
            "K" | "PK" => Some(Position::Kicker),
            "DEF" | "DST" | "D/ST" | "D" => Some(Position::Defense),
            _ => None,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
            Position::Kicker => "K",
            Position::Defense => "DEF",
        }
    }

    /// Whether this position can fill the FLEX slot.
    pub fn is_flex_eligible(&self) -> bool {
        matches!(
            self,
            Position::RunningBack | Position::WideReceiver | Position::TightEnd
        )
    }

    /// Kickers and team defenses: drafted late, devalued by the ranking.
    pub fn is_specialist(&self) -> bool {
        matches!(self, Position::Kicker | Position::Defense)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// Advisory roster slot label attached to each pick.
///
/// Slots never restrict what a team may draft; they only describe which part
/// of the lineup template a pick was expected to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RosterSlot {
    Qb,
    Wr,
    Rb,
    Te,
    Flex,
    K,
    Def,
    Bench,
}

impl RosterSlot {
    /// Return the display string for this slot.
    pub fn display_str(&self) -> &'static str {
        match self {
            RosterSlot::Qb => "QB",
            RosterSlot::Wr => "WR",
            RosterSlot::Rb => "RB",
            RosterSlot::Te => "TE",
            RosterSlot::Flex => "FLEX",
            RosterSlot::K => "K",
            RosterSlot::Def => "DEF",
            RosterSlot::Bench => "BENCH",
        }
    }

    /// Whether a player at `pos` matches this slot's expected position.
    ///
    /// FLEX accepts RB/WR/TE and BENCH accepts anything.
    pub fn accepts(&self, pos: Position) -> bool {
        match self {
            RosterSlot::Qb => pos == Position::Quarterback,
            RosterSlot::Wr => pos == Position::WideReceiver,
            RosterSlot::Rb => pos == Position::RunningBack,
            RosterSlot::Te => pos == Position::TightEnd,
            RosterSlot::Flex => pos.is_flex_eligible(),
            RosterSlot::K => pos == Position::Kicker,
            RosterSlot::Def => pos == Position::Defense,
            RosterSlot::Bench => true,
        }
    }
}

impl fmt::Display for RosterSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// A single committed draft pick. Never modified once appended to the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPick {
    /// Sequential pick number across the whole draft (1-indexed).
    pub pick_number: u32,
    /// Round the pick was made in (1-indexed).
    pub round_number: u32,
    /// 0-based team slot in draft order.
    pub team_index: usize,
    /// Display label of the drafting team.
    pub team_label: String,
    pub player_name: String,
    pub position: Position,
    pub vbd_value: f64,
    pub overall_rank: u32,
    /// Template slot this pick was labelled with.
    pub roster_slot: RosterSlot,
    /// True when the engine picked for the human after the timer ran out.
    #[serde(default)]
    pub auto_pick: bool,
}
