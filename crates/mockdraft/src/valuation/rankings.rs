// VBD ranking pipeline.
//
// Turns raw player rows into a single draft board: per-position rank,
// scarcity/tier adjusted VBD, overall rank, draft-round recommendation, and
// the value-pick flag from the regression model.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::draft::pick::Position;
use crate::valuation::projections::PlayerRow;
use crate::valuation::regression::{apply_value_model, ModelStatus};

// ---------------------------------------------------------------------------
// Ranked player
// ---------------------------------------------------------------------------

/// A draft-eligible player with every ranking field filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub player_name: String,
    pub position: Position,
    pub team: String,
    pub bye_week: Option<u8>,
    /// Value over replacement. K/DEF arrive pre-inverted so higher is better.
    pub vbd_value: f64,
    pub points: Option<f64>,
    pub news: Option<String>,
    pub stats: BTreeMap<String, f64>,
    /// Rank within position by `vbd_value`, 1 = best.
    pub position_rank: u32,
    /// `vbd_value` after scarcity and tier multipliers.
    pub adjusted_vbd: f64,
    /// Rank across the whole pool by `adjusted_vbd`, 1 = best.
    pub overall_rank: u32,
    pub draft_round: DraftRound,
    pub predicted_vbd: f64,
    pub value_pick: bool,
}

// ---------------------------------------------------------------------------
// Draft round recommendation
// ---------------------------------------------------------------------------

/// Recommended draft window for a player, assuming a 12-team league.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DraftRound {
    Round1,
    Round2,
    Round3,
    Round4,
    Round5,
    Rounds6To7,
    Rounds8To10,
    Rounds11To13,
    Rounds14To15,
    Waiver,
}

impl DraftRound {
    /// Map an overall rank onto its recommended round window.
    pub fn from_overall_rank(rank: u32) -> Self {
        match rank {
            0..=12 => DraftRound::Round1,
            13..=24 => DraftRound::Round2,
            25..=36 => DraftRound::Round3,
            37..=48 => DraftRound::Round4,
            49..=60 => DraftRound::Round5,
            61..=84 => DraftRound::Rounds6To7,
            85..=120 => DraftRound::Rounds8To10,
            121..=156 => DraftRound::Rounds11To13,
            157..=180 => DraftRound::Rounds14To15,
            _ => DraftRound::Waiver,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DraftRound::Round1 => "Round 1",
            DraftRound::Round2 => "Round 2",
            DraftRound::Round3 => "Round 3",
            DraftRound::Round4 => "Round 4",
            DraftRound::Round5 => "Round 5",
            DraftRound::Rounds6To7 => "Rounds 6-7",
            DraftRound::Rounds8To10 => "Rounds 8-10",
            DraftRound::Rounds11To13 => "Rounds 11-13",
            DraftRound::Rounds14To15 => "Rounds 14-15",
            DraftRound::Waiver => "Round 16 / Waiver",
        }
    }
}

impl fmt::Display for DraftRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Positional adjustment
// ---------------------------------------------------------------------------

/// Flat multiplier reflecting how positional depth affects draft value.
pub fn scarcity_factor(position: Position) -> f64 {
    match position {
        Position::Quarterback => 0.7,
        Position::RunningBack => 1.3,
        Position::WideReceiver => 1.1,
        Position::TightEnd => 0.9,
        Position::Kicker => 0.3,
        Position::Defense => 0.4,
    }
}

/// Tier multiplier keyed on rank within position, applied on top of
/// [`scarcity_factor`].
pub fn tier_multiplier(position: Position, position_rank: u32) -> f64 {
    match position {
        Position::Quarterback => match position_rank {
            0..=3 => 1.2,
            4..=12 => 0.9,
            _ => 0.7,
        },
        Position::RunningBack => match position_rank {
            0..=12 => 1.1,
            13..=24 => 0.95,
            _ => 1.0,
        },
        Position::WideReceiver => {
            if position_rank <= 8 {
                1.05
            } else {
                1.0
            }
        }
        Position::TightEnd => match position_rank {
            0..=5 => 1.15,
            6..=12 => 0.8,
            _ => 1.0,
        },
        Position::Kicker | Position::Defense => 0.3,
    }
}

/// `vbd_value × scarcity × tier`.
pub fn adjusted_vbd(position: Position, position_rank: u32, vbd_value: f64) -> f64 {
    vbd_value * scarcity_factor(position) * tier_multiplier(position, position_rank)
}

// ---------------------------------------------------------------------------
// Ranking helpers
// ---------------------------------------------------------------------------

/// Descending comparison that keeps NaN-free floats total and stable.
fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Gapless 1..N ranks for `indices` ordered by `key` descending.
///
/// Ties keep their relative input order, so ranks never repeat.
fn ordinal_ranks(indices: &[usize], key: impl Fn(usize) -> f64) -> HashMap<usize, u32> {
    let mut sorted = indices.to_vec();
    sorted.sort_by(|&a, &b| desc(key(a), key(b)));
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, idx)| (idx, i as u32 + 1))
        .collect()
}

// ---------------------------------------------------------------------------
// Pipeline entry point
// ---------------------------------------------------------------------------

/// Result of a ranking run.
#[derive(Debug, Clone)]
pub struct RankingReport {
    /// Ranked players, sorted by `overall_rank`.
    pub players: Vec<Player>,
    /// Rows discarded for a missing name, a non-numeric VBD, or a repeated name.
    pub dropped_rows: usize,
    pub model: ModelStatus,
}

impl RankingReport {
    /// Best `n` players at one position, in rank order.
    pub fn top_by_position(&self, position: Position, n: usize) -> Vec<&Player> {
        self.players
            .iter()
            .filter(|p| p.position == position)
            .take(n)
            .collect()
    }

    /// Number of ranked players at each position.
    pub fn position_counts(&self) -> BTreeMap<Position, usize> {
        let mut counts = BTreeMap::new();
        for p in &self.players {
            *counts.entry(p.position).or_insert(0) += 1;
        }
        counts
    }
}

/// Keep one row per player name (case-insensitive), the one with the higher
/// VBD; on a tie the earlier row wins. Picks are committed by name, so two
/// players sharing one could never be told apart on the board.
fn dedupe_names(clean: Vec<(&PlayerRow, f64)>) -> Vec<(&PlayerRow, f64)> {
    let mut best: HashMap<String, usize> = HashMap::with_capacity(clean.len());
    for (i, (row, vbd)) in clean.iter().enumerate() {
        let key = row.player_name.trim().to_lowercase();
        match best.get(&key) {
            Some(&kept) if clean[kept].1 >= *vbd => {}
            _ => {
                best.insert(key, i);
            }
        }
    }

    let keep: HashSet<usize> = best.into_values().collect();
    let mut out = Vec::with_capacity(keep.len());
    for (i, entry) in clean.into_iter().enumerate() {
        if keep.contains(&i) {
            out.push(entry);
        } else {
            warn!(
                "dropping duplicate row for '{}' ({}, VBD {:.1})",
                entry.0.player_name.trim(),
                entry.0.position,
                entry.1
            );
        }
    }
    out
}

/// Rank a player pool.
///
/// 1. Drop rows with no name or a missing/non-finite VBD value, and all but
///    the highest-VBD row of any repeated name.
/// 2. Rank by VBD within each position.
/// 3. Apply scarcity and tier multipliers.
/// 4. Rank the adjusted value across the pool and assign a draft round.
/// 5. Fit the value-pick model (falls back silently when it cannot fit).
///
/// The input is not modified; output order is by overall rank.
pub fn calculate_rankings(rows: &[PlayerRow]) -> RankingReport {
    let clean: Vec<(&PlayerRow, f64)> = rows
        .iter()
        .filter_map(|row| {
            let vbd = row.vbd_value.filter(|v| v.is_finite())?;
            (!row.player_name.trim().is_empty()).then_some((row, vbd))
        })
        .collect();

    let invalid = rows.len() - clean.len();
    if invalid > 0 {
        warn!(
            "dropped {} of {} rows with a missing name or non-numeric VBD",
            invalid,
            rows.len()
        );
    }

    let clean = dedupe_names(clean);
    let dropped_rows = rows.len() - clean.len();

    // Position ranks, computed independently per position.
    let mut position_ranks: HashMap<usize, u32> = HashMap::with_capacity(clean.len());
    for pos in Position::ALL {
        let members: Vec<usize> = (0..clean.len())
            .filter(|&i| clean[i].0.position == pos)
            .collect();
        position_ranks.extend(ordinal_ranks(&members, |i| clean[i].1));
    }

    let adjusted: Vec<f64> = clean
        .iter()
        .enumerate()
        .map(|(i, (row, vbd))| adjusted_vbd(row.position, position_ranks[&i], *vbd))
        .collect();

    let all: Vec<usize> = (0..clean.len()).collect();
    let overall_ranks = ordinal_ranks(&all, |i| adjusted[i]);

    let mut players: Vec<Player> = clean
        .iter()
        .enumerate()
        .map(|(i, (row, vbd))| {
            let overall_rank = overall_ranks[&i];
            Player {
                player_name: row.player_name.trim().to_string(),
                position: row.position,
                team: row.team.clone(),
                bye_week: row.bye_week,
                vbd_value: *vbd,
                points: row.points,
                news: row.news.clone(),
                stats: row.stats.clone(),
                position_rank: position_ranks[&i],
                adjusted_vbd: adjusted[i],
                overall_rank,
                draft_round: DraftRound::from_overall_rank(overall_rank),
                predicted_vbd: *vbd,
                value_pick: false,
            }
        })
        .collect();

    players.sort_by_key(|p| p.overall_rank);

    let model = apply_value_model(&mut players);

    info!(
        "ranked {} players ({} dropped)",
        players.len(),
        dropped_rows
    );

    RankingReport {
        players,
        dropped_rows,
        model,
    }
}
