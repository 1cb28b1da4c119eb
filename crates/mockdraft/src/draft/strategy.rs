// AI drafting personalities.
//
// Every personality is one variant of `Strategy`: a shortlist rule plus the
// exponent used by the rank-biased draw in `agent`. Shortlists are built over
// a borrowed, rank-ordered view of the pool and never touch the pool itself.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::pick::Position;
use super::roster::TeamRoster;
use crate::valuation::rankings::Player;

/// Default shortlist length when a rule does not pick its own.
pub const DEFAULT_SHORTLIST: usize = 6;

/// Chance per pick that a contrarian team goes off-script.
pub const CONTRARIAN_RATE: f64 = 0.25;

/// The nine AI drafting personalities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    ZeroRb,
    RbHeavy,
    #[serde(alias = "best_available")]
    ValueBased,
    #[serde(alias = "positional_need")]
    Balanced,
    LateRoundQb,
    TePremium,
    #[serde(alias = "sleeper_hunter", alias = "analytics_heavy", alias = "aggressive")]
    UpsideHunter,
    #[serde(alias = "conservative")]
    SafeFloor,
    Contrarian,
}

impl Strategy {
    /// All nine personalities, in the order AI teams are seated by default.
    pub const ALL: [Strategy; 9] = [
        Strategy::ZeroRb,
        Strategy::RbHeavy,
        Strategy::ValueBased,
        Strategy::Balanced,
        Strategy::LateRoundQb,
        Strategy::TePremium,
        Strategy::UpsideHunter,
        Strategy::SafeFloor,
        Strategy::Contrarian,
    ];

    /// Rank-bias exponent `p` for the weighted draw. Higher means the team
    /// sticks closer to the top of its shortlist.
    pub fn exponent(&self) -> f64 {
        match self {
            Strategy::ZeroRb => 1.2,
            Strategy::RbHeavy => 1.2,
            Strategy::ValueBased => 2.0,
            Strategy::Balanced => 1.5,
            Strategy::LateRoundQb => 1.3,
            Strategy::TePremium => 1.2,
            Strategy::UpsideHunter => 0.7,
            Strategy::SafeFloor => 1.8,
            Strategy::Contrarian => 1.0,
        }
    }

    /// Config/CLI name (snake_case), matching the serde form.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::ZeroRb => "zero_rb",
            Strategy::RbHeavy => "rb_heavy",
            Strategy::ValueBased => "value_based",
            Strategy::Balanced => "balanced",
            Strategy::LateRoundQb => "late_round_qb",
            Strategy::TePremium => "te_premium",
            Strategy::UpsideHunter => "upside_hunter",
            Strategy::SafeFloor => "safe_floor",
            Strategy::Contrarian => "contrarian",
        }
    }

    /// Human-readable label for team names.
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::ZeroRb => "Zero RB",
            Strategy::RbHeavy => "RB Heavy",
            Strategy::ValueBased => "Value Based",
            Strategy::Balanced => "Balanced",
            Strategy::LateRoundQb => "Late-Round QB",
            Strategy::TePremium => "TE Premium",
            Strategy::UpsideHunter => "Upside Hunter",
            Strategy::SafeFloor => "Safe Floor",
            Strategy::Contrarian => "Contrarian",
        }
    }

    /// Parse a config name, accepting the same aliases as serde.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "zero_rb" => Some(Strategy::ZeroRb),
            "rb_heavy" => Some(Strategy::RbHeavy),
            "value_based" | "best_available" => Some(Strategy::ValueBased),
            "balanced" | "positional_need" => Some(Strategy::Balanced),
            "late_round_qb" => Some(Strategy::LateRoundQb),
            "te_premium" => Some(Strategy::TePremium),
            "upside_hunter" | "sleeper_hunter" | "analytics_heavy" | "aggressive" => {
                Some(Strategy::UpsideHunter)
            }
            "safe_floor" | "conservative" => Some(Strategy::SafeFloor),
            "contrarian" => Some(Strategy::Contrarian),
            _ => None,
        }
    }

    /// Build this personality's shortlist for one pick.
    ///
    /// `pool` must be ordered best rank first. An empty result means the
    /// caller falls back to plain best-available.
    pub fn shortlist<'a, R: Rng + ?Sized>(
        &self,
        roster: &TeamRoster,
        pool: &[&'a Player],
        ctx: &PickContext,
        rng: &mut R,
    ) -> Shortlist<'a> {
        let ranked = |candidates: Vec<&'a Player>| Shortlist {
            candidates,
            uniform: false,
        };

        match self {
            Strategy::ZeroRb => {
                if ctx.round <= 6 {
                    let allow_qb = ctx.round == 1 && roster.count(Position::Quarterback) == 0;
                    ranked(top_where(pool, 6, |p| {
                        matches!(p.position, Position::WideReceiver | Position::TightEnd)
                            || (allow_qb && p.position == Position::Quarterback)
                    }))
                } else {
                    ranked(positional_need(roster, pool, ctx, 6))
                }
            }
            Strategy::RbHeavy => {
                if ctx.round <= 8 && roster.count(Position::RunningBack) < 3 {
                    ranked(top_where(pool, 5, |p| p.position == Position::RunningBack))
                } else {
                    ranked(positional_need(roster, pool, ctx, 6))
                }
            }
            Strategy::ValueBased => ranked(top_where(pool, 5, |_| true)),
            Strategy::Balanced => ranked(positional_need(roster, pool, ctx, DEFAULT_SHORTLIST)),
            Strategy::LateRoundQb => {
                if ctx.round < 8 {
                    let without_qb: Vec<&'a Player> = pool
                        .iter()
                        .copied()
                        .filter(|p| p.position != Position::Quarterback)
                        .collect();
                    ranked(positional_need(roster, &without_qb, ctx, 6))
                } else {
                    ranked(positional_need(roster, pool, ctx, 6))
                }
            }
            Strategy::TePremium => {
                if ctx.round <= 4 && roster.count(Position::TightEnd) == 0 {
                    ranked(top_where(pool, 4, |p| p.position == Position::TightEnd))
                } else {
                    ranked(positional_need(roster, pool, ctx, 6))
                }
            }
            Strategy::UpsideHunter => {
                let cutoff = upper_quartile(pool.iter().map(|p| p.vbd_value));
                ranked(top_where(pool, 8, |p| {
                    p.value_pick || cutoff.is_some_and(|c| p.vbd_value >= c)
                }))
            }
            Strategy::SafeFloor => ranked(top_where(pool, 6, |p| {
                p.vbd_value >= 8.0 && p.overall_rank <= 80
            })),
            Strategy::Contrarian => {
                if rng.random_bool(CONTRARIAN_RATE) {
                    let off_script = contrarian_targets(roster, pool);
                    if !off_script.is_empty() {
                        return Shortlist {
                            candidates: off_script,
                            uniform: true,
                        };
                    }
                }
                ranked(positional_need(roster, pool, ctx, DEFAULT_SHORTLIST))
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Shortlist support
// ---------------------------------------------------------------------------

/// Where in the draft a pick happens, from the drafting team's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickContext {
    /// Current round, 1-indexed.
    pub round: u32,
    /// Total rounds in the draft.
    pub rounds: u32,
    /// Picks this team still has, counting the current one.
    pub picks_remaining: usize,
}

impl PickContext {
    pub fn new(round: u32, rounds: u32, picks_remaining: usize) -> Self {
        PickContext {
            round,
            rounds,
            picks_remaining,
        }
    }

    /// Whether kicker and defense needs count yet (the last three rounds).
    pub fn in_specialist_window(&self) -> bool {
        self.round + 2 >= self.rounds
    }
}

/// Candidates for one pick, best first.
#[derive(Debug, Clone, Default)]
pub struct Shortlist<'a> {
    pub candidates: Vec<&'a Player>,
    /// Draw with equal probability instead of rank bias.
    pub uniform: bool,
}

/// First `n` players matching `keep`, preserving pool order.
pub fn top_where<'a>(
    pool: &[&'a Player],
    n: usize,
    keep: impl Fn(&Player) -> bool,
) -> Vec<&'a Player> {
    pool.iter().copied().filter(|p| keep(p)).take(n).collect()
}

/// Players at positions where the roster is still short of its minimum.
///
/// Kicker and defense needs only count inside the specialist window. With no
/// open needs the shortlist is best available, skipping specialists.
pub fn positional_need<'a>(
    roster: &TeamRoster,
    pool: &[&'a Player],
    ctx: &PickContext,
    n: usize,
) -> Vec<&'a Player> {
    let needs: Vec<Position> = roster
        .unmet_needs()
        .into_iter()
        .filter(|pos| !pos.is_specialist() || ctx.in_specialist_window())
        .collect();

    if !needs.is_empty() {
        let shortlist = top_where(pool, n, |p| needs.contains(&p.position));
        if !shortlist.is_empty() {
            return shortlist;
        }
    }
    top_where(pool, n, |p| !p.position.is_specialist())
}

/// When the team has no more picks left than open starter spots, only those
/// positions are considered, whatever the personality.
pub fn forced_needs<'a>(
    roster: &TeamRoster,
    pool: &[&'a Player],
    ctx: &PickContext,
) -> Option<Vec<&'a Player>> {
    let missing = roster.missing_starters();
    if missing == 0 || ctx.picks_remaining > missing {
        return None;
    }
    let needs = roster.unmet_needs();
    let shortlist = top_where(pool, DEFAULT_SHORTLIST, |p| needs.contains(&p.position));
    (!shortlist.is_empty()).then_some(shortlist)
}

/// Best available K, DEF and TE, plus a QB if the team has none.
fn contrarian_targets<'a>(roster: &TeamRoster, pool: &[&'a Player]) -> Vec<&'a Player> {
    let mut targets = vec![Position::Kicker, Position::Defense, Position::TightEnd];
    if roster.count(Position::Quarterback) == 0 {
        targets.push(Position::Quarterback);
    }
    targets
        .into_iter()
        .filter_map(|pos| pool.iter().copied().find(|p| p.position == pos))
        .collect()
}

/// 75th percentile (nearest rank) of the values, `None` when empty.
fn upper_quartile(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sorted: Vec<f64> = values.filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let idx = ((sorted.len() as f64) * 0.75).ceil() as usize;
    Some(sorted[idx.saturating_sub(1).min(sorted.len() - 1)])
}
