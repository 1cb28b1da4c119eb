// AI pick selection.
//
// Two phases: the team's strategy builds a shortlist, then one candidate is
// drawn with a rank-biased, jittered weighting so drafts vary run to run
// without drifting far from sensible picks.

use std::ops::RangeInclusive;

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::debug;

use super::roster::TeamRoster;
use super::strategy::{forced_needs, positional_need, top_where, PickContext, Strategy};
use crate::valuation::rankings::Player;

/// Shortlist size used when a strategy's own rule finds nobody.
pub const FALLBACK_SHORTLIST: usize = 8;

/// Per-candidate multiplicative noise applied before normalizing weights.
pub const WEIGHT_JITTER: RangeInclusive<f64> = 0.8..=1.2;

/// Draw an index in `0..len` with weight `1/(i+1)^p`, each weight scaled by
/// uniform noise from `jitter`.
///
/// Returns `None` only when `len` is zero.
pub fn rank_biased_choice<R: Rng + ?Sized>(
    len: usize,
    exponent: f64,
    jitter: RangeInclusive<f64>,
    rng: &mut R,
) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let weights: Vec<f64> = (0..len)
        .map(|i| {
            let base = 1.0 / ((i + 1) as f64).powf(exponent);
            base * rng.random_range(jitter.clone())
        })
        .collect();

    match WeightedIndex::new(&weights) {
        Ok(dist) => Some(dist.sample(rng)),
        // Only reachable with degenerate weights; take the top candidate.
        Err(_) => Some(0),
    }
}

/// Pool references ordered best rank first.
fn ranked_view(available: &[Player]) -> Vec<&Player> {
    let mut view: Vec<&Player> = available.iter().collect();
    view.sort_by_key(|p| p.overall_rank);
    view
}

/// Choose one player for an AI team.
///
/// Reads the roster and pool without modifying either. Returns `None` only
/// when the pool is empty.
pub fn select<'a, R: Rng + ?Sized>(
    roster: &TeamRoster,
    available: &'a [Player],
    ctx: &PickContext,
    strategy: Strategy,
    rng: &mut R,
) -> Option<&'a Player> {
    let pool = ranked_view(available);
    if pool.is_empty() {
        return None;
    }

    let (mut candidates, uniform) = match forced_needs(roster, &pool, ctx) {
        Some(forced) => (forced, false),
        None => {
            let list = strategy.shortlist(roster, &pool, ctx, rng);
            (list.candidates, list.uniform)
        }
    };

    if candidates.is_empty() {
        candidates = top_where(&pool, FALLBACK_SHORTLIST, |_| true);
    }

    let choice = if uniform {
        candidates.choose(rng).copied()
    } else {
        rank_biased_choice(candidates.len(), strategy.exponent(), WEIGHT_JITTER, rng)
            .map(|i| candidates[i])
    };

    if let Some(player) = choice {
        debug!(
            "{} ({}) round {}: {} from {} candidates",
            roster.label,
            strategy.name(),
            ctx.round,
            player.player_name,
            candidates.len()
        );
    }
    choice
}

/// Deterministic recommendations for the human team: the positional-need
/// shortlist, topped up with best available.
pub fn suggest<'a>(
    roster: &TeamRoster,
    available: &'a [Player],
    ctx: &PickContext,
    n: usize,
) -> Vec<&'a Player> {
    let pool = ranked_view(available);
    let mut picks = forced_needs(roster, &pool, ctx)
        .unwrap_or_else(|| positional_need(roster, &pool, ctx, n));
    picks.truncate(n);
    for p in pool {
        if picks.len() >= n {
            break;
        }
        if !picks.iter().any(|c| c.player_name == p.player_name) {
            picks.push(p);
        }
    }
    picks
}
