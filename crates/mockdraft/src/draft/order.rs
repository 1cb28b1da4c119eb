// Snake-draft pick order and the advisory roster-slot template.

use super::pick::RosterSlot;

/// Lineup template a team is expected to fill, one entry per pick.
pub const ROSTER_TEMPLATE: [RosterSlot; 12] = [
    RosterSlot::Qb,
    RosterSlot::Wr,
    RosterSlot::Wr,
    RosterSlot::Rb,
    RosterSlot::Rb,
    RosterSlot::Te,
    RosterSlot::Flex,
    RosterSlot::K,
    RosterSlot::Def,
    RosterSlot::Bench,
    RosterSlot::Bench,
    RosterSlot::Bench,
];

/// Round (1-indexed) that an absolute pick number falls in.
pub fn round_for_pick(pick_number: u32, num_teams: usize) -> u32 {
    let teams = num_teams.max(1) as u32;
    pick_number.max(1).div_ceil(teams)
}

/// 0-based team index that owns `pick_number` in a snake draft.
///
/// Odd rounds run left to right, even rounds right to left, so every team
/// picks exactly once per round and the turn order reverses each round.
pub fn team_for_pick(pick_number: u32, num_teams: usize) -> usize {
    let teams = num_teams.max(1);
    let round = round_for_pick(pick_number, teams);
    let position_in_round = ((pick_number.max(1) - 1) as usize % teams) + 1;

    if round % 2 == 1 {
        position_in_round - 1
    } else {
        teams - position_in_round
    }
}

/// Template slot for a team's `team_pick_number`-th pick (1-indexed).
///
/// Anything outside the template, including 0, is labelled BENCH.
pub fn roster_slot_for_team_pick(team_pick_number: usize) -> RosterSlot {
    team_pick_number
        .checked_sub(1)
        .and_then(|idx| ROSTER_TEMPLATE.get(idx))
        .copied()
        .unwrap_or(RosterSlot::Bench)
}

/// Total number of picks in a draft.
pub fn total_picks(rounds: u32, num_teams: usize) -> u32 {
    rounds * num_teams as u32
}

/// Absolute pick numbers owned by `team_index`, in order.
pub fn picks_for_team(team_index: usize, rounds: u32, num_teams: usize) -> Vec<u32> {
    (1..=total_picks(rounds, num_teams))
        .filter(|&pick| team_for_pick(pick, num_teams) == team_index)
        .collect()
}
