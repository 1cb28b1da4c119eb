// Integration tests for the mock draft.
//
// These exercise the system end to end through the library's public API:
// CSV ingestion, the ranking pipeline, snake order, full seeded drafts,
// unattended (timed-out) drafts, and grading.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use mockdraft::draft::engine::{DraftEngine, DraftSettings, TickOutcome};
use mockdraft::draft::order::{round_for_pick, team_for_pick, ROSTER_TEMPLATE};
use mockdraft::draft::pick::Position;
use mockdraft::draft::state::DraftPhase;
use mockdraft::draft::strategy::Strategy;
use mockdraft::grade::{grade, grade_league};
use mockdraft::valuation::projections::{load_players, PlayerRow};
use mockdraft::valuation::rankings::{calculate_rankings, DraftRound, Player, RankingReport};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

// ===========================================================================
// Test helpers
// ===========================================================================

fn crate_path(rel: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(rel)
}

/// 6 positions x 20 players with random VBD and a few stats columns.
fn synthetic_rows(seed: u64) -> Vec<PlayerRow> {
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut rows = Vec::new();
    for pos in Position::ALL {
        for i in 0..20 {
            let mut row = PlayerRow::new(
                &format!("{pos} Synthetic {i:02}"),
                pos,
                rng.random_range(-20.0..120.0),
            );
            row.points = Some(rng.random_range(80.0..360.0));
            row.bye_week = Some(rng.random_range(5..=14));
            row.stats.insert("Yds".into(), rng.random_range(0.0..1800.0));
            rows.push(row);
        }
    }
    rows
}

fn ranked(seed: u64) -> RankingReport {
    calculate_rankings(&synthetic_rows(seed))
}

fn engine_with(pool: Vec<Player>, strategies: &[Strategy], human_slot: usize, seed: u64) -> DraftEngine {
    let settings = DraftSettings {
        human_slot,
        ..DraftSettings::default()
    };
    DraftEngine::new(settings, pool, strategies, seed).expect("valid settings")
}

// ===========================================================================
// Ranking pipeline
// ===========================================================================

/// 6 positions x 20 players with VBD falling linearly from 100 by 4.
fn linear_rows() -> Vec<PlayerRow> {
    Position::ALL
        .iter()
        .flat_map(|&pos| {
            (0..20).map(move |i| {
                PlayerRow::new(&format!("{pos} Linear {:02}", i + 1), pos, 100.0 - 4.0 * i as f64)
            })
        })
        .collect()
}

fn adjusted_of(report: &RankingReport, name: &str) -> f64 {
    report
        .players
        .iter()
        .find(|p| p.player_name == name)
        .map(|p| p.adjusted_vbd)
        .unwrap_or_else(|| panic!("{name} not ranked"))
}

#[test]
fn ranking_scenario_six_positions_by_twenty() {
    let report = calculate_rankings(&linear_rows());
    assert_eq!(report.players.len(), 120);
    assert_eq!(report.dropped_rows, 0);

    let close = |a: f64, b: f64| (a - b).abs() < 1e-9;

    // Position leaders: vbd x scarcity x top tier.
    assert!(close(adjusted_of(&report, "QB Linear 01"), 100.0 * 0.7 * 1.2));
    assert!(close(adjusted_of(&report, "RB Linear 01"), 100.0 * 1.3 * 1.1));
    assert!(close(adjusted_of(&report, "WR Linear 01"), 100.0 * 1.1 * 1.05));
    assert!(close(adjusted_of(&report, "TE Linear 01"), 100.0 * 0.9 * 1.15));
    assert!(close(adjusted_of(&report, "K Linear 01"), 100.0 * 0.3 * 0.3));
    assert!(close(adjusted_of(&report, "DEF Linear 01"), 100.0 * 0.4 * 0.3));

    // Tier boundaries further down each position.
    assert!(close(adjusted_of(&report, "QB Linear 04"), 88.0 * 0.7 * 0.9));
    assert!(close(adjusted_of(&report, "QB Linear 13"), 52.0 * 0.7 * 0.7));
    assert!(close(adjusted_of(&report, "RB Linear 13"), 52.0 * 1.3 * 0.95));
    assert!(close(adjusted_of(&report, "WR Linear 09"), 68.0 * 1.1 * 1.0));
    assert!(close(adjusted_of(&report, "TE Linear 06"), 80.0 * 0.9 * 0.8));
    assert!(close(adjusted_of(&report, "TE Linear 13"), 52.0 * 0.9 * 1.0));

    assert_eq!(report.players[0].player_name, "RB Linear 01");
    assert_eq!(report.players[0].draft_round, DraftRound::Round1);

    // Linear VBD within a position gives position ranks in input order.
    for pos in Position::ALL {
        let ranks: Vec<(String, u32)> = report
            .top_by_position(pos, 20)
            .into_iter()
            .map(|p| (p.player_name.clone(), p.position_rank))
            .collect();
        let expected: Vec<(String, u32)> = (1..=20)
            .map(|r| (format!("{pos} Linear {r:02}"), r))
            .collect();
        assert_eq!(ranks, expected, "{pos}");
    }

    // Overall ranks are a gapless permutation and the list is sorted by them.
    let overall: Vec<u32> = report.players.iter().map(|p| p.overall_rank).collect();
    assert_eq!(overall, (1..=120).collect::<Vec<_>>());
    for p in &report.players {
        assert_eq!(p.draft_round, DraftRound::from_overall_rank(p.overall_rank));
    }
    for pair in report.players.windows(2) {
        assert!(pair[0].adjusted_vbd >= pair[1].adjusted_vbd);
    }
}

#[test]
fn random_pool_ranks_are_consistent() {
    let report = ranked(7);
    assert_eq!(report.players.len(), 120);

    // Within a position, higher raw VBD never ranks worse.
    for a in &report.players {
        for b in &report.players {
            if a.position == b.position && a.vbd_value > b.vbd_value {
                assert!(a.position_rank < b.position_rank);
            }
        }
    }
}

#[test]
fn value_pick_flag_agrees_with_prediction() {
    let report = ranked(11);
    for p in &report.players {
        assert_eq!(p.value_pick, p.vbd_value > p.predicted_vbd, "{}", p.player_name);
    }
}

#[test]
fn fixture_csv_loads_and_ranks() {
    let rows = load_players(&crate_path("tests/fixtures/players.csv")).unwrap();
    // The LB row is skipped at load time.
    assert_eq!(rows.len(), 14);
    assert!(rows.iter().all(|r| r.player_name != "Jordan Rutherford"));

    let dunmore = rows.iter().find(|r| r.player_name == "Cole Dunmore").unwrap();
    assert_eq!(dunmore.vbd_value, None);
    assert_eq!(dunmore.news.as_deref(), Some("Holdout"));

    let defense = rows
        .iter()
        .find(|r| r.player_name == "Baltimore Defense")
        .unwrap();
    assert_eq!(defense.position, Position::Defense);
    assert_eq!(defense.stats.get("Rush_Yds"), Some(&0.0));

    // Blank name and missing VBD are dropped.
    let report = calculate_rankings(&rows);
    assert_eq!(report.dropped_rows, 2);
    assert_eq!(report.players.len(), 12);
    assert_eq!(report.players[0].player_name, "Andre Sandoval");
    assert_eq!(report.players[0].vbd_value, 1004.5);
    assert_eq!(report.top_by_position(Position::Quarterback, 5).len(), 2);
}

#[test]
fn repeated_name_keeps_one_draftable_player() {
    let mut rows = synthetic_rows(4);
    rows.push(PlayerRow::new("Mike Williams", Position::WideReceiver, 150.0));
    rows.push(PlayerRow::new("Mike Williams", Position::TightEnd, 5.0));
    let report = calculate_rankings(&rows);
    assert_eq!(report.dropped_rows, 1);

    let mut engine = engine_with(report.players, &Strategy::ALL, 0, 21);
    engine.start(Instant::now()).unwrap();
    let found = engine.find_available("Mike Williams");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].position, Position::WideReceiver);

    let before = engine.available().len();
    let pick = engine
        .commit_human_pick("Mike Williams", Instant::now())
        .unwrap();
    assert_eq!(pick.position, Position::WideReceiver);
    assert_eq!(engine.available().len(), before - 1);
    assert!(engine.find_available("Mike Williams").is_empty());
}

#[test]
fn missing_csv_is_an_error() {
    assert!(load_players(&crate_path("tests/fixtures/nope.csv")).is_err());
}

// ===========================================================================
// Draft order
// ===========================================================================

#[test]
fn snake_order_for_first_two_rounds() {
    let teams: Vec<usize> = (1..=20).map(|p| team_for_pick(p, 10)).collect();
    assert_eq!(
        teams,
        vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0]
    );
    assert_eq!(round_for_pick(10, 10), 1);
    assert_eq!(round_for_pick(11, 10), 2);
    assert_eq!(round_for_pick(120, 10), 12);
}

// ===========================================================================
// Full drafts
// ===========================================================================

#[test]
fn seeded_draft_fills_every_roster() {
    let pool = ranked(3).players;
    let mut engine = engine_with(pool, &Strategy::ALL, 0, 42);
    let now = Instant::now();
    engine.start(now).unwrap();
    let picks = engine.simulate_remaining(now).unwrap();

    assert_eq!(picks.len(), 120);
    assert_eq!(engine.phase(), DraftPhase::Complete);
    assert!(engine.available().is_empty());

    let names: HashSet<&str> = picks.iter().map(|p| p.player_name.as_str()).collect();
    assert_eq!(names.len(), 120, "a player was drafted twice");

    for (i, pick) in picks.iter().enumerate() {
        let number = i as u32 + 1;
        assert_eq!(pick.pick_number, number);
        assert_eq!(pick.round_number, round_for_pick(number, 10));
        assert_eq!(pick.team_index, team_for_pick(number, 10));
    }

    for (team, roster) in engine.rosters().iter().enumerate() {
        assert_eq!(roster.len(), 12);
        let slots: Vec<_> = picks
            .iter()
            .filter(|p| p.team_index == team)
            .map(|p| p.roster_slot)
            .collect();
        assert_eq!(slots, ROSTER_TEMPLATE.to_vec());
    }
}

#[test]
fn same_seed_reproduces_the_draft() {
    let run = || {
        let mut engine = engine_with(ranked(5).players, &Strategy::ALL, 3, 1234);
        engine.start(Instant::now()).unwrap();
        engine
            .simulate_remaining(Instant::now())
            .unwrap()
            .into_iter()
            .map(|p| (p.team_index, p.player_name))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn unattended_value_based_draft_completes() {
    let pool = ranked(9).players;
    let mut engine = engine_with(pool, &[Strategy::ValueBased], 5, 8);
    let mut now = Instant::now();
    engine.start(now).unwrap();

    let mut remaining = engine.available().len();
    let mut picks = 0;
    while engine.phase() == DraftPhase::InProgress {
        now += Duration::from_secs(61);
        match engine.tick(now) {
            TickOutcome::Picked(_) | TickOutcome::AutoPicked(_) => {
                picks += 1;
                assert_eq!(engine.available().len(), remaining - 1);
                remaining -= 1;
            }
            TickOutcome::Complete => break,
            other => panic!("unexpected tick outcome {other:?}"),
        }
        assert!(picks <= 120);
    }

    assert_eq!(picks, 120);
    assert_eq!(engine.phase(), DraftPhase::Complete);
    assert_eq!(engine.picks().len(), 120);
    assert!(engine
        .picks()
        .iter()
        .filter(|p| p.team_index == 5)
        .all(|p| p.auto_pick));
}

#[test]
fn bundled_player_data_supports_a_full_draft() {
    let rows = load_players(&crate_path("data/players.csv")).unwrap();
    let report = calculate_rankings(&rows);
    assert!(report.players.len() >= 120);
    for pos in Position::ALL {
        assert!(report.top_by_position(pos, 10).len() == 10, "{pos}");
    }

    let mut engine = engine_with(report.players, &Strategy::ALL, 4, 77);
    engine.start(Instant::now()).unwrap();
    engine.simulate_remaining(Instant::now()).unwrap();
    for row in grade_league(engine.rosters()) {
        assert!(row.grade.is_complete(), "{}", row.team_label);
        assert!((0.0..=100.0).contains(&row.grade.score));
    }
}

// ===========================================================================
// Grading
// ===========================================================================

#[test]
fn grading_incomplete_and_complete_rosters() {
    let mut engine = engine_with(ranked(2).players, &Strategy::ALL, 0, 6);
    engine.start(Instant::now()).unwrap();

    // Mid-draft the human roster is short.
    let first = engine.available()[0].player_name.clone();
    engine.commit_human_pick(&first, Instant::now()).unwrap();
    let partial = grade(&engine.human_roster().players);
    assert_eq!(partial.score, 0.0);
    assert_eq!(partial.letter_grade, "F");

    engine.simulate_remaining(Instant::now()).unwrap();
    let roster = &engine.human_roster().players;
    let a = grade(roster);
    let b = grade(roster);
    assert!(a.is_complete());
    assert_eq!(a, b);
}
