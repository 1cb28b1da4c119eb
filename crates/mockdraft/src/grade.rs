// Post-draft roster grading.

use serde::{Deserialize, Serialize};

use crate::draft::order::ROSTER_TEMPLATE;
use crate::draft::pick::RosterSlot;
use crate::draft::roster::{TeamRoster, MIN_REQUIREMENTS};
use crate::draft::strategy::Strategy;
use crate::valuation::rankings::Player;

/// Roster size a grade requires.
pub const GRADED_ROSTER_SIZE: usize = 12;

const STARTERS: usize = 9;
const EARLY_PICKS: usize = 6;
/// Picks 1..=7: a kicker or defense here costs execution points.
const PREMIUM_PICKS: usize = 7;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Component scores behind a grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeBreakdown {
    /// Starter and bench VBD, out of 30.
    pub vbd: f64,
    /// Positional requirements met, out of 25 plus a 2 point flex bonus.
    pub construction: f64,
    /// Value-pick rate, out of 25.
    pub strategy: f64,
    /// Adherence to the pick template, 0..=20.
    pub execution: f64,
    pub starter_vbd: f64,
    pub bench_vbd: f64,
    pub value_picks: usize,
    pub early_value_picks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftGrade {
    /// 0..=100.
    pub score: f64,
    pub letter_grade: String,
    pub summary: String,
    /// `None` when the roster could not be graded.
    pub breakdown: Option<GradeBreakdown>,
}

impl DraftGrade {
    fn incomplete() -> Self {
        DraftGrade {
            score: 0.0,
            letter_grade: "F".to_string(),
            summary: "incomplete".to_string(),
            breakdown: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.breakdown.is_some()
    }
}

/// One row of the post-draft standings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamGrade {
    pub team_label: String,
    pub strategy: Option<Strategy>,
    pub grade: DraftGrade,
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

fn vbd_component(picks: &[Player]) -> (f64, f64, f64) {
    let starter_vbd: f64 = picks[..STARTERS].iter().map(|p| p.vbd_value).sum();
    let bench_vbd: f64 = picks[STARTERS..].iter().map(|p| p.vbd_value).sum();
    let starters = (starter_vbd / 120.0 * 25.0).clamp(0.0, 25.0);
    let bench = (bench_vbd / 30.0 * 5.0).clamp(0.0, 5.0);
    (starters + bench, starter_vbd, bench_vbd)
}

fn construction_component(picks: &[Player]) -> f64 {
    let per_position = 25.0 / MIN_REQUIREMENTS.len() as f64;
    let mut score: f64 = MIN_REQUIREMENTS
        .iter()
        .map(|(pos, required)| {
            let have = picks.iter().filter(|p| p.position == *pos).count();
            per_position * (have as f64 / *required as f64).min(1.0)
        })
        .sum();

    if picks[6].position.is_flex_eligible() {
        score += 2.0;
    }
    score
}

fn strategy_component(picks: &[Player]) -> (f64, usize, usize) {
    let value_picks = picks.iter().filter(|p| p.value_pick).count();
    let early = picks[..EARLY_PICKS].iter().filter(|p| p.value_pick).count();
    let score = (value_picks as f64 / GRADED_ROSTER_SIZE as f64 * 30.0).min(15.0)
        + (early as f64 / EARLY_PICKS as f64 * 20.0).min(10.0);
    (score, value_picks, early)
}

fn execution_component(picks: &[Player]) -> f64 {
    let mut score = 20.0;
    for (slot, player) in ROSTER_TEMPLATE[..STARTERS].iter().zip(picks) {
        if !slot.accepts(player.position) {
            score -= if *slot == RosterSlot::Flex { 2.0 } else { 3.0 };
        }
    }
    let early_specialists = picks[..PREMIUM_PICKS]
        .iter()
        .filter(|p| p.position.is_specialist())
        .count();
    score -= 5.0 * early_specialists as f64;
    score.max(0.0)
}

// ---------------------------------------------------------------------------
// Letter and summary
// ---------------------------------------------------------------------------

pub fn letter_for(score: f64) -> &'static str {
    const CUTOFFS: [(f64, &str); 11] = [
        (90.0, "A+"),
        (85.0, "A"),
        (80.0, "A-"),
        (75.0, "B+"),
        (70.0, "B"),
        (65.0, "B-"),
        (60.0, "C+"),
        (55.0, "C"),
        (50.0, "C-"),
        (45.0, "D+"),
        (40.0, "D"),
    ];
    CUTOFFS
        .iter()
        .find(|(min, _)| score >= *min)
        .map(|(_, letter)| *letter)
        .unwrap_or("F")
}

fn summary_for(score: f64) -> &'static str {
    if score >= 85.0 {
        "Outstanding draft. Strong value at every level with a complete lineup."
    } else if score >= 75.0 {
        "Solid draft. Good value and structure with a few spots to improve."
    } else if score >= 65.0 {
        "Decent draft. Playable roster, but value was left on the board."
    } else if score >= 55.0 {
        "Below average. Roster holes or reaches will need waiver help."
    } else {
        "Rough draft. Rethink positional priorities and pick timing."
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Grade one roster in pick order. Anything other than exactly 12 players
/// scores 0 / "F" / "incomplete".
///
/// The parts can sum to 102 (construction carries a +2 flex bonus); the
/// score is clamped to 100, so the bonus never lifts a grade past a perfect
/// one.
pub fn grade(picks: &[Player]) -> DraftGrade {
    if picks.len() != GRADED_ROSTER_SIZE {
        return DraftGrade::incomplete();
    }

    let (vbd, starter_vbd, bench_vbd) = vbd_component(picks);
    let construction = construction_component(picks);
    let (strategy, value_picks, early_value_picks) = strategy_component(picks);
    let execution = execution_component(picks);

    let score = (vbd + construction + strategy + execution).clamp(0.0, 100.0);

    DraftGrade {
        score,
        letter_grade: letter_for(score).to_string(),
        summary: summary_for(score).to_string(),
        breakdown: Some(GradeBreakdown {
            vbd,
            construction,
            strategy,
            execution,
            starter_vbd,
            bench_vbd,
            value_picks,
            early_value_picks,
        }),
    }
}

/// Grade every team, best score first (ties keep draft-slot order).
pub fn grade_league(rosters: &[TeamRoster]) -> Vec<TeamGrade> {
    let mut grades: Vec<TeamGrade> = rosters
        .iter()
        .map(|r| TeamGrade {
            team_label: r.label.clone(),
            strategy: r.strategy,
            grade: grade(&r.players),
        })
        .collect();
    grades.sort_by(|a, b| {
        b.grade
            .score
            .partial_cmp(&a.grade.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    grades
}
