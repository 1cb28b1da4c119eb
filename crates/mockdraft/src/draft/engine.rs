// Draft engine: drives a snake draft between one human team and AI teams.
//
// The engine never sleeps. The host calls `tick(now)` at whatever cadence it
// likes; each call makes at most one pick. AI "thinking" and the human pick
// clock are both time gates checked against the `now` passed in.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::agent;
use super::order::{picks_for_team, team_for_pick};
use super::pick::DraftPick;
use super::roster::TeamRoster;
use super::state::{DraftError, DraftPhase, DraftState, TurnState};
use super::strategy::{PickContext, Strategy};
use crate::valuation::rankings::Player;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// League shape and pacing for one draft session.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftSettings {
    pub num_teams: usize,
    pub rounds: u32,
    /// 0-based draft slot of the human team.
    pub human_slot: usize,
    pub pick_time_limit: Duration,
    pub ai_delay_min: Duration,
    pub ai_delay_max: Duration,
    /// Strategy used for human picks in `simulate_remaining`.
    pub autodraft_strategy: Strategy,
    /// Optional display names by draft slot; blanks fall back to defaults.
    pub team_names: Vec<String>,
}

impl Default for DraftSettings {
    fn default() -> Self {
        DraftSettings {
            num_teams: 10,
            rounds: 12,
            human_slot: 0,
            pick_time_limit: Duration::from_secs(60),
            ai_delay_min: Duration::from_millis(1500),
            ai_delay_max: Duration::from_millis(3000),
            autodraft_strategy: Strategy::ValueBased,
            team_names: Vec::new(),
        }
    }
}

impl DraftSettings {
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.num_teams < 2 {
            return Err(DraftError::InvalidSettings(format!(
                "num_teams must be at least 2, got {}",
                self.num_teams
            )));
        }
        if self.rounds == 0 {
            return Err(DraftError::InvalidSettings(
                "rounds must be at least 1".into(),
            ));
        }
        if self.human_slot >= self.num_teams {
            return Err(DraftError::InvalidSettings(format!(
                "human slot {} is outside a {}-team league",
                self.human_slot + 1,
                self.num_teams
            )));
        }
        if self.ai_delay_min > self.ai_delay_max {
            return Err(DraftError::InvalidSettings(
                "ai delay minimum exceeds maximum".into(),
            ));
        }
        Ok(())
    }

    fn label_for(&self, slot: usize, strategy: Option<Strategy>) -> String {
        if let Some(name) = self.team_names.get(slot).filter(|n| !n.trim().is_empty()) {
            return name.trim().to_string();
        }
        match strategy {
            None => "You".to_string(),
            Some(s) => format!("Team {} ({})", slot + 1, s.label()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tick outcome and snapshot
// ---------------------------------------------------------------------------

/// What a single `tick` did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No draft running.
    Idle,
    /// Waiting on the human; `remaining` until the clock auto-picks.
    AwaitingHuman { remaining: Duration },
    /// An AI team is still thinking.
    AiThinking { team_index: usize, remaining: Duration },
    /// An AI team made a pick.
    Picked(DraftPick),
    /// The human pick clock expired and the best-ranked player was taken.
    AutoPicked(DraftPick),
    /// Every pick has been made.
    Complete,
}

/// Per-team summary inside a [`DraftSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamSummary {
    pub label: String,
    pub strategy: Option<Strategy>,
    pub players: Vec<String>,
    pub total_vbd: f64,
}

/// Serializable view of a draft session for display and reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftSnapshot {
    pub phase: DraftPhase,
    pub current_pick_number: u32,
    pub total_picks: u32,
    pub round: Option<u32>,
    pub on_the_clock: Option<String>,
    pub human_on_the_clock: bool,
    pub seconds_remaining: Option<f64>,
    pub available_count: usize,
    /// Pick numbers the human team owns.
    pub your_picks: Vec<u32>,
    pub started_at: Option<DateTime<Utc>>,
    pub picks: Vec<DraftPick>,
    pub teams: Vec<TeamSummary>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct DraftEngine {
    settings: DraftSettings,
    /// Ranked pool, snapshotted into the state on every `start`.
    pool: Vec<Player>,
    state: DraftState,
    rng: Pcg32,
    started_at: Option<DateTime<Utc>>,
}

impl DraftEngine {
    /// Build an engine in `Setup`.
    ///
    /// AI seats take `strategies` in order, cycling if there are fewer than
    /// AI teams; an empty list uses every strategy once.
    pub fn new(
        settings: DraftSettings,
        pool: Vec<Player>,
        strategies: &[Strategy],
        seed: u64,
    ) -> Result<Self, DraftError> {
        settings.validate()?;

        // Picks are committed by name.
        let mut seen = HashSet::with_capacity(pool.len());
        if let Some(dup) = pool
            .iter()
            .find(|p| !seen.insert(p.player_name.to_lowercase()))
        {
            return Err(DraftError::DuplicatePlayer(dup.player_name.clone()));
        }

        let lineup: Vec<Strategy> = if strategies.is_empty() {
            Strategy::ALL.to_vec()
        } else {
            strategies.to_vec()
        };

        let mut ai_seat = 0;
        let rosters = (0..settings.num_teams)
            .map(|slot| {
                let strategy = if slot == settings.human_slot {
                    None
                } else {
                    let s = lineup[ai_seat % lineup.len()];
                    ai_seat += 1;
                    Some(s)
                };
                TeamRoster::new(&settings.label_for(slot, strategy), strategy)
            })
            .collect();

        let state = DraftState::new(rosters, settings.rounds);
        Ok(DraftEngine {
            settings,
            pool,
            state,
            rng: Pcg32::seed_from_u64(seed),
            started_at: None,
        })
    }

    // -- Lifecycle ----------------------------------------------------------

    /// Begin a draft: snapshot the pool, clear rosters and the log, and put
    /// pick 1 on the clock. Allowed from `Setup` or after a completed draft.
    pub fn start(&mut self, now: Instant) -> Result<(), DraftError> {
        if self.state.phase == DraftPhase::InProgress {
            return Err(DraftError::AlreadyInProgress);
        }
        if self.pool.is_empty() {
            return Err(DraftError::EmptyPool);
        }
        self.state.reset(&self.pool);
        self.state.phase = DraftPhase::InProgress;
        self.started_at = Some(Utc::now());
        info!(
            "Draft started: {} teams, {} rounds, {} players, human in slot {}",
            self.settings.num_teams,
            self.settings.rounds,
            self.state.available_players.len(),
            self.settings.human_slot + 1
        );
        self.arm_turn(now);
        Ok(())
    }

    /// Abandon the draft. Nothing from the session survives.
    pub fn cancel(&mut self) {
        if self.state.phase == DraftPhase::InProgress {
            info!(
                "Draft cancelled at pick {}",
                self.state.current_pick_number
            );
        }
        self.state.clear();
        self.started_at = None;
    }

    /// Advance the draft by at most one pick.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        match self.state.phase {
            DraftPhase::Setup => return TickOutcome::Idle,
            DraftPhase::Complete => return TickOutcome::Complete,
            DraftPhase::InProgress => {}
        }

        match self.state.turn {
            TurnState::Idle => {
                self.arm_turn(now);
                self.phase_outcome()
            }
            TurnState::AwaitingHuman { team_index } => {
                let deadline = self.state.pick_deadline.unwrap_or(now);
                if now <= deadline {
                    return TickOutcome::AwaitingHuman {
                        remaining: deadline - now,
                    };
                }
                let Some(name) = self
                    .state
                    .available_players
                    .first()
                    .map(|p| p.player_name.clone())
                else {
                    self.arm_turn(now);
                    return self.phase_outcome();
                };
                match self.state.commit_pick(team_index, &name, true) {
                    Ok(pick) => {
                        info!("Pick clock expired; auto-picked {}", pick.player_name);
                        self.arm_turn(now);
                        TickOutcome::AutoPicked(pick)
                    }
                    Err(e) => {
                        warn!("Auto-pick failed: {}", e);
                        self.phase_outcome()
                    }
                }
            }
            TurnState::AiThinking {
                team_index,
                ready_at,
            } => {
                if now < ready_at {
                    return TickOutcome::AiThinking {
                        team_index,
                        remaining: ready_at - now,
                    };
                }
                match self.strategy_pick(team_index, false) {
                    Some(pick) => {
                        self.arm_turn(now);
                        TickOutcome::Picked(pick)
                    }
                    None => {
                        self.arm_turn(now);
                        self.phase_outcome()
                    }
                }
            }
        }
    }

    /// Record the human's pick. Only valid while the human is on the clock
    /// and the player is still available; a rejection changes nothing.
    pub fn commit_human_pick(
        &mut self,
        player_name: &str,
        now: Instant,
    ) -> Result<DraftPick, DraftError> {
        if self.state.phase != DraftPhase::InProgress {
            return Err(DraftError::NotInProgress);
        }
        let TurnState::AwaitingHuman { team_index } = self.state.turn else {
            return Err(DraftError::NotHumanTurn);
        };
        let pick = self.state.commit_pick(team_index, player_name, false)?;
        self.arm_turn(now);
        Ok(pick)
    }

    /// Make every remaining pick immediately. Human picks follow the
    /// configured autodraft strategy and are flagged as automatic.
    pub fn simulate_remaining(&mut self, now: Instant) -> Result<Vec<DraftPick>, DraftError> {
        if self.state.phase != DraftPhase::InProgress {
            return Err(DraftError::NotInProgress);
        }
        let mut made = Vec::new();
        while self.state.phase == DraftPhase::InProgress {
            let team_index = match self.state.turn {
                TurnState::AwaitingHuman { team_index }
                | TurnState::AiThinking { team_index, .. } => team_index,
                TurnState::Idle => break,
            };
            let is_human = team_index == self.settings.human_slot;
            match self.strategy_pick(team_index, is_human) {
                Some(pick) => made.push(pick),
                None => {
                    warn!(
                        "No selection possible at pick {}",
                        self.state.current_pick_number
                    );
                    break;
                }
            }
            self.arm_turn(now);
        }
        info!("Simulated {} picks", made.len());
        Ok(made)
    }

    // -- Queries ------------------------------------------------------------

    pub fn settings(&self) -> &DraftSettings {
        &self.settings
    }

    pub fn state(&self) -> &DraftState {
        &self.state
    }

    pub fn phase(&self) -> DraftPhase {
        self.state.phase
    }

    pub fn picks(&self) -> &[DraftPick] {
        &self.state.picks
    }

    pub fn available(&self) -> &[Player] {
        &self.state.available_players
    }

    pub fn rosters(&self) -> &[TeamRoster] {
        &self.state.rosters
    }

    pub fn human_roster(&self) -> &TeamRoster {
        &self.state.rosters[self.settings.human_slot]
    }

    /// Team index currently on the clock.
    pub fn on_the_clock(&self) -> Option<usize> {
        match self.state.turn {
            TurnState::AwaitingHuman { team_index }
            | TurnState::AiThinking { team_index, .. } => Some(team_index),
            TurnState::Idle => None,
        }
    }

    pub fn is_human_turn(&self) -> bool {
        matches!(self.state.turn, TurnState::AwaitingHuman { .. })
    }

    /// Time left on the current pick clock.
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.state
            .pick_deadline
            .map(|d| d.saturating_duration_since(now))
    }

    /// Recommendations for the human team at the current pick.
    pub fn suggestions(&self, n: usize) -> Vec<&Player> {
        let ctx = self.pick_context(self.settings.human_slot);
        agent::suggest(self.human_roster(), &self.state.available_players, &ctx, n)
    }

    /// Available players whose name matches `query`: an exact
    /// case-insensitive match wins, otherwise every substring match in
    /// rank order.
    pub fn find_available(&self, query: &str) -> Vec<&Player> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        if let Some(exact) = self
            .state
            .available_players
            .iter()
            .find(|p| p.player_name.to_lowercase() == needle)
        {
            return vec![exact];
        }
        self.state
            .available_players
            .iter()
            .filter(|p| p.player_name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn snapshot(&self, now: Instant) -> DraftSnapshot {
        let in_progress = self.state.phase == DraftPhase::InProgress;
        DraftSnapshot {
            phase: self.state.phase,
            current_pick_number: self.state.current_pick_number,
            total_picks: self.state.total_picks(),
            round: in_progress.then(|| self.state.current_round()),
            on_the_clock: self
                .on_the_clock()
                .map(|i| self.state.rosters[i].label.clone()),
            human_on_the_clock: self.is_human_turn(),
            seconds_remaining: self.time_remaining(now).map(|d| d.as_secs_f64()),
            available_count: self.state.available_players.len(),
            your_picks: picks_for_team(
                self.settings.human_slot,
                self.settings.rounds,
                self.settings.num_teams,
            ),
            started_at: self.started_at,
            picks: self.state.picks.clone(),
            teams: self
                .state
                .rosters
                .iter()
                .map(|r| TeamSummary {
                    label: r.label.clone(),
                    strategy: r.strategy,
                    players: r.players.iter().map(|p| p.player_name.clone()).collect(),
                    total_vbd: r.total_vbd(),
                })
                .collect(),
        }
    }

    // -- Internals ----------------------------------------------------------

    fn pick_context(&self, team_index: usize) -> PickContext {
        let made = self.state.rosters[team_index].len();
        PickContext::new(
            self.state.current_round(),
            self.settings.rounds,
            (self.settings.rounds as usize).saturating_sub(made),
        )
    }

    /// Let the agent choose for `team_index` and commit it.
    fn strategy_pick(&mut self, team_index: usize, auto_pick: bool) -> Option<DraftPick> {
        let ctx = self.pick_context(team_index);
        let roster = &self.state.rosters[team_index];
        let strategy = roster.strategy.unwrap_or(self.settings.autodraft_strategy);
        let name = agent::select(
            roster,
            &self.state.available_players,
            &ctx,
            strategy,
            &mut self.rng,
        )?
        .player_name
        .clone();

        match self.state.commit_pick(team_index, &name, auto_pick) {
            Ok(pick) => Some(pick),
            Err(e) => {
                warn!("Agent pick for {} rejected: {}", team_index, e);
                None
            }
        }
    }

    fn thinking_delay(&mut self) -> Duration {
        let lo = self.settings.ai_delay_min.as_secs_f64();
        let hi = self.settings.ai_delay_max.as_secs_f64();
        if hi <= lo {
            return self.settings.ai_delay_min;
        }
        Duration::from_secs_f64(self.rng.random_range(lo..=hi))
    }

    /// Put the current pick on the clock, or finish the draft.
    fn arm_turn(&mut self, now: Instant) {
        if self.state.picks_exhausted() || self.state.available_players.is_empty() {
            if !self.state.picks_exhausted() {
                warn!(
                    "Player pool exhausted after {} picks",
                    self.state.picks.len()
                );
            }
            self.state.phase = DraftPhase::Complete;
            self.state.turn = TurnState::Idle;
            self.state.pick_deadline = None;
            info!("Draft complete: {} picks", self.state.picks.len());
            return;
        }

        let team_index = team_for_pick(self.state.current_pick_number, self.settings.num_teams);
        self.state.pick_deadline = Some(now + self.settings.pick_time_limit);
        self.state.turn = if team_index == self.settings.human_slot {
            TurnState::AwaitingHuman { team_index }
        } else {
            let ready_at = now + self.thinking_delay();
            TurnState::AiThinking {
                team_index,
                ready_at,
            }
        };
    }

    fn phase_outcome(&self) -> TickOutcome {
        match self.state.phase {
            DraftPhase::Complete => TickOutcome::Complete,
            _ => TickOutcome::Idle,
        }
    }
}
