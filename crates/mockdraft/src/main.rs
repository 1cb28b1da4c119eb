// Mock draft entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Parse CLI, load config, apply overrides
// 3. Load the player CSV and rank it
// 4. `rank`: print the board and exit
// 5. `draft`: build the engine, spawn the stdin reader and app loop,
//    render updates until the draft ends
// 6. Grade, print standings, optionally write the JSON report

use std::io::BufRead;
use std::path::PathBuf;

use mockdraft::app;
use mockdraft::config::{self, Config};
use mockdraft::draft::engine::{DraftEngine, DraftSnapshot};
use mockdraft::draft::pick::{DraftPick, Position};
use mockdraft::draft::state::DraftPhase;
use mockdraft::draft::strategy::Strategy;
use mockdraft::grade::{grade, grade_league, GRADED_ROSTER_SIZE};
use mockdraft::protocol::{self, UiUpdate, UserCommand};
use mockdraft::report::DraftReport;
use mockdraft::valuation::projections;
use mockdraft::valuation::rankings::{calculate_rankings, Player, RankingReport};
use mockdraft::valuation::regression::ModelStatus;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Player CSV to load; repeat for one sheet per position
    /// (overrides `data.players` in draft.toml)
    #[arg(long, global = true)]
    players: Vec<PathBuf>,

    /// What to run; defaults to an interactive draft
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Print the VBD rankings and exit
    Rank(RankArgs),
    /// Run a mock draft against the AI teams
    Draft(DraftArgs),
}

#[derive(Debug, Args)]
struct RankArgs {
    /// Rows to print
    #[arg(long, default_value_t = 40)]
    top: usize,
    /// Only show one position (QB, RB, WR, TE, K, DEF)
    #[arg(long)]
    position: Option<String>,
    /// Write the full ranked board as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(Debug, Default, Args)]
struct DraftArgs {
    /// RNG seed for reproducible AI behaviour
    #[arg(long)]
    seed: Option<u64>,
    /// Your draft slot, 1-based
    #[arg(long, short = 'p')]
    position: Option<usize>,
    /// Don't read input; simulate the whole draft immediately
    #[arg(long)]
    auto: bool,
    /// Strategy used for your picks when simulating (e.g. zero_rb, balanced)
    #[arg(long, value_parser = parse_strategy)]
    autodraft: Option<Strategy>,
    /// Write the final report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("Mock draft starting up");

    let cli = Cli::parse();
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, {} teams, {} rounds",
        config.league.name, config.league.num_teams, config.league.rounds
    );

    let sheets = if cli.players.is_empty() {
        vec![PathBuf::from(&config.data.players)]
    } else {
        cli.players.clone()
    };
    let report = load_rankings(&sheets)?;

    match cli.mode.unwrap_or(Mode::Draft(DraftArgs::default())) {
        Mode::Rank(args) => run_rank(&report, &args),
        Mode::Draft(args) => run_draft(config, report.players, args).await,
    }
}

fn load_rankings(sheets: &[PathBuf]) -> anyhow::Result<RankingReport> {
    let rows = projections::load_all(sheets).with_context(|| {
        let names: Vec<String> = sheets.iter().map(|p| p.display().to_string()).collect();
        format!("failed to load players from {}", names.join(", "))
    })?;
    let report = calculate_rankings(&rows);

    println!(
        "Loaded {} players from {} file(s) ({} rows dropped)",
        report.players.len(),
        sheets.len(),
        report.dropped_rows
    );
    match &report.model {
        ModelStatus::Fitted {
            features,
            r_squared,
        } => println!(
            "Value model: R² {:.3} on {}",
            r_squared,
            features.join(", ")
        ),
        ModelStatus::Skipped { reason } => {
            println!("Value model skipped ({reason}); no value picks flagged")
        }
    }
    Ok(report)
}

// ---------------------------------------------------------------------------
// rank
// ---------------------------------------------------------------------------

fn run_rank(report: &RankingReport, args: &RankArgs) -> anyhow::Result<()> {
    let rows: Vec<&Player> = match &args.position {
        Some(pos) => {
            let position = Position::from_str_pos(pos)
                .with_context(|| format!("unknown position '{pos}'"))?;
            report.top_by_position(position, args.top)
        }
        None => report.players.iter().take(args.top).collect(),
    };

    println!();
    println!(
        "{:>4}  {:<26} {:<4} {:>5} {:>8} {:>8}  {:<18} {}",
        "Rank", "Player", "Pos", "PosRk", "VBD", "Adj", "Round", ""
    );
    for p in rows {
        print_player_row(p);
    }

    let counts: Vec<String> = report
        .position_counts()
        .iter()
        .map(|(pos, n)| format!("{pos} {n}"))
        .collect();
    println!();
    println!("Pool: {}", counts.join(", "));

    if let Some(path) = &args.json {
        let json = serde_json::to_string_pretty(&report.players)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Rankings written to {}", path.display());
    }
    Ok(())
}

fn print_player_row(p: &Player) {
    println!(
        "{:>4}  {:<26} {:<4} {:>5} {:>8.1} {:>8.1}  {:<18} {}",
        p.overall_rank,
        p.player_name,
        p.position,
        p.position_rank,
        p.vbd_value,
        p.adjusted_vbd,
        p.draft_round.label(),
        if p.value_pick { "value" } else { "" }
    );
}

// ---------------------------------------------------------------------------
// draft
// ---------------------------------------------------------------------------

async fn run_draft(config: Config, pool: Vec<Player>, args: DraftArgs) -> anyhow::Result<()> {
    let mut settings = config.draft_settings();
    if let Some(position) = args.position {
        anyhow::ensure!(
            (1..=settings.num_teams).contains(&position),
            "draft position must be between 1 and {}",
            settings.num_teams
        );
        settings.human_slot = position - 1;
    }
    if let Some(strategy) = args.autodraft {
        settings.autodraft_strategy = strategy;
    }
    let seed = args
        .seed
        .or(config.ai.seed)
        .unwrap_or_else(rand::random::<u64>);
    info!("Draft seed {}", seed);

    let engine = DraftEngine::new(settings, pool, &config.ai.strategies, seed)
        .context("failed to set up draft")?;

    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, mut ui_rx) = mpsc::channel(256);

    // Input: either simulate everything now, or read commands from stdin on
    // a plain thread (a blocking stdin read must not hold up runtime shutdown).
    if args.auto {
        cmd_tx.send(UserCommand::Simulate).await?;
    } else {
        std::thread::spawn(move || read_commands(cmd_tx));
    }

    let app_handle = tokio::spawn(app::run(engine, cmd_rx, ui_tx, app::TICK_INTERVAL));

    while let Some(update) = ui_rx.recv().await {
        render(&update);
    }

    let engine = match app_handle.await {
        Ok(result) => result?,
        Err(e) => {
            error!("Draft loop panicked: {}", e);
            anyhow::bail!("draft loop failed: {e}");
        }
    };

    if engine.phase() != DraftPhase::Complete {
        println!("Draft abandoned.");
        return Ok(());
    }

    print_results(&engine);

    if let Some(path) = &args.report {
        DraftReport::build(&engine, &config.league.name, seed)
            .write_json(path)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    info!("Mock draft finished");
    Ok(())
}

fn parse_strategy(name: &str) -> Result<Strategy, String> {
    Strategy::from_name(name).ok_or_else(|| {
        let known: Vec<&str> = Strategy::ALL.iter().map(Strategy::name).collect();
        format!("unknown strategy '{name}' (expected one of: {})", known.join(", "))
    })
}

/// Forward parsed stdin lines to the app loop until EOF or quit.
fn read_commands(cmd_tx: mpsc::Sender<UserCommand>) {
    for line in std::io::stdin().lock().lines() {
        let Ok(line) = line else {
            break;
        };
        match protocol::parse_command(&line) {
            Ok(cmd) => {
                let quit = cmd == UserCommand::Quit;
                if cmd_tx.blocking_send(cmd).is_err() || quit {
                    break;
                }
            }
            Err(usage) => println!("{usage}"),
        }
    }
}

fn render(update: &UiUpdate) {
    match update {
        UiUpdate::Started(snap) => {
            println!();
            println!(
                "Draft started: {} picks, {} players available.",
                snap.total_picks, snap.available_count
            );
            let picks: Vec<String> = snap.your_picks.iter().map(u32::to_string).collect();
            println!("Your picks: {}", picks.join(", "));
            println!("Type 'pick <name>' on your turn, or 'sim' to autodraft the rest.");
        }
        UiUpdate::YourTurn {
            pick_number,
            round,
            remaining,
            suggestions,
        } => {
            println!();
            println!(
                ">>> You're on the clock: pick {} (round {}), {}s to choose",
                pick_number,
                round,
                remaining.as_secs()
            );
            for p in suggestions {
                print_player_row(p);
            }
        }
        UiUpdate::Pick(pick) => print_pick(pick, ""),
        UiUpdate::AutoPick(pick) => print_pick(pick, " (auto)"),
        UiUpdate::Suggestions(list) | UiUpdate::Board(list) => {
            for p in list {
                print_player_row(p);
            }
        }
        UiUpdate::Roster(roster) => {
            println!("{} ({} picks)", roster.label, roster.len());
            for p in &roster.players {
                println!("  {:<4} {:<26} {:>6.1}", p.position, p.player_name, p.vbd_value);
            }
        }
        UiUpdate::Status(snap) => print_status(snap),
        UiUpdate::Rejected(msg) => println!("!! {msg}"),
        UiUpdate::Complete => {
            println!();
            println!("Draft complete.");
        }
    }
}

fn print_pick(pick: &DraftPick, suffix: &str) {
    println!(
        "{:>3}. R{:<2} {:<28} {:<4} {:<26} [{}]{}",
        pick.pick_number,
        pick.round_number,
        pick.team_label,
        pick.position,
        pick.player_name,
        pick.roster_slot,
        suffix
    );
}

fn print_status(snap: &DraftSnapshot) {
    println!(
        "Pick {}/{} | on the clock: {} | {} available{}",
        snap.current_pick_number.min(snap.total_picks),
        snap.total_picks,
        snap.on_the_clock.as_deref().unwrap_or("-"),
        snap.available_count,
        snap.seconds_remaining
            .map(|s| format!(" | {s:.0}s left"))
            .unwrap_or_default()
    );
}

fn print_results(engine: &DraftEngine) {
    let g = grade(&engine.human_roster().players);
    println!();
    if !g.is_complete() {
        println!(
            "Your roster has fewer than {} players, so it is graded as incomplete.",
            GRADED_ROSTER_SIZE
        );
    }
    println!("Your grade: {} ({:.1}/100)", g.letter_grade, g.score);
    println!("{}", g.summary);
    if let Some(b) = &g.breakdown {
        println!(
            "  VBD {:.1}/30 | Construction {:.1}/25 | Strategy {:.1}/25 | Execution {:.1}/20",
            b.vbd, b.construction, b.strategy, b.execution
        );
        println!(
            "  Value picks: {} ({} in the first six)",
            b.value_picks, b.early_value_picks
        );
    }

    println!();
    println!("League standings:");
    for (i, t) in grade_league(engine.rosters()).iter().enumerate() {
        println!(
            "{:>3}. {:<30} {:<3} {:>5.1}",
            i + 1,
            t.team_label,
            t.grade.letter_grade,
            t.grade.score
        );
    }
}

/// Initialize tracing to log to a file so stdout stays free for the draft.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("mockdraft.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mockdraft=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autodraft_flag_accepts_strategy_names() {
        let cli = Cli::try_parse_from(["mockdraft", "draft", "--autodraft", "zero-rb"]).unwrap();
        match cli.mode {
            Some(Mode::Draft(args)) => assert_eq!(args.autodraft, Some(Strategy::ZeroRb)),
            other => panic!("expected draft mode, got {other:?}"),
        }
        assert!(Cli::try_parse_from(["mockdraft", "draft", "--autodraft", "punt"]).is_err());
    }

    #[test]
    fn players_flag_repeats() {
        let cli =
            Cli::try_parse_from(["mockdraft", "--players", "qb.csv", "--players", "k.csv", "rank"])
                .unwrap();
        assert_eq!(cli.players, vec![PathBuf::from("qb.csv"), PathBuf::from("k.csv")]);
    }
}
