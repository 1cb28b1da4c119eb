// Draft session orchestration.
//
// The central event loop: ticks the draft engine on a fixed interval, applies
// user commands from the front end, and pushes updates back for rendering.

use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::draft::engine::{DraftEngine, TickOutcome};
use crate::draft::pick::DraftPick;
use crate::protocol::{UiUpdate, UserCommand};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// How often the engine is ticked.
pub const TICK_INTERVAL: Duration = Duration::from_millis(200);

/// Recommendations shown when the human goes on the clock.
pub const SUGGESTION_COUNT: usize = 5;

/// Whether the loop should keep going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Finished,
}

/// Engine time. Taken from tokio's clock so paused-time tests drive the
/// pick clock too.
fn now() -> std::time::Instant {
    Instant::now().into_std()
}

fn pick_update(pick: DraftPick) -> UiUpdate {
    if pick.auto_pick {
        UiUpdate::AutoPick(pick)
    } else {
        UiUpdate::Pick(pick)
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run one draft to completion (or until the user quits).
///
/// Listens on two sources using `tokio::select!`:
/// 1. User commands from the front end
/// 2. The engine tick interval
///
/// Returns the engine so the caller can grade the finished rosters.
pub async fn run(
    mut engine: DraftEngine,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    tick_every: Duration,
) -> anyhow::Result<DraftEngine> {
    engine.start(now()).context("failed to start draft")?;
    let _ = ui_tx.send(UiUpdate::Started(engine.snapshot(now()))).await;
    info!("Draft loop started");

    // Once input closes (e.g. stdin EOF) the pick clock takes over.
    let mut cmd_open = true;
    // Pick number the human was last prompted for.
    let mut prompted_for: Option<u32> = None;

    let mut ticker = tokio::time::interval(tick_every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            cmd = cmd_rx.recv(), if cmd_open => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, abandoning draft");
                        engine.cancel();
                        break;
                    }
                    Some(cmd) => {
                        if handle_user_command(&mut engine, cmd, &ui_tx).await == Flow::Finished {
                            break;
                        }
                    }
                    None => {
                        info!("Command channel closed; remaining human picks go to the clock");
                        cmd_open = false;
                    }
                }
            }

            _ = ticker.tick() => {
                match engine.tick(now()) {
                    TickOutcome::Picked(pick) | TickOutcome::AutoPicked(pick) => {
                        let _ = ui_tx.send(pick_update(pick)).await;
                    }
                    TickOutcome::AwaitingHuman { remaining } => {
                        let state = engine.state();
                        let pick_number = state.current_pick_number;
                        if prompted_for != Some(pick_number) {
                            prompted_for = Some(pick_number);
                            let update = UiUpdate::YourTurn {
                                pick_number,
                                round: state.current_round(),
                                remaining,
                                suggestions: engine
                                    .suggestions(SUGGESTION_COUNT)
                                    .into_iter()
                                    .cloned()
                                    .collect(),
                            };
                            let _ = ui_tx.send(update).await;
                        }
                    }
                    TickOutcome::Complete => {
                        let _ = ui_tx.send(UiUpdate::Complete).await;
                        break;
                    }
                    TickOutcome::AiThinking { .. } | TickOutcome::Idle => {}
                }
            }
        }
    }

    info!("Draft loop exiting");
    Ok(engine)
}

/// Apply one user command.
async fn handle_user_command(
    engine: &mut DraftEngine,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) -> Flow {
    debug!("User command: {:?}", cmd);
    match cmd {
        UserCommand::Pick(query) => {
            let matches: Vec<String> = engine
                .find_available(&query)
                .into_iter()
                .map(|p| p.player_name.clone())
                .collect();
            let update = match matches.as_slice() {
                [] => UiUpdate::Rejected(format!("no available player matches '{query}'")),
                [name] => match engine.commit_human_pick(name, now()) {
                    Ok(pick) => UiUpdate::Pick(pick),
                    Err(e) => UiUpdate::Rejected(e.to_string()),
                },
                many => {
                    let shown: Vec<&str> = many.iter().take(5).map(String::as_str).collect();
                    UiUpdate::Rejected(format!(
                        "'{query}' matches {} players: {}",
                        many.len(),
                        shown.join(", ")
                    ))
                }
            };
            let _ = ui_tx.send(update).await;
        }
        UserCommand::Suggest => {
            let list = engine
                .suggestions(SUGGESTION_COUNT)
                .into_iter()
                .cloned()
                .collect();
            let _ = ui_tx.send(UiUpdate::Suggestions(list)).await;
        }
        UserCommand::Board(n) => {
            let rows = engine.available().iter().take(n).cloned().collect();
            let _ = ui_tx.send(UiUpdate::Board(rows)).await;
        }
        UserCommand::Roster => {
            let _ = ui_tx
                .send(UiUpdate::Roster(engine.human_roster().clone()))
                .await;
        }
        UserCommand::Status => {
            let _ = ui_tx.send(UiUpdate::Status(engine.snapshot(now()))).await;
        }
        UserCommand::Simulate => match engine.simulate_remaining(now()) {
            Ok(picks) => {
                for pick in picks {
                    let _ = ui_tx.send(pick_update(pick)).await;
                }
                let _ = ui_tx.send(UiUpdate::Complete).await;
                return Flow::Finished;
            }
            Err(e) => {
                let _ = ui_tx.send(UiUpdate::Rejected(e.to_string())).await;
            }
        },
        // Handled by the loop.
        UserCommand::Quit => {}
    }
    Flow::Continue
}
