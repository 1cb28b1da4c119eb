// Post-draft report: final snapshot, the human grade, and league standings.

use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::draft::engine::{DraftEngine, DraftSnapshot};
use crate::grade::{grade, grade_league, DraftGrade, TeamGrade};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftReport {
    pub generated_at: DateTime<Utc>,
    pub league_name: String,
    pub seed: u64,
    pub draft: DraftSnapshot,
    pub your_grade: DraftGrade,
    pub standings: Vec<TeamGrade>,
}

impl DraftReport {
    pub fn build(engine: &DraftEngine, league_name: &str, seed: u64) -> Self {
        DraftReport {
            generated_at: Utc::now(),
            league_name: league_name.to_string(),
            seed,
            draft: engine.snapshot(Instant::now()),
            your_grade: grade(&engine.human_roster().players),
            standings: grade_league(engine.rosters()),
        }
    }

    /// Write the report as pretty JSON, creating parent directories.
    pub fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
