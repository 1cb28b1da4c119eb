// Configuration loading and parsing (league.toml, draft.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::draft::engine::DraftSettings;
use crate::draft::strategy::Strategy;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub timer: TimerConfig,
    pub ai: AiConfig,
    pub data: DataPaths,
}

impl Config {
    /// Engine settings derived from the league and timer sections.
    pub fn draft_settings(&self) -> DraftSettings {
        DraftSettings {
            num_teams: self.league.num_teams,
            rounds: self.league.rounds,
            human_slot: self.league.human_draft_position.saturating_sub(1),
            pick_time_limit: Duration::from_secs(self.timer.pick_time_limit_secs),
            ai_delay_min: Duration::from_secs_f64(self.timer.ai_delay_min_secs),
            ai_delay_max: Duration::from_secs_f64(self.timer.ai_delay_max_secs),
            autodraft_strategy: self.ai.autodraft_strategy,
            team_names: self.league.team_names.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    #[serde(default = "default_num_teams")]
    pub num_teams: usize,
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    /// 1-based draft slot of the human team.
    #[serde(default = "default_draft_position")]
    pub human_draft_position: usize,
    /// Display names by draft slot (optional).
    #[serde(default)]
    pub team_names: Vec<String>,
}

fn default_num_teams() -> usize {
    10
}

fn default_rounds() -> u32 {
    12
}

fn default_draft_position() -> usize {
    1
}

// ---------------------------------------------------------------------------
// draft.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire draft.toml file.
#[derive(Debug, Clone, Deserialize)]
struct DraftFile {
    timer: TimerConfig,
    ai: AiConfig,
    data: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimerConfig {
    pub pick_time_limit_secs: u64,
    pub ai_delay_min_secs: f64,
    pub ai_delay_max_secs: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Personalities for the AI seats, in draft-slot order.
    pub strategies: Vec<Strategy>,
    /// Fixed RNG seed; a fresh one is drawn when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_autodraft")]
    pub autodraft_strategy: Strategy,
}

fn default_autodraft() -> Strategy {
    Strategy::ValueBased
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub players: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

pub const LEAGUE_FILE: &str = "league.toml";
pub const DRAFT_FILE: &str = "draft.toml";
const CONFIG_FILES: [&str; 2] = [LEAGUE_FILE, DRAFT_FILE];

/// Load and validate `config/league.toml` and `config/draft.toml` relative to
/// `base_dir`. Does not copy defaults; see [`load_config`].
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    let league_path = config_dir.join(LEAGUE_FILE);
    let league_file: LeagueFile = parse_file(&league_path)?;

    let draft_path = config_dir.join(DRAFT_FILE);
    let draft_file: DraftFile = parse_file(&draft_path)?;

    let config = Config {
        league: league_file.league,
        timer: draft_file.timer,
        ai: draft_file.ai,
        data: draft_file.data,
    };

    validate(&config)?;

    Ok(config)
}

/// Copy `league.toml` or `draft.toml` from `defaults/` into `config/` when
/// the config copy is missing. Existing config files are never touched.
/// Returns the files that were copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    let mut copied = Vec::new();
    for name in CONFIG_FILES {
        let target = config_dir.join(name);
        if target.exists() {
            continue;
        }
        let source = defaults_dir.join(name);
        if !source.is_file() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "config/{name} is missing and there is no defaults/{name} in {}; \
                     run from the crate directory",
                    base_dir.display()
                ),
            });
        }

        std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to create config directory: {e}"),
        })?;
        std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to copy {} to {}: {e}", source.display(), target.display()),
        })?;
        copied.push(target);
    }

    Ok(copied)
}

/// Load config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn parse_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = read_file(path)?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let league = &config.league;
    if league.num_teams < 2 {
        return Err(invalid(
            "league.num_teams",
            format!("must be at least 2, got {}", league.num_teams),
        ));
    }
    if league.rounds == 0 {
        return Err(invalid("league.rounds", "must be greater than 0"));
    }
    if !(1..=league.num_teams).contains(&league.human_draft_position) {
        return Err(invalid(
            "league.human_draft_position",
            format!(
                "must be between 1 and {}, got {}",
                league.num_teams, league.human_draft_position
            ),
        ));
    }
    if !league.team_names.is_empty() && league.team_names.len() != league.num_teams {
        return Err(invalid(
            "league.team_names",
            format!(
                "expected {} names (one per team), got {}",
                league.num_teams,
                league.team_names.len()
            ),
        ));
    }

    let timer = &config.timer;
    if timer.pick_time_limit_secs == 0 {
        return Err(invalid("timer.pick_time_limit_secs", "must be > 0"));
    }
    let delays = [
        ("timer.ai_delay_min_secs", timer.ai_delay_min_secs),
        ("timer.ai_delay_max_secs", timer.ai_delay_max_secs),
    ];
    for (name, val) in delays {
        if !val.is_finite() || val < 0.0 {
            return Err(invalid(name, format!("must be a non-negative number, got {val}")));
        }
    }
    if timer.ai_delay_min_secs > timer.ai_delay_max_secs {
        return Err(invalid(
            "timer.ai_delay_min_secs",
            format!(
                "must not exceed ai_delay_max_secs ({} > {})",
                timer.ai_delay_min_secs, timer.ai_delay_max_secs
            ),
        ));
    }

    if config.ai.strategies.is_empty() {
        return Err(invalid("ai.strategies", "must list at least one strategy"));
    }

    if config.data.players.trim().is_empty() {
        return Err(invalid("data.players", "must not be empty"));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn crate_root() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    }

    fn default_text(name: &str) -> String {
        fs::read_to_string(crate_root().join("defaults").join(name)).unwrap()
    }

    /// Fresh temp dir holding `config/` with the given file contents.
    fn temp_config(name: &str, league: &str, draft: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config/league.toml"), league).unwrap();
        fs::write(tmp.join("config/draft.toml"), draft).unwrap();
        tmp
    }

    fn expect_field(tmp: &Path, expected: &str) {
        match load_config_from(tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, expected),
            other => panic!("expected ValidationError, got: {other}"),
        }
        let _ = fs::remove_dir_all(tmp);
    }

    #[test]
    fn load_default_config() {
        let tmp = temp_config(
            "mockdraft_config_defaults",
            &default_text("league.toml"),
            &default_text("draft.toml"),
        );
        let config = load_config_from(&tmp).expect("defaults should load");

        assert_eq!(config.league.num_teams, 10);
        assert_eq!(config.league.rounds, 12);
        assert_eq!(config.league.human_draft_position, 1);
        assert!(config.league.team_names.is_empty());
        assert_eq!(config.timer.pick_time_limit_secs, 60);
        assert!((config.timer.ai_delay_min_secs - 1.5).abs() < f64::EPSILON);
        assert!((config.timer.ai_delay_max_secs - 3.0).abs() < f64::EPSILON);
        assert_eq!(config.ai.strategies, Strategy::ALL.to_vec());
        assert_eq!(config.ai.seed, None);
        assert_eq!(config.ai.autodraft_strategy, Strategy::ValueBased);
        assert_eq!(config.data.players, "data/players.csv");

        let settings = config.draft_settings();
        assert_eq!(settings.human_slot, 0);
        assert_eq!(settings.pick_time_limit, Duration::from_secs(60));
        assert_eq!(settings.ai_delay_min, Duration::from_millis(1500));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn strategy_aliases_and_seed() {
        let draft = default_text("draft.toml")
            .replace("\"value_based\",\n", "\"best_available\",\n")
            .replace("# seed = 42", "seed = 42");
        let tmp = temp_config(
            "mockdraft_config_aliases",
            &default_text("league.toml"),
            &draft,
        );
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.ai.strategies[2], Strategy::ValueBased);
        assert_eq!(config.ai.seed, Some(42));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn unknown_strategy_is_a_parse_error() {
        let draft = default_text("draft.toml").replace("\"contrarian\"", "\"yolo\"");
        let tmp = temp_config(
            "mockdraft_config_bad_strategy",
            &default_text("league.toml"),
            &draft,
        );
        assert!(matches!(
            load_config_from(&tmp),
            Err(ConfigError::ParseError { .. })
        ));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_draft_position_out_of_range() {
        let league = default_text("league.toml")
            .replace("human_draft_position = 1", "human_draft_position = 11");
        let tmp = temp_config(
            "mockdraft_config_position",
            &league,
            &default_text("draft.toml"),
        );
        expect_field(&tmp, "league.human_draft_position");
    }

    #[test]
    fn rejects_single_team_league() {
        let league = default_text("league.toml").replace("num_teams = 10", "num_teams = 1");
        let tmp = temp_config("mockdraft_config_teams", &league, &default_text("draft.toml"));
        expect_field(&tmp, "league.num_teams");
    }

    #[test]
    fn rejects_wrong_team_name_count() {
        let league = default_text("league.toml")
            .replace("team_names = []", "team_names = [\"A\", \"B\"]");
        let tmp = temp_config("mockdraft_config_names", &league, &default_text("draft.toml"));
        expect_field(&tmp, "league.team_names");
    }

    #[test]
    fn rejects_inverted_delay_range() {
        let draft = default_text("draft.toml")
            .replace("ai_delay_min_secs = 1.5", "ai_delay_min_secs = 5.0");
        let tmp = temp_config(
            "mockdraft_config_delay",
            &default_text("league.toml"),
            &draft,
        );
        expect_field(&tmp, "timer.ai_delay_min_secs");
    }

    #[test]
    fn rejects_zero_pick_clock() {
        let draft = default_text("draft.toml")
            .replace("pick_time_limit_secs = 60", "pick_time_limit_secs = 0");
        let tmp = temp_config("mockdraft_config_clock", &default_text("league.toml"), &draft);
        expect_field(&tmp, "timer.pick_time_limit_secs");
    }

    #[test]
    fn file_not_found_for_missing_draft_toml() {
        let tmp = temp_config("mockdraft_config_missing", &default_text("league.toml"), "");
        fs::remove_file(tmp.join("config/draft.toml")).unwrap();
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("draft.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = temp_config(
            "mockdraft_config_invalid",
            "[league\nname = ",
            &default_text("draft.toml"),
        );
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("league.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_missing_files() {
        let tmp = std::env::temp_dir().join("mockdraft_config_ensure_copies");
        let _ = fs::remove_dir_all(&tmp);
        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::write(defaults_dir.join("league.toml"), default_text("league.toml")).unwrap();
        fs::write(defaults_dir.join("draft.toml"), default_text("draft.toml")).unwrap();
        fs::write(defaults_dir.join("notes.toml"), "# not a config file\n").unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert_eq!(copied.len(), 2);
        assert!(tmp.join("config/league.toml").exists());
        assert!(tmp.join("config/draft.toml").exists());
        assert!(!tmp.join("config/notes.toml").exists());
        assert!(load_config_from(&tmp).is_ok());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_skips_existing() {
        let tmp = std::env::temp_dir().join("mockdraft_config_ensure_skips");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("defaults/league.toml"), default_text("league.toml")).unwrap();
        fs::write(tmp.join("defaults/draft.toml"), default_text("draft.toml")).unwrap();
        fs::write(tmp.join("config/league.toml"), "# custom\n").unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert_eq!(copied.len(), 1);
        assert!(copied[0].ends_with("draft.toml"));
        let content = fs::read_to_string(tmp.join("config/league.toml")).unwrap();
        assert_eq!(content, "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_without_defaults_keeps_existing_config() {
        let tmp = temp_config(
            "mockdraft_config_no_defaults",
            &default_text("league.toml"),
            &default_text("draft.toml"),
        );
        assert!(ensure_config_files(&tmp).unwrap().is_empty());
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_when_both_dirs_missing() {
        let tmp = std::env::temp_dir().join("mockdraft_config_both_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        match ensure_config_files(&tmp).unwrap_err() {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("config/league.toml is missing"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }
}
