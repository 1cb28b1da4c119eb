// Player table loading.
//
// Reads projection CSVs exported from the rankings spreadsheet: one row per
// player with Player_Name, Position, Team, Bye_Week, VBD_Value, Points and
// News columns. Any other numeric column is carried along in `stats` so the
// value-pick regression can use it as a feature.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::draft::pick::Position;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One raw player row as delivered by the ingestion step.
///
/// `vbd_value` is `None` when the source cell was blank or not a number; the
/// ranking pipeline drops such rows instead of treating them as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRow {
    pub player_name: String,
    pub position: Position,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub bye_week: Option<u8>,
    pub vbd_value: Option<f64>,
    #[serde(default)]
    pub points: Option<f64>,
    #[serde(default)]
    pub news: Option<String>,
    /// Additional numeric columns, keyed by header.
    #[serde(default)]
    pub stats: BTreeMap<String, f64>,
}

impl PlayerRow {
    /// Minimal row for a player with only the fields ranking needs.
    pub fn new(name: &str, position: Position, vbd_value: f64) -> Self {
        PlayerRow {
            player_name: name.to_string(),
            position,
            team: String::new(),
            bye_week: None,
            vbd_value: Some(vbd_value),
            points: None,
            news: None,
            stats: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

/// Column indices resolved from the header row.
#[derive(Debug, Default)]
struct ColumnMap {
    name: Option<usize>,
    position: Option<usize>,
    team: Option<usize>,
    bye_week: Option<usize>,
    vbd_value: Option<usize>,
    points: Option<usize>,
    news: Option<usize>,
    /// Every other column, by index.
    extra: Vec<(usize, String)>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let mut map = ColumnMap::default();
        for (idx, header) in headers.iter().enumerate() {
            let key = header.trim().to_ascii_lowercase().replace([' ', '-'], "_");
            let slot = match key.as_str() {
                "player_name" | "player" | "name" => &mut map.name,
                "position" | "pos" => &mut map.position,
                "team" => &mut map.team,
                "bye_week" | "bye" => &mut map.bye_week,
                "vbd_value" | "vbd" => &mut map.vbd_value,
                "points" | "fpts" => &mut map.points,
                "news" => &mut map.news,
                _ => {
                    map.extra.push((idx, header.trim().to_string()));
                    continue;
                }
            };
            if slot.is_none() {
                *slot = Some(idx);
            }
        }
        map
    }

    fn validate(&self) -> Result<(), ProjectionError> {
        let required = [
            ("Player_Name", self.name),
            ("Position", self.position),
            ("VBD_Value", self.vbd_value),
        ];
        for (label, idx) in required {
            if idx.is_none() {
                return Err(ProjectionError::Validation(format!(
                    "missing required column {label}"
                )));
            }
        }
        Ok(())
    }
}

fn cell<'a>(record: &'a csv::StringRecord, idx: Option<usize>) -> Option<&'a str> {
    idx.and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.replace(',', "").parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Reader-based loader (enables testing without temp files)
// ---------------------------------------------------------------------------

/// Parse player rows from any CSV reader.
///
/// Rows with an unrecognized position are skipped with a warning. Rows with a
/// non-numeric VBD cell are kept with `vbd_value = None`.
pub fn load_players_from_reader<R: Read>(rdr: R) -> Result<Vec<PlayerRow>, ProjectionError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers = reader
        .headers()
        .map_err(|e| ProjectionError::Csv {
            path: "<reader>".into(),
            source: e,
        })?
        .clone();
    let columns = ColumnMap::from_headers(&headers);
    columns.validate()?;

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping malformed player row {}: {}", line + 2, e);
                continue;
            }
        };

        let name = cell(&record, columns.name).unwrap_or_default().to_string();
        let raw_pos = cell(&record, columns.position).unwrap_or_default();
        let Some(position) = Position::from_str_pos(raw_pos) else {
            warn!("skipping '{}': unrecognized position '{}'", name, raw_pos);
            continue;
        };

        let vbd_value = parse_number(cell(&record, columns.vbd_value));
        if vbd_value.is_none() {
            warn!("'{}' has no numeric VBD value", name);
        }

        let bye_week = cell(&record, columns.bye_week)
            .and_then(|s| s.parse::<u8>().ok())
            .filter(|w| (1..=18).contains(w));

        let stats: BTreeMap<String, f64> = columns
            .extra
            .iter()
            .filter_map(|(idx, header)| {
                parse_number(cell(&record, Some(*idx))).map(|v| (header.clone(), v))
            })
            .collect();

        rows.push(PlayerRow {
            player_name: name,
            position,
            team: cell(&record, columns.team).unwrap_or_default().to_string(),
            bye_week,
            vbd_value,
            points: parse_number(cell(&record, columns.points)),
            news: cell(&record, columns.news).map(str::to_string),
            stats,
        });
    }

    Ok(rows)
}

// ---------------------------------------------------------------------------
// File loaders
// ---------------------------------------------------------------------------

/// Load player rows from a single CSV file.
pub fn load_players(path: &Path) -> Result<Vec<PlayerRow>, ProjectionError> {
    let display = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| ProjectionError::Io {
        path: display.clone(),
        source: e,
    })?;
    load_players_from_reader(file).map_err(|e| match e {
        ProjectionError::Csv { source, .. } => ProjectionError::Csv {
            path: display,
            source,
        },
        other => other,
    })
}

/// Load and concatenate several sheets (typically one per position).
pub fn load_all(paths: &[impl AsRef<Path>]) -> Result<Vec<PlayerRow>, ProjectionError> {
    let mut rows = Vec::new();
    for path in paths {
        rows.extend(load_players(path.as_ref())?);
    }
    if rows.is_empty() {
        return Err(ProjectionError::Validation(
            "no player rows found in the supplied files".into(),
        ));
    }
    Ok(rows)
}
