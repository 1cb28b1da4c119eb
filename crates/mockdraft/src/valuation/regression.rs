// Value-pick regression.
//
// Fits an ordinary least squares model of VBD on the player's other numeric
// columns (projected points, bye week, and any extra stat columns) and flags
// players whose actual VBD beats the model's estimate. Rank and adjusted
// columns are never used as features.

use std::collections::BTreeSet;

use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use tracing::{info, warn};

use super::rankings::Player;

/// Fewest rows the model will be fitted on.
pub const MIN_ROWS: usize = 10;

/// Fewest usable feature columns the model will be fitted on.
pub const MIN_FEATURES: usize = 2;

/// Columns derived from the ranking itself. A CSV exported from an earlier
/// ranking run carries these, and fitting on them just reproduces VBD.
const DERIVED_COLUMNS: [&str; 9] = [
    "rank",
    "overall_rank",
    "position_rank",
    "pos_rank",
    "adjusted_vbd",
    "adj_vbd",
    "predicted_vbd",
    "value_pick",
    "draft_round",
];

/// Whether a stats column name is one of the ranking's own outputs.
/// Matching ignores case and treats spaces and hyphens as underscores.
pub fn is_derived_column(name: &str) -> bool {
    let key = name.trim().to_ascii_lowercase().replace([' ', '-'], "_");
    DERIVED_COLUMNS.contains(&key.as_str())
}

/// Singular values below this are treated as zero when checking rank.
const RANK_EPSILON: f64 = 1e-9;

/// Why the regression could not be fitted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("need at least 10 rows, got {0}")]
    TooFewRows(usize),

    #[error("need at least 2 usable feature columns, got {0}")]
    TooFewFeatures(usize),

    #[error("feature matrix is rank deficient ({rank} of {columns} columns independent)")]
    Singular { rank: usize, columns: usize },

    #[error("solver failed: {0}")]
    Solver(String),
}

/// Outcome of the regression step, reported to the operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelStatus {
    Fitted { features: Vec<String>, r_squared: f64 },
    Skipped { reason: String },
}

/// A fitted linear model.
#[derive(Debug, Clone)]
pub struct ValueModel {
    pub features: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    pub r_squared: f64,
}

/// One candidate feature column pulled out of the player pool.
struct FeatureColumn {
    name: String,
    values: Vec<Option<f64>>,
}

impl FeatureColumn {
    /// Mean-imputed values, or `None` when the column carries no signal
    /// (no observations, or constant after imputation).
    fn imputed(&self) -> Option<Vec<f64>> {
        let observed: Vec<f64> = self.values.iter().flatten().copied().collect();
        if observed.is_empty() {
            return None;
        }
        let mean = observed.iter().sum::<f64>() / observed.len() as f64;
        let filled: Vec<f64> = self.values.iter().map(|v| v.unwrap_or(mean)).collect();
        let spread = filled
            .iter()
            .map(|v| (v - mean).abs())
            .fold(0.0_f64, f64::max);
        (spread > RANK_EPSILON).then_some(filled)
    }
}

fn candidate_columns(players: &[Player]) -> Vec<FeatureColumn> {
    let mut columns = vec![
        FeatureColumn {
            name: "Points".into(),
            values: players.iter().map(|p| p.points).collect(),
        },
        FeatureColumn {
            name: "Bye_Week".into(),
            values: players.iter().map(|p| p.bye_week.map(f64::from)).collect(),
        },
    ];

    let stat_names: BTreeSet<&String> = players
        .iter()
        .flat_map(|p| p.stats.keys())
        .filter(|name| !is_derived_column(name))
        .collect();
    for name in stat_names {
        columns.push(FeatureColumn {
            name: name.clone(),
            values: players.iter().map(|p| p.stats.get(name).copied()).collect(),
        });
    }
    columns
}

impl ValueModel {
    /// Fit VBD ~ intercept + features over the pool.
    pub fn fit(players: &[Player]) -> Result<ValueModel, ModelError> {
        let n = players.len();
        if n < MIN_ROWS {
            return Err(ModelError::TooFewRows(n));
        }

        let (features, columns): (Vec<String>, Vec<Vec<f64>>) = candidate_columns(players)
            .into_iter()
            .filter_map(|col| col.imputed().map(|vals| (col.name, vals)))
            .unzip();

        let k = features.len();
        if k < MIN_FEATURES {
            return Err(ModelError::TooFewFeatures(k));
        }
        if n <= k + 1 {
            return Err(ModelError::TooFewRows(n));
        }

        let design = DMatrix::from_fn(n, k + 1, |row, col| {
            if col == 0 {
                1.0
            } else {
                columns[col - 1][row]
            }
        });
        let target = DVector::from_iterator(n, players.iter().map(|p| p.vbd_value));

        let svd = design.clone().svd(true, true);
        let rank = svd.rank(RANK_EPSILON);
        if rank < k + 1 {
            return Err(ModelError::Singular {
                rank,
                columns: k + 1,
            });
        }
        let beta = svd
            .solve(&target, RANK_EPSILON)
            .map_err(|e| ModelError::Solver(e.to_string()))?;
        if beta.iter().any(|b| !b.is_finite()) {
            return Err(ModelError::Solver("non-finite coefficient".into()));
        }

        let fitted = &design * &beta;
        let mean = target.mean();
        let ss_tot: f64 = target.iter().map(|y| (y - mean).powi(2)).sum();
        let ss_res: f64 = target
            .iter()
            .zip(fitted.iter())
            .map(|(y, f)| (y - f).powi(2))
            .sum();
        let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

        Ok(ValueModel {
            features,
            intercept: beta[0],
            coefficients: beta.iter().skip(1).copied().collect(),
            r_squared,
        })
    }

    /// Predict every player in `players`, in order, using the same
    /// mean-imputation the fit used.
    fn predict_all(&self, players: &[Player]) -> Vec<f64> {
        let columns = candidate_columns(players);
        let mut predictions = vec![self.intercept; players.len()];
        for (name, coef) in self.features.iter().zip(&self.coefficients) {
            let Some(values) = columns
                .iter()
                .find(|c| &c.name == name)
                .and_then(FeatureColumn::imputed)
            else {
                continue;
            };
            for (pred, v) in predictions.iter_mut().zip(values) {
                *pred += coef * v;
            }
        }
        predictions
    }
}

/// Fill `predicted_vbd` and `value_pick` for the whole pool.
///
/// Never fails: when the model cannot be fitted, every player gets
/// `predicted_vbd = vbd_value` and `value_pick = false`.
pub fn apply_value_model(players: &mut [Player]) -> ModelStatus {
    match ValueModel::fit(players) {
        Ok(model) => {
            let predictions = model.predict_all(players);
            for (player, predicted) in players.iter_mut().zip(predictions) {
                player.predicted_vbd = predicted;
                player.value_pick = player.vbd_value > predicted;
            }
            info!(
                "value model fitted on {} players, features={:?}, r2={:.3}",
                players.len(),
                model.features,
                model.r_squared
            );
            ModelStatus::Fitted {
                features: model.features,
                r_squared: model.r_squared,
            }
        }
        Err(e) => {
            warn!("value model skipped: {}", e);
            for player in players.iter_mut() {
                player.predicted_vbd = player.vbd_value;
                player.value_pick = false;
            }
            ModelStatus::Skipped {
                reason: e.to_string(),
            }
        }
    }
}
