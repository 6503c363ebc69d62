//! Item response theory: the two logistic models the tests are scored with,
//! ability (theta) estimation and information functions.
//!
//! Both models put a standard normal prior on theta, so estimation maximizes
//! the log posterior and stays finite for all-correct or all-wrong patterns.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const MAX_ITERATIONS: usize = 50;
pub const TOLERANCE: f64 = 1e-5;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum IrtError {
    #[error("unknown response model {0:?}")]
    UnknownModel(String),
    #[error("{items} items but {scores} scores")]
    LengthMismatch { items: usize, scores: usize },
    #[error("score {score} is outside {min}..={max}")]
    ScoreOutOfRange { score: i32, min: i32, max: i32 },
    #[error("no convergence within 50 iterations")]
    NoConvergence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseModel {
    /// Two-parameter logistic, scores 0 or 1.
    #[serde(rename = "brm")]
    Binary,
    /// Samejima's graded response model, scores 1 to thresholds + 1.
    #[serde(rename = "grm")]
    Graded,
}

impl ResponseModel {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseModel::Binary => "brm",
            ResponseModel::Graded => "grm",
        }
    }

    fn score_range(self, item: &ItemParams) -> (i32, i32) {
        let categories = item.thresholds.len() as i32;
        match self {
            ResponseModel::Binary => (0, 1),
            ResponseModel::Graded => (1, categories + 1),
        }
    }
}

impl FromStr for ResponseModel {
    type Err = IrtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "brm" => Ok(ResponseModel::Binary),
            "grm" => Ok(ResponseModel::Graded),
            other => Err(IrtError::UnknownModel(other.to_string())),
        }
    }
}

/// Slope (discrimination) and ordered thresholds (difficulties) of one item.
/// Binary items have a single threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemParams {
    pub slope: f64,
    pub thresholds: Vec<f64>,
}

impl ItemParams {
    pub fn new(slope: f64, thresholds: Vec<f64>) -> Self {
        Self { slope, thresholds }
    }

    /// Mean threshold, used to place the item on the ability scale.
    pub fn difficulty(&self) -> f64 {
        if self.thresholds.is_empty() {
            return 0.0;
        }
        self.thresholds.iter().sum::<f64>() / self.thresholds.len() as f64
    }
}

/// `P(theta)` of the logistic curve with slope `a` and threshold `b`.
pub fn probability(a: f64, b: f64, theta: f64) -> f64 {
    1.0 / (1.0 + (-a * (theta - b)).exp())
}

/// Cumulative probability `P*_k` of the k-th boundary and its first two
/// derivatives. `P*_0 = 1` and `P*_{m+1} = 0` are flat.
fn boundary(item: &ItemParams, k: usize, theta: f64) -> (f64, f64, f64) {
    if k == 0 {
        return (1.0, 0.0, 0.0);
    }
    match item.thresholds.get(k - 1) {
        Some(&b) => {
            let a = item.slope;
            let p = probability(a, b, theta);
            let dp = a * p * (1.0 - p);
            (p, dp, a * dp * (1.0 - 2.0 * p))
        }
        None => (0.0, 0.0, 0.0),
    }
}

struct Derivatives {
    first: f64,
    second: f64,
    third: Option<f64>,
}

fn binary_derivatives(items: &[ItemParams], scores: &[i32], theta: f64) -> Derivatives {
    let mut first = -theta;
    let mut second = -1.0;
    let mut third = 0.0;

    for (item, &score) in items.iter().zip(scores) {
        let a = item.slope;
        let b = item.thresholds.first().copied().unwrap_or(0.0);
        let p = probability(a, b, theta);
        let pq = p * (1.0 - p);
        first += a * (f64::from(score) - p);
        second -= a * a * pq;
        third -= a * a * a * pq * (1.0 - 2.0 * p);
    }

    Derivatives {
        first,
        second,
        third: Some(third),
    }
}

fn graded_derivatives(items: &[ItemParams], scores: &[i32], theta: f64) -> Derivatives {
    let mut first = -theta;
    let mut second = -1.0;

    for (item, &score) in items.iter().zip(scores) {
        // score s falls between boundaries s - 1 and s
        let upper = (score - 1) as usize;
        let (pu, dpu, ddpu) = boundary(item, upper, theta);
        let (pl, dpl, ddpl) = boundary(item, upper + 1, theta);

        let p = pu - pl;
        let dp = dpu - dpl;
        let ddp = ddpu - ddpl;
        first += dp / p;
        second += ddp / p - (dp / p).powi(2);
    }

    Derivatives {
        first,
        second,
        third: None,
    }
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Maximum a posteriori ability estimate for a response pattern, starting
/// from `x0`. Uses Halley steps where the third derivative is known and
/// Newton steps otherwise.
pub fn estimate_theta(
    model: ResponseModel,
    items: &[ItemParams],
    scores: &[i32],
    x0: f64,
) -> Result<f64, IrtError> {
    if items.len() != scores.len() {
        return Err(IrtError::LengthMismatch {
            items: items.len(),
            scores: scores.len(),
        });
    }
    for (item, &score) in items.iter().zip(scores) {
        let (min, max) = model.score_range(item);
        if !(min..=max).contains(&score) {
            return Err(IrtError::ScoreOutOfRange { score, min, max });
        }
    }

    let mut current = x0;
    for _ in 0..MAX_ITERATIONS {
        let d = match model {
            ResponseModel::Binary => binary_derivatives(items, scores, current),
            ResponseModel::Graded => graded_derivatives(items, scores, current),
        };

        if d.second == 0.0 {
            tracing::warn!("second derivative vanished at theta={current}");
            return Ok(round3(current));
        }

        let next = match d.third {
            Some(third) => {
                let discr = d.second * d.second - 2.0 * d.first * third;
                if discr < 0.0 {
                    current - d.first / d.second
                } else {
                    current - 2.0 * d.first / (d.second + d.second.signum() * discr.sqrt())
                }
            }
            None => current - d.first / d.second,
        };

        if !next.is_finite() {
            return Err(IrtError::NoConvergence);
        }
        if (next - current).abs() < TOLERANCE {
            return Ok(round3(next));
        }
        current = next;
    }

    Err(IrtError::NoConvergence)
}

/// Fisher information of a single item at `theta`.
pub fn item_information(model: ResponseModel, item: &ItemParams, theta: f64) -> f64 {
    match model {
        ResponseModel::Binary => {
            let b = item.thresholds.first().copied().unwrap_or(0.0);
            let p = probability(item.slope, b, theta);
            item.slope.powi(2) * p * (1.0 - p)
        }
        ResponseModel::Graded => (0..=item.thresholds.len())
            .map(|k| {
                let (pu, dpu, _) = boundary(item, k, theta);
                let (pl, dpl, _) = boundary(item, k + 1, theta);
                let p = pu - pl;
                if p <= 0.0 {
                    0.0
                } else {
                    (dpu - dpl).powi(2) / p
                }
            })
            .sum(),
    }
}

/// Test information: the sum of the item information.
pub fn test_information(model: ResponseModel, items: &[ItemParams], theta: f64) -> f64 {
    items
        .iter()
        .map(|item| item_information(model, item, theta))
        .sum()
}
