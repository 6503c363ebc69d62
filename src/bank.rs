//! Choosing which item a test taker sees next.

use rand::Rng;

use crate::{
    db::QuestionModel,
    irt::{self, ResponseModel},
};

/// Items nearest the current ability estimate that compete for the next slot.
pub const SHADOW_BANK_SIZE: usize = 30;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("item bank has {available} unused items but {wanted} are needed")]
pub struct BankExhausted {
    pub available: usize,
    pub wanted: usize,
}

/// Splits `available` items (ordered by difficulty) into `wanted` equal
/// strata and draws one position from each, so the first level spans the
/// whole difficulty range.
pub fn stratified_positions<R: Rng + ?Sized>(
    available: usize,
    wanted: usize,
    rng: &mut R,
) -> Result<Vec<usize>, BankExhausted> {
    if available < wanted {
        return Err(BankExhausted { available, wanted });
    }
    if wanted == 0 {
        return Ok(Vec::new());
    }

    let stratum = available / wanted;
    Ok((0..wanted)
        .map(|i| rng.gen_range(stratum * i..stratum * (i + 1)))
        .collect())
}

/// Keeps the [`SHADOW_BANK_SIZE`] candidates closest in difficulty to `theta`.
pub fn shadow_bank(mut candidates: Vec<QuestionModel>, theta: f64) -> Vec<QuestionModel> {
    candidates.sort_by(|a, b| {
        let da = (a.params.difficulty() - theta).abs();
        let db = (b.params.difficulty() - theta).abs();
        da.total_cmp(&db)
    });
    candidates.truncate(SHADOW_BANK_SIZE);
    candidates
}

/// The shadow bank item with the lowest exposure per unit of information,
/// which balances measurement precision against overusing good items.
pub fn least_exposed(
    model: ResponseModel,
    shadow: &[QuestionModel],
    theta: f64,
) -> Option<&QuestionModel> {
    let total: i64 = shadow.iter().map(|q| q.count).sum();

    let exposure = |q: &QuestionModel| -> f64 {
        match model {
            ResponseModel::Binary => q.count as f64 / (total as f64 + 1.0),
            ResponseModel::Graded => q.count as f64 / total as f64,
        }
    };

    if model == ResponseModel::Graded && total == 0 {
        return shadow.first();
    }

    shadow
        .iter()
        .map(|q| {
            let info = irt::item_information(model, &q.params, theta);
            let ratio = if info > 0.0 {
                exposure(q) / info
            } else {
                f64::INFINITY
            };
            (q, ratio)
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(q, _)| q)
}
