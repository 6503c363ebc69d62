// Database model structs

use color_eyre::{eyre::eyre, Report, Result};
use serde::{Deserialize, Serialize};

use crate::{
    flow::Flow,
    irt::{ItemParams, ResponseModel},
};

/// Separator of the list-valued question columns.
pub(crate) const LIST_SEPARATOR: char = '|';

#[derive(sqlx::FromRow)]
pub struct QuestionnaireSummary {
    pub id: i64,
    pub name: String,
    pub item_count: i64,
    /// Whether the visitor asking has finished it.
    pub has_finished: bool,
}

#[derive(Debug, Clone)]
pub struct QuestionnaireModel {
    pub id: i64,
    pub name: String,
    pub model: ResponseModel,
    pub flow: Flow,
    pub level_one_count: i64,
    pub seconds: u32,
}

#[derive(sqlx::FromRow)]
pub(super) struct QuestionnaireRow {
    id: i64,
    name: String,
    kind: String,
    flow: String,
    level_one_count: i64,
    seconds: i64,
}

impl TryFrom<QuestionnaireRow> for QuestionnaireModel {
    type Error = Report;

    fn try_from(row: QuestionnaireRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            name: row.name,
            model: row.kind.parse()?,
            flow: row.flow.parse()?,
            level_one_count: row.level_one_count,
            seconds: u32::try_from(row.seconds.max(0))?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceModel {
    pub text: String,
    pub value: i32,
}

#[derive(Debug, Clone)]
pub struct QuestionModel {
    pub id: i64,
    pub questionnaire_id: i64,
    pub question: String,
    pub level: i32,
    pub params: ItemParams,
    pub choices: Vec<ChoiceModel>,
    pub count: i64,
}

impl QuestionModel {
    /// Identifiers the quiz page uses for the choices: their positions.
    pub fn choice_ids(&self) -> Vec<String> {
        (0..self.choices.len()).map(|i| i.to_string()).collect()
    }

    /// Score of a submitted choice. An empty choice (a skip or a timeout)
    /// scores the lowest value; anything that is not a valid position is
    /// rejected.
    pub fn score_for(&self, choice: &str) -> Option<i32> {
        if choice.is_empty() {
            return self.choices.iter().map(|c| c.value).min();
        }
        let idx: usize = choice.parse().ok()?;
        self.choices.get(idx).map(|c| c.value)
    }
}

#[derive(sqlx::FromRow)]
pub(super) struct QuestionRow {
    id: i64,
    questionnaire_id: i64,
    question: String,
    a_level: i64,
    slope: f64,
    thresholds: String,
    choice_text: String,
    choice_value: String,
    count: i64,
}

impl TryFrom<QuestionRow> for QuestionModel {
    type Error = Report;

    fn try_from(row: QuestionRow) -> Result<Self> {
        let thresholds = row
            .thresholds
            .split(LIST_SEPARATOR)
            .map(|t| t.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()?;

        let texts: Vec<&str> = row.choice_text.split(LIST_SEPARATOR).collect();
        let values = row
            .choice_value
            .split(LIST_SEPARATOR)
            .map(|v| v.trim().parse::<i32>())
            .collect::<Result<Vec<_>, _>>()?;
        if texts.len() != values.len() {
            return Err(eyre!(
                "question {} has {} choice texts but {} values",
                row.id,
                texts.len(),
                values.len()
            ));
        }

        Ok(Self {
            id: row.id,
            questionnaire_id: row.questionnaire_id,
            question: row.question,
            level: i32::try_from(row.a_level)?,
            params: ItemParams::new(row.slope, thresholds),
            choices: texts
                .into_iter()
                .zip(values)
                .map(|(text, value)| ChoiceModel {
                    text: text.to_string(),
                    value,
                })
                .collect(),
            count: row.count,
        })
    }
}

/// Progress of an attempt between requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttemptState {
    /// 1-based position of the item on screen.
    pub step: u32,
    /// Flow level the next item is drawn from.
    pub stage: u32,
    /// Set by an accepted answer; the next page view shows the queued item
    /// instead of restarting the attempt.
    pub awaiting_next: bool,
    pub current: Option<i64>,
    pub queued: Vec<i64>,
    pub items: Vec<ItemParams>,
    pub scores: Vec<i32>,
    pub last_theta: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct AttemptModel {
    pub id: i64,
    pub session_key: String,
    pub questionnaire_id: i64,
    pub try_count: i64,
    pub has_finished: bool,
    pub theta: Option<f64>,
    pub info: Option<f64>,
    pub state: AttemptState,
}

#[derive(sqlx::FromRow)]
pub(super) struct AttemptRow {
    id: i64,
    session_key: String,
    questionnaire_id: i64,
    try_count: i64,
    has_finished: bool,
    theta: Option<f64>,
    info: Option<f64>,
    state: String,
}

impl TryFrom<AttemptRow> for AttemptModel {
    type Error = Report;

    fn try_from(row: AttemptRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            session_key: row.session_key,
            questionnaire_id: row.questionnaire_id,
            try_count: row.try_count,
            has_finished: row.has_finished,
            theta: row.theta,
            info: row.info,
            state: serde_json::from_str(&row.state)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct AnswerModel {
    pub position: i64,
    pub question: String,
    pub a_level: i64,
    pub choice: Option<String>,
    pub score: Option<i64>,
    pub theta: Option<f64>,
    pub info: Option<f64>,
}
