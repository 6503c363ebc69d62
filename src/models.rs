use serde::Deserialize;

use crate::{
    db::models::LIST_SEPARATOR,
    flow::Flow,
    irt::ResponseModel,
    names,
};

/// A question bank as loaded by `--import`.
#[derive(Debug, Deserialize)]
pub struct QuestionnaireImport {
    pub name: String,
    #[serde(rename = "type")]
    pub model: ResponseModel,
    pub flow: String,
    #[serde(default = "default_seconds")]
    pub seconds: u32,
    pub questions: Vec<QuestionImport>,
}

fn default_seconds() -> u32 {
    names::DEFAULT_SECONDS
}

#[derive(Debug, Deserialize)]
pub struct QuestionImport {
    pub question: String,
    pub level: u32,
    pub slope: f64,
    pub thresholds: Vec<f64>,
    pub choices: Vec<ChoiceImport>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceImport {
    pub text: String,
    pub value: i32,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ImportError {
    #[error(transparent)]
    Flow(#[from] crate::flow::FlowError),
    #[error("question {0}: choice text must not contain '|'")]
    Separator(usize),
    #[error("question {0}: binary items take exactly one threshold")]
    BinaryThresholds(usize),
    #[error("question {0}: thresholds must be ascending")]
    UnorderedThresholds(usize),
    #[error("question {index}: choice value {value} is outside {min}..={max}")]
    ChoiceValue {
        index: usize,
        value: i32,
        min: i32,
        max: i32,
    },
    #[error("question {index}: level {level} is not part of the flow")]
    Level { index: usize, level: u32 },
    #[error("question {0}: no choices")]
    NoChoices(usize),
}

impl QuestionnaireImport {
    /// Checks the bank against its flow and response model before anything is
    /// written.
    pub fn validate(&self) -> Result<Flow, ImportError> {
        let flow = Flow::parse(&self.flow)?;

        for (index, q) in self.questions.iter().enumerate() {
            if q.level == 0 || q.level > flow.level_count() {
                return Err(ImportError::Level {
                    index,
                    level: q.level,
                });
            }
            if q.choices.is_empty() {
                return Err(ImportError::NoChoices(index));
            }
            if q.choices.iter().any(|c| c.text.contains(LIST_SEPARATOR)) {
                return Err(ImportError::Separator(index));
            }
            if q.thresholds.windows(2).any(|w| w[0] >= w[1]) {
                return Err(ImportError::UnorderedThresholds(index));
            }

            let (min, max) = match self.model {
                ResponseModel::Binary => {
                    if q.thresholds.len() != 1 {
                        return Err(ImportError::BinaryThresholds(index));
                    }
                    (0, 1)
                }
                ResponseModel::Graded => (1, q.thresholds.len() as i32 + 1),
            };
            if let Some(c) = q.choices.iter().find(|c| !(min..=max).contains(&c.value)) {
                return Err(ImportError::ChoiceValue {
                    index,
                    value: c.value,
                    min,
                    max,
                });
            }
        }

        Ok(flow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank(json: &str) -> QuestionnaireImport {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn seconds_default_to_thirty() {
        let q = bank(r#"{"name": "n", "type": "brm", "flow": "1|1", "questions": []}"#);
        assert_eq!(q.seconds, 30);
        assert_eq!(q.model, ResponseModel::Binary);
    }

    #[test]
    fn pipe_in_choice_text_is_rejected() {
        let q = bank(
            r#"{"name": "n", "type": "brm", "flow": "1|1", "questions": [
                {"question": "q", "level": 1, "slope": 1.0, "thresholds": [0.0],
                 "choices": [{"text": "a|b", "value": 1}, {"text": "c", "value": 0}]}
            ]}"#,
        );
        assert_eq!(q.validate(), Err(ImportError::Separator(0)));
    }

    #[test]
    fn graded_values_must_fit_categories() {
        let q = bank(
            r#"{"name": "n", "type": "grm", "flow": "1|1", "questions": [
                {"question": "q", "level": 2, "slope": 1.0, "thresholds": [-1.0, 1.0],
                 "choices": [{"text": "a", "value": 1}, {"text": "b", "value": 4}]}
            ]}"#,
        );
        assert_eq!(
            q.validate(),
            Err(ImportError::ChoiceValue {
                index: 0,
                value: 4,
                min: 1,
                max: 3
            })
        );
    }

    #[test]
    fn level_outside_flow_is_rejected() {
        let q = bank(
            r#"{"name": "n", "type": "brm", "flow": "1|1", "questions": [
                {"question": "q", "level": 3, "slope": 1.0, "thresholds": [0.0],
                 "choices": [{"text": "a", "value": 1}]}
            ]}"#,
        );
        assert_eq!(q.validate(), Err(ImportError::Level { index: 0, level: 3 }));
    }
}
