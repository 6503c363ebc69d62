use std::future::Future;

use color_eyre::Result;

use crate::{
    bank::{self, BankExhausted},
    db::{AnswerModel, AttemptModel, AttemptState, Db, QuestionModel, QuestionnaireModel},
    irt::{self, IrtError},
};

// ---------------------------------------------------------------------------
// AttemptRepository trait
// ---------------------------------------------------------------------------

#[cfg_attr(test, mockall::automock)]
pub trait AttemptRepository: Send + Sync {
    fn questionnaire(
        &self,
        questionnaire_id: i64,
    ) -> impl Future<Output = Result<Option<QuestionnaireModel>>> + Send;

    fn attempt(
        &self,
        session_key: &str,
        questionnaire_id: i64,
    ) -> impl Future<Output = Result<Option<AttemptModel>>> + Send;

    fn create_attempt(
        &self,
        session_key: &str,
        questionnaire_id: i64,
    ) -> impl Future<Output = Result<AttemptModel>> + Send;

    fn save_attempt(&self, attempt: &AttemptModel) -> impl Future<Output = Result<()>> + Send;

    fn question(&self, question_id: i64) -> impl Future<Output = Result<QuestionModel>> + Send;

    fn level_questions(
        &self,
        questionnaire_id: i64,
        level: u32,
        attempt_id: i64,
    ) -> impl Future<Output = Result<Vec<QuestionModel>>> + Send;

    fn increment_exposure(&self, question_id: i64) -> impl Future<Output = Result<()>> + Send;

    fn record_administered(
        &self,
        attempt_id: i64,
        try_no: i64,
        question_id: i64,
        position: u32,
        level: i32,
    ) -> impl Future<Output = Result<()>> + Send;

    fn record_answer(
        &self,
        attempt_id: i64,
        try_no: i64,
        question_id: i64,
        choice: &str,
        score: i32,
    ) -> impl Future<Output = Result<()>> + Send;

    fn record_estimate(
        &self,
        attempt_id: i64,
        try_no: i64,
        question_id: i64,
        theta: f64,
        info: f64,
    ) -> impl Future<Output = Result<()>> + Send;

    fn answers(
        &self,
        attempt_id: i64,
        try_no: i64,
    ) -> impl Future<Output = Result<Vec<AnswerModel>>> + Send;
}

impl AttemptRepository for Db {
    fn questionnaire(
        &self,
        questionnaire_id: i64,
    ) -> impl Future<Output = Result<Option<QuestionnaireModel>>> + Send {
        Db::questionnaire(self, questionnaire_id)
    }

    fn attempt(
        &self,
        session_key: &str,
        questionnaire_id: i64,
    ) -> impl Future<Output = Result<Option<AttemptModel>>> + Send {
        Db::attempt(self, session_key, questionnaire_id)
    }

    fn create_attempt(
        &self,
        session_key: &str,
        questionnaire_id: i64,
    ) -> impl Future<Output = Result<AttemptModel>> + Send {
        Db::create_attempt(self, session_key, questionnaire_id)
    }

    fn save_attempt(&self, attempt: &AttemptModel) -> impl Future<Output = Result<()>> + Send {
        Db::save_attempt(self, attempt)
    }

    fn question(&self, question_id: i64) -> impl Future<Output = Result<QuestionModel>> + Send {
        Db::question(self, question_id)
    }

    fn level_questions(
        &self,
        questionnaire_id: i64,
        level: u32,
        attempt_id: i64,
    ) -> impl Future<Output = Result<Vec<QuestionModel>>> + Send {
        Db::level_questions(self, questionnaire_id, level, attempt_id)
    }

    fn increment_exposure(&self, question_id: i64) -> impl Future<Output = Result<()>> + Send {
        Db::increment_exposure(self, question_id)
    }

    fn record_administered(
        &self,
        attempt_id: i64,
        try_no: i64,
        question_id: i64,
        position: u32,
        level: i32,
    ) -> impl Future<Output = Result<()>> + Send {
        Db::record_administered(self, attempt_id, try_no, question_id, position, level)
    }

    fn record_answer(
        &self,
        attempt_id: i64,
        try_no: i64,
        question_id: i64,
        choice: &str,
        score: i32,
    ) -> impl Future<Output = Result<()>> + Send {
        Db::record_answer(self, attempt_id, try_no, question_id, choice, score)
    }

    fn record_estimate(
        &self,
        attempt_id: i64,
        try_no: i64,
        question_id: i64,
        theta: f64,
        info: f64,
    ) -> impl Future<Output = Result<()>> + Send {
        Db::record_estimate(self, attempt_id, try_no, question_id, theta, info)
    }

    fn answers(
        &self,
        attempt_id: i64,
        try_no: i64,
    ) -> impl Future<Output = Result<Vec<AnswerModel>>> + Send {
        Db::answers(self, attempt_id, try_no)
    }
}

// ---------------------------------------------------------------------------
// Errors and outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    #[error("no such questionnaire or attempt")]
    NotFound,
    #[error("the questionnaire has been taken {0} times already")]
    TooManyTries(i64),
    #[error(transparent)]
    Bank(#[from] BankExhausted),
    #[error(transparent)]
    Irt(#[from] IrtError),
    #[error("database error: {0}")]
    Db(color_eyre::Report),
}

impl From<color_eyre::Report> for AttemptError {
    fn from(err: color_eyre::Report) -> Self {
        AttemptError::Db(err)
    }
}

/// Everything the quiz page needs to show one item.
#[derive(Debug, Clone)]
pub struct ItemPage {
    pub questionnaire: QuestionnaireModel,
    pub question: QuestionModel,
    /// 1-based position of the item.
    pub step: u32,
    pub total: u32,
}

#[derive(Debug)]
pub enum AnswerOutcome {
    /// The next item is queued for the following page view.
    Next,
    Finished,
    /// The choice did not belong to the item; it is shown again.
    Invalid(ItemPage),
}

#[derive(Debug)]
pub struct AttemptResult {
    pub questionnaire: QuestionnaireModel,
    pub theta: f64,
    pub info: f64,
    pub try_count: i64,
    pub answers: Vec<AnswerModel>,
}

// ---------------------------------------------------------------------------
// AttemptService
// ---------------------------------------------------------------------------

pub struct AttemptService<R: AttemptRepository = Db> {
    repo: R,
    max_answer_count: i64,
}

impl<R: AttemptRepository + Clone> Clone for AttemptService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            max_answer_count: self.max_answer_count,
        }
    }
}

impl<R: AttemptRepository> AttemptService<R> {
    pub fn new(repo: R, max_answer_count: i64) -> Self {
        Self {
            repo,
            max_answer_count,
        }
    }

    async fn load_questionnaire(
        &self,
        questionnaire_id: i64,
    ) -> Result<QuestionnaireModel, AttemptError> {
        self.repo
            .questionnaire(questionnaire_id)
            .await?
            .ok_or(AttemptError::NotFound)
    }

    fn page(&self, questionnaire: QuestionnaireModel, question: QuestionModel, step: u32) -> ItemPage {
        let total = questionnaire.flow.total_items();
        ItemPage {
            questionnaire,
            question,
            step,
            total,
        }
    }

    async fn administer(
        &self,
        attempt: &AttemptModel,
        question: &QuestionModel,
    ) -> Result<(), AttemptError> {
        self.repo
            .record_administered(
                attempt.id,
                attempt.try_count,
                question.id,
                attempt.state.step,
                question.level,
            )
            .await?;
        self.repo.increment_exposure(question.id).await?;
        Ok(())
    }

    /// Shows the item the visitor should see now. Right after an accepted
    /// answer that is the queued next item; any other visit starts a new try.
    pub async fn begin(
        &self,
        session_key: &str,
        questionnaire_id: i64,
    ) -> Result<ItemPage, AttemptError> {
        let questionnaire = self.load_questionnaire(questionnaire_id).await?;

        let mut attempt = match self.repo.attempt(session_key, questionnaire_id).await? {
            Some(attempt) => attempt,
            None => {
                self.repo
                    .create_attempt(session_key, questionnaire_id)
                    .await?
            }
        };

        if attempt.state.awaiting_next {
            if let Some(current) = attempt.state.current {
                attempt.state.awaiting_next = false;
                self.repo.save_attempt(&attempt).await?;
                let question = self.repo.question(current).await?;
                return Ok(self.page(questionnaire, question, attempt.state.step));
            }
        }

        self.restart(questionnaire, attempt).await
    }

    async fn restart(
        &self,
        questionnaire: QuestionnaireModel,
        mut attempt: AttemptModel,
    ) -> Result<ItemPage, AttemptError> {
        if attempt.try_count >= self.max_answer_count {
            return Err(AttemptError::TooManyTries(attempt.try_count));
        }

        let try_no = attempt.try_count + 1;
        let wanted = questionnaire.flow.level_items(1) as usize;
        let available = self
            .repo
            .level_questions(questionnaire.id, 1, attempt.id)
            .await?;

        let positions = {
            let mut rng = rand::thread_rng();
            bank::stratified_positions(available.len(), wanted, &mut rng)?
        };
        let mut picked = positions.into_iter().map(|i| available[i].clone());
        let first = picked.next().ok_or(BankExhausted {
            available: available.len(),
            wanted: 1,
        })?;
        let queued = picked.map(|q| q.id).collect();

        attempt.try_count = try_no;
        attempt.has_finished = false;
        attempt.theta = None;
        attempt.info = None;
        attempt.state = AttemptState {
            step: 1,
            stage: questionnaire.flow.next_stage(1, 1),
            awaiting_next: false,
            current: Some(first.id),
            queued,
            ..AttemptState::default()
        };
        self.repo.save_attempt(&attempt).await?;
        self.administer(&attempt, &first).await?;

        tracing::info!(
            "try {try_no} of questionnaire {} started for attempt {}",
            questionnaire.id,
            attempt.id
        );

        Ok(self.page(questionnaire, first, 1))
    }

    /// The item currently on screen, without changing the attempt.
    pub async fn current(
        &self,
        session_key: &str,
        questionnaire_id: i64,
    ) -> Result<ItemPage, AttemptError> {
        let questionnaire = self.load_questionnaire(questionnaire_id).await?;
        let attempt = self
            .repo
            .attempt(session_key, questionnaire_id)
            .await?
            .ok_or(AttemptError::NotFound)?;
        let current = attempt.state.current.ok_or(AttemptError::NotFound)?;
        let question = self.repo.question(current).await?;

        Ok(self.page(questionnaire, question, attempt.state.step))
    }

    /// Scores `choice` for the item on screen and selects the next one.
    /// An empty choice is a skip or a timeout and scores the lowest value.
    pub async fn answer(
        &self,
        session_key: &str,
        questionnaire_id: i64,
        choice: &str,
    ) -> Result<AnswerOutcome, AttemptError> {
        let questionnaire = self.load_questionnaire(questionnaire_id).await?;
        let mut attempt = self
            .repo
            .attempt(session_key, questionnaire_id)
            .await?
            .ok_or(AttemptError::NotFound)?;

        let current = match attempt.state.current {
            Some(id) if !attempt.has_finished => id,
            _ => return Err(AttemptError::NotFound),
        };
        let question = self.repo.question(current).await?;

        let Some(score) = question.score_for(choice) else {
            tracing::debug!("choice {choice:?} does not belong to question {current}");
            let step = attempt.state.step;
            return Ok(AnswerOutcome::Invalid(self.page(questionnaire, question, step)));
        };

        let try_no = attempt.try_count;
        self.repo
            .record_answer(attempt.id, try_no, question.id, choice, score)
            .await?;
        attempt.state.items.push(question.params.clone());
        attempt.state.scores.push(score);

        let next = if attempt.state.stage <= 1 {
            if attempt.state.queued.is_empty() {
                return Err(BankExhausted {
                    available: 0,
                    wanted: 1,
                }
                .into());
            }
            let id = attempt.state.queued.remove(0);
            self.repo.question(id).await?
        } else {
            let model = questionnaire.model;
            let theta = irt::estimate_theta(
                model,
                &attempt.state.items,
                &attempt.state.scores,
                attempt.state.last_theta.unwrap_or(0.0),
            )?;
            let info = irt::test_information(model, &attempt.state.items, theta);
            attempt.state.last_theta = Some(theta);
            self.repo
                .record_estimate(attempt.id, try_no, question.id, theta, info)
                .await?;
            tracing::debug!("theta {theta} info {info} after step {}", attempt.state.step);

            if questionnaire.flow.is_complete(attempt.state.stage) {
                attempt.state.current = None;
                attempt.state.awaiting_next = false;
                attempt.has_finished = true;
                attempt.theta = Some(theta);
                attempt.info = Some(info);
                self.repo.save_attempt(&attempt).await?;
                tracing::info!(
                    "attempt {} finished questionnaire {} with theta {theta}",
                    attempt.id,
                    questionnaire.id
                );
                return Ok(AnswerOutcome::Finished);
            }

            let candidates = self
                .repo
                .level_questions(questionnaire.id, attempt.state.stage, attempt.id)
                .await?;
            let shadow = bank::shadow_bank(candidates, theta);
            bank::least_exposed(model, &shadow, theta)
                .cloned()
                .ok_or(BankExhausted {
                    available: 0,
                    wanted: 1,
                })?
        };

        attempt.state.step += 1;
        attempt.state.stage = questionnaire
            .flow
            .next_stage(attempt.state.step, attempt.state.stage);
        attempt.state.current = Some(next.id);
        attempt.state.awaiting_next = true;
        self.repo.save_attempt(&attempt).await?;
        self.administer(&attempt, &next).await?;

        Ok(AnswerOutcome::Next)
    }

    /// Final estimate and answer history of a finished attempt.
    pub async fn result(
        &self,
        session_key: &str,
        questionnaire_id: i64,
    ) -> Result<AttemptResult, AttemptError> {
        let questionnaire = self.load_questionnaire(questionnaire_id).await?;
        let attempt = self
            .repo
            .attempt(session_key, questionnaire_id)
            .await?
            .ok_or(AttemptError::NotFound)?;

        let (true, Some(theta), Some(info)) = (attempt.has_finished, attempt.theta, attempt.info)
        else {
            return Err(AttemptError::NotFound);
        };

        let answers = self.repo.answers(attempt.id, attempt.try_count).await?;

        Ok(AttemptResult {
            questionnaire,
            theta,
            info,
            try_count: attempt.try_count,
            answers,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{db::ChoiceModel, flow::Flow, irt::ItemParams, irt::ResponseModel};

    fn questionnaire() -> QuestionnaireModel {
        QuestionnaireModel {
            id: 1,
            name: "Vocabulary".to_string(),
            model: ResponseModel::Binary,
            flow: Flow::parse("1|1").unwrap(),
            level_one_count: 2,
            seconds: 30,
        }
    }

    fn question(id: i64, level: i32) -> QuestionModel {
        QuestionModel {
            id,
            questionnaire_id: 1,
            question: format!("Question {id}"),
            level,
            params: ItemParams::new(1.0, vec![0.0]),
            choices: vec![
                ChoiceModel {
                    text: "wrong".to_string(),
                    value: 0,
                },
                ChoiceModel {
                    text: "right".to_string(),
                    value: 1,
                },
            ],
            count: 0,
        }
    }

    fn attempt(try_count: i64, state: AttemptState) -> AttemptModel {
        AttemptModel {
            id: 7,
            session_key: "visitor".to_string(),
            questionnaire_id: 1,
            try_count,
            has_finished: false,
            theta: None,
            info: None,
            state,
        }
    }

    fn with_questionnaire(mock: &mut MockAttemptRepository) {
        mock.expect_questionnaire()
            .returning(|_| Box::pin(async { Ok(Some(questionnaire())) }));
    }

    #[tokio::test]
    async fn unknown_questionnaire_is_not_found() {
        let mut mock = MockAttemptRepository::new();
        mock.expect_questionnaire()
            .returning(|_| Box::pin(async { Ok(None) }));

        let svc = AttemptService::new(mock, 3);
        let err = svc.begin("visitor", 99).await.unwrap_err();

        assert!(matches!(err, AttemptError::NotFound));
    }

    #[tokio::test]
    async fn restart_beyond_max_answer_count_is_refused() {
        let mut mock = MockAttemptRepository::new();
        with_questionnaire(&mut mock);
        mock.expect_attempt()
            .returning(|_, _| Box::pin(async { Ok(Some(attempt(3, AttemptState::default()))) }));

        let svc = AttemptService::new(mock, 3);
        let err = svc.begin("visitor", 1).await.unwrap_err();

        assert!(matches!(err, AttemptError::TooManyTries(3)));
    }

    #[tokio::test]
    async fn first_visit_administers_a_level_one_item() {
        let mut mock = MockAttemptRepository::new();
        with_questionnaire(&mut mock);
        mock.expect_attempt()
            .returning(|_, _| Box::pin(async { Ok(None) }));
        mock.expect_create_attempt()
            .returning(|_, _| Box::pin(async { Ok(attempt(0, AttemptState::default())) }));
        mock.expect_level_questions()
            .withf(|_, level, _| *level == 1)
            .returning(|_, _, _| Box::pin(async { Ok(vec![question(10, 1), question(11, 1)]) }));
        mock.expect_save_attempt()
            .withf(|a| a.try_count == 1 && a.state.step == 1 && a.state.stage == 2)
            .times(1)
            .returning(|_| Box::pin(async { Ok(()) }));
        mock.expect_record_administered()
            .withf(|_, try_no, _, position, level| *try_no == 1 && *position == 1 && *level == 1)
            .times(1)
            .returning(|_, _, _, _, _| Box::pin(async { Ok(()) }));
        mock.expect_increment_exposure()
            .times(1)
            .returning(|_| Box::pin(async { Ok(()) }));

        let svc = AttemptService::new(mock, 3);
        let page = svc.begin("visitor", 1).await.unwrap();

        assert_eq!(page.step, 1);
        assert_eq!(page.total, 2);
        assert!(page.question.id == 10 || page.question.id == 11);
    }

    #[tokio::test]
    async fn invalid_choice_shows_the_same_item_again() {
        let state = AttemptState {
            step: 1,
            stage: 2,
            current: Some(10),
            ..AttemptState::default()
        };
        let mut mock = MockAttemptRepository::new();
        with_questionnaire(&mut mock);
        mock.expect_attempt()
            .returning(move |_, _| {
                let state = state.clone();
                Box::pin(async move { Ok(Some(attempt(1, state))) })
            });
        mock.expect_question()
            .returning(|id| Box::pin(async move { Ok(question(id, 1)) }));
        mock.expect_record_answer().never();

        let svc = AttemptService::new(mock, 3);
        let outcome = svc.answer("visitor", 1, "7").await.unwrap();

        match outcome {
            AnswerOutcome::Invalid(page) => assert_eq!(page.question.id, 10),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn result_of_unfinished_attempt_is_not_found() {
        let mut mock = MockAttemptRepository::new();
        with_questionnaire(&mut mock);
        mock.expect_attempt()
            .returning(|_, _| Box::pin(async { Ok(Some(attempt(1, AttemptState::default()))) }));

        let svc = AttemptService::new(mock, 3);
        let err = svc.result("visitor", 1).await.unwrap_err();

        assert!(matches!(err, AttemptError::NotFound));
    }
}
