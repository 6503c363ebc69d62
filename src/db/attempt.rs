use color_eyre::Result;

use super::models::{AnswerModel, AttemptModel, AttemptRow};
use super::Db;

const ATTEMPT_COLUMNS: &str =
    "id, session_key, questionnaire_id, try_count, has_finished, theta, info, state";

impl Db {
    pub async fn attempt(
        &self,
        session_key: &str,
        questionnaire_id: i64,
    ) -> Result<Option<AttemptModel>> {
        let row = sqlx::query_as::<_, AttemptRow>(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM attempts WHERE session_key = $1 AND questionnaire_id = $2"
        ))
        .bind(session_key)
        .bind(questionnaire_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AttemptModel::try_from).transpose()
    }

    pub async fn create_attempt(
        &self,
        session_key: &str,
        questionnaire_id: i64,
    ) -> Result<AttemptModel> {
        let row = sqlx::query_as::<_, AttemptRow>(&format!(
            "INSERT INTO attempts (session_key, questionnaire_id) VALUES ($1, $2) RETURNING {ATTEMPT_COLUMNS}"
        ))
        .bind(session_key)
        .bind(questionnaire_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("attempt created for questionnaire {questionnaire_id}");

        AttemptModel::try_from(row)
    }

    pub async fn save_attempt(&self, attempt: &AttemptModel) -> Result<()> {
        let state = serde_json::to_string(&attempt.state)?;

        sqlx::query(
            "UPDATE attempts SET try_count = $1, has_finished = $2, theta = $3, info = $4, state = $5 WHERE id = $6",
        )
        .bind(attempt.try_count)
        .bind(attempt.has_finished)
        .bind(attempt.theta)
        .bind(attempt.info)
        .bind(state)
        .bind(attempt.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Marks a question as shown at `position` of the try.
    pub async fn record_administered(
        &self,
        attempt_id: i64,
        try_no: i64,
        question_id: i64,
        position: u32,
        level: i32,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO responses (attempt_id, try_no, question_id, position, a_level) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(attempt_id)
        .bind(try_no)
        .bind(question_id)
        .bind(position)
        .bind(level)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn record_answer(
        &self,
        attempt_id: i64,
        try_no: i64,
        question_id: i64,
        choice: &str,
        score: i32,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE responses SET choice = $1, score = $2 WHERE attempt_id = $3 AND try_no = $4 AND question_id = $5",
        )
        .bind(choice)
        .bind(score)
        .bind(attempt_id)
        .bind(try_no)
        .bind(question_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Stores the ability estimate computed after answering `question_id`.
    pub async fn record_estimate(
        &self,
        attempt_id: i64,
        try_no: i64,
        question_id: i64,
        theta: f64,
        info: f64,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE responses SET theta = $1, info = $2 WHERE attempt_id = $3 AND try_no = $4 AND question_id = $5",
        )
        .bind(theta)
        .bind(info)
        .bind(attempt_id)
        .bind(try_no)
        .bind(question_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn answers(&self, attempt_id: i64, try_no: i64) -> Result<Vec<AnswerModel>> {
        let answers = sqlx::query_as::<_, AnswerModel>(
            r#"
            SELECT r.position, q.question, r.a_level, r.choice, r.score, r.theta, r.info
            FROM responses r
            JOIN questions q ON q.id = r.question_id
            WHERE r.attempt_id = $1 AND r.try_no = $2
            ORDER BY r.position
            "#,
        )
        .bind(attempt_id)
        .bind(try_no)
        .fetch_all(&self.pool)
        .await?;

        Ok(answers)
    }
}
