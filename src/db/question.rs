use color_eyre::{eyre::OptionExt, Result};

use super::models::{QuestionModel, QuestionRow};
use super::Db;

const QUESTION_COLUMNS: &str =
    "id, questionnaire_id, question, a_level, slope, thresholds, choice_text, choice_value, count";

impl Db {
    pub async fn question(&self, question_id: i64) -> Result<QuestionModel> {
        let row = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1"
        ))
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_eyre("could not get question")?;

        QuestionModel::try_from(row)
    }

    /// Questions of one level never shown during any try of the attempt,
    /// ordered by difficulty.
    pub async fn level_questions(
        &self,
        questionnaire_id: i64,
        level: u32,
        attempt_id: i64,
    ) -> Result<Vec<QuestionModel>> {
        let rows = sqlx::query_as::<_, QuestionRow>(&format!(
            r#"
            SELECT {QUESTION_COLUMNS} FROM questions
            WHERE questionnaire_id = $1 AND a_level = $2
              AND id NOT IN (SELECT question_id FROM responses WHERE attempt_id = $3 AND a_level = $2)
            ORDER BY difficulty, id
            "#
        ))
        .bind(questionnaire_id)
        .bind(level)
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(QuestionModel::try_from).collect()
    }

    /// Counts one more administration of the question.
    pub async fn increment_exposure(&self, question_id: i64) -> Result<()> {
        sqlx::query("UPDATE questions SET count = count + 1 WHERE id = $1")
            .bind(question_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
