use color_eyre::{eyre::OptionExt, Result};

use super::models::{
    QuestionnaireModel, QuestionnaireRow, QuestionnaireSummary, LIST_SEPARATOR,
};
use super::Db;
use crate::{irt::ItemParams, models::QuestionnaireImport};

fn join<T: ToString>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(&LIST_SEPARATOR.to_string())
}

impl Db {
    /// Inserts a questionnaire with all its questions in one transaction.
    /// Returns the new questionnaire id.
    pub async fn load_questionnaire(&self, import: QuestionnaireImport) -> Result<i64> {
        import.validate()?;

        let level_one_count = import.questions.iter().filter(|q| q.level == 1).count() as i64;

        let mut tx = self.pool.begin().await?;

        let questionnaire_id: i64 = sqlx::query_scalar(
            "INSERT INTO questionnaires (name, kind, flow, level_one_count, seconds) VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(&import.name)
        .bind(import.model.as_str())
        .bind(&import.flow)
        .bind(level_one_count)
        .bind(import.seconds)
        .fetch_one(&mut *tx)
        .await?;

        for q in &import.questions {
            let difficulty = ItemParams::new(q.slope, q.thresholds.clone()).difficulty();
            sqlx::query(
                r#"
                INSERT INTO questions
                    (question, slope, thresholds, difficulty, choice_text, choice_value, a_level, questionnaire_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(&q.question)
            .bind(q.slope)
            .bind(join(&q.thresholds))
            .bind(difficulty)
            .bind(join(q.choices.iter().map(|c| &c.text)))
            .bind(join(q.choices.iter().map(|c| c.value)))
            .bind(q.level)
            .bind(questionnaire_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            "questionnaire {questionnaire_id} loaded with {} questions",
            import.questions.len()
        );

        Ok(questionnaire_id)
    }

    /// Every questionnaire, flagged finished for `session_key` when that
    /// visitor's attempt has ended.
    pub async fn questionnaires(
        &self,
        session_key: Option<&str>,
    ) -> Result<Vec<QuestionnaireSummary>> {
        let rows = sqlx::query_as::<_, QuestionnaireSummary>(
            r#"
            SELECT q.id, q.name, COUNT(qs.id) AS item_count,
                   EXISTS(
                       SELECT 1 FROM attempts a
                       WHERE a.questionnaire_id = q.id AND a.session_key = $1 AND a.has_finished
                   ) AS has_finished
            FROM questionnaires q
            LEFT JOIN questions qs ON qs.questionnaire_id = q.id
            GROUP BY q.id, q.name
            ORDER BY q.id
            "#,
        )
        .bind(session_key)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn questionnaire(&self, questionnaire_id: i64) -> Result<Option<QuestionnaireModel>> {
        let row = sqlx::query_as::<_, QuestionnaireRow>(
            "SELECT id, name, kind, flow, level_one_count, seconds FROM questionnaires WHERE id = $1",
        )
        .bind(questionnaire_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(QuestionnaireModel::try_from).transpose()
    }

    pub async fn questionnaire_name(&self, questionnaire_id: i64) -> Result<String> {
        let name: String = sqlx::query_scalar("SELECT name FROM questionnaires WHERE id = $1")
            .bind(questionnaire_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_eyre("could not find questionnaire")?;

        Ok(name)
    }
}
