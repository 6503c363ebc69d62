use color_eyre::Result;

use super::Db;

impl Db {
    /// Records a visitor session key. Known keys are left untouched.
    pub async fn ensure_session(&self, session_key: &str) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO sessions (session_key) VALUES ($1)")
            .bind(session_key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn session_exists(&self, session_key: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM sessions WHERE session_key = $1)")
                .bind(session_key)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}
