// Database schema initialization

use color_eyre::Result;
use sqlx::SqlitePool;

const TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        session_key TEXT PRIMARY KEY,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS questionnaires (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        kind TEXT NOT NULL,
        flow TEXT NOT NULL,
        level_one_count INTEGER NOT NULL DEFAULT 0,
        seconds INTEGER NOT NULL DEFAULT 30
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS questions (
        id INTEGER PRIMARY KEY,
        question TEXT NOT NULL,
        slope REAL NOT NULL,
        thresholds TEXT NOT NULL,
        difficulty REAL NOT NULL,
        choice_text TEXT NOT NULL,
        choice_value TEXT NOT NULL,
        count INTEGER NOT NULL DEFAULT 0,
        a_level INTEGER NOT NULL,
        questionnaire_id INTEGER NOT NULL,
        FOREIGN KEY(questionnaire_id) REFERENCES questionnaires(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_questions_level
    ON questions(questionnaire_id, a_level, difficulty)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS attempts (
        id INTEGER PRIMARY KEY,
        session_key TEXT NOT NULL,
        questionnaire_id INTEGER NOT NULL,
        try_count INTEGER NOT NULL DEFAULT 0,
        has_finished BOOLEAN NOT NULL DEFAULT 0,
        theta REAL,
        info REAL,
        state TEXT NOT NULL DEFAULT '{}',
        FOREIGN KEY(session_key) REFERENCES sessions(session_key) ON DELETE CASCADE,
        FOREIGN KEY(questionnaire_id) REFERENCES questionnaires(id) ON DELETE CASCADE,
        UNIQUE(session_key, questionnaire_id)
    )
    "#,
    // one row per administered item; choice and score stay NULL until answered
    r#"
    CREATE TABLE IF NOT EXISTS responses (
        id INTEGER PRIMARY KEY,
        attempt_id INTEGER NOT NULL,
        question_id INTEGER NOT NULL,
        try_no INTEGER NOT NULL,
        position INTEGER NOT NULL,
        a_level INTEGER NOT NULL,
        choice TEXT,
        score INTEGER,
        theta REAL,
        info REAL,
        FOREIGN KEY(attempt_id) REFERENCES attempts(id) ON DELETE CASCADE,
        FOREIGN KEY(question_id) REFERENCES questions(id) ON DELETE CASCADE,
        UNIQUE(attempt_id, try_no, question_id)
    )
    "#,
];

pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    for sql in TABLES {
        sqlx::query(sql).execute(pool).await?;
    }
    Ok(())
}
