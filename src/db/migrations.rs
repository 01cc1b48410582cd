use rusqlite::Connection;

use crate::error::AppError;

/// Run the idempotent schema migration.
pub fn run(conn: &Connection) -> Result<(), AppError> {
    tracing::debug!("Running database migrations");

    conn.execute_batch(SCHEMA)?;

    tracing::info!("Database migrations complete");
    Ok(())
}

const SCHEMA: &str = r#"

-- ============================================================================
-- Profiles — one identity per email, shared across a user's blueprints
-- ============================================================================

CREATE TABLE IF NOT EXISTS profiles (
    id          TEXT PRIMARY KEY,
    email       TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_profiles_email ON profiles(email);

-- ============================================================================
-- Blueprints — one per survey submission
-- ============================================================================

-- systems is a JSON array of strings; opportunities is NULL until generation
-- succeeds, then a JSON array of exactly three opportunity objects.
CREATE TABLE IF NOT EXISTS blueprints (
    id             TEXT PRIMARY KEY,
    profile_id     TEXT NOT NULL REFERENCES profiles(id),
    initiative     TEXT NOT NULL,
    challenge      TEXT NOT NULL,
    systems        TEXT NOT NULL,
    value          TEXT NOT NULL,
    opportunities  TEXT,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_blueprints_profile ON blueprints(profile_id);

-- ============================================================================
-- AI call logs — one row per generation attempt
-- ============================================================================

CREATE TABLE IF NOT EXISTS ai_logs (
    id             TEXT PRIMARY KEY,
    blueprint_id   TEXT NOT NULL REFERENCES blueprints(id),
    prompt         TEXT NOT NULL,
    response       TEXT NOT NULL,
    model          TEXT NOT NULL,
    tokens_used    INTEGER NOT NULL DEFAULT 0,
    cost_estimate  REAL NOT NULL DEFAULT 0,
    duration_ms    INTEGER NOT NULL DEFAULT 0,
    created_at     TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_ai_logs_blueprint ON ai_logs(blueprint_id);

"#;
