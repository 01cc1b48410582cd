use rusqlite::{params, Row};

use crate::db::models::{AiLog, CreateAiLogInput};
use crate::db::DbPool;
use crate::error::AppError;

fn row_to_log(row: &Row) -> rusqlite::Result<AiLog> {
    Ok(AiLog {
        id: row.get("id")?,
        blueprint_id: row.get("blueprint_id")?,
        prompt: row.get("prompt")?,
        response: row.get("response")?,
        model: row.get("model")?,
        tokens_used: row.get("tokens_used")?,
        cost_estimate: row.get("cost_estimate")?,
        duration_ms: row.get("duration_ms")?,
        created_at: row.get("created_at")?,
    })
}

pub fn insert(pool: &DbPool, input: CreateAiLogInput) -> Result<AiLog, AppError> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO ai_logs
         (id, blueprint_id, prompt, response, model, tokens_used,
          cost_estimate, duration_ms, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            id,
            input.blueprint_id,
            input.prompt,
            input.response,
            input.model,
            input.tokens_used,
            input.cost_estimate,
            input.duration_ms,
            now,
        ],
    )?;

    conn.query_row("SELECT * FROM ai_logs WHERE id = ?1", params![id], row_to_log)
        .map_err(AppError::Database)
}

pub fn get_for_blueprint(pool: &DbPool, blueprint_id: &str) -> Result<Vec<AiLog>, AppError> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(
        "SELECT * FROM ai_logs WHERE blueprint_id = ?1 ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map(params![blueprint_id], row_to_log)?;
    Ok(rows.filter_map(|r| r.ok()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;
    use crate::db::repos::{blueprints, profiles};

    #[test]
    fn insert_and_fetch_log() {
        let pool = init_test_db().unwrap();
        let profile = profiles::resolve_by_email(&pool, "a@b.com").unwrap();
        let blueprint = blueprints::create(
            &pool,
            blueprints::CreateBlueprintInput {
                profile_id: profile.id,
                initiative: "Test Initiative".into(),
                challenge: "A challenge description long enough".into(),
                systems: vec!["CRM".into()],
                value: "Save time weekly".into(),
            },
        )
        .unwrap();

        let log = insert(
            &pool,
            CreateAiLogInput {
                blueprint_id: blueprint.id.clone(),
                prompt: "system + user".into(),
                response: "{\"opportunities\":[]}".into(),
                model: "gpt-4o".into(),
                tokens_used: 1234,
                cost_estimate: 0.02,
                duration_ms: 1800,
            },
        )
        .unwrap();
        assert_eq!(log.tokens_used, 1234);

        let logs = get_for_blueprint(&pool, &blueprint.id).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].model, "gpt-4o");
    }
}
