use rusqlite::{params, Row};

use crate::db::models::{Blueprint, Opportunity};
use crate::db::DbPool;
use crate::error::AppError;

fn row_to_blueprint(row: &Row) -> rusqlite::Result<Blueprint> {
    let systems_json: String = row.get("systems")?;
    let opportunities_json: Option<String> = row.get("opportunities")?;

    let parse_err = |e: serde_json::Error| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    };

    Ok(Blueprint {
        id: row.get("id")?,
        profile_id: row.get("profile_id")?,
        initiative: row.get("initiative")?,
        challenge: row.get("challenge")?,
        systems: serde_json::from_str(&systems_json).map_err(parse_err)?,
        value: row.get("value")?,
        opportunities: opportunities_json
            .map(|j| serde_json::from_str(&j).map_err(parse_err))
            .transpose()?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub struct CreateBlueprintInput {
    pub profile_id: String,
    pub initiative: String,
    pub challenge: String,
    pub systems: Vec<String>,
    pub value: String,
}

/// Insert a new blueprint. `opportunities` always starts as NULL; it is
/// only populated by `attach_opportunities` after generation succeeds.
pub fn create(pool: &DbPool, input: CreateBlueprintInput) -> Result<Blueprint, AppError> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let systems_json = serde_json::to_string(&input.systems)?;

    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO blueprints
         (id, profile_id, initiative, challenge, systems, value, opportunities,
          created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, ?7, ?7)",
        params![
            id,
            input.profile_id,
            input.initiative,
            input.challenge,
            systems_json,
            input.value,
            now,
        ],
    )?;

    get_by_id(pool, &id)
}

/// Attach generated opportunities to a blueprint. Rejects anything other
/// than exactly three so a partial array can never be persisted.
pub fn attach_opportunities(
    pool: &DbPool,
    id: &str,
    opportunities: &[Opportunity],
) -> Result<(), AppError> {
    if opportunities.len() != 3 {
        return Err(AppError::Internal(format!(
            "expected exactly 3 opportunities, got {}",
            opportunities.len()
        )));
    }

    let json = serde_json::to_string(opportunities)?;
    let now = chrono::Utc::now().to_rfc3339();

    let conn = pool.get()?;
    let changed = conn.execute(
        "UPDATE blueprints SET opportunities = ?1, updated_at = ?2 WHERE id = ?3",
        params![json, now, id],
    )?;

    if changed == 0 {
        return Err(AppError::NotFound(format!("Blueprint {id}")));
    }
    Ok(())
}

pub fn get_by_id(pool: &DbPool, id: &str) -> Result<Blueprint, AppError> {
    let conn = pool.get()?;
    conn.query_row(
        "SELECT * FROM blueprints WHERE id = ?1",
        params![id],
        row_to_blueprint,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::NotFound(format!("Blueprint {id}")),
        other => AppError::Database(other),
    })
}
