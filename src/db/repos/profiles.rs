use rusqlite::{params, Row};

use crate::db::models::Profile;
use crate::db::DbPool;
use crate::error::AppError;

fn row_to_profile(row: &Row) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: row.get("id")?,
        email: row.get("email")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Resolve a profile id for an email: reuse the existing profile or create
/// one. Single upsert statement, so concurrent submissions from the same
/// email cannot produce duplicate profiles.
pub fn resolve_by_email(pool: &DbPool, email: &str) -> Result<Profile, AppError> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO profiles (id, email, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?3)
         ON CONFLICT(email) DO UPDATE SET updated_at = ?3",
        params![id, email, now],
    )?;

    conn.query_row(
        "SELECT * FROM profiles WHERE email = ?1",
        params![email],
        row_to_profile,
    )
    .map_err(AppError::Database)
}

pub fn get_by_id(pool: &DbPool, id: &str) -> Result<Profile, AppError> {
    let conn = pool.get()?;
    conn.query_row(
        "SELECT * FROM profiles WHERE id = ?1",
        params![id],
        row_to_profile,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::NotFound(format!("Profile {id}")),
        other => AppError::Database(other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;

    #[test]
    fn resolve_creates_then_reuses() {
        let pool = init_test_db().unwrap();

        let first = resolve_by_email(&pool, "a@b.com").unwrap();
        let second = resolve_by_email(&pool, "a@b.com").unwrap();
        assert_eq!(first.id, second.id);

        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM profiles", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn distinct_emails_get_distinct_profiles() {
        let pool = init_test_db().unwrap();

        let a = resolve_by_email(&pool, "a@b.com").unwrap();
        let b = resolve_by_email(&pool, "c@d.com").unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn get_by_id_maps_missing_to_not_found() {
        let pool = init_test_db().unwrap();
        let err = get_by_id(&pool, "nope").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
