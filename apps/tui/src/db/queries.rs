use pseudodojo_core::{Choice, PreferenceKey, Remembered};
use sqlx::{query, query_as, SqlitePool};
use std::collections::HashMap;

use crate::db::models::PreferenceRecord;

/// Stores one value, replacing any previous one
pub async fn set_preference(pool: &SqlitePool, key: &str, value: &str) -> Result<(), sqlx::Error> {
    query(
        "INSERT INTO preference (key, value) VALUES (?, ?) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_preferences(pool: &SqlitePool) -> Result<Vec<PreferenceRecord>, sqlx::Error> {
    query_as::<_, PreferenceRecord>("SELECT key, value FROM preference ORDER BY key")
        .fetch_all(pool)
        .await
}

/// The remembered dropdown values, missing or empty entries left unset
pub async fn load_remembered(pool: &SqlitePool) -> Result<Remembered, sqlx::Error> {
    let mut stored: HashMap<String, String> = get_preferences(pool)
        .await?
        .into_iter()
        .map(|record| (record.key, record.value))
        .collect();

    Ok(Remembered::load(|key| stored.remove(key)))
}

/// Remembers the functional, accuracy and format of `choice`
pub async fn remember(pool: &SqlitePool, choice: &Choice) -> Result<(), sqlx::Error> {
    for key in PreferenceKey::ALL {
        set_preference(pool, key.storage_key(), key.value(choice)).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::setup_database;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> Result<SqlitePool, sqlx::Error> {
        // Use an in-memory database for testing
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        setup_database(&pool).await?;
        Ok(pool)
    }

    #[tokio::test]
    async fn test_set_preference_replaces_value() -> Result<(), Box<dyn std::error::Error>> {
        let pool = setup_test_db().await?;

        assert!(get_preferences(&pool).await?.is_empty());
        set_preference(&pool, "selectedXCF", "PBE").await?;
        set_preference(&pool, "selectedXCF", "PBEsol").await?;
        assert_eq!(
            get_preferences(&pool).await?,
            vec![PreferenceRecord {
                key: "selectedXCF".to_string(),
                value: "PBEsol".to_string(),
            }]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_remember_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        let pool = setup_test_db().await?;

        assert_eq!(load_remembered(&pool).await?, Remembered::default());

        let choice = Choice::new("nc-sr-v0.4", "LDA", "stringent", "upf");
        remember(&pool, &choice).await?;
        assert_eq!(load_remembered(&pool).await?, Remembered::from_choice(&choice));

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_values_are_not_remembered() -> Result<(), Box<dyn std::error::Error>> {
        let pool = setup_test_db().await?;

        set_preference(&pool, "selectedFMT", "").await?;
        set_preference(&pool, "selectedACC", "standard").await?;
        let remembered = load_remembered(&pool).await?;
        assert_eq!(remembered.format, None);
        assert_eq!(remembered.accuracy.as_deref(), Some("standard"));

        Ok(())
    }
}
