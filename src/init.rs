//! Database initialization module
//!
//! Provides one-time database setup functionality for the sheetd_init tool.

use std::path::Path;

use anyhow::{bail, Result};
use tracing::info;

use crate::db::Database;
use crate::model::{CharacterData, SessionState};

/// Initialize a new character database
///
/// # Arguments
/// * `path` - Path to the SQLite database file (must not exist)
/// * `data` - Static character data: sheet, class, race and background
///
/// Returns the generated character id.
///
/// # Errors
/// * Database file already exists
/// * Database creation fails
pub async fn init_database(path: &Path, data: &CharacterData) -> Result<String> {
    // Fail if database already exists
    if path.exists() {
        bail!(
            "Database file already exists: {}. Remove it first or use a different path.",
            path.display()
        );
    }

    info!("Creating new database at {}", path.display());

    // Create the database (runs migrations)
    let db = Database::new(path.to_str()).await?;

    let id = uuid::Uuid::new_v4().to_string();
    let state = SessionState::fresh(&data.character);
    db.insert_character(&id, data, &state).await?;
    info!("Created character '{}' ({})", data.character.name, id);

    info!("Database initialization complete");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::fixtures::sample_data;
    use tempfile::TempDir;

    fn sample_character() -> CharacterData {
        let (character, cls, race, background) = sample_data();
        CharacterData {
            character,
            cls,
            race,
            background,
        }
    }

    #[tokio::test]
    async fn test_init_database_creates_new() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let id = init_database(&db_path, &sample_character()).await.unwrap();

        // Verify file was created
        assert!(db_path.exists());

        // Verify the character and a fresh state document were stored
        let db = Database::new(db_path.to_str()).await.unwrap();
        let data = db.load_character(&id).await.unwrap().unwrap();
        assert_eq!(data.character.name, "Gruk");
        let state = db.load_state(&id).await.unwrap().unwrap();
        assert_eq!(state.hit_points, 45);
    }

    #[tokio::test]
    async fn test_init_database_fails_if_exists() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Create first
        init_database(&db_path, &sample_character()).await.unwrap();

        // Try again - should fail
        let result = init_database(&db_path, &sample_character()).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("already exists"));
    }
}
