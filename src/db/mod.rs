//! Database module - SQLite persistence for character bundles and state
//!
//! Static character data and the session-state document are stored as JSON
//! text columns. State saves are whole-document, last write wins; the
//! in-memory session is the authority and a failed save never rolls it back.

use anyhow::{anyhow, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

use crate::model::{CharacterData, SessionState, SheetBundle};

/// Database handle wrapping the SQLite connection pool
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection
    /// If path is None, uses in-memory database (for testing)
    pub async fn new(path: Option<&str>) -> Result<Self> {
        let conn_str = match path {
            Some(p) => format!("sqlite:{}?mode=rwc", p),
            None => "sqlite::memory:".to_string(),
        };

        // Shared cache so every pooled connection sees the same in-memory db
        let options = SqliteConnectOptions::from_str(&conn_str)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .foreign_keys(true)
            .shared_cache(path.is_none());

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS characters (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                sheet TEXT NOT NULL,
                class TEXT NOT NULL,
                race TEXT NOT NULL,
                background TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS session_state (
                character_id TEXT PRIMARY KEY REFERENCES characters(id),
                state TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a character's static data and a pristine state document
    pub async fn insert_character(
        &self,
        id: &str,
        data: &CharacterData,
        state: &SessionState,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO characters (id, name, sheet, class, race, background)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&data.character.name)
        .bind(serde_json::to_string(&data.character)?)
        .bind(serde_json::to_string(&data.cls)?)
        .bind(serde_json::to_string(&data.race)?)
        .bind(serde_json::to_string(&data.background)?)
        .execute(&self.pool)
        .await?;

        self.save_state(id, state).await
    }

    /// Load a character's static data
    pub async fn load_character(&self, id: &str) -> Result<Option<CharacterData>> {
        let row: Option<(String, String, String, String)> = sqlx::query_as(
            "SELECT sheet, class, race, background FROM characters WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some((sheet, class, race, background)) = row else {
            return Ok(None);
        };

        Ok(Some(CharacterData {
            character: serde_json::from_str(&sheet)?,
            cls: serde_json::from_str(&class)?,
            race: serde_json::from_str(&race)?,
            background: serde_json::from_str(&background)?,
        }))
    }

    /// Load the persisted session-state document
    pub async fn load_state(&self, character_id: &str) -> Result<Option<SessionState>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT state FROM session_state WHERE character_id = ?")
                .bind(character_id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((state,)) => Ok(Some(serde_json::from_str(&state)?)),
            None => Ok(None),
        }
    }

    /// Persist the whole session-state document (last write wins)
    pub async fn save_state(&self, character_id: &str, state: &SessionState) -> Result<()> {
        let doc = serde_json::to_string(state)?;
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO session_state (character_id, state, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(character_id) DO UPDATE SET state = excluded.state,
                 updated_at = excluded.updated_at",
        )
        .bind(character_id)
        .bind(&doc)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Id of the first stored character, if any
    pub async fn first_character_id(&self) -> Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT id FROM characters ORDER BY created_at, id LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(id,)| id))
    }

    /// Load the full bundle for a character: static data plus state.
    ///
    /// A character without a stored state document gets a fresh one,
    /// persisted on the spot.
    pub async fn load_bundle(&self, character_id: &str) -> Result<SheetBundle> {
        let data = self
            .load_character(character_id)
            .await?
            .ok_or_else(|| anyhow!("character not found: {}", character_id))?;

        let state = match self.load_state(character_id).await? {
            Some(state) => state,
            None => {
                let state = SessionState::fresh(&data.character);
                self.save_state(character_id, &state).await?;
                state
            }
        };

        Ok(SheetBundle {
            character: data.character,
            state,
            cls: data.cls,
            race: data.race,
            background: data.background,
        })
    }
}
