//! Common test utilities - sample character data and an in-process app

use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower::ServiceExt;

use sheetd::db::Database;
use sheetd::model::{CharacterData, SessionState};
use sheetd::session::Session;

/// A level-5 half-orc barbarian, the standard fixture for integration tests
pub fn sample_character() -> CharacterData {
    serde_json::from_value(json!({
        "character": {
            "name": "Gruk",
            "level": 5,
            "maxHitPoints": 45,
            "stats": {
                "STR": { "base": 16 },
                "DEX": { "base": 14 },
                "CON": { "base": 14 },
                "INT": { "base": 8 },
                "WIS": { "base": 10 },
                "CHA": { "base": 12 }
            },
            "attacks": [
                {
                    "name": "Greataxe",
                    "toHitStat": "STR",
                    "weaponTypes": ["martial"],
                    "damageDice": "1d12",
                    "damageType": "slashing",
                    "melee": true
                },
                {
                    "name": "Javelin",
                    "toHitStat": "STR",
                    "weaponTypes": ["simple"],
                    "damageDice": "1d6",
                    "damageType": "piercing",
                    "melee": false
                }
            ]
        },
        "cls": {
            "name": "Barbarian",
            "hitDie": 12,
            "proficiency": {
                "saves": ["STR", "CON"],
                "skills": ["athletics", "intimidation"],
                "weapons": ["simple", "martial"]
            },
            "rage": {
                "damageBonusByLevel": [
                    { "min": 1, "max": 8, "bonus": 2 },
                    { "min": 9, "max": 15, "bonus": 3 },
                    { "min": 16, "max": 20, "bonus": 4 }
                ],
                "resistances": ["bludgeoning", "piercing", "slashing"],
                "statAdvantages": ["STR"],
                "saveAdvantages": ["STR"]
            },
            "dangerSense": { "saveAdvantages": ["DEX"] }
        },
        "race": {
            "name": "Half-Orc",
            "abilityBonuses": { "STR": 2, "CON": 1 },
            "features": [{ "id": "savage_attacks", "name": "Savage Attacks" }]
        },
        "background": {
            "name": "Soldier",
            "proficiency": { "skills": ["athletics"] }
        }
    }))
    .expect("fixture data")
}

/// Fresh session over the sample character
pub fn sample_session() -> Session {
    let data = sample_character();
    let state = SessionState::fresh(&data.character);
    Session::from_parts(data, state)
}

/// In-process app over an in-memory database with the sample character loaded
pub struct TestApp {
    pub router: Router,
    pub db: Arc<Database>,
    pub character_id: String,
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        let db = Arc::new(Database::new(None).await?);
        let data = sample_character();
        let character_id = "char-1".to_string();
        let state = SessionState::fresh(&data.character);
        db.insert_character(&character_id, &data, &state).await?;

        let session = Session::from_parts(data, state);
        let router = sheetd::api::router(
            db.clone(),
            character_id.clone(),
            Arc::new(RwLock::new(session)),
        );

        Ok(Self {
            router,
            db,
            character_id,
        })
    }

    /// GET a path and return status plus parsed JSON body
    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(path)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        read_json(response).await
    }

    /// POST a JSON body (or empty) and return status plus parsed JSON body
    pub async fn post(&self, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let body = match body {
            Some(v) => Body::from(v.to_string()),
            None => Body::empty(),
        };
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(path)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(body)
                    .expect("request"),
            )
            .await
            .expect("response");
        read_json(response).await
    }
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}
