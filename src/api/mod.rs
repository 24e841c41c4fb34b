//! HTTP API module - REST action surface for the character session
//!
//! Every mutating handler applies the state transition in memory first,
//! then fires off a best-effort save; a save failure is logged and never
//! rolls the in-memory state back.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::db::Database;
use crate::error::EngineError;
use crate::model::Condition;
use crate::rules::dice::RandomRoller;
use crate::rules::stats::{Ability, Skill};
use crate::rules::DamageType;
use crate::session::Session;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub session: Arc<RwLock<Session>>,
    pub character_id: String,
}

/// Build the API router around one loaded session
pub fn router(db: Arc<Database>, character_id: String, session: Arc<RwLock<Session>>) -> Router {
    let state = AppState {
        db,
        session,
        character_id,
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
        .route("/api/load", get(load))
        .route("/api/derived", get(derived))
        .route("/api/roll/check/{ability}", post(roll_check))
        .route("/api/roll/save/{ability}", post(roll_save))
        .route("/api/roll/skill/{skill}", post(roll_skill))
        .route("/api/attack/{name}", post(attack))
        .route("/api/reckless-attack", post(toggle_reckless))
        .route("/api/rage", post(toggle_rage))
        .route("/api/combat", post(toggle_combat))
        .route("/api/turn", post(start_turn))
        .route("/api/rest/short", post(short_rest))
        .route("/api/rest/long", post(long_rest))
        .route("/api/damage", post(take_damage))
        .route("/api/heal", post(heal))
        .route("/api/relentless-endurance", post(relentless_endurance))
        .route("/api/conditions", post(set_conditions))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = match &self {
            EngineError::ResourceExhausted(_) => StatusCode::CONFLICT,
            EngineError::PreconditionFailed(_) => StatusCode::PRECONDITION_FAILED,
            EngineError::MissingRuleData(_) => StatusCode::NOT_FOUND,
            EngineError::PersistenceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Fire-and-forget state save; the in-memory session stays authoritative
fn persist(app: &AppState, session: &Session) {
    let db = app.db.clone();
    let id = app.character_id.clone();
    let state = session.state().clone();
    tokio::spawn(async move {
        if let Err(e) = db.save_state(&id, &state).await {
            warn!("state save failed for {}: {}", id, e);
        }
    });
}

fn parse_ability(s: &str) -> Result<Ability, EngineError> {
    s.parse()
        .map_err(|_| EngineError::MissingRuleData(format!("unknown ability: {}", s)))
}

fn parse_skill(s: &str) -> Result<Skill, EngineError> {
    s.parse()
        .map_err(|_| EngineError::MissingRuleData(format!("unknown skill: {}", s)))
}

fn parse_damage_type(s: &str) -> Result<DamageType, EngineError> {
    s.parse()
        .map_err(|_| EngineError::MissingRuleData(format!("unknown damage type: {}", s)))
}

/// Root endpoint
async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "sheetd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Health check, including a database ping
async fn health_check(State(app): State<AppState>) -> impl IntoResponse {
    let db_ok = sqlx::query("SELECT 1").execute(app.db.pool()).await.is_ok();
    let status = if db_ok { "healthy" } else { "degraded" };
    Json(json!({
        "status": status,
        "database": if db_ok { "ok" } else { "error" },
    }))
}

/// Full load bundle: static data plus the live state document
async fn load(State(app): State<AppState>) -> impl IntoResponse {
    let session = app.session.read().await;
    Json(session.bundle())
}

/// Derived, read-only numbers: proficiency, AC, initiative, abilities, skills
async fn derived(State(app): State<AppState>) -> Result<Json<serde_json::Value>, EngineError> {
    let session = app.session.read().await;

    let mut abilities = serde_json::Map::new();
    for ability in Ability::all() {
        abilities.insert(
            ability.to_string(),
            serde_json::to_value(session.effective_ability(*ability)?)
                .map_err(|e| EngineError::MissingRuleData(e.to_string()))?,
        );
    }
    let mut skills = serde_json::Map::new();
    for skill in Skill::all() {
        skills.insert(
            skill.to_string(),
            serde_json::to_value(session.effective_skill(*skill)?)
                .map_err(|e| EngineError::MissingRuleData(e.to_string()))?,
        );
    }

    Ok(Json(json!({
        "proficiencyBonus": session.proficiency_bonus(),
        "armorClass": session.armor_class()?,
        "initiative": session.initiative()?,
        "abilities": abilities,
        "skills": skills,
    })))
}

async fn roll_check(
    State(app): State<AppState>,
    Path(ability): Path<String>,
) -> Result<Response, EngineError> {
    let ability = parse_ability(&ability)?;
    let session = app.session.read().await;
    let outcome = session.ability_check(ability, &mut RandomRoller)?;
    Ok(Json(outcome).into_response())
}

async fn roll_save(
    State(app): State<AppState>,
    Path(ability): Path<String>,
) -> Result<Response, EngineError> {
    let ability = parse_ability(&ability)?;
    let session = app.session.read().await;
    let outcome = session.saving_throw(ability, &mut RandomRoller)?;
    Ok(Json(outcome).into_response())
}

async fn roll_skill(
    State(app): State<AppState>,
    Path(skill): Path<String>,
) -> Result<Response, EngineError> {
    let skill = parse_skill(&skill)?;
    let session = app.session.read().await;
    let outcome = session.skill_check(skill, &mut RandomRoller)?;
    Ok(Json(outcome).into_response())
}

async fn attack(
    State(app): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, EngineError> {
    let mut session = app.session.write().await;
    let outcome = session.attack(&name, &mut RandomRoller)?;
    persist(&app, &session);
    Ok(Json(outcome).into_response())
}

async fn toggle_reckless(State(app): State<AppState>) -> Result<Response, EngineError> {
    let mut session = app.session.write().await;
    let outcome = session.toggle_reckless_attack()?;
    persist(&app, &session);
    Ok(Json(outcome).into_response())
}

async fn toggle_rage(State(app): State<AppState>) -> Result<Response, EngineError> {
    let mut session = app.session.write().await;
    let outcome = session.toggle_rage()?;
    persist(&app, &session);
    Ok(Json(outcome).into_response())
}

async fn toggle_combat(State(app): State<AppState>) -> Result<Response, EngineError> {
    let mut session = app.session.write().await;
    let outcome = session.toggle_combat(&mut RandomRoller)?;
    persist(&app, &session);
    Ok(Json(outcome).into_response())
}

async fn start_turn(State(app): State<AppState>) -> Result<Response, EngineError> {
    let mut session = app.session.write().await;
    let outcome = session.start_turn()?;
    persist(&app, &session);
    Ok(Json(outcome).into_response())
}

#[derive(Deserialize)]
struct ShortRestRequest {
    dice: u32,
}

async fn short_rest(
    State(app): State<AppState>,
    Json(req): Json<ShortRestRequest>,
) -> Result<Response, EngineError> {
    let mut session = app.session.write().await;
    let outcome = session.short_rest(req.dice, &mut RandomRoller)?;
    persist(&app, &session);
    Ok(Json(outcome).into_response())
}

async fn long_rest(State(app): State<AppState>) -> Result<Response, EngineError> {
    let mut session = app.session.write().await;
    let outcome = session.long_rest();
    persist(&app, &session);
    Ok(Json(outcome).into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DamageRequest {
    amount: i32,
    damage_type: String,
}

async fn take_damage(
    State(app): State<AppState>,
    Json(req): Json<DamageRequest>,
) -> Result<Response, EngineError> {
    let damage_type = parse_damage_type(&req.damage_type)?;
    let mut session = app.session.write().await;
    let outcome = session.take_damage(req.amount, damage_type);
    persist(&app, &session);
    Ok(Json(outcome).into_response())
}

#[derive(Deserialize)]
struct HealRequest {
    amount: i32,
}

async fn heal(
    State(app): State<AppState>,
    Json(req): Json<HealRequest>,
) -> Result<Response, EngineError> {
    let mut session = app.session.write().await;
    let outcome = session.heal(req.amount);
    persist(&app, &session);
    Ok(Json(outcome).into_response())
}

async fn relentless_endurance(State(app): State<AppState>) -> Result<Response, EngineError> {
    let mut session = app.session.write().await;
    let outcome = session.relentless_endurance()?;
    persist(&app, &session);
    Ok(Json(outcome).into_response())
}

#[derive(Deserialize)]
struct ConditionsRequest {
    conditions: BTreeSet<Condition>,
}

async fn set_conditions(
    State(app): State<AppState>,
    Json(req): Json<ConditionsRequest>,
) -> Result<Response, EngineError> {
    let mut session = app.session.write().await;
    let outcome = session.set_conditions(req.conditions);
    persist(&app, &session);
    Ok(Json(outcome).into_response())
}
