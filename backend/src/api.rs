use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{delete, get, post},
    Router,
};
use opening_trainer::catalog::DEFAULT_USER_ID;
use opening_trainer::notation::{color_name, parse_color};
use opening_trainer::session::Opponent;
use opening_trainer::{
    Color, LearnToggle, MoveOutcome, OpeningCatalog, OpeningId, OpeningTrieIndex, SessionId,
    SessionMode, TrainingSession, UploadOutcome, UserId,
};
use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

type SharedSession = Arc<Mutex<TrainingSession>>;

/// Shared service state
///
/// Lock order is index before catalog. Each session has its own mutex so a
/// slow engine reply only holds up the game it belongs to.
#[derive(Clone)]
pub struct AppState {
    index: Arc<RwLock<OpeningTrieIndex>>,
    catalog: Arc<RwLock<OpeningCatalog>>,
    sessions: Arc<Mutex<HashMap<SessionId, SharedSession>>>,
    opponent: Opponent,
    // Every session's rng is seeded from here, so one seed fixes a whole run
    seeds: Arc<Mutex<StdRng>>,
}

impl AppState {
    pub fn new(
        catalog: OpeningCatalog,
        index: OpeningTrieIndex,
        opponent: Opponent,
        seed: Option<u64>,
    ) -> Self {
        let seeds = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            index: Arc::new(RwLock::new(index)),
            catalog: Arc::new(RwLock::new(catalog)),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            opponent,
            seeds: Arc::new(Mutex::new(seeds)),
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }

    fn session(&self, id: SessionId) -> ApiResult<SharedSession> {
        self.sessions.lock().get(&id).cloned().ok_or_else(session_not_found)
    }

    fn end_session(&self, id: SessionId) -> bool {
        self.sessions.lock().remove(&id).is_some()
    }

    fn session_rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seeds.lock().random())
    }
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
}

#[derive(Deserialize)]
pub struct UserQuery {
    #[serde(default = "default_user")]
    pub user_id: UserId,
}

fn default_user() -> UserId {
    DEFAULT_USER_ID
}

#[derive(Serialize)]
pub struct OpeningSummary {
    pub id: OpeningId,
    pub name: String,
    pub color: String,
    pub is_learned: bool,
}

#[derive(Serialize)]
pub struct OpeningDetail {
    pub id: OpeningId,
    pub name: String,
    pub color: String,
    pub is_learned: bool,
    pub pgn: String,
}

#[derive(Serialize)]
pub struct ToggleResponse {
    pub status: String,
}

#[derive(Deserialize)]
pub struct UploadRequest {
    pub name: String,
    pub pgn_content: String,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub opening_id: Option<OpeningId>,
}

#[derive(Deserialize)]
pub struct GameStartRequest {
    pub user_id: UserId,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    "white".to_string()
}

#[derive(Serialize)]
pub struct GameStartResponse {
    pub session_id: SessionId,
    pub initial_fen: String,
    pub message: String,
    pub color: String,
    pub mode: SessionMode,
    /// Opponent's opening move when the player has Black
    pub opponent_move: Option<String>,
}

#[derive(Deserialize)]
pub struct MoveRequest {
    pub session_id: SessionId,
    pub move_san: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(read_root))
        .route("/users", get(list_users).post(create_user))
        .route("/openings", get(list_openings))
        .route("/openings/{id}", get(opening_detail))
        .route("/openings/{id}/toggle_learn", post(toggle_learn))
        .route("/admin/upload", post(upload_opening))
        .route("/game/start", post(start_game))
        .route("/game/move", post(play_move))
        .route("/game/{session_id}", delete(end_game))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn read_root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Chess Opening Trainer API is running.".to_string(),
    })
}

async fn list_users(State(state): State<AppState>) -> Json<Vec<String>> {
    let catalog = state.catalog.read();
    Json(
        catalog
            .users()
            .map(|user| format!("{}: {}", user.id, user.name))
            .collect(),
    )
}

async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("User name is required".to_string()));
    }
    let id = state.catalog.write().add_user(name);
    info!("[API] Created user {} '{}'", id, name);
    Ok(Json(UserResponse {
        id,
        name: name.to_string(),
    }))
}

async fn list_openings(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Json<Vec<OpeningSummary>> {
    let catalog = state.catalog.read();
    Json(
        catalog
            .openings()
            .map(|op| OpeningSummary {
                id: op.id,
                name: op.name.clone(),
                color: color_name(op.color).to_string(),
                is_learned: catalog.is_learned(query.user_id, op.id),
            })
            .collect(),
    )
}

async fn opening_detail(
    State(state): State<AppState>,
    Path(id): Path<OpeningId>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<OpeningDetail>> {
    let catalog = state.catalog.read();
    let op = catalog
        .opening(id)
        .ok_or_else(|| ApiError::NotFound("Opening not found".to_string()))?;

    Ok(Json(OpeningDetail {
        id: op.id,
        name: op.name.clone(),
        color: color_name(op.color).to_string(),
        is_learned: catalog.is_learned(query.user_id, op.id),
        pgn: op.pgn.clone(),
    }))
}

async fn toggle_learn(
    State(state): State<AppState>,
    Path(id): Path<OpeningId>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<ToggleResponse>> {
    let toggled = state.catalog.write().toggle_learned(query.user_id, id)?;
    let status = match toggled {
        LearnToggle::Learned => "learned",
        LearnToggle::Unlearned => "unlearned",
    };
    info!("[API] User {} {} opening {}", query.user_id, status, id);
    Ok(Json(ToggleResponse {
        status: status.to_string(),
    }))
}

async fn upload_opening(
    State(state): State<AppState>,
    Json(payload): Json<UploadRequest>,
) -> ApiResult<Json<UploadResponse>> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Opening name is required".to_string()));
    }

    let outcome = {
        let mut index = state.index.write();
        let mut catalog = state.catalog.write();
        catalog.add_opening(&mut index, name, &payload.pgn_content)?
    };

    let message = match outcome {
        UploadOutcome::Added(_) => format!("Successfully uploaded '{}'.", name),
        UploadOutcome::AlreadyExists(_) => format!("Opening '{}' already exists.", name),
    };
    Ok(Json(UploadResponse {
        message,
        opening_id: Some(outcome.opening_id()),
    }))
}

async fn start_game(
    State(state): State<AppState>,
    Json(payload): Json<GameStartRequest>,
) -> ApiResult<Json<GameStartResponse>> {
    let color: Color = parse_color(&payload.color)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown colour '{}'", payload.color)))?;
    let learned = state.catalog.read().learned_for_color(payload.user_id, color)?;

    let id = SessionId::new();
    let rng = state.session_rng();
    let opponent = state.opponent.clone();
    let index = state.index.clone();

    // A Black session asks the opponent for its first move, which may block on the engine
    let session = tokio::task::spawn_blocking(move || {
        let (mut session, step) = {
            let index = index.read();
            TrainingSession::begin(id, &index, learned, color, opponent, rng)
        };
        let _ = session.finish_turn(step);
        session
    })
    .await?;

    let response = GameStartResponse {
        session_id: id,
        initial_fen: session.fen(),
        message: format!("Game started as {}.", title_case(color_name(color))),
        color: color_name(color).to_string(),
        mode: session.mode(),
        opponent_move: session.opening_reply().map(str::to_string),
    };

    state
        .sessions
        .lock()
        .insert(id, Arc::new(Mutex::new(session)));
    info!("[API] Session {} started for user {}", id, payload.user_id);

    Ok(Json(response))
}

async fn play_move(
    State(state): State<AppState>,
    Json(payload): Json<MoveRequest>,
) -> ApiResult<Json<MoveOutcome>> {
    let session = state.session(payload.session_id)?;
    let index = state.index.clone();

    let outcome = tokio::task::spawn_blocking(move || {
        let mut session = session.lock();
        // The index lock is released before the engine is consulted, so an
        // upload waiting for the write lock never queues behind a search
        let step = {
            let index = index.read();
            session.begin_turn(&index, &payload.move_san)
        };
        session.finish_turn(step)
    })
    .await?;

    if outcome.game_over {
        state.end_session(payload.session_id);
        info!("[API] Session {} finished and released", payload.session_id);
    }

    Ok(Json(outcome))
}

async fn end_game(
    State(state): State<AppState>,
    Path(session_id): Path<SessionId>,
) -> ApiResult<Json<MessageResponse>> {
    if !state.end_session(session_id) {
        return Err(session_not_found());
    }
    info!("[API] Session {} abandoned", session_id);
    Ok(Json(MessageResponse {
        message: format!("Session {} ended.", session_id),
    }))
}

fn session_not_found() -> ApiError {
    ApiError::NotFound("Active game session not found (restart required).".to_string())
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("white"), "White");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_move_request_deserialization() {
        let id = SessionId::new();
        let json = format!(r#"{{"session_id": "{}", "move_san": "e4"}}"#, id);
        let request: MoveRequest = serde_json::from_str(&json).expect("Should deserialize");
        assert_eq!(request.session_id, id);
        assert_eq!(request.move_san, "e4");
    }

    #[test]
    fn test_start_request_defaults_to_white() {
        let request: GameStartRequest =
            serde_json::from_str(r#"{"user_id": 1}"#).expect("Should deserialize");
        assert_eq!(request.color, "white");
    }

    #[test]
    fn test_seeded_state_gives_repeatable_session_rngs() {
        let a = AppState::new(
            OpeningCatalog::new(),
            OpeningTrieIndex::new(),
            Opponent::offline(),
            Some(7),
        );
        let b = AppState::new(
            OpeningCatalog::new(),
            OpeningTrieIndex::new(),
            Opponent::offline(),
            Some(7),
        );
        let x: u64 = a.session_rng().random();
        let y: u64 = b.session_rng().random();
        assert_eq!(x, y);
        assert_eq!(a.session_count(), 0);
    }
}
