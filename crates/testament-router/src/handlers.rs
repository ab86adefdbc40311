//! HTTP request handlers for the testament service.
//!
//! Every command resolves the caller from its bearer token, takes the
//! registry lock for exactly one registry call, and releases it before the
//! response is built.

use crate::identity::{BearerIdentity, IdentityError, IdentityTokens};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router as AxumRouter,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use testament_domain::traits::IdentityProvider;
use testament_domain::{
    Address, Clock, RecordedEvent, Testament, TestamentError, TestamentId, TestamentRegistry,
};
use testament_store::SqliteStore;

/// Registry type hosted by the service
pub type ServiceRegistry = TestamentRegistry<SqliteStore, Box<dyn Clock + Send>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The registry; one lock serializes all commands and queries
    pub registry: Arc<Mutex<ServiceRegistry>>,
    /// Identity token validation
    pub tokens: Arc<IdentityTokens>,
}

impl AppState {
    /// Wrap a registry and token authority
    pub fn new(registry: ServiceRegistry, tokens: IdentityTokens) -> Self {
        Self {
            registry: Arc::new(Mutex::new(registry)),
            tokens: Arc::new(tokens),
        }
    }

    fn registry(&self) -> Result<MutexGuard<'_, ServiceRegistry>, AppError> {
        self.registry
            .lock()
            .map_err(|_| AppError::InternalError("Registry lock poisoned".to_string()))
    }

    fn caller(&self, headers: &HeaderMap) -> Result<Address, AppError> {
        Ok(BearerIdentity::new(&self.tokens, headers).caller()?)
    }
}

/// Testament creation request
#[derive(Debug, Deserialize)]
pub struct CreateTestamentRequest {
    /// Heir address
    pub heir: String,
    /// Notary address
    pub notary: String,
    /// Content reference of the document
    pub document_hash: String,
    /// Waiting period, counted from creation
    pub unlock_delay_secs: u64,
}

/// Testament creation response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTestamentResponse {
    /// New testament id
    pub id: String,
    /// Earliest unlock time
    pub unlock_time: u64,
}

/// Heir or notary reassignment request
#[derive(Debug, Deserialize)]
pub struct RoleUpdateRequest {
    /// New address for the role
    pub address: String,
}

/// Full view of a testament
#[derive(Debug, Serialize, Deserialize)]
pub struct TestamentView {
    /// Testament id
    pub id: String,
    /// Owner (testator)
    pub owner: String,
    /// Current heir
    pub heir: String,
    /// Current notary
    pub notary: String,
    /// Document reference
    pub document_hash: String,
    /// Whether death has been confirmed
    pub is_deceased: bool,
    /// Creation time
    pub created_at: u64,
    /// Configured waiting period
    pub unlock_delay_secs: u64,
    /// Earliest unlock time
    pub unlock_time: u64,
    /// When death was confirmed
    pub death_confirmed_at: Option<u64>,
    /// When the heir first unlocked
    pub unlocked_at: Option<u64>,
    /// Lifecycle stage
    pub lifecycle: String,
}

impl From<Testament> for TestamentView {
    fn from(t: Testament) -> Self {
        Self {
            id: t.id.to_string(),
            owner: t.owner.to_string(),
            heir: t.heir.to_string(),
            notary: t.notary.to_string(),
            lifecycle: t.lifecycle().as_str().to_string(),
            document_hash: t.document_hash,
            is_deceased: t.is_deceased,
            created_at: t.created_at,
            unlock_delay_secs: t.unlock_delay_secs,
            unlock_time: t.unlock_time,
            death_confirmed_at: t.death_confirmed_at,
            unlocked_at: t.unlocked_at,
        }
    }
}

/// Unlock response
#[derive(Debug, Serialize, Deserialize)]
pub struct UnlockResponse {
    /// Released document reference
    pub document_hash: String,
}

/// Roles held by the caller
#[derive(Debug, Serialize, Deserialize)]
pub struct RolesResponse {
    /// Caller address
    pub address: String,
    /// Role names
    pub roles: Vec<String>,
}

/// One entry of a testament's event log
#[derive(Debug, Serialize, Deserialize)]
pub struct EventView {
    /// Position in the log
    pub sequence: u64,
    /// Time recorded
    pub recorded_at: u64,
    /// Event name
    pub kind: String,
    /// Event fields
    pub data: Value,
}

impl From<RecordedEvent> for EventView {
    fn from(recorded: RecordedEvent) -> Self {
        Self {
            sequence: recorded.sequence,
            recorded_at: recorded.recorded_at,
            kind: recorded.event.name().to_string(),
            data: testament_store::payload(&recorded.event),
        }
    }
}

/// Event log query parameters
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Only return events with a greater sequence number
    #[serde(default)]
    pub after: u64,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Number of stored testaments
    pub testaments: usize,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error kind
    pub error: String,
    /// Error message
    pub message: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Registry rejected the command
    Testament(TestamentError),
    /// Caller could not be identified
    Identity(IdentityError),
    /// Internal server error
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            AppError::Testament(e) => {
                let status = match e {
                    TestamentError::Unauthorized { .. } => StatusCode::FORBIDDEN,
                    TestamentError::InvalidState { .. } => StatusCode::CONFLICT,
                    TestamentError::InvalidRole { .. } | TestamentError::InvalidArgument(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    TestamentError::NotFound(_) => StatusCode::NOT_FOUND,
                    TestamentError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.kind().to_string(), e.to_string())
            }
            AppError::Identity(e) => {
                (StatusCode::UNAUTHORIZED, "unauthenticated".to_string(), e.to_string())
            }
            AppError::InternalError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal".to_string(), msg)
            }
        };

        let body = Json(ErrorResponse {
            error: kind,
            message,
        });
        (status, body).into_response()
    }
}

impl From<TestamentError> for AppError {
    fn from(e: TestamentError) -> Self {
        AppError::Testament(e)
    }
}

impl From<IdentityError> for AppError {
    fn from(e: IdentityError) -> Self {
        AppError::Identity(e)
    }
}

fn parse_id(id: &str) -> Result<TestamentId, AppError> {
    Ok(TestamentId::from_string(id)?)
}

/// POST /testaments - Create a testament owned by the caller
async fn create_testament(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateTestamentRequest>,
) -> Result<(StatusCode, Json<CreateTestamentResponse>), AppError> {
    let caller = state.caller(&headers)?;
    let heir = Address::parse(&request.heir)?;
    let notary = Address::parse(&request.notary)?;

    let mut registry = state.registry()?;
    let id = registry.create(
        heir,
        notary,
        request.document_hash,
        request.unlock_delay_secs,
        caller,
    )?;
    let unlock_time = registry.unlock_time(id)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTestamentResponse {
            id: id.to_string(),
            unlock_time,
        }),
    ))
}

/// GET /testaments - List testament ids
async fn list_testaments(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    let ids = state.registry()?.list()?;
    Ok(Json(ids.iter().map(ToString::to_string).collect()))
}

/// GET /testaments/:id - Read a testament
async fn get_testament(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TestamentView>, AppError> {
    let id = parse_id(&id)?;
    let testament = state.registry()?.testament(id)?;
    Ok(Json(testament.into()))
}

/// POST /testaments/:id/confirm-death - Notary attests death
async fn confirm_death(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<TestamentView>, AppError> {
    let id = parse_id(&id)?;
    let caller = state.caller(&headers)?;

    let mut registry = state.registry()?;
    registry.confirm_death(id, caller)?;
    Ok(Json(registry.testament(id)?.into()))
}

/// POST /testaments/:id/unlock - Heir retrieves the document reference
async fn unlock_testament(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<UnlockResponse>, AppError> {
    let id = parse_id(&id)?;
    let caller = state.caller(&headers)?;

    let document_hash = state.registry()?.unlock_testament(id, caller)?;
    Ok(Json(UnlockResponse { document_hash }))
}

/// PUT /testaments/:id/heir - Owner reassigns the heir
async fn update_heir(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<RoleUpdateRequest>,
) -> Result<Json<TestamentView>, AppError> {
    let id = parse_id(&id)?;
    let caller = state.caller(&headers)?;
    let new_heir = Address::parse(&request.address)?;

    let mut registry = state.registry()?;
    registry.update_heir(id, new_heir, caller)?;
    Ok(Json(registry.testament(id)?.into()))
}

/// PUT /testaments/:id/notary - Owner reassigns the notary
async fn update_notary(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<RoleUpdateRequest>,
) -> Result<Json<TestamentView>, AppError> {
    let id = parse_id(&id)?;
    let caller = state.caller(&headers)?;
    let new_notary = Address::parse(&request.address)?;

    let mut registry = state.registry()?;
    registry.update_notary(id, new_notary, caller)?;
    Ok(Json(registry.testament(id)?.into()))
}

/// GET /testaments/:id/roles - Roles the caller holds
async fn caller_roles(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<RolesResponse>, AppError> {
    let id = parse_id(&id)?;
    let caller = state.caller(&headers)?;

    let roles = state.registry()?.roles_of(id, &caller)?;
    Ok(Json(RolesResponse {
        address: caller.to_string(),
        roles: roles.iter().map(|r| r.as_str().to_string()).collect(),
    }))
}

/// GET /testaments/:id/events - Event log, optionally after a sequence
async fn list_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<EventView>>, AppError> {
    let id = parse_id(&id)?;
    let events = state.registry()?.events_after(id, query.after)?;
    Ok(Json(events.map(EventView::from).collect()))
}

/// GET /health - Health check
async fn health_check(State(state): State<AppState>) -> Result<Json<HealthCheckResponse>, AppError> {
    let testaments = state.registry()?.list()?.len();
    Ok(Json(HealthCheckResponse {
        status: "healthy".to_string(),
        testaments,
    }))
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/health", get(health_check))
        .route("/testaments", post(create_testament).get(list_testaments))
        .route("/testaments/:id", get(get_testament))
        .route("/testaments/:id/confirm-death", post(confirm_death))
        .route("/testaments/:id/unlock", post(unlock_testament))
        .route("/testaments/:id/heir", put(update_heir))
        .route("/testaments/:id/notary", put(update_notary))
        .route("/testaments/:id/roles", get(caller_roles))
        .route("/testaments/:id/events", get(list_events))
        .with_state(state)
}
