//! Axum REST API handlers.
//!
//! Every successful gateway call is returned as `{ "data": ... }`, the
//! envelope the admin UI's data provider expects.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::AdminError;
use crate::models::{
    self, AdminUpdate, DataResponse, DelayUpdate, DepositRequest, FeeUpdate, NewReport, NewUser,
    Report, ReportUpdate, Settings, User, UserListing,
};
use crate::reports::ReportGateway;
use crate::settings::SettingsGateway;
use crate::units;
use crate::users::UserGateway;

#[derive(Clone)]
pub struct ApiState {
    pub reports: ReportGateway,
    pub users: UserGateway,
    pub settings: SettingsGateway,
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/reports", get(list_reports).post(create_report))
        .route(
            "/reports/:key",
            get(get_report).put(update_report).delete(remove_report),
        )
        .route("/users", get(list_users).post(create_user))
        .route("/users/:address", get(get_user))
        .route("/settings", get(get_settings))
        .route("/settings/delay", put(update_delay))
        .route("/settings/fee", put(update_fee))
        .route("/settings/admin", put(update_admin))
        .route("/settings/deposit", post(deposit))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdminError::NotFound(_) => StatusCode::NOT_FOUND,
            AdminError::Rejected(_) => StatusCode::FORBIDDEN,
            AdminError::Chain(_) => StatusCode::CONFLICT,
            AdminError::Transport(_) => StatusCode::BAD_GATEWAY,
            AdminError::Config(_) | AdminError::Input(_) => StatusCode::BAD_REQUEST,
        };
        if status.is_server_error() {
            tracing::error!("Gateway failure: {}", self);
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
                kind: self.kind(),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<Json<DataResponse<T>>, AdminError>;

impl From<JsonRejection> for AdminError {
    fn from(rejection: JsonRejection) -> Self {
        AdminError::Input(rejection.body_text())
    }
}

/// `Json` body extractor whose rejections use the `{ error, kind }` envelope.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AdminError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(value))
    }
}

/// Wei amounts travel as decimal strings.
#[derive(Serialize)]
pub struct Wei(#[serde(serialize_with = "units::serialize_decimal")] pub alloy_primitives::U256);

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /reports`
pub async fn list_reports(State(state): State<Arc<ApiState>>) -> ApiResult<Vec<Report>> {
    Ok(Json(state.reports.list_reports().await?))
}

/// `GET /reports/:key`
pub async fn get_report(
    State(state): State<Arc<ApiState>>,
    Path(key): Path<String>,
) -> ApiResult<Report> {
    let key = models::parse_key(&key)?;
    Ok(Json(state.reports.get_report(key).await?))
}

/// `POST /reports`
pub async fn create_report(
    State(state): State<Arc<ApiState>>,
    JsonBody(body): JsonBody<NewReport>,
) -> ApiResult<bool> {
    Ok(Json(state.reports.create_report(body).await?))
}

/// `PUT /reports/:key`. Only `signed` can change.
pub async fn update_report(
    State(state): State<Arc<ApiState>>,
    Path(key): Path<String>,
    JsonBody(body): JsonBody<ReportUpdate>,
) -> ApiResult<bool> {
    let key = models::parse_key(&key)?;
    Ok(Json(state.reports.update_report(key, body.signed).await?))
}

/// `DELETE /reports/:key`
pub async fn remove_report(
    State(state): State<Arc<ApiState>>,
    Path(key): Path<String>,
) -> ApiResult<bool> {
    let key = models::parse_key(&key)?;
    Ok(Json(state.reports.remove_report(key).await?))
}

/// `GET /users`
pub async fn list_users(State(state): State<Arc<ApiState>>) -> ApiResult<Vec<UserListing>> {
    Ok(Json(state.users.list_users().await?))
}

/// `GET /users/:address`
pub async fn get_user(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
) -> ApiResult<User> {
    let address = models::parse_address(&address)?;
    Ok(Json(state.users.get_user(address).await?))
}

/// `POST /users`
pub async fn create_user(
    State(state): State<Arc<ApiState>>,
    JsonBody(body): JsonBody<NewUser>,
) -> ApiResult<()> {
    Ok(Json(state.users.create_user(body.name).await?))
}

/// `GET /settings`
pub async fn get_settings(State(state): State<Arc<ApiState>>) -> ApiResult<Settings> {
    Ok(Json(state.settings.get_settings().await?))
}

/// `PUT /settings/delay`
pub async fn update_delay(
    State(state): State<Arc<ApiState>>,
    JsonBody(body): JsonBody<DelayUpdate>,
) -> ApiResult<u64> {
    let unit = body.unit()?;
    Ok(Json(state.settings.update_delay(body.value, unit).await?))
}

/// `PUT /settings/fee`
pub async fn update_fee(
    State(state): State<Arc<ApiState>>,
    JsonBody(body): JsonBody<FeeUpdate>,
) -> ApiResult<Wei> {
    let resp = state.settings.update_fee(&body.value).await?;
    Ok(Json(DataResponse::new(Wei(resp.data))))
}

/// `PUT /settings/admin`
pub async fn update_admin(
    State(state): State<Arc<ApiState>>,
    JsonBody(body): JsonBody<AdminUpdate>,
) -> ApiResult<alloy_primitives::Address> {
    let admin = models::parse_address(&body.address)?;
    Ok(Json(state.settings.update_admin(admin).await?))
}

/// `POST /settings/deposit`
pub async fn deposit(
    State(state): State<Arc<ApiState>>,
    JsonBody(body): JsonBody<DepositRequest>,
) -> ApiResult<Wei> {
    let account = body
        .account
        .as_deref()
        .map(models::parse_address)
        .transpose()?;
    let resp = state.settings.deposit(&body.amount, account).await?;
    Ok(Json(DataResponse::new(Wei(resp.data))))
}
