//! HTTP front-end for a [`RouteManager`].
//!
//! | Method   | Path         | Purpose                                     |
//! |----------|--------------|---------------------------------------------|
//! | `GET`    | `/`          | Health check, reports the graph version     |
//! | `GET`    | `/locations` | Known origins, destinations and vehicles    |
//! | `GET`    | `/route`     | Waypoint search plus the path's totals      |
//! | `POST`   | `/routes`    | Add a route (authenticated)                 |
//! | `DELETE` | `/routes`    | Remove a route (authenticated)              |
//! | `POST`   | `/register`  | Register an account                         |
//! | `POST`   | `/flush`     | Persist deferred changes (authenticated)    |
//!
//! Authenticated endpoints read the credentials from the
//! `x-route-user` and `x-route-password` headers.

pub mod params;
#[cfg(test)]
mod test;

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderName, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinError;
use tower_http::cors::{AllowOrigin, CorsLayer, MaxAge};

use crate::auth::{AuthError, CredentialStore};
use crate::graph::{Edge, LocationId, VehicleClass};
use crate::manager::{Catalog, Itinerary, RouteEditor, RouteManager};
use crate::route::Metric;
use params::QueryParams;

pub const USER_HEADER: HeaderName = HeaderName::from_static("x-route-user");
pub const PASSWORD_HEADER: HeaderName = HeaderName::from_static("x-route-password");

pub struct AppState {
    pub manager: RouteManager,
    pub credentials: Arc<dyn CredentialStore>,
}

impl AppState {
    pub fn new(manager: RouteManager, credentials: Arc<dyn CredentialStore>) -> Self {
        AppState {
            manager,
            credentials,
        }
    }

    fn editor<'a>(&'a self, login: &'a Login) -> Result<RouteEditor<'a>, AuthError> {
        self.manager
            .authorize(self.credentials.as_ref(), &login.username, &login.password)
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        debug!("Request failed: {self}");
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<crate::Error> for ApiError {
    fn from(value: crate::Error) -> Self {
        match value {
            crate::Error::Graph(err) => ApiError::BadRequest(err.to_string()),
            crate::Error::Route(err) => ApiError::NotFound(err.to_string()),
            crate::Error::Auth(err) => ApiError::Unauthorized(err.to_string()),
            err @ (crate::Error::Persist(_) | crate::Error::Config(_)) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        ApiError::Unauthorized(value.to_string())
    }
}

impl From<JoinError> for ApiError {
    fn from(value: JoinError) -> Self {
        ApiError::Internal(value.to_string())
    }
}

struct Login {
    username: String,
    password: String,
}

impl TryFrom<&HeaderMap> for Login {
    type Error = ApiError;

    fn try_from(headers: &HeaderMap) -> Result<Self, Self::Error> {
        let read = |name: &HeaderName| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(String::from)
                .ok_or_else(|| ApiError::Unauthorized(format!("missing {name} header")))
        };

        Ok(Login {
            username: read(&USER_HEADER)?,
            password: read(&PASSWORD_HEADER)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteQuery {
    pub start: LocationId,
    pub destination: LocationId,
    pub vehicle: VehicleClass,
    #[serde(default)]
    pub waypoints: Vec<LocationId>,
    #[serde(default)]
    pub metric: Metric,
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub metric: Metric,
    #[serde(flatten)]
    pub itinerary: Itinerary,
}

#[derive(Debug, Deserialize)]
pub struct AddRoute {
    #[serde(flatten)]
    pub edge: Edge,
    #[serde(default)]
    pub bidirectional: bool,
}

#[derive(Debug, Deserialize)]
pub struct RemoveRoute {
    #[serde(rename = "source")]
    pub origin: LocationId,
    pub destination: LocationId,
    #[serde(rename = "vehicleType")]
    pub vehicle: VehicleClass,
    #[serde(default)]
    pub bidirectional: bool,
}

#[derive(Debug, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Runs `task` on the blocking pool. Searches and persistence are CPU and
/// disk bound, and must not stall the async workers.
async fn blocking<T, F>(state: Arc<AppState>, task: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppState) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || task(&state)).await?
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": state.manager.version() }))
}

async fn locations(State(state): State<Arc<AppState>>) -> Result<Json<Catalog>, ApiError> {
    blocking(state, |state| Ok(Json(state.manager.catalog()))).await
}

async fn find_route(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<RouteQuery>,
) -> Result<Json<RouteResponse>, ApiError> {
    blocking(state, move |state| {
        let itinerary = state
            .manager
            .try_plan_route(
                &query.start,
                &query.waypoints,
                &query.destination,
                &query.vehicle,
                &query.metric,
            )
            .map_err(crate::Error::from)?;

        Ok(Json(RouteResponse {
            metric: query.metric,
            itinerary,
        }))
    })
    .await
}

async fn add_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<AddRoute>,
) -> Result<StatusCode, ApiError> {
    let login = Login::try_from(&headers)?;

    blocking(state, move |state| {
        state.editor(&login)?.add_route(body.edge, body.bidirectional)?;
        Ok(StatusCode::CREATED)
    })
    .await
}

async fn remove_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<RemoveRoute>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let login = Login::try_from(&headers)?;

    blocking(state, move |state| {
        let removed = state.editor(&login)?.remove_route(
            &body.origin,
            &body.destination,
            &body.vehicle,
            body.bidirectional,
        )?;

        if removed == 0 {
            return Err(ApiError::NotFound(format!(
                "no route {} -> {} for {}",
                body.origin, body.destination, body.vehicle
            )));
        }

        Ok(Json(json!({ "removed": removed })))
    })
    .await
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Registration>,
) -> Result<StatusCode, ApiError> {
    blocking(state, move |state| {
        if state
            .credentials
            .register(&body.username, &body.email, &body.password)
        {
            Ok(StatusCode::CREATED)
        } else {
            Err(ApiError::Conflict(format!(
                "could not register {}",
                body.username
            )))
        }
    })
    .await
}

async fn flush(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let login = Login::try_from(&headers)?;

    blocking(state, move |state| {
        state.editor(&login)?.flush()?;
        Ok(StatusCode::NO_CONTENT)
    })
    .await
}

pub fn cors(origins: &[String]) -> CorsLayer {
    CorsLayer::new()
        .allow_methods(vec![Method::GET, Method::POST, Method::DELETE])
        .allow_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            USER_HEADER,
            PASSWORD_HEADER,
        ])
        .allow_origin(AllowOrigin::list(
            origins.iter().filter_map(|origin| origin.parse().ok()),
        ))
        .max_age(MaxAge::exact(Duration::new(3600, 0)))
}

pub fn router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    info!("Serving {:?}", state.manager);

    Router::new()
        .route("/", get(health_check))
        .route("/locations", get(locations))
        .route("/route", get(find_route))
        .route("/routes", post(add_route).delete(remove_route))
        .route("/register", post(register))
        .route("/flush", post(flush))
        .layer(cors(allowed_origins))
        .with_state(state)
}
