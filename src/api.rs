//! HTTP API handlers for FloodAlert.
//!
//! Every listing is a fresh fetch from the store followed by a fresh run of
//! the query engine, so the result always reflects the latest mutations.
//! Mutating endpoints require a [`Session`]; edits and deletes are further
//! restricted to the alert's owner.
//!
//! Alert messages are never logged, only ids and counts.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use crate::error::AlertError;
use crate::geocode::ReverseGeocoder;
use crate::model::{
    AlertListQuery, AlertRecord, AlertResponse, AlertsResponse, Coordinates, CreateAlertRequest,
    NearbyQuery, ReferenceLocation, UpdateAlertRequest,
};
use crate::query::{apply_filters_with_outcome, within_radius};
use crate::session::Session;
use crate::storage::{AlertStore, AlertUpdate, NewAlert};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: AlertStore,
    pub geocoder: Option<ReverseGeocoder>,
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/alerts", get(list_alerts).post(create_alert))
        .route("/alerts/nearby", get(nearby_alerts))
        .route("/alerts/mine", get(my_alerts))
        .route(
            "/alerts/:id",
            get(get_alert).put(update_alert).delete(delete_alert),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// GET /alerts - List alerts with optional filters.
///
/// # Query Parameters
///
/// - `city` (optional): case-insensitive substring of the city name
/// - `nearby` (optional): keep only alerts within 5 km of `latitude`/`longitude`
/// - `recent` (optional): sort by creation time, most recent first
/// - `latitude`, `longitude` (optional): the caller's current position
///
/// Without a position, `nearby` has no effect and the response reports
/// `"radius_applied": false`.
#[instrument(skip(state))]
pub async fn list_alerts(
    State(state): State<AppState>,
    query: Result<Query<AlertListQuery>, QueryRejection>,
) -> Result<Json<AlertsResponse>, AlertError> {
    let Query(query) = query?;
    let reference = reference_location(query.latitude, query.longitude)?;
    let criteria = query.criteria();

    let all = state.store.list_alerts().await.inspect_err(|e| {
        warn!(error = %e, "Failed to fetch alerts");
    })?;

    let outcome = apply_filters_with_outcome(&all, &criteria, reference);
    if criteria.within_radius && !outcome.radius_applied {
        info!("Radius filter requested without a location; skipped");
    }

    info!(
        total = all.len(),
        visible = outcome.alerts.len(),
        filtered = !criteria.is_empty(),
        radius_applied = outcome.radius_applied,
        "Alerts listed"
    );

    Ok(Json(AlertsResponse {
        count: outcome.alerts.len(),
        alerts: outcome.alerts,
        radius_applied: outcome.radius_applied,
    }))
}

/// GET /alerts/nearby - Alerts within `radius` km (default 5) of a point.
#[instrument(skip(state))]
pub async fn nearby_alerts(
    State(state): State<AppState>,
    query: Result<Query<NearbyQuery>, QueryRejection>,
) -> Result<Json<AlertsResponse>, AlertError> {
    let Query(query) = query?;
    let center = validate_coordinates(Coordinates::new(query.latitude, query.longitude))?;
    if !query.radius.is_finite() || query.radius < 0.0 {
        return Err(AlertError::validation("radius must be a non-negative number"));
    }

    let all = state.store.list_alerts().await?;
    let alerts = within_radius(&all, center, query.radius);

    info!(radius_km = query.radius, count = alerts.len(), "Nearby alerts listed");

    Ok(Json(AlertsResponse {
        count: alerts.len(),
        alerts,
        radius_applied: true,
    }))
}

/// GET /alerts/mine - Alerts created by the calling user.
#[instrument(skip(state, headers))]
pub async fn my_alerts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AlertsResponse>, AlertError> {
    let session = Session::require(&headers)?;

    let alerts = state.store.list_user_alerts(&session.user_id).await?;
    info!(count = alerts.len(), "User alerts listed");

    Ok(Json(AlertsResponse {
        count: alerts.len(),
        alerts,
        radius_applied: false,
    }))
}

/// GET /alerts/:id - Fetch a single alert.
#[instrument(skip(state))]
pub async fn get_alert(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<AlertRecord>, AlertError> {
    let Path(id) = id?;
    Ok(Json(state.store.get_alert(id).await?))
}

/// POST /alerts - Report a new flood alert.
///
/// # Request Body
///
/// ```json
/// {
///     "message": "Rua alagada, água na altura do joelho",
///     "latitude": -23.5505,
///     "longitude": -46.6333,
///     "city_name": "São Paulo",
///     "neighborhood": "Mooca",
///     "severity": "high"
/// }
/// ```
///
/// `city_name` may be blank when a reverse geocoder is configured.
/// `neighborhood` and `severity` are optional; severity defaults to medium.
///
/// # Response
///
/// Returns `201 Created` with `{"id": .., "message": ..}`.
#[instrument(skip(state, headers, request))]
pub async fn create_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Result<Json<CreateAlertRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AlertResponse>), AlertError> {
    let session = Session::require(&headers)?;
    let Json(request) = request?;
    let coordinates = validate_coordinates(Coordinates::new(request.latitude, request.longitude))?;

    let mut city_name = request.city_name.trim().to_string();
    if city_name.is_empty()
        && let Some(geocoder) = &state.geocoder
    {
        city_name = geocoder.city_name(coordinates).await.unwrap_or_default();
    }

    let new_alert = build_new_alert(&request, &city_name, &session, Utc::now())?;

    let created = state.store.insert_alert(&new_alert).await.inspect_err(|e| {
        warn!(error = %e, "Failed to create alert");
    })?;

    info!(
        alert_id = created.id,
        severity = %created.severity,
        "Alert created"
    );

    Ok((
        StatusCode::CREATED,
        Json(AlertResponse {
            id: created.id,
            message: "Alert created".to_string(),
        }),
    ))
}

/// PUT /alerts/:id - Edit an alert. Only its creator may do this.
#[instrument(skip(state, headers, request))]
pub async fn update_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<i64>, PathRejection>,
    request: Result<Json<UpdateAlertRequest>, JsonRejection>,
) -> Result<Json<AlertResponse>, AlertError> {
    let session = Session::require(&headers)?;
    let Path(id) = id?;
    let Json(request) = request?;
    let update = build_update(request)?;

    let updated = state
        .store
        .update_alert(id, &session.user_id, &update, Utc::now())
        .await
        .inspect_err(|e| {
            warn!(alert_id = id, error = %e, "Failed to update alert");
        })?;

    info!(alert_id = updated.id, "Alert updated");

    Ok(Json(AlertResponse {
        id: updated.id,
        message: "Alert updated".to_string(),
    }))
}

/// DELETE /alerts/:id - Remove an alert. Only its creator may do this.
#[instrument(skip(state, headers))]
pub async fn delete_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AlertError> {
    let session = Session::require(&headers)?;
    let Path(id) = id?;

    state
        .store
        .delete_alert(id, &session.user_id)
        .await
        .inspect_err(|e| {
            warn!(alert_id = id, error = %e, "Failed to delete alert");
        })?;

    info!(alert_id = id, "Alert deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Both halves of the caller's position, or neither.
fn reference_location(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Option<ReferenceLocation>, AlertError> {
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => {
            validate_coordinates(Coordinates::new(latitude, longitude)).map(Some)
        }
        (None, None) => Ok(None),
        _ => Err(AlertError::validation(
            "latitude and longitude must be given together",
        )),
    }
}

fn validate_coordinates(coordinates: Coordinates) -> Result<Coordinates, AlertError> {
    if coordinates.is_valid() {
        Ok(coordinates)
    } else {
        Err(AlertError::validation(
            "latitude must be within [-90, 90] and longitude within [-180, 180]",
        ))
    }
}

/// Validate a create request into a storable alert.
///
/// `city_name` is the already-resolved city (typed or geocoded).
fn build_new_alert(
    request: &CreateAlertRequest,
    city_name: &str,
    session: &Session,
    now: DateTime<Utc>,
) -> Result<NewAlert, AlertError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(AlertError::validation("message must not be empty"));
    }

    let city = city_name.trim();
    if city.is_empty() {
        return Err(AlertError::validation("city name must not be empty"));
    }

    let city_name = match request.neighborhood.as_deref().map(str::trim) {
        Some(neighborhood) if !neighborhood.is_empty() => format!("{city} - {neighborhood}"),
        _ => city.to_string(),
    };

    Ok(NewAlert {
        user_id: session.user_id.clone(),
        user_name: session.user_name.clone(),
        message: message.to_string(),
        city_name,
        coordinates: validate_coordinates(Coordinates::new(request.latitude, request.longitude))?,
        severity: request.severity,
        created_at: now,
    })
}

fn build_update(request: UpdateAlertRequest) -> Result<AlertUpdate, AlertError> {
    let message = non_blank(request.message, "message")?;
    let city_name = non_blank(request.city_name, "city name")?;

    let update = AlertUpdate {
        message,
        severity: request.severity,
        city_name,
    };
    if update.is_empty() {
        return Err(AlertError::validation("nothing to update"));
    }
    Ok(update)
}

fn non_blank(value: Option<String>, field: &str) -> Result<Option<String>, AlertError> {
    match value {
        Some(v) if v.trim().is_empty() => {
            Err(AlertError::validation(format!("{field} must not be empty")))
        }
        Some(v) => Ok(Some(v.trim().to_string())),
        None => Ok(None),
    }
}
