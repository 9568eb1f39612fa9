//! Location lookups.
//!
//! Lookups degrade to empty results when the location service is not
//! configured or fails; only malformed input is an error.

use axum::extract::{Query, State};
use axum::Json;
use geo_locator::{distance_meters, LatLng, Place};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct PointQuery {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub struct PlacesQuery {
    pub query: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct DistanceQuery {
    pub from_lat: f64,
    pub from_lng: f64,
    pub to_lat: f64,
    pub to_lng: f64,
}

#[derive(Debug, Serialize)]
pub struct GeocodeResponse {
    pub location: Option<LatLng>,
}

#[derive(Debug, Serialize)]
pub struct ReverseResponse {
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DistanceResponse {
    pub meters: f64,
}

fn point(lat: f64, lng: f64) -> Result<LatLng> {
    let location = LatLng::new(lat, lng);
    if !location.is_valid() {
        return Err(ApiError::BadRequest(format!(
            "Coordinates out of range: {}, {}",
            lat, lng
        )));
    }
    Ok(location)
}

pub async fn geocode(
    State(state): State<AppState>,
    Query(query): Query<GeocodeQuery>,
) -> Result<Json<GeocodeResponse>> {
    if query.address.trim().is_empty() {
        return Err(ApiError::BadRequest("address cannot be empty".to_string()));
    }
    let location = state.geo.geocode(&query.address).await;
    Ok(Json(GeocodeResponse { location }))
}

pub async fn reverse(
    State(state): State<AppState>,
    Query(query): Query<PointQuery>,
) -> Result<Json<ReverseResponse>> {
    let location = point(query.lat, query.lng)?;
    let address = state.geo.reverse_geocode(location).await;
    Ok(Json(ReverseResponse { address }))
}

pub async fn places(
    State(state): State<AppState>,
    Query(query): Query<PlacesQuery>,
) -> Result<Json<Vec<Place>>> {
    let near = match (query.lat, query.lng) {
        (Some(lat), Some(lng)) => Some(point(lat, lng)?),
        (None, None) => None,
        _ => {
            return Err(ApiError::BadRequest(
                "lat and lng must be given together".to_string(),
            ))
        }
    };
    Ok(Json(state.geo.search_places(&query.query, near).await))
}

/// Great-circle distance between two points.
pub async fn distance(Query(query): Query<DistanceQuery>) -> Result<Json<DistanceResponse>> {
    let from = point(query.from_lat, query.from_lng)?;
    let to = point(query.to_lat, query.to_lng)?;
    Ok(Json(DistanceResponse {
        meters: distance_meters(from, to),
    }))
}
