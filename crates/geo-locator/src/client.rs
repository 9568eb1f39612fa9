//! HTTP client for the Maps web services.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::config::GeoConfig;
use crate::error::GeoError;
use crate::types::{LatLng, Place, ServiceResponse, SEARCH_RADIUS_METERS};

const GEOCODE_PATH: &str = "/maps/api/geocode/json";
const TEXT_SEARCH_PATH: &str = "/maps/api/place/textsearch/json";

/// Location lookups with graceful degradation.
///
/// The `try_*` methods surface errors; the plain methods log a warning and
/// return `None` or an empty list instead.
#[derive(Debug, Clone)]
pub struct GeoClient {
    client: Client,
    config: GeoConfig,
}

impl GeoClient {
    pub fn new(config: GeoConfig) -> Result<Self, GeoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        if config.api_key.is_none() {
            warn!("No location API key configured; geocoding is disabled");
        }

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, GeoError> {
        Self::new(GeoConfig::from_env())
    }

    /// Whether an API key is configured.
    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Coordinates for an address, or `None` on any failure.
    pub async fn geocode(&self, address: &str) -> Option<LatLng> {
        match self.try_geocode(address).await {
            Ok(location) => location,
            Err(e) => {
                warn!("Geocoding '{}' failed: {}", address, e);
                None
            }
        }
    }

    /// Formatted address for a point, or `None` on any failure.
    pub async fn reverse_geocode(&self, location: LatLng) -> Option<String> {
        match self.try_reverse_geocode(location).await {
            Ok(address) => address,
            Err(e) => {
                warn!("Reverse geocoding {:?} failed: {}", location, e);
                None
            }
        }
    }

    /// Places matching a text query, biased toward `near` within 50 km.
    /// Empty on any failure.
    pub async fn search_places(&self, query: &str, near: Option<LatLng>) -> Vec<Place> {
        match self.try_search_places(query, near).await {
            Ok(places) => places,
            Err(e) => {
                warn!("Place search '{}' failed: {}", query, e);
                Vec::new()
            }
        }
    }

    pub async fn try_geocode(&self, address: &str) -> Result<Option<LatLng>, GeoError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GeoError::InvalidInput("address is empty".to_string()));
        }

        let response = self.get(GEOCODE_PATH, &[("address", address.to_string())]).await?;
        Ok(response
            .results
            .into_iter()
            .next()
            .map(|result| result.geometry.location))
    }

    pub async fn try_reverse_geocode(&self, location: LatLng) -> Result<Option<String>, GeoError> {
        if !location.is_valid() {
            return Err(GeoError::InvalidInput(format!(
                "coordinates out of range: {},{}",
                location.lat, location.lng
            )));
        }

        let response = self.get(GEOCODE_PATH, &[("latlng", location.to_query())]).await?;
        Ok(response
            .results
            .into_iter()
            .find_map(|result| result.formatted_address))
    }

    pub async fn try_search_places(
        &self,
        query: &str,
        near: Option<LatLng>,
    ) -> Result<Vec<Place>, GeoError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GeoError::InvalidInput("query is empty".to_string()));
        }

        let mut params = vec![("query", query.to_string())];
        if let Some(point) = near {
            params.push(("location", point.to_query()));
            params.push(("radius", SEARCH_RADIUS_METERS.to_string()));
        }

        let response = self.get(TEXT_SEARCH_PATH, &params).await?;
        Ok(response
            .results
            .into_iter()
            .filter_map(|result| result.into_place())
            .collect())
    }

    /// GET a service endpoint and check its status field.
    ///
    /// `ZERO_RESULTS` is a successful empty answer.
    async fn get(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<ServiceResponse, GeoError> {
        let api_key = self.config.api_key.as_deref().ok_or(GeoError::NotConfigured)?;
        let url = format!("{}{}", self.config.api_url.trim_end_matches('/'), path);

        debug!("Location request: {} {:?}", path, params);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", api_key)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeoError::HttpStatus(response.status().as_u16()));
        }

        let body: ServiceResponse = response.json().await?;
        match body.status.as_str() {
            "OK" => Ok(body),
            "ZERO_RESULTS" => Ok(ServiceResponse {
                status: body.status,
                results: Vec::new(),
            }),
            _ => Err(GeoError::ApiStatus(body.status)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    /// Fake Maps service: echoes request parameters back through the results.
    async fn spawn_maps() -> String {
        let app = Router::new()
            .route(
                GEOCODE_PATH,
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    if params.get("key").map(String::as_str) != Some("maps-key") {
                        return Json(json!({"status": "REQUEST_DENIED", "results": []}));
                    }
                    if let Some(address) = params.get("address") {
                        if address == "nowhere" {
                            return Json(json!({"status": "ZERO_RESULTS", "results": []}));
                        }
                        return Json(json!({
                            "status": "OK",
                            "results": [{
                                "formatted_address": address,
                                "geometry": {"location": {"lat": 21.95, "lng": 89.18}}
                            }]
                        }));
                    }
                    let latlng = params.get("latlng").cloned().unwrap_or_default();
                    Json(json!({
                        "status": "OK",
                        "results": [{
                            "formatted_address": format!("Near {}", latlng),
                            "geometry": {"location": {"lat": 0.0, "lng": 0.0}}
                        }]
                    }))
                }),
            )
            .route(
                TEXT_SEARCH_PATH,
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    let radius = params.get("radius").cloned().unwrap_or_default();
                    Json(json!({
                        "status": "OK",
                        "results": [
                            {
                                "place_id": "p1",
                                "name": params.get("query"),
                                "formatted_address": format!("radius={}", radius),
                                "geometry": {"location": {"lat": 1.0, "lng": 2.0}}
                            },
                            {
                                "formatted_address": "no id",
                                "geometry": {"location": {"lat": 3.0, "lng": 4.0}}
                            }
                        ]
                    }))
                }),
            )
            .route(
                "/broken/maps/api/geocode/json",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(Value::Null)) }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(url: &str, key: &str) -> GeoClient {
        GeoClient::new(GeoConfig::default().with_api_url(url).with_api_key(key)).unwrap()
    }

    #[tokio::test]
    async fn test_geocode_and_reverse() {
        let url = spawn_maps().await;
        let client = client_for(&url, "maps-key");

        let point = client.geocode("Sundarbans").await.unwrap();
        assert_eq!(point, LatLng::new(21.95, 89.18));
        assert!(client.geocode("nowhere").await.is_none());

        let address = client.reverse_geocode(LatLng::new(1.5, 2.5)).await.unwrap();
        assert_eq!(address, "Near 1.5,2.5");
    }

    #[tokio::test]
    async fn test_search_places_bias_and_skip() {
        let url = spawn_maps().await;
        let client = client_for(&url, "maps-key");

        let places = client
            .search_places("mangrove park", Some(LatLng::new(22.0, 89.0)))
            .await;
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].place_id, "p1");
        assert_eq!(places[0].name.as_deref(), Some("mangrove park"));
        assert_eq!(places[0].formatted_address, "radius=50000");

        let unbiased = client.search_places("mangrove park", None).await;
        assert_eq!(unbiased[0].formatted_address, "radius=");
    }

    #[tokio::test]
    async fn test_failures_degrade() {
        let url = spawn_maps().await;

        let unconfigured = GeoClient::new(GeoConfig::default().with_api_url(&url)).unwrap();
        assert!(!unconfigured.is_configured());
        assert!(matches!(
            unconfigured.try_geocode("Sundarbans").await,
            Err(GeoError::NotConfigured)
        ));
        assert!(unconfigured.geocode("Sundarbans").await.is_none());

        let denied = client_for(&url, "wrong-key");
        assert!(matches!(
            denied.try_geocode("Sundarbans").await,
            Err(GeoError::ApiStatus(status)) if status == "REQUEST_DENIED"
        ));

        let broken = client_for(&format!("{}/broken", url), "maps-key");
        assert!(matches!(
            broken.try_geocode("Sundarbans").await,
            Err(GeoError::HttpStatus(500))
        ));
        assert!(broken.search_places("x", None).await.is_empty());

        let client = client_for(&url, "maps-key");
        assert!(client.reverse_geocode(LatLng::new(120.0, 0.0)).await.is_none());
        assert!(client.search_places("   ", None).await.is_empty());
    }
}
