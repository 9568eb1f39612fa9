//! Location value types and the service response shapes.

use serde::{Deserialize, Serialize};

/// Bias radius for place search around a point.
pub const SEARCH_RADIUS_METERS: u32 = 50_000;

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both coordinates are finite and in range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// `"lat,lng"` as the web services expect it.
    pub(crate) fn to_query(self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

/// A place search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub place_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub formatted_address: String,
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServiceResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<ServiceResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServiceResult {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Geometry {
    pub location: LatLng,
}

impl ServiceResult {
    pub(crate) fn into_place(self) -> Option<Place> {
        Some(Place {
            place_id: self.place_id?,
            name: self.name,
            formatted_address: self.formatted_address.unwrap_or_default(),
            location: self.geometry.location,
        })
    }
}
